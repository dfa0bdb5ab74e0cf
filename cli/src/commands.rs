//! # Subcommand Implementations
//!
//! Each command returns the bytes destined for stdout (possibly empty) and
//! writes any files itself. `main` does the printing, which keeps these
//! functions testable without capturing stdout.
//!
//! Key-pair commands are generic over the algorithm; [`with_algorithm!`]
//! turns the runtime `--algorithm` choice into a monomorphized call.

use std::fs;
use std::io::Read;
use std::path::Path;

use anyhow::{bail, Context, Result};
use strongbox::config::AES_KEY_LENGTH;
use strongbox::crypto::agreement::AgreementParameters;
use strongbox::crypto::asymmetric::{
    AsymmetricAlgorithm, EcdhP256, EcdsaP256, Ed25519, KeyPair, PublicKey, Rsa2048, Rsa3072,
    Rsa4096, X25519,
};
use strongbox::crypto::encoding::{self, Encoding};
use strongbox::crypto::keywrap::WrappedKey;
use strongbox::crypto::signatures::{sign_hashed, verify_hashed};
use strongbox::crypto::{ct_eq, symmetric};
use tracing::{debug, info};
use zeroize::Zeroizing;

use crate::cli::{
    AgreeArgs, CompareArgs, CryptArgs, HashArgs, KeyAlgorithm, KeygenArgs, PrivateKeyArgs,
    PubkeyArgs, SignArgs, VerifyArgs,
};
use crate::config::CliConfig;

/// Call a generic function with the concrete algorithm type `alg` names.
macro_rules! with_algorithm {
    ($alg:expr, $func:ident($($arg:expr),* $(,)?)) => {
        match $alg {
            KeyAlgorithm::Rsa2048 => $func::<Rsa2048>($($arg),*),
            KeyAlgorithm::Rsa3072 => $func::<Rsa3072>($($arg),*),
            KeyAlgorithm::Rsa4096 => $func::<Rsa4096>($($arg),*),
            KeyAlgorithm::EcdhP256 => $func::<EcdhP256>($($arg),*),
            KeyAlgorithm::EcdsaP256 => $func::<EcdsaP256>($($arg),*),
            KeyAlgorithm::Ed25519 => $func::<Ed25519>($($arg),*),
            KeyAlgorithm::X25519 => $func::<X25519>($($arg),*),
        }
    };
}

// ---------------------------------------------------------------------------
// I/O helpers
// ---------------------------------------------------------------------------

/// Read a file, or stdin for `None` / `-`.
fn read_input(path: Option<&Path>) -> Result<Vec<u8>> {
    match path {
        Some(p) if p != Path::new("-") => {
            fs::read(p).with_context(|| format!("failed to read {}", p.display()))
        }
        _ => {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .context("failed to read stdin")?;
            Ok(buf)
        }
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("failed to read {}", path.display()))
}

fn write_file(path: &Path, data: &[u8]) -> Result<()> {
    fs::write(path, data).with_context(|| format!("failed to write {}", path.display()))
}

/// Write key material, owner-readable only on Unix.
fn write_secret_file(path: &Path, data: &[u8]) -> Result<()> {
    write_file(path, data)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))
            .with_context(|| format!("failed to restrict permissions on {}", path.display()))?;
    }

    Ok(())
}

/// Encode for output. Text encodings get a trailing newline; raw stays raw.
fn encode_output(encoding: Encoding, data: &[u8]) -> Vec<u8> {
    let mut out = encoding.encode_bytes(data);
    if encoding != Encoding::Raw {
        out.push(b'\n');
    }
    out
}

fn decode_input(encoding: Encoding, data: &[u8]) -> Result<Vec<u8>> {
    encoding
        .decode_bytes(data)
        .with_context(|| format!("input is not valid {encoding}"))
}

fn looks_like_json(data: &[u8]) -> bool {
    data.iter().find(|b| !b.is_ascii_whitespace()) == Some(&b'{')
}

/// Parse a key file as a password envelope, if it is one.
///
/// Text encodings never start with `{`, so there a failed parse is an
/// error. Raw key bytes can, so under `raw` a failed parse means "not an
/// envelope".
fn read_envelope(contents: &[u8], encoding: Encoding) -> Result<Option<WrappedKey>> {
    if !looks_like_json(contents) {
        return Ok(None);
    }
    let parsed = std::str::from_utf8(contents)
        .context("wrapped key file is not UTF-8")
        .and_then(|text| WrappedKey::from_json(text).map_err(anyhow::Error::from));
    match parsed {
        Ok(envelope) => Ok(Some(envelope)),
        Err(_) if encoding == Encoding::Raw => Ok(None),
        Err(err) => Err(err),
    }
}

/// Open a private key file, unwrapping it if it's a password envelope.
fn load_keypair<A: AsymmetricAlgorithm>(args: &PrivateKeyArgs) -> Result<KeyPair<A>> {
    let contents = Zeroizing::new(read_file(&args.key)?);

    if let Some(envelope) = read_envelope(&contents, args.key_encoding)? {
        let password = args
            .password
            .as_deref()
            .context("key file is password-protected; pass --password or set STRONGBOX_PASSWORD")?;
        let pair = KeyPair::<A>::import_wrapped(&envelope, password.as_bytes())?;
        debug!(key_id = %envelope.key_id, algorithm = A::NAME, "opened wrapped key");
        return Ok(pair);
    }

    let der = Zeroizing::new(decode_input(args.key_encoding, &contents)?);
    KeyPair::<A>::import(&der)
        .with_context(|| format!("{} is not a valid {} private key", args.key.display(), A::NAME))
}

fn parse_aes_key(hex_key: &str) -> Result<Zeroizing<[u8; AES_KEY_LENGTH]>> {
    let bytes = Zeroizing::new(encoding::from_hex(hex_key).context("AES key must be hex")?);
    if bytes.len() != AES_KEY_LENGTH {
        bail!("AES key must be {AES_KEY_LENGTH} bytes, got {}", bytes.len());
    }
    let mut key = Zeroizing::new([0u8; AES_KEY_LENGTH]);
    key.copy_from_slice(&bytes);
    Ok(key)
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

pub fn hash(args: &HashArgs) -> Result<Vec<u8>> {
    let data = read_input(args.input.as_deref())?;
    let digest = match &args.hmac_key {
        Some(key_hex) => {
            let key = Zeroizing::new(encoding::from_hex(key_hex).context("HMAC key must be hex")?);
            args.algorithm.hmac(&key, &data)?
        }
        None => args.algorithm.compute(&data),
    };
    debug!(algorithm = %args.algorithm, input_len = data.len(), "hashed input");
    Ok(encode_output(args.encoding, &digest))
}

pub fn keygen(args: &KeygenArgs, config: &CliConfig) -> Result<Vec<u8>> {
    with_algorithm!(args.algorithm, keygen_with(args, config))
}

fn keygen_with<A: AsymmetricAlgorithm>(args: &KeygenArgs, config: &CliConfig) -> Result<Vec<u8>> {
    let pair = KeyPair::<A>::generate()?;

    match &args.password {
        Some(password) => {
            let params = config.wrap_params(args.kdf, args.iterations);
            let envelope = pair.export_wrapped(password.as_bytes(), &params)?;
            write_secret_file(&args.out, envelope.to_json()?.as_bytes())?;
            info!(
                algorithm = A::NAME,
                kdf = params.kdf.name(),
                key_id = %envelope.key_id,
                "wrote wrapped private key"
            );
        }
        None => {
            let exported = pair.export_private()?;
            let encoded = Zeroizing::new(encode_output(args.encoding, &exported));
            write_secret_file(&args.out, &encoded)?;
            info!(algorithm = A::NAME, "wrote unwrapped private key");
        }
    }

    let public = encode_output(args.encoding, &pair.public_key().export()?);
    match &args.pub_out {
        Some(path) => {
            write_file(path, &public)?;
            Ok(Vec::new())
        }
        None => Ok(public),
    }
}

pub fn pubkey(args: &PubkeyArgs) -> Result<Vec<u8>> {
    with_algorithm!(args.algorithm, pubkey_with(args))
}

fn pubkey_with<A: AsymmetricAlgorithm>(args: &PubkeyArgs) -> Result<Vec<u8>> {
    let pair = load_keypair::<A>(&args.private)?;
    let public = pair.public_key();
    let bytes = if args.raw {
        public.export_raw()?
    } else {
        public.export()?
    };
    Ok(encode_output(args.encoding, &bytes))
}

pub fn sign(args: &SignArgs) -> Result<Vec<u8>> {
    with_algorithm!(args.algorithm, sign_with(args))
}

fn sign_with<A: AsymmetricAlgorithm>(args: &SignArgs) -> Result<Vec<u8>> {
    let pair = load_keypair::<A>(&args.private)?;
    let message = read_input(args.input.as_deref())?;
    let signature = sign_hashed(args.hash, &pair, &message)?;
    let out = encode_output(args.encoding, &signature);

    match &args.out {
        Some(path) => {
            write_file(path, &out)?;
            Ok(Vec::new())
        }
        None => Ok(out),
    }
}

pub fn verify(args: &VerifyArgs) -> Result<Vec<u8>> {
    with_algorithm!(args.algorithm, verify_with(args))
}

fn verify_with<A: AsymmetricAlgorithm>(args: &VerifyArgs) -> Result<Vec<u8>> {
    let public_bytes = decode_input(args.encoding, &read_file(&args.pubkey)?)?;
    let public = PublicKey::<A>::import(&public_bytes)
        .with_context(|| format!("{} is not a valid {} public key", args.pubkey.display(), A::NAME))?;
    let signature = decode_input(args.encoding, &read_file(&args.signature)?)?;
    let message = read_input(args.input.as_deref())?;

    if !verify_hashed(args.hash, &public, &message, &signature)? {
        bail!("signature verification failed");
    }
    Ok(b"OK\n".to_vec())
}

pub fn encrypt(args: &CryptArgs) -> Result<Vec<u8>> {
    let key = parse_aes_key(&args.key)?;
    let plaintext = Zeroizing::new(read_input(args.input.as_deref())?);
    let sealed = symmetric::encrypt(&key, &plaintext)?;
    emit(args.out.as_deref(), encode_output(args.encoding, &sealed))
}

pub fn decrypt(args: &CryptArgs) -> Result<Vec<u8>> {
    let key = parse_aes_key(&args.key)?;
    let sealed = decode_input(args.encoding, &read_input(args.input.as_deref())?)?;
    let plaintext = symmetric::decrypt(&key, &sealed)?;
    emit(args.out.as_deref(), plaintext)
}

fn emit(path: Option<&Path>, data: Vec<u8>) -> Result<Vec<u8>> {
    match path {
        Some(path) => {
            write_file(path, &data)?;
            Ok(Vec::new())
        }
        None => Ok(data),
    }
}

pub fn compare(args: &CompareArgs) -> Result<Vec<u8>> {
    // Raw compares the arguments byte for byte.
    let decode = |value: &str| match args.encoding {
        Encoding::Raw => Ok(value.as_bytes().to_vec()),
        other => other.decode(value),
    };
    let left = decode(&args.left).context("left value")?;
    let right = decode(&args.right).context("right value")?;
    if !ct_eq(&left, &right) {
        bail!("values differ");
    }
    Ok(b"equal\n".to_vec())
}

pub fn agree(args: &AgreeArgs, config: &CliConfig) -> Result<Vec<u8>> {
    with_algorithm!(args.algorithm, agree_with(args, config))
}

fn agree_with<A: AsymmetricAlgorithm>(args: &AgreeArgs, config: &CliConfig) -> Result<Vec<u8>> {
    let params: AgreementParameters = match &args.params {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("invalid agreement parameters in {}", path.display()))?
        }
        None => config.agreement.clone(),
    };

    let pair = load_keypair::<A>(&args.private)?;
    let peer = decode_input(args.peer_encoding, &read_file(&args.peer)?)?;
    let key = params.derive_key(&pair, &peer, args.length)?;
    Ok(encode_output(args.encoding, &key))
}
