//! End-to-end integration tests for Strongbox.
//!
//! These go through the public API only, the way a downstream crate would:
//! generate keys, export them, wrap them under a password, ship them
//! around as text, and check that every operation still lines up on the
//! other side.
//!
//! Each test stands alone. No shared state, no test ordering dependencies.

use strongbox::config::{KdfParams, WrapParams};
use strongbox::crypto::agreement::{AgreementParameters, KeyDerivation, PublicKeyFormat};
use strongbox::crypto::asymmetric::{
    AsymmetricAlgorithm, AsymmetricError, EcdhP256, EcdsaP256, Ed25519, KeyPair, Operation,
    PublicKey, Rsa2048, X25519,
};
use strongbox::crypto::encoding::{self, Encoding, HexCase};
use strongbox::crypto::keywrap::{self, KeyWrapError, WrappedKey};
use strongbox::crypto::signatures::{batch_verify, sign_hashed, verify_hashed};
use strongbox::crypto::symmetric::Aes256GcmCipher;
use strongbox::crypto::{ct_eq, wipe_bytes, HashAlgorithm};

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

fn fast() -> WrapParams {
    WrapParams::fast_insecure()
}

/// Sign with `A`, ship the public key as base64, verify on the far side.
fn sign_across_the_wire<A: AsymmetricAlgorithm>() {
    let pair = KeyPair::<A>::generate().unwrap();
    let message = b"pay bob 10 coins";

    let wire_key = pair.public_key().to_base64().unwrap();
    let wire_sig = encoding::to_hex(&sign_hashed(HashAlgorithm::Sha512, &pair, message).unwrap(), HexCase::Upper);

    let far_key = PublicKey::<A>::from_base64(&wire_key).unwrap();
    let far_sig = encoding::from_hex(&wire_sig).unwrap();
    assert!(verify_hashed(HashAlgorithm::Sha512, &far_key, message, &far_sig).unwrap());
    assert!(!verify_hashed(HashAlgorithm::Sha512, &far_key, b"pay eve 10 coins", &far_sig).unwrap());
}

// ---------------------------------------------------------------------------
// 1. Signatures across every signing backend
// ---------------------------------------------------------------------------

#[test]
fn hash_then_sign_over_the_wire() {
    sign_across_the_wire::<Ed25519>();
    sign_across_the_wire::<EcdsaP256>();
    sign_across_the_wire::<Rsa2048>();
}

#[test]
fn batch_of_mixed_messages() {
    let pair = KeyPair::<EcdsaP256>::generate().unwrap();
    let mut items: Vec<_> = (0..5)
        .map(|i| {
            let msg = format!("entry-{i}").into_bytes();
            let sig = pair.sign(&msg).unwrap();
            (pair.public_key(), msg, sig)
        })
        .collect();
    assert!(batch_verify(&items).is_ok());

    items[3].2[0] ^= 0xFF;
    assert!(matches!(
        batch_verify(&items),
        Err(AsymmetricError::VerificationFailed)
    ));
}

// ---------------------------------------------------------------------------
// 2. Key wrapping lifecycle
// ---------------------------------------------------------------------------

#[test]
fn wrapped_key_survives_json_and_rewrap() {
    let pair = KeyPair::<EcdsaP256>::generate().unwrap();
    let envelope = pair.export_wrapped(b"first password", &fast()).unwrap();

    // To disk and back.
    let json = envelope.to_json().unwrap();
    let loaded = WrappedKey::from_json(&json).unwrap();

    // Rotate the password, and move to Argon2id while we're at it.
    let argon = WrapParams {
        kdf: KdfParams::Argon2id {
            memory_kib: 512,
            iterations: 1,
            parallelism: 1,
        },
    };
    let rotated = keywrap::rewrap(&loaded, b"first password", b"second password", &argon).unwrap();
    assert_eq!(rotated.key_id, envelope.key_id);

    assert!(matches!(
        KeyPair::<EcdsaP256>::import_wrapped(&rotated, b"first password"),
        Err(KeyWrapError::WrongPassword)
    ));
    let restored = KeyPair::<EcdsaP256>::import_wrapped(&rotated, b"second password").unwrap();

    let sig = restored.sign(b"still me").unwrap();
    assert!(pair.public_key().verify(b"still me", &sig).unwrap());
}

#[test]
fn wrapped_rsa_key_decrypts_after_import() {
    let pair = KeyPair::<Rsa2048>::generate().unwrap();
    let ct = pair.public_key().encrypt(b"session key").unwrap();

    let envelope = pair.export_wrapped(b"pw", &fast()).unwrap();
    let restored = KeyPair::<Rsa2048>::import_wrapped(&envelope, b"pw").unwrap();
    assert_eq!(restored.decrypt(&ct).unwrap(), b"session key");
}

// ---------------------------------------------------------------------------
// 3. Key agreement into symmetric encryption
// ---------------------------------------------------------------------------

#[test]
fn agreed_key_drives_aes_gcm() {
    let params = AgreementParameters::new(
        HashAlgorithm::Sha256,
        KeyDerivation::Hkdf {
            salt: b"e2e salt".to_vec(),
            info: b"strongbox e2e aes key".to_vec(),
        },
        PublicKeyFormat::Raw,
    );

    // Parameters travel as JSON, just like they would in a handshake.
    let negotiated: AgreementParameters =
        serde_json::from_str(&serde_json::to_string(&params).unwrap()).unwrap();

    let alice = KeyPair::<EcdhP256>::generate().unwrap();
    let bob = KeyPair::<EcdhP256>::generate().unwrap();
    let alice_pub = params.export_public(&alice).unwrap();
    let bob_pub = negotiated.export_public(&bob).unwrap();

    let alice_key = params.derive_key(&alice, &bob_pub, 32).unwrap();
    let bob_key = negotiated.derive_key(&bob, &alice_pub, 32).unwrap();
    assert!(ct_eq(&alice_key, &bob_key));

    let sealed = Aes256GcmCipher::new(&alice_key)
        .unwrap()
        .encrypt(b"hello bob")
        .unwrap();
    let opened = Aes256GcmCipher::new(&bob_key).unwrap().decrypt(&sealed).unwrap();
    assert_eq!(opened, b"hello bob");
}

#[test]
fn x25519_agreement_with_defaults() {
    let params = AgreementParameters::default();
    let alice = KeyPair::<X25519>::generate().unwrap();
    let bob = KeyPair::<X25519>::generate().unwrap();
    let k1 = params
        .derive_key(&alice, &params.export_public(&bob).unwrap(), 32)
        .unwrap();
    let k2 = params
        .derive_key(&bob, &params.export_public(&alice).unwrap(), 32)
        .unwrap();
    assert_eq!(k1.as_slice(), k2.as_slice());
}

// ---------------------------------------------------------------------------
// 4. The "unsupported" contract
// ---------------------------------------------------------------------------

#[test]
fn capabilities_agree_with_behavior() {
    fn check<A: AsymmetricAlgorithm>() {
        let pair = KeyPair::<A>::generate().unwrap();
        let caps = A::capabilities();

        let signed = pair.sign(b"m");
        assert_eq!(caps.supports(Operation::Sign), signed.is_ok(), "{} sign", A::NAME);

        let agreed = pair.derive_shared_secret(&pair.public_key());
        assert_eq!(caps.supports(Operation::KeyAgreement), agreed.is_ok(), "{} agree", A::NAME);

        let encrypted = pair.encrypt(b"m");
        assert_eq!(caps.supports(Operation::Encrypt), encrypted.is_ok(), "{} encrypt", A::NAME);

        let raw = pair.public_key().export_raw();
        assert_eq!(caps.supports(Operation::RawPublicKey), raw.is_ok(), "{} raw", A::NAME);
    }

    check::<EcdhP256>();
    check::<EcdsaP256>();
    check::<Ed25519>();
    check::<X25519>();
    check::<Rsa2048>();
}

// ---------------------------------------------------------------------------
// 5. Encodings and the local helpers
// ---------------------------------------------------------------------------

#[test]
fn digests_compare_in_constant_time_across_encodings() {
    let digest = HashAlgorithm::Blake3.compute(b"file contents");
    for enc in [
        Encoding::Base64,
        Encoding::Base64Url,
        Encoding::Hex(HexCase::Lower),
        Encoding::Hex(HexCase::Upper),
        Encoding::Base58,
    ] {
        let text = enc.encode(&digest).unwrap();
        let back = enc.decode(&text).unwrap();
        assert!(ct_eq(&digest, &back), "{enc}");
    }
    assert!(!ct_eq(&digest, &digest[..31]));
}

#[test]
fn wiping_an_exported_key() {
    let pair = KeyPair::<Ed25519>::generate().unwrap();
    let mut exported = pair.export_private().unwrap().to_vec();
    let len = exported.len();
    wipe_bytes(&mut exported);
    assert_eq!(exported.len(), len);
    assert!(exported.iter().all(|&b| b == 0));
}
