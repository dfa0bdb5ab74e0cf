// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Strongbox CLI
//!
//! Entry point for the `strongbox` binary. Parses CLI arguments,
//! initializes logging, loads the optional config file, and dispatches to
//! one subcommand.
//!
//! - `hash`    — digest or HMAC a file
//! - `keygen`  — generate a key pair, optionally password-wrapped
//! - `pubkey`  — derive the public key from a private key file
//! - `sign`    — hash-then-sign
//! - `verify`  — check a signature from `sign`
//! - `encrypt` — AES-256-GCM seal
//! - `decrypt` — AES-256-GCM open
//! - `compare` — constant-time comparison of two values
//! - `agree`   — ECDH / X25519 key agreement through a KDF
//! - `version` — print build version information

mod cli;
mod commands;
mod config;
mod logging;

use std::io::Write;

use anyhow::{Context, Result};
use clap::Parser;

use cli::{Commands, StrongboxCli};
use config::CliConfig;
use logging::LogFormat;

fn main() -> Result<()> {
    let cli = StrongboxCli::parse();
    logging::init_logging(&cli.log_level, LogFormat::from_str_lossy(&cli.log_format));

    let config = CliConfig::load(cli.config.as_deref())?;

    let output = match &cli.command {
        Commands::Hash(args) => commands::hash(args)?,
        Commands::Keygen(args) => commands::keygen(args, &config)?,
        Commands::Pubkey(args) => commands::pubkey(args)?,
        Commands::Sign(args) => commands::sign(args)?,
        Commands::Verify(args) => commands::verify(args)?,
        Commands::Encrypt(args) => commands::encrypt(args)?,
        Commands::Decrypt(args) => commands::decrypt(args)?,
        Commands::Compare(args) => commands::compare(args)?,
        Commands::Agree(args) => commands::agree(args, &config)?,
        Commands::Version => {
            print_version();
            return Ok(());
        }
    };

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&output).context("failed to write to stdout")?;
    stdout.flush().context("failed to flush stdout")?;
    Ok(())
}

/// Prints version information to stdout.
fn print_version() {
    println!("strongbox {}", env!("CARGO_PKG_VERSION"));
    println!("envelope  v{}", strongbox::config::WRAP_ENVELOPE_VERSION);
    println!("rustc     {}", rustc_version());
}

/// Returns the Rust compiler version used to build this binary.
fn rustc_version() -> &'static str {
    option_env!("RUSTC_VERSION").unwrap_or("unknown")
}
