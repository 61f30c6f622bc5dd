//! Developer commands for keys and tokens
//!
//! Generate an RSA keypair, mint a signed token and verify one, all through
//! the same `Codec` a web application would use.

pub mod decode;
pub mod keygen;
pub mod mint;

use crate::codec::Codec;
use crate::config::{self, Config};
use anyhow::{Context, Result};
use chrono::DateTime;
use clap::Subcommand;
use std::path::{Path, PathBuf};

/// Format timestamp as human-readable UTC string
pub(crate) fn format_timestamp(timestamp: i64) -> String {
    if let Some(datetime) = DateTime::from_timestamp(timestamp, 0) {
        datetime.format("%Y-%m-%d %H:%M:%S UTC").to_string()
    } else {
        "Invalid timestamp".to_string()
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate an RSA keypair
    ///
    /// Writes private.pem (PKCS#8) and public.pem to the output directory,
    /// ~/.config/keystamp/keys by default. Point private_key_path and
    /// public_key_path in the config file at them.
    GenerateKeypair {
        /// Directory to write the keypair into
        #[arg(long)]
        out_dir: Option<PathBuf>,

        /// RSA modulus size in bits
        #[arg(long, default_value_t = keygen::DEFAULT_KEY_BITS)]
        bits: usize,

        /// Overwrite existing keypair if it exists
        #[arg(long)]
        force: bool,
    },

    /// Mint a signed access token
    Mint {
        /// Subject claim (user identifier)
        #[arg(long)]
        subject: String,

        /// Issuer claim
        #[arg(long)]
        issuer: Option<String>,

        /// Token id claim
        #[arg(long)]
        id: Option<String>,

        /// Scope claim
        #[arg(long)]
        scope: Option<String>,

        /// Token expiration in seconds from now
        #[arg(long, default_value = "3600")]
        expires_in: u64,

        /// Custom claim in key=value format (can be specified multiple times)
        #[arg(long)]
        claim: Vec<String>,

        /// Subject of the actor acting on behalf of the subject
        #[arg(long)]
        actor_subject: Option<String>,
    },

    /// Verify a token and display its claims
    Decode {
        /// Signed token string
        token: String,

        /// Show the claims without verifying the signature
        #[arg(long)]
        no_verify: bool,
    },
}

/// Load configuration for the commands that sign or verify
fn load_config(config_path: Option<&Path>) -> Result<Config> {
    let config = config::load_config(config_path).context("Failed to load config")?;
    tracing::debug!(algorithm = %config.signing_algorithm, "Loaded configuration");
    Ok(config)
}

/// Run a command; configuration is only read by commands that use keys
pub fn handle_command(command: Command, config_path: Option<&Path>) -> Result<()> {
    match command {
        Command::GenerateKeypair {
            out_dir,
            bits,
            force,
        } => {
            let dir = match out_dir {
                Some(dir) => dir,
                None => config::get_keys_dir()?,
            };
            let paths = keygen::generate_keypair(&dir, bits, force)?;

            println!("Generated RSA-{bits} keypair:");
            println!("  Private key: {}", paths.private_key.display());
            println!("  Public key:  {}", paths.public_key.display());
            println!();
            println!("Add to your keystamp config:");
            println!("  private_key_path = \"{}\"", paths.private_key.display());
            println!("  public_key_path = \"{}\"", paths.public_key.display());
            Ok(())
        }

        Command::Mint {
            subject,
            issuer,
            id,
            scope,
            expires_in,
            claim,
            actor_subject,
        } => {
            let codec = Codec::new(&load_config(config_path)?);
            let token = mint::mint_token(
                &codec,
                &mint::MintTokenConfig {
                    subject,
                    issuer,
                    id,
                    scope,
                    expires_in,
                    claim_strings: claim,
                    actor_subject,
                },
            )?;
            println!("{token}");
            Ok(())
        }

        Command::Decode { token, no_verify } => {
            let decoded = if no_verify {
                decode::inspect_token(token.trim())?
            } else {
                let codec = Codec::new(&load_config(config_path)?);
                decode::decode_token(&codec, token.trim())?
            };
            decode::print_decoded(&decoded)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0), "1970-01-01 00:00:00 UTC");
        assert_eq!(format_timestamp(i64::MAX), "Invalid timestamp");
    }
}
