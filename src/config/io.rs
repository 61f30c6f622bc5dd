//! Configuration loading
//!
//! Reads the TOML file, applies environment overrides, resolves key file
//! paths into key material and validates the result. The returned `Config`
//! is final: nothing downstream mutates it.

use super::paths::get_config_path;
use super::schema::{Config, KeyMaterial};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Environment variable holding a PEM private key
pub const ENV_PRIVATE_KEY: &str = "KEYSTAMP_PRIVATE_KEY";
/// Environment variable holding a PEM public key
pub const ENV_PUBLIC_KEY: &str = "KEYSTAMP_PUBLIC_KEY";
/// Environment variable selecting RS512 or RS256
pub const ENV_SIGNING_ALGORITHM: &str = "KEYSTAMP_SIGNING_ALGORITHM";
/// Environment variable overriding the session cookie name
pub const ENV_COOKIE_NAME: &str = "KEYSTAMP_COOKIE_NAME";

/// Load configuration from disk
///
/// Uses `path` when given, otherwise the default config path. A missing
/// default file yields the default config; a missing explicit file is an error.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let config = match path {
        Some(path) => read_config_file(path)?,
        None => {
            let default_path = get_config_path()?;
            if default_path.exists() {
                read_config_file(&default_path)?
            } else {
                tracing::debug!("No config file at {}, using defaults", default_path.display());
                Config::default()
            }
        }
    };

    let config = apply_env_overrides(config, |key| std::env::var(key).ok())?;
    finalize(config)
}

/// Parse configuration from TOML text without touching the environment
pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).context("Failed to parse config")?;
    finalize(config)
}

fn read_config_file(path: &Path) -> Result<Config> {
    let content =
        fs::read_to_string(path).context(format!("Failed to read config: {}", path.display()))?;

    toml::from_str(&content).context(format!("Failed to parse config: {}", path.display()))
}

/// Apply environment overrides using the given lookup function
///
/// Keys from the environment replace both inline keys and key paths.
pub fn apply_env_overrides<F>(mut config: Config, lookup: F) -> Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(pem) = lookup(ENV_PRIVATE_KEY) {
        tracing::debug!("Private key taken from {}", ENV_PRIVATE_KEY);
        config.private_key = Some(KeyMaterial::Pem(pem));
        config.private_key_path = None;
    }

    if let Some(pem) = lookup(ENV_PUBLIC_KEY) {
        tracing::debug!("Public key taken from {}", ENV_PUBLIC_KEY);
        config.public_key = Some(KeyMaterial::Pem(pem));
        config.public_key_path = None;
    }

    if let Some(alg) = lookup(ENV_SIGNING_ALGORITHM) {
        config.signing_algorithm = alg
            .parse()
            .map_err(|e: String| anyhow::anyhow!(e))
            .context(format!("Invalid {ENV_SIGNING_ALGORITHM}"))?;
    }

    if let Some(name) = lookup(ENV_COOKIE_NAME) {
        config.cookie.name = name;
    }

    Ok(config)
}

/// Read key files into key material, then validate
fn finalize(mut config: Config) -> Result<Config> {
    if let Err(errors) = config.validate() {
        anyhow::bail!("Config validation failed:\n  {}", errors.join("\n  "));
    }

    if let Some(path) = config.private_key_path.take() {
        let pem = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read private key from {}", path.display()))?;
        config.private_key = Some(KeyMaterial::Pem(pem));
    }

    if let Some(path) = config.public_key_path.take() {
        let pem = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read public key from {}", path.display()))?;
        config.public_key = Some(KeyMaterial::Pem(pem));
    }

    Ok(config)
}
