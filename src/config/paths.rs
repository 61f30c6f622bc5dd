//! Directory path management for keystamp

use anyhow::{Context, Result};
use std::path::PathBuf;

/// Get the base keystamp directory (~/.config/keystamp/)
pub fn get_keystamp_dir() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .context("Failed to get config directory")?
        .join("keystamp"))
}

/// Get the config file path (~/.config/keystamp/config.toml)
pub fn get_config_path() -> Result<PathBuf> {
    Ok(get_keystamp_dir()?.join("config.toml"))
}

/// Get the default keypair directory (~/.config/keystamp/keys/)
///
/// `generate-keypair` writes here unless told otherwise.
pub fn get_keys_dir() -> Result<PathBuf> {
    Ok(get_keystamp_dir()?.join("keys"))
}
