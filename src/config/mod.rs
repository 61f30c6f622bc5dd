//! Configuration for keystamp
//!
//! ## Architecture
//!
//! - `schema` - Configuration data structures
//! - `io` - Loading from TOML and the environment
//! - `paths` - Default directory layout
//!
//! ## Usage
//!
//! ```rust,no_run
//! use keystamp::config;
//!
//! # fn example() -> anyhow::Result<()> {
//! // Default file location plus KEYSTAMP_* environment overrides
//! let config = config::load_config(None)?;
//! println!("signing with {}", config.signing_algorithm);
//! # Ok(())
//! # }
//! ```

pub mod io;
pub mod paths;
pub mod schema;

pub use io::{apply_env_overrides, load_config, parse_config};
pub use paths::{get_config_path, get_keys_dir, get_keystamp_dir};
pub use schema::{
    Config, CookieOptions, DEFAULT_COOKIE_NAME, KeyMaterial, SameSitePolicy, SigningAlgorithm,
};
