//! Configuration schema for keystamp
//!
//! `Config` is built once (from a file, the environment or in code) and then
//! shared read-only by the codec and the session adapter. Changing settings
//! means building a new value, never mutating a shared one.

use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Default name of the session cookie
pub const DEFAULT_COOKIE_NAME: &str = "keystamp_session";

/// Main configuration structure
///
/// All fields use #[serde(default)] so partial files are accepted.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Algorithm used to sign, and the only one accepted on verification
    #[serde(default)]
    pub signing_algorithm: SigningAlgorithm,

    /// RSA private key used for signing
    #[serde(default)]
    pub private_key: Option<KeyMaterial>,

    /// RSA public key used for verification when no private key is set
    #[serde(default)]
    pub public_key: Option<KeyMaterial>,

    /// PEM file to read `private_key` from (resolved by the loader)
    #[serde(default)]
    pub private_key_path: Option<PathBuf>,

    /// PEM file to read `public_key` from (resolved by the loader)
    #[serde(default)]
    pub public_key_path: Option<PathBuf>,

    /// Clock skew tolerated when checking `exp`, in seconds
    #[serde(default)]
    pub leeway_seconds: u64,

    /// Session and shared cookie settings
    #[serde(default)]
    pub cookie: CookieOptions,
}

impl Config {
    /// Start from defaults with the given private key
    pub fn with_private_key(mut self, key: impl Into<KeyMaterial>) -> Self {
        self.private_key = Some(key.into());
        self
    }

    pub fn with_public_key(mut self, key: impl Into<KeyMaterial>) -> Self {
        self.public_key = Some(key.into());
        self
    }

    pub fn with_algorithm(mut self, algorithm: SigningAlgorithm) -> Self {
        self.signing_algorithm = algorithm;
        self
    }

    pub fn with_cookie(mut self, cookie: CookieOptions) -> Self {
        self.cookie = cookie;
        self
    }

    /// Validate the configuration for common errors
    ///
    /// Returns Ok(()) if valid, or Err with a list of error messages
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.private_key.is_some() && self.private_key_path.is_some() {
            errors.push("Set either private_key or private_key_path, not both".to_string());
        }
        if self.public_key.is_some() && self.public_key_path.is_some() {
            errors.push("Set either public_key or public_key_path, not both".to_string());
        }
        if self.cookie.name.trim().is_empty() {
            errors.push("cookie.name must not be empty".to_string());
        }
        if let Some(domain) = &self.cookie.domain
            && domain.trim().is_empty()
        {
            errors.push("cookie.domain must not be empty when set".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Supported RSA signature schemes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum SigningAlgorithm {
    #[default]
    RS512,
    RS256,
}

impl SigningAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RS512 => "RS512",
            Self::RS256 => "RS256",
        }
    }
}

impl From<SigningAlgorithm> for jsonwebtoken::Algorithm {
    fn from(alg: SigningAlgorithm) -> Self {
        match alg {
            SigningAlgorithm::RS512 => jsonwebtoken::Algorithm::RS512,
            SigningAlgorithm::RS256 => jsonwebtoken::Algorithm::RS256,
        }
    }
}

impl FromStr for SigningAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "RS512" => Ok(Self::RS512),
            "RS256" => Ok(Self::RS256),
            other => Err(format!(
                "Unsupported signing algorithm '{other}'. Expected RS512 or RS256"
            )),
        }
    }
}

impl fmt::Display for SigningAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// RSA key material, PEM text or raw DER bytes
///
/// Files and the environment only ever carry PEM; DER is for keys handed
/// over in code.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum KeyMaterial {
    Pem(String),
    Der(Vec<u8>),
}

impl From<String> for KeyMaterial {
    fn from(pem: String) -> Self {
        Self::Pem(pem)
    }
}

impl From<&str> for KeyMaterial {
    fn from(pem: &str) -> Self {
        Self::Pem(pem.to_string())
    }
}

impl From<Vec<u8>> for KeyMaterial {
    fn from(der: Vec<u8>) -> Self {
        Self::Der(der)
    }
}

// Never print key material
impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pem(pem) => write!(f, "KeyMaterial::Pem({} bytes)", pem.len()),
            Self::Der(der) => write!(f, "KeyMaterial::Der({} bytes)", der.len()),
        }
    }
}

/// Attributes applied to every cookie the session adapter writes
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CookieOptions {
    /// Name of the cookie holding the session token
    #[serde(default = "default_cookie_name")]
    pub name: String,

    /// Cookie domain; `None` scopes cookies to the request host
    #[serde(default)]
    pub domain: Option<String>,

    #[serde(default = "default_true")]
    pub secure: bool,

    #[serde(default = "default_true")]
    pub http_only: bool,

    #[serde(default = "default_path")]
    pub path: String,

    #[serde(default)]
    pub same_site: Option<SameSitePolicy>,
}

impl Default for CookieOptions {
    fn default() -> Self {
        Self {
            name: default_cookie_name(),
            domain: None,
            secure: true,
            http_only: true,
            path: default_path(),
            same_site: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SameSitePolicy {
    Strict,
    Lax,
    None,
}

impl From<SameSitePolicy> for cookie::SameSite {
    fn from(policy: SameSitePolicy) -> Self {
        match policy {
            SameSitePolicy::Strict => cookie::SameSite::Strict,
            SameSitePolicy::Lax => cookie::SameSite::Lax,
            SameSitePolicy::None => cookie::SameSite::None,
        }
    }
}

fn default_cookie_name() -> String {
    DEFAULT_COOKIE_NAME.to_string()
}

fn default_path() -> String {
    "/".to_string()
}

fn default_true() -> bool {
    true
}
