//! Signed access tokens with delegation claims
//!
//! - [`Codec`] turns an [`AccessToken`] into a signed compact string and back,
//!   pinning a single RSA algorithm and reporting expiry separately from
//!   other rejections.
//! - [`Authenticator`] and [`RequestSession`] connect the codec to a web
//!   request: bearer header extraction, a read-only session cookie, and a
//!   pluggable [`Validator`].
//!
//! ```rust,no_run
//! use chrono::{Duration, Utc};
//! use keystamp::{AccessToken, Codec, config};
//!
//! # fn example() -> anyhow::Result<()> {
//! let config = config::load_config(None)?;
//! let codec = Codec::new(&config);
//!
//! let token = AccessToken::new("user-1", Utc::now() + Duration::hours(1)).with_scope("manage");
//! let signed = codec.serialize(&token)?;
//! let decoded = codec.decode_and_verify(&signed)?;
//! assert_eq!(decoded.subject(), Some("user-1"));
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod commands;
pub mod config;
pub mod error;
pub mod keys;
pub mod logging;
pub mod session;
pub mod token;
pub mod validator;

pub use codec::Codec;
pub use config::{Config, CookieOptions, KeyMaterial, SigningAlgorithm};
pub use error::{InvalidTokenKind, Result, SerializationError, TokenError};
pub use session::{Authenticator, CookieOverrides, READ_ONLY_SCOPE, RequestSession, bearer_token};
pub use token::AccessToken;
pub use validator::{ExpiryValidator, Validator};
