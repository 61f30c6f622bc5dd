//! Compact token codec
//!
//! Maps `AccessToken` values to signed compact strings and back. The codec
//! is built once from a `Config`, holds parsed keys, and is shared read-only
//! across requests.

use crate::config::{Config, SigningAlgorithm};
use crate::error::{Result, SerializationError};
use crate::keys;
use crate::token::{AccessToken, claims};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fmt;

/// Signs and verifies access tokens with a single pinned algorithm
#[derive(Clone)]
pub struct Codec {
    algorithm: SigningAlgorithm,
    signing_key: Option<EncodingKey>,
    verification_key: Option<DecodingKey>,
    leeway_seconds: u64,
}

impl Codec {
    pub fn new(config: &Config) -> Self {
        let signing_key = config.private_key.as_ref().and_then(|material| {
            let key = keys::signing_key(material);
            if key.is_none() {
                tracing::warn!("Configured private key is not a usable RSA private key");
            }
            key
        });

        let verification_key =
            keys::verification_key(config.private_key.as_ref(), config.public_key.as_ref());
        if verification_key.is_none()
            && (config.private_key.is_some() || config.public_key.is_some())
        {
            tracing::warn!("No usable RSA public key could be derived from the configuration");
        }

        Self {
            algorithm: config.signing_algorithm,
            signing_key,
            verification_key,
            leeway_seconds: config.leeway_seconds,
        }
    }

    pub fn algorithm(&self) -> SigningAlgorithm {
        self.algorithm
    }

    pub fn can_sign(&self) -> bool {
        self.signing_key.is_some()
    }

    pub fn can_verify(&self) -> bool {
        self.verification_key.is_some()
    }

    /// Encode and sign a token
    ///
    /// A token decoded from a string and not modified since returns that
    /// string as is. Otherwise `subject` and `expires_at` must be set, and
    /// `expires_at` must not precede the Unix epoch.
    pub fn serialize(&self, token: &AccessToken) -> Result<String> {
        if let Some(raw) = token.raw() {
            return Ok(raw.to_string());
        }

        if token.subject().is_none() {
            return Err(SerializationError::MissingAttribute("subject").into());
        }
        match token.expires_at() {
            None => return Err(SerializationError::MissingAttribute("expires_at").into()),
            // A negative exp is rejected as malformed on decode, never as expired
            Some(expires_at) if expires_at.timestamp() < 0 => {
                return Err(SerializationError::PreEpochExpiry.into());
            }
            Some(_) => {}
        }

        let key = self
            .signing_key
            .as_ref()
            .ok_or(SerializationError::NoSigningKey)?;

        let claims = claims::to_wire(token);
        let header = Header::new(self.algorithm.into());

        encode(&header, &claims, key).map_err(|e| {
            tracing::debug!("Signing with {} failed: {e}", self.algorithm);
            SerializationError::InvalidKeyOrAlgorithm.into()
        })
    }

    /// Verify a signed compact string and rebuild the token it carries
    ///
    /// The header algorithm must equal the configured one. An elapsed `exp`
    /// is reported as `ExpiredToken`, every other rejection as `InvalidToken`.
    pub fn decode_and_verify(&self, raw: &str) -> Result<AccessToken> {
        let key = self
            .verification_key
            .as_ref()
            .ok_or(SerializationError::NoVerificationKey)?;

        let data = decode::<Map<String, Value>>(raw, key, &self.validation()).map_err(|e| {
            tracing::debug!("Rejected access token: {e}");
            e
        })?;

        let mut token = claims::from_wire(data.claims)?;
        token.raw = Some(raw.to_string());
        Ok(token)
    }

    fn validation(&self) -> Validation {
        // Validation::new pins the accepted algorithms to exactly this one
        let mut validation = Validation::new(self.algorithm.into());
        validation.leeway = self.leeway_seconds;
        validation.validate_exp = true;
        // exp is checked when present; a token without one decodes and is
        // left to the validator
        validation.required_spec_claims = HashSet::new();
        // aud is an ordinary pass-through claim here
        validation.validate_aud = false;
        validation
    }
}

impl fmt::Debug for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Codec")
            .field("algorithm", &self.algorithm)
            .field("can_sign", &self.can_sign())
            .field("can_verify", &self.can_verify())
            .field("leeway_seconds", &self.leeway_seconds)
            .finish()
    }
}
