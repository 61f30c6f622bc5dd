//! Error types for access token encoding, decoding and validation

use thiserror::Error;

/// Result type alias for token operations
pub type Result<T> = std::result::Result<T, TokenError>;

/// Errors raised by the codec and the session adapter
#[derive(Error, Debug)]
pub enum TokenError {
    /// The token could not be encoded, or no key is available to verify it
    #[error(transparent)]
    Serialization(#[from] SerializationError),

    /// Signature, structure, algorithm or validator check failed
    #[error("Invalid access token: {0}")]
    InvalidToken(InvalidTokenKind),

    /// Signature is fine but the `exp` claim is in the past
    #[error("Access token has expired")]
    ExpiredToken,

    /// Lookup of a name that is neither a declared field nor an extra attribute
    #[error("No such attribute: {0}")]
    UnknownAttribute(String),

    /// Attempt to store a reserved claim name in the extra attribute bag
    #[error("Reserved attribute cannot be set as an extra claim: {0}")]
    ReservedAttribute(String),
}

/// Failures on the encode path, plus a missing verification key on decode
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SerializationError {
    #[error("Missing attribute: {0}")]
    MissingAttribute(&'static str),

    #[error("Expiry before the Unix epoch cannot be encoded")]
    PreEpochExpiry,

    #[error("No private key configured")]
    NoSigningKey,

    #[error("No public key configured")]
    NoVerificationKey,

    #[error("Invalid private key or signing algorithm")]
    InvalidKeyOrAlgorithm,
}

/// Why a token was rejected as invalid
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidTokenKind {
    /// Not a well-formed compact token, or claims of the wrong shape
    Malformed(String),
    /// Signature does not match the configured public key
    Signature,
    /// Header algorithm differs from the configured one
    Algorithm,
    /// Actor claims nested deeper than the decoder accepts
    ActorDepth,
    /// The configured validator returned false or failed
    RejectedByValidator,
}

impl std::fmt::Display for InvalidTokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed(msg) => write!(f, "malformed token ({msg})"),
            Self::Signature => write!(f, "signature verification failed"),
            Self::Algorithm => write!(f, "unexpected signing algorithm"),
            Self::ActorDepth => write!(f, "actor claims nested too deeply"),
            Self::RejectedByValidator => write!(f, "rejected by validator"),
        }
    }
}

impl TokenError {
    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        Self::InvalidToken(InvalidTokenKind::Malformed(msg.into()))
    }

    /// True for the errors a caller should answer with "please sign in again"
    pub fn is_expired(&self) -> bool {
        matches!(self, Self::ExpiredToken)
    }
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::ExpiredSignature => Self::ExpiredToken,
            ErrorKind::InvalidSignature => Self::InvalidToken(InvalidTokenKind::Signature),
            ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
                Self::InvalidToken(InvalidTokenKind::Algorithm)
            }
            _ => Self::malformed(err.to_string()),
        }
    }
}
