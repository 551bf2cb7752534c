use thiserror::Error;

/// Error type for signing key and token operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum JwtError {
    /// Startup-time failure: the configured key cannot be used for HS256.
    #[error("Invalid signing key: {0}")]
    InvalidKey(String),

    #[error("Invalid token expiration: {0}")]
    InvalidExpiration(String),

    #[error("Failed to encode token: {0}")]
    EncodingFailed(String),

    #[error("Token is malformed: {0}")]
    Malformed(String),

    #[error("Token signature is invalid")]
    InvalidSignature,

    #[error("Token is expired")]
    Expired,

    #[error("Missing required claim: {0}")]
    MissingClaim(String),
}
