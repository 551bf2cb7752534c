use thiserror::Error;

/// Error type for password operations.
#[derive(Debug, Clone, Error)]
pub enum PasswordError {
    #[error("Invalid hashing parameters: {0}")]
    InvalidParameters(String),

    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    /// The stored digest is not a PHC string. Points at corrupted data, not at a wrong password.
    #[error("Stored password hash is malformed: {0}")]
    MalformedHash(String),
}
