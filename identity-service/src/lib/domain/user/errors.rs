use thiserror::Error;

/// Error for Username validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UsernameError {
    #[error("Username too short: minimum {min} characters, got {actual}")]
    TooShort { min: usize, actual: usize },

    #[error("Username too long: maximum {max} characters, got {actual}")]
    TooLong { max: usize, actual: usize },

    #[error(
        "Username contains invalid characters (only alphanumeric, underscore, and hyphen allowed)"
    )]
    InvalidCharacters,
}

/// Error for profile field validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProfileError {
    #[error("{field} is required")]
    Missing { field: &'static str },

    #[error("{field} too long: maximum {max} characters")]
    TooLong { field: &'static str, max: usize },
}

/// Error for plaintext password validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PasswordError {
    #[error("Password is required")]
    Missing,
}

/// Error for role parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Unknown role: {0}")]
pub struct RoleError(pub String);

/// Top-level error for identity and session operations
#[derive(Debug, Clone, Error)]
pub enum UserError {
    // Value object validation errors (automatically converted via #[from])
    #[error("Invalid username: {0}")]
    InvalidUsername(#[from] UsernameError),

    #[error("Invalid profile: {0}")]
    InvalidProfile(#[from] ProfileError),

    #[error("Invalid password: {0}")]
    InvalidPassword(#[from] PasswordError),

    // Domain-level errors
    #[error("User not found: {0}")]
    NotFound(String),

    #[error("Username already exists: {0}")]
    DuplicateUsername(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    // Collaborator failures
    #[error("Password hashing error: {0}")]
    Hashing(#[from] auth::PasswordError),

    #[error("Token error: {0}")]
    Token(#[from] auth::JwtError),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<auth::AuthenticationError> for UserError {
    fn from(err: auth::AuthenticationError) -> Self {
        match err {
            auth::AuthenticationError::InvalidCredentials => UserError::InvalidCredentials,
            auth::AuthenticationError::PasswordError(e) => UserError::Hashing(e),
            auth::AuthenticationError::JwtError(e) => UserError::Token(e),
        }
    }
}
