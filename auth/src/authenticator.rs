use crate::jwt::JwtError;
use crate::jwt::JwtHandler;
use crate::password::PasswordError;
use crate::password::PasswordHasher;

/// Pairs password hashing with token issuance.
///
/// Built once at startup from an already validated [`JwtHandler`] and shared
/// by every request handler.
pub struct Authenticator {
    password_hasher: PasswordHasher,
    jwt_handler: JwtHandler,
}

/// Authentication operation errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password error: {0}")]
    PasswordError(#[from] PasswordError),

    #[error("JWT error: {0}")]
    JwtError(#[from] JwtError),
}

impl Authenticator {
    /// Create an authenticator with the default password hasher.
    pub fn new(jwt_handler: JwtHandler) -> Self {
        Self {
            password_hasher: PasswordHasher::new(),
            jwt_handler,
        }
    }

    /// Replace the password hasher (e.g. to tune Argon2 cost).
    pub fn with_password_hasher(mut self, password_hasher: PasswordHasher) -> Self {
        self.password_hasher = password_hasher;
        self
    }

    /// Hash a password for storage.
    ///
    /// # Errors
    /// * `PasswordError` - Hashing operation failed
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Check a plaintext password against a stored digest.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Password does not match
    /// * `PasswordError` - Stored digest is unusable
    pub fn verify_password(
        &self,
        password: &str,
        stored_hash: &str,
    ) -> Result<(), AuthenticationError> {
        if self.password_hasher.verify(password, stored_hash)? {
            Ok(())
        } else {
            Err(AuthenticationError::InvalidCredentials)
        }
    }

    /// Issue a session token for `subject`.
    pub fn issue_token(&self, subject: &str) -> Result<String, JwtError> {
        self.jwt_handler.issue(subject)
    }

    /// The token codec, for request-time verification.
    pub fn jwt(&self) -> &JwtHandler {
        &self.jwt_handler
    }
}
