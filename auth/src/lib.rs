//! Authentication primitives for the identity service.
//!
//! - Password hashing (Argon2id)
//! - Signed, stateless session tokens (HS256 JWT)
//! - An [`Authenticator`] that pairs the two
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &hash).unwrap());
//! assert!(!hasher.verify("other_password", &hash).unwrap());
//! ```
//!
//! ## Session Tokens
//! ```
//! use auth::{JwtHandler, SigningKey};
//! use chrono::Duration;
//!
//! // The secret arrives base64-encoded from configuration.
//! let key = SigningKey::from_base64("c2VjcmV0X2tleV9hdF9sZWFzdF8zMl9ieXRlc19sb25nIQ==").unwrap();
//! let handler = JwtHandler::new(&key, Duration::hours(24)).unwrap();
//!
//! let token = handler.issue("alice").unwrap();
//! assert_eq!(handler.subject_of(&token).unwrap(), "alice");
//! assert!(handler.is_valid(&token, "alice"));
//! assert!(!handler.is_valid(&token, "bob"));
//! ```
//!
//! ## Short keys are refused
//! ```
//! use auth::{JwtError, SigningKey};
//!
//! let result = SigningKey::from_base64("c2hvcnQ=");
//! assert!(matches!(result, Err(JwtError::InvalidKey(_))));
//! ```

pub mod authenticator;
pub mod jwt;
pub mod password;

// Re-export commonly used items
pub use authenticator::AuthenticationError;
pub use authenticator::Authenticator;
pub use jwt::Claims;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use jwt::SigningKey;
pub use password::PasswordError;
pub use password::PasswordHasher;
