use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use super::errors::JwtError;

/// Symmetric HS256 signing secret.
///
/// Length is checked on construction so a weak key stops the process at
/// startup rather than surfacing on the first request.
#[derive(Clone)]
pub struct SigningKey(Vec<u8>);

impl SigningKey {
    /// HS256 needs at least 256 bits of key material.
    pub const MIN_LENGTH: usize = 32;

    /// Decode a standard-alphabet base64 secret.
    ///
    /// # Errors
    /// * `InvalidKey` - Not valid base64, or decodes to fewer than 32 bytes
    pub fn from_base64(encoded: &str) -> Result<Self, JwtError> {
        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|e| JwtError::InvalidKey(format!("not valid base64: {}", e)))?;

        Self::from_bytes(bytes)
    }

    /// Wrap raw key bytes.
    ///
    /// # Errors
    /// * `InvalidKey` - Fewer than 32 bytes
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Result<Self, JwtError> {
        let bytes = bytes.into();
        if bytes.len() < Self::MIN_LENGTH {
            return Err(JwtError::InvalidKey(format!(
                "key is {} bits, HS256 requires at least {} bits",
                bytes.len() * 8,
                Self::MIN_LENGTH * 8
            )));
        }

        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey")
            .field("length", &self.0.len())
            .finish_non_exhaustive()
    }
}
