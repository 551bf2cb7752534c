use std::collections::HashMap;

use chrono::DateTime;
use chrono::Duration;
use chrono::SubsecRound;
use chrono::Utc;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;

use super::claims::Claims;
use super::errors::JwtError;
use super::key::SigningKey;

/// Issues and verifies HS256 session tokens.
///
/// Owns the signing key and the expiry policy. All state is immutable after
/// construction; share it behind an `Arc`.
pub struct JwtHandler {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    expiration: Duration,
}

impl JwtHandler {
    const ALGORITHM: Algorithm = Algorithm::HS256;

    /// Create a handler that signs with `key` and issues tokens valid for `expiration`.
    ///
    /// Timestamps have second resolution, so `expiration` is truncated to whole seconds.
    ///
    /// # Errors
    /// * `InvalidExpiration` - Expiration shorter than one second
    pub fn new(key: &SigningKey, expiration: Duration) -> Result<Self, JwtError> {
        let seconds = expiration.num_seconds();
        if seconds < 1 {
            return Err(JwtError::InvalidExpiration(format!(
                "expiration must be at least one second, got {} ms",
                expiration.num_milliseconds()
            )));
        }

        // Expiry is checked against the caller's clock in `parse_at`, with no leeway.
        let mut validation = Validation::new(Self::ALGORITHM);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        Ok(Self {
            encoding_key: EncodingKey::from_secret(key.as_bytes()),
            decoding_key: DecodingKey::from_secret(key.as_bytes()),
            validation,
            expiration: Duration::seconds(seconds),
        })
    }

    pub fn expiration(&self) -> Duration {
        self.expiration
    }

    /// Issue a token for `subject` with no extra claims.
    pub fn issue(&self, subject: &str) -> Result<String, JwtError> {
        self.issue_with_claims(subject, HashMap::new())
    }

    /// Issue a token for `subject` carrying `extra` alongside the registered claims.
    pub fn issue_with_claims(
        &self,
        subject: &str,
        extra: HashMap<String, serde_json::Value>,
    ) -> Result<String, JwtError> {
        self.issue_at(subject, extra, Utc::now())
    }

    /// Issue a token as if the current time were `now`.
    ///
    /// # Errors
    /// * `MissingClaim` - Subject is empty
    /// * `InvalidExpiration` - `now` plus the expiration overflows
    /// * `EncodingFailed` - Serialization or signing failed
    pub fn issue_at(
        &self,
        subject: &str,
        extra: HashMap<String, serde_json::Value>,
        now: DateTime<Utc>,
    ) -> Result<String, JwtError> {
        if subject.is_empty() {
            return Err(JwtError::MissingClaim("sub".to_string()));
        }

        let issued_at = now.trunc_subsecs(0);
        let expires_at = issued_at
            .checked_add_signed(self.expiration)
            .ok_or_else(|| {
                JwtError::InvalidExpiration("expiry is outside the representable range".to_string())
            })?;
        let claims = Claims::new(subject, issued_at, expires_at, extra);

        encode(&Header::new(Self::ALGORITHM), &claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingFailed(e.to_string()))
    }

    /// Verify a token and return its claims.
    pub fn parse(&self, token: &str) -> Result<Claims, JwtError> {
        self.parse_at(token, Utc::now())
    }

    /// Verify a token as of `now`.
    ///
    /// # Errors
    /// * `InvalidSignature` - Signature does not match the signing key
    /// * `Malformed` - Not a compact JWS, or the payload lacks `sub`/`iat`/`exp`
    /// * `Expired` - `now` is at or past `exp`
    pub fn parse_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, JwtError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                    JwtError::InvalidSignature
                }
                ErrorKind::ExpiredSignature => JwtError::Expired,
                _ => JwtError::Malformed(e.to_string()),
            })?;

        if token_data.claims.is_expired(now) {
            return Err(JwtError::Expired);
        }

        Ok(token_data.claims)
    }

    /// Extract the verified subject of a token.
    pub fn subject_of(&self, token: &str) -> Result<String, JwtError> {
        self.parse(token).map(|claims| claims.sub)
    }

    /// True iff the token verifies, is unexpired, and names `expected_subject`.
    ///
    /// Never fails: every parse error reads as "not valid".
    pub fn is_valid(&self, token: &str, expected_subject: &str) -> bool {
        self.is_valid_at(token, expected_subject, Utc::now())
    }

    pub fn is_valid_at(&self, token: &str, expected_subject: &str, now: DateTime<Utc>) -> bool {
        self.parse_at(token, now)
            .map(|claims| claims.sub == expected_subject)
            .unwrap_or(false)
    }
}
