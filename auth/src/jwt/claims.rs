use std::collections::HashMap;

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Registered claim names the codec always sets itself.
pub const RESERVED_CLAIMS: [&str; 3] = ["sub", "iat", "exp"];

/// Session token payload.
///
/// `iat` and `exp` are NumericDate values (whole seconds since the epoch).
/// Any additional claims are flattened into the same JSON object.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// Subject: the username the token was issued to
    pub sub: String,

    /// Issued at
    pub iat: i64,

    /// Expiration
    pub exp: i64,

    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl Claims {
    /// Build claims for `subject`, valid from `issued_at` until `expires_at`.
    ///
    /// Entries of `extra` named like a registered claim are dropped.
    pub fn new(
        subject: impl ToString,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
        mut extra: HashMap<String, serde_json::Value>,
    ) -> Self {
        extra.retain(|key, _| !RESERVED_CLAIMS.contains(&key.as_str()));

        Self {
            sub: subject.to_string(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
            extra,
        }
    }

    /// Check if the token is expired at `now`.
    ///
    /// The expiry instant itself already counts as expired.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }
}
