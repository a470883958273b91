/// Access token payload
///
/// The claims carried inside a signed access token. Never persisted; it
/// lives only inside the token string and the request being processed.

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct AccessTokenPayload {
    /// Subject (user ID)
    #[serde(rename = "sub")]
    pub subject: String,
    /// Issued at (Unix seconds)
    #[serde(rename = "iat")]
    pub issued_at: i64,
    /// Expiration time (Unix seconds)
    #[serde(rename = "exp")]
    pub expires_at: i64,
}

impl AccessTokenPayload {
    /// Mint a payload for `subject` valid for `lifetime_seconds` from `now`.
    ///
    /// `lifetime_seconds` must be positive so that `expires_at > issued_at`.
    pub fn new(subject: impl Into<String>, now: i64, lifetime_seconds: i64) -> Self {
        Self {
            subject: subject.into(),
            issued_at: now,
            expires_at: now + lifetime_seconds,
        }
    }

    pub fn is_expired_at(&self, now: i64) -> bool {
        now > self.expires_at
    }
}
