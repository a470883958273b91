/// Refresh Token Management
///
/// Refresh tokens are:
/// - 256 bits from the OS CSPRNG, hex-encoded for the client
/// - Stored only as HMAC-SHA256(refresh_secret, token), so a leaked table
///   holds no usable bearer values
/// - Not single-use: renewal looks up the newest valid row for the user and
///   leaves it in place, so concurrent renewals from one session all succeed
/// - Removed en masse on logout

use std::sync::Arc;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;

use crate::error::AuthError;
use crate::store::{RefreshTokenRecord, TokenStore};

type HmacSha256 = Hmac<Sha256>;

const TOKEN_BYTES: usize = 32;

/// A freshly issued refresh token, including its plaintext bearer value.
///
/// The plaintext exists only here and in the response to the client.
#[derive(Clone, PartialEq, Eq)]
pub struct RefreshToken {
    pub token: String,
    pub user_id: String,
    pub created_at: i64,
    pub expires_at: i64,
}

impl std::fmt::Debug for RefreshToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshToken")
            .field("user_id", &self.user_id)
            .field("created_at", &self.created_at)
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

pub struct RefreshTokenManager {
    secret: Vec<u8>,
    lifetime_seconds: i64,
    store: Arc<dyn TokenStore>,
}

impl RefreshTokenManager {
    pub fn new(
        secret: impl AsRef<[u8]>,
        lifetime_seconds: i64,
        store: Arc<dyn TokenStore>,
    ) -> Self {
        Self {
            secret: secret.as_ref().to_vec(),
            lifetime_seconds,
            store,
        }
    }

    /// Generate a new token for `user_id`. Does not persist it; call
    /// [`store`](Self::store) once the caller is ready to commit.
    pub fn issue(&self, user_id: &str, now: i64) -> RefreshToken {
        let mut bytes = [0u8; TOKEN_BYTES];
        OsRng.fill_bytes(&mut bytes);

        RefreshToken {
            token: hex::encode(bytes),
            user_id: user_id.to_string(),
            created_at: now,
            expires_at: now + self.lifetime_seconds,
        }
    }

    /// Persist the hash of `token` with its metadata.
    ///
    /// # Errors
    /// `StorageFailure` if the store rejects the write.
    pub async fn store(&self, token: &RefreshToken) -> Result<(), AuthError> {
        let record = RefreshTokenRecord {
            token_hash: self.hash_token(&token.token)?,
            user_id: token.user_id.clone(),
            expires_at: token.expires_at,
            created_at: token.created_at,
        };

        self.store.store_refresh_token(&record).await?;

        tracing::debug!(user_id = %token.user_id, expires_at = token.expires_at, "Refresh token stored");
        Ok(())
    }

    /// Newest unexpired token row for `user_id`.
    ///
    /// `Ok(None)` is the ordinary "no session to renew" outcome, not a fault.
    pub async fn find_valid(
        &self,
        user_id: &str,
        now: i64,
    ) -> Result<Option<RefreshTokenRecord>, AuthError> {
        Ok(self.store.find_valid_refresh_token(user_id, now).await?)
    }

    /// Remove every token of `user_id`. Revoking nothing is still success.
    pub async fn revoke_all(&self, user_id: &str) -> Result<(), AuthError> {
        let revoked = self.store.revoke_all_for_user(user_id).await?;

        tracing::info!(user_id = %user_id, revoked = revoked, "All refresh tokens revoked for user");
        Ok(())
    }

    /// HMAC-SHA256 of a bearer value under the refresh secret, base64url.
    pub fn hash_token(&self, token: &str) -> Result<String, AuthError> {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|e| AuthError::TokenEncoding(format!("HMAC key error: {e}")))?;
        mac.update(token.as_bytes());

        Ok(URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes()))
    }
}
