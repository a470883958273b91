/// Persistence collaborators for the session core.
///
/// The authenticator only ever talks to these traits; the SQL engine behind
/// them is chosen from configuration at startup.

mod postgres;
mod sqlite;

pub use postgres::PostgresStore;
pub use sqlite::SqliteStore;

use std::sync::Arc;

use async_trait::async_trait;

use crate::configuration::{DatabaseKind, DatabaseSettings};
use crate::error::DatabaseError;

/// A user's identity record.
#[derive(Clone, sqlx::FromRow)]
pub struct Credential {
    pub user_id: String,
    pub email: String,
    pub username: String,
    /// Salted + peppered hash; never leaves the server
    pub password_hash: String,
    /// Unix seconds
    pub created_at: i64,
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("user_id", &self.user_id)
            .field("email", &self.email)
            .field("username", &self.username)
            .field("created_at", &self.created_at)
            .finish_non_exhaustive()
    }
}

/// A persisted refresh token. Only the HMAC of the bearer value is stored.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct RefreshTokenRecord {
    pub token_hash: String,
    pub user_id: String,
    /// Unix seconds
    pub expires_at: i64,
    /// Unix seconds
    pub created_at: i64,
}

#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn get_by_email(&self, email: &str) -> Result<Option<Credential>, DatabaseError>;

    async fn get_by_id(&self, user_id: &str) -> Result<Option<Credential>, DatabaseError>;

    /// Create a user with a fresh UUID, stamped with `created_at`.
    ///
    /// # Errors
    /// `UniqueConstraintViolation` if the email is already registered.
    async fn insert(
        &self,
        email: &str,
        username: &str,
        password_hash: &str,
        created_at: i64,
    ) -> Result<Credential, DatabaseError>;
}

#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn store_refresh_token(&self, record: &RefreshTokenRecord) -> Result<(), DatabaseError>;

    /// Newest token for `user_id` with `expires_at > now`, if any.
    async fn find_valid_refresh_token(
        &self,
        user_id: &str,
        now: i64,
    ) -> Result<Option<RefreshTokenRecord>, DatabaseError>;

    /// Delete every refresh token of `user_id`; returns how many were removed.
    async fn revoke_all_for_user(&self, user_id: &str) -> Result<u64, DatabaseError>;
}

/// The two collaborators, usually backed by the same database.
#[derive(Clone)]
pub struct Stores {
    pub credentials: Arc<dyn CredentialStore>,
    pub tokens: Arc<dyn TokenStore>,
}

impl Stores {
    pub fn from_backend<S>(backend: S) -> Self
    where
        S: CredentialStore + TokenStore + 'static,
    {
        let backend = Arc::new(backend);
        Self {
            credentials: backend.clone(),
            tokens: backend,
        }
    }
}

/// Open the configured backend and make sure its schema exists.
pub async fn connect(settings: &DatabaseSettings) -> Result<Stores, DatabaseError> {
    let stores = match settings.kind {
        DatabaseKind::Sqlite => Stores::from_backend(SqliteStore::connect(settings).await?),
        DatabaseKind::Postgres => Stores::from_backend(PostgresStore::connect(settings).await?),
    };

    tracing::info!(backend = ?settings.kind, "Database connection pool created");
    Ok(stores)
}
