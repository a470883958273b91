use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use uuid::Uuid;

use super::{Credential, CredentialStore, RefreshTokenRecord, TokenStore};
use crate::configuration::DatabaseSettings;
use crate::error::DatabaseError;

const SCHEMA: [&str; 3] = [
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id TEXT NOT NULL UNIQUE,
        email TEXT NOT NULL UNIQUE,
        username TEXT NOT NULL,
        password_hash TEXT NOT NULL,
        created_at INTEGER NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS refresh_tokens (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        token_hash TEXT NOT NULL UNIQUE,
        user_id TEXT NOT NULL,
        expires_at INTEGER NOT NULL,
        created_at INTEGER NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_refresh_tokens_user ON refresh_tokens (user_id, created_at)",
];

/// SQLite-backed credential and refresh-token storage.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub async fn connect(settings: &DatabaseSettings) -> Result<Self, DatabaseError> {
        let options = SqliteConnectOptions::new()
            .filename(&settings.sqlite_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(settings.max_connections)
            .connect_with(options)
            .await?;

        Self::with_pool(pool).await
    }

    /// Private in-memory database, kept alive by a single pinned connection.
    pub async fn in_memory() -> Result<Self, DatabaseError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        Self::with_pool(pool).await
    }

    async fn with_pool(pool: SqlitePool) -> Result<Self, DatabaseError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&pool).await?;
        }
        Ok(Self { pool })
    }
}

#[async_trait]
impl CredentialStore for SqliteStore {
    async fn get_by_email(&self, email: &str) -> Result<Option<Credential>, DatabaseError> {
        let credential = sqlx::query_as::<_, Credential>(
            r#"
            SELECT user_id, email, username, password_hash, created_at
            FROM users WHERE email = ?
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(credential)
    }

    async fn get_by_id(&self, user_id: &str) -> Result<Option<Credential>, DatabaseError> {
        let credential = sqlx::query_as::<_, Credential>(
            r#"
            SELECT user_id, email, username, password_hash, created_at
            FROM users WHERE user_id = ?
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(credential)
    }

    async fn insert(
        &self,
        email: &str,
        username: &str,
        password_hash: &str,
        created_at: i64,
    ) -> Result<Credential, DatabaseError> {
        let credential = Credential {
            user_id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            created_at,
        };

        sqlx::query(
            r#"
            INSERT INTO users (user_id, email, username, password_hash, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&credential.user_id)
        .bind(&credential.email)
        .bind(&credential.username)
        .bind(&credential.password_hash)
        .bind(credential.created_at)
        .execute(&self.pool)
        .await?;

        Ok(credential)
    }
}

#[async_trait]
impl TokenStore for SqliteStore {
    async fn store_refresh_token(&self, record: &RefreshTokenRecord) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (token_hash, user_id, expires_at, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&record.token_hash)
        .bind(&record.user_id)
        .bind(record.expires_at)
        .bind(record.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_valid_refresh_token(
        &self,
        user_id: &str,
        now: i64,
    ) -> Result<Option<RefreshTokenRecord>, DatabaseError> {
        let record = sqlx::query_as::<_, RefreshTokenRecord>(
            r#"
            SELECT token_hash, user_id, expires_at, created_at
            FROM refresh_tokens
            WHERE user_id = ? AND expires_at > ?
            ORDER BY created_at DESC, id DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn revoke_all_for_user(&self, user_id: &str) -> Result<u64, DatabaseError> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(hash: &str, user_id: &str, created_at: i64, expires_at: i64) -> RefreshTokenRecord {
        RefreshTokenRecord {
            token_hash: hash.to_string(),
            user_id: user_id.to_string(),
            expires_at,
            created_at,
        }
    }

    #[tokio::test]
    async fn test_insert_and_fetch_credential() {
        let store = SqliteStore::in_memory().await.expect("Failed to open store");

        let created = store
            .insert("john@example.com", "john", "$2b$hash", 1_700_000_000)
            .await
            .expect("Failed to insert");

        let by_email = store.get_by_email("john@example.com").await.unwrap().unwrap();
        assert_eq!(by_email.user_id, created.user_id);
        assert_eq!(by_email.password_hash, "$2b$hash");
        assert_eq!(by_email.created_at, 1_700_000_000);

        let by_id = store.get_by_id(&created.user_id).await.unwrap().unwrap();
        assert_eq!(by_id.email, "john@example.com");

        assert!(store.get_by_email("nobody@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_is_rejected() {
        let store = SqliteStore::in_memory().await.unwrap();
        store.insert("john@example.com", "john", "h", 1).await.unwrap();

        let result = store.insert("john@example.com", "other", "h", 2).await;
        assert!(matches!(result, Err(DatabaseError::UniqueConstraintViolation(_))));
    }

    #[tokio::test]
    async fn test_find_valid_picks_newest_unexpired() {
        let store = SqliteStore::in_memory().await.unwrap();

        store.store_refresh_token(&record("old", "u1", 100, 10_000)).await.unwrap();
        store.store_refresh_token(&record("new", "u1", 200, 10_000)).await.unwrap();
        store.store_refresh_token(&record("expired", "u1", 300, 400)).await.unwrap();
        store.store_refresh_token(&record("other-user", "u2", 500, 10_000)).await.unwrap();

        let found = store.find_valid_refresh_token("u1", 1_000).await.unwrap().unwrap();
        assert_eq!(found.token_hash, "new");

        assert!(store.find_valid_refresh_token("u1", 10_000).await.unwrap().is_none());
        assert!(store.find_valid_refresh_token("u3", 0).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_same_second_ties_go_to_latest_insert() {
        let store = SqliteStore::in_memory().await.unwrap();

        store.store_refresh_token(&record("first", "u1", 100, 10_000)).await.unwrap();
        store.store_refresh_token(&record("second", "u1", 100, 10_000)).await.unwrap();

        let found = store.find_valid_refresh_token("u1", 100).await.unwrap().unwrap();
        assert_eq!(found.token_hash, "second");
    }

    #[tokio::test]
    async fn test_revoke_all_is_idempotent() {
        let store = SqliteStore::in_memory().await.unwrap();
        store.store_refresh_token(&record("a", "u1", 100, 10_000)).await.unwrap();
        store.store_refresh_token(&record("b", "u1", 101, 10_000)).await.unwrap();
        store.store_refresh_token(&record("c", "u2", 101, 10_000)).await.unwrap();

        assert_eq!(store.revoke_all_for_user("u1").await.unwrap(), 2);
        assert_eq!(store.revoke_all_for_user("u1").await.unwrap(), 0);

        assert!(store.find_valid_refresh_token("u1", 0).await.unwrap().is_none());
        assert!(store.find_valid_refresh_token("u2", 0).await.unwrap().is_some());
    }
}
