use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use uuid::Uuid;

use super::{Credential, CredentialStore, RefreshTokenRecord, TokenStore};
use crate::configuration::DatabaseSettings;
use crate::error::DatabaseError;

const SCHEMA: [&str; 3] = [
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id BIGSERIAL PRIMARY KEY,
        user_id TEXT NOT NULL UNIQUE,
        email TEXT NOT NULL UNIQUE,
        username TEXT NOT NULL,
        password_hash TEXT NOT NULL,
        created_at BIGINT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS refresh_tokens (
        id BIGSERIAL PRIMARY KEY,
        token_hash TEXT NOT NULL UNIQUE,
        user_id TEXT NOT NULL,
        expires_at BIGINT NOT NULL,
        created_at BIGINT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_refresh_tokens_user ON refresh_tokens (user_id, created_at)",
];

/// Postgres-backed credential and refresh-token storage.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub async fn connect(settings: &DatabaseSettings) -> Result<Self, DatabaseError> {
        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .connect(&settings.connection_string())
            .await?;

        Self::with_pool(pool).await
    }

    pub async fn with_pool(pool: PgPool) -> Result<Self, DatabaseError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&pool).await?;
        }
        Ok(Self { pool })
    }
}

#[async_trait]
impl CredentialStore for PostgresStore {
    async fn get_by_email(&self, email: &str) -> Result<Option<Credential>, DatabaseError> {
        let credential = sqlx::query_as::<_, Credential>(
            r#"
            SELECT user_id, email, username, password_hash, created_at
            FROM users WHERE email = $1
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
            FROM users WHERE user_id = $1
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
            VALUES ($1, $2, $3, $4, $5)
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
impl TokenStore for PostgresStore {
    async fn store_refresh_token(&self, record: &RefreshTokenRecord) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (token_hash, user_id, expires_at, created_at)
            VALUES ($1, $2, $3, $4)
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
            WHERE user_id = $1 AND expires_at > $2
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
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
