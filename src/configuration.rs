use crate::auth::password::BCRYPT_MAX_INPUT;
use crate::error::ConfigError;

const MIN_PASSWORD_ROOM: usize = 8;

#[derive(serde::Deserialize, Clone, Debug)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub application: ApplicationSettings,
    pub auth: AuthSettings,
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct ApplicationSettings {
    pub host: String,
    pub port: u16,
    /// Directory holding the entry page and `/assets`
    pub static_dir: String,
}

#[derive(serde::Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseKind {
    Sqlite,
    Postgres,
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct DatabaseSettings {
    pub kind: DatabaseKind,
    pub sqlite_path: String,
    pub username: String,
    pub password: String,
    pub port: u16,
    pub host: String,
    pub database_name: String,
    pub max_connections: u32,
}

impl DatabaseSettings {
    pub fn connection_string(&self) -> String {
        match self.kind {
            DatabaseKind::Sqlite => format!("sqlite://{}", self.sqlite_path),
            DatabaseKind::Postgres => format!(
                "postgres://{}:{}@{}:{}/{}",
                self.username, self.password, self.host, self.port, self.database_name
            ),
        }
    }
}

/// Session authentication settings.
///
/// Read once at startup and handed to the authenticator by value; nothing
/// mutates it afterwards.
#[derive(serde::Deserialize, Clone)]
pub struct AuthSettings {
    pub jwt_secret: String,
    pub refresh_secret: String,
    pub pepper: String,
    pub access_token_expiry: i64,  // seconds (e.g., 86400 for 24 hours)
    pub refresh_token_expiry: i64, // seconds (e.g., 604800 for 7 days)
    pub bcrypt_cost: u32,
    /// Paths (and everything below them) served without a session
    pub public_paths: Vec<String>,
    /// Requests under this prefix get 401 instead of a redirect
    pub api_prefix: String,
    /// Where rejected page requests are sent
    pub login_path: String,
    /// Renew sessions from the subject of an expired token even when its
    /// signature does not verify. Off: the expired token must still be one
    /// this server signed.
    ///
    /// Defaults to off, which is stricter than plain subject-hint renewal:
    /// a token failing its signature check is rejected before refresh
    /// storage is consulted. Set to true for the permissive behaviour.
    pub refresh_trusts_unverified_subject: bool,
}

// Secrets stay out of debug output.
impl std::fmt::Debug for AuthSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSettings")
            .field("access_token_expiry", &self.access_token_expiry)
            .field("refresh_token_expiry", &self.refresh_token_expiry)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("public_paths", &self.public_paths)
            .field("api_prefix", &self.api_prefix)
            .field("login_path", &self.login_path)
            .field(
                "refresh_trusts_unverified_subject",
                &self.refresh_trusts_unverified_subject,
            )
            .finish_non_exhaustive()
    }
}

impl AuthSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("auth.jwt_secret", &self.jwt_secret),
            ("auth.refresh_secret", &self.refresh_secret),
            ("auth.pepper", &self.pepper),
        ] {
            if value.is_empty() {
                return Err(ConfigError::MissingRequired(name.to_string()));
            }
        }

        if self.access_token_expiry <= 0 || self.refresh_token_expiry <= 0 {
            return Err(ConfigError::InvalidValue(
                "token lifetimes must be positive".to_string(),
            ));
        }

        if self.access_token_expiry >= self.refresh_token_expiry {
            return Err(ConfigError::InvalidValue(
                "access_token_expiry must be shorter than refresh_token_expiry".to_string(),
            ));
        }

        // bcrypt hashes 72 bytes of `password || pepper`; leave room for a
        // minimum-length password
        if self.pepper.len() + MIN_PASSWORD_ROOM > BCRYPT_MAX_INPUT {
            return Err(ConfigError::InvalidValue(format!(
                "pepper must be at most {} bytes",
                BCRYPT_MAX_INPUT - MIN_PASSWORD_ROOM
            )));
        }

        if !(4..=31).contains(&self.bcrypt_cost) {
            return Err(ConfigError::InvalidValue(format!(
                "bcrypt_cost {} outside 4..=31",
                self.bcrypt_cost
            )));
        }

        Ok(())
    }
}

pub fn get_configuration() -> Result<Settings, ConfigError> {
    let settings = config::Config::builder()
        .set_default("application.host", "127.0.0.1")?
        .set_default("application.port", 8000)?
        .set_default("application.static_dir", "./static")?
        .set_default("database.kind", "sqlite")?
        .set_default("database.sqlite_path", "app.db")?
        .set_default("database.username", "postgres")?
        .set_default("database.password", "")?
        .set_default("database.port", 5432)?
        .set_default("database.host", "localhost")?
        .set_default("database.database_name", "gatehouse")?
        .set_default("database.max_connections", 5)?
        .set_default("auth.jwt_secret", "")?
        .set_default("auth.refresh_secret", "")?
        .set_default("auth.pepper", "")?
        .set_default("auth.access_token_expiry", 86_400)?
        .set_default("auth.refresh_token_expiry", 604_800)?
        .set_default("auth.bcrypt_cost", 12)?
        .set_default(
            "auth.public_paths",
            vec!["/", "/assets", "/health_check", "/api/signup", "/api/login"],
        )?
        .set_default("auth.api_prefix", "/api")?
        .set_default("auth.login_path", "/")?
        .set_default("auth.refresh_trusts_unverified_subject", false)?
        .add_source(config::File::with_name("configuration").required(false))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let settings = settings.try_deserialize::<Settings>()?;
    settings.auth.validate()?;
    Ok(settings)
}
