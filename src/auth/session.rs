/// Session Authentication
///
/// Per-request state machine:
///
/// ```text
/// Anonymous --cookie--> Authenticating --valid--> Authenticated
///                             |
///                             +--invalid/expired--> Refreshing --renewed--> Authenticated
///                                                       |
///                                                       +--------------------> Rejected
/// ```
///
/// Renewal reads the newest valid refresh token for the token's subject and
/// leaves it in place. Two requests racing on the same expired session both
/// renew; refresh tokens are deliberately multi-use within their lifetime.

use std::sync::Arc;

use crate::auth::clock::Clock;
use crate::auth::password::PasswordHasher;
use crate::auth::payload::AccessTokenPayload;
use crate::auth::refresh_token::{RefreshToken, RefreshTokenManager};
use crate::auth::token::TokenCodec;
use crate::configuration::AuthSettings;
use crate::error::{AppError, AuthError, DatabaseError};
use crate::store::{Credential, CredentialStore, Stores};

/// The parts of an inbound request the authenticator looks at.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthRequest<'a> {
    pub path: &'a str,
    /// Value of the `AuthToken` cookie, if sent
    pub access_token: Option<&'a str>,
    pub content_type: Option<&'a str>,
    pub accept: Option<&'a str>,
}

/// A signed access token together with its expiry (Unix seconds).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedAccessToken {
    pub token: String,
    pub expires_at: i64,
}

/// How a rejected request should be answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectionResponse {
    Unauthorized,
    Redirect(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    /// Public path; no session consulted
    Public,
    Authenticated {
        subject: String,
        /// Set when the access token was renewed; must go out as a cookie
        renewed: Option<IssuedAccessToken>,
    },
    Rejected {
        reason: AuthError,
        response: RejectionResponse,
    },
}

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginTokens {
    pub user_id: String,
    pub access_token: IssuedAccessToken,
    pub refresh_token: RefreshToken,
}

pub struct SessionAuthenticator {
    settings: AuthSettings,
    codec: TokenCodec,
    refresh_tokens: RefreshTokenManager,
    hasher: Arc<PasswordHasher>,
    credentials: Arc<dyn CredentialStore>,
    clock: Arc<dyn Clock>,
}

impl SessionAuthenticator {
    /// # Errors
    /// Invalid settings, or a bcrypt cost the hasher rejects.
    pub fn new(
        settings: AuthSettings,
        stores: Stores,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, AppError> {
        settings.validate()?;

        let hasher = PasswordHasher::new(&settings.pepper, settings.bcrypt_cost)?;
        let refresh_tokens = RefreshTokenManager::new(
            &settings.refresh_secret,
            settings.refresh_token_expiry,
            stores.tokens,
        );

        Ok(Self {
            codec: TokenCodec::new(&settings.jwt_secret),
            refresh_tokens,
            hasher: Arc::new(hasher),
            credentials: stores.credentials,
            clock,
            settings,
        })
    }

    pub fn access_token_lifetime(&self) -> i64 {
        self.settings.access_token_expiry
    }

    /// Longest password a new account may use with the configured pepper.
    pub fn max_password_length(&self) -> usize {
        self.hasher.max_password_length()
    }

    /// Whether `path` is, or lies below, a configured public path.
    pub fn is_public_path(&self, path: &str) -> bool {
        self.settings
            .public_paths
            .iter()
            .any(|public| path_matches(path, public))
    }

    /// API calls get a 401; everything else is sent to the login page.
    pub fn is_api_request(&self, request: &AuthRequest<'_>) -> bool {
        // Media types compare case-insensitively
        let wants_json = |header: Option<&str>| {
            header.is_some_and(|value| value.to_ascii_lowercase().contains("application/json"))
        };

        path_matches(request.path, &self.settings.api_prefix)
            || wants_json(request.content_type)
            || wants_json(request.accept)
    }

    /// Run the state machine for one request.
    pub async fn authenticate(&self, request: &AuthRequest<'_>) -> AuthOutcome {
        if self.is_public_path(request.path) {
            tracing::trace!(path = %request.path, "Public path, skipping authentication");
            return AuthOutcome::Public;
        }

        let token = match request.access_token {
            Some(token) if !token.is_empty() => token,
            _ => return self.reject(request, AuthError::MissingToken),
        };

        let now = self.clock.now();
        let failure = match self.codec.verify(token, now) {
            Ok(payload) => {
                return AuthOutcome::Authenticated {
                    subject: payload.subject,
                    renewed: None,
                };
            }
            Err(failure) => failure,
        };

        tracing::debug!(path = %request.path, reason = %failure, "Access token not accepted, attempting refresh");

        match self.renew(token, now).await {
            Ok((subject, renewed)) => {
                tracing::info!(user_id = %subject, "Access token renewed from refresh token");
                AuthOutcome::Authenticated {
                    subject,
                    renewed: Some(renewed),
                }
            }
            Err(reason) => self.reject(request, reason),
        }
    }

    async fn renew(&self, token: &str, now: i64) -> Result<(String, IssuedAccessToken), AuthError> {
        let subject = TokenCodec::extract_subject_unverified(token)?;

        if !self.settings.refresh_trusts_unverified_subject {
            self.codec.validate_structure_only(token)?;
        }

        self.refresh_tokens
            .find_valid(&subject, now)
            .await?
            .ok_or(AuthError::NoValidRefreshToken)?;

        let renewed = self.issue_access_token(&subject, now)?;
        Ok((subject, renewed))
    }

    fn reject(&self, request: &AuthRequest<'_>, reason: AuthError) -> AuthOutcome {
        if reason.is_internal() {
            tracing::error!(path = %request.path, error = %reason, "Session refresh failed");
        } else {
            tracing::debug!(path = %request.path, reason = %reason, "Request rejected");
        }

        let response = if self.is_api_request(request) {
            RejectionResponse::Unauthorized
        } else {
            RejectionResponse::Redirect(self.settings.login_path.clone())
        };

        AuthOutcome::Rejected { reason, response }
    }

    /// Mint and sign a fresh access token for `subject`.
    pub fn issue_access_token(
        &self,
        subject: &str,
        now: i64,
    ) -> Result<IssuedAccessToken, AuthError> {
        let payload = AccessTokenPayload::new(subject, now, self.settings.access_token_expiry);
        let token = self.codec.sign(&payload)?;

        Ok(IssuedAccessToken {
            token,
            expires_at: payload.expires_at,
        })
    }

    /// Check credentials and open a new session.
    ///
    /// Prior refresh tokens of the user stay valid, so several sessions can
    /// coexist.
    ///
    /// # Errors
    /// - `InvalidCredentials` for an unknown email and a wrong password alike
    /// - `HashingFailure` / `StorageFailure` for server faults
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginTokens, AuthError> {
        let credential = self.credentials.get_by_email(email).await?;

        let hasher = self.hasher.clone();
        let password = password.to_string();
        let credential = match credential {
            Some(credential) if hasher.accepts(&password) => {
                let hash = credential.password_hash.clone();
                let matches = run_blocking(move || hasher.verify(&hash, &password)).await??;
                matches.then_some(credential)
            }
            // Unknown user, or a password no account can have been created with
            _ => {
                run_blocking(move || hasher.verify_dummy()).await?;
                None
            }
        };

        let credential = credential.ok_or(AuthError::InvalidCredentials)?;

        let now = self.clock.now();
        let access_token = self.issue_access_token(&credential.user_id, now)?;
        let refresh_token = self.refresh_tokens.issue(&credential.user_id, now);
        self.refresh_tokens.store(&refresh_token).await?;

        tracing::info!(user_id = %credential.user_id, "User logged in successfully");

        Ok(LoginTokens {
            user_id: credential.user_id,
            access_token,
            refresh_token,
        })
    }

    /// Revoke every refresh token of `subject`.
    pub async fn logout(&self, subject: &str) -> Result<(), AuthError> {
        self.refresh_tokens.revoke_all(subject).await?;

        tracing::info!(user_id = %subject, "User logged out");
        Ok(())
    }

    /// Create an account. Input is expected to be validated already.
    ///
    /// # Errors
    /// `UniqueConstraintViolation` for a registered email, `HashingFailure`
    /// or storage errors otherwise.
    pub async fn register(
        &self,
        email: &str,
        username: &str,
        password: &str,
    ) -> Result<Credential, AppError> {
        let hasher = self.hasher.clone();
        let password = password.to_string();
        let password_hash = run_blocking(move || hasher.hash(&password)).await??;

        let credential = self
            .credentials
            .insert(email, username, &password_hash, self.clock.now())
            .await?;

        tracing::info!(user_id = %credential.user_id, "User registered successfully");
        Ok(credential)
    }

    /// Load the credential record of an authenticated subject.
    pub async fn current_user(&self, subject: &str) -> Result<Credential, AppError> {
        self.credentials
            .get_by_id(subject)
            .await?
            .ok_or_else(|| DatabaseError::NotFound("User not found".to_string()).into())
    }
}

fn path_matches(path: &str, prefix: &str) -> bool {
    path == prefix
        || path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// bcrypt is CPU-bound; keep it off the async workers.
async fn run_blocking<T, F>(work: F) -> Result<T, AuthError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| AuthError::HashingFailure(format!("hashing task failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::clock::ManualClock;
    use crate::store::{RefreshTokenRecord, SqliteStore, TokenStore};
    use async_trait::async_trait;

    const START: i64 = 1_700_000_000;
    const ACCESS_LIFETIME: i64 = 900;
    const REFRESH_LIFETIME: i64 = 604_800;
    const EMAIL: &str = "john@example.com";
    const PASSWORD: &str = "SecurePass123";

    fn settings() -> AuthSettings {
        AuthSettings {
            jwt_secret: "test-secret-key-at-least-32-characters-long".to_string(),
            refresh_secret: "refresh-secret".to_string(),
            pepper: "pepper".to_string(),
            access_token_expiry: ACCESS_LIFETIME,
            refresh_token_expiry: REFRESH_LIFETIME,
            bcrypt_cost: 4,
            public_paths: vec!["/".to_string(), "/assets".to_string(), "/api/login".to_string()],
            api_prefix: "/api".to_string(),
            login_path: "/login".to_string(),
            refresh_trusts_unverified_subject: false,
        }
    }

    async fn authenticator_with(settings: AuthSettings) -> (SessionAuthenticator, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(START));
        let store = SqliteStore::in_memory().await.expect("Failed to open store");
        let authenticator =
            SessionAuthenticator::new(settings, Stores::from_backend(store), clock.clone())
                .expect("Failed to build authenticator");
        (authenticator, clock)
    }

    async fn registered() -> (SessionAuthenticator, Arc<ManualClock>, String) {
        let (authenticator, clock) = authenticator_with(settings()).await;
        let credential = authenticator
            .register(EMAIL, "john", PASSWORD)
            .await
            .expect("Failed to register");
        (authenticator, clock, credential.user_id)
    }

    fn request(token: Option<&str>) -> AuthRequest<'_> {
        AuthRequest {
            path: "/api/me",
            access_token: token,
            ..Default::default()
        }
    }

    fn forged_token(subject: &str) -> String {
        let attacker = TokenCodec::new("attacker-chosen-secret");
        attacker
            .sign(&AccessTokenPayload::new(subject, START, ACCESS_LIFETIME))
            .unwrap()
    }

    #[tokio::test]
    async fn test_login_then_authenticate() {
        let (authenticator, _clock, user_id) = registered().await;

        let tokens = authenticator.login(EMAIL, PASSWORD).await.expect("Failed to login");
        assert!(!tokens.access_token.token.is_empty());
        assert!(!tokens.refresh_token.token.is_empty());
        assert_ne!(tokens.access_token.token, tokens.refresh_token.token);
        assert_eq!(tokens.access_token.expires_at, START + ACCESS_LIFETIME);

        let outcome = authenticator
            .authenticate(&request(Some(tokens.access_token.token.as_str())))
            .await;
        assert_eq!(
            outcome,
            AuthOutcome::Authenticated {
                subject: user_id,
                renewed: None
            }
        );
    }

    #[tokio::test]
    async fn test_expired_access_token_is_renewed() {
        let (authenticator, clock, user_id) = registered().await;
        let tokens = authenticator.login(EMAIL, PASSWORD).await.unwrap();

        clock.advance(ACCESS_LIFETIME + 1);

        match authenticator
            .authenticate(&request(Some(tokens.access_token.token.as_str())))
            .await
        {
            AuthOutcome::Authenticated {
                subject,
                renewed: Some(renewed),
            } => {
                assert_eq!(subject, user_id);
                assert_ne!(renewed.token, tokens.access_token.token);
                assert_eq!(renewed.expires_at, clock.now() + ACCESS_LIFETIME);

                // The renewed token stands on its own
                let outcome = authenticator.authenticate(&request(Some(renewed.token.as_str()))).await;
                assert_eq!(
                    outcome,
                    AuthOutcome::Authenticated {
                        subject: user_id,
                        renewed: None
                    }
                );
            }
            other => panic!("expected renewal, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_expired_refresh_token_rejects() {
        let (authenticator, clock, _) = registered().await;
        let tokens = authenticator.login(EMAIL, PASSWORD).await.unwrap();

        clock.advance(REFRESH_LIFETIME + 1);

        let outcome = authenticator
            .authenticate(&request(Some(tokens.access_token.token.as_str())))
            .await;
        assert_eq!(
            outcome,
            AuthOutcome::Rejected {
                reason: AuthError::NoValidRefreshToken,
                response: RejectionResponse::Unauthorized
            }
        );
    }

    #[tokio::test]
    async fn test_invalid_credentials_are_indistinguishable() {
        let (authenticator, _, _) = registered().await;

        let wrong_password = authenticator.login(EMAIL, "WrongPass123").await.unwrap_err();
        let unknown_email = authenticator
            .login("nobody@example.com", PASSWORD)
            .await
            .unwrap_err();

        assert_eq!(wrong_password, AuthError::InvalidCredentials);
        assert_eq!(unknown_email, wrong_password);
    }

    #[tokio::test]
    async fn test_public_paths_skip_authentication() {
        let (authenticator, _) = authenticator_with(settings()).await;

        for path in ["/", "/assets", "/assets/app.js", "/api/login"] {
            let outcome = authenticator
                .authenticate(&AuthRequest {
                    path,
                    access_token: Some("garbage"),
                    ..Default::default()
                })
                .await;
            assert_eq!(outcome, AuthOutcome::Public, "{}", path);
        }

        // "/" only matches itself, and prefixes stop at segment boundaries
        assert!(!authenticator.is_public_path("/home"));
        assert!(!authenticator.is_public_path("/assetsfoo"));
    }

    #[tokio::test]
    async fn test_missing_or_empty_cookie_rejects() {
        let (authenticator, _) = authenticator_with(settings()).await;

        for token in [None, Some("")] {
            let outcome = authenticator.authenticate(&request(token)).await;
            assert_eq!(
                outcome,
                AuthOutcome::Rejected {
                    reason: AuthError::MissingToken,
                    response: RejectionResponse::Unauthorized
                }
            );
        }
    }

    #[tokio::test]
    async fn test_malformed_cookie_rejects() {
        let (authenticator, _) = authenticator_with(settings()).await;

        let outcome = authenticator.authenticate(&request(Some("not-a-token"))).await;
        assert!(matches!(
            outcome,
            AuthOutcome::Rejected {
                reason: AuthError::MalformedToken,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_page_requests_are_redirected() {
        let (authenticator, _) = authenticator_with(settings()).await;

        let page = AuthRequest {
            path: "/home",
            ..Default::default()
        };
        assert_eq!(
            authenticator.authenticate(&page).await,
            AuthOutcome::Rejected {
                reason: AuthError::MissingToken,
                response: RejectionResponse::Redirect("/login".to_string())
            }
        );

        let json_page = AuthRequest {
            path: "/home",
            accept: Some("application/json"),
            ..Default::default()
        };
        assert!(matches!(
            authenticator.authenticate(&json_page).await,
            AuthOutcome::Rejected {
                response: RejectionResponse::Unauthorized,
                ..
            }
        ));

        let json_body = AuthRequest {
            path: "/home",
            content_type: Some("application/json; charset=utf-8"),
            ..Default::default()
        };
        assert!(authenticator.is_api_request(&json_body));

        let mixed_case = AuthRequest {
            path: "/home",
            accept: Some("Application/JSON"),
            ..Default::default()
        };
        assert!(matches!(
            authenticator.authenticate(&mixed_case).await,
            AuthOutcome::Rejected {
                response: RejectionResponse::Unauthorized,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_crafted_subject_is_rejected() {
        let (authenticator, _, victim) = registered().await;
        // The victim has a live session, so a refresh row exists
        authenticator.login(EMAIL, PASSWORD).await.unwrap();

        let outcome = authenticator
            .authenticate(&request(Some(forged_token(&victim).as_str())))
            .await;
        assert!(matches!(
            outcome,
            AuthOutcome::Rejected {
                reason: AuthError::InvalidSignature,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_crafted_subject_when_trusting_unverified_subject() {
        let mut settings = settings();
        settings.refresh_trusts_unverified_subject = true;
        let (authenticator, _) = authenticator_with(settings).await;
        let victim = authenticator.register(EMAIL, "john", PASSWORD).await.unwrap().user_id;

        // Without a refresh row nothing is created
        let outcome = authenticator
            .authenticate(&request(Some(forged_token(&victim).as_str())))
            .await;
        assert!(matches!(
            outcome,
            AuthOutcome::Rejected {
                reason: AuthError::NoValidRefreshToken,
                ..
            }
        ));

        // With one, the forged subject is renewed: this mode trusts the hint
        authenticator.login(EMAIL, PASSWORD).await.unwrap();
        let outcome = authenticator
            .authenticate(&request(Some(forged_token(&victim).as_str())))
            .await;
        assert!(matches!(
            outcome,
            AuthOutcome::Authenticated { ref subject, renewed: Some(_) } if *subject == victim
        ));
    }

    #[tokio::test]
    async fn test_logout_revokes_all_sessions() {
        let (authenticator, clock, user_id) = registered().await;
        let first = authenticator.login(EMAIL, PASSWORD).await.unwrap();
        let second = authenticator.login(EMAIL, PASSWORD).await.unwrap();

        authenticator.logout(&user_id).await.expect("Failed to logout");
        authenticator.logout(&user_id).await.expect("Second logout should succeed");

        clock.advance(ACCESS_LIFETIME + 1);
        for tokens in [first, second] {
            let outcome = authenticator
                .authenticate(&request(Some(tokens.access_token.token.as_str())))
                .await;
            assert!(matches!(
                outcome,
                AuthOutcome::Rejected {
                    reason: AuthError::NoValidRefreshToken,
                    ..
                }
            ));
        }
    }

    #[tokio::test]
    async fn test_login_keeps_earlier_sessions() {
        let (authenticator, clock, user_id) = registered().await;
        let first = authenticator.login(EMAIL, PASSWORD).await.unwrap();
        clock.advance(10);
        authenticator.login(EMAIL, PASSWORD).await.unwrap();

        clock.advance(ACCESS_LIFETIME);
        let outcome = authenticator
            .authenticate(&request(Some(first.access_token.token.as_str())))
            .await;
        assert!(matches!(
            outcome,
            AuthOutcome::Authenticated { ref subject, renewed: Some(_) } if *subject == user_id
        ));
    }

    #[tokio::test]
    async fn test_concurrent_renewals_both_succeed() {
        let (authenticator, clock, _) = registered().await;
        let tokens = authenticator.login(EMAIL, PASSWORD).await.unwrap();
        clock.advance(ACCESS_LIFETIME + 1);

        let token = tokens.access_token.token.as_str();
        let (first, second) = (request(Some(token)), request(Some(token)));
        let (a, b) = tokio::join!(
            authenticator.authenticate(&first),
            authenticator.authenticate(&second)
        );

        for outcome in [a, b] {
            assert!(matches!(
                outcome,
                AuthOutcome::Authenticated {
                    renewed: Some(_),
                    ..
                }
            ));
        }
    }

    #[tokio::test]
    async fn test_register_uses_injected_clock() {
        let (authenticator, clock) = authenticator_with(settings()).await;
        clock.set(START + 42);

        let credential = authenticator.register(EMAIL, "john", PASSWORD).await.unwrap();
        assert_eq!(credential.created_at, START + 42);
        assert_eq!(
            authenticator.current_user(&credential.user_id).await.unwrap().created_at,
            START + 42
        );
    }

    #[tokio::test]
    async fn test_overlong_passwords() {
        let (authenticator, _, _) = registered().await;
        let max = authenticator.max_password_length();
        assert_eq!(max, 72 - "pepper".len());

        let too_long = "Aa1".to_string() + &"a".repeat(max - 2);
        assert!(matches!(
            authenticator.register("other@example.com", "other", &too_long).await,
            Err(AppError::Auth(AuthError::HashingFailure(_)))
        ));

        // Same answer as any other bad password, not a server fault
        assert_eq!(
            authenticator.login(EMAIL, &too_long).await.unwrap_err(),
            AuthError::InvalidCredentials
        );
    }

    #[tokio::test]
    async fn test_current_user() {
        let (authenticator, _, user_id) = registered().await;

        let user = authenticator.current_user(&user_id).await.unwrap();
        assert_eq!(user.email, EMAIL);

        assert!(matches!(
            authenticator.current_user("missing").await,
            Err(AppError::Database(DatabaseError::NotFound(_)))
        ));
    }

    struct BrokenStore;

    #[async_trait]
    impl CredentialStore for BrokenStore {
        async fn get_by_email(&self, _: &str) -> Result<Option<Credential>, DatabaseError> {
            Err(DatabaseError::ConnectionPool("pool closed".to_string()))
        }

        async fn get_by_id(&self, _: &str) -> Result<Option<Credential>, DatabaseError> {
            Err(DatabaseError::ConnectionPool("pool closed".to_string()))
        }

        async fn insert(
            &self,
            _: &str,
            _: &str,
            _: &str,
            _: i64,
        ) -> Result<Credential, DatabaseError> {
            Err(DatabaseError::ConnectionPool("pool closed".to_string()))
        }
    }

    #[async_trait]
    impl TokenStore for BrokenStore {
        async fn store_refresh_token(&self, _: &RefreshTokenRecord) -> Result<(), DatabaseError> {
            Err(DatabaseError::ConnectionPool("pool closed".to_string()))
        }

        async fn find_valid_refresh_token(
            &self,
            _: &str,
            _: i64,
        ) -> Result<Option<RefreshTokenRecord>, DatabaseError> {
            Err(DatabaseError::ConnectionPool("pool closed".to_string()))
        }

        async fn revoke_all_for_user(&self, _: &str) -> Result<u64, DatabaseError> {
            Err(DatabaseError::ConnectionPool("pool closed".to_string()))
        }
    }

    #[tokio::test]
    async fn test_storage_failures() {
        let clock = Arc::new(ManualClock::new(START));
        let authenticator =
            SessionAuthenticator::new(settings(), Stores::from_backend(BrokenStore), clock.clone())
                .unwrap();

        assert!(matches!(
            authenticator.login(EMAIL, PASSWORD).await,
            Err(AuthError::StorageFailure(_))
        ));
        assert!(matches!(
            authenticator.logout("user").await,
            Err(AuthError::StorageFailure(_))
        ));

        // A refresh that cannot reach storage resolves as a rejection
        let expired = authenticator.issue_access_token("user", START - 2 * ACCESS_LIFETIME).unwrap();
        let outcome = authenticator.authenticate(&request(Some(expired.token.as_str()))).await;
        assert!(matches!(
            outcome,
            AuthOutcome::Rejected {
                reason: AuthError::StorageFailure(_),
                response: RejectionResponse::Unauthorized
            }
        ));
    }

    #[tokio::test]
    async fn test_invalid_settings_are_refused() {
        let mut bad = settings();
        bad.jwt_secret = String::new();

        let store = SqliteStore::in_memory().await.unwrap();
        let result = SessionAuthenticator::new(
            bad,
            Stores::from_backend(store),
            Arc::new(ManualClock::new(START)),
        );
        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
