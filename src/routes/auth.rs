/// Authentication Routes
///
/// Handles account creation, login, logout, and current user information.
/// Session checks for `logout` and `me` happen in `SessionMiddleware`;
/// these handlers only see requests that already carry an identity.

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::auth::{
    access_token_cookie, cleared_access_token_cookie, validate_password_strength,
    SessionAuthenticator,
};
use crate::error::{AppError, AuthError};
use crate::middleware::AuthenticatedUser;
use crate::validators::{is_valid_email, is_valid_username};

/// User signup request
#[derive(Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub username: String,
    pub password: String,
}

/// User login request
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Tokens handed out on login
#[derive(Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

#[derive(Serialize)]
pub struct SignupResponse {
    pub user_id: String,
    pub email: String,
    pub username: String,
}

/// User information response
#[derive(Serialize)]
pub struct UserResponse {
    pub user_id: String,
    pub email: String,
    pub username: String,
    pub created_at: String,
}

/// POST /api/signup
///
/// # Validation
/// - Email must be valid format and not already registered
/// - Password must be 8 chars or more with digit, lowercase, and uppercase, and
///   short enough to be hashed together with the whole pepper
/// - Username must be 3-64 chars of letters, digits and simple separators
///
/// # Errors
/// - 400: Validation errors
/// - 409: Email already registered
/// - 500: Internal server error
pub async fn signup(
    form: web::Json<SignupRequest>,
    authenticator: web::Data<SessionAuthenticator>,
) -> Result<HttpResponse, AppError> {
    let email = is_valid_email(&form.email)?;
    let username = is_valid_username(&form.username)?;
    validate_password_strength(&form.password, authenticator.max_password_length())?;

    let credential = authenticator
        .register(&email, &username, &form.password)
        .await?;

    Ok(HttpResponse::Created().json(SignupResponse {
        user_id: credential.user_id,
        email: credential.email,
        username: credential.username,
    }))
}

/// POST /api/login
///
/// Sets the `AuthToken` cookie and also returns both tokens in the body.
///
/// # Errors
/// - 401: Invalid credentials (same answer for unknown email and wrong password)
/// - 500: Internal server error
pub async fn login(
    form: web::Json<LoginRequest>,
    authenticator: web::Data<SessionAuthenticator>,
) -> Result<HttpResponse, AppError> {
    // A malformed address cannot belong to anyone
    let email = is_valid_email(&form.email).map_err(|_| AuthError::InvalidCredentials)?;

    let tokens = authenticator.login(&email, &form.password).await?;
    let cookie = access_token_cookie(&tokens.access_token.token, tokens.access_token.expires_at);

    Ok(HttpResponse::Ok().cookie(cookie).json(AuthResponse {
        access_token: tokens.access_token.token,
        refresh_token: tokens.refresh_token.token,
        token_type: "Bearer".to_string(),
        expires_in: authenticator.access_token_lifetime(),
    }))
}

/// POST /api/logout
///
/// Revokes every refresh token of the caller and clears the cookie.
pub async fn logout(
    user: web::ReqData<AuthenticatedUser>,
    authenticator: web::Data<SessionAuthenticator>,
) -> Result<HttpResponse, AppError> {
    authenticator.logout(&user.user_id).await?;

    Ok(HttpResponse::Ok()
        .cookie(cleared_access_token_cookie())
        .json(serde_json::json!({ "message": "Logged out" })))
}

/// GET /api/me
///
/// # Errors
/// - 401: No session (handled by middleware)
/// - 404: The account behind the session no longer exists
pub async fn get_current_user(
    user: web::ReqData<AuthenticatedUser>,
    authenticator: web::Data<SessionAuthenticator>,
) -> Result<HttpResponse, AppError> {
    let credential = authenticator.current_user(&user.user_id).await?;

    let created_at = chrono::DateTime::from_timestamp(credential.created_at, 0)
        .map(|t| t.to_rfc3339())
        .unwrap_or_default();

    Ok(HttpResponse::Ok().json(UserResponse {
        user_id: credential.user_id,
        email: credential.email,
        username: credential.username,
        created_at,
    }))
}
