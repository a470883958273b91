/// Authentication module
///
/// Handles access token signing/verification, password hashing,
/// refresh token management and the per-request session state machine.

pub mod clock;
pub mod cookie;
pub(crate) mod password;
mod payload;
mod refresh_token;
mod session;
mod token;

pub use clock::{Clock, ManualClock, SystemClock};
pub use cookie::{access_token_cookie, cleared_access_token_cookie, ACCESS_TOKEN_COOKIE};
pub use password::{validate_password_strength, PasswordHasher};
pub use payload::AccessTokenPayload;
pub use refresh_token::{RefreshToken, RefreshTokenManager};
pub use session::{
    AuthOutcome, AuthRequest, IssuedAccessToken, LoginTokens, RejectionResponse,
    SessionAuthenticator,
};
pub use token::TokenCodec;
