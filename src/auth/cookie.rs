/// The `AuthToken` session cookie.

use actix_web::cookie::time::{Duration, OffsetDateTime};
use actix_web::cookie::{Cookie, SameSite};

pub const ACCESS_TOKEN_COOKIE: &str = "AuthToken";

/// Cookie carrying an access token; expires together with the token.
pub fn access_token_cookie(token: &str, expires_at: i64) -> Cookie<'static> {
    let expires = OffsetDateTime::from_unix_timestamp(expires_at).unwrap_or(OffsetDateTime::UNIX_EPOCH);

    Cookie::build(ACCESS_TOKEN_COOKIE, token.to_string())
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Strict)
        .expires(expires)
        .finish()
}

/// Empty cookie that is already expired, telling the browser to drop it.
pub fn cleared_access_token_cookie() -> Cookie<'static> {
    Cookie::build(ACCESS_TOKEN_COOKIE, "")
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Strict)
        .expires(OffsetDateTime::UNIX_EPOCH)
        .max_age(Duration::ZERO)
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_token_cookie_attributes() {
        let cookie = access_token_cookie("abc.def.ghi", 1_700_000_900);

        assert_eq!(cookie.name(), "AuthToken");
        assert_eq!(cookie.value(), "abc.def.ghi");
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));
        assert_eq!(
            cookie.expires_datetime().map(|t| t.unix_timestamp()),
            Some(1_700_000_900)
        );
    }

    #[test]
    fn test_cleared_cookie_is_empty_and_expired() {
        let cookie = cleared_access_token_cookie();

        assert_eq!(cookie.name(), "AuthToken");
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(Duration::ZERO));
        assert!(cookie.expires_datetime().unwrap() < OffsetDateTime::now_utc());
    }
}
