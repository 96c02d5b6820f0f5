/// Token transport helpers
///
/// Tokens travel as HTTP-only cookies; outside production they are also
/// mirrored into the JSON response body so test clients can read them.
/// Both channels carry the same two opaque strings.

use actix_web::cookie::{time::Duration, Cookie, SameSite};

pub const ACCESS_COOKIE: &str = "access_token";
pub const REFRESH_COOKIE: &str = "refresh_token";

pub fn access_cookie(token: &str, max_age_seconds: i64, secure: bool) -> Cookie<'static> {
    token_cookie(ACCESS_COOKIE, token, max_age_seconds, secure)
}

pub fn refresh_cookie(token: &str, max_age_seconds: i64, secure: bool) -> Cookie<'static> {
    token_cookie(REFRESH_COOKIE, token, max_age_seconds, secure)
}

fn token_cookie(name: &'static str, token: &str, max_age_seconds: i64, secure: bool) -> Cookie<'static> {
    Cookie::build(name, token.to_owned())
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(Duration::seconds(max_age_seconds))
        .finish()
}

pub fn removal_cookie(name: &'static str) -> Cookie<'static> {
    let mut cookie = Cookie::new(name, "");
    cookie.set_path("/");
    cookie.make_removal();
    cookie
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_cookies_are_http_only() {
        let cookie = access_cookie("token-value", 900, true);
        assert_eq!(cookie.name(), "access_token");
        assert_eq!(cookie.value(), "token-value");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.path(), Some("/"));
    }

    #[test]
    fn test_secure_flag_follows_environment() {
        let cookie = refresh_cookie("token-value", 604800, false);
        assert_eq!(cookie.secure(), Some(false));
    }

    #[test]
    fn test_removal_cookie_expires_immediately() {
        let cookie = removal_cookie(ACCESS_COOKIE);
        assert_eq!(cookie.value(), "");
        assert!(cookie.max_age().map(|d| d.is_zero()).unwrap_or(false) || cookie.expires().is_some());
    }
}
