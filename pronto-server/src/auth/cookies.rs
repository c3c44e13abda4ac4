//! 令牌 Cookie
//!
//! `access_token` / `refresh_token` cookies, path `/`, HttpOnly.

use http::HeaderMap;
use http::header::{AUTHORIZATION, COOKIE};

use super::jwt::JwtService;

pub const ACCESS_COOKIE: &str = "access_token";
pub const REFRESH_COOKIE: &str = "refresh_token";

/// Read a cookie value from the `Cookie` headers
pub fn get_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
}

/// Access token: `Authorization: Bearer` first, then the cookie
pub fn access_token_from(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(JwtService::extract_from_header)
        .or_else(|| get_cookie(headers, ACCESS_COOKIE))
}

/// `Set-Cookie` value for a token
pub fn token_cookie(name: &str, token: &str, max_age_secs: i64, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; Path=/; Max-Age={}; HttpOnly; SameSite=Lax",
        name, token, max_age_secs
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` value that clears a token cookie
pub fn clear_cookie(name: &str) -> String {
    format!("{}=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax", name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    #[test]
    fn test_get_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; access_token=abc.def; refresh_token="),
        );
        assert_eq!(get_cookie(&headers, ACCESS_COOKIE), Some("abc.def"));
        assert_eq!(get_cookie(&headers, REFRESH_COOKIE), None);
        assert_eq!(get_cookie(&headers, "missing"), None);
    }

    #[test]
    fn test_bearer_takes_precedence() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("access_token=from-cookie"));
        assert_eq!(access_token_from(&headers), Some("from-cookie"));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer from-header"));
        assert_eq!(access_token_from(&headers), Some("from-header"));
    }

    #[test]
    fn test_cookie_attributes() {
        let cookie = token_cookie(ACCESS_COOKIE, "t", 900, true);
        assert!(cookie.starts_with("access_token=t; Path=/;"));
        assert!(cookie.contains("Max-Age=900"));
        assert!(cookie.ends_with("; Secure"));
        assert!(clear_cookie(REFRESH_COOKIE).contains("Max-Age=0"));
    }
}
