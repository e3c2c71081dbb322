//! Session and guest-cart cookies

use http::HeaderMap;
use http::header::{COOKIE, HeaderValue, InvalidHeaderValue};

/// HttpOnly cookie holding the session JWT
pub const SESSION_COOKIE: &str = "token";
/// Cookie identifying a guest cart
pub const CART_COOKIE: &str = "cart_session";
/// Guest cart lifetime (30 days)
pub const CART_COOKIE_MAX_AGE: i64 = 30 * 24 * 3600;

/// Value of a named cookie from the `Cookie` request headers
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim_matches('"').to_string())
        .filter(|value| !value.is_empty())
}

/// `Set-Cookie` value: HttpOnly, SameSite=Lax, path `/`, Secure when asked
pub fn build_cookie(
    name: &str,
    value: &str,
    max_age: i64,
    secure: bool,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!("{name}={value}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}");
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

/// Expired cookie that makes the browser drop `name`
pub fn clear_cookie(name: &str, secure: bool) -> Result<HeaderValue, InvalidHeaderValue> {
    build_cookie(name, "", 0, secure)
}
