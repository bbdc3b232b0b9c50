//! Anti-forgery token handling.
//!
//! The backend sets a readable `csrftoken` cookie and expects it echoed back in
//! `X-CSRFToken` on every state-changing request. The session cookie itself is
//! sent by the browser; nothing here touches it except best-effort clearing on
//! logout.

#[cfg(test)]
#[path = "csrf_test.rs"]
mod csrf_test;

use crate::config::{CSRF_COOKIE, ClientConfig, SESSION_COOKIE};

/// Methods that never carry the anti-forgery header.
const SAFE_METHODS: [&str; 4] = ["GET", "HEAD", "OPTIONS", "TRACE"];

/// Cookies expired client-side on logout.
pub const CLEARED_ON_LOGOUT: [&str; 2] = [SESSION_COOKIE, CSRF_COOKIE];

#[must_use]
pub fn requires_token(method: &str) -> bool {
    !SAFE_METHODS.iter().any(|safe| safe.eq_ignore_ascii_case(method.trim()))
}

/// Read one cookie out of a `document.cookie` string, percent-decoded.
/// Empty values count as absent; undecodable values are returned raw.
#[must_use]
pub fn cookie_value(cookies: &str, name: &str) -> Option<String> {
    cookies
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, value)| *key == name && !value.is_empty())
        .map(|(_, value)| urlencoding::decode(value).map_or_else(|_| value.to_owned(), |v| v.into_owned()))
}

/// `(header, token)` to attach to a request, or `None` for safe methods and
/// when no token cookie is present.
#[must_use]
pub fn anti_forgery_header(config: &ClientConfig, method: &str, cookies: &str) -> Option<(String, String)> {
    if !requires_token(method) {
        return None;
    }
    cookie_value(cookies, &config.csrf_cookie).map(|token| (config.csrf_header.clone(), token))
}

/// `document.cookie` assignment that expires `name` on the root path.
#[must_use]
pub fn expire_cookie(name: &str) -> String {
    format!("{name}=; Max-Age=0; expires=Thu, 01 Jan 1970 00:00:00 GMT; path=/")
}
