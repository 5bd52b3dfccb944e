//! Cookie transport for session tokens and the onboarding marker.

use axum::http::{header, HeaderMap, HeaderValue};
use std::time::Duration;

/// Attributes of one cookie the gateway issues.
///
/// Every cookie is `HttpOnly`, `SameSite=Lax` and scoped to `/`. `Secure`
/// is added in production deployments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieSpec {
    name: String,
    max_age: Duration,
    secure: bool,
}

impl CookieSpec {
    pub fn new(name: impl Into<String>, max_age: Duration, secure: bool) -> Self {
        Self {
            name: name.into(),
            max_age,
            secure,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `Set-Cookie` value carrying `value`.
    pub fn encode_for_transport(&self, value: &str) -> String {
        self.render(value, self.max_age.as_secs())
    }

    /// `Set-Cookie` value that deletes the cookie.
    pub fn clear(&self) -> String {
        self.render("", 0)
    }

    /// Same as [`encode_for_transport`](Self::encode_for_transport) as a header value.
    /// Returns `None` when `value` cannot appear in a header.
    pub fn header_value(&self, value: &str) -> Option<HeaderValue> {
        HeaderValue::from_str(&self.encode_for_transport(value)).ok()
    }

    /// Read this cookie from request headers. Empty values count as absent.
    pub fn read(&self, headers: &HeaderMap) -> Option<String> {
        read_cookie(headers, &self.name)
    }

    fn render(&self, value: &str, max_age: u64) -> String {
        let mut cookie = format!(
            "{}={}; Path=/; Max-Age={}; HttpOnly; SameSite=Lax",
            self.name, value, max_age
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }
}

/// Find a cookie by name across all `Cookie` headers.
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .map(|(key, value)| (key, value.trim()))
        .find(|(key, value)| *key == name && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

/// True when a token can be stored in a cookie without quoting.
pub fn is_cookie_safe(value: &str) -> bool {
    !value.is_empty()
        && value
            .bytes()
            .all(|b| b.is_ascii_graphic() && !matches!(b, b';' | b',' | b'"' | b'\\'))
}
