//! Netscape-style cookies.
//!
//! Incoming cookies arrive in `HTTP_COOKIE`; outgoing ones are sent with a
//! `Set-Cookie` header. The header table holds one value per name, so a
//! response carries at most one cookie.

use std::fmt;

/// Expiry date used to make a client drop a cookie.
pub const EXPIRED: &str = "Thu, 01-Jan-1970 00:00:00 GMT";

/// An outgoing cookie.
///
/// # Example
///
/// ```rust
/// use cgi_gateway::Cookie;
///
/// let cookie = Cookie::new("session", "abc").path("/").secure(true);
/// assert_eq!(cookie.to_string(), "session=abc; path=/; secure");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    /// Preformatted expiry date, e.g. `Wed, 09-Jun-2027 10:18:14 GMT`.
    pub expires: Option<String>,
    pub domain: Option<String>,
    pub path: Option<String>,
    pub secure: bool,
}

impl Cookie {
    /// A session cookie with no attributes.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            expires: None,
            domain: None,
            path: None,
            secure: false,
        }
    }

    pub fn expires(mut self, expires: impl Into<String>) -> Self {
        self.expires = Some(expires.into());
        self
    }

    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// The same cookie with an empty value and an expiry in the past.
    pub fn expired(&self) -> Self {
        Self {
            value: String::new(),
            expires: Some(EXPIRED.to_string()),
            ..self.clone()
        }
    }
}

impl fmt::Display for Cookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)?;
        if let Some(expires) = &self.expires {
            write!(f, "; expires={expires}")?;
        }
        if let Some(domain) = &self.domain {
            write!(f, "; domain={domain}")?;
        }
        if let Some(path) = &self.path {
            write!(f, "; path={path}")?;
        }
        if self.secure {
            f.write_str("; secure")?;
        }
        Ok(())
    }
}

/// Find the value of cookie `name` in a `Cookie` request header.
///
/// Pairs may be separated by `;` or `,`. The first match wins.
pub fn find_cookie<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header
        .split([';', ','])
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| key.trim() == name)
        .map(|(_, value)| value.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_all_attributes() {
        let cookie = Cookie::new("id", "42")
            .expires("Wed, 09-Jun-2027 10:18:14 GMT")
            .domain("example.org")
            .path("/app")
            .secure(true);
        assert_eq!(
            cookie.to_string(),
            "id=42; expires=Wed, 09-Jun-2027 10:18:14 GMT; domain=example.org; path=/app; secure"
        );
    }

    #[test]
    fn test_expired_clears_value() {
        let cookie = Cookie::new("id", "42").path("/").expired();
        assert_eq!(cookie.to_string(), format!("id=; expires={EXPIRED}; path=/"));
    }

    #[test]
    fn test_find_cookie() {
        let header = "theme=dark; id=42 , lang=en";
        assert_eq!(find_cookie(header, "id"), Some("42"));
        assert_eq!(find_cookie(header, "lang"), Some("en"));
        assert_eq!(find_cookie(header, "theme"), Some("dark"));
        assert_eq!(find_cookie(header, "missing"), None);
        assert_eq!(find_cookie("", "id"), None);
    }

    #[test]
    fn test_find_cookie_first_match_wins() {
        assert_eq!(find_cookie("a=1; a=2", "a"), Some("1"));
    }

    #[test]
    fn test_display_round_trips_through_find() {
        let cookie = Cookie::new("session", "abc").path("/");
        assert_eq!(find_cookie(&cookie.to_string(), "session"), Some("abc"));
    }
}
