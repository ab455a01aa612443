use chrono::Duration;
use http::{HeaderMap, HeaderValue, header::COOKIE};
use std::fmt;

/// Default name of the cookie holding the OAuth state.
pub const OIDC_STATE_COOKIE: &str = "oidc_state";

/// Name of the cookie holding the PKCE code verifier.
pub const OIDC_PKCE_COOKIE: &str = "oidc_pkce_verifier";

/// Session cookies from earlier deployments, expired on logout.
pub const LEGACY_SESSION_COOKIES: [&str; 3] = ["auth_token", "session_id", "oidc_session"];

/// Lifetime of the state and PKCE cookies.
pub const OAUTH_COOKIE_MAX_AGE_SECONDS: i64 = 5 * 60;

/// Representation of an HTTP cookie.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cookie {
    /// The cookie's name.
    name: String,

    /// The cookie's value.
    value: String,

    /// The cookie's maximum age.
    max_age: Duration,

    /// The cookie's path.
    path: String,

    /// Whether this cookie was marked Secure.
    secure: bool,

    /// Whether this cookie was marked HttpOnly.
    http_only: bool,

    /// The `SameSite` attribute.
    same_site: SameSite,
}

impl fmt::Display for Cookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)?;

        if self.max_age.num_seconds() >= 0 {
            write!(f, "; Max-Age={}", self.max_age.num_seconds())?;
        }

        if !self.path.is_empty() {
            write!(f, "; Path={}", self.path)?;
        }

        if self.secure {
            write!(f, "; Secure")?;
        }

        if self.http_only {
            write!(f, "; HttpOnly")?;
        }

        write!(f, "; SameSite={}", self.same_site)?;

        Ok(())
    }
}

/// Creates a short-lived cookie for the login round trip (state, PKCE verifier).
pub fn create_oauth_cookie<S, T>(name: S, value: T, secure: bool) -> Cookie
where
    S: Into<String>,
    T: Into<String>,
{
    build_cookie(
        name,
        value,
        Duration::seconds(OAUTH_COOKIE_MAX_AGE_SECONDS),
        secure,
    )
}

/// Creates a cookie that instructs the browser to delete it.
pub fn create_expired_cookie<S>(name: S, secure: bool) -> Cookie
where
    S: Into<String>,
{
    build_cookie(name, "", Duration::zero(), secure)
}

fn build_cookie<N: Into<String>, V: Into<String>>(
    name: N,
    value: V,
    max_age: Duration,
    secure: bool,
) -> Cookie {
    Cookie {
        name: name.into(),
        value: value.into(),
        max_age,
        path: String::from("/"),
        secure,
        http_only: true,
        same_site: SameSite::Lax,
    }
}

/// Extracts a cookie by name from a cookie header value.
pub fn extract_cookie_by_name(name: &str, value: &HeaderValue) -> Option<String> {
    value
        .to_str()
        .ok()?
        .split(';')
        .map(str::trim)
        .filter_map(|cookie| cookie.split_once('='))
        .find_map(|(k, v)| (k == name).then(|| v.to_string()))
}

/// Read access to request cookies.
pub trait CookieReader {
    /// Returns the value of the cookie `name`, if present and non-empty.
    fn cookie(&self, name: &str) -> Option<String>;
}

impl CookieReader for HeaderMap {
    fn cookie(&self, name: &str) -> Option<String> {
        self.get_all(COOKIE)
            .iter()
            .find_map(|value| extract_cookie_by_name(name, value))
            .filter(|value| !value.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum SameSite {
    Lax,
}

impl fmt::Display for SameSite {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            SameSite::Lax => write!(f, "Lax"),
        }
    }
}

/// A helper extension for attaching cookies to HTTP responses.
pub trait ResponseCookies {
    /// Adds a single [`Cookie`] to the response.
    fn with_cookie(self, cookie: Cookie) -> Self;

    /// Adds multiple [`Cookie`]s to the response.
    fn with_cookies(self, cookies: impl IntoIterator<Item = Cookie>) -> Self;
}

impl ResponseCookies for http::response::Builder {
    fn with_cookies(mut self, cookies: impl IntoIterator<Item = Cookie>) -> Self {
        for cookie in cookies {
            self = self.with_cookie(cookie);
        }
        self
    }

    /// Invalid header values surface as an error when the response is built.
    fn with_cookie(self, cookie: Cookie) -> Self {
        self.header(http::header::SET_COOKIE, cookie.to_string())
    }
}
