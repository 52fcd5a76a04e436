//! Session cookies carrying the access and refresh tokens.

use axum::http::{HeaderMap, HeaderName, header};
use axum::response::AppendHeaders;
use cookie::time::Duration;
use cookie::{Cookie, SameSite};

use crate::application::services::TokenPair;
use crate::config::Config;

pub const ACCESS_COOKIE_NAME: &str = "accessToken";
pub const REFRESH_COOKIE_NAME: &str = "refreshToken";

const ACCESS_COOKIE_PATH: &str = "/";

/// The refresh cookie is only sent to the auth routes.
const REFRESH_COOKIE_PATH: &str = "/api/v1/auth";

/// `Set-Cookie` headers for an access/refresh cookie pair.
pub type CookieHeaders = AppendHeaders<[(HeaderName, String); 2]>;

/// Builds the httpOnly session cookies.
///
/// Secure cookies use `SameSite=None` so a frontend on another origin can
/// send them; without `Secure` browsers refuse `None`, so `Lax` is used.
#[derive(Debug, Clone)]
pub struct CookieBuilder {
    secure: bool,
    access_token_minutes: u64,
    refresh_token_days: u64,
}

impl CookieBuilder {
    pub fn new(secure: bool, access_token_minutes: u64, refresh_token_days: u64) -> Self {
        Self {
            secure,
            access_token_minutes,
            refresh_token_days,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.cookie_secure,
            config.access_token_minutes,
            config.refresh_token_days,
        )
    }

    fn build_cookie_base(
        &self,
        name: &'static str,
        value: String,
        path: &'static str,
        max_age: Duration,
    ) -> Cookie<'static> {
        let mut cookie = Cookie::new(name, value);
        cookie.set_path(path);
        cookie.set_http_only(true);
        cookie.set_secure(self.secure);
        cookie.set_same_site(if self.secure {
            SameSite::None
        } else {
            SameSite::Lax
        });
        cookie.set_max_age(max_age);
        cookie
    }

    pub fn build_access_cookie(&self, token: String) -> Cookie<'static> {
        self.build_cookie_base(
            ACCESS_COOKIE_NAME,
            token,
            ACCESS_COOKIE_PATH,
            Duration::minutes(self.access_token_minutes as i64),
        )
    }

    pub fn build_refresh_cookie(&self, token: String) -> Cookie<'static> {
        self.build_cookie_base(
            REFRESH_COOKIE_NAME,
            token,
            REFRESH_COOKIE_PATH,
            Duration::days(self.refresh_token_days as i64),
        )
    }

    /// Cookies for a freshly minted pair.
    pub fn session(&self, tokens: &TokenPair) -> CookieHeaders {
        set_cookie_headers([
            self.build_access_cookie(tokens.access_token.clone()),
            self.build_refresh_cookie(tokens.refresh_token.clone()),
        ])
    }

    /// Expired cookies that make the browser drop both tokens.
    ///
    /// Path and flags match the originals, otherwise the browser keeps them.
    pub fn cleared(&self) -> CookieHeaders {
        set_cookie_headers([
            self.build_cookie_base(
                ACCESS_COOKIE_NAME,
                String::new(),
                ACCESS_COOKIE_PATH,
                Duration::ZERO,
            ),
            self.build_cookie_base(
                REFRESH_COOKIE_NAME,
                String::new(),
                REFRESH_COOKIE_PATH,
                Duration::ZERO,
            ),
        ])
    }
}

fn set_cookie_headers(cookies: [Cookie<'static>; 2]) -> CookieHeaders {
    AppendHeaders(cookies.map(|c| (header::SET_COOKIE, c.to_string())))
}

/// Value of the named cookie from the request's `Cookie` headers.
///
/// Empty values count as absent.
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|c| c.name() == name)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
}
