use axum::http::{HeaderMap, HeaderValue, header};
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind};
use uuid::Uuid;

use crate::{
    auth::Claims,
    csrf::CSRF_COOKIE,
    config::{AppConfig, Env},
    error::AppError,
};

/// Name of the cookie carrying the signed session token.
pub const SESSION_COOKIE: &str = "sessionid";
/// Name and value of the one-time cookie-capability check.
pub const TEST_COOKIE: &str = "testcookie";
pub const TEST_COOKIE_VALUE: &str = "worked";
/// The CSRF cookie outlives sessions so an open login form stays postable.
const CSRF_COOKIE_AGE_SECS: u64 = 60 * 60 * 24 * 364;

/// SessionManager
///
/// Establishes and clears the identity attached to a browser. Sessions are
/// stateless: the cookie holds an HS256-signed token whose `sub` is the user id, so
/// logging out only needs to expire the cookie.
#[derive(Clone)]
pub struct SessionManager {
    secret: String,
    ttl_secs: u64,
    secure: bool,
}

impl SessionManager {
    pub fn new(secret: impl Into<String>, ttl_secs: u64, secure: bool) -> Self {
        Self {
            secret: secret.into(),
            ttl_secs,
            secure,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.session_secret.clone(),
            config.session_ttl_secs,
            config.env == Env::Production,
        )
    }

    /// issue
    ///
    /// Signs a session token for `user_id` valid for the configured lifetime.
    pub fn issue(&self, user_id: Uuid) -> Result<String, AppError> {
        let now = Utc::now().timestamp().max(0) as usize;
        let claims = Claims {
            sub: user_id,
            iat: now,
            exp: now + self.ttl_secs as usize,
        };
        let key = EncodingKey::from_secret(self.secret.as_bytes());
        encode(&Header::default(), &claims, &key)
            .map_err(|e| AppError::Internal(format!("session signing failed: {}", e)))
    }

    /// validate
    ///
    /// Returns the user id carried by a well-formed, correctly signed, unexpired token.
    pub fn validate(&self, token: &str) -> Option<Uuid> {
        let key = DecodingKey::from_secret(self.secret.as_bytes());
        let mut validation = Validation::default();
        validation.validate_exp = true;

        match decode::<Claims>(token, &key, &validation) {
            Ok(data) => Some(data.claims.sub),
            Err(e) => {
                match e.kind() {
                    ErrorKind::ExpiredSignature => tracing::debug!("session token expired"),
                    _ => tracing::debug!("session token rejected: {}", e),
                }
                None
            }
        }
    }

    pub fn login_cookie(&self, token: &str) -> String {
        self.cookie(SESSION_COOKIE, token, self.ttl_secs)
    }

    pub fn logout_cookie(&self) -> String {
        self.cookie(SESSION_COOKIE, "", 0)
    }

    pub fn test_cookie(&self) -> String {
        self.cookie(TEST_COOKIE, TEST_COOKIE_VALUE, self.ttl_secs)
    }

    pub fn clear_test_cookie(&self) -> String {
        self.cookie(TEST_COOKIE, "", 0)
    }

    pub fn csrf_cookie(&self, token: &str) -> String {
        self.cookie(CSRF_COOKIE, token, CSRF_COOKIE_AGE_SECS)
    }

    fn cookie(&self, name: &str, value: &str, max_age: u64) -> String {
        let mut cookie = format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
            name, value, max_age
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }
}

/// Reads a cookie value from the request's `Cookie` headers.
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
}

/// True when the client sent the test cookie back, i.e. it accepts cookies.
pub fn test_cookie_worked(headers: &HeaderMap) -> bool {
    read_cookie(headers, TEST_COOKIE).as_deref() == Some(TEST_COOKIE_VALUE)
}

/// Appends a `Set-Cookie` header; several cookies can be set on one response.
pub fn append_set_cookie(headers: &mut HeaderMap, cookie: &str) -> Result<(), AppError> {
    let value = HeaderValue::from_str(cookie)
        .map_err(|e| AppError::Internal(format!("invalid cookie header: {}", e)))?;
    headers.append(header::SET_COOKIE, value);
    Ok(())
}
