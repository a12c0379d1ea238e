//! Cross-site request forgery protection for the login form.
//!
//! Double-submit scheme: the form page sets a random token in the `csrftoken` cookie
//! and embeds the same token in a hidden field. A POST is accepted only when both
//! are present and equal. A foreign site can make the browser send the cookie but
//! cannot read it to fill in the field.

use axum::http::HeaderMap;
use uuid::Uuid;

use crate::{error::AppError, session::read_cookie};

/// Name of the cookie holding the token.
pub const CSRF_COOKIE: &str = "csrftoken";
/// Name of the hidden form field echoing the token.
pub const CSRF_FIELD: &str = "csrfmiddlewaretoken";

const TOKEN_LEN: usize = 32;

pub fn new_token() -> String {
    Uuid::new_v4().simple().to_string()
}

fn well_formed(token: &str) -> bool {
    token.len() == TOKEN_LEN && token.bytes().all(|b| b.is_ascii_alphanumeric())
}

/// The token the client already holds, or a fresh one when it has none (or a
/// malformed one).
pub fn token_for(headers: &HeaderMap) -> String {
    read_cookie(headers, CSRF_COOKIE)
        .filter(|token| well_formed(token))
        .unwrap_or_else(new_token)
}

/// verify
///
/// Accepts the request iff the cookie carries a well-formed token equal to the one
/// submitted with the form.
pub fn verify(headers: &HeaderMap, submitted: &str) -> Result<(), AppError> {
    let Some(cookie) = read_cookie(headers, CSRF_COOKIE).filter(|token| well_formed(token))
    else {
        return Err(AppError::Csrf("CSRF cookie not set".into()));
    };
    if cookie != submitted {
        return Err(AppError::Csrf("CSRF token missing or incorrect".into()));
    }
    Ok(())
}
