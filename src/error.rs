use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use thiserror::Error;

use crate::models::MessageResponse;

/// AppError
///
/// Every failure a handler can surface. Each variant resolves to a defined,
/// caller-visible outcome in `into_response`; nothing escapes as a raw fault.
#[derive(Debug, Error)]
pub enum AppError {
    /// The requested record does not exist.
    #[error("resource not found")]
    NotFound,

    /// The actor is authenticated but does not hold the required role.
    #[error("access denied")]
    Forbidden,

    /// No actor is attached to the request. Resolves to a redirect to the login
    /// page carrying the original destination in `next`.
    #[error("login required")]
    LoginRequired { login_url: String, next: String },

    /// A form post without a matching CSRF token.
    #[error("CSRF verification failed: {0}")]
    Csrf(String),

    /// A payload failed validation.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Anything the caller cannot act on (token signing, header encoding, ...).
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// The login redirect target, e.g. `/login?next=%2Fdashboard`.
    pub fn login_redirect_target(login_url: &str, next: &str) -> String {
        let encoded: String = url::form_urlencoded::byte_serialize(next.as_bytes()).collect();
        format!("{}?next={}", login_url, encoded)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::NotFound => StatusCode::NOT_FOUND.into_response(),
            AppError::Forbidden => StatusCode::FORBIDDEN.into_response(),
            AppError::LoginRequired { login_url, next } => {
                Redirect::to(&AppError::login_redirect_target(&login_url, &next)).into_response()
            }
            AppError::Csrf(reason) => {
                tracing::warn!("forbidden (CSRF): {}", reason);
                (StatusCode::FORBIDDEN, "CSRF verification failed").into_response()
            }
            AppError::Validation(reason) => {
                tracing::debug!("validation failure: {}", reason);
                (StatusCode::BAD_REQUEST, Json(MessageResponse::error())).into_response()
            }
            AppError::Internal(reason) => {
                // Log the underlying cause but return a generic error to the client.
                tracing::error!("internal error: {}", reason);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
            }
        }
    }
}
