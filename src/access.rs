//! Role gating for views.
//!
//! Handlers opt in by naming one of the extractors below in their signature. The gate
//! is evaluated before the handler body runs:
//!
//! - [`LoginRequired`]: anonymous requests are redirected to the login page.
//! - [`SuperuserOnly`]: anonymous requests are redirected, authenticated actors
//!   without the privileged role get `403 Forbidden`.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};

use crate::{
    auth::AuthUser,
    config::AppConfig,
    error::AppError,
    models::Role,
    repository::RepositoryState,
    session::SessionManager,
};

/// The privileged role required by the administration views.
pub const PRIVILEGED_ROLE: Role = Role::Superuser;

/// True iff an actor is present and holds the privileged role. Anonymous requests
/// always fail closed.
pub fn is_superuser(actor: Option<&AuthUser>) -> bool {
    actor.is_some_and(|actor| actor.role == PRIVILEGED_ROLE)
}

fn login_required(parts: &Parts, config: &AppConfig) -> AppError {
    let next = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| parts.uri.path().to_string());
    AppError::LoginRequired {
        login_url: config.login_url.clone(),
        next,
    }
}

/// LoginRequired
///
/// Any authenticated actor.
#[derive(Debug, Clone)]
pub struct LoginRequired(pub AuthUser);

impl<S> FromRequestParts<S> for LoginRequired
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
    SessionManager: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match AuthUser::resolve(parts, state).await {
            Some(actor) => Ok(LoginRequired(actor)),
            None => Err(login_required(parts, &AppConfig::from_ref(state))),
        }
    }
}

/// SuperuserOnly
///
/// An authenticated actor holding [`PRIVILEGED_ROLE`].
#[derive(Debug, Clone)]
pub struct SuperuserOnly(pub AuthUser);

impl<S> FromRequestParts<S> for SuperuserOnly
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
    SessionManager: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match AuthUser::resolve(parts, state).await {
            Some(actor) if is_superuser(Some(&actor)) => Ok(SuperuserOnly(actor)),
            Some(actor) => {
                tracing::warn!(user_id = %actor.id, "non-superuser denied access");
                Err(AppError::Forbidden)
            }
            None => Err(login_required(parts, &AppConfig::from_ref(state))),
        }
    }
}
