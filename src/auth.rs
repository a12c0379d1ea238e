use std::convert::Infallible;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{StatusCode, header, request::Parts},
};
use serde::{Deserialize, Serialize};
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use uuid::Uuid;

use crate::{
    config::{AppConfig, Env},
    error::AppError,
    models::{Role, User},
    repository::RepositoryState,
    session::{self, SessionManager},
};

/// Claims
///
/// Payload of a signed session token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (sub): the UUID of the user the session belongs to.
    pub sub: Uuid,
    /// Expiration Time (exp): the session must not be accepted after this timestamp.
    pub exp: usize,
    /// Issued At (iat): when the session was established.
    pub iat: usize,
}

/// AuthUser
///
/// The resolved identity of the actor performing a request.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthUser {
    pub id: Uuid,
    pub username: String,
    /// Used by the role gate; only `Role::Superuser` passes it.
    pub role: Role,
}

impl From<User> for AuthUser {
    fn from(user: User) -> Self {
        AuthUser {
            id: user.id,
            username: user.username,
            role: user.role,
        }
    }
}

impl AuthUser {
    /// resolve
    ///
    /// Works out which actor, if any, is attached to a request:
    /// 1. Local Bypass: in `Env::Local`, an `x-user-id` header naming a stored user.
    /// 2. Session Cookie: the signed token set by the login view.
    /// 3. Bearer Token: the same token passed in `Authorization` by API clients.
    ///
    /// The user is then re-read from the repository so a deleted account or a changed
    /// role takes effect immediately.
    pub async fn resolve<S>(parts: &Parts, state: &S) -> Option<AuthUser>
    where
        S: Send + Sync,
        RepositoryState: FromRef<S>,
        AppConfig: FromRef<S>,
        SessionManager: FromRef<S>,
    {
        let repo = RepositoryState::from_ref(state);
        let config = AppConfig::from_ref(state);
        let sessions = SessionManager::from_ref(state);

        if config.env == Env::Local {
            let bypass_id = parts
                .headers
                .get("x-user-id")
                .and_then(|value| value.to_str().ok())
                .and_then(|id_str| Uuid::parse_str(id_str).ok());
            if let Some(user_id) = bypass_id {
                if let Some(user) = repo.get_user(user_id).await {
                    return Some(user.into());
                }
            }
        }

        let token = session::read_cookie(&parts.headers, session::SESSION_COOKIE)
            .filter(|token| !token.is_empty())
            .or_else(|| {
                parts
                    .headers
                    .get(header::AUTHORIZATION)
                    .and_then(|value| value.to_str().ok())
                    .and_then(|value| value.strip_prefix("Bearer "))
                    .map(str::to_string)
            })?;

        let user_id = sessions.validate(&token)?;
        repo.get_user(user_id).await.map(AuthUser::from)
    }
}

/// Strict extractor for API-style handlers: rejects with 401 when no actor is attached.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
    SessionManager: FromRef<S>,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        AuthUser::resolve(parts, state)
            .await
            .ok_or(StatusCode::UNAUTHORIZED)
    }
}

/// CurrentActor
///
/// Lenient extractor: the actor if there is one, `None` for anonymous requests.
/// Never rejects.
#[derive(Debug, Clone)]
pub struct CurrentActor(pub Option<AuthUser>);

impl<S> FromRequestParts<S> for CurrentActor
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
    SessionManager: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Ok(CurrentActor(AuthUser::resolve(parts, state).await))
    }
}

/// hash_password
///
/// Hashes a password with Argon2 under a fresh random salt. The result is a PHC
/// string (`$argon2id$v=19$...`) carrying the salt and parameters.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::encode_b64(Uuid::new_v4().as_bytes())
        .map_err(|e| AppError::Internal(format!("password salt failed: {}", e)))?;

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("password hashing failed: {}", e)))
}

/// Checks a password against a stored PHC string. A malformed hash never verifies.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::error!("stored password hash unreadable: {}", e);
            return false;
        }
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

/// Authenticator
///
/// Verifies submitted credentials against the stored password hashes. Role checks
/// are not its concern; the login view applies them separately.
pub struct Authenticator {
    repo: RepositoryState,
}

impl Authenticator {
    pub fn new(repo: RepositoryState) -> Self {
        Self { repo }
    }

    pub async fn verify(&self, username: &str, password: &str) -> Option<User> {
        let user = self.repo.find_user_by_username(username).await?;
        verify_password(password, &user.password_hash).then_some(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashes_are_salted_and_verifiable() {
        let a = hash_password("pw").unwrap();
        let b = hash_password("pw").unwrap();
        assert!(a.starts_with("$argon2"));
        assert_ne!(a, b, "each hash gets its own salt");

        assert!(verify_password("pw", &a));
        assert!(verify_password("pw", &b));
        assert!(!verify_password("pw2", &a));
    }

    #[test]
    fn malformed_hash_never_verifies() {
        assert!(!verify_password("pw", ""));
        assert!(!verify_password("pw", "5e884898da28047151d0e56f8dc6292773603d0d"));
    }
}
