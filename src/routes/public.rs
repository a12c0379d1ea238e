use crate::{AppState, handlers::views};
use axum::{Router, routing::get};

/// Public Router Module
///
/// Endpoints reachable without a session. The login view itself decides what to do
/// with an already authenticated actor.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness check for monitoring and load balancers.
        .route("/health", get(|| async { "ok" }))
        // GET/POST /login
        // Renders the credential form (setting the test cookie) and processes it.
        .route("/login", get(views::login_page).post(views::login_submit))
        // GET /logout
        // Unconditionally clears the session and returns to /login.
        .route("/logout", get(views::logout))
}
