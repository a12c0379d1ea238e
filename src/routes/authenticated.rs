use crate::{AppState, handlers::views};
use axum::{Router, routing::get};

/// Authenticated Router Module
///
/// Routes for any signed-in actor. The `LoginRequired` route layer applied in
/// `create_router` redirects anonymous requests to the login page.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET /dashboard
        .route("/dashboard", get(views::dashboard))
}
