use crate::{AppState, handlers::records};
use axum::{Router, routing::get};

/// Admin Router Module
///
/// Record management, nested under `/admin`. Every handler takes the `SuperuserOnly`
/// extractor: anonymous requests are sent to the login page, other roles get 403.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // GET /admin/records?ordering=...&name=...&category=...&active=...
        .route("/records", get(records::list_records))
        // GET /admin/records/{id}/delete
        // Soft delete: stamps `deleted_by` and redirects back to the list.
        .route("/records/{id}/delete", get(records::soft_delete_record))
}
