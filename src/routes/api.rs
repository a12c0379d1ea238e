use crate::{AppState, handlers::sample};
use axum::{
    Router,
    routing::{get, post},
};

/// API Router Module
///
/// The `/sample` resource: five CRUD-shaped stubs plus one custom action.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/sample", get(sample::list_samples).post(sample::create_sample))
        // Static segment, matched ahead of `/sample/{sample_id}`.
        .route("/sample/non-generic", post(sample::post_sample_non_generic))
        .route(
            "/sample/{sample_id}",
            get(sample::retrieve_sample)
                .put(sample::update_sample)
                .delete(sample::destroy_sample),
        )
}
