//! `/sample` resource. Every endpoint is a stub: nothing is persisted and the
//! resolved locale is not yet used to select the message text.

use axum::{
    Json,
    extract::{Path, rejection::JsonRejection},
    http::StatusCode,
};

use crate::{
    error::AppError,
    locale::Locale,
    models::{MessageResponse, SampleNonGenericRequest},
};

type Ack = (StatusCode, Json<MessageResponse>);

fn success(status: StatusCode) -> Ack {
    (status, Json(MessageResponse::success()))
}

/// list_samples
#[utoipa::path(
    get,
    path = "/sample",
    responses((status = 200, description = "Listed", body = MessageResponse))
)]
pub async fn list_samples(Locale(lang): Locale) -> Ack {
    tracing::debug!(%lang, "list samples");
    success(StatusCode::OK)
}

/// retrieve_sample
#[utoipa::path(
    get,
    path = "/sample/{sample_id}",
    params(("sample_id" = String, Path, description = "Sample ID")),
    responses((status = 200, description = "Found", body = MessageResponse))
)]
pub async fn retrieve_sample(Locale(lang): Locale, Path(sample_id): Path<String>) -> Ack {
    tracing::debug!(%lang, %sample_id, "retrieve sample");
    success(StatusCode::OK)
}

/// create_sample
#[utoipa::path(
    post,
    path = "/sample",
    responses((status = 201, description = "Created", body = MessageResponse))
)]
pub async fn create_sample(Locale(lang): Locale) -> Ack {
    tracing::debug!(%lang, "create sample");
    success(StatusCode::CREATED)
}

/// update_sample
#[utoipa::path(
    put,
    path = "/sample/{sample_id}",
    params(("sample_id" = String, Path, description = "Sample ID")),
    responses((status = 200, description = "Updated", body = MessageResponse))
)]
pub async fn update_sample(Locale(lang): Locale, Path(sample_id): Path<String>) -> Ack {
    tracing::debug!(%lang, %sample_id, "update sample");
    success(StatusCode::OK)
}

/// destroy_sample
#[utoipa::path(
    delete,
    path = "/sample/{sample_id}",
    params(("sample_id" = String, Path, description = "Sample ID")),
    responses((status = 200, description = "Deleted", body = MessageResponse))
)]
pub async fn destroy_sample(Locale(lang): Locale, Path(sample_id): Path<String>) -> Ack {
    tracing::debug!(%lang, %sample_id, "destroy sample");
    success(StatusCode::OK)
}

/// post_sample_non_generic
///
/// Validates the body against [`SampleNonGenericRequest`]. A body that is missing,
/// not JSON, of the wrong shape or breaking a field rule gets `400 {"message":"Error"}`.
#[utoipa::path(
    post,
    path = "/sample/non-generic",
    request_body = SampleNonGenericRequest,
    responses(
        (status = 200, description = "Accepted", body = MessageResponse),
        (status = 400, description = "Invalid payload", body = MessageResponse)
    )
)]
pub async fn post_sample_non_generic(
    Locale(lang): Locale,
    payload: Result<Json<SampleNonGenericRequest>, JsonRejection>,
) -> Result<Ack, AppError> {
    tracing::debug!(%lang, "non-generic sample");
    let Json(request) = payload.map_err(|rejection| AppError::Validation(rejection.body_text()))?;
    request.validate()?;
    Ok(success(StatusCode::OK))
}
