use axum::{
    Json,
    extract::{Path, Query, State},
    response::Redirect,
};
use uuid::Uuid;

use crate::{
    AppState,
    access::SuperuserOnly,
    error::AppError,
    filters::{FilterState, RecordFilter},
    listing::{ListContext, ListView, OrderingOptions, QueryParams},
    models::Record,
};

/// Orderable columns of the record list, newest first by default.
pub const RECORD_ORDERING_FIELDS: [&str; 3] = ["name", "category", "created_at"];
pub const RECORD_DEFAULT_ORDERING: [&str; 1] = ["-created_at"];

pub fn record_list_view() -> ListView<RecordFilter> {
    ListView::new(
        OrderingOptions::new(&RECORD_ORDERING_FIELDS, &RECORD_DEFAULT_ORDERING),
        RecordFilter,
    )
}

/// list_records
///
/// [Admin Route] Lists records with `?ordering=` and the record filters applied.
#[utoipa::path(
    get,
    path = "/admin/records",
    params(
        ("ordering" = Option<String>, Query, description = "Field name, `-` prefix for descending"),
        ("name" = Option<String>, Query, description = "Case-insensitive name substring"),
        ("category" = Option<String>, Query, description = "Exact category"),
        ("active" = Option<bool>, Query, description = "Live (true) or soft-deleted (false)")
    ),
    responses(
        (status = 200, description = "Record list context"),
        (status = 303, description = "Not signed in"),
        (status = 403, description = "Not a superuser")
    )
)]
pub async fn list_records(
    SuperuserOnly(_actor): SuperuserOnly,
    State(state): State<AppState>,
    Query(params): Query<QueryParams>,
) -> Json<ListContext<Record, FilterState>> {
    let repo = state.repo.clone();
    let context = record_list_view()
        .load(&params, |ordering| async move { repo.list_records(ordering).await })
        .await;
    Json(context)
}

/// soft_delete_record
///
/// [Admin Route] Marks a record as deleted by the current actor and redirects to the
/// record list. Triggered by a GET on purpose; there is no confirmation step and
/// repeating it simply re-stamps the same actor.
#[utoipa::path(
    get,
    path = "/admin/records/{id}/delete",
    params(("id" = Uuid, Path, description = "Record ID")),
    responses(
        (status = 303, description = "Soft-deleted, redirect to the list"),
        (status = 403, description = "Not a superuser"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn soft_delete_record(
    SuperuserOnly(actor): SuperuserOnly,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Redirect, AppError> {
    let mut record = state.repo.get_record(id).await.ok_or(AppError::NotFound)?;
    record.mark_deleted(actor.id);

    if !state.repo.save_record(&record).await {
        return Err(AppError::Internal(format!("record {} could not be saved", id)));
    }

    tracing::info!(record_id = %id, user_id = %actor.id, "record soft-deleted");
    Ok(Redirect::to(&state.config.records_success_url))
}
