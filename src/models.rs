use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::AppError;

// --- Identity ---

/// Role
///
/// The closed set of roles an actor can hold. Only `Superuser` may sign in to the
/// administration views.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Role {
    #[default]
    User,
    Superuser,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Superuser => "superuser",
        }
    }
}

/// Decoding from the `role` text column. Unknown values fall back to the
/// unprivileged role so that a bad row can never grant access.
impl From<String> for Role {
    fn from(value: String) -> Self {
        match value.as_str() {
            "superuser" => Role::Superuser,
            _ => Role::User,
        }
    }
}

/// User
///
/// The canonical identity record stored in the `users` table. The credential
/// columns never leave the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, Default)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    #[sqlx(try_from = "String")]
    pub role: Role,
    // Argon2 PHC string; it embeds its own salt and parameters.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
}

// --- Soft-deletable records ---

/// Record
///
/// A persisted entity that is never physically removed by the web layer. It is
/// active for as long as `deleted_by` is unset.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS, ToSchema, FromRow, Default,
)]
#[ts(export)]
pub struct Record {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    // The actor who soft-deleted the record, if any.
    pub deleted_by: Option<Uuid>,
}

impl Record {
    pub fn new(name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            category: category.into(),
            created_at: Utc::now(),
            deleted_by: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.deleted_by.is_none()
    }

    /// Stamps the record as deleted by `actor`. Re-stamping an already deleted
    /// record simply overwrites the previous value.
    pub fn mark_deleted(&mut self, actor: Uuid) {
        self.deleted_by = Some(actor);
    }
}

// --- Request Payloads ---

/// LoginForm
///
/// Form-encoded credentials posted to `/login`. Missing fields decode as empty strings
/// so they surface as "required" form errors instead of a rejected request.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    // Echo of the `csrftoken` cookie, posted as `csrfmiddlewaretoken`.
    #[serde(default, rename = "csrfmiddlewaretoken")]
    pub csrf_token: String,
}

/// LoginQuery
///
/// Query string of the login view. `next` is the requested post-login destination.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct LoginQuery {
    pub next: Option<String>,
}

/// SampleNonGenericRequest
///
/// Input payload of `POST /sample/non-generic`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct SampleNonGenericRequest {
    #[schema(example = "widget")]
    pub name: String,
    #[schema(example = 3, minimum = 1, maximum = 1000)]
    pub quantity: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

pub const SAMPLE_NAME_MAX_LEN: usize = 100;
pub const SAMPLE_NOTE_MAX_LEN: usize = 500;
pub const SAMPLE_QUANTITY_RANGE: std::ops::RangeInclusive<i64> = 1..=1000;

impl SampleNonGenericRequest {
    /// Field-level rules applied after the body has been decoded.
    pub fn validate(&self) -> Result<(), AppError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("name: this field may not be blank".into()));
        }
        if name.chars().count() > SAMPLE_NAME_MAX_LEN {
            return Err(AppError::Validation(format!(
                "name: ensure this field has no more than {} characters",
                SAMPLE_NAME_MAX_LEN
            )));
        }
        if !SAMPLE_QUANTITY_RANGE.contains(&self.quantity) {
            return Err(AppError::Validation(format!(
                "quantity: must be between {} and {}",
                SAMPLE_QUANTITY_RANGE.start(),
                SAMPLE_QUANTITY_RANGE.end()
            )));
        }
        if let Some(note) = &self.note {
            if note.chars().count() > SAMPLE_NOTE_MAX_LEN {
                return Err(AppError::Validation(format!(
                    "note: ensure this field has no more than {} characters",
                    SAMPLE_NOTE_MAX_LEN
                )));
            }
        }
        Ok(())
    }
}

// --- Responses ---

/// MessageResponse
///
/// The `{ "message": ... }` acknowledgement returned by every sample endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct MessageResponse {
    #[schema(example = "Success")]
    pub message: String,
}

impl MessageResponse {
    pub const SUCCESS: &'static str = "Success";
    pub const ERROR: &'static str = "Error";

    pub fn success() -> Self {
        Self {
            message: Self::SUCCESS.to_string(),
        }
    }

    pub fn error() -> Self {
        Self {
            message: Self::ERROR.to_string(),
        }
    }
}
