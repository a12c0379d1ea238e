//! Server-side pages of the authentication views, rendered with askama.
//!
//! Markup lives under `templates/`. Values are HTML-escaped by the engine.

use askama::Template;
use axum::response::Html;

use crate::{
    auth::AuthUser,
    csrf::CSRF_FIELD,
    error::AppError,
    forms::{FormErrors, FormField},
};

/// A form field joined with its own error messages, ready for display.
pub struct FieldView {
    pub name: String,
    pub label: String,
    pub input_type: String,
    pub value: String,
    pub attrs: Vec<(String, String)>,
    pub errors: Vec<String>,
}

impl FieldView {
    fn new(field: &FormField, errors: &FormErrors) -> Self {
        Self {
            name: field.name.clone(),
            label: field.label.clone(),
            input_type: field.input_type.clone(),
            value: field.value.clone(),
            attrs: field
                .attrs
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            errors: errors.field(&field.name).to_vec(),
        }
    }
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub action: String,
    pub csrf_field: &'static str,
    pub csrf_token: String,
    pub non_field_errors: Vec<String>,
    pub fields: Vec<FieldView>,
}

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub username: String,
    pub role: &'static str,
    pub logout_url: String,
}

fn render<T: Template>(template: &T) -> Result<Html<String>, AppError> {
    template
        .render()
        .map(Html)
        .map_err(|e| AppError::Internal(format!("template rendering failed: {}", e)))
}

/// The login form posting back to `action`, carrying the CSRF token.
pub fn login_page(
    action: &str,
    fields: &[FormField],
    errors: &FormErrors,
    csrf_token: &str,
) -> Result<Html<String>, AppError> {
    render(&LoginTemplate {
        action: action.to_string(),
        csrf_field: CSRF_FIELD,
        csrf_token: csrf_token.to_string(),
        non_field_errors: errors.non_field().to_vec(),
        fields: fields.iter().map(|f| FieldView::new(f, errors)).collect(),
    })
}

pub fn dashboard_page(actor: &AuthUser, logout_url: &str) -> Result<Html<String>, AppError> {
    render(&DashboardTemplate {
        username: actor.username.clone(),
        role: actor.role.as_str(),
        logout_url: logout_url.to_string(),
    })
}
