use axum::{
    Extension, Form,
    extract::{Query, State},
    http::{HeaderMap, HeaderValue, header},
    response::{Html, IntoResponse, Redirect, Response},
};

use crate::{
    AppState,
    access::PRIVILEGED_ROLE,
    auth::{AuthUser, Authenticator, CurrentActor},
    csrf,
    error::AppError,
    forms::{FormErrors, FormField, apply_placeholders},
    models::{LoginForm, LoginQuery},
    redirect::resolve_success_url,
    session::{append_set_cookie, test_cookie_worked},
    templates,
};

pub const UNAUTHORIZED_MESSAGE: &str = "Unauthorized";
pub const INVALID_LOGIN_MESSAGE: &str =
    "Please enter a correct username and password. Note that both fields may be case-sensitive.";
pub const REQUIRED_MESSAGE: &str = "This field is required.";

fn login_fields(username: &str) -> Vec<FormField> {
    let mut fields = vec![
        FormField::new("username", "Username", "text").with_value(username),
        FormField::new("password", "Password", "password"),
    ];
    apply_placeholders(&mut fields);
    fields
}

/// Headers of every rendered login page: never-cache, the cookie-capability check
/// and the CSRF cookie.
fn login_page_headers(state: &AppState, csrf_token: &str) -> Result<HeaderMap, AppError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("no-cache, no-store, must-revalidate, private"),
    );
    append_set_cookie(&mut headers, &state.sessions.test_cookie())?;
    append_set_cookie(&mut headers, &state.sessions.csrf_cookie(csrf_token))?;
    Ok(headers)
}

fn render_login(
    state: &AppState,
    query: &LoginQuery,
    request_headers: &HeaderMap,
    username: &str,
    errors: &FormErrors,
) -> Result<Response, AppError> {
    // The form posts back to itself, keeping the requested destination.
    let action = match query.next.as_deref() {
        Some(next) => AppError::login_redirect_target(&state.config.login_url, next),
        None => state.config.login_url.clone(),
    };
    let csrf_token = csrf::token_for(request_headers);
    let headers = login_page_headers(state, &csrf_token)?;
    let html = templates::login_page(&action, &login_fields(username), errors, &csrf_token)?;
    Ok((headers, html).into_response())
}

/// login_page
///
/// `GET /login`. An already authenticated actor goes straight to the default success
/// destination; everyone else gets the form and the test cookie.
pub async fn login_page(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Query(query): Query<LoginQuery>,
    request_headers: HeaderMap,
) -> Result<Response, AppError> {
    if actor.is_some() {
        return Ok(Redirect::to(&state.config.login_redirect_url).into_response());
    }
    render_login(&state, &query, &request_headers, "", &FormErrors::default())
}

/// login_submit
///
/// `POST /login`. The CSRF token is checked before anything else (403 on mismatch).
/// Credentials are verified next, then the role: a correct password
/// on an account without the privileged role is rejected with a field error on
/// `username` and no session is established. On success the session cookie is set,
/// the test cookie cleared if it came back, and the actor is redirected to `next`
/// when it is a safe target.
pub async fn login_submit(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Query(query): Query<LoginQuery>,
    request_headers: HeaderMap,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    csrf::verify(&request_headers, &form.csrf_token)?;

    if actor.is_some() {
        return Ok(Redirect::to(&state.config.login_redirect_url).into_response());
    }

    let mut errors = FormErrors::default();
    if form.username.trim().is_empty() {
        errors.add("username", REQUIRED_MESSAGE);
    }
    if form.password.is_empty() {
        errors.add("password", REQUIRED_MESSAGE);
    }
    if !errors.is_empty() {
        return render_login(&state, &query, &request_headers, &form.username, &errors);
    }

    let authenticator = Authenticator::new(state.repo.clone());
    let Some(user) = authenticator.verify(&form.username, &form.password).await else {
        tracing::info!(username = %form.username, "login rejected: bad credentials");
        errors.add(FormErrors::NON_FIELD, INVALID_LOGIN_MESSAGE);
        return render_login(&state, &query, &request_headers, &form.username, &errors);
    };

    if user.role != PRIVILEGED_ROLE {
        tracing::warn!(user_id = %user.id, role = user.role.as_str(), "login rejected: role");
        errors.add("username", UNAUTHORIZED_MESSAGE);
        return render_login(&state, &query, &request_headers, &form.username, &errors);
    }

    let token = state.sessions.issue(user.id)?;
    let mut headers = HeaderMap::new();
    append_set_cookie(&mut headers, &state.sessions.login_cookie(&token))?;
    if test_cookie_worked(&request_headers) {
        append_set_cookie(&mut headers, &state.sessions.clear_test_cookie())?;
    }

    let host = request_headers
        .get(header::HOST)
        .and_then(|value| value.to_str().ok());
    let target = resolve_success_url(
        query.next.as_deref(),
        host,
        &state.config.login_redirect_url,
    );

    tracing::info!(user_id = %user.id, "login succeeded");
    Ok((headers, Redirect::to(&target)).into_response())
}

/// logout
///
/// `GET /logout`. Clears the session and returns to the login page. Always succeeds.
pub async fn logout(State(state): State<AppState>) -> Response {
    let mut headers = HeaderMap::new();
    if let Err(e) = append_set_cookie(&mut headers, &state.sessions.logout_cookie()) {
        tracing::error!("logout cookie not set: {}", e);
    }
    (headers, Redirect::to(&state.config.login_url)).into_response()
}

/// dashboard
///
/// `GET /dashboard`, for any authenticated actor. The actor is the one the
/// `LoginRequired` route layer resolved and stored in the request extensions.
pub async fn dashboard(Extension(actor): Extension<AuthUser>) -> Result<Html<String>, AppError> {
    templates::dashboard_page(&actor, "/logout")
}
