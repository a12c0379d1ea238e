use admin_scaffold::{
    AppState, InMemoryRepository,
    config::AppConfig,
    create_router,
    models::{Record, Role, User},
    repository::Repository,
};
use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
};
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};
use tower::ServiceExt;
use uuid::Uuid;

// --- Setup ---

const PASSWORD: &str = "correct horse";
const CSRF_TOKEN: &str = "0123456789abcdef0123456789abcdef";

async fn seeded_repo() -> InMemoryRepository {
    let repo = InMemoryRepository::new();
    repo.seed_user("admin", PASSWORD, Role::Superuser)
        .await
        .unwrap();
    repo.seed_user("bob", PASSWORD, Role::User).await.unwrap();
    repo
}

async fn test_router() -> Router {
    create_router(AppState::new(
        Arc::new(seeded_repo().await),
        AppConfig::default(),
    ))
}

fn raw_login_request(uri: &str, body: String, cookie: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::HOST, "app.example")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .header(header::COOKIE, cookie)
        .body(Body::from(body))
        .unwrap()
}

/// A login post carrying a matching CSRF cookie and form token.
fn login_request(uri: &str, body: &str, cookie: Option<&str>) -> Request<Body> {
    let mut cookies = format!("csrftoken={}", CSRF_TOKEN);
    if let Some(cookie) = cookie {
        cookies.push_str("; ");
        cookies.push_str(cookie);
    }
    let body = if body.is_empty() {
        format!("csrfmiddlewaretoken={}", CSRF_TOKEN)
    } else {
        format!("{}&csrfmiddlewaretoken={}", body, CSRF_TOKEN)
    };
    raw_login_request(uri, body, cookies)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn set_cookies(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect()
}

fn location(response: &Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Logs in as the superuser and returns the `sessionid=...` cookie pair.
async fn superuser_session(app: &Router) -> String {
    let response = app
        .clone()
        .oneshot(login_request(
            "/login",
            &format!("username=admin&password={}", PASSWORD.replace(' ', "+")),
            None,
        ))
        .await
        .unwrap();
    set_cookies(&response)
        .into_iter()
        .find(|c| c.starts_with("sessionid="))
        .and_then(|c| c.split(';').next().map(str::to_string))
        .unwrap()
}

// --- Tests ---

#[tokio::test]
async fn test_health() {
    let response = test_router().await.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "ok");
}

#[tokio::test]
async fn test_login_page_sets_test_cookie() {
    let response = test_router().await.oneshot(get("/login")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        set_cookies(&response)
            .iter()
            .any(|c| c.starts_with("testcookie=worked"))
    );
    assert!(
        response
            .headers()
            .get(header::CACHE_CONTROL)
            .unwrap()
            .to_str()
            .unwrap()
            .contains("no-store")
    );
    let csrf_cookie = set_cookies(&response)
        .into_iter()
        .find(|c| c.starts_with("csrftoken="))
        .unwrap();
    let token = csrf_cookie["csrftoken=".len()..].split(';').next().unwrap().to_string();
    assert_eq!(token.len(), 32);

    let html = body_text(response).await;
    assert!(html.contains("placeholder=\"Username\""));
    assert!(html.contains("data-placeholder=\"Password\""));
    assert!(html.contains(&format!(
        "name=\"csrfmiddlewaretoken\" value=\"{}\"",
        token
    )));
}

#[tokio::test]
async fn test_login_page_keeps_existing_csrf_token() {
    let response = test_router()
        .await
        .oneshot(
            Request::builder()
                .uri("/login")
                .header(header::COOKIE, format!("csrftoken={}", CSRF_TOKEN))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert!(
        set_cookies(&response)
            .iter()
            .any(|c| c.starts_with(&format!("csrftoken={};", CSRF_TOKEN)))
    );
}

#[tokio::test]
async fn test_login_post_requires_csrf_token() {
    let app = test_router().await;
    let credentials = "username=admin&password=correct+horse";

    // No cookie and no field.
    let response = app
        .clone()
        .oneshot(raw_login_request("/login", credentials.to_string(), String::new()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(set_cookies(&response).is_empty());

    // Cookie present, field missing.
    let response = app
        .clone()
        .oneshot(raw_login_request(
            "/login",
            credentials.to_string(),
            format!("csrftoken={}", CSRF_TOKEN),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Field and cookie disagree.
    let response = app
        .oneshot(raw_login_request(
            "/login",
            format!(
                "{}&csrfmiddlewaretoken=ffffffffffffffffffffffffffffffff",
                credentials
            ),
            format!("csrftoken={}", CSRF_TOKEN),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_login_success_sets_session_and_clears_test_cookie() {
    let response = test_router()
        .await
        .oneshot(login_request(
            "/login?next=/admin/records",
            "username=admin&password=correct+horse",
            Some("testcookie=worked"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/admin/records");
    let cookies = set_cookies(&response);
    assert!(cookies.iter().any(|c| c.starts_with("sessionid=") && !c.starts_with("sessionid=;")));
    assert!(cookies.iter().any(|c| c.starts_with("testcookie=;")));
}

#[tokio::test]
async fn test_login_rejects_open_redirect() {
    let response = test_router()
        .await
        .oneshot(login_request(
            "/login?next=http%3A%2F%2Fevil.example%2Fx",
            "username=admin&password=correct+horse",
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/dashboard");
}

#[tokio::test]
async fn test_login_rejects_control_characters_in_next() {
    for next in ["%2Fa%0Ab", "%2F%09%2Fevil.example%2Fx", "%2F%0D%2Fevil.example"] {
        let response = test_router()
            .await
            .oneshot(login_request(
                &format!("/login?next={}", next),
                "username=admin&password=correct+horse",
                None,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER, "next={}", next);
        assert_eq!(location(&response), "/dashboard");
    }
}

#[tokio::test]
async fn test_login_rejects_correct_credentials_with_wrong_role() {
    let response = test_router()
        .await
        .oneshot(login_request(
            "/login",
            "username=bob&password=correct+horse",
            Some("testcookie=worked"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        !set_cookies(&response)
            .iter()
            .any(|c| c.starts_with("sessionid=")),
        "no session may be established"
    );
    let html = body_text(response).await;
    assert!(html.contains("<li>Unauthorized</li>"));
}

#[tokio::test]
async fn test_login_rejects_bad_password() {
    let response = test_router()
        .await
        .oneshot(login_request("/login", "username=admin&password=nope", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Please enter a correct username and password."));
}

#[tokio::test]
async fn test_login_requires_fields() {
    let response = test_router()
        .await
        .oneshot(login_request("/login", "", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_text(response).await.matches("This field is required.").count(),
        2
    );
}

#[tokio::test]
async fn test_authenticated_actor_skips_login() {
    let app = test_router().await;
    let session = superuser_session(&app).await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/login")
                .header(header::COOKIE, session)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/dashboard");
}

#[tokio::test]
async fn test_dashboard_requires_login() {
    let app = test_router().await;

    let response = app.clone().oneshot(get("/dashboard")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login?next=%2Fdashboard");

    let session = superuser_session(&app).await;
    let response = app
        .oneshot(
            Request::builder()
                .uri("/dashboard")
                .header(header::COOKIE, session)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Signed in as <strong>admin</strong>"));
}

#[tokio::test]
async fn test_admin_records_gate() {
    let app = test_router().await;

    let response = app.clone().oneshot(get("/admin/records")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let session = superuser_session(&app).await;
    let response = app
        .oneshot(
            Request::builder()
                .uri("/admin/records?ordering=name")
                .header(header::COOKIE, session)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let context: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(context["order_by"], "name");
    assert_eq!(context["ordering_fields"][0], "name");
}

#[tokio::test]
async fn test_non_generic_sample_over_http() {
    let app = test_router().await;

    let invalid = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/sample/non-generic")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"name": "widget"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(invalid).await, r#"{"message":"Error"}"#);

    let valid = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/sample/non-generic")
                .header(header::CONTENT_TYPE, "application/json")
                .header(header::ACCEPT_LANGUAGE, "fr")
                .body(Body::from(r#"{"name": "widget", "quantity": 2}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(valid.status(), StatusCode::OK);
    assert_eq!(body_text(valid).await, r#"{"message":"Success"}"#);
}

// --- Actor lookups ---

/// Wraps the in-memory store and counts `get_user` calls.
struct CountingRepo {
    inner: InMemoryRepository,
    user_lookups: AtomicUsize,
}

#[async_trait]
impl Repository for CountingRepo {
    async fn get_user(&self, id: Uuid) -> Option<User> {
        self.user_lookups.fetch_add(1, Ordering::SeqCst);
        self.inner.get_user(id).await
    }
    async fn find_user_by_username(&self, username: &str) -> Option<User> {
        self.inner.find_user_by_username(username).await
    }
    async fn create_user(&self, user: User) -> Option<User> {
        self.inner.create_user(user).await
    }
    async fn list_records(&self, ordering: Option<String>) -> Vec<Record> {
        self.inner.list_records(ordering).await
    }
    async fn get_record(&self, id: Uuid) -> Option<Record> {
        self.inner.get_record(id).await
    }
    async fn create_record(&self, record: Record) -> Option<Record> {
        self.inner.create_record(record).await
    }
    async fn save_record(&self, record: &Record) -> bool {
        self.inner.save_record(record).await
    }
}

#[tokio::test]
async fn test_dashboard_resolves_actor_once() {
    let repo = Arc::new(CountingRepo {
        inner: seeded_repo().await,
        user_lookups: AtomicUsize::new(0),
    });
    let app = create_router(AppState::new(repo.clone(), AppConfig::default()));
    let session = superuser_session(&app).await;

    let before = repo.user_lookups.load(Ordering::SeqCst);
    let response = app
        .oneshot(
            Request::builder()
                .uri("/dashboard")
                .header(header::COOKIE, session)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(repo.user_lookups.load(Ordering::SeqCst) - before, 1);
}
