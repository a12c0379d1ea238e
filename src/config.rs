use std::env;

/// AppConfig
///
/// Holds the application's entire configuration state. This struct is immutable once
/// loaded and is pulled into handlers and extractors via FromRef, as part of the
/// shared `AppState`.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Controls the dev bypass and cookie hardening.
    pub env: Env,
    // Postgres connection string. `None` selects the in-memory store (local only).
    pub db_url: Option<String>,
    // HMAC secret used to sign session tokens.
    pub session_secret: String,
    // Lifetime of an established session, in seconds.
    pub session_ttl_secs: u64,
    // Locale codes accepted from the Accept-Language header.
    pub supported_languages: Vec<String>,
    // Locale used when the header is missing or unsupported.
    pub default_language: String,
    // Socket address the HTTP server binds to.
    pub bind_addr: String,
    // Entry point of the authentication flow.
    pub login_url: String,
    // Default destination after a successful login.
    pub login_redirect_url: String,
    // Destination after a record has been soft-deleted.
    pub records_success_url: String,
}

/// Env
///
/// Defines the runtime context, used to switch between development utilities
/// (in-memory store, seeded superuser, header bypass) and hardened production behaviour.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

const LOCAL_SESSION_SECRET: &str = "insecure-local-session-secret-value";
const DEFAULT_SESSION_TTL_SECS: u64 = 60 * 60 * 24 * 14;

impl Default for AppConfig {
    /// Non-panicking configuration used for test state scaffolding.
    fn default() -> Self {
        Self {
            env: Env::Local,
            db_url: None,
            session_secret: LOCAL_SESSION_SECRET.to_string(),
            session_ttl_secs: DEFAULT_SESSION_TTL_SECS,
            supported_languages: vec!["en".to_string(), "fr".to_string()],
            default_language: "en".to_string(),
            bind_addr: "0.0.0.0:3000".to_string(),
            login_url: "/login".to_string(),
            login_redirect_url: "/dashboard".to_string(),
            records_success_url: "/admin/records".to_string(),
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads every parameter from environment variables, falling back to the
    /// defaults above where a value is optional.
    ///
    /// # Panics
    /// Panics in production when `DATABASE_URL` or `SESSION_SECRET` is missing, so the
    /// server never starts with an in-memory store or a guessable signing key.
    pub fn load() -> Self {
        let defaults = Self::default();

        let env_str = env::var("APP_ENV").unwrap_or_else(|_| "local".to_string());
        let env = match env_str.as_str() {
            "production" => Env::Production,
            _ => Env::Local,
        };

        let (db_url, session_secret) = match env {
            Env::Production => (
                Some(env::var("DATABASE_URL").expect("FATAL: DATABASE_URL required in prod")),
                env::var("SESSION_SECRET")
                    .expect("FATAL: SESSION_SECRET must be set in production."),
            ),
            Env::Local => (
                env::var("DATABASE_URL").ok().filter(|url| !url.is_empty()),
                env::var("SESSION_SECRET").unwrap_or(defaults.session_secret),
            ),
        };

        let session_ttl_secs = env::var("SESSION_TTL_SECS")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(defaults.session_ttl_secs);

        let supported_languages = env::var("SUPPORTED_LANGUAGES")
            .map(|value| parse_language_list(&value))
            .ok()
            .filter(|langs| !langs.is_empty())
            .unwrap_or(defaults.supported_languages);

        Self {
            env,
            db_url,
            session_secret,
            session_ttl_secs,
            supported_languages,
            default_language: env::var("DEFAULT_LANGUAGE").unwrap_or(defaults.default_language),
            bind_addr: env::var("BIND_ADDR").unwrap_or(defaults.bind_addr),
            login_url: env::var("LOGIN_URL").unwrap_or(defaults.login_url),
            login_redirect_url: env::var("LOGIN_REDIRECT_URL")
                .unwrap_or(defaults.login_redirect_url),
            records_success_url: env::var("RECORDS_SUCCESS_URL")
                .unwrap_or(defaults.records_success_url),
        }
    }
}

fn parse_language_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .map(str::to_string)
        .collect()
}
