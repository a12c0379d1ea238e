use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use std::convert::Infallible;

use crate::config::AppConfig;

/// LocaleService
///
/// The set of locale codes the application handles, plus the fallback used for
/// anything outside it.
#[derive(Clone, Debug)]
pub struct LocaleService {
    supported: Vec<String>,
    fallback: String,
}

impl LocaleService {
    pub fn new(supported: Vec<String>, fallback: impl Into<String>) -> Self {
        Self {
            supported,
            fallback: fallback.into(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.supported_languages.clone(),
            config.default_language.clone(),
        )
    }

    pub fn languages(&self) -> &[String] {
        &self.supported
    }

    pub fn is_supported(&self, locale: &str) -> bool {
        self.supported.iter().any(|code| code == locale)
    }

    /// normalize
    ///
    /// The header value is compared as a whole against the supported codes; a
    /// missing, empty or unknown value yields the fallback.
    pub fn normalize(&self, hint: Option<&str>) -> String {
        match hint.map(str::trim) {
            Some(locale) if self.is_supported(locale) => locale.to_string(),
            _ => self.fallback.clone(),
        }
    }
}

/// Locale
///
/// The normalised `Accept-Language` of the current request.
#[derive(Debug, Clone, PartialEq)]
pub struct Locale(pub String);

impl<S> FromRequestParts<S> for Locale
where
    S: Send + Sync,
    LocaleService: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let hint = parts
            .headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|value| value.to_str().ok());
        Ok(Locale(LocaleService::from_ref(state).normalize(hint)))
    }
}
