//! Resolution of the triage service base URL.
//!
//! The base URL is resolved exactly once at startup and then carried as an
//! immutable [`Endpoint`] into the client.

use tracing::{debug, instrument};

use super::config::Config;

/// Base URL used when nothing else is configured.
pub const FALLBACK_API_BASE: &str = "http://localhost:8000";

/// Base URL baked in at compile time, if any.
pub const BUILD_API_BASE: Option<&str> = option_env!("TRIAGE_FORM_BUILD_API_BASE");

/// Picks the base URL: build-time value, then runtime override, then the page
/// origin (only when served over `http`/`https`), then [`FALLBACK_API_BASE`].
pub fn resolve_api_base(build_time: Option<&str>, runtime_override: Option<&str>, page_origin: Option<&str>) -> String {
    fn present(value: Option<&str>) -> Option<&str> {
        value.map(str::trim).filter(|v| !v.is_empty())
    }

    present(build_time)
        .or_else(|| present(runtime_override))
        .or_else(|| present(page_origin).filter(|origin| origin.starts_with("http")))
        .unwrap_or(FALLBACK_API_BASE)
        .to_string()
}

/// The resolved triage service location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    base: String,
}

impl Endpoint {
    pub fn new(base: impl Into<String>) -> Self {
        let base = base.into();
        let base = base.strip_suffix('/').map(str::to_string).unwrap_or(base);

        Self { base }
    }

    /// Resolves the endpoint from the compile-time value and the loaded configuration.
    #[instrument(name = "Endpoint::from_config", skip_all)]
    pub fn from_config(config: &Config) -> Self {
        let base = resolve_api_base(BUILD_API_BASE, config.api_base.as_deref(), config.page_origin.as_deref());

        debug!("Resolved triage service base `{}`.", base);

        Self::new(base)
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn triage_url(&self) -> String {
        format!("{}/triage", self.base)
    }

    pub fn health_url(&self) -> String {
        format!("{}/health", self.base)
    }
}
