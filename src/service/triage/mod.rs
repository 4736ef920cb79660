//! Client seam for the remote triage service.
//!
//! The service is opaque: the client only knows the request and response shapes.
//! Implementations of [`GenericTriageClient`] perform the raw exchange; the
//! two-kind error taxonomy is applied afterwards by [`classify_reply`] so every
//! implementation surfaces failures identically.

pub mod http;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::base::types::{Res, TriageRequest};

// Types.

/// A completed HTTP exchange.
///
/// `body` is the best-effort read of the response body; a read failure is kept
/// here instead of failing the whole exchange.
#[derive(Debug)]
pub struct RawReply {
    pub status: u16,
    pub body: Res<String>,
}

impl RawReply {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self { status, body: Ok(body.into()) }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The two user-visible failure kinds.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    /// The service answered with a non-success status.
    #[error("Error HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The request could not be issued, or its success body could not be read or parsed.
    #[error("Error de conexión: {0}")]
    Connection(String),
}

// Traits.

/// Generic triage client trait that transports must implement.
///
/// An `Err` from either method means the exchange itself failed (unreachable
/// host, DNS failure, malformed URL). Any received status is returned as a
/// [`RawReply`], whatever its value.
#[async_trait]
pub trait GenericTriageClient: Send + Sync + 'static {
    /// Post a triage request as JSON.
    async fn post_triage(&self, url: &str, request: &TriageRequest) -> Res<RawReply>;

    /// Fetch the service health document.
    async fn get_health(&self, url: &str) -> Res<RawReply>;
}

// Structs.

/// Triage client for the application.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct TriageClient {
    inner: Arc<dyn GenericTriageClient>,
}

impl Deref for TriageClient {
    type Target = dyn GenericTriageClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl TriageClient {
    pub fn new(inner: Arc<dyn GenericTriageClient>) -> Self {
        Self { inner }
    }
}

// Helpers.

/// Applies the error taxonomy to an exchange outcome.
///
/// - transport failure: [`SubmitError::Connection`].
/// - non-success status: [`SubmitError::Http`], with an unreadable body rendered as empty; no JSON parse is attempted.
/// - success status: the body is decoded as `T`; a read or decode failure is a [`SubmitError::Connection`].
pub fn classify_reply<T>(outcome: Res<RawReply>) -> Result<T, SubmitError>
where
    T: DeserializeOwned,
{
    let reply = outcome.map_err(|err| SubmitError::Connection(format!("{err:#}")))?;

    if !reply.is_success() {
        return Err(SubmitError::Http {
            status: reply.status,
            body: reply.body.unwrap_or_default(),
        });
    }

    let body = reply.body.map_err(|err| SubmitError::Connection(format!("{err:#}")))?;

    serde_json::from_str(&body).map_err(|err| SubmitError::Connection(format!("{err:#}")))
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;

    use super::*;
    use crate::base::types::TriageResult;

    #[test]
    fn non_success_status_reports_status_and_body() {
        let result = classify_reply::<TriageResult>(Ok(RawReply::new(500, "server error")));

        let err = result.unwrap_err();
        assert_eq!(err, SubmitError::Http { status: 500, body: "server error".to_string() });
        assert_eq!(err.to_string(), "Error HTTP 500: server error");
    }

    #[test]
    fn unreadable_error_body_becomes_empty() {
        let reply = RawReply {
            status: 503,
            body: Err(anyhow!("stream reset")),
        };

        let err = classify_reply::<TriageResult>(Ok(reply)).unwrap_err();

        assert_eq!(err.to_string(), "Error HTTP 503: ");
    }

    #[test]
    fn non_json_error_body_is_not_parsed() {
        let err = classify_reply::<TriageResult>(Ok(RawReply::new(422, "{not json"))).unwrap_err();

        assert_eq!(err.to_string(), "Error HTTP 422: {not json");
    }

    #[test]
    fn malformed_success_body_is_a_connection_error() {
        let err = classify_reply::<TriageResult>(Ok(RawReply::new(200, "<html>"))).unwrap_err();

        assert!(matches!(err, SubmitError::Connection(_)));
        assert!(err.to_string().starts_with("Error de conexión: "));
    }

    #[test]
    fn transport_failure_is_a_connection_error() {
        let err = classify_reply::<TriageResult>(Err(anyhow!("connection refused"))).unwrap_err();

        assert_eq!(err.to_string(), "Error de conexión: connection refused");
    }

    #[test]
    fn connection_error_keeps_the_underlying_cause() {
        let err = anyhow!("connection refused").context("error sending request for url (http://127.0.0.1:1/triage)");

        let err = classify_reply::<TriageResult>(Err(err)).unwrap_err();

        assert_eq!(err.to_string(), "Error de conexión: error sending request for url (http://127.0.0.1:1/triage): connection refused");
    }

    #[test]
    fn success_body_is_decoded() {
        let body = r#"{"overall_urgency":1,"recommended_action":"Reposo y observacion.","symptoms":[],"priorities":{}}"#;

        let result = classify_reply::<TriageResult>(Ok(RawReply::new(200, body))).unwrap();

        assert_eq!(result.recommended_action, "Reposo y observacion.");
        assert!(result.symptoms.is_empty());
    }
}
