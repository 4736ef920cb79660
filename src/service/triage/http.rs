//! `reqwest` implementation of the triage client.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, instrument, warn};

use crate::base::types::{Res, TriageRequest};

use super::{GenericTriageClient, RawReply, TriageClient};

// Extra methods on `TriageClient` applied by the http implementation.

impl TriageClient {
    pub fn http() -> Self {
        let client = HttpTriageClient::new();
        Self { inner: Arc::new(client) }
    }
}

// Specific implementations.

/// HTTP triage client.
///
/// Issues exactly one request per call: no retries, no timeout.
#[derive(Clone, Default)]
pub struct HttpTriageClient {
    client: reqwest::Client,
}

impl HttpTriageClient {
    pub fn new() -> Self {
        Self { client: reqwest::Client::new() }
    }

    /// Reads the status and body of a response; the body read never fails the reply.
    async fn into_reply(response: reqwest::Response) -> RawReply {
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|err| {
            warn!("Failed to read response body: {}", err);
            anyhow::Error::from(err)
        });

        RawReply { status, body }
    }
}

#[async_trait]
impl GenericTriageClient for HttpTriageClient {
    #[instrument(name = "HttpTriageClient::post_triage", skip(self, request))]
    async fn post_triage(&self, url: &str, request: &TriageRequest) -> Res<RawReply> {
        let body = serde_json::to_vec(request)?;

        let response = self.client.post(url).header(CONTENT_TYPE, "application/json").body(body).send().await?;

        debug!("Triage service answered with status {}.", response.status());

        Ok(Self::into_reply(response).await)
    }

    #[instrument(name = "HttpTriageClient::get_health", skip(self))]
    async fn get_health(&self, url: &str) -> Res<RawReply> {
        let response = self.client.get(url).send().await?;

        debug!("Health check answered with status {}.", response.status());

        Ok(Self::into_reply(response).await)
    }
}
