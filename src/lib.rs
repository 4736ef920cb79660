//! Library root for `triage-form`.
//!
//! Triage-form is a terminal form client for a remote symptom triage service:
//! - Captures a free-text description of symptoms
//! - Posts it to the service's `/triage` endpoint
//! - Renders the returned urgency, recommendation, and detected symptoms
//! - Surfaces HTTP and connection failures without ending the session
//!
//! The triage analysis itself is opaque and lives behind the service; this crate
//! only owns the request/response contract, the form state, and its rendering.

pub mod base;
pub mod form;
pub mod runtime;
pub mod service;

use base::{config::Config, types::Res};
use rustls::crypto;
use tracing::{debug, info};

/// What the binary was asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Read symptom descriptions from stdin until `:salir` or end of input.
    Interactive,
    /// Submit a single description and exit.
    Submit(String),
    /// Query the service health document and exit.
    Health,
}

/// Public async entry for the binary crate.
///
/// Sets up necessary services and runs the requested mode:
/// - Initializes the crypto provider
/// - Resolves the endpoint and creates the triage client
/// - Runs the prompt, a single submission, or a health check
///
/// Returns whether the final outcome was a success.
pub async fn start(config: Config, mode: Mode) -> Res<bool> {
    info!("Starting triage-form ...");

    // Start the crypto provider.
    if crypto::ring::default_provider().install_default().is_err() {
        debug!("Crypto provider already installed.");
    }

    // Initialize the runtime.
    let runtime = runtime::Runtime::new(config);

    match mode {
        Mode::Interactive => runtime.interactive().await.map(|_| true),
        Mode::Submit(text) => runtime.submit_once(text).await,
        Mode::Health => runtime.health().await,
    }
}
