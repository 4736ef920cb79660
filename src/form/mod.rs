//! The triage form: input text, submission state, and the submit operation.
//!
//! State is owned by a single [`TriageForm`] and mutated only through `&mut self`,
//! so there is exactly one writer. The HTTP call is the only suspension point.

pub mod view;

use std::{mem, sync::Arc};

use tracing::{info, instrument, warn};

use crate::{
    base::{
        endpoint::Endpoint,
        types::{HealthReport, TriageRequest, TriageResult},
    },
    service::triage::{SubmitError, TriageClient, classify_reply},
};

// Types.

/// Callback invoked after every state transition.
pub type StateListener = Arc<dyn Fn(&Submission) + Send + Sync>;

/// Message surfaced when a submission is abandoned before it completes.
pub const INTERRUPTED_MESSAGE: &str = "solicitud interrumpida";

/// The submission tag. Exactly one is active at a time.
///
/// `previous` holds the last good result so it stays visible while a new
/// request is in flight and after that request fails.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Submission {
    #[default]
    Idle,
    Loading {
        previous: Option<TriageResult>,
    },
    Succeeded(TriageResult),
    Failed {
        message: String,
        previous: Option<TriageResult>,
    },
}

impl Submission {
    pub fn is_loading(&self) -> bool {
        matches!(self, Submission::Loading { .. })
    }

    /// The result to display, fresh or stale.
    pub fn result(&self) -> Option<&TriageResult> {
        match self {
            Submission::Idle => None,
            Submission::Loading { previous } | Submission::Failed { previous, .. } => previous.as_ref(),
            Submission::Succeeded(result) => Some(result),
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Submission::Failed { message, .. } => Some(message.as_str()),
            _ => None,
        }
    }

    fn take_result(&mut self) -> Option<TriageResult> {
        match mem::take(self) {
            Submission::Idle => None,
            Submission::Loading { previous } | Submission::Failed { previous, .. } => previous,
            Submission::Succeeded(result) => Some(result),
        }
    }
}

/// Keeps the submission in `Loading` for exactly as long as it is alive.
///
/// If dropped before [`LoadingGuard::finish`], the attempt resolves to a
/// connection failure so `Loading` never outlives the attempt.
struct LoadingGuard<'a> {
    submission: &'a mut Submission,
    listener: Option<&'a StateListener>,
}

impl<'a> LoadingGuard<'a> {
    fn start(submission: &'a mut Submission, listener: Option<&'a StateListener>) -> Self {
        let previous = submission.take_result();
        *submission = Submission::Loading { previous };

        let guard = Self { submission, listener };
        guard.notify();
        guard
    }

    fn finish(mut self, outcome: Result<TriageResult, SubmitError>) {
        let previous = self.submission.take_result();

        *self.submission = match outcome {
            Ok(result) => Submission::Succeeded(result),
            Err(err) => Submission::Failed { message: err.to_string(), previous },
        };

        self.notify();
    }

    fn notify(&self) {
        if let Some(listener) = self.listener {
            listener(&*self.submission);
        }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        if self.submission.is_loading() {
            warn!("Submission dropped while in flight.");

            let previous = self.submission.take_result();
            *self.submission = Submission::Failed {
                message: SubmitError::Connection(INTERRUPTED_MESSAGE.to_string()).to_string(),
                previous,
            };
            self.notify();
        }
    }
}

// Structs.

/// The triage form client.
pub struct TriageForm {
    text: String,
    submission: Submission,
    endpoint: Endpoint,
    client: TriageClient,
    listener: Option<StateListener>,
}

impl TriageForm {
    pub fn new(endpoint: Endpoint, client: TriageClient) -> Self {
        Self {
            text: String::new(),
            submission: Submission::Idle,
            endpoint,
            client,
            listener: None,
        }
    }

    /// Registers a callback fired on every state transition.
    pub fn with_listener(mut self, listener: StateListener) -> Self {
        self.listener = Some(listener);
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replaces the input text. Submitting never clears it.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn submission(&self) -> &Submission {
        &self.submission
    }

    pub fn result(&self) -> Option<&TriageResult> {
        self.submission.result()
    }

    pub fn is_loading(&self) -> bool {
        self.submission.is_loading()
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Submits the current text to the triage service.
    ///
    /// Issues exactly one POST, even for empty text. On success the state becomes
    /// `Succeeded`; on any failure it becomes `Failed` and the previous result is kept.
    #[instrument(name = "TriageForm::submit", skip(self), fields(chars = self.text.chars().count()))]
    pub async fn submit(&mut self) -> &Submission {
        let request = TriageRequest::new(self.text.clone());
        let url = self.endpoint.triage_url();

        let guard = LoadingGuard::start(&mut self.submission, self.listener.as_ref());

        let outcome = classify_reply::<TriageResult>(self.client.post_triage(&url, &request).await);

        match &outcome {
            Ok(result) => info!("Triage succeeded with {} symptom(s).", result.symptoms.len()),
            Err(err) => warn!("Triage failed: {}", err),
        }

        guard.finish(outcome);

        &self.submission
    }

    /// Queries the service health document. Does not touch the submission state.
    #[instrument(name = "TriageForm::check_health", skip(self))]
    pub async fn check_health(&self) -> Result<HealthReport, SubmitError> {
        let url = self.endpoint.health_url();

        classify_reply::<HealthReport>(self.client.get_health(&url).await)
    }
}
