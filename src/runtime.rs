//! Runtime services and the terminal front of the triage form.

use std::{io::Write, sync::Arc};

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info, instrument, warn};

use crate::{
    base::{config::Config, endpoint::Endpoint, types::Res},
    form::{Submission, TriageForm, view::View},
    service::triage::TriageClient,
};

/// A line typed at the interactive prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptCommand {
    /// Replace the input text with this line and submit it.
    Submit(String),
    /// Submit the current text unchanged.
    Resubmit,
    Health,
    Quit,
    Unknown(String),
}

impl PromptCommand {
    pub fn parse(line: &str) -> Self {
        let line = line.trim_end_matches(['\r', '\n']);

        match line.trim() {
            ":enviar" => PromptCommand::Resubmit,
            ":salud" => PromptCommand::Health,
            ":salir" => PromptCommand::Quit,
            command if command.starts_with(':') => PromptCommand::Unknown(command.to_string()),
            _ => PromptCommand::Submit(line.to_string()),
        }
    }
}

/// Runtime service context.
///
/// Holds the configuration, the endpoint resolved once at startup, and the
/// triage client. It is trivially cloneable.
#[derive(Clone)]
pub struct Runtime {
    /// The configuration for the application.
    pub config: Config,
    /// The resolved triage service endpoint.
    pub endpoint: Endpoint,
    /// The triage client instance.
    pub client: TriageClient,
}

impl Runtime {
    /// Create a new runtime instance.
    #[instrument(skip_all)]
    pub fn new(config: Config) -> Self {
        let endpoint = Endpoint::from_config(&config);
        let client = TriageClient::http();

        info!("Using triage service at `{}`.", endpoint.base());

        Self { config, endpoint, client }
    }

    /// Builds a fresh form bound to this runtime's endpoint and client.
    pub fn form(&self) -> TriageForm {
        TriageForm::new(self.endpoint.clone(), self.client.clone())
    }

    /// Builds a form that prints the in-flight view to stdout while loading.
    fn terminal_form(&self) -> TriageForm {
        let listener = Arc::new(|submission: &Submission| {
            if submission.is_loading() {
                print!("{}", View::new(submission));
                let _ = std::io::stdout().flush();
            }
        });

        self.form().with_listener(listener)
    }

    /// Submits `text` once, prints the resulting view, and reports whether it succeeded.
    #[instrument(skip_all)]
    pub async fn submit_once(&self, text: String) -> Res<bool> {
        let mut form = self.terminal_form();
        form.set_text(text);

        let succeeded = matches!(form.submit().await, Submission::Succeeded(_));

        let mut out = std::io::stdout().lock();
        write!(out, "\n{}", View::from_form(&form))?;

        Ok(succeeded)
    }

    /// Runs the health check and prints the report.
    #[instrument(skip_all)]
    pub async fn health(&self) -> Res<bool> {
        let form = self.form();
        let mut out = std::io::stdout().lock();

        print_health(&form, &mut out).await
    }

    /// Runs the interactive prompt over stdin until `:salir` or end of input.
    pub async fn interactive(&self) -> Res<()> {
        let mut form = self.terminal_form();
        let stdin = tokio::io::BufReader::new(tokio::io::stdin());

        run_prompt(&mut form, stdin, std::io::stdout()).await
    }
}

/// Prints the health report of the form's service.
pub async fn print_health<W: Write>(form: &TriageForm, out: &mut W) -> Res<bool> {
    match form.check_health().await {
        Ok(report) => {
            writeln!(out, "Servicio: {}", report.status)?;

            if let Some(count) = report.sintomas_registrados {
                writeln!(out, "Síntomas registrados: {count}")?;
            }
            if let Some(enabled) = report.ml_enabled {
                writeln!(out, "Modelo ML: {}", if enabled { "activo" } else { "inactivo" })?;
            }
            if let Some(min) = report.ml_min_sintomas {
                writeln!(out, "Mínimo de síntomas para ML: {min}")?;
            }

            Ok(true)
        }
        Err(err) => {
            warn!("Health check failed: {}", err);
            writeln!(out, "{err}")?;

            Ok(false)
        }
    }
}

/// Drives the form from a line-oriented reader, rendering every final state to `out`.
///
/// No failure of a single submission ends the loop.
#[instrument(skip_all)]
pub async fn run_prompt<R, W>(form: &mut TriageForm, reader: R, mut out: W) -> Res<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = reader.lines();

    write!(out, "{}", View::from_form(form))?;
    writeln!(out, "Describe tus síntomas... (:enviar, :salud, :salir)")?;
    out.flush()?;

    while let Some(line) = lines.next_line().await? {
        match PromptCommand::parse(&line) {
            PromptCommand::Submit(text) => {
                form.set_text(text);
                form.submit().await;
            }
            PromptCommand::Resubmit => {
                form.submit().await;
            }
            PromptCommand::Health => {
                print_health(form, &mut out).await?;
                out.flush()?;
                continue;
            }
            PromptCommand::Quit => break,
            PromptCommand::Unknown(command) => {
                writeln!(out, "Comando desconocido: {command}")?;
                out.flush()?;
                continue;
            }
        }

        write!(out, "\n{}", View::from_form(form))?;
        out.flush()?;
    }

    debug!("Prompt closed.");

    Ok(())
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;
    use async_trait::async_trait;
    use mockall::mock;

    use super::*;
    use crate::{
        base::types::TriageRequest,
        service::triage::{GenericTriageClient, RawReply},
    };

    mock! {
        pub Triage {}

        #[async_trait]
        impl GenericTriageClient for Triage {
            async fn post_triage(&self, url: &str, request: &TriageRequest) -> Res<RawReply>;
            async fn get_health(&self, url: &str) -> Res<RawReply>;
        }
    }

    fn health_form(reply: fn() -> Res<RawReply>) -> TriageForm {
        let mut mock = MockTriage::new();
        mock.expect_get_health().times(1).returning(move |_| reply());

        TriageForm::new(Endpoint::new("http://triage.test"), TriageClient::new(Arc::new(mock)))
    }

    #[tokio::test]
    async fn print_health_writes_the_report() {
        let form = health_form(|| Ok(RawReply::new(200, r#"{"status":"ok","sintomas_registrados":93,"ml_enabled":false,"ml_min_sintomas":2}"#)));
        let mut out = Vec::new();

        let healthy = print_health(&form, &mut out).await.unwrap();

        let out = String::from_utf8(out).unwrap();
        assert!(healthy);
        assert!(out.contains("Servicio: ok"));
        assert!(out.contains("Síntomas registrados: 93"));
        assert!(out.contains("Modelo ML: inactivo"));
        assert!(out.contains("Mínimo de síntomas para ML: 2"));
    }

    #[tokio::test]
    async fn print_health_writes_the_error() {
        let form = health_form(|| Err(anyhow!("dns failure")));
        let mut out = Vec::new();

        let healthy = print_health(&form, &mut out).await.unwrap();

        assert!(!healthy);
        assert_eq!(String::from_utf8(out).unwrap(), "Error de conexión: dns failure\n");
        assert_eq!(form.submission(), &Submission::Idle);
    }

    #[test]
    fn plain_lines_submit_their_text() {
        assert_eq!(PromptCommand::parse("me duele el pecho\n"), PromptCommand::Submit("me duele el pecho".to_string()));
        assert_eq!(PromptCommand::parse(""), PromptCommand::Submit(String::new()));
    }

    #[test]
    fn commands_are_recognized() {
        assert_eq!(PromptCommand::parse(":enviar"), PromptCommand::Resubmit);
        assert_eq!(PromptCommand::parse(" :salud "), PromptCommand::Health);
        assert_eq!(PromptCommand::parse(":salir\r\n"), PromptCommand::Quit);
        assert_eq!(PromptCommand::parse(":borrar"), PromptCommand::Unknown(":borrar".to_string()));
    }

    #[test]
    fn runtime_resolves_endpoint_from_config() {
        let config = Config {
            inner: Arc::new(crate::base::config::ConfigInner {
                api_base: Some("http://triage.internal:9000/".to_string()),
                ..Default::default()
            }),
        };

        let runtime = Runtime::new(config);

        if crate::base::endpoint::BUILD_API_BASE.is_none() {
            assert_eq!(runtime.endpoint.triage_url(), "http://triage.internal:9000/triage");
        }
        assert!(!runtime.form().is_loading());
    }
}
