//! Binary entry point for `triage-form`.
//!
//! This module provides the command-line interface for triage-form with options
//! for configuration file paths, logging verbosity, and the run mode. It
//! initializes logging, loads configuration, and starts the client.

use std::process::ExitCode;

use clap::Parser;
use opentelemetry::trace::TracerProvider;
use opentelemetry_otlp::{Protocol, WithExportConfig};
use tracing_subscriber::{fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt};
use triage_form::{
    Mode,
    base::{config::Config, types::Res},
};

/// Triage-form: describe your symptoms, get a triage recommendation.
///
/// Configuration can come from `config.toml` or environment variables.
/// Without `--text` or `--health` the client reads descriptions from stdin,
/// one per line, and renders the service's answer after each one.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Override the config file path (optional).
    ///
    /// By default, the client will look for a config file at `.hidden/config.toml`
    /// in the current directory.
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,
    /// Increase log verbosity (-v, -vv, etc.).
    ///
    /// Use multiple times to increase verbosity:
    /// - No flag: INFO level
    /// - -v: DEBUG level
    /// - -vv or more: TRACE level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
    /// Submit this description once, print the result, and exit.
    #[arg(short, long, conflicts_with = "health")]
    text: Option<String>,
    /// Check that the triage service is reachable and exit.
    #[arg(long)]
    health: bool,
}

/// Main entry point for the triage-form binary.
///
/// Sets up logging based on verbosity, loads configuration, and starts the client.
#[tokio::main]
async fn main() -> Res<ExitCode> {
    let args = Args::parse();

    let config = Config::load(args.config.as_deref())?;

    // Construct the level filter.

    let level = match args.verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    let level_filter = tracing_subscriber::filter::LevelFilter::from_level(level);

    // Prepare the log layer.

    let stderr = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .without_time()
        .with_ansi(true)
        .with_level(true)
        .with_file(false)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_span_events(FmtSpan::NEW | FmtSpan::CLOSE);

    // Prepare the otlp layer, if enabled.

    let otel = if config.otlp_enabled {
        let exporter = opentelemetry_otlp::SpanExporter::builder().with_http().with_protocol(Protocol::HttpBinary).build()?;
        let tracer = opentelemetry_sdk::trace::SdkTracerProvider::builder().with_simple_exporter(exporter).build().tracer("triage-form");

        Some(tracing_opentelemetry::layer().with_tracer(tracer))
    } else {
        None
    };

    tracing_subscriber::registry().with(otel).with(level_filter).with(stderr).init();

    let mode = match (args.text, args.health) {
        (Some(text), _) => Mode::Submit(text),
        (None, true) => Mode::Health,
        (None, false) => Mode::Interactive,
    };

    let succeeded = triage_form::start(config, mode).await?;

    Ok(if succeeded { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}
