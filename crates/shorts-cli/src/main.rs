//! `shorts` binary.

use anyhow::Context;
use clap::Parser;
use std::path::Path;
use std::process::ExitCode;
use tokio::sync::watch;
use tracing::{error, info, warn, Instrument};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use shorts_cli::{AppConfig, Cli, Pipeline, PipelineError, RunLogger};

fn init_tracing() {
    // Colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let mut env_filter = EnvFilter::from_default_env();
    if let Ok(directive) = "shorts=info".parse() {
        env_filter = env_filter.add_directive(directive);
    }

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }
}

fn report_failure(logger: &RunLogger, e: &PipelineError) {
    if e.is_cancelled() {
        logger.log_warning("cancelled");
    } else {
        logger.log_error(&e.to_string());
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = AppConfig::from_env().apply_cli(&cli);
    config.validate().context("invalid configuration")?;
    info!(config = ?config, "Configuration loaded");

    let (cancel_tx, cancel_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_err() {
            return;
        }
        warn!("Received interrupt, stopping after the current step (Ctrl-C again to abort)");
        cancel_tx.send(true).ok();

        if tokio::signal::ctrl_c().await.is_ok() {
            error!("Received second interrupt, aborting");
            std::process::exit(130);
        }
    });

    if cli.upload_only {
        let logger = RunLogger::new("upload_only");
        let span = logger.create_span();
        let pipeline = Pipeline::new(config, cancel_rx, logger.clone());
        let report = pipeline
            .upload_only(Path::new(&cli.source))
            .instrument(span)
            .await
            .inspect_err(|e| report_failure(&logger, e))?;
        info!(
            uploaded = report.uploaded,
            skipped = report.skipped,
            failed = report.failed,
            rate_limited = report.rate_limited,
            cancelled = report.cancelled,
            "Upload-only run finished"
        );
        return Ok(());
    }

    let logger = RunLogger::new("process");
    let span = logger.create_span();
    let pipeline = Pipeline::new(config, cancel_rx, logger.clone());
    let summary = pipeline
        .process(&cli.source)
        .instrument(span)
        .await
        .inspect_err(|e| report_failure(&logger, e))?;

    for short in &summary.shorts {
        info!(path = %short.display(), "Short ready");
    }
    if summary.cancelled && summary.shorts.is_empty() {
        anyhow::bail!("cancelled before any short was rendered");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    // Install rustls crypto provider (required for TLS/HTTPS)
    if rustls::crypto::ring::default_provider().install_default().is_err() {
        eprintln!("Failed to install rustls crypto provider");
        return ExitCode::FAILURE;
    }

    // Load environment variables
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    info!(source = %cli.source, upload_only = cli.upload_only, "Starting shorts");

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
