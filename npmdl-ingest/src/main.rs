//! npmdl-ingest - npm downloads ingester
//!
//! Resolves settings, opens the database, runs one ingest and exits.
//! Exit status: 0 when the run completes, 2 when `--fail-on-errors` is set
//! and any failure was recorded, 1 on initialization failure.

use anyhow::{Context, Result};
use clap::Parser;
use npmdl_common::config::load_toml_config;
use npmdl_common::db::init_database;
use npmdl_ingest::cli::Args;
use npmdl_ingest::config::IngestSettings;
use npmdl_ingest::workflow::IngestPipeline;
use std::process::ExitCode;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Exit status for a completed run with recorded failures
const EXIT_FAILURES: u8 = 2;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    let toml_config =
        load_toml_config(args.config.as_deref()).context("Failed to load configuration")?;

    // Initialize tracing
    let default_level = toml_config.logging.level.clone();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_level.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting npmdl-ingest v{}", env!("CARGO_PKG_VERSION"));

    let settings =
        IngestSettings::resolve(&args, &toml_config).context("Invalid configuration")?;
    info!("Database: {}", settings.database_path.display());

    let pool = init_database(&settings.database_path)
        .await
        .context("Failed to initialize database")?;

    let cancel = CancellationToken::new();
    tokio::spawn(cancel_on_ctrl_c(cancel.clone()));

    let fail_on_errors = settings.fail_on_errors;
    let queries = args.search_queries(settings.weights);
    let pipeline = IngestPipeline::new(settings, pool.clone())
        .context("Failed to build API clients")?
        .with_cancellation(cancel);

    let summary = pipeline.run(&args.packages, queries).await;
    pool.close().await;

    if fail_on_errors && summary.has_failures() {
        warn!(failures = summary.failures, "Exiting with failure status");
        return Ok(ExitCode::from(EXIT_FAILURES));
    }

    Ok(ExitCode::SUCCESS)
}

/// Cancel work not yet started on Ctrl+C; in-flight requests finish
async fn cancel_on_ctrl_c(cancel: CancellationToken) {
    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Received Ctrl+C, cancelling pending work");
            cancel.cancel();
        }
        Err(e) => warn!("Failed to install Ctrl+C handler: {}", e),
    }
}
