mod adapters;
mod application;
mod config;
mod domain;
mod error;
mod interface;
mod ports;

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use adapters::{DockerAdapter, FileSink, PlottersChart};
use application::MonitoringService;
use config::Config;
use domain::{RunReport, RunState};
use error::{MonitorError, MonitorResult};
use interface::cli::Cli;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let config = Cli::parse().into_config();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("statmon={}", config.log_level()).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    info!("Starting statmon v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: {:?}", config);

    let result = monitor(&config).await;
    match &result {
        Ok(report) => info!(
            "Run for {} finished: {} with {} samples",
            report.run.container_id,
            report.state,
            report.run.len()
        ),
        Err(e) => error!("{}", e),
    }

    exit_code(&result)
}

/// Process status for a finished session: a container that was never found
/// and any error are failures, a run that ended with its container is not
fn exit_code(result: &MonitorResult<RunReport>) -> ExitCode {
    match result {
        Ok(report) if report.state == RunState::NotFound => ExitCode::FAILURE,
        Ok(_) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    }
}

async fn monitor(config: &Config) -> MonitorResult<RunReport> {
    config.validate_outdir()?;

    let runtime = match &config.docker_socket {
        Some(socket) => DockerAdapter::with_socket(&config.docker_bin, socket),
        None => DockerAdapter::new(&config.docker_bin),
    }
    .map_err(|source| MonitorError::Runtime {
        id: config.container_id.clone(),
        source,
    })?;
    info!("Connected to Docker daemon");

    let mut service = MonitoringService::new(
        Arc::new(runtime),
        Box::new(FileSink::new(&config.outdir, config.record_mode)),
        Box::new(PlottersChart::new(&config.outdir)),
        config.poll_interval,
        config.retry,
    );

    service.run(&config.container_id).await
}
