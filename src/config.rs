use std::path::PathBuf;
use std::time::Duration;

use clap::ValueEnum;

use crate::domain::ContainerId;
use crate::error::{MonitorError, MonitorResult};

/// Seconds between ticks when nothing else is configured
pub const DEFAULT_POLL_INTERVAL: u64 = 30;

/// How the run record grows on every tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum RecordMode {
    /// Re-append the whole run so far as one row per tick
    #[default]
    Cumulative,
    /// Append only the newest sample as a flat row
    Latest,
}

/// Bounded retry for a failing stats query. Zero retries means fail fast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            delay: Duration::ZERO,
        }
    }

    pub fn new(max_retries: u32, delay: Duration) -> Self {
        Self { max_retries, delay }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::none()
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub container_id: ContainerId,
    pub outdir: PathBuf,
    pub verbose: bool,
    pub poll_interval: Duration,
    pub retry: RetryPolicy,
    pub record_mode: RecordMode,
    pub docker_bin: String,
    pub docker_socket: Option<String>,
}

impl Config {
    pub fn new(container_id: impl Into<ContainerId>, outdir: impl Into<PathBuf>) -> Self {
        Self {
            container_id: container_id.into(),
            outdir: outdir.into(),
            verbose: false,
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL),
            retry: RetryPolicy::none(),
            record_mode: RecordMode::default(),
            docker_bin: "docker".to_string(),
            docker_socket: None,
        }
    }

    /// The output directory must already exist
    pub fn validate_outdir(&self) -> MonitorResult<()> {
        if self.outdir.is_dir() {
            Ok(())
        } else {
            Err(MonitorError::InvalidOutputDirectory(self.outdir.clone()))
        }
    }

    /// Log filter directive used when `RUST_LOG` is unset
    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            "info"
        } else {
            "warn"
        }
    }
}
