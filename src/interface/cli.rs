use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::config::{Config, RecordMode, RetryPolicy, DEFAULT_POLL_INTERVAL};

/// Monitor Docker container execution stats
#[derive(Debug, Parser)]
#[command(name = "statmon", version, about)]
pub struct Cli {
    /// Docker container ID
    #[arg(short = 'c', long = "container_id", visible_alias = "container-id")]
    pub container_id: String,

    /// Output directory
    #[arg(short = 'o', long)]
    pub outdir: PathBuf,

    /// Display verbose information
    #[arg(short, long)]
    pub verbose: bool,

    /// Seconds between samples
    #[arg(
        short,
        long,
        env = "STATMON_POLL_INTERVAL",
        default_value_t = DEFAULT_POLL_INTERVAL,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub interval: u64,

    /// Retries for a failed stats query before the run aborts
    #[arg(long, env = "STATMON_QUERY_RETRIES", default_value_t = 0)]
    pub retries: u32,

    /// Seconds to wait between stats query retries
    #[arg(long, default_value_t = 5)]
    pub retry_delay: u64,

    /// How the run record grows on each tick
    #[arg(long, value_enum, default_value_t = RecordMode::Cumulative)]
    pub record_mode: RecordMode,

    /// Docker CLI used for the stats query
    #[arg(long, env = "STATMON_DOCKER_BIN", default_value = "docker")]
    pub docker_bin: String,

    /// Docker daemon socket (defaults to DOCKER_HOST or the local socket)
    #[arg(long, env = "STATMON_DOCKER_SOCKET")]
    pub docker_socket: Option<String>,
}

impl Cli {
    pub fn into_config(self) -> Config {
        Config {
            verbose: self.verbose,
            poll_interval: Duration::from_secs(self.interval),
            retry: RetryPolicy::new(self.retries, Duration::from_secs(self.retry_delay)),
            record_mode: self.record_mode,
            docker_bin: self.docker_bin,
            docker_socket: self.docker_socket,
            ..Config::new(self.container_id, self.outdir)
        }
    }
}
