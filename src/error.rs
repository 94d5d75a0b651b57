use std::path::PathBuf;

use thiserror::Error;

use crate::domain::ContainerId;
use crate::ports::{RuntimeError, SinkError};

/// Errors that end a monitoring session
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("Not a valid output directory ({})", .0.display())]
    InvalidOutputDirectory(PathBuf),

    #[error("[{id}] stats query failed: {reason}")]
    QueryFailed { id: ContainerId, reason: String },

    #[error("[{id}] {source}")]
    Runtime {
        id: ContainerId,
        #[source]
        source: RuntimeError,
    },

    #[error(transparent)]
    Sink(#[from] SinkError),
}

pub type MonitorResult<T> = Result<T, MonitorError>;
