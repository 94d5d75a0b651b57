use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{Container, ContainerId};

#[derive(Debug, Error)]
pub enum RuntimeError {
    /// The daemon does not know the container
    #[error("No such container: {0}")]
    NotFound(String),

    /// The stats query could not be executed or returned an error
    #[error("stats query failed: {0}")]
    Query(String),

    #[error("Docker error: {0}")]
    Docker(String),
}

/// Port for resolving containers and querying their stats table
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// Look up a container by ID or name
    async fn inspect(&self, id: &ContainerId) -> Result<Container, RuntimeError>;

    /// Run a single non-streaming stats query, returning the raw table output
    async fn stats_table(&self, id: &ContainerId) -> Result<String, RuntimeError>;
}
