use async_trait::async_trait;
use bollard::container::InspectContainerOptions;
use bollard::errors::Error as BollardError;
use bollard::models::ContainerStateStatusEnum;
use bollard::Docker;
use tokio::process::Command;
use tracing::debug;

use crate::domain::{Container, ContainerId, ContainerState};
use crate::ports::{ContainerRuntime, RuntimeError};

/// Docker adapter: bollard for lookups, the docker CLI for the stats table
pub struct DockerAdapter {
    client: Docker,
    docker_bin: String,
    socket: Option<String>,
}

impl DockerAdapter {
    pub fn new(docker_bin: impl Into<String>) -> Result<Self, RuntimeError> {
        let client =
            Docker::connect_with_local_defaults().map_err(|e| RuntimeError::Docker(e.to_string()))?;
        Ok(Self {
            client,
            docker_bin: docker_bin.into(),
            socket: None,
        })
    }

    pub fn with_socket(
        docker_bin: impl Into<String>,
        socket_path: &str,
    ) -> Result<Self, RuntimeError> {
        let client = Docker::connect_with_socket(socket_path, 120, bollard::API_DEFAULT_VERSION)
            .map_err(|e| RuntimeError::Docker(e.to_string()))?;
        Ok(Self {
            client,
            docker_bin: docker_bin.into(),
            socket: Some(socket_path.to_string()),
        })
    }

    fn map_container_state(status: Option<ContainerStateStatusEnum>) -> ContainerState {
        match status {
            Some(ContainerStateStatusEnum::RUNNING) => ContainerState::Running,
            Some(ContainerStateStatusEnum::PAUSED) => ContainerState::Paused,
            Some(ContainerStateStatusEnum::RESTARTING) => ContainerState::Restarting,
            Some(ContainerStateStatusEnum::DEAD) => ContainerState::Dead,
            Some(ContainerStateStatusEnum::CREATED) => ContainerState::Created,
            _ => ContainerState::Stopped,
        }
    }

    fn parse_container_name(name: Option<String>, id: &ContainerId) -> String {
        name.map(|n| n.trim_start_matches('/').to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| id.as_str().to_string())
    }

    fn map_error(id: &ContainerId, err: BollardError) -> RuntimeError {
        match err {
            BollardError::DockerResponseServerError { status_code: 404, message } => {
                debug!(container_id = %id, "Lookup returned 404: {}", message);
                RuntimeError::NotFound(id.to_string())
            }
            other => RuntimeError::Docker(other.to_string()),
        }
    }

    /// First repository tag of the image, or the reference the container was created from
    async fn primary_tag(&self, image_id: Option<&str>, fallback: Option<String>) -> String {
        if let Some(image_id) = image_id {
            if let Ok(image) = self.client.inspect_image(image_id).await {
                if let Some(tag) = image.repo_tags.and_then(|tags| tags.into_iter().next()) {
                    return tag;
                }
            }
        }
        fallback.unwrap_or_else(|| "<none>".to_string())
    }
}

#[async_trait]
impl ContainerRuntime for DockerAdapter {
    async fn inspect(&self, id: &ContainerId) -> Result<Container, RuntimeError> {
        let details = self
            .client
            .inspect_container(id.as_str(), None::<InspectContainerOptions>)
            .await
            .map_err(|e| Self::map_error(id, e))?;

        let resolved_id = ContainerId::new(details.id.unwrap_or_else(|| id.as_str().to_string()));
        let name = Self::parse_container_name(details.name, &resolved_id);
        let state = Self::map_container_state(details.state.and_then(|s| s.status));
        let configured_image = details.config.and_then(|c| c.image);
        let image = self.primary_tag(details.image.as_deref(), configured_image).await;

        Ok(Container::new(resolved_id, name, image, state))
    }

    async fn stats_table(&self, id: &ContainerId) -> Result<String, RuntimeError> {
        let mut command = Command::new(&self.docker_bin);
        if let Some(socket) = &self.socket {
            command.arg("--host").arg(format!("unix://{}", socket));
        }
        command.args(["stats", "--no-stream", id.as_str()]);

        let output = command
            .output()
            .await
            .map_err(|e| RuntimeError::Query(format!("cannot run {}: {}", self.docker_bin, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RuntimeError::Query(format!("{} ({})", stderr.trim(), output.status)));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
