//! Docker Engine backend.
//!
//! Talks to the local Docker daemon through bollard. `run_detached` mirrors
//! `docker run -d`: create, start, and pull the image first if the engine
//! does not have it yet.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use bollard::Docker;
use bollard::container::{
    Config, CreateContainerOptions, ListContainersOptions, RemoveContainerOptions,
    StartContainerOptions, StopContainerOptions,
};
use bollard::image::CreateImageOptions;
use bollard::models::ContainerSummary;
use futures_util::StreamExt;
use podpool_core::{ContainerStatus, LaunchSpec, ManagedContainer};
use tracing::{debug, error, info, warn};

use crate::error::{RuntimeError, RuntimeResult};
use crate::handle::{ContainerRuntime, RuntimeHandle};

/// [`ContainerRuntime`] backed by the Docker Engine API.
pub struct DockerRuntime {
    docker: Docker,
}

impl DockerRuntime {
    /// Connect to the local daemon (unix socket / named pipe, honouring
    /// `DOCKER_HOST`) and verify it answers.
    pub async fn connect() -> RuntimeResult<Self> {
        let docker = Docker::connect_with_local_defaults()
            .map_err(|e| RuntimeError::Unavailable(e.to_string()))?;
        let runtime = Self { docker };
        runtime
            .ping()
            .await
            .map_err(|e| RuntimeError::Unavailable(e.to_string()))?;
        Ok(runtime)
    }

    /// Connect, falling back to an unavailable handle instead of failing.
    pub async fn connect_handle() -> RuntimeHandle {
        match Self::connect().await {
            Ok(runtime) => {
                info!("connected to Docker daemon");
                RuntimeHandle::connected(runtime)
            }
            Err(e) => {
                error!(error = %e, "failed to connect to Docker daemon");
                RuntimeHandle::unavailable(e.to_string())
            }
        }
    }

    async fn pull_image(&self, image: &str) -> RuntimeResult<()> {
        let (repository, tag) = split_image_reference(image);
        info!(%repository, %tag, "pulling image");

        let options = CreateImageOptions {
            from_image: repository,
            tag,
            ..Default::default()
        };
        let mut stream = self.docker.create_image(Some(options), None, None);

        while let Some(progress) = stream.next().await {
            let progress = progress?;
            if let Some(status) = progress.status {
                debug!(%image, %status, "pull progress");
            }
        }
        Ok(())
    }

    async fn create(&self, spec: &LaunchSpec) -> RuntimeResult<String> {
        let options = CreateContainerOptions {
            name: spec.name.as_str(),
            platform: None,
        };
        let config = Config {
            image: Some(spec.image.clone()),
            labels: Some(spec.labels.clone()),
            ..Default::default()
        };
        let response = self.docker.create_container(Some(options), config).await?;
        Ok(response.id)
    }
}

#[async_trait]
impl ContainerRuntime for DockerRuntime {
    async fn list_containers(&self) -> RuntimeResult<Vec<ManagedContainer>> {
        let options = ListContainersOptions::<String> {
            all: true,
            ..Default::default()
        };
        let summaries = self.docker.list_containers(Some(options)).await?;
        Ok(summaries.into_iter().map(container_from_summary).collect())
    }

    async fn run_detached(&self, spec: &LaunchSpec) -> RuntimeResult<ManagedContainer> {
        let id = match self.create(spec).await {
            Ok(id) => id,
            Err(RuntimeError::NotFound(reason)) => {
                warn!(image = %spec.image, %reason, "image not present locally");
                self.pull_image(&spec.image).await?;
                self.create(spec).await?
            }
            Err(e) => return Err(e),
        };

        self.docker
            .start_container(&id, None::<StartContainerOptions<String>>)
            .await?;
        debug!(container = %spec.name, %id, "container started");

        let inspect = self.docker.inspect_container(&id, None).await?;
        let created = inspect
            .created
            .as_deref()
            .and_then(parse_created)
            .unwrap_or_default();

        Ok(ManagedContainer {
            id,
            name: spec.name.clone(),
            status: ContainerStatus::Running,
            image: Some(spec.image.clone()),
            created,
            labels: spec.labels.clone(),
        })
    }

    async fn stop(&self, name: &str, grace: Duration) -> RuntimeResult<()> {
        let options = StopContainerOptions {
            t: stop_timeout_param(grace),
        };
        self.docker.stop_container(name, Some(options)).await?;
        Ok(())
    }

    async fn remove(&self, name: &str) -> RuntimeResult<()> {
        let options = RemoveContainerOptions {
            force: false,
            ..Default::default()
        };
        self.docker.remove_container(name, Some(options)).await?;
        Ok(())
    }

    async fn ping(&self) -> RuntimeResult<()> {
        self.docker.ping().await?;
        Ok(())
    }
}

/// Convert an engine listing entry into a [`ManagedContainer`].
///
/// The engine reports names with a leading `/`; the first name wins.
fn container_from_summary(summary: ContainerSummary) -> ManagedContainer {
    let name = summary
        .names
        .unwrap_or_default()
        .into_iter()
        .next()
        .map(|n| n.trim_start_matches('/').to_string())
        .unwrap_or_default();

    ManagedContainer {
        id: summary.id.unwrap_or_default(),
        name,
        status: summary
            .state
            .map(ContainerStatus::from)
            .unwrap_or_else(|| ContainerStatus::Other(String::new())),
        image: summary.image,
        created: summary.created.unwrap_or_default(),
        labels: summary.labels.unwrap_or_else(HashMap::new),
    }
}

/// Split an image reference into the repository and the tag or digest the
/// engine should pull. An untagged reference pulls `latest`, not every tag.
fn split_image_reference(image: &str) -> (&str, &str) {
    if let Some((repository, digest)) = image.split_once('@') {
        return (repository, digest);
    }
    match image.rsplit_once(':') {
        // A colon before the last `/` belongs to a registry port.
        Some((repository, tag)) if !tag.contains('/') => (repository, tag),
        _ => (image, "latest"),
    }
}

/// Stop grace in whole seconds, saturating at the engine's `i64`.
fn stop_timeout_param(grace: Duration) -> i64 {
    i64::try_from(grace.as_secs()).unwrap_or(i64::MAX)
}

/// Parse the RFC 3339 timestamp `inspect` reports into Unix seconds.
fn parse_created(raw: &str) -> Option<i64> {
    chrono::DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.timestamp())
}
