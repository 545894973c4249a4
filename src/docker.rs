use std::collections::HashSet;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use bollard::container::{InspectContainerOptions, ListContainersOptions};
use bollard::errors::Error as DockerError;
use bollard::image::ListImagesOptions;
use bollard::models::ContainerInspectResponse;
use bollard::{Docker, API_DEFAULT_VERSION};
use futures::stream::{self, StreamExt};
use log::{debug, info};

use crate::error::{Result, RuntimeError};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Reference reported for stored images that carry no tag at all.
const UNTAGGED_REFERENCE: &str = "<none>:<none>";

/// How to reach the runtime. Built once by the caller and handed to the client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// `unix://`, `tcp://` or `http://` endpoint; `None` uses the local defaults.
    pub host: Option<String>,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Read-only view of a container runtime.
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    async fn list_running_container_ids(&self) -> Result<Vec<String>>;

    async fn inspect_container(&self, id: &str) -> Result<ContainerInspectResponse>;

    /// Every `repository:tag` of every stored image, dangling ones included.
    async fn list_image_references(&self) -> Result<Vec<String>>;

    async fn list_running_image_references(&self) -> Result<HashSet<String>>;

    /// Inspect `ids` with at most `concurrency` calls in flight.
    ///
    /// Results come back in the order of `ids`, each paired with its id.
    async fn inspect_containers(
        &self,
        ids: Vec<String>,
        concurrency: usize,
    ) -> Vec<(String, Result<ContainerInspectResponse>)> {
        stream::iter(ids)
            .map(|id| async move {
                let result = self.inspect_container(&id).await;
                (id, result)
            })
            .buffered(concurrency.max(1))
            .collect()
            .await
    }
}

pub struct DockerClient {
    client: Docker,
    timeout: Duration,
}

impl DockerClient {
    /// Connect to the runtime described by `config` and make sure it answers.
    pub async fn connect(config: &ClientConfig) -> Result<Self> {
        let client = open(config).map_err(|e| {
            RuntimeError::Unavailable(format!("failed to connect to Docker daemon: {}", e))
        })?;

        let docker = Self {
            client,
            timeout: config.timeout,
        };

        docker
            .call("ping", docker.client.ping())
            .await
            .map_err(|e| match e {
                RuntimeError::Unavailable(_) => e,
                other => RuntimeError::Unavailable(format!(
                    "Docker daemon did not answer ping ({}). Is Docker running?",
                    other
                )),
            })?;

        info!("Connected to Docker daemon");
        Ok(docker)
    }

    /// Run one API call under the configured timeout and map its failure.
    async fn call<T, F>(&self, operation: &str, fut: F) -> Result<T>
    where
        F: Future<Output = std::result::Result<T, DockerError>>,
    {
        debug!("Runtime call: {}", operation);
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result.map_err(|e| map_docker_error(operation, self.timeout, e)),
            Err(_) => Err(RuntimeError::Timeout {
                operation: operation.to_string(),
                seconds: self.timeout.as_secs(),
            }),
        }
    }
}

fn open(config: &ClientConfig) -> std::result::Result<Docker, DockerError> {
    let timeout_secs = config.timeout.as_secs().max(1);

    match config.host.as_deref() {
        None => Docker::connect_with_local_defaults(),
        #[cfg(unix)]
        Some(host) if host.starts_with("unix://") => {
            Docker::connect_with_unix(host, timeout_secs, API_DEFAULT_VERSION)
        }
        Some(host) => Docker::connect_with_http(host, timeout_secs, API_DEFAULT_VERSION),
    }
}

/// Map a bollard failure on an established connection.
///
/// Reachability is settled by the ping in `connect`, so transport failures
/// here only cost the call that hit them.
fn map_docker_error(operation: &str, bound: Duration, err: DockerError) -> RuntimeError {
    match err {
        DockerError::RequestTimeoutError => RuntimeError::Timeout {
            operation: operation.to_string(),
            seconds: bound.as_secs(),
        },
        DockerError::DockerResponseServerError {
            status_code,
            message,
        } => RuntimeError::Api {
            operation: operation.to_string(),
            status: status_code,
            message,
        },
        DockerError::JsonSerdeError { err } => RuntimeError::parse(operation, err.to_string()),
        e @ DockerError::JsonDataError { .. } => RuntimeError::parse(operation, e.to_string()),
        other => RuntimeError::Transport {
            operation: operation.to_string(),
            message: other.to_string(),
        },
    }
}

#[async_trait]
impl ContainerRuntime for DockerClient {
    async fn list_running_container_ids(&self) -> Result<Vec<String>> {
        let options = ListContainersOptions::<String> {
            all: false,
            ..Default::default()
        };
        let containers = self
            .call("list containers", self.client.list_containers(Some(options)))
            .await?;

        Ok(containers.into_iter().filter_map(|c| c.id).collect())
    }

    async fn inspect_container(&self, id: &str) -> Result<ContainerInspectResponse> {
        let operation = format!("inspect container {}", id);
        self.call(
            &operation,
            self.client.inspect_container(id, None::<InspectContainerOptions>),
        )
        .await
    }

    async fn list_image_references(&self) -> Result<Vec<String>> {
        let options = ListImagesOptions::<String> {
            all: false,
            ..Default::default()
        };
        let images = self
            .call("list images", self.client.list_images(Some(options)))
            .await?;

        let mut references = Vec::new();
        for image in images {
            // Newer engines report untagged images with an empty tag list
            if image.repo_tags.is_empty() {
                references.push(UNTAGGED_REFERENCE.to_string());
            } else {
                references.extend(image.repo_tags);
            }
        }

        Ok(references)
    }

    async fn list_running_image_references(&self) -> Result<HashSet<String>> {
        let options = ListContainersOptions::<String> {
            all: false,
            ..Default::default()
        };
        let containers = self
            .call("list running images", self.client.list_containers(Some(options)))
            .await?;

        Ok(containers.into_iter().filter_map(|c| c.image).collect())
    }
}
