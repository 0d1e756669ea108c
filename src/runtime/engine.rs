// ABOUTME: Bollard-backed container engine for Docker and Podman sockets.
// ABOUTME: Maps bollard errors onto ImageError and bounds pull/push with timeouts.

use crate::runtime::traits::{
    ImageError, ImageOps, RegistryAuth, RuntimeInfo, RuntimeInfoError, RuntimeMetadata,
};
use crate::runtime::types::{RuntimeInfo as DetectedRuntime, RuntimeType};
use crate::types::ImageReference;
use async_trait::async_trait;
use bollard::Docker;
use bollard::auth::DockerCredentials;
use bollard::query_parameters::{CreateImageOptions, PushImageOptions, TagImageOptions};
use futures::StreamExt;
use std::time::Duration;

// =============================================================================
// Error Mapping Helpers
// =============================================================================

fn map_image_pull_error(e: bollard::errors::Error, image_name: &str) -> ImageError {
    match &e {
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 404 => ImageError::NotFound(message.clone()),
        _ => ImageError::PullFailed(format!("{}: {}", image_name, e)),
    }
}

fn map_image_tag_error(e: bollard::errors::Error, image_name: &str) -> ImageError {
    match &e {
        bollard::errors::Error::DockerResponseServerError { status_code, .. }
            if *status_code == 404 =>
        {
            ImageError::NotFound(image_name.to_string())
        }
        _ => ImageError::TagFailed(format!("{}: {}", image_name, e)),
    }
}

fn map_image_push_error(e: bollard::errors::Error, image_name: &str) -> ImageError {
    match &e {
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 401 || *status_code == 403 => {
            ImageError::AuthenticationFailed(message.clone())
        }
        bollard::errors::Error::DockerResponseServerError { status_code, .. }
            if *status_code == 404 =>
        {
            ImageError::NotFound(image_name.to_string())
        }
        _ => ImageError::PushFailed(format!("{}: {}", image_name, e)),
    }
}

// =============================================================================
// BollardEngine
// =============================================================================

/// Upper bounds the engine puts on its own network calls.
#[derive(Debug, Clone, Copy)]
pub struct EngineTimeouts {
    pub pull: Duration,
    pub push: Duration,
}

impl Default for EngineTimeouts {
    fn default() -> Self {
        Self {
            pull: Duration::from_secs(5 * 60),
            push: Duration::from_secs(10 * 60),
        }
    }
}

/// Container engine implementation using bollard.
///
/// Pulls are anonymous; pushes carry the configured registry credentials.
pub struct BollardEngine {
    client: Docker,
    runtime_type: RuntimeType,
    auth: RegistryAuth,
    timeouts: EngineTimeouts,
}

impl BollardEngine {
    /// Create a new engine from a Docker client.
    pub fn new(client: Docker, runtime_type: RuntimeType, auth: RegistryAuth) -> Self {
        Self {
            client,
            runtime_type,
            auth,
            timeouts: EngineTimeouts::default(),
        }
    }

    /// Connect to a container runtime using detected runtime info.
    ///
    /// Use with `resolve_runtime()` or `detect_local()` to find the socket.
    pub fn connect(info: &DetectedRuntime, auth: RegistryAuth) -> Result<Self, RuntimeInfoError> {
        let client =
            Docker::connect_with_unix(&info.socket_path, 120, bollard::API_DEFAULT_VERSION)
                .map_err(|e| RuntimeInfoError::ConnectionFailed(e.to_string()))?;
        Ok(Self::new(client, info.runtime_type, auth))
    }

    pub fn with_timeouts(mut self, timeouts: EngineTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    fn push_credentials(&self) -> DockerCredentials {
        DockerCredentials {
            username: Some(self.auth.username.clone()),
            password: Some(self.auth.password.clone()),
            serveraddress: self.auth.server.clone(),
            ..Default::default()
        }
    }
}

#[async_trait]
impl RuntimeInfo for BollardEngine {
    async fn info(&self) -> Result<RuntimeMetadata, RuntimeInfoError> {
        let info = self
            .client
            .info()
            .await
            .map_err(|e| RuntimeInfoError::ConnectionFailed(e.to_string()))?;

        let name = match self.runtime_type {
            RuntimeType::Docker => "Docker".to_string(),
            RuntimeType::Podman => "Podman".to_string(),
        };

        Ok(RuntimeMetadata {
            name,
            version: info.server_version.unwrap_or_default(),
            api_version: bollard::API_DEFAULT_VERSION.to_string(),
            os: info.operating_system.unwrap_or_default(),
            arch: info.architecture.unwrap_or_default(),
        })
    }

    async fn ping(&self) -> Result<(), RuntimeInfoError> {
        self.client
            .ping()
            .await
            .map_err(|e| RuntimeInfoError::ConnectionFailed(e.to_string()))?;
        Ok(())
    }

    async fn verify_credentials(&self) -> Result<(), RuntimeInfoError> {
        if !self.auth.is_complete() {
            return Err(RuntimeInfoError::AuthenticationFailed(
                "username and password are required to push".to_string(),
            ));
        }
        // The Docker-compatible API has no standalone login call the daemon
        // honours for pushes, so a bad password only surfaces on the first push.
        self.ping().await
    }
}

#[async_trait]
impl ImageOps for BollardEngine {
    async fn pull_image(&self, reference: &ImageReference) -> Result<(), ImageError> {
        let image_name = reference.full_name().to_string();

        let opts = CreateImageOptions {
            from_image: Some(image_name.clone()),
            ..Default::default()
        };

        // Pull returns a stream of progress updates - consume it
        let pull = async {
            let mut stream = self.client.create_image(Some(opts), None, None);
            while let Some(result) = stream.next().await {
                result.map_err(|e| map_image_pull_error(e, &image_name))?;
            }
            Ok::<(), ImageError>(())
        };

        tokio::time::timeout(self.timeouts.pull, pull)
            .await
            .map_err(|_| ImageError::Timeout {
                operation: "pull",
                image: image_name.clone(),
                timeout: self.timeouts.pull,
            })?
    }

    async fn tag_image(
        &self,
        source: &ImageReference,
        target: &ImageReference,
    ) -> Result<(), ImageError> {
        let opts = TagImageOptions {
            repo: Some(target.path()),
            tag: Some(target.tag().to_string()),
            ..Default::default()
        };

        self.client
            .tag_image(source.full_name(), Some(opts))
            .await
            .map_err(|e| map_image_tag_error(e, source.full_name()))
    }

    async fn push_image(&self, reference: &ImageReference) -> Result<(), ImageError> {
        let image_name = reference.full_name().to_string();

        let opts = PushImageOptions {
            tag: Some(reference.tag().to_string()),
            ..Default::default()
        };
        let credentials = self.push_credentials();

        let push = async {
            let mut stream = self
                .client
                .push_image(&reference.path(), Some(opts), Some(credentials));
            while let Some(result) = stream.next().await {
                result.map_err(|e| map_image_push_error(e, &image_name))?;
            }
            Ok::<(), ImageError>(())
        };

        tokio::time::timeout(self.timeouts.push, push)
            .await
            .map_err(|_| ImageError::Timeout {
                operation: "push",
                image: image_name.clone(),
                timeout: self.timeouts.push,
            })?
    }
}
