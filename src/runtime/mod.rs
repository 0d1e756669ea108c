// ABOUTME: Container engine collaborator for Docker and Podman.
// ABOUTME: Traits, bollard-backed implementation and local socket detection.

mod detection;
mod engine;
mod error;
pub mod traits;
mod types;

pub use detection::{DetectionError, default_socket_path, detect_local, resolve_runtime};
pub use engine::{BollardEngine, EngineTimeouts};
pub use error::{RuntimeError, RuntimeErrorKind};
pub use traits::{
    ImageError, ImageOps, RegistryAuth, RuntimeInfo as RuntimeInfoTrait, RuntimeInfoError,
    RuntimeMetadata,
};
pub use types::{RuntimeConfig, RuntimeInfo, RuntimeType};
