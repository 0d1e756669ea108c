// ABOUTME: Capability traits for the container engine collaborator.
// ABOUTME: Defines ImageOps (pull/tag/push) and RuntimeInfo (ping, credentials).

mod image;
mod runtime_info;
mod shared_types;

pub use image::{ImageError, ImageOps};
pub use runtime_info::{RuntimeInfo, RuntimeInfoError};
pub use shared_types::*;
