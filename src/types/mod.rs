// ABOUTME: Value types shared across the sync pipeline.
// ABOUTME: Currently the image reference handed to the container engine.

mod image_ref;

pub use image_ref::{DEFAULT_TAG, ImageReference, ParseImageRefError};
