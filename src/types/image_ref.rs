// ABOUTME: Container image reference used as the argument to pull/tag/push.
// ABOUTME: Splits `repository/name:tag` on the last slash and the last colon.

use std::fmt;
use thiserror::Error;

pub const DEFAULT_TAG: &str = "latest";

#[derive(Debug, Error)]
pub enum ParseImageRefError {
    #[error("image reference cannot be empty")]
    Empty,
}

/// One container image, as handed to the engine.
///
/// `full_name` is always `repository/name:tag` (the `repository/` part is
/// omitted when `repository` is empty), so it never comes out empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageReference {
    full_name: String,
    repository: String,
    name: String,
    tag: String,
}

impl ImageReference {
    pub fn parse(input: &str) -> Result<Self, ParseImageRefError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(ParseImageRefError::Empty);
        }
        Ok(Self::from_full_name(input))
    }

    /// Split an already-normalized reference. Never fails; the tag is whatever
    /// follows the last `:` and defaults to `latest` when there is none.
    pub(crate) fn from_full_name(input: &str) -> Self {
        // A colon followed by a slash belongs to a registry port, not a tag.
        let (path, tag) = match input.rsplit_once(':') {
            Some((path, tag)) if !tag.contains('/') => (path, tag),
            _ => (input, DEFAULT_TAG),
        };

        let (repository, name) = match path.rsplit_once('/') {
            Some((repository, name)) => (repository, name),
            None => ("", path),
        };

        let full_name = if repository.is_empty() {
            format!("{name}:{tag}")
        } else {
            format!("{repository}/{name}:{tag}")
        };

        Self {
            full_name,
            repository: repository.to_string(),
            name: name.to_string(),
            tag: tag.to_string(),
        }
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// Registry/path prefix; empty means the default public registry.
    pub fn repository(&self) -> &str {
        &self.repository
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// The reference without its tag, as the engine's tag/push calls expect it.
    pub fn path(&self) -> String {
        if self.repository.is_empty() {
            self.name.clone()
        } else {
            format!("{}/{}", self.repository, self.name)
        }
    }
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_name)
    }
}
