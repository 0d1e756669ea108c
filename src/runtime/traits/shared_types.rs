// ABOUTME: Shared types used across runtime trait definitions.
// ABOUTME: RegistryAuth and RuntimeMetadata.

/// Registry authentication credentials.
#[derive(Debug, Clone)]
pub struct RegistryAuth {
    /// Username.
    pub username: String,
    /// Password or token.
    pub password: String,
    /// Registry server (e.g., "registry.example.com"); `None` means Docker Hub.
    pub server: Option<String>,
}

impl RegistryAuth {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            server: None,
        }
    }

    pub fn server(mut self, server: impl Into<String>) -> Self {
        let server = server.into();
        self.server = if server.is_empty() { None } else { Some(server) };
        self
    }

    pub fn is_complete(&self) -> bool {
        !self.username.is_empty() && !self.password.is_empty()
    }
}

/// Runtime metadata.
#[derive(Debug, Clone)]
pub struct RuntimeMetadata {
    /// Runtime name (e.g., "Docker", "Podman").
    pub name: String,
    /// Runtime version.
    pub version: String,
    /// API version.
    pub api_version: String,
    /// Operating system.
    pub os: String,
    /// Architecture.
    pub arch: String,
}
