// ABOUTME: Settings for a hubsync run and their layering.
// ABOUTME: Defaults, then hubsync.yml, then a named profile, then env/flag overrides.

use crate::error::{Error, Result};
use crate::runtime::{EngineTimeouts, RuntimeConfig, RuntimeType};
use crate::sync::RetryPolicy;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILENAME: &str = "hubsync.yml";
pub const CONFIG_FILENAME_ALT: &str = "hubsync.yaml";
pub const CONFIG_FILENAME_DIR: &str = ".hubsync/config.yml";

pub const DEFAULT_NAMESPACE: &str = "yugasun";
pub const DEFAULT_OUTPUT: &str = "output.log";

/// Log levels accepted by `--log-level`.
pub const LOG_LEVELS: [&str; 5] = ["debug", "info", "warn", "error", "fatal"];

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub username: String,
    pub password: String,
    /// Target registry prefix; empty pushes to Docker Hub.
    pub repository: String,
    pub namespace: String,

    /// JSON payload: `{"hubsync": ["image[$custom]", ...]}`.
    pub content: String,
    pub max_content: usize,

    pub output_path: PathBuf,
    pub concurrency: usize,

    /// Budget for the whole run.
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,

    pub retry_count: u32,
    #[serde(with = "humantime_serde")]
    pub retry_delay: Duration,

    #[serde(with = "humantime_serde")]
    pub pull_timeout: Duration,
    #[serde(with = "humantime_serde")]
    pub push_timeout: Duration,

    pub force: bool,
    pub dry_run: bool,
    pub log_level: String,

    pub runtime: Option<RuntimeType>,
    pub socket: Option<String>,

    pub profiles: HashMap<String, Overrides>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            username: String::new(),
            password: String::new(),
            repository: String::new(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            content: String::new(),
            max_content: 10,
            output_path: PathBuf::from(DEFAULT_OUTPUT),
            concurrency: 3,
            timeout: Duration::from_secs(10 * 60),
            retry_count: 3,
            retry_delay: Duration::from_secs(2),
            pull_timeout: Duration::from_secs(5 * 60),
            push_timeout: Duration::from_secs(10 * 60),
            force: false,
            dry_run: false,
            log_level: "info".to_string(),
            runtime: None,
            socket: None,
            profiles: HashMap::new(),
        }
    }
}

/// A partial set of settings laid over a [`Config`].
///
/// Used for profiles in the config file and for env/flag overrides.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Overrides {
    pub username: Option<String>,
    pub password: Option<String>,
    pub repository: Option<String>,
    pub namespace: Option<String>,
    pub content: Option<String>,
    pub max_content: Option<usize>,
    pub output_path: Option<PathBuf>,
    pub concurrency: Option<usize>,
    #[serde(with = "humantime_serde")]
    pub timeout: Option<Duration>,
    pub retry_count: Option<u32>,
    #[serde(with = "humantime_serde")]
    pub retry_delay: Option<Duration>,
    #[serde(with = "humantime_serde")]
    pub pull_timeout: Option<Duration>,
    #[serde(with = "humantime_serde")]
    pub push_timeout: Option<Duration>,
    pub force: Option<bool>,
    pub dry_run: Option<bool>,
    pub log_level: Option<String>,
    pub runtime: Option<RuntimeType>,
    pub socket: Option<String>,
}

impl Overrides {
    /// Replace every setting of `config` that this overrides.
    pub fn apply_to(self, config: &mut Config) {
        fn set<T>(slot: &mut T, value: Option<T>) {
            if let Some(value) = value {
                *slot = value;
            }
        }

        set(&mut config.username, self.username);
        set(&mut config.password, self.password);
        set(&mut config.repository, self.repository);
        set(&mut config.namespace, self.namespace);
        set(&mut config.content, self.content);
        set(&mut config.max_content, self.max_content);
        set(&mut config.output_path, self.output_path);
        set(&mut config.concurrency, self.concurrency);
        set(&mut config.timeout, self.timeout);
        set(&mut config.retry_count, self.retry_count);
        set(&mut config.retry_delay, self.retry_delay);
        set(&mut config.pull_timeout, self.pull_timeout);
        set(&mut config.push_timeout, self.push_timeout);
        set(&mut config.force, self.force);
        set(&mut config.dry_run, self.dry_run);
        set(&mut config.log_level, self.log_level);

        if self.runtime.is_some() {
            config.runtime = self.runtime;
        }
        if self.socket.is_some() {
            config.socket = self.socket;
        }
    }
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(Error::from)
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::ConfigNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Load the first config file found in `dir`.
    pub fn discover(dir: &Path) -> Result<Self> {
        let candidates = [
            dir.join(CONFIG_FILENAME),
            dir.join(CONFIG_FILENAME_ALT),
            dir.join(CONFIG_FILENAME_DIR),
        ];

        for path in &candidates {
            if path.exists() {
                tracing::debug!(path = %path.display(), "using config file");
                return Self::load(path);
            }
        }

        Err(Error::ConfigNotFound(dir.to_path_buf()))
    }

    /// File layer: an explicit path must exist; otherwise discovery in `dir`,
    /// falling back to defaults when nothing is found.
    pub fn resolve(explicit: Option<&Path>, dir: &Path) -> Result<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None => match Self::discover(dir) {
                Err(Error::ConfigNotFound(_)) => Ok(Self::default()),
                other => other,
            },
        }
    }

    /// This config with the named profile laid over it.
    pub fn for_profile(&self, name: &str) -> Result<Config> {
        let profile = self
            .profiles
            .get(name)
            .ok_or_else(|| Error::UnknownProfile(name.to_string()))?;

        let mut merged = self.clone();
        profile.clone().apply_to(&mut merged);
        Ok(merged)
    }

    /// Reject settings a run cannot start with.
    pub fn validate(&self) -> Result<()> {
        if self.username.is_empty() {
            return Err(Error::InvalidConfig("username is required".to_string()));
        }
        if self.password.is_empty() {
            return Err(Error::InvalidConfig("password is required".to_string()));
        }
        if self.content.is_empty() {
            return Err(Error::InvalidConfig("content is required".to_string()));
        }
        if self.concurrency < 1 {
            return Err(Error::InvalidConfig(
                "concurrency must be at least 1".to_string(),
            ));
        }
        if self.max_content < 1 {
            return Err(Error::InvalidConfig(
                "max-content must be at least 1".to_string(),
            ));
        }
        if !LOG_LEVELS.contains(&self.log_level.as_str()) {
            return Err(Error::InvalidConfig(format!(
                "invalid log level '{}' (expected one of: {})",
                self.log_level,
                LOG_LEVELS.join(", ")
            )));
        }
        Ok(())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.retry_count, self.retry_delay)
    }

    pub fn engine_timeouts(&self) -> EngineTimeouts {
        EngineTimeouts {
            pull: self.pull_timeout,
            push: self.push_timeout,
        }
    }

    pub fn runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            runtime: self.runtime,
            socket: self.socket.clone(),
        }
    }

    /// `tracing` filter directive for the configured level.
    pub fn tracing_level(&self) -> &str {
        match self.log_level.as_str() {
            "fatal" => "error",
            level => level,
        }
    }
}
