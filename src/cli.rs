// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Every setting can also come from its environment variable.

use clap::Parser;
use hubsync::config::Overrides;
use hubsync::output::OutputMode;
use hubsync::runtime::RuntimeType;
use humantime_serde::re::humantime::parse_duration;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "hubsync")]
#[command(about = "Mirror container images into your own registry namespace")]
#[command(version)]
pub struct Cli {
    /// Registry username
    #[arg(long, env = "DOCKER_USERNAME")]
    pub username: Option<String>,

    /// Registry password
    #[arg(long, env = "DOCKER_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Target registry address (empty for Docker Hub)
    #[arg(long, env = "DOCKER_REPOSITORY")]
    pub repository: Option<String>,

    /// Target namespace
    #[arg(long, env = "DOCKER_NAMESPACE")]
    pub namespace: Option<String>,

    /// JSON content with images to sync: {"hubsync": ["image[$name]", ...]}
    #[arg(long, env = "CONTENT")]
    pub content: Option<String>,

    /// Maximum number of images accepted in one run
    #[arg(long, env = "MAX_CONTENT")]
    pub max_content: Option<usize>,

    /// Where to write the generated pull commands
    #[arg(long, env = "OUTPUT_PATH")]
    pub output: Option<PathBuf>,

    /// Maximum concurrent sync operations
    #[arg(long, env = "CONCURRENCY")]
    pub concurrency: Option<usize>,

    /// Budget for the whole run (e.g. 10m)
    #[arg(long, env = "TIMEOUT", value_parser = parse_duration)]
    pub timeout: Option<Duration>,

    /// Retries for a failed pull or push
    #[arg(long, env = "RETRY_COUNT")]
    pub retry_count: Option<u32>,

    /// Delay before the first retry; doubles each time (e.g. 2s)
    #[arg(long, env = "RETRY_DELAY", value_parser = parse_duration)]
    pub retry_delay: Option<Duration>,

    /// Push even if the target already exists
    #[arg(long, env = "FORCE")]
    pub force: bool,

    /// Show what would be synced without touching the engine
    #[arg(long, env = "DRY_RUN")]
    pub dry_run: bool,

    /// Log level (debug, info, warn, error, fatal)
    #[arg(long, env = "LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Also write logs to this file
    #[arg(long, env = "LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Print only the final counts
    #[arg(short, long, conflicts_with = "json")]
    pub quiet: bool,

    /// Print the final summary as JSON
    #[arg(long)]
    pub json: bool,

    /// Configuration file (default: hubsync.yml in the current directory)
    #[arg(long, env = "CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// Named profile from the configuration file
    #[arg(long, env = "PROFILE")]
    pub profile: Option<String>,

    /// Container runtime to use instead of auto-detection
    #[arg(long, value_enum)]
    pub runtime: Option<RuntimeType>,

    /// Runtime socket path
    #[arg(long)]
    pub socket: Option<String>,
}

impl Cli {
    pub fn output_mode(&self) -> OutputMode {
        if self.json {
            OutputMode::Json
        } else if self.quiet {
            OutputMode::Quiet
        } else {
            OutputMode::Normal
        }
    }

    /// Settings given on the command line or in the environment.
    ///
    /// Boolean switches only ever turn a setting on.
    pub fn overrides(&self) -> Overrides {
        Overrides {
            username: self.username.clone(),
            password: self.password.clone(),
            repository: self.repository.clone(),
            namespace: self.namespace.clone(),
            content: self.content.clone(),
            max_content: self.max_content,
            output_path: self.output.clone(),
            concurrency: self.concurrency,
            timeout: self.timeout,
            retry_count: self.retry_count,
            retry_delay: self.retry_delay,
            pull_timeout: None,
            push_timeout: None,
            force: self.force.then_some(true),
            dry_run: self.dry_run.then_some(true),
            log_level: self.log_level.clone(),
            runtime: self.runtime,
            socket: self.socket.clone(),
        }
    }
}
