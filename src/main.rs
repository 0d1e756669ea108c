// ABOUTME: Entry point for the hubsync CLI application.
// ABOUTME: Layers configuration, connects to the local engine and runs one sync.

mod cli;

use clap::Parser;
use cli::Cli;
use hubsync::config::Config;
use hubsync::error::{Error, Result};
use hubsync::output::Console;
use hubsync::runtime::{
    BollardEngine, RegistryAuth, RuntimeError, RuntimeInfo, RuntimeInfoTrait, RuntimeType,
    default_socket_path, resolve_runtime,
};
use hubsync::sync::Syncer;
use std::env;
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let console = Console::new(cli.output_mode());

    let result = match load_config(&cli) {
        Ok(config) => match init_tracing(&cli, &config) {
            Ok(()) => run(config, &console).await,
            Err(e) => Err(e),
        },
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        console.error(&e.to_string());
        std::process::exit(1);
    }
}

/// Defaults, config file, profile, then env/flags.
fn load_config(cli: &Cli) -> Result<Config> {
    let cwd = env::current_dir()?;
    let mut config = Config::resolve(cli.config.as_deref(), &cwd)?;

    if let Some(profile) = &cli.profile {
        config = config.for_profile(profile)?;
    }

    cli.overrides().apply_to(&mut config);
    config.validate()?;
    Ok(config)
}

fn init_tracing(cli: &Cli, config: &Config) -> Result<()> {
    let level = if cli.verbose {
        "debug"
    } else {
        config.tracing_level()
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,hubsync={level}")));

    let file_layer = match &cli.log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr),
        )
        .with(file_layer)
        .init();
    Ok(())
}

async fn run(config: Config, console: &Console) -> Result<()> {
    let engine = connect_engine(&config).await?;
    let output_path = config.output_path.clone();

    let cancel = CancellationToken::new();
    let watchdog = spawn_interrupt_watchdog(cancel.clone());

    let syncer = Syncer::with_script_output(config, engine);
    let outcome = syncer.run(&cancel).await;
    watchdog.abort();

    let outcome = outcome?;
    console.summary(&outcome.stats, &output_path);
    Ok(())
}

/// Resolve the local runtime and check it is usable for this run.
///
/// Dry runs never call the engine, so a missing socket is tolerated there.
async fn connect_engine(config: &Config) -> Result<Arc<BollardEngine>> {
    let runtime = match resolve_runtime(&config.runtime_config()) {
        Ok(runtime) => runtime,
        Err(e) if config.dry_run => {
            tracing::debug!(error = %e, "no runtime found, dry run continues with docker defaults");
            RuntimeInfo {
                runtime_type: RuntimeType::Docker,
                socket_path: default_socket_path(RuntimeType::Docker),
            }
        }
        Err(e) => return Err(Error::Client(RuntimeError::from(e))),
    };
    tracing::info!(runtime = %runtime.runtime_type, socket = %runtime.socket_path, "using container runtime");

    let auth = RegistryAuth::new(&config.username, &config.password).server(&config.repository);
    let engine = BollardEngine::connect(&runtime, auth)
        .map_err(RuntimeError::from)?
        .with_timeouts(config.engine_timeouts());

    if !config.dry_run {
        engine
            .verify_credentials()
            .await
            .map_err(RuntimeError::from)?;
        tracing::debug!("registry credentials verified");
    }

    Ok(Arc::new(engine))
}

/// Cancel the run on ctrl-c. The time budget is enforced by the syncer.
fn spawn_interrupt_watchdog(cancel: CancellationToken) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        interrupted(tokio::signal::ctrl_c()).await;
        tracing::warn!("interrupted, cancelling remaining work");
        cancel.cancel();
    })
}

/// Resolves once `signal` is delivered. A handler that cannot be installed
/// never resolves, so the run keeps going.
async fn interrupted(signal: impl Future<Output = std::io::Result<()>>) {
    if let Err(e) = signal.await {
        tracing::warn!(error = %e, "cannot listen for ctrl-c, run is not interruptible");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn delivered_signal_interrupts() {
        let signal = async { Ok(()) };
        assert!(
            tokio::time::timeout(Duration::from_millis(50), interrupted(signal))
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn failed_signal_handler_never_interrupts() {
        let signal = async { Err(std::io::Error::other("no signal handler")) };
        assert!(
            tokio::time::timeout(Duration::from_millis(20), interrupted(signal))
                .await
                .is_err()
        );
    }
}
