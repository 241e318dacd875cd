//! Host binary for the Vivarium runtime.
//!
//! This is the entry point that wires together the module context,
//! the static module registry, the installer, and the tick scheduler.
//! It loads configuration, installs every registered module in
//! dependency order, and runs the scheduling loop until Ctrl-C or a
//! configured round limit stops it.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load configuration from `vivarium-config.yaml`
//! 3. Build the module context (store + bus)
//! 4. Build the static module registry from configuration
//! 5. Install the registry batch in dependency order
//! 6. Wire Ctrl-C to the shutdown signal
//! 7. Run the scheduler loop
//! 8. Run the explicit uninstall path and log the result

mod config;
mod error;
mod registry;

use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use vivarium_core::{ModuleContext, ModuleInstaller, RunBounds, ShutdownSignal};

use crate::config::EngineConfig;
use crate::error::EngineError;

/// Application entry point for the Vivarium engine.
///
/// Initializes all subsystems and drives the tick loop. The loop itself
/// is synchronous and cooperative; tokio only supplies the Ctrl-C
/// handler, which runs on a worker thread while this thread ticks.
///
/// # Errors
///
/// Returns an error if any initialization step fails or a module's tick
/// hook fails during the run.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("vivarium-engine starting");

    // 2. Load configuration.
    let config = load_config()?;
    info!(
        world_name = config.world.name,
        tick_interval_ms = config.time.tick_interval_ms,
        days_per_tick = config.time.days_per_tick,
        max_rounds = config.scheduler.max_rounds,
        "Configuration loaded"
    );

    // 3. Build the module context.
    let mut ctx = ModuleContext::new();

    // 4-5. Build the registry and install it in dependency order.
    let mut installer = ModuleInstaller::new();
    installer.install(&mut ctx, registry::build_registry(&config)?)?;
    info!(
        modules = installer.installed_count(),
        order = ?installer.tick_order(),
        "Modules installed"
    );

    // 6. Wire Ctrl-C to the shutdown signal.
    let signal = Arc::new(ShutdownSignal::new());
    {
        let signal = Arc::clone(&signal);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Ctrl-C received, requesting shutdown");
                signal.request_stop();
            }
        });
    }

    // 7. Run the scheduler. The signal is checked once per round.
    let mut scheduler = installer.into_scheduler();
    let bounds = RunBounds::rounds(config.scheduler.max_rounds);
    let report = scheduler
        .run(&mut ctx, &signal, bounds)
        .map_err(EngineError::from)?;

    // 8. Explicit host teardown path.
    let failures = scheduler.uninstall_all(&mut ctx);
    if !failures.is_empty() {
        warn!(count = failures.len(), "some modules failed to uninstall");
    }

    info!(
        end_reason = ?report.end_reason,
        rounds = report.rounds,
        "vivarium-engine shutdown complete"
    );

    Ok(())
}

/// Load the engine configuration from `vivarium-config.yaml`.
///
/// Looks for the config file relative to the current working directory;
/// a missing file yields defaults.
fn load_config() -> Result<EngineConfig, EngineError> {
    let config_path = Path::new("vivarium-config.yaml");
    if config_path.exists() {
        let config = EngineConfig::from_file(config_path)?;
        Ok(config)
    } else {
        info!("Config file not found, using defaults");
        Ok(EngineConfig::default())
    }
}
