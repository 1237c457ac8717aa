//! Headless host for the Stowage storage priority engine.
//!
//! Runs a scenario end to end the way a game host would drive the engine:
//! definitions and storage locations are registered, operator weights are
//! applied, every job goes through the resolver, and the registry is saved
//! and restored across a simulated reload.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `stowage-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Load the scenario (first argument, default `stowage-scenario.yaml`)
//! 4. Build the catalog, the yard, and the priority service
//! 5. Place every job
//! 6. Save the game snapshot to the configured path
//! 7. Reload it into a fresh service and log what survived

mod error;
mod scenario;

use std::path::{Path, PathBuf};

use stowage_core::{PriorityService, StowageConfig};
use stowage_types::GameSnapshot;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::scenario::{Scenario, Yard};

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, the scenario, or the snapshot file
/// cannot be read or written.
fn main() -> Result<(), EngineError> {
    // 1. Load configuration. Logging is not up yet, so remember whether a
    //    file was found and report it afterwards.
    let (config, config_found) = load_config()?;

    // 2. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.logging.filter_directives())),
        )
        .with_target(true)
        .init();

    info!("stowage-engine starting");
    if !config_found {
        info!("Config file not found, using defaults");
    }
    info!(
        session_enabled = config.session.enabled_by_default,
        rescan_trigger = ?config.resolver.rescan_trigger,
        snapshot_path = config.persistence.snapshot_path,
        "Configuration loaded"
    );

    // 3. Load the scenario.
    let scenario_path = std::env::args_os()
        .nth(1)
        .map_or_else(|| PathBuf::from("stowage-scenario.yaml"), PathBuf::from);
    let scenario = Scenario::from_file(&scenario_path)?;
    info!(
        path = %scenario_path.display(),
        items = scenario.items.len(),
        categories = scenario.categories.len(),
        locations = scenario.locations.len(),
        jobs = scenario.jobs.len(),
        "Scenario loaded"
    );

    // 4. Build the host and the service.
    let catalog = scenario.catalog()?;
    let yard = Yard::from_definitions(&scenario.locations)?;
    let service = PriorityService::new(config.clone(), catalog.clone());
    if yard.is_empty() {
        warn!("Scenario has no storage locations, every job stays where it is");
    }
    let applied = yard.install(&scenario.locations, &service)?;
    info!(
        sites = yard.len(),
        weights = applied,
        stats = %service.statistics(),
        "Yard installed"
    );

    // 5. Place every job.
    let summary = scenario::run_jobs(&service, &yard, &scenario.jobs);
    info!(
        placed = summary.placed,
        redirected = summary.redirected,
        unplaced = summary.unplaced,
        "Jobs placed"
    );

    // 6. Save.
    let snapshot_path = Path::new(&config.persistence.snapshot_path);
    let saved = service.save_game();
    std::fs::write(snapshot_path, serde_json::to_string_pretty(&saved)?)?;
    info!(
        path = %snapshot_path.display(),
        records = saved.registry.records.len(),
        overrides = saved.registry.override_count(),
        "Game snapshot written"
    );

    // 7. Reload into a fresh service.
    let restored: GameSnapshot = serde_json::from_str(&std::fs::read_to_string(snapshot_path)?)?;
    let reloaded = PriorityService::new(config, catalog);
    let report = reloaded.load_game(&restored, |id| yard.contains(id));
    info!(
        restored = report.restored,
        dropped_locations = report.dropped_locations,
        stale_keys = report.stale_item_keys.saturating_add(report.stale_category_keys),
        session_enabled = reloaded.session().is_enabled(),
        stats = %reloaded.statistics(),
        "Game snapshot reloaded"
    );

    info!("stowage-engine shutdown complete");
    Ok(())
}

/// Load configuration from `stowage-config.yaml` in the working directory.
///
/// Returns the config and whether the file existed.
fn load_config() -> Result<(StowageConfig, bool), EngineError> {
    let config_path = Path::new("stowage-config.yaml");
    if config_path.exists() {
        Ok((StowageConfig::from_file(config_path)?, true))
    } else {
        Ok((StowageConfig::parse("")?, false))
    }
}
