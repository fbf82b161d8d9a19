//! # NightHunter Sim
//!
//! Headless combat simulation for NightHunter.
//!
//! Loads `nighthunter.toml` and the TOML weapon and ability catalogs, runs
//! the scripted scenario at a fixed tick rate, logs combat events, and
//! prints a JSON summary.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

mod catalog_loader;
mod config;
mod scenario;

use std::sync::Arc;

use anyhow::{bail, Result};
use nighthunter_combat::{AbilityRegistry, WeaponRegistry};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::catalog_loader::TomlCatalog;
use crate::config::{SimConfig, CONFIG_FILE};
use crate::scenario::Scenario;

/// Log filter used when `RUST_LOG` is unset or unparsable.
const DEFAULT_LOG_FILTER: &str = "nighthunter=info";

/// Builds the log filter from a `RUST_LOG` value.
fn log_filter(rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// Main entry point.
fn main() -> Result<()> {
    // Initialize tracing
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(log_filter(rust_log.as_deref()))
        .init();

    info!("NightHunter sim starting...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config = SimConfig::load_or_create(CONFIG_FILE)?;
    let source = TomlCatalog::new(&config.weapons_path, &config.abilities_path);

    let mut weapons = WeaponRegistry::new();
    weapons.load(&source)?;
    if weapons.is_empty() {
        bail!("No weapons found in {}", config.weapons_path.display());
    }

    let mut abilities = AbilityRegistry::new();
    abilities.load(&source)?;

    let report = Scenario::new(&config, Arc::new(weapons), Arc::new(abilities)).run();
    println!("{}", serde_json::to_string_pretty(&report)?);

    info!("NightHunter sim complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_filter_defaults_when_unset() {
        assert_eq!(log_filter(None).to_string(), DEFAULT_LOG_FILTER);
    }

    #[test]
    fn test_log_filter_keeps_rust_log() {
        assert_eq!(
            log_filter(Some("nighthunter=debug")).to_string(),
            "nighthunter=debug"
        );
    }
}
