//! Simulation configuration.
//!
//! Loaded from `nighthunter.toml`; a default file is written when none
//! exists.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use nighthunter_combat::CombatConfig;
use nighthunter_common::{NightHunterError, NightHunterResult, SchemaVersion};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Configuration file name.
pub const CONFIG_FILE: &str = "nighthunter.toml";

/// Simulation parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Schema version of this file
    pub version: String,
    /// Ticks per simulated second
    pub tick_rate: f32,
    /// Simulated seconds to run
    pub duration: f32,
    /// Hostile combatants to spawn
    pub enemy_count: u32,
    /// Hit points of each hostile
    pub enemy_hit_points: i32,
    /// Directory of weapon catalog files
    pub weapons_path: PathBuf,
    /// Directory of ability catalog files
    pub abilities_path: PathBuf,
    /// Combat tuning
    pub combat: CombatConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            version: SchemaVersion::SIM_CONFIG.to_string(),
            tick_rate: 60.0,
            duration: 20.0,
            enemy_count: 4,
            enemy_hit_points: 100,
            weapons_path: PathBuf::from("assets/weapons"),
            abilities_path: PathBuf::from("assets/abilities"),
            combat: CombatConfig::default(),
        }
    }
}

impl SimConfig {
    /// Loads the configuration at `path`, writing defaults there if the file
    /// does not exist. A file that cannot be parsed falls back to defaults.
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> NightHunterResult<Self> {
        let path = path.as_ref();

        if !path.exists() {
            info!("Config file not found, writing defaults to {}", path.display());
            let config = Self::default();
            config.save_to(path)?;
            return Ok(config);
        }

        let contents = fs::read_to_string(path)?;
        let config = match toml::from_str::<Self>(&contents) {
            Ok(config) => {
                info!("Loaded config from {}", path.display());
                config
            },
            Err(e) => {
                warn!("Failed to parse config file: {e}");
                Self::default()
            },
        };

        SchemaVersion::SIM_CONFIG.check_readable(&config.version)?;
        config.validate()?;
        Ok(config)
    }

    /// Saves the configuration to `path`.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        let mut file = fs::File::create(path)?;
        file.write_all(contents.as_bytes())?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Checks that every value is usable.
    pub fn validate(&self) -> NightHunterResult<()> {
        if self.tick_rate.is_nan() || self.tick_rate <= 0.0 {
            return Err(NightHunterError::Config(format!(
                "tick_rate must be positive, got {}",
                self.tick_rate
            )));
        }
        if self.duration < 0.0 {
            return Err(NightHunterError::Config(format!(
                "duration must not be negative, got {}",
                self.duration
            )));
        }
        self.combat
            .validate()
            .map_err(|e| NightHunterError::Config(e.to_string()))
    }
}
