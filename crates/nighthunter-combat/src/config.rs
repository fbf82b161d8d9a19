//! Combat tuning constants.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors found while validating a [`CombatConfig`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// A value is outside its allowed range.
    #[error("Invalid combat config value for {field}: {value}")]
    OutOfRange {
        /// Field name
        field: &'static str,
        /// Offending value
        value: f32,
    },
}

/// Tuning values shared by every controller in a [`crate::CombatWorld`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// Reserve ammo granted when a weapon's ammo state is first created.
    pub default_reserve: i32,
    /// Radius of the melee sweep.
    pub melee_radius: f32,
    /// Shortest melee reach (range is clamped into this band).
    pub melee_min_reach: f32,
    /// Longest melee reach.
    pub melee_max_reach: f32,
    /// Aim distance used when a weapon has no positive range.
    pub fallback_aim_range: f32,
    /// Knockback receiver linear decay per second.
    pub knockback_drag: f32,
    /// Knockback receiver mass.
    pub knockback_mass: f32,
    /// Default offset from a blast center before line-of-sight rays start.
    pub los_padding: f32,
    /// Shortest decoy lifetime.
    pub min_decoy_lifetime: f32,
    /// Event bus channel capacity.
    pub event_capacity: usize,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            default_reserve: 90,
            melee_radius: 0.6,
            melee_min_reach: 0.5,
            melee_max_reach: 2.5,
            fallback_aim_range: 100.0,
            knockback_drag: 8.0,
            knockback_mass: 1.0,
            los_padding: 0.1,
            min_decoy_lifetime: 0.1,
            event_capacity: 1024,
        }
    }
}

impl CombatConfig {
    /// Clamps a weapon range into the melee reach band.
    #[must_use]
    pub fn melee_reach(&self, range: f32) -> f32 {
        range.clamp(self.melee_min_reach, self.melee_max_reach)
    }

    /// Checks that every value is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let checks: [(&'static str, f32, bool); 7] = [
            ("default_reserve", self.default_reserve as f32, self.default_reserve >= 0),
            ("melee_radius", self.melee_radius, self.melee_radius > 0.0),
            (
                "melee_max_reach",
                self.melee_max_reach,
                self.melee_max_reach >= self.melee_min_reach && self.melee_min_reach >= 0.0,
            ),
            ("fallback_aim_range", self.fallback_aim_range, self.fallback_aim_range > 0.0),
            ("knockback_drag", self.knockback_drag, self.knockback_drag >= 0.0),
            ("knockback_mass", self.knockback_mass, self.knockback_mass > 0.0),
            ("min_decoy_lifetime", self.min_decoy_lifetime, self.min_decoy_lifetime >= 0.0),
        ];

        for (field, value, ok) in checks {
            if !ok {
                return Err(ConfigError::OutOfRange { field, value });
            }
        }
        Ok(())
    }
}
