//! Weapon catalog entries.

use nighthunter_common::WeaponId;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::catalog::{CatalogError, CatalogResult};

/// How a weapon resolves a shot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeaponKind {
    /// Spawns a travelling projectile.
    #[default]
    Ranged,
    /// Instant ray along the aim direction.
    Hitscan,
    /// Short sphere sweep in front of the wielder.
    Melee,
    /// Consumes the trigger but resolves nothing (tools, placeables).
    Utility,
}

/// Projectile configuration for ranged weapons.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectileParams {
    /// Travel speed (units/s).
    #[serde(default = "default_projectile_speed")]
    pub speed: f32,
    /// Seconds before an unexploded projectile despawns.
    #[serde(default = "default_projectile_lifetime")]
    pub lifetime: f32,
    /// Collision radius (0 = ray).
    #[serde(default)]
    pub radius: f32,
}

const fn default_projectile_speed() -> f32 {
    26.0
}

const fn default_projectile_lifetime() -> f32 {
    5.0
}

impl Default for ProjectileParams {
    fn default() -> Self {
        Self {
            speed: default_projectile_speed(),
            lifetime: default_projectile_lifetime(),
            radius: 0.0,
        }
    }
}

/// Immutable weapon definition loaded from the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponDefinition {
    /// Unique weapon identifier.
    pub id: WeaponId,
    /// Display name.
    #[serde(default = "default_name")]
    pub name: String,
    /// Resolution strategy.
    #[serde(default)]
    pub kind: WeaponKind,
    /// Damage per hit.
    #[serde(default = "default_damage")]
    pub damage: i32,
    /// Minimum seconds between shots.
    #[serde(default = "default_fire_cooldown")]
    pub fire_cooldown: f32,
    /// Seconds a reload takes.
    #[serde(default = "default_reload_time")]
    pub reload_time: f32,
    /// Maximum reach of a shot.
    #[serde(default = "default_range")]
    pub range: f32,
    /// Whether shots consume ammo.
    #[serde(default)]
    pub uses_ammo: bool,
    /// Rounds per clip.
    #[serde(default = "default_clip_size")]
    pub clip_size: i32,
    /// Knockback magnitude applied on hit.
    #[serde(default = "default_impulse")]
    pub impulse: f32,
    /// Projectile configuration (ranged only).
    #[serde(default)]
    pub projectile: Option<ProjectileParams>,
    /// Forward lunge on a melee hit.
    #[serde(default = "default_lunge_distance")]
    pub lunge_distance: f32,
    /// Seconds the melee lunge takes.
    #[serde(default = "default_lunge_time")]
    pub lunge_time: f32,
    /// Hitstop requested on a melee hit (0 = none).
    #[serde(default = "default_hitstop")]
    pub hitstop: f32,
}

fn default_name() -> String {
    "Unnamed Weapon".to_string()
}

const fn default_damage() -> i32 {
    20
}

const fn default_fire_cooldown() -> f32 {
    0.25
}

const fn default_reload_time() -> f32 {
    1.4
}

const fn default_range() -> f32 {
    30.0
}

const fn default_clip_size() -> i32 {
    1
}

const fn default_impulse() -> f32 {
    6.0
}

const fn default_lunge_distance() -> f32 {
    1.2
}

const fn default_lunge_time() -> f32 {
    0.08
}

const fn default_hitstop() -> f32 {
    0.05
}

impl WeaponDefinition {
    /// Creates a definition with catalog defaults.
    #[must_use]
    pub fn new(id: WeaponId, kind: WeaponKind) -> Self {
        Self {
            id,
            name: default_name(),
            kind,
            damage: default_damage(),
            fire_cooldown: default_fire_cooldown(),
            reload_time: default_reload_time(),
            range: default_range(),
            uses_ammo: false,
            clip_size: default_clip_size(),
            impulse: default_impulse(),
            projectile: (kind == WeaponKind::Ranged).then(ProjectileParams::default),
            lunge_distance: default_lunge_distance(),
            lunge_time: default_lunge_time(),
            hitstop: default_hitstop(),
        }
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets damage per hit.
    #[must_use]
    pub fn with_damage(mut self, damage: i32) -> Self {
        self.damage = damage;
        self
    }

    /// Sets the fire cooldown.
    #[must_use]
    pub fn with_fire_cooldown(mut self, cooldown: f32) -> Self {
        self.fire_cooldown = cooldown;
        self
    }

    /// Sets the range.
    #[must_use]
    pub fn with_range(mut self, range: f32) -> Self {
        self.range = range;
        self
    }

    /// Enables ammo with the given clip size and reload time.
    #[must_use]
    pub fn with_ammo(mut self, clip_size: i32, reload_time: f32) -> Self {
        self.uses_ammo = true;
        self.clip_size = clip_size;
        self.reload_time = reload_time;
        self
    }

    /// Sets the knockback impulse.
    #[must_use]
    pub fn with_impulse(mut self, impulse: f32) -> Self {
        self.impulse = impulse;
        self
    }

    /// Sets projectile parameters.
    #[must_use]
    pub fn with_projectile(mut self, projectile: ProjectileParams) -> Self {
        self.projectile = Some(projectile);
        self
    }

    /// Validates the weapon definition.
    pub fn validate(&self) -> CatalogResult<()> {
        if !self.id.is_some() {
            return Err(CatalogError::Validation(format!(
                "Weapon {:?} uses the reserved id 0",
                self.name
            )));
        }

        if self.fire_cooldown < 0.0 || self.reload_time < 0.0 {
            return Err(CatalogError::Validation(format!(
                "Weapon {} has negative timing: cooldown {}, reload {}",
                self.id, self.fire_cooldown, self.reload_time
            )));
        }

        if self.range <= 0.0 && self.kind != WeaponKind::Utility {
            return Err(CatalogError::Validation(format!(
                "Weapon {} has non-positive range: {}",
                self.id, self.range
            )));
        }

        if self.clip_size < 0 {
            return Err(CatalogError::Validation(format!(
                "Weapon {} has negative clip size: {}",
                self.id, self.clip_size
            )));
        }

        if let Some(projectile) = &self.projectile {
            if projectile.speed <= 0.0 {
                return Err(CatalogError::Validation(format!(
                    "Weapon {} has invalid projectile speed: {}",
                    self.id, projectile.speed
                )));
            }
        }

        // Ranged weapons without projectile config load but cannot fire
        if self.kind == WeaponKind::Ranged && self.projectile.is_none() {
            warn!("Weapon {} is ranged but has no projectile config", self.id);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weapon_definition_validate() {
        let weapon = WeaponDefinition::new(WeaponId::new(1), WeaponKind::Hitscan)
            .with_name("Revolver")
            .with_ammo(6, 1.2);
        assert!(weapon.validate().is_ok());
    }

    #[test]
    fn test_weapon_definition_validate_reserved_id() {
        let weapon = WeaponDefinition::new(WeaponId::NONE, WeaponKind::Melee);
        assert!(matches!(
            weapon.validate(),
            Err(CatalogError::Validation(_))
        ));
    }

    #[test]
    fn test_weapon_definition_validate_negative_cooldown() {
        let weapon =
            WeaponDefinition::new(WeaponId::new(2), WeaponKind::Melee).with_fire_cooldown(-1.0);
        assert!(weapon.validate().is_err());
    }

    #[test]
    fn test_weapon_definition_defaults_from_toml() {
        let weapon: WeaponDefinition = toml::from_str(
            r#"
            id = 3
            name = "Crossbow"
            kind = "ranged"
            [projectile]
            radius = 0.1
            "#,
        )
        .expect("parse");

        assert_eq!(weapon.damage, 20);
        assert_eq!(weapon.fire_cooldown, 0.25);
        assert_eq!(weapon.impulse, 6.0);
        let projectile = weapon.projectile.expect("projectile");
        assert_eq!(projectile.speed, 26.0);
        assert_eq!(projectile.lifetime, 5.0);
    }
}
