//! Ability catalog data: module variants and ability specs.
//!
//! An ability is composed from one targeting module, one delivery module and
//! any number of effect modules. Modules are declared once in the catalog
//! under a name and referenced by that name from ability specs; the
//! [`super::AbilityRegistry`] resolves the names at load time.

use std::collections::BTreeMap;

use nighthunter_common::{AbilityId, LayerMask};
use serde::{Deserialize, Serialize};

use crate::modifiers::ShieldSpec;

/// Produces the targets a cast is delivered to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TargetingModule {
    /// Targets the caster.
    #[serde(rename = "self")]
    SelfTarget,
    /// Targets the point under the crosshair.
    AimPoint {
        /// Furthest point considered
        #[serde(default = "default_aim_range")]
        max_range: f32,
        /// Snap to the first surface hit instead of the far point
        #[serde(default = "default_true")]
        snap_to_hit: bool,
        /// Mask used instead of the caster's hit mask
        #[serde(default)]
        mask: Option<LayerMask>,
    },
}

/// Carries a cast from its targets to its impacts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DeliveryModule {
    /// Every target is an impact, immediately.
    Instant,
    /// Moves the caster along the aim direction.
    Dash {
        /// Distance travelled
        #[serde(default = "default_dash_distance")]
        distance: f32,
        /// Seconds the dash takes
        #[serde(default = "default_dash_duration")]
        duration: f32,
        /// Keep the dash horizontal
        #[serde(default = "default_true")]
        flatten: bool,
    },
    /// Area pulses around a center.
    Explosion {
        /// Blast radius
        #[serde(default = "default_blast_radius")]
        radius: f32,
        /// Reject colliders hidden from the center
        #[serde(default)]
        line_of_sight: bool,
        /// Offset from the center before line-of-sight rays start
        #[serde(default)]
        los_padding: Option<f32>,
        /// Delay before the first pulse
        #[serde(default)]
        fuse: f32,
        /// Number of pulses (at least one)
        #[serde(default = "default_pulses")]
        pulses: u32,
        /// Seconds between pulses
        #[serde(default = "default_pulse_interval")]
        pulse_interval: f32,
    },
}

/// Reacts to a cast starting, each impact, and the cast ending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EffectModule {
    /// Attaches a shield to the caster on cast start.
    Shield(ShieldSpec),
    /// Spawns a timed decoy at the caster on cast start.
    SpawnDecoy {
        /// Seconds before the decoy despawns
        #[serde(default = "default_decoy_lifetime")]
        lifetime: f32,
    },
    /// Damages and pushes every struck collider.
    Damage {
        /// Damage per impact
        #[serde(default = "default_effect_damage")]
        damage: i32,
        /// Push magnitude away from the caster
        #[serde(default = "default_effect_impulse")]
        impulse: f32,
    },
}

const fn default_true() -> bool {
    true
}

const fn default_aim_range() -> f32 {
    30.0
}

const fn default_dash_distance() -> f32 {
    6.0
}

const fn default_dash_duration() -> f32 {
    0.15
}

const fn default_blast_radius() -> f32 {
    5.0
}

const fn default_pulses() -> u32 {
    1
}

const fn default_pulse_interval() -> f32 {
    0.25
}

const fn default_decoy_lifetime() -> f32 {
    3.0
}

const fn default_effect_damage() -> i32 {
    40
}

const fn default_effect_impulse() -> f32 {
    6.0
}

/// Ability spec as written in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbilityDefinition {
    /// Unique ability identifier.
    pub id: AbilityId,
    /// Display name.
    #[serde(default = "default_ability_name")]
    pub name: String,
    /// Seconds before the ability can be cast again.
    #[serde(default = "default_cooldown")]
    pub cooldown: f32,
    /// Name of the targeting module.
    #[serde(default)]
    pub targeting: Option<String>,
    /// Name of the delivery module.
    #[serde(default)]
    pub delivery: Option<String>,
    /// Names of the effect modules, in invocation order.
    #[serde(default)]
    pub effects: Vec<String>,
}

fn default_ability_name() -> String {
    "New Skill".to_string()
}

const fn default_cooldown() -> f32 {
    8.0
}

impl AbilityDefinition {
    /// Creates a spec with no modules.
    #[must_use]
    pub fn new(id: AbilityId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            cooldown: default_cooldown(),
            targeting: None,
            delivery: None,
            effects: Vec::new(),
        }
    }

    /// Sets the cooldown.
    #[must_use]
    pub fn with_cooldown(mut self, cooldown: f32) -> Self {
        self.cooldown = cooldown;
        self
    }

    /// Sets the targeting module reference.
    #[must_use]
    pub fn with_targeting(mut self, name: impl Into<String>) -> Self {
        self.targeting = Some(name.into());
        self
    }

    /// Sets the delivery module reference.
    #[must_use]
    pub fn with_delivery(mut self, name: impl Into<String>) -> Self {
        self.delivery = Some(name.into());
        self
    }

    /// Appends an effect module reference.
    #[must_use]
    pub fn with_effect(mut self, name: impl Into<String>) -> Self {
        self.effects.push(name.into());
        self
    }
}

/// Everything an ability catalog file declares.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AbilityCatalog {
    /// Targeting modules by name.
    #[serde(default)]
    pub targeting: BTreeMap<String, TargetingModule>,
    /// Delivery modules by name.
    #[serde(default)]
    pub delivery: BTreeMap<String, DeliveryModule>,
    /// Effect modules by name.
    #[serde(default)]
    pub effects: BTreeMap<String, EffectModule>,
    /// Ability specs, in load order.
    #[serde(default)]
    pub abilities: Vec<AbilityDefinition>,
}

impl AbilityCatalog {
    /// Declares a targeting module.
    #[must_use]
    pub fn with_targeting(mut self, name: impl Into<String>, module: TargetingModule) -> Self {
        self.targeting.insert(name.into(), module);
        self
    }

    /// Declares a delivery module.
    #[must_use]
    pub fn with_delivery(mut self, name: impl Into<String>, module: DeliveryModule) -> Self {
        self.delivery.insert(name.into(), module);
        self
    }

    /// Declares an effect module.
    #[must_use]
    pub fn with_effect(mut self, name: impl Into<String>, module: EffectModule) -> Self {
        self.effects.insert(name.into(), module);
        self
    }

    /// Adds an ability spec.
    #[must_use]
    pub fn with_ability(mut self, ability: AbilityDefinition) -> Self {
        self.abilities.push(ability);
        self
    }

    /// Merges another catalog into this one. Module names already declared
    /// keep their first definition.
    pub fn merge(&mut self, other: AbilityCatalog) {
        for (name, module) in other.targeting {
            self.targeting.entry(name).or_insert(module);
        }
        for (name, module) in other.delivery {
            self.delivery.entry(name).or_insert(module);
        }
        for (name, module) in other.effects {
            self.effects.entry(name).or_insert(module);
        }
        self.abilities.extend(other.abilities);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_from_toml() {
        let catalog: AbilityCatalog = toml::from_str(
            r#"
            [targeting.aim]
            kind = "aim_point"
            max_range = 40.0

            [targeting.me]
            kind = "self"

            [delivery.blast]
            kind = "explosion"
            radius = 5.0
            pulses = 3

            [effects.ward]
            kind = "shield"
            absorb = 50
            reduce_percent = 0.3

            [effects.hurt]
            kind = "damage"

            [[abilities]]
            id = 1
            name = "Frag"
            targeting = "aim"
            delivery = "blast"
            effects = ["hurt"]
            "#,
        )
        .expect("parse");

        assert_eq!(
            catalog.targeting["aim"],
            TargetingModule::AimPoint {
                max_range: 40.0,
                snap_to_hit: true,
                mask: None,
            }
        );
        assert_eq!(catalog.targeting["me"], TargetingModule::SelfTarget);
        assert!(matches!(
            catalog.delivery["blast"],
            DeliveryModule::Explosion {
                pulses: 3,
                pulse_interval,
                line_of_sight: false,
                ..
            } if pulse_interval == 0.25
        ));
        assert_eq!(
            catalog.effects["ward"],
            EffectModule::Shield(ShieldSpec {
                absorb: 50,
                reduce_percent: 0.3,
                max_hits: 0,
                duration: 5.0,
            })
        );
        assert_eq!(
            catalog.effects["hurt"],
            EffectModule::Damage {
                damage: 40,
                impulse: 6.0
            }
        );
        assert_eq!(catalog.abilities[0].cooldown, 8.0);
    }

    #[test]
    fn test_merge_keeps_first_module() {
        let mut a = AbilityCatalog::default().with_delivery("go", DeliveryModule::Instant);
        let b = AbilityCatalog::default()
            .with_delivery(
                "go",
                DeliveryModule::Dash {
                    distance: 1.0,
                    duration: 1.0,
                    flatten: true,
                },
            )
            .with_ability(AbilityDefinition::new(AbilityId::new(4), "Blink"));
        a.merge(b);
        assert_eq!(a.delivery["go"], DeliveryModule::Instant);
        assert_eq!(a.abilities.len(), 1);
    }
}
