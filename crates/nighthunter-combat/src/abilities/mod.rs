//! Abilities: composable targeting, delivery and effect modules driven by a
//! per-combatant runner.

mod delivery;
mod effects;
mod registry;
mod runner;
mod spec;
mod targeting;

use glam::Vec3;
use nighthunter_common::{ColliderHandle, EntityId, LayerMask, Ray};

pub use registry::{AbilityRegistry, Composition, ResolvedAbility};
pub use runner::{AbilityRunner, CastOutcome, ABILITY_SLOTS};
pub use spec::{AbilityCatalog, AbilityDefinition, DeliveryModule, EffectModule, TargetingModule};

/// Everything a cast needs, captured once when the cast starts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AbilityContext {
    /// Casting combatant
    pub caster: EntityId,
    /// Muzzle or hand position (caster position when there is none)
    pub origin: Vec3,
    /// Center-of-frame aim ray
    pub aim_ray: Ray,
    /// Layers that count as valid hits
    pub hit_mask: LayerMask,
}

/// Something a cast is delivered to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Target {
    /// An entity (the caster for self-targeted abilities)
    Entity(EntityId),
    /// A world-space point
    Point(Vec3),
    /// A struck collider
    Collider(ColliderHandle),
}
