//! Weapons: catalog definitions, the registry, and per-combatant control.

mod controller;
mod definition;
mod loadout;
mod projectile;
mod registry;

pub use controller::{AmmoState, FireOutcome, ReloadOutcome, ShotResult, WeaponController, WeaponState};
pub use definition::{ProjectileParams, WeaponDefinition, WeaponKind};
pub use loadout::WeaponLoadout;
pub use registry::WeaponRegistry;
