//! # NightHunter Combat
//!
//! Combat resolution and ability execution for NightHunter.
//!
//! This crate is engine-agnostic: the host world is reached only through
//! the traits in [`host`], and everything advances on an explicit tick.
//! - Damage pipeline with ordered damage modifiers (shields)
//! - Impulse resolution (physics bodies or knockback receivers)
//! - Weapon catalog, per-combatant weapon controller and loadout
//! - Ability catalog with composable targeting, delivery and effect modules
//! - Per-combatant ability runner with cooldowns
//! - Combat world owning health, projectiles, decoys and the event bus
//! - A sphere-based reference scene for tools and tests

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod abilities;
pub mod catalog;
pub mod clock;
pub mod config;
pub mod events;
pub mod health;
pub mod host;
pub mod impulse;
pub mod modifiers;
pub mod motion;
pub mod scene;
pub mod weapons;
pub mod world;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::abilities::*;
    pub use crate::catalog::*;
    pub use crate::clock::*;
    pub use crate::config::*;
    pub use crate::events::*;
    pub use crate::health::*;
    pub use crate::host::*;
    pub use crate::impulse::*;
    pub use crate::modifiers::*;
    pub use crate::motion::*;
    pub use crate::scene::*;
    pub use crate::weapons::*;
    pub use crate::world::*;
}

pub use prelude::*;
