//! # NightHunter Common
//!
//! Common types, utilities, and shared abstractions for NightHunter.
//!
//! This crate provides foundational types used across the combat core and
//! the simulation binary:
//! - ID types (EntityId, ColliderHandle, WeaponId, AbilityId, ModifierHandle)
//! - Geometry types (Ray, RayHit, LayerMask) on top of `glam`
//! - Version information for catalog schemas
//! - Common error types
//! - Prelude for convenient imports

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod error;
pub mod geometry;
pub mod ids;
pub mod version;

pub use glam::Vec3;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::*;
    pub use crate::geometry::*;
    pub use crate::ids::*;
    pub use crate::version::*;
    pub use glam::Vec3;
}

pub use prelude::*;
