//! Host-environment interfaces.
//!
//! The combat core does not simulate physics or own transforms. The host
//! (game engine, test scene, headless simulator) answers spatial queries,
//! maps colliders to entities, moves character controllers, applies impulses
//! to dynamic bodies and spawns or removes entities. Each concern is a
//! separate trait so a host can implement them on whatever types it already
//! has; [`CombatHost`] bundles them for call sites that need all of them.

use glam::Vec3;
use nighthunter_common::{ColliderHandle, EntityId, LayerMask, Ray, RayHit};

/// Spatial query provider.
pub trait SpatialQuery {
    /// Casts a ray and returns the nearest hit within `max_distance`.
    fn raycast(&self, ray: &Ray, max_distance: f32, mask: LayerMask) -> Option<RayHit>;

    /// Sweeps a sphere of `radius` along a ray and returns the nearest hit.
    fn sweep_cast(
        &self,
        ray: &Ray,
        radius: f32,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<RayHit>;

    /// Returns every collider overlapping the sphere.
    fn overlap_sphere(&self, center: Vec3, radius: f32, mask: LayerMask) -> Vec<ColliderHandle>;

    /// World-space center of a collider's bounds.
    fn collider_center(&self, collider: ColliderHandle) -> Option<Vec3>;
}

/// Collider-to-entity mapping and entity hierarchy.
pub trait EntityLookup {
    /// Entity a collider is attached to.
    fn owner_of(&self, collider: ColliderHandle) -> Option<EntityId>;

    /// Parent of an entity, if it has one.
    fn parent_of(&self, entity: EntityId) -> Option<EntityId>;

    /// Main collider of an entity (used when a target is an entity, not a hit).
    fn primary_collider(&self, entity: EntityId) -> Option<ColliderHandle>;
}

/// Entity transforms and character-controller movement.
pub trait Transforms {
    /// World position of an entity.
    fn position(&self, entity: EntityId) -> Option<Vec3>;

    /// Moves an entity by `delta` (character-controller style move).
    fn move_by(&mut self, entity: EntityId, delta: Vec3);

    /// Moves an entity to an absolute position.
    fn move_to(&mut self, entity: EntityId, target: Vec3) {
        if let Some(current) = self.position(entity) {
            self.move_by(entity, target - current);
        }
    }
}

/// Dynamic physics bodies.
pub trait PhysicsBodies {
    /// Applies an instantaneous impulse to the dynamic body attached to
    /// `collider`. Returns false when the collider has no dynamic body.
    fn apply_body_impulse(&mut self, collider: ColliderHandle, impulse: Vec3) -> bool;
}

/// Entity the core asks the host to create.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpawnRequest {
    /// A moving projectile.
    Projectile {
        /// Shooter
        owner: EntityId,
        /// Spawn position (muzzle)
        position: Vec3,
        /// Collision radius (0 for a ray)
        radius: f32,
    },
    /// A timed decoy.
    Decoy {
        /// Caster that created it
        owner: EntityId,
        /// Spawn position
        position: Vec3,
    },
}

/// Entity creation and removal.
pub trait EntityLifecycle {
    /// Creates an entity and returns its id.
    fn spawn(&mut self, request: SpawnRequest) -> EntityId;

    /// Removes an entity (and anything parented to it).
    fn despawn(&mut self, entity: EntityId);
}

/// Everything the combat core needs from its host.
pub trait CombatHost:
    SpatialQuery + EntityLookup + Transforms + PhysicsBodies + EntityLifecycle
{
}

impl<T> CombatHost for T where
    T: SpatialQuery + EntityLookup + Transforms + PhysicsBodies + EntityLifecycle
{
}

/// Maximum hierarchy depth walked before giving up (guards against cycles).
const MAX_ANCESTRY_DEPTH: usize = 64;

/// Iterator over an entity and its ancestors, nearest first.
pub struct Ancestry<'a, L: EntityLookup + ?Sized> {
    lookup: &'a L,
    next: Option<EntityId>,
    depth: usize,
}

impl<L: EntityLookup + ?Sized> Iterator for Ancestry<'_, L> {
    type Item = EntityId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.depth += 1;
        self.next = if self.depth >= MAX_ANCESTRY_DEPTH {
            None
        } else {
            self.lookup.parent_of(current)
        };
        Some(current)
    }
}

/// Walks from an entity up through its ancestors.
pub fn entity_ancestry<L: EntityLookup + ?Sized>(lookup: &L, entity: EntityId) -> Ancestry<'_, L> {
    Ancestry {
        lookup,
        next: Some(entity),
        depth: 0,
    }
}

/// Walks from a collider's owner up through its ancestors.
pub fn collider_ancestry<L: EntityLookup + ?Sized>(
    lookup: &L,
    collider: ColliderHandle,
) -> Ancestry<'_, L> {
    Ancestry {
        lookup,
        next: lookup.owner_of(collider),
        depth: 0,
    }
}
