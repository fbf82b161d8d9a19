//! Reference host built from analytic sphere colliders.
//!
//! `SphereScene` implements every host trait with exact ray/sphere math. It
//! backs the headless simulator and the unit tests; a game engine would
//! implement the same traits on top of its own physics world instead.

use ahash::AHashMap;
use glam::Vec3;
use nighthunter_common::{ColliderHandle, EntityId, LayerMask, Ray, RayHit};

use crate::host::{
    EntityLifecycle, EntityLookup, PhysicsBodies, SpatialQuery, SpawnRequest, Transforms,
};

/// Shape and flags of a sphere collider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereCollider {
    /// Radius
    pub radius: f32,
    /// Offset from the owning entity's position
    pub offset: Vec3,
    /// Layer the collider lives on (single bit)
    pub layer: LayerMask,
    /// Whether a dynamic rigid body is attached
    pub dynamic: bool,
    /// Body mass (dynamic bodies only)
    pub mass: f32,
}

impl SphereCollider {
    /// Creates a static sphere on layer 0.
    #[must_use]
    pub fn new(radius: f32) -> Self {
        Self {
            radius: radius.max(0.0),
            offset: Vec3::ZERO,
            layer: LayerMask::layer(0),
            dynamic: false,
            mass: 1.0,
        }
    }

    /// Sets the offset from the owner.
    #[must_use]
    pub fn with_offset(mut self, offset: Vec3) -> Self {
        self.offset = offset;
        self
    }

    /// Sets the layer.
    #[must_use]
    pub fn with_layer(mut self, layer: LayerMask) -> Self {
        self.layer = layer;
        self
    }

    /// Attaches a dynamic body of the given mass.
    #[must_use]
    pub fn dynamic(mut self, mass: f32) -> Self {
        self.dynamic = true;
        self.mass = mass.max(0.01);
        self
    }
}

#[derive(Debug, Clone)]
struct EntityRecord {
    /// Position relative to the parent (world position for roots)
    local: Vec3,
    parent: Option<EntityId>,
    primary: Option<ColliderHandle>,
}

#[derive(Debug, Clone)]
struct ColliderRecord {
    owner: EntityId,
    shape: SphereCollider,
    velocity: Vec3,
    received: Vec3,
}

/// Linear damping applied to dynamic bodies per second.
const BODY_DAMPING: f32 = 2.0;

/// Analytic sphere world implementing every host trait.
#[derive(Debug, Default)]
pub struct SphereScene {
    entities: AHashMap<EntityId, EntityRecord>,
    colliders: AHashMap<ColliderHandle, ColliderRecord>,
}

impl SphereScene {
    /// Creates an empty scene.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns a root entity at a world position.
    pub fn spawn_at(&mut self, position: Vec3) -> EntityId {
        let id = EntityId::new();
        self.entities.insert(
            id,
            EntityRecord {
                local: position,
                parent: None,
                primary: None,
            },
        );
        id
    }

    /// Spawns an entity parented to `parent` at a local offset.
    pub fn spawn_child(&mut self, parent: EntityId, offset: Vec3) -> EntityId {
        let id = EntityId::new();
        let parent = self.entities.contains_key(&parent).then_some(parent);
        self.entities.insert(
            id,
            EntityRecord {
                local: offset,
                parent,
                primary: None,
            },
        );
        id
    }

    /// Attaches a sphere collider to an entity.
    ///
    /// The first collider attached becomes the entity's primary collider.
    pub fn attach_sphere(&mut self, entity: EntityId, shape: SphereCollider) -> ColliderHandle {
        let handle = ColliderHandle::new();
        if let Some(record) = self.entities.get_mut(&entity) {
            record.primary.get_or_insert(handle);
        }
        self.colliders.insert(
            handle,
            ColliderRecord {
                owner: entity,
                shape,
                velocity: Vec3::ZERO,
                received: Vec3::ZERO,
            },
        );
        handle
    }

    /// Returns true if the entity exists.
    #[must_use]
    pub fn contains(&self, entity: EntityId) -> bool {
        self.entities.contains_key(&entity)
    }

    /// Number of live entities.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Total impulse a dynamic body has received.
    #[must_use]
    pub fn received_impulse(&self, collider: ColliderHandle) -> Vec3 {
        self.colliders
            .get(&collider)
            .map_or(Vec3::ZERO, |c| c.received)
    }

    /// Current velocity of a dynamic body.
    #[must_use]
    pub fn body_velocity(&self, collider: ColliderHandle) -> Vec3 {
        self.colliders
            .get(&collider)
            .map_or(Vec3::ZERO, |c| c.velocity)
    }

    /// Integrates dynamic bodies by `dt` seconds.
    pub fn step(&mut self, dt: f32) {
        let mut moves = Vec::new();
        for record in self.colliders.values_mut() {
            if !record.shape.dynamic || record.velocity.length_squared() <= f32::EPSILON {
                continue;
            }
            moves.push((record.owner, record.velocity * dt));
            record.velocity *= (1.0 - BODY_DAMPING * dt).max(0.0);
        }
        for (owner, delta) in moves {
            self.move_by(owner, delta);
        }
    }

    fn world_position(&self, entity: EntityId) -> Option<Vec3> {
        let mut record = self.entities.get(&entity)?;
        let mut position = record.local;
        let mut depth = 0;
        while let Some(parent) = record.parent {
            depth += 1;
            if depth > 64 {
                break;
            }
            match self.entities.get(&parent) {
                Some(next) => {
                    position += next.local;
                    record = next;
                },
                None => break,
            }
        }
        Some(position)
    }

    fn center_of(&self, record: &ColliderRecord) -> Option<Vec3> {
        self.world_position(record.owner)
            .map(|p| p + record.shape.offset)
    }

    /// Nearest sphere hit along a ray, with every sphere inflated by `inflate`.
    fn cast(&self, ray: &Ray, inflate: f32, max_distance: f32, mask: LayerMask) -> Option<RayHit> {
        if ray.direction == Vec3::ZERO || max_distance <= 0.0 {
            return None;
        }

        let mut best: Option<RayHit> = None;
        for (&handle, record) in &self.colliders {
            if !mask.accepts(record.shape.layer) {
                continue;
            }
            let Some(center) = self.center_of(record) else {
                continue;
            };
            let radius = record.shape.radius + inflate;
            let Some(distance) = ray_sphere(ray, center, radius) else {
                continue;
            };
            if distance > max_distance {
                continue;
            }

            let closer = match &best {
                Some(hit) => {
                    distance < hit.distance
                        || (distance == hit.distance && handle < hit.collider)
                },
                None => true,
            };
            if closer {
                let swept_center = ray.point_at(distance);
                let normal = (swept_center - center).normalize_or_zero();
                best = Some(RayHit {
                    point: center + normal * record.shape.radius,
                    normal,
                    collider: handle,
                    distance,
                });
            }
        }
        best
    }

    fn descendants_of(&self, root: EntityId) -> Vec<EntityId> {
        let mut out = vec![root];
        let mut i = 0;
        while i < out.len() {
            let current = out[i];
            out.extend(
                self.entities
                    .iter()
                    .filter(|(_, r)| r.parent == Some(current))
                    .map(|(&id, _)| id),
            );
            i += 1;
        }
        out
    }
}

/// Entry distance of a ray into a sphere.
///
/// Spheres containing the ray origin are not reported.
fn ray_sphere(ray: &Ray, center: Vec3, radius: f32) -> Option<f32> {
    let m = ray.origin - center;
    let b = m.dot(ray.direction);
    let c = m.length_squared() - radius * radius;
    if c <= 0.0 {
        return None;
    }
    if b > 0.0 {
        return None;
    }
    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }
    Some(-b - discriminant.sqrt())
}

impl SpatialQuery for SphereScene {
    fn raycast(&self, ray: &Ray, max_distance: f32, mask: LayerMask) -> Option<RayHit> {
        self.cast(ray, 0.0, max_distance, mask)
    }

    fn sweep_cast(
        &self,
        ray: &Ray,
        radius: f32,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<RayHit> {
        self.cast(ray, radius.max(0.0), max_distance, mask)
    }

    fn overlap_sphere(&self, center: Vec3, radius: f32, mask: LayerMask) -> Vec<ColliderHandle> {
        let mut hits: Vec<ColliderHandle> = self
            .colliders
            .iter()
            .filter(|(_, record)| mask.accepts(record.shape.layer))
            .filter(|(_, record)| {
                self.center_of(record).is_some_and(|c| {
                    c.distance(center) <= radius + record.shape.radius
                })
            })
            .map(|(&handle, _)| handle)
            .collect();
        hits.sort();
        hits
    }

    fn collider_center(&self, collider: ColliderHandle) -> Option<Vec3> {
        self.colliders
            .get(&collider)
            .and_then(|record| self.center_of(record))
    }
}

impl EntityLookup for SphereScene {
    fn owner_of(&self, collider: ColliderHandle) -> Option<EntityId> {
        self.colliders.get(&collider).map(|c| c.owner)
    }

    fn parent_of(&self, entity: EntityId) -> Option<EntityId> {
        self.entities.get(&entity).and_then(|e| e.parent)
    }

    fn primary_collider(&self, entity: EntityId) -> Option<ColliderHandle> {
        self.entities.get(&entity).and_then(|e| e.primary)
    }
}

impl Transforms for SphereScene {
    fn position(&self, entity: EntityId) -> Option<Vec3> {
        self.world_position(entity)
    }

    fn move_by(&mut self, entity: EntityId, delta: Vec3) {
        if let Some(record) = self.entities.get_mut(&entity) {
            record.local += delta;
        }
    }

    fn move_to(&mut self, entity: EntityId, target: Vec3) {
        let parent_position = self
            .parent_of(entity)
            .and_then(|p| self.world_position(p))
            .unwrap_or(Vec3::ZERO);
        if let Some(record) = self.entities.get_mut(&entity) {
            record.local = target - parent_position;
        }
    }
}

impl PhysicsBodies for SphereScene {
    fn apply_body_impulse(&mut self, collider: ColliderHandle, impulse: Vec3) -> bool {
        match self.colliders.get_mut(&collider) {
            Some(record) if record.shape.dynamic => {
                record.velocity += impulse / record.shape.mass;
                record.received += impulse;
                true
            },
            _ => false,
        }
    }
}

impl EntityLifecycle for SphereScene {
    fn spawn(&mut self, request: SpawnRequest) -> EntityId {
        match request {
            SpawnRequest::Projectile { position, .. } | SpawnRequest::Decoy { position, .. } => {
                self.spawn_at(position)
            },
        }
    }

    fn despawn(&mut self, entity: EntityId) {
        for id in self.descendants_of(entity) {
            self.entities.remove(&id);
            self.colliders.retain(|_, c| c.owner != id);
        }
    }
}
