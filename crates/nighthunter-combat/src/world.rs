//! Combat world: combatants, knockback receivers, projectiles and decoys.
//!
//! The world owns every piece of combat state that is not private to a
//! single controller. Weapon controllers and ability runners hold a
//! `&mut CombatWorld` only for the duration of a call, so they can live in
//! whatever storage the game loop prefers.

use ahash::AHashMap;
use glam::Vec3;
use nighthunter_common::{ColliderHandle, EntityId, LayerMask, ModifierHandle, Ray, RayHit};
use tracing::debug;

use crate::clock::Clock;
use crate::config::CombatConfig;
use crate::events::{CombatEvent, EventBus};
use crate::health::{Combatant, DamageReport};
use crate::host::{collider_ancestry, entity_ancestry, CombatHost, SpawnRequest};
use crate::impulse::{apply_impulse, ImpulseOutcome, KnockbackReceiver};
use crate::modifiers::{CompletionCallback, DamageModifier};

/// Maximum owner-collider skips per projectile sweep.
const MAX_OWNER_SKIPS: usize = 4;

/// Launch parameters for a projectile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectileLaunch {
    /// Shooter (its colliders are ignored)
    pub owner: EntityId,
    /// Spawn position
    pub origin: Vec3,
    /// Unit travel direction
    pub direction: Vec3,
    /// Units per second
    pub speed: f32,
    /// Damage on hit
    pub damage: i32,
    /// Knockback magnitude on hit
    pub impulse: f32,
    /// Seconds before despawning without a hit
    pub lifetime: f32,
    /// Collision radius (0 = ray)
    pub radius: f32,
    /// Layers the projectile collides with
    pub mask: LayerMask,
}

/// A projectile in flight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projectile {
    /// Projectile entity
    pub entity: EntityId,
    /// Launch parameters
    pub launch: ProjectileLaunch,
    /// Current position
    pub position: Vec3,
    /// Seconds left before it expires
    pub remaining: f32,
}

#[derive(Debug, Clone, Copy)]
struct Decoy {
    entity: EntityId,
    expires_at: f32,
}

/// Shared combat state.
#[derive(Debug)]
pub struct CombatWorld {
    config: CombatConfig,
    combatants: AHashMap<EntityId, Combatant>,
    receivers: AHashMap<EntityId, KnockbackReceiver>,
    projectiles: Vec<Projectile>,
    decoys: Vec<Decoy>,
    pending_despawn: Vec<EntityId>,
    events: EventBus,
    now: f32,
}

impl Default for CombatWorld {
    fn default() -> Self {
        Self::new(CombatConfig::default())
    }
}

impl CombatWorld {
    /// Creates an empty world.
    #[must_use]
    pub fn new(config: CombatConfig) -> Self {
        let events = EventBus::new(config.event_capacity);
        Self {
            config,
            combatants: AHashMap::new(),
            receivers: AHashMap::new(),
            projectiles: Vec::new(),
            decoys: Vec::new(),
            pending_despawn: Vec::new(),
            events,
            now: 0.0,
        }
    }

    /// Tuning values.
    #[must_use]
    pub fn config(&self) -> &CombatConfig {
        &self.config
    }

    /// Event bus.
    #[must_use]
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Mutable event bus (for subscribing).
    pub fn events_mut(&mut self) -> &mut EventBus {
        &mut self.events
    }

    /// Current simulation time.
    #[must_use]
    pub fn now(&self) -> f32 {
        self.now
    }

    // ------------------------------------------------------------------------
    // Combatants
    // ------------------------------------------------------------------------

    /// Registers a combatant for `entity`.
    pub fn spawn_combatant(&mut self, entity: EntityId, max_hit_points: i32) {
        self.combatants
            .insert(entity, Combatant::new(max_hit_points));
    }

    /// Gives `entity` a knockback receiver using the configured drag and mass.
    pub fn add_knockback_receiver(&mut self, entity: EntityId) {
        self.receivers.insert(
            entity,
            KnockbackReceiver::new(self.config.knockback_drag, self.config.knockback_mass),
        );
    }

    /// Looks up a combatant.
    #[must_use]
    pub fn combatant(&self, entity: EntityId) -> Option<&Combatant> {
        self.combatants.get(&entity)
    }

    /// Looks up a knockback receiver.
    #[must_use]
    pub fn knockback(&self, entity: EntityId) -> Option<&KnockbackReceiver> {
        self.receivers.get(&entity)
    }

    /// Number of registered combatants (dead ones included until despawned).
    #[must_use]
    pub fn combatant_count(&self) -> usize {
        self.combatants.len()
    }

    /// Finds the combatant owning `collider`, searching its ancestry.
    pub fn find_combatant<H: CombatHost + ?Sized>(
        &self,
        host: &H,
        collider: ColliderHandle,
    ) -> Option<EntityId> {
        collider_ancestry(host, collider).find(|e| self.combatants.contains_key(e))
    }

    /// Finds the combatant that is `entity` or one of its ancestors.
    pub fn combatant_of<H: CombatHost + ?Sized>(
        &self,
        host: &H,
        entity: EntityId,
    ) -> Option<EntityId> {
        entity_ancestry(host, entity).find(|e| self.combatants.contains_key(e))
    }

    /// Runs `raw` damage through `entity`'s pipeline.
    ///
    /// Returns `None` if the entity is not a combatant.
    pub fn take_damage(&mut self, entity: EntityId, raw: i32) -> Option<DamageReport> {
        let report = self.combatants.get_mut(&entity)?.take_damage(raw, self.now);
        if report.ignored {
            return Some(report);
        }

        for handle in &report.expired {
            self.events.publish(CombatEvent::ModifierExpired {
                owner: entity,
                handle: *handle,
            });
        }
        self.events.publish(CombatEvent::Damaged {
            entity,
            raw,
            applied: report.applied,
            remaining: report.remaining,
        });
        if report.died {
            debug!("Combatant {} died", entity);
            self.events.publish(CombatEvent::Died { entity });
            self.pending_despawn.push(entity);
        }
        Some(report)
    }

    /// Damages whatever combatant owns `collider`.
    pub fn damage_collider<H: CombatHost + ?Sized>(
        &mut self,
        host: &H,
        collider: ColliderHandle,
        raw: i32,
    ) -> Option<DamageReport> {
        let entity = self.find_combatant(host, collider)?;
        self.take_damage(entity, raw)
    }

    /// Pushes the target behind `collider`.
    pub fn apply_impulse<H: CombatHost + ?Sized>(
        &mut self,
        host: &mut H,
        collider: ColliderHandle,
        direction: Vec3,
        magnitude: f32,
    ) -> ImpulseOutcome {
        apply_impulse(host, &mut self.receivers, collider, direction, magnitude)
    }

    /// Appends a modifier to `entity`'s chain.
    pub fn attach_modifier(
        &mut self,
        entity: EntityId,
        modifier: Box<dyn DamageModifier>,
    ) -> Option<ModifierHandle> {
        self.combatants
            .get_mut(&entity)
            .map(|c| c.attach_modifier(modifier))
    }

    /// Appends a modifier whose callback fires when the chain reaps it.
    pub fn attach_modifier_with_callback(
        &mut self,
        entity: EntityId,
        modifier: Box<dyn DamageModifier>,
        on_complete: CompletionCallback,
    ) -> Option<ModifierHandle> {
        self.combatants
            .get_mut(&entity)
            .map(|c| c.modifiers_mut().attach_with_callback(modifier, on_complete))
    }

    /// Removes a modifier from `entity`'s chain.
    pub fn detach_modifier(&mut self, entity: EntityId, handle: ModifierHandle) -> bool {
        self.combatants
            .get_mut(&entity)
            .is_some_and(|c| c.modifiers_mut().detach(handle))
    }

    // ------------------------------------------------------------------------
    // Spawned entities
    // ------------------------------------------------------------------------

    /// Spawns a projectile entity and starts tracking it.
    pub fn spawn_projectile<H: CombatHost + ?Sized>(
        &mut self,
        host: &mut H,
        launch: ProjectileLaunch,
    ) -> EntityId {
        let entity = host.spawn(SpawnRequest::Projectile {
            owner: launch.owner,
            position: launch.origin,
            radius: launch.radius,
        });
        self.projectiles.push(Projectile {
            entity,
            launch,
            position: launch.origin,
            remaining: launch.lifetime,
        });
        self.events.publish(CombatEvent::ProjectileSpawned {
            projectile: entity,
            owner: launch.owner,
        });
        entity
    }

    /// Projectiles in flight.
    #[must_use]
    pub fn projectiles(&self) -> &[Projectile] {
        &self.projectiles
    }

    /// Spawns a decoy that despawns after `lifetime` seconds.
    pub fn spawn_decoy<H: CombatHost + ?Sized>(
        &mut self,
        host: &mut H,
        owner: EntityId,
        position: Vec3,
        lifetime: f32,
    ) -> EntityId {
        let entity = host.spawn(SpawnRequest::Decoy { owner, position });
        let lifetime = lifetime.max(self.config.min_decoy_lifetime);
        self.decoys.push(Decoy {
            entity,
            expires_at: self.now + lifetime,
        });
        self.events
            .publish(CombatEvent::DecoySpawned { decoy: entity, position });
        entity
    }

    /// Number of live decoys.
    #[must_use]
    pub fn decoy_count(&self) -> usize {
        self.decoys.len()
    }

    // ------------------------------------------------------------------------
    // Tick
    // ------------------------------------------------------------------------

    /// Advances the world to the clock's current time.
    ///
    /// Order: modifier expiry, knockback, projectiles, decoys, despawns.
    pub fn tick<H: CombatHost + ?Sized>(&mut self, host: &mut H, clock: &dyn Clock) {
        self.now = clock.now();
        let dt = clock.delta_time();

        self.reap_modifiers();
        self.integrate_knockback(host, dt);
        self.step_projectiles(host, dt);
        self.expire_decoys(host);
        self.despawn_dead(host);
    }

    fn reap_modifiers(&mut self) {
        let now = self.now;
        for (&owner, combatant) in &mut self.combatants {
            for handle in combatant.modifiers_mut().reap(now) {
                self.events
                    .publish(CombatEvent::ModifierExpired { owner, handle });
            }
        }
    }

    fn integrate_knockback<H: CombatHost + ?Sized>(&mut self, host: &mut H, dt: f32) {
        for (&entity, receiver) in &mut self.receivers {
            let displacement = receiver.step(dt);
            if displacement != Vec3::ZERO {
                host.move_by(entity, displacement);
            }
        }
    }

    fn step_projectiles<H: CombatHost + ?Sized>(&mut self, host: &mut H, dt: f32) {
        let projectiles = std::mem::take(&mut self.projectiles);
        let mut alive = Vec::with_capacity(projectiles.len());

        for mut projectile in projectiles {
            let launch = projectile.launch;
            let travel = launch.speed * dt;

            if let Some(hit) = self.sweep_ignoring_owner(host, &projectile, travel) {
                self.damage_collider(host, hit.collider, launch.damage);
                self.apply_impulse(host, hit.collider, launch.direction, launch.impulse);
                self.events.publish(CombatEvent::Impact {
                    point: hit.point,
                    normal: hit.normal,
                    collider: hit.collider,
                });
                host.despawn(projectile.entity);
                continue;
            }

            projectile.position += launch.direction * travel;
            projectile.remaining -= dt;
            if projectile.remaining <= 0.0 {
                host.despawn(projectile.entity);
                continue;
            }
            host.move_to(projectile.entity, projectile.position);
            alive.push(projectile);
        }

        self.projectiles = alive;
    }

    fn sweep_ignoring_owner<H: CombatHost + ?Sized>(
        &self,
        host: &H,
        projectile: &Projectile,
        travel: f32,
    ) -> Option<RayHit> {
        let launch = &projectile.launch;
        let mut origin = projectile.position;
        let mut left = travel;

        for _ in 0..MAX_OWNER_SKIPS {
            if left <= 0.0 {
                return None;
            }
            let ray = Ray::new(origin, launch.direction);
            let hit = if launch.radius > 0.0 {
                host.sweep_cast(&ray, launch.radius, left, launch.mask)
            } else {
                host.raycast(&ray, left, launch.mask)
            }?;

            if !collider_ancestry(host, hit.collider).any(|e| e == launch.owner) {
                return Some(hit);
            }
            let skip = hit.distance + 0.01;
            origin = ray.point_at(skip);
            left -= skip;
        }
        None
    }

    fn expire_decoys<H: CombatHost + ?Sized>(&mut self, host: &mut H) {
        let now = self.now;
        let (expired, alive): (Vec<Decoy>, Vec<Decoy>) =
            self.decoys.drain(..).partition(|d| now >= d.expires_at);
        self.decoys = alive;

        for decoy in expired {
            host.despawn(decoy.entity);
            self.events
                .publish(CombatEvent::DecoyExpired { decoy: decoy.entity });
        }
    }

    fn despawn_dead<H: CombatHost + ?Sized>(&mut self, host: &mut H) {
        for entity in std::mem::take(&mut self.pending_despawn) {
            self.combatants.remove(&entity);
            self.receivers.remove(&entity);
            host.despawn(entity);
            self.events.publish(CombatEvent::Despawned { entity });
        }
    }
}
