//! Per-combatant weapon state machine.
//!
//! A controller drives fire, reload and ammo for one owner:
//! - Fire gating (cooldown, ammo, reload in progress)
//! - Aim resolution from a center-of-frame ray
//! - Three resolution strategies (projectile, hitscan ray, melee sweep)
//! - Timed reloads and melee lunges advanced by `tick`

use std::sync::Arc;

use ahash::{AHashMap, AHashSet};
use glam::Vec3;
use nighthunter_common::{flatten, ColliderHandle, EntityId, LayerMask, Ray, WeaponId};
use tracing::{debug, warn};

use super::definition::{WeaponDefinition, WeaponKind};
use super::registry::WeaponRegistry;
use crate::events::CombatEvent;
use crate::host::CombatHost;
use crate::motion::LinearMove;
use crate::world::{CombatWorld, ProjectileLaunch};

/// Clip and reserve of one weapon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AmmoState {
    /// Rounds in the clip
    pub clip: i32,
    /// Rounds in reserve
    pub reserve: i32,
}

/// Controller state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WeaponState {
    /// Ready to fire
    Idle,
    /// Reloading `weapon`; completes when `remaining` reaches zero
    Reloading {
        /// Weapon being reloaded
        weapon: WeaponId,
        /// Seconds left
        remaining: f32,
    },
}

/// What a shot resolved to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShotResult {
    /// A projectile was launched
    Projectile(EntityId),
    /// The ray or sweep struck a collider
    Hit {
        /// Collider struck
        collider: ColliderHandle,
        /// Contact point
        point: Vec3,
    },
    /// Nothing was struck
    Miss,
    /// Utility weapon: nothing to resolve
    Nothing,
}

/// Result of a fire request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FireOutcome {
    /// A shot was fired
    Fired(ShotResult),
    /// Clip empty; a reload was started instead
    ReloadTriggered,
    /// Clip and reserve both empty
    OutOfAmmo,
    /// Fire cooldown has not elapsed
    CoolingDown,
    /// A reload is in progress
    Reloading,
    /// No active weapon definition
    NoWeapon,
    /// Fire point has no position
    NoFirePoint,
    /// Weapon definition cannot fire (logged)
    Misconfigured,
}

/// Result of a reload request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReloadOutcome {
    /// Reload started and takes `duration` seconds
    Started {
        /// Seconds until the clip is refilled
        duration: f32,
    },
    /// Already reloading
    AlreadyReloading,
    /// Clip is full
    ClipFull,
    /// Reserve is empty
    NoReserve,
    /// Weapon does not use ammo or does not exist
    NotApplicable,
}

/// Weapon driver for one combatant.
#[derive(Debug)]
pub struct WeaponController {
    owner: EntityId,
    fire_point: Option<EntityId>,
    hit_mask: LayerMask,
    registry: Arc<WeaponRegistry>,
    active: WeaponId,
    owned: AHashSet<WeaponId>,
    ammo: AHashMap<WeaponId, AmmoState>,
    last_fire: Option<f32>,
    state: WeaponState,
    lunge: Option<LinearMove>,
}

impl WeaponController {
    /// Creates a controller for `owner`, firing from the owner's position.
    #[must_use]
    pub fn new(owner: EntityId, registry: Arc<WeaponRegistry>) -> Self {
        Self {
            owner,
            fire_point: Some(owner),
            hit_mask: LayerMask::ALL,
            registry,
            active: WeaponId::NONE,
            owned: AHashSet::new(),
            ammo: AHashMap::new(),
            last_fire: None,
            state: WeaponState::Idle,
            lunge: None,
        }
    }

    /// Fires from `entity`'s position (muzzle or hand) instead of the owner.
    #[must_use]
    pub fn with_fire_point(mut self, entity: EntityId) -> Self {
        self.fire_point = Some(entity);
        self
    }

    /// Restricts aim and shot queries to `mask`.
    #[must_use]
    pub fn with_hit_mask(mut self, mask: LayerMask) -> Self {
        self.hit_mask = mask;
        self
    }

    /// Sets or clears the fire point.
    pub fn set_fire_point(&mut self, fire_point: Option<EntityId>) {
        self.fire_point = fire_point;
    }

    /// Owner entity.
    #[must_use]
    pub fn owner(&self) -> EntityId {
        self.owner
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> WeaponState {
        self.state
    }

    /// Returns true while reloading.
    #[must_use]
    pub fn is_reloading(&self) -> bool {
        matches!(self.state, WeaponState::Reloading { .. })
    }

    /// Active weapon id.
    #[must_use]
    pub fn active_weapon(&self) -> WeaponId {
        self.active
    }

    /// Active weapon definition.
    #[must_use]
    pub fn active_definition(&self) -> Option<&WeaponDefinition> {
        self.registry.get(self.active)
    }

    /// Ammo of the active weapon.
    #[must_use]
    pub fn ammo(&self) -> Option<AmmoState> {
        self.ammo.get(&self.active).copied()
    }

    /// Ammo of any weapon.
    #[must_use]
    pub fn ammo_of(&self, id: WeaponId) -> Option<AmmoState> {
        self.ammo.get(&id).copied()
    }

    /// Returns true if the weapon is owned.
    #[must_use]
    pub fn has_weapon(&self, id: WeaponId) -> bool {
        self.owned.contains(&id)
    }

    // ------------------------------------------------------------------------
    // Inventory
    // ------------------------------------------------------------------------

    /// Makes `id` the active weapon and cancels any reload.
    pub fn equip(&mut self, world: &CombatWorld, id: WeaponId) {
        self.active = id;
        self.ensure_ammo(world, id);
        self.state = WeaponState::Idle;
        debug!("{} equipped {}", self.owner, id);
    }

    /// Adds a weapon to the owned set, optionally granting reserve ammo and
    /// equipping it.
    pub fn add_weapon(&mut self, world: &CombatWorld, id: WeaponId, reserve: i32, auto_equip: bool) {
        if !id.is_some() {
            return;
        }
        self.owned.insert(id);
        self.ensure_ammo(world, id);
        if reserve > 0 {
            self.add_reserve(world, id, reserve);
        }
        if auto_equip {
            self.equip(world, id);
        }
    }

    /// Adds reserve ammo to an ammo-using weapon.
    pub fn add_reserve(&mut self, world: &CombatWorld, id: WeaponId, amount: i32) {
        if amount <= 0 {
            return;
        }
        let Some(def) = self.registry.get(id) else {
            return;
        };
        if !def.uses_ammo {
            return;
        }
        self.ensure_ammo(world, id);
        if let Some(state) = self.ammo.get_mut(&id) {
            state.reserve = state.reserve.saturating_add(amount);
            let state = *state;
            self.publish_ammo(world, id, state);
        }
    }

    fn ensure_ammo(&mut self, world: &CombatWorld, id: WeaponId) {
        if self.ammo.contains_key(&id) {
            return;
        }
        let Some(def) = self.registry.get(id) else {
            return;
        };
        let state = if def.uses_ammo {
            AmmoState {
                clip: def.clip_size.max(0),
                reserve: world.config().default_reserve.max(0),
            }
        } else {
            AmmoState::default()
        };
        self.ammo.insert(id, state);
    }

    fn publish_ammo(&self, world: &CombatWorld, weapon: WeaponId, state: AmmoState) {
        world.events().publish(CombatEvent::AmmoChanged {
            owner: self.owner,
            weapon,
            clip: state.clip,
            reserve: state.reserve,
        });
    }

    // ------------------------------------------------------------------------
    // Fire
    // ------------------------------------------------------------------------

    /// Handles a fire request along the center-of-frame `aim` ray.
    pub fn fire<H: CombatHost + ?Sized>(
        &mut self,
        world: &mut CombatWorld,
        host: &mut H,
        aim: &Ray,
    ) -> FireOutcome {
        let registry = Arc::clone(&self.registry);
        let Some(def) = registry.get(self.active) else {
            return FireOutcome::NoWeapon;
        };
        if self.is_reloading() {
            return FireOutcome::Reloading;
        }
        let Some(origin) = self.fire_point.and_then(|e| host.position(e)) else {
            return FireOutcome::NoFirePoint;
        };

        let now = world.now();
        if let Some(last) = self.last_fire {
            if now - last < def.fire_cooldown.max(0.0) {
                return FireOutcome::CoolingDown;
            }
        }

        if def.kind == WeaponKind::Ranged && def.projectile.is_none() {
            warn!("Weapon {} ({}) has no projectile config", def.id, def.name);
            return FireOutcome::Misconfigured;
        }

        if def.uses_ammo {
            self.ensure_ammo(world, def.id);
            let state = self.ammo.get(&def.id).copied().unwrap_or_default();
            if state.clip <= 0 {
                return match self.start_reload(world, def) {
                    ReloadOutcome::Started { .. } => FireOutcome::ReloadTriggered,
                    _ => FireOutcome::OutOfAmmo,
                };
            }
            let state = AmmoState {
                clip: state.clip - 1,
                ..state
            };
            self.ammo.insert(def.id, state);
            self.publish_ammo(world, def.id, state);
        }

        self.last_fire = Some(now);

        let range = if def.range > 0.0 {
            def.range
        } else {
            world.config().fallback_aim_range
        };
        let aim_range = range.max(0.01);
        let aim_point = host
            .raycast(aim, aim_range, self.hit_mask)
            .map_or_else(|| aim.point_at(aim_range), |hit| hit.point);
        let mut direction = (aim_point - origin).normalize_or_zero();
        if direction == Vec3::ZERO {
            direction = aim.direction;
        }

        let result = match def.kind {
            WeaponKind::Ranged => {
                match ProjectileLaunch::from_weapon(def, self.owner, origin, direction, self.hit_mask) {
                    Some(launch) => ShotResult::Projectile(world.spawn_projectile(host, launch)),
                    None => ShotResult::Nothing,
                }
            },
            WeaponKind::Hitscan => self.hitscan(world, host, def, origin, direction),
            WeaponKind::Melee => self.melee(world, host, def, origin, direction),
            WeaponKind::Utility => ShotResult::Nothing,
        };
        FireOutcome::Fired(result)
    }

    fn hitscan<H: CombatHost + ?Sized>(
        &self,
        world: &mut CombatWorld,
        host: &mut H,
        def: &WeaponDefinition,
        origin: Vec3,
        direction: Vec3,
    ) -> ShotResult {
        let distance = def.range.max(0.01);
        let ray = Ray::new(origin, direction);

        match host.raycast(&ray, distance, self.hit_mask) {
            Some(hit) => {
                world.damage_collider(host, hit.collider, def.damage);
                world.apply_impulse(host, hit.collider, direction, def.impulse);
                world.events().publish(CombatEvent::Impact {
                    point: hit.point,
                    normal: hit.normal,
                    collider: hit.collider,
                });
                world.events().publish(CombatEvent::ShotTraced {
                    owner: self.owner,
                    origin,
                    end: hit.point,
                    hit: true,
                });
                ShotResult::Hit {
                    collider: hit.collider,
                    point: hit.point,
                }
            },
            None => {
                world.events().publish(CombatEvent::ShotTraced {
                    owner: self.owner,
                    origin,
                    end: ray.point_at(distance),
                    hit: false,
                });
                ShotResult::Miss
            },
        }
    }

    fn melee<H: CombatHost + ?Sized>(
        &mut self,
        world: &mut CombatWorld,
        host: &mut H,
        def: &WeaponDefinition,
        origin: Vec3,
        direction: Vec3,
    ) -> ShotResult {
        let reach = world.config().melee_reach(def.range);
        let radius = world.config().melee_radius;
        let ray = Ray::new(origin, direction);

        let Some(hit) = host.sweep_cast(&ray, radius, reach, self.hit_mask) else {
            world.events().publish(CombatEvent::ShotTraced {
                owner: self.owner,
                origin,
                end: ray.point_at(reach),
                hit: false,
            });
            return ShotResult::Miss;
        };

        world.damage_collider(host, hit.collider, def.damage);
        world.apply_impulse(host, hit.collider, direction, def.impulse);
        world.events().publish(CombatEvent::Impact {
            point: hit.point,
            normal: hit.normal,
            collider: hit.collider,
        });
        world.events().publish(CombatEvent::ShotTraced {
            owner: self.owner,
            origin,
            end: hit.point,
            hit: true,
        });

        if def.hitstop > 0.0 {
            world.events().publish(CombatEvent::HitstopRequested {
                source: self.owner,
                duration: def.hitstop,
            });
        }

        let lunge_dir = flatten(direction);
        if def.lunge_distance > 0.0 && lunge_dir != Vec3::ZERO {
            if let Some(start) = host.position(self.owner) {
                self.lunge = Some(LinearMove::new(
                    self.owner,
                    start,
                    start + lunge_dir * def.lunge_distance,
                    def.lunge_time,
                ));
            }
        }

        ShotResult::Hit {
            collider: hit.collider,
            point: hit.point,
        }
    }

    // ------------------------------------------------------------------------
    // Reload
    // ------------------------------------------------------------------------

    /// Handles a reload request for the active weapon.
    pub fn reload(&mut self, world: &CombatWorld) -> ReloadOutcome {
        let registry = Arc::clone(&self.registry);
        match registry.get(self.active) {
            Some(def) => self.start_reload(world, def),
            None => ReloadOutcome::NotApplicable,
        }
    }

    fn start_reload(&mut self, world: &CombatWorld, def: &WeaponDefinition) -> ReloadOutcome {
        if !def.uses_ammo {
            return ReloadOutcome::NotApplicable;
        }
        if self.is_reloading() {
            return ReloadOutcome::AlreadyReloading;
        }
        self.ensure_ammo(world, def.id);
        let state = self.ammo.get(&def.id).copied().unwrap_or_default();
        if state.clip >= def.clip_size {
            return ReloadOutcome::ClipFull;
        }
        if state.reserve <= 0 {
            return ReloadOutcome::NoReserve;
        }

        let duration = def.reload_time.max(0.0);
        self.state = WeaponState::Reloading {
            weapon: def.id,
            remaining: duration,
        };
        world.events().publish(CombatEvent::ReloadStarted {
            owner: self.owner,
            weapon: def.id,
            duration,
        });
        ReloadOutcome::Started { duration }
    }

    fn finish_reload(&mut self, world: &CombatWorld, weapon: WeaponId) {
        self.state = WeaponState::Idle;
        let Some(def) = self.registry.get(weapon) else {
            return;
        };
        let clip_size = def.clip_size;
        if let Some(state) = self.ammo.get_mut(&weapon) {
            let need = (clip_size - state.clip).max(0);
            let take = need.min(state.reserve);
            state.clip += take;
            state.reserve -= take;
            let state = *state;
            self.publish_ammo(world, weapon, state);
        }
    }

    // ------------------------------------------------------------------------
    // Tick
    // ------------------------------------------------------------------------

    /// Advances reload timers and lunges by `dt`.
    pub fn tick<H: CombatHost + ?Sized>(&mut self, world: &CombatWorld, host: &mut H, dt: f32) {
        if let WeaponState::Reloading { weapon, remaining } = self.state {
            if remaining <= 0.0 {
                self.finish_reload(world, weapon);
            } else {
                self.state = WeaponState::Reloading {
                    weapon,
                    remaining: remaining - dt,
                };
                if remaining - dt <= 0.0 {
                    self.finish_reload(world, weapon);
                }
            }
        }

        if let Some(lunge) = self.lunge.as_mut() {
            if lunge.step(host, dt) {
                self.lunge = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::StaticCatalog;
    use crate::clock::ManualClock;
    use crate::host::Transforms;
    use crate::scene::{SphereCollider, SphereScene};

    const PISTOL: WeaponId = WeaponId::new(1);
    const BLADE: WeaponId = WeaponId::new(2);
    const BOW: WeaponId = WeaponId::new(3);
    const TORCH: WeaponId = WeaponId::new(4);

    fn registry() -> Arc<WeaponRegistry> {
        let source = StaticCatalog::new()
            .with_weapon(
                WeaponDefinition::new(PISTOL, WeaponKind::Hitscan)
                    .with_name("Pistol")
                    .with_damage(25)
                    .with_range(50.0)
                    .with_ammo(8, 1.0),
            )
            .with_weapon(
                WeaponDefinition::new(BLADE, WeaponKind::Melee)
                    .with_name("Blade")
                    .with_damage(40)
                    .with_range(2.0)
                    .with_fire_cooldown(0.5),
            )
            .with_weapon(WeaponDefinition::new(BOW, WeaponKind::Ranged).with_name("Bow"))
            .with_weapon(WeaponDefinition::new(TORCH, WeaponKind::Utility).with_name("Torch"));
        let mut registry = WeaponRegistry::new();
        registry.load(&source).expect("load");
        Arc::new(registry)
    }

    struct Rig {
        scene: SphereScene,
        world: CombatWorld,
        clock: ManualClock,
        player: EntityId,
        weapons: WeaponController,
    }

    impl Rig {
        fn new(weapon: WeaponId) -> Self {
            let mut scene = SphereScene::new();
            let world = CombatWorld::default();
            let player = scene.spawn_at(Vec3::ZERO);
            let mut weapons = WeaponController::new(player, registry());
            weapons.add_weapon(&world, weapon, 0, true);
            Self {
                scene,
                world,
                clock: ManualClock::new(),
                player,
                weapons,
            }
        }

        fn enemy_at(&mut self, at: Vec3, hp: i32) -> EntityId {
            let e = self.scene.spawn_at(at);
            self.scene.attach_sphere(e, SphereCollider::new(0.5));
            self.world.spawn_combatant(e, hp);
            self.world.add_knockback_receiver(e);
            e
        }

        fn advance(&mut self, dt: f32) {
            self.clock.advance(dt);
            self.world.tick(&mut self.scene, &self.clock);
            self.weapons.tick(&self.world, &mut self.scene, dt);
        }

        fn fire(&mut self) -> FireOutcome {
            let aim = Ray::new(Vec3::ZERO, Vec3::Z);
            self.weapons.fire(&mut self.world, &mut self.scene, &aim)
        }

        fn hp(&self, e: EntityId) -> Option<i32> {
            self.world.combatant(e).map(|c| c.health().current())
        }
    }

    #[test]
    fn test_hitscan_hit_damages_and_reports() {
        let mut rig = Rig::new(PISTOL);
        let enemy = rig.enemy_at(Vec3::Z * 10.0, 100);

        let outcome = rig.fire();
        assert!(matches!(outcome, FireOutcome::Fired(ShotResult::Hit { .. })));
        assert_eq!(rig.hp(enemy), Some(75));
        assert_eq!(rig.weapons.ammo(), Some(AmmoState { clip: 7, reserve: 90 }));
        assert!(rig.world.events().drain().iter().any(|e| matches!(
            e,
            CombatEvent::ShotTraced { hit: true, .. }
        )));
        assert!(rig.world.knockback(enemy).is_some_and(|k| !k.is_at_rest()));
    }

    #[test]
    fn test_hitscan_miss_reports_full_range_line() {
        let mut rig = Rig::new(PISTOL);
        assert_eq!(rig.fire(), FireOutcome::Fired(ShotResult::Miss));
        let traced = rig.world.events().drain().into_iter().find_map(|e| match e {
            CombatEvent::ShotTraced { end, hit, .. } => Some((end, hit)),
            _ => None,
        });
        let (end, hit) = traced.expect("trace");
        assert!(!hit);
        assert!((end - Vec3::Z * 50.0).length() < 1e-3);
    }

    #[test]
    fn test_fire_rate_gating() {
        let mut rig = Rig::new(PISTOL);
        let mut shots = 0;
        for _ in 0..2 {
            if matches!(rig.fire(), FireOutcome::Fired(_)) {
                shots += 1;
            }
            rig.advance(0.1);
        }
        assert_eq!(shots, 1);

        let mut rig = Rig::new(PISTOL);
        let mut shots = 0;
        for _ in 0..2 {
            if matches!(rig.fire(), FireOutcome::Fired(_)) {
                shots += 1;
            }
            rig.advance(0.3);
        }
        assert_eq!(shots, 2);
    }

    #[test]
    fn test_reload_transfers_from_reserve() {
        let mut rig = Rig::new(PISTOL);
        rig.weapons.ammo.insert(PISTOL, AmmoState { clip: 2, reserve: 3 });
        assert_eq!(rig.weapons.reload(&rig.world), ReloadOutcome::Started { duration: 1.0 });
        assert_eq!(rig.fire(), FireOutcome::Reloading);
        for _ in 0..12 {
            rig.advance(0.1);
        }
        assert_eq!(rig.weapons.ammo(), Some(AmmoState { clip: 5, reserve: 0 }));
        assert!(!rig.weapons.is_reloading());

        rig.weapons.ammo.insert(PISTOL, AmmoState { clip: 2, reserve: 20 });
        rig.weapons.reload(&rig.world);
        for _ in 0..12 {
            rig.advance(0.1);
        }
        assert_eq!(rig.weapons.ammo(), Some(AmmoState { clip: 8, reserve: 14 }));
    }

    #[test]
    fn test_reload_gating() {
        let mut rig = Rig::new(PISTOL);
        assert_eq!(rig.weapons.reload(&rig.world), ReloadOutcome::ClipFull);
        rig.weapons.ammo.insert(PISTOL, AmmoState { clip: 3, reserve: 0 });
        assert_eq!(rig.weapons.reload(&rig.world), ReloadOutcome::NoReserve);
        rig.weapons.ammo.insert(PISTOL, AmmoState { clip: 3, reserve: 5 });
        assert!(matches!(rig.weapons.reload(&rig.world), ReloadOutcome::Started { .. }));
        assert_eq!(rig.weapons.reload(&rig.world), ReloadOutcome::AlreadyReloading);
    }

    #[test]
    fn test_empty_clip_triggers_reload() {
        let mut rig = Rig::new(PISTOL);
        rig.weapons.ammo.insert(PISTOL, AmmoState { clip: 0, reserve: 4 });
        assert_eq!(rig.fire(), FireOutcome::ReloadTriggered);
        assert!(rig.weapons.is_reloading());

        rig.weapons.ammo.insert(PISTOL, AmmoState { clip: 0, reserve: 0 });
        rig.weapons.equip(&rig.world, PISTOL);
        assert_eq!(rig.fire(), FireOutcome::OutOfAmmo);
    }

    #[test]
    fn test_equip_cancels_reload() {
        let mut rig = Rig::new(PISTOL);
        rig.weapons.ammo.insert(PISTOL, AmmoState { clip: 1, reserve: 10 });
        rig.weapons.reload(&rig.world);
        rig.weapons.add_weapon(&rig.world, BLADE, 0, true);
        assert_eq!(rig.weapons.state(), WeaponState::Idle);
        rig.weapons.equip(&rig.world, PISTOL);
        for _ in 0..20 {
            rig.advance(0.1);
        }
        assert_eq!(rig.weapons.ammo(), Some(AmmoState { clip: 1, reserve: 10 }));
    }

    #[test]
    fn test_add_reserve_only_for_ammo_weapons() {
        let mut rig = Rig::new(PISTOL);
        rig.weapons.add_reserve(&rig.world, PISTOL, 10);
        rig.weapons.add_reserve(&rig.world, PISTOL, -5);
        assert_eq!(rig.weapons.ammo_of(PISTOL).map(|a| a.reserve), Some(100));

        rig.weapons.add_weapon(&rig.world, BLADE, 30, false);
        assert!(rig.weapons.has_weapon(BLADE));
        assert_eq!(rig.weapons.ammo_of(BLADE), Some(AmmoState::default()));
        assert_eq!(rig.weapons.active_weapon(), PISTOL);
    }

    #[test]
    fn test_melee_hit_lunges_and_requests_hitstop() {
        let mut rig = Rig::new(BLADE);
        let enemy = rig.enemy_at(Vec3::Z * 1.8, 100);

        let outcome = rig.fire();
        assert!(matches!(outcome, FireOutcome::Fired(ShotResult::Hit { .. })));
        assert_eq!(rig.hp(enemy), Some(60));
        assert!(rig.world.events().drain().iter().any(|e| matches!(
            e,
            CombatEvent::HitstopRequested { duration, .. } if *duration == 0.05
        )));

        for _ in 0..5 {
            rig.advance(0.02);
        }
        let p = rig.scene.position(rig.player).expect("player");
        assert!((p.z - 1.2).abs() < 1e-4);
    }

    #[test]
    fn test_melee_reach_is_clamped() {
        let mut rig = Rig::new(BLADE);
        let enemy = rig.enemy_at(Vec3::Z * 4.0, 100);
        assert_eq!(rig.fire(), FireOutcome::Fired(ShotResult::Miss));
        assert_eq!(rig.hp(enemy), Some(100));
    }

    #[test]
    fn test_ranged_spawns_projectile() {
        let mut rig = Rig::new(BOW);
        let enemy = rig.enemy_at(Vec3::Z * 8.0, 100);

        let outcome = rig.fire();
        assert!(matches!(outcome, FireOutcome::Fired(ShotResult::Projectile(_))));
        assert_eq!(rig.world.projectiles().len(), 1);
        for _ in 0..30 {
            rig.advance(1.0 / 30.0);
        }
        assert_eq!(rig.hp(enemy), Some(80));
    }

    #[test]
    fn test_utility_and_missing_weapon() {
        let mut rig = Rig::new(TORCH);
        assert_eq!(rig.fire(), FireOutcome::Fired(ShotResult::Nothing));

        rig.weapons.equip(&rig.world, WeaponId::new(99));
        assert_eq!(rig.fire(), FireOutcome::NoWeapon);

        rig.weapons.equip(&rig.world, TORCH);
        rig.weapons.set_fire_point(None);
        rig.advance(1.0);
        assert_eq!(rig.fire(), FireOutcome::NoFirePoint);
    }
}
