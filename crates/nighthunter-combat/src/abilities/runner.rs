//! Per-combatant ability runner.
//!
//! Casts are gated by per-ability cooldowns. A cast captures its context,
//! acquires targets, runs effect cast-start hooks, then steps its delivery
//! immediately and once per [`AbilityRunner::tick`] until it finishes. The
//! cooldown starts when the delivery finishes.

use std::sync::Arc;

use ahash::AHashMap;
use nighthunter_common::{AbilityId, EntityId, LayerMask, ModifierHandle, Ray};
use parking_lot::Mutex;
use tracing::{debug, warn};

use super::delivery::DeliveryRun;
use super::registry::AbilityRegistry;
use super::spec::EffectModule;
use super::{AbilityContext, Target};
use crate::events::CombatEvent;
use crate::host::CombatHost;
use crate::world::CombatWorld;

/// Number of ability slots.
pub const ABILITY_SLOTS: usize = 3;

/// Result of a cast request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastOutcome {
    /// Delivery finished within the request
    Completed {
        /// Impacts delivered
        impacts: u32,
    },
    /// Delivery continues over the next ticks
    Started,
    /// Slot holds no ability
    EmptySlot,
    /// Ability unknown or missing targeting/delivery (logged)
    Misconfigured,
    /// The same ability is still being delivered
    AlreadyCasting,
    /// Cooldown has not elapsed
    OnCooldown,
    /// Caster has no position
    NoCaster,
}

#[derive(Debug)]
struct ActiveCast {
    ability: AbilityId,
    cooldown: f32,
    ctx: AbilityContext,
    delivery: DeliveryRun,
    effects: Vec<EffectModule>,
    impacts: u32,
}

/// Ability driver for one combatant.
#[derive(Debug)]
pub struct AbilityRunner {
    caster: EntityId,
    origin: Option<EntityId>,
    hit_mask: LayerMask,
    registry: Arc<AbilityRegistry>,
    slots: [AbilityId; ABILITY_SLOTS],
    ready_at: AHashMap<AbilityId, f32>,
    active: Vec<ActiveCast>,
    shield: Arc<Mutex<Option<ModifierHandle>>>,
}

impl AbilityRunner {
    /// Creates a runner with empty slots.
    #[must_use]
    pub fn new(caster: EntityId, registry: Arc<AbilityRegistry>) -> Self {
        Self {
            caster,
            origin: None,
            hit_mask: LayerMask::ALL,
            registry,
            slots: [AbilityId::NONE; ABILITY_SLOTS],
            ready_at: AHashMap::new(),
            active: Vec::new(),
            shield: Arc::new(Mutex::new(None)),
        }
    }

    /// Casts originate from `entity` (muzzle or hand) instead of the caster.
    #[must_use]
    pub fn with_origin(mut self, entity: EntityId) -> Self {
        self.origin = Some(entity);
        self
    }

    /// Sets the acceptance mask for hits.
    #[must_use]
    pub fn with_hit_mask(mut self, mask: LayerMask) -> Self {
        self.hit_mask = mask;
        self
    }

    /// Fills the slots.
    #[must_use]
    pub fn with_slots(mut self, slots: [AbilityId; ABILITY_SLOTS]) -> Self {
        self.slots = slots;
        self
    }

    /// Caster entity.
    #[must_use]
    pub fn caster(&self) -> EntityId {
        self.caster
    }

    /// Slot contents.
    #[must_use]
    pub fn slots(&self) -> [AbilityId; ABILITY_SLOTS] {
        self.slots
    }

    /// Replaces a slot. In-flight casts are unaffected.
    pub fn set_slot(&mut self, index: usize, ability: AbilityId) {
        if let Some(slot) = self.slots.get_mut(index) {
            *slot = ability;
        }
    }

    /// Shield from this runner's last shield cast, while it is still up.
    #[must_use]
    pub fn active_shield(&self) -> Option<ModifierHandle> {
        *self.shield.lock()
    }

    /// Returns true while `ability` is being delivered.
    #[must_use]
    pub fn is_casting(&self, ability: AbilityId) -> bool {
        self.active.iter().any(|cast| cast.ability == ability)
    }

    /// Number of casts in flight.
    #[must_use]
    pub fn active_casts(&self) -> usize {
        self.active.len()
    }

    /// Cooldown progress in `[0, 1]`: 1 right after a cast (and while it is
    /// being delivered), 0 once castable.
    #[must_use]
    pub fn remaining_fraction(&self, ability: AbilityId, now: f32) -> f32 {
        if !ability.is_some() {
            return 0.0;
        }
        if self.is_casting(ability) {
            return 1.0;
        }
        let Some(&ready_at) = self.ready_at.get(&ability) else {
            return 0.0;
        };
        let Some(spec) = self.registry.get(ability) else {
            return 0.0;
        };
        if spec.cooldown <= 0.0 {
            return 0.0;
        }
        ((ready_at - now).max(0.0) / spec.cooldown).clamp(0.0, 1.0)
    }

    /// Casts whatever is in slot `index`.
    pub fn cast_slot<H: CombatHost + ?Sized>(
        &mut self,
        world: &mut CombatWorld,
        host: &mut H,
        index: usize,
        aim: Ray,
    ) -> CastOutcome {
        match self.slots.get(index) {
            Some(&ability) => self.try_cast(world, host, ability, aim),
            None => CastOutcome::EmptySlot,
        }
    }

    /// Handles a cast request for `ability` along the `aim` ray.
    pub fn try_cast<H: CombatHost + ?Sized>(
        &mut self,
        world: &mut CombatWorld,
        host: &mut H,
        ability: AbilityId,
        aim: Ray,
    ) -> CastOutcome {
        if !ability.is_some() {
            return CastOutcome::EmptySlot;
        }

        let registry = Arc::clone(&self.registry);
        let Some(composition) = registry.compose(ability) else {
            warn!("Unknown ability {}", ability);
            return CastOutcome::Misconfigured;
        };
        let (Some(targeting), Some(delivery)) = (composition.targeting, composition.delivery) else {
            warn!(
                "Ability {} ({}) is missing targeting or delivery",
                ability, composition.ability.name
            );
            return CastOutcome::Misconfigured;
        };

        if self.is_casting(ability) {
            return CastOutcome::AlreadyCasting;
        }
        let now = world.now();
        if self.ready_at.get(&ability).is_some_and(|&ready_at| now < ready_at) {
            return CastOutcome::OnCooldown;
        }
        let Some(caster_position) = host.position(self.caster) else {
            return CastOutcome::NoCaster;
        };

        let ctx = AbilityContext {
            caster: self.caster,
            origin: self
                .origin
                .and_then(|e| host.position(e))
                .unwrap_or(caster_position),
            aim_ray: aim,
            hit_mask: self.hit_mask,
        };

        let targets = targeting.acquire(&*host, &ctx);
        let effects: Vec<EffectModule> = composition.effects.into_iter().cloned().collect();
        for effect in &effects {
            effect.on_cast_start(world, host, &ctx, &self.shield);
        }
        world.events().publish(CombatEvent::CastStarted {
            caster: self.caster,
            ability,
        });
        debug!("{} cast {} with {} targets", self.caster, composition.ability.name, targets.len());

        let mut cast = ActiveCast {
            ability,
            cooldown: composition.ability.cooldown,
            delivery: DeliveryRun::start(delivery, &*host, world.config(), &ctx, targets),
            ctx,
            effects,
            impacts: 0,
        };

        if Self::advance(&mut cast, world, host, 0.0) {
            let impacts = cast.impacts;
            self.finish(world, cast);
            CastOutcome::Completed { impacts }
        } else {
            self.active.push(cast);
            CastOutcome::Started
        }
    }

    /// Steps every in-flight delivery by `dt`.
    pub fn tick<H: CombatHost + ?Sized>(&mut self, world: &mut CombatWorld, host: &mut H, dt: f32) {
        if self.active.is_empty() {
            return;
        }
        for mut cast in std::mem::take(&mut self.active) {
            if Self::advance(&mut cast, world, host, dt) {
                self.finish(world, cast);
            } else {
                self.active.push(cast);
            }
        }
    }

    /// Steps a delivery and fans its impacts out to the effects.
    fn advance<H: CombatHost + ?Sized>(
        cast: &mut ActiveCast,
        world: &mut CombatWorld,
        host: &mut H,
        dt: f32,
    ) -> bool {
        let mut impacts: Vec<Target> = Vec::new();
        let finished = cast.delivery.step(host, dt, &mut impacts);
        for target in &impacts {
            for effect in &cast.effects {
                effect.on_impact(world, host, &cast.ctx, target);
            }
            cast.impacts += 1;
        }
        finished
    }

    fn finish(&mut self, world: &CombatWorld, cast: ActiveCast) {
        for effect in &cast.effects {
            effect.on_cast_end(&cast.ctx);
        }
        self.ready_at
            .insert(cast.ability, world.now() + cast.cooldown.max(0.0));
        world.events().publish(CombatEvent::CastFinished {
            caster: cast.ctx.caster,
            ability: cast.ability,
            impacts: cast.impacts,
        });
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::abilities::{AbilityCatalog, AbilityDefinition, DeliveryModule, TargetingModule};
    use crate::clock::ManualClock;
    use crate::host::Transforms;
    use crate::modifiers::ShieldSpec;
    use crate::scene::{SphereCollider, SphereScene};

    const PULSE: AbilityId = AbilityId::new(1);
    const BLAST: AbilityId = AbilityId::new(2);
    const GUARD: AbilityId = AbilityId::new(3);
    const SURGE: AbilityId = AbilityId::new(4);
    const DECOY: AbilityId = AbilityId::new(5);
    const BROKEN: AbilityId = AbilityId::new(6);
    const BACKLASH: AbilityId = AbilityId::new(7);

    fn registry() -> Arc<AbilityRegistry> {
        let catalog = AbilityCatalog::default()
            .with_targeting("self", TargetingModule::SelfTarget)
            .with_delivery("instant", DeliveryModule::Instant)
            .with_delivery(
                "dash",
                DeliveryModule::Dash {
                    distance: 6.0,
                    duration: 0.15,
                    flatten: true,
                },
            )
            .with_delivery(
                "blast",
                DeliveryModule::Explosion {
                    radius: 5.0,
                    line_of_sight: false,
                    los_padding: None,
                    fuse: 0.0,
                    pulses: 3,
                    pulse_interval: 0.25,
                },
            )
            .with_effect("shield", EffectModule::Shield(ShieldSpec::default()))
            .with_effect("decoy", EffectModule::SpawnDecoy { lifetime: 3.0 })
            .with_effect(
                "hurt",
                EffectModule::Damage {
                    damage: 10,
                    impulse: 0.0,
                },
            )
            .with_ability(
                AbilityDefinition::new(PULSE, "Pulse")
                    .with_cooldown(8.0)
                    .with_targeting("self")
                    .with_delivery("instant"),
            )
            .with_ability(
                AbilityDefinition::new(BLAST, "Blast")
                    .with_cooldown(4.0)
                    .with_targeting("self")
                    .with_delivery("blast")
                    .with_effect("hurt"),
            )
            .with_ability(
                AbilityDefinition::new(GUARD, "Guard")
                    .with_cooldown(0.0)
                    .with_targeting("self")
                    .with_delivery("instant")
                    .with_effect("shield"),
            )
            .with_ability(
                AbilityDefinition::new(SURGE, "Surge")
                    .with_cooldown(2.0)
                    .with_targeting("self")
                    .with_delivery("dash"),
            )
            .with_ability(
                AbilityDefinition::new(DECOY, "Decoy")
                    .with_targeting("self")
                    .with_delivery("instant")
                    .with_effect("decoy"),
            )
            .with_ability(AbilityDefinition::new(BROKEN, "Broken").with_delivery("instant"))
            .with_ability(
                AbilityDefinition::new(BACKLASH, "Backlash")
                    .with_targeting("self")
                    .with_delivery("instant")
                    .with_effect("hurt"),
            );

        let mut registry = AbilityRegistry::new();
        registry.register_catalog(catalog);
        Arc::new(registry)
    }

    struct Rig {
        scene: SphereScene,
        world: CombatWorld,
        clock: ManualClock,
        caster: EntityId,
        runner: AbilityRunner,
    }

    impl Rig {
        fn new() -> Self {
            let mut scene = SphereScene::new();
            let mut world = CombatWorld::default();
            let caster = scene.spawn_at(Vec3::ZERO);
            world.spawn_combatant(caster, 100);
            Self {
                scene,
                world,
                clock: ManualClock::new(),
                caster,
                runner: AbilityRunner::new(caster, registry()),
            }
        }

        fn cast(&mut self, ability: AbilityId) -> CastOutcome {
            let aim = Ray::new(Vec3::ZERO, Vec3::X);
            self.runner.try_cast(&mut self.world, &mut self.scene, ability, aim)
        }

        fn advance(&mut self, dt: f32) {
            self.clock.advance(dt);
            self.world.tick(&mut self.scene, &self.clock);
            self.runner.tick(&mut self.world, &mut self.scene, dt);
        }

        fn now(&self) -> f32 {
            self.world.now()
        }
    }

    #[test]
    fn test_cooldown_fraction() {
        let mut rig = Rig::new();
        assert_eq!(rig.cast(PULSE), CastOutcome::Completed { impacts: 1 });
        assert_eq!(rig.runner.remaining_fraction(PULSE, rig.now()), 1.0);
        assert_eq!(rig.cast(PULSE), CastOutcome::OnCooldown);

        rig.clock.set(4.0);
        rig.world.tick(&mut rig.scene, &rig.clock);
        assert!((rig.runner.remaining_fraction(PULSE, rig.now()) - 0.5).abs() < 1e-6);

        rig.clock.set(8.0);
        rig.world.tick(&mut rig.scene, &rig.clock);
        assert_eq!(rig.runner.remaining_fraction(PULSE, rig.now()), 0.0);
        assert_eq!(rig.cast(PULSE), CastOutcome::Completed { impacts: 1 });
    }

    #[test]
    fn test_area_pulses_hit_target_once_per_pulse() {
        let mut rig = Rig::new();
        let target = rig.scene.spawn_at(Vec3::X * 3.0);
        rig.scene.attach_sphere(target, SphereCollider::new(0.5));
        rig.world.spawn_combatant(target, 1000);

        assert_eq!(rig.cast(BLAST), CastOutcome::Started);
        assert_eq!(rig.runner.remaining_fraction(BLAST, rig.now()), 1.0);
        for _ in 0..40 {
            rig.advance(0.05);
        }

        assert!(!rig.runner.is_casting(BLAST));
        assert_eq!(
            rig.world.combatant(target).map(|c| c.health().current()),
            Some(970)
        );
        let finished = rig.world.events().drain().into_iter().find_map(|e| match e {
            CombatEvent::CastFinished { impacts, .. } => Some(impacts),
            _ => None,
        });
        assert_eq!(finished, Some(3));
    }

    #[test]
    fn test_shield_recast_replaces_previous() {
        let mut rig = Rig::new();
        assert!(matches!(rig.cast(GUARD), CastOutcome::Completed { .. }));
        assert!(matches!(rig.cast(GUARD), CastOutcome::Completed { .. }));
        let chain = rig.world.combatant(rig.caster).map(|c| c.modifiers().len());
        assert_eq!(chain, Some(1));

        let report = rig.world.take_damage(rig.caster, 100).expect("combatant");
        assert_eq!(report.applied, 10);
    }

    #[test]
    fn test_shield_slot_clears_when_shield_expires() {
        let mut rig = Rig::new();
        assert!(matches!(rig.cast(GUARD), CastOutcome::Completed { .. }));
        let handle = rig.runner.active_shield().expect("shield up");

        for _ in 0..6 {
            rig.advance(1.0);
        }
        assert_eq!(rig.runner.active_shield(), None);
        assert!(rig
            .world
            .events()
            .drain()
            .contains(&CombatEvent::ModifierExpired {
                owner: rig.caster,
                handle,
            }));
    }

    #[test]
    fn test_damage_effect_hits_entity_target_through_collider() {
        let mut rig = Rig::new();
        rig.scene.attach_sphere(rig.caster, SphereCollider::new(0.5));

        assert_eq!(rig.cast(BACKLASH), CastOutcome::Completed { impacts: 1 });
        assert_eq!(
            rig.world.combatant(rig.caster).map(|c| c.health().current()),
            Some(90)
        );
    }

    #[test]
    fn test_damage_effect_hits_entity_target_without_collider() {
        let mut rig = Rig::new();
        assert_eq!(rig.cast(BACKLASH), CastOutcome::Completed { impacts: 1 });
        assert_eq!(
            rig.world.combatant(rig.caster).map(|c| c.health().current()),
            Some(90)
        );
    }

    #[test]
    fn test_dash_moves_caster_and_blocks_recast() {
        let mut rig = Rig::new();
        assert_eq!(rig.cast(SURGE), CastOutcome::Started);
        assert_eq!(rig.cast(SURGE), CastOutcome::AlreadyCasting);
        for _ in 0..4 {
            rig.advance(0.05);
        }
        assert_eq!(rig.scene.position(rig.caster), Some(Vec3::X * 6.0));
        assert_eq!(rig.runner.active_casts(), 0);
        assert_eq!(rig.cast(SURGE), CastOutcome::OnCooldown);
    }

    #[test]
    fn test_slot_change_keeps_inflight_cast() {
        let mut rig = Rig::new();
        rig.runner.set_slot(0, SURGE);
        let aim = Ray::new(Vec3::ZERO, Vec3::Z);
        assert_eq!(
            rig.runner.cast_slot(&mut rig.world, &mut rig.scene, 0, aim),
            CastOutcome::Started
        );
        rig.runner.set_slot(0, PULSE);
        assert_eq!(rig.runner.slots(), [PULSE, AbilityId::NONE, AbilityId::NONE]);
        for _ in 0..4 {
            rig.advance(0.05);
        }
        assert_eq!(rig.scene.position(rig.caster), Some(Vec3::Z * 6.0));
    }

    #[test]
    fn test_decoy_effect_spawns_decoy() {
        let mut rig = Rig::new();
        assert!(matches!(rig.cast(DECOY), CastOutcome::Completed { .. }));
        assert_eq!(rig.world.decoy_count(), 1);
    }

    #[test]
    fn test_gating_outcomes() {
        let mut rig = Rig::new();
        assert_eq!(rig.cast(AbilityId::NONE), CastOutcome::EmptySlot);
        assert_eq!(rig.cast(BROKEN), CastOutcome::Misconfigured);
        assert_eq!(rig.cast(AbilityId::new(99)), CastOutcome::Misconfigured);
        assert_eq!(
            rig.runner
                .cast_slot(&mut rig.world, &mut rig.scene, 7, Ray::new(Vec3::ZERO, Vec3::X)),
            CastOutcome::EmptySlot
        );
        assert_eq!(rig.runner.remaining_fraction(PULSE, 0.0), 0.0);
    }
}
