//! Scripted headless combat scenario.
//!
//! A hunter stands at the origin facing a line of hostiles. Every tick it
//! aims at the nearest living hostile and pulls the trigger; on a fixed
//! cadence it casts the next ability slot. Empty weapons are swapped for the
//! backup. The run ends when every hostile is dead or the configured
//! duration has elapsed.

use std::collections::BTreeMap;
use std::sync::Arc;

use glam::Vec3;
use nighthunter_combat::{
    AbilityRegistry, AbilityRunner, CastOutcome, Clock, CombatEvent, CombatWorld, EventHandler,
    FireOutcome, FixedStepClock, SphereCollider, SphereScene, Transforms, WeaponController,
    WeaponLoadout, WeaponRegistry, ABILITY_SLOTS,
};
use nighthunter_common::{AbilityId, EntityId, LayerMask, Ray, WeaponId};
use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::SimConfig;

/// Layer of the hunter's own collider.
const HUNTER_LAYER: LayerMask = LayerMask::layer(1);

/// Layer of hostile colliders.
const HOSTILE_LAYER: LayerMask = LayerMask::layer(2);

/// Seconds between ability casts.
const CAST_INTERVAL: f32 = 2.0;

/// Summary of a finished run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScenarioReport {
    /// Ticks simulated
    pub ticks: u64,
    /// Simulated seconds
    pub elapsed: f32,
    /// Shots fired
    pub shots: u32,
    /// Casts started
    pub casts: u32,
    /// Hostiles killed
    pub kills: u32,
    /// Hostiles spawned
    pub hostiles: u32,
    /// Published events by name
    pub events: BTreeMap<&'static str, u32>,
}

/// Counts every published event by name.
struct EventTally(Arc<Mutex<BTreeMap<&'static str, u32>>>);

impl EventHandler for EventTally {
    fn handle(&self, event: &CombatEvent) {
        *self.0.lock().entry(event.name()).or_default() += 1;
    }
}

/// A running scenario.
pub struct Scenario {
    scene: SphereScene,
    world: CombatWorld,
    clock: FixedStepClock,
    duration: f32,
    hunter: EntityId,
    hostiles: Vec<EntityId>,
    loadout: WeaponLoadout,
    runner: AbilityRunner,
    next_cast_at: f32,
    next_slot: usize,
    tally: Arc<Mutex<BTreeMap<&'static str, u32>>>,
    report: ScenarioReport,
}

impl Scenario {
    /// Spawns the hunter and the hostiles.
    ///
    /// The hunter starts with the first two catalog weapons (equipped and
    /// backup) and the first three abilities in its slots.
    pub fn new(config: &SimConfig, weapons: Arc<WeaponRegistry>, abilities: Arc<AbilityRegistry>) -> Self {
        let mut scene = SphereScene::new();
        let mut world = CombatWorld::new(config.combat.clone());

        let tally = Arc::new(Mutex::new(BTreeMap::new()));
        world
            .events_mut()
            .subscribe(Box::new(EventTally(Arc::clone(&tally))));

        let hunter = scene.spawn_at(Vec3::ZERO);
        scene.attach_sphere(hunter, SphereCollider::new(0.5).with_layer(HUNTER_LAYER));
        world.spawn_combatant(hunter, 100);
        let muzzle = scene.spawn_child(hunter, Vec3::new(0.1, 0.2, 0.2));

        let count = config.enemy_count;
        let hostiles: Vec<EntityId> = (0..count)
            .map(|i| {
                let lateral = (i as f32 - (count.saturating_sub(1)) as f32 / 2.0) * 2.0;
                let e = scene.spawn_at(Vec3::new(lateral, 0.0, 6.0 + 2.0 * i as f32));
                scene.attach_sphere(e, SphereCollider::new(0.5).with_layer(HOSTILE_LAYER));
                world.spawn_combatant(e, config.enemy_hit_points);
                world.add_knockback_receiver(e);
                e
            })
            .collect();

        let hit_mask = LayerMask::ALL.without(HUNTER_LAYER);

        let (equipped, backup) = {
            let mut weapon_ids = weapons.iter().map(|w| w.id);
            let equipped = weapon_ids.next().unwrap_or(WeaponId::NONE);
            let backup = weapon_ids.next().unwrap_or(WeaponId::NONE);
            (equipped, backup)
        };
        let controller = WeaponController::new(hunter, weapons)
            .with_fire_point(muzzle)
            .with_hit_mask(hit_mask);
        let loadout = WeaponLoadout::new(&world, controller, equipped, backup);

        let mut slots = [AbilityId::NONE; ABILITY_SLOTS];
        for (slot, ability) in slots.iter_mut().zip(abilities.iter()) {
            *slot = ability.id;
        }
        let runner = AbilityRunner::new(hunter, abilities)
            .with_origin(muzzle)
            .with_hit_mask(hit_mask)
            .with_slots(slots);

        info!(
            "Scenario ready: {} hostiles, equipped {}, backup {}, slots {:?}",
            count, equipped, backup, slots
        );

        Self {
            scene,
            world,
            clock: FixedStepClock::from_hz(config.tick_rate),
            duration: config.duration,
            hunter,
            hostiles,
            loadout,
            runner,
            next_cast_at: 0.0,
            next_slot: 0,
            tally,
            report: ScenarioReport {
                hostiles: count,
                ..ScenarioReport::default()
            },
        }
    }

    /// Runs to completion.
    pub fn run(mut self) -> ScenarioReport {
        while self.clock.now() < self.duration && self.nearest_hostile().is_some() {
            self.step();
        }

        self.report.elapsed = self.clock.now();
        self.report.events = self.tally.lock().clone();
        info!(
            "Scenario finished after {:.2}s: {} shots, {} casts, {}/{} kills",
            self.report.elapsed,
            self.report.shots,
            self.report.casts,
            self.report.kills,
            self.report.hostiles
        );
        self.report
    }

    fn step(&mut self) {
        self.clock.tick();
        let dt = self.clock.delta_time();
        let now = self.clock.now();
        self.world.tick(&mut self.scene, &self.clock);

        if let Some(aim) = self.aim() {
            match self
                .loadout
                .controller_mut()
                .fire(&mut self.world, &mut self.scene, &aim)
            {
                FireOutcome::Fired(_) => self.report.shots += 1,
                FireOutcome::OutOfAmmo => self.loadout.swap(&self.world),
                _ => {},
            }

            if now >= self.next_cast_at {
                self.next_cast_at = now + CAST_INTERVAL;
                let slot = self.next_slot;
                self.next_slot = (self.next_slot + 1) % ABILITY_SLOTS;
                let outcome = self
                    .runner
                    .cast_slot(&mut self.world, &mut self.scene, slot, aim);
                if matches!(outcome, CastOutcome::Started | CastOutcome::Completed { .. }) {
                    self.report.casts += 1;
                }
            }
        }

        self.loadout
            .controller_mut()
            .tick(&self.world, &mut self.scene, dt);
        self.runner.tick(&mut self.world, &mut self.scene, dt);
        self.scene.step(dt);

        for event in self.world.events().drain() {
            match event {
                CombatEvent::Died { entity } => {
                    if self.hostiles.contains(&entity) {
                        self.report.kills += 1;
                    }
                    info!("{} died at {:.2}s", entity, now);
                },
                other => debug!("{:?}", other),
            }
        }
        self.report.ticks += 1;
    }

    /// Center-of-frame ray from the hunter to the nearest living hostile.
    fn aim(&self) -> Option<Ray> {
        let eye = self.scene.position(self.hunter)?;
        let target = self.nearest_hostile()?;
        Some(Ray::towards(eye, target))
    }

    fn nearest_hostile(&self) -> Option<Vec3> {
        let eye = self.scene.position(self.hunter).unwrap_or(Vec3::ZERO);
        self.hostiles
            .iter()
            .filter(|&&e| self.world.combatant(e).is_some_and(|c| !c.health().is_dead()))
            .filter_map(|&e| self.scene.position(e))
            .min_by(|a, b| a.distance_squared(eye).total_cmp(&b.distance_squared(eye)))
    }
}
