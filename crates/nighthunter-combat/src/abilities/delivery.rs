//! Delivery execution as per-tick state machines.
//!
//! A [`DeliveryRun`] is created when a cast starts and stepped once
//! immediately (with `dt = 0`) and then once per tick until it reports
//! completion. Each step appends the impacts it produced to a caller buffer.

use glam::Vec3;
use nighthunter_common::{flatten, ColliderHandle, LayerMask, Ray};
use tracing::debug;

use super::spec::DeliveryModule;
use super::{AbilityContext, Target};
use crate::config::CombatConfig;
use crate::host::CombatHost;
use crate::motion::LinearMove;

/// Fuse and pulse waits at or below this count as elapsed.
const WAIT_EPSILON: f32 = 1e-5;

/// Targets closer than this to the blast center skip the sight check.
const POINT_BLANK: f32 = 0.001;

/// An in-flight delivery.
#[derive(Debug, Clone)]
pub(crate) enum DeliveryRun {
    /// Fans out every target on the first step.
    Instant(Vec<Target>),
    /// Moves the caster; produces no impacts.
    Dash(LinearMove),
    /// Waits out the fuse, then pulses.
    Explosion(ExplosionRun),
    /// Nothing left to do.
    Done,
}

/// Area pulse state.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ExplosionRun {
    center: Vec3,
    radius: f32,
    line_of_sight: bool,
    padding: f32,
    mask: LayerMask,
    wait: f32,
    pulses_left: u32,
    interval: f32,
}

impl DeliveryRun {
    /// Prepares a delivery for `targets`.
    pub(crate) fn start<H: CombatHost + ?Sized>(
        module: &DeliveryModule,
        host: &H,
        config: &CombatConfig,
        ctx: &AbilityContext,
        targets: Vec<Target>,
    ) -> Self {
        match *module {
            DeliveryModule::Instant => Self::Instant(targets),
            DeliveryModule::Dash {
                distance,
                duration,
                flatten: horizontal,
            } => {
                let Some(start) = host.position(ctx.caster) else {
                    debug!("Dash skipped: caster {} has no position", ctx.caster);
                    return Self::Done;
                };
                let mut direction = ctx.aim_ray.direction.normalize_or_zero();
                if horizontal {
                    direction = flatten(direction);
                }
                let end = start + direction * distance.max(0.0);
                Self::Dash(LinearMove::new(ctx.caster, start, end, duration))
            },
            DeliveryModule::Explosion {
                radius,
                line_of_sight,
                los_padding,
                fuse,
                pulses,
                pulse_interval,
            } => {
                let center = targets
                    .iter()
                    .find_map(|target| match *target {
                        Target::Point(p) => Some(p),
                        Target::Entity(e) => host.position(e),
                        Target::Collider(c) => host.collider_center(c),
                    })
                    .or_else(|| host.position(ctx.caster))
                    .unwrap_or(ctx.origin);

                Self::Explosion(ExplosionRun {
                    center,
                    radius: radius.max(0.0),
                    line_of_sight,
                    padding: los_padding.unwrap_or(config.los_padding).max(0.0),
                    mask: ctx.hit_mask,
                    wait: fuse.max(0.0),
                    pulses_left: pulses.max(1),
                    interval: pulse_interval.max(0.0),
                })
            },
        }
    }

    /// Advances by `dt`, appending impacts. Returns true once finished.
    pub(crate) fn step<H: CombatHost + ?Sized>(
        &mut self,
        host: &mut H,
        dt: f32,
        impacts: &mut Vec<Target>,
    ) -> bool {
        let finished = match self {
            Self::Instant(targets) => {
                impacts.append(targets);
                true
            },
            Self::Dash(motion) => motion.step(host, dt),
            Self::Explosion(run) => run.step(&*host, dt, impacts),
            Self::Done => true,
        };
        if finished {
            *self = Self::Done;
        }
        finished
    }
}

impl ExplosionRun {
    fn step<H: CombatHost + ?Sized>(&mut self, host: &H, dt: f32, impacts: &mut Vec<Target>) -> bool {
        self.wait -= dt;
        if self.wait > WAIT_EPSILON {
            return false;
        }

        for collider in host.overlap_sphere(self.center, self.radius, self.mask) {
            if !self.line_of_sight || self.visible(host, collider) {
                impacts.push(Target::Collider(collider));
            }
        }

        self.pulses_left = self.pulses_left.saturating_sub(1);
        if self.pulses_left == 0 {
            return true;
        }
        self.wait = self.interval;
        false
    }

    /// Accepts a collider unless a different collider blocks the ray from
    /// the center to it.
    fn visible<H: CombatHost + ?Sized>(&self, host: &H, collider: ColliderHandle) -> bool {
        let Some(target) = host.collider_center(collider) else {
            return true;
        };
        let offset = target - self.center;
        let distance = offset.length();
        if distance <= POINT_BLANK {
            return true;
        }

        let direction = offset / distance;
        let ray = Ray::new(self.center + direction * self.padding, direction);
        host.raycast(&ray, distance + 0.01, self.mask)
            .map_or(true, |hit| hit.collider == collider)
    }
}

#[cfg(test)]
mod tests {
    use nighthunter_common::EntityId;

    use super::*;
    use crate::host::Transforms;
    use crate::scene::{SphereCollider, SphereScene};

    fn ctx(caster: EntityId, aim: Vec3) -> AbilityContext {
        AbilityContext {
            caster,
            origin: Vec3::ZERO,
            aim_ray: Ray::new(Vec3::ZERO, aim),
            hit_mask: LayerMask::ALL,
        }
    }

    fn explosion(line_of_sight: bool, pulses: u32) -> DeliveryModule {
        DeliveryModule::Explosion {
            radius: 5.0,
            line_of_sight,
            los_padding: None,
            fuse: 0.0,
            pulses,
            pulse_interval: 0.25,
        }
    }

    #[test]
    fn test_instant_fans_out_on_first_step() {
        let mut scene = SphereScene::new();
        let caster = scene.spawn_at(Vec3::ZERO);
        let targets = vec![Target::Entity(caster), Target::Point(Vec3::ONE)];
        let mut run = DeliveryRun::start(
            &DeliveryModule::Instant,
            &scene,
            &CombatConfig::default(),
            &ctx(caster, Vec3::X),
            targets.clone(),
        );

        let mut impacts = Vec::new();
        assert!(run.step(&mut scene, 0.0, &mut impacts));
        assert_eq!(impacts, targets);
        assert!(run.step(&mut scene, 0.1, &mut impacts));
        assert_eq!(impacts.len(), 2);
    }

    #[test]
    fn test_dash_is_flattened() {
        let mut scene = SphereScene::new();
        let caster = scene.spawn_at(Vec3::ZERO);
        let module = DeliveryModule::Dash {
            distance: 6.0,
            duration: 0.15,
            flatten: true,
        };
        let mut run = DeliveryRun::start(
            &module,
            &scene,
            &CombatConfig::default(),
            &ctx(caster, Vec3::new(1.0, 1.0, 0.0)),
            Vec::new(),
        );

        let mut impacts = Vec::new();
        let mut steps = 0;
        while !run.step(&mut scene, 0.05, &mut impacts) {
            steps += 1;
            assert!(steps < 10);
        }
        assert!(impacts.is_empty());
        assert_eq!(scene.position(caster), Some(Vec3::X * 6.0));
    }

    #[test]
    fn test_fuse_delays_first_pulse() {
        let mut scene = SphereScene::new();
        let caster = scene.spawn_at(Vec3::ZERO);
        let target = scene.spawn_at(Vec3::X * 3.0);
        scene.attach_sphere(target, SphereCollider::new(0.5));
        let module = DeliveryModule::Explosion {
            radius: 5.0,
            line_of_sight: false,
            los_padding: None,
            fuse: 0.5,
            pulses: 1,
            pulse_interval: 0.25,
        };
        let mut run = DeliveryRun::start(
            &module,
            &scene,
            &CombatConfig::default(),
            &ctx(caster, Vec3::X),
            vec![Target::Entity(caster)],
        );

        let mut impacts = Vec::new();
        assert!(!run.step(&mut scene, 0.0, &mut impacts));
        assert!(!run.step(&mut scene, 0.25, &mut impacts));
        assert!(impacts.is_empty());
        assert!(run.step(&mut scene, 0.25, &mut impacts));
        assert_eq!(impacts.len(), 1);
    }

    #[test]
    fn test_pulses_requery_each_time() {
        let mut scene = SphereScene::new();
        let caster = scene.spawn_at(Vec3::ZERO);
        let target = scene.spawn_at(Vec3::X * 3.0);
        scene.attach_sphere(target, SphereCollider::new(0.5));
        let mut run = DeliveryRun::start(
            &explosion(false, 3),
            &scene,
            &CombatConfig::default(),
            &ctx(caster, Vec3::X),
            vec![Target::Point(Vec3::ZERO)],
        );

        let mut impacts = Vec::new();
        let mut steps = 0;
        assert!(!run.step(&mut scene, 0.0, &mut impacts));
        while !run.step(&mut scene, 0.05, &mut impacts) {
            steps += 1;
            assert!(steps < 40);
        }
        assert_eq!(impacts.len(), 3);
    }

    #[test]
    fn test_line_of_sight_rejects_hidden_targets() {
        let mut scene = SphereScene::new();
        let caster = scene.spawn_at(Vec3::ZERO);
        let wall = scene.spawn_at(Vec3::X * 2.0);
        let wall_collider = scene.attach_sphere(wall, SphereCollider::new(0.6));
        let hidden = scene.spawn_at(Vec3::X * 4.0);
        scene.attach_sphere(hidden, SphereCollider::new(0.5));
        let exposed = scene.spawn_at(Vec3::Z * 3.0);
        let exposed_collider = scene.attach_sphere(exposed, SphereCollider::new(0.5));

        let mut run = DeliveryRun::start(
            &explosion(true, 1),
            &scene,
            &CombatConfig::default(),
            &ctx(caster, Vec3::X),
            vec![Target::Entity(caster)],
        );
        let mut impacts = Vec::new();
        assert!(run.step(&mut scene, 0.0, &mut impacts));

        assert_eq!(impacts.len(), 2);
        assert!(impacts.contains(&Target::Collider(wall_collider)));
        assert!(impacts.contains(&Target::Collider(exposed_collider)));
    }
}
