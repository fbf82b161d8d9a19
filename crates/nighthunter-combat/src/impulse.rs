//! Impulse resolution and knockback.
//!
//! A hit pushes its target one of two ways: a dynamic physics body receives
//! an instantaneous impulse, otherwise a [`KnockbackReceiver`] found on the
//! struck entity (or an ancestor) accumulates a decaying push velocity that
//! it integrates into character-controller moves each tick.

use ahash::AHashMap;
use glam::Vec3;
use nighthunter_common::{flatten, move_towards, ColliderHandle, EntityId};

use crate::host::{collider_ancestry, CombatHost};

/// Squared speed below which a receiver stops moving.
const REST_THRESHOLD_SQ: f32 = 1e-4;

/// Knockback accumulator for entities without a dynamic body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KnockbackReceiver {
    impact: Vec3,
    drag: f32,
    mass: f32,
}

impl KnockbackReceiver {
    /// Creates a receiver with linear `drag` (units/s²) and `mass`.
    #[must_use]
    pub fn new(drag: f32, mass: f32) -> Self {
        Self {
            impact: Vec3::ZERO,
            drag: drag.max(0.0),
            mass: mass.max(0.01),
        }
    }

    /// Adds a horizontal push. Purely vertical directions are ignored.
    pub fn add_impact(&mut self, direction: Vec3, force: f32) {
        let dir = flatten(direction);
        if dir == Vec3::ZERO {
            return;
        }
        self.impact += dir * (force / self.mass);
    }

    /// Current push velocity.
    #[must_use]
    pub fn velocity(&self) -> Vec3 {
        self.impact
    }

    /// Returns true when there is nothing left to integrate.
    #[must_use]
    pub fn is_at_rest(&self) -> bool {
        self.impact.length_squared() <= REST_THRESHOLD_SQ
    }

    /// Advances one tick and returns the displacement to apply.
    pub fn step(&mut self, dt: f32) -> Vec3 {
        if self.is_at_rest() {
            self.impact = Vec3::ZERO;
            return Vec3::ZERO;
        }
        let displacement = self.impact * dt;
        self.impact = move_towards(self.impact, Vec3::ZERO, self.drag * dt);
        displacement
    }
}

/// How an impulse was delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImpulseOutcome {
    /// Applied to a dynamic body
    Body,
    /// Accumulated into the receiver on this entity
    Knockback(EntityId),
    /// Target has neither capability
    Ignored,
}

/// Pushes the target behind `collider` along `direction` with `magnitude`.
pub fn apply_impulse<H: CombatHost + ?Sized>(
    host: &mut H,
    receivers: &mut AHashMap<EntityId, KnockbackReceiver>,
    collider: ColliderHandle,
    direction: Vec3,
    magnitude: f32,
) -> ImpulseOutcome {
    let direction = direction.normalize_or_zero();
    if host.apply_body_impulse(collider, direction * magnitude) {
        return ImpulseOutcome::Body;
    }

    let owner = collider_ancestry(&*host, collider).find(|e| receivers.contains_key(e));
    match owner.and_then(|e| receivers.get_mut(&e).map(|r| (e, r))) {
        Some((entity, receiver)) => {
            receiver.add_impact(direction, magnitude);
            ImpulseOutcome::Knockback(entity)
        },
        None => ImpulseOutcome::Ignored,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::Transforms;
    use crate::scene::{SphereCollider, SphereScene};

    #[test]
    fn test_knockback_decays_within_expected_time() {
        let mut r = KnockbackReceiver::new(8.0, 1.0);
        r.add_impact(Vec3::X, 6.0);
        assert_eq!(r.velocity(), Vec3::X * 6.0);

        let dt = 1.0 / 60.0;
        let mut travelled = Vec3::ZERO;
        for _ in 0..45 {
            travelled += r.step(dt);
        }
        assert!(r.velocity().length() < 1e-3);
        // Area under a linear ramp from 6 to 0 over 0.75s, sampled at the start of each tick.
        assert!(travelled.x > 2.2 && travelled.x < 2.35);
        assert_eq!(travelled.y, 0.0);
    }

    #[test]
    fn test_knockback_flattens_and_divides_by_mass() {
        let mut r = KnockbackReceiver::new(8.0, 2.0);
        r.add_impact(Vec3::new(0.0, 3.0, 4.0), 6.0);
        assert!((r.velocity() - Vec3::Z * 3.0).length() < 1e-5);

        let mut up = KnockbackReceiver::new(8.0, 1.0);
        up.add_impact(Vec3::Y, 6.0);
        assert!(up.is_at_rest());
    }

    #[test]
    fn test_resolver_prefers_body_then_receiver_in_ancestry() {
        let mut scene = SphereScene::new();
        let mut receivers = AHashMap::new();

        let barrel = scene.spawn_at(Vec3::ZERO);
        let barrel_col = scene.attach_sphere(barrel, SphereCollider::new(0.5).dynamic(1.0));

        let ghoul = scene.spawn_at(Vec3::X * 5.0);
        let arm = scene.spawn_child(ghoul, Vec3::Y);
        let arm_col = scene.attach_sphere(arm, SphereCollider::new(0.2));
        receivers.insert(ghoul, KnockbackReceiver::new(8.0, 1.0));

        let rock = scene.spawn_at(Vec3::Z * 5.0);
        let rock_col = scene.attach_sphere(rock, SphereCollider::new(1.0));

        assert_eq!(
            apply_impulse(&mut scene, &mut receivers, barrel_col, Vec3::X, 6.0),
            ImpulseOutcome::Body
        );
        assert_eq!(scene.received_impulse(barrel_col), Vec3::X * 6.0);

        assert_eq!(
            apply_impulse(&mut scene, &mut receivers, arm_col, Vec3::X, 6.0),
            ImpulseOutcome::Knockback(ghoul)
        );
        assert_eq!(receivers[&ghoul].velocity(), Vec3::X * 6.0);

        assert_eq!(
            apply_impulse(&mut scene, &mut receivers, rock_col, Vec3::X, 6.0),
            ImpulseOutcome::Ignored
        );
        assert_eq!(scene.position(rock), Some(Vec3::Z * 5.0));
    }
}
