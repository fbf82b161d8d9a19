//! Projectile launch construction for ranged weapons.

use glam::Vec3;
use nighthunter_common::{EntityId, LayerMask};

use super::definition::{WeaponDefinition, WeaponKind};
use crate::world::ProjectileLaunch;

impl ProjectileLaunch {
    /// Builds the launch for a ranged weapon's shot.
    ///
    /// Returns `None` unless the weapon is [`WeaponKind::Ranged`] with
    /// projectile parameters.
    #[must_use]
    pub fn from_weapon(
        def: &WeaponDefinition,
        owner: EntityId,
        origin: Vec3,
        direction: Vec3,
        mask: LayerMask,
    ) -> Option<Self> {
        if def.kind != WeaponKind::Ranged {
            return None;
        }
        let params = def.projectile?;
        Some(Self {
            owner,
            origin,
            direction: direction.normalize_or_zero(),
            speed: params.speed,
            damage: def.damage,
            impulse: def.impulse,
            lifetime: params.lifetime.max(0.0),
            radius: params.radius.max(0.0),
            mask,
        })
    }
}
