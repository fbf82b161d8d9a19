//! Two-slot weapon loadout (equipped + backup).

use nighthunter_common::WeaponId;
use tracing::debug;

use super::controller::WeaponController;
use crate::events::CombatEvent;
use crate::world::CombatWorld;

/// Equipped and backup slots driving a [`WeaponController`].
#[derive(Debug)]
pub struct WeaponLoadout {
    controller: WeaponController,
    equipped: WeaponId,
    backup: WeaponId,
}

impl WeaponLoadout {
    /// Takes ownership of the starting weapons and equips the first.
    pub fn new(
        world: &CombatWorld,
        mut controller: WeaponController,
        start_equipped: WeaponId,
        start_backup: WeaponId,
    ) -> Self {
        controller.add_weapon(world, start_equipped, 0, false);
        controller.add_weapon(world, start_backup, 0, false);
        if start_equipped.is_some() {
            controller.equip(world, start_equipped);
        }

        let loadout = Self {
            controller,
            equipped: start_equipped,
            backup: start_backup,
        };
        loadout.publish(world);
        loadout
    }

    /// Equipped slot.
    #[must_use]
    pub fn equipped(&self) -> WeaponId {
        self.equipped
    }

    /// Backup slot.
    #[must_use]
    pub fn backup(&self) -> WeaponId {
        self.backup
    }

    /// Underlying controller.
    #[must_use]
    pub fn controller(&self) -> &WeaponController {
        &self.controller
    }

    /// Underlying controller, for fire/reload/tick.
    pub fn controller_mut(&mut self) -> &mut WeaponController {
        &mut self.controller
    }

    /// Exchanges equipped and backup. Does nothing when the backup slot is
    /// empty and a weapon is equipped.
    pub fn swap(&mut self, world: &CombatWorld) {
        if !self.backup.is_some() && self.equipped.is_some() {
            return;
        }
        std::mem::swap(&mut self.equipped, &mut self.backup);
        if self.equipped.is_some() {
            self.controller.equip(world, self.equipped);
        }
        self.publish(world);
    }

    /// Picks up a weapon into the backup slot, returning the weapon it
    /// replaced (or [`WeaponId::NONE`]).
    pub fn pickup_as_backup(
        &mut self,
        world: &CombatWorld,
        weapon: WeaponId,
        reserve: i32,
        auto_swap: bool,
    ) -> WeaponId {
        if !weapon.is_some() {
            return WeaponId::NONE;
        }
        self.controller.add_weapon(world, weapon, reserve, false);

        let dropped = std::mem::replace(&mut self.backup, weapon);
        if auto_swap {
            self.swap(world);
        } else {
            self.publish(world);
        }
        debug!("Picked up {} (dropped {})", weapon, dropped);
        dropped
    }

    /// Equips `weapon` immediately; the previously equipped weapon moves to
    /// the backup slot and is returned.
    pub fn force_equip(&mut self, world: &CombatWorld, weapon: WeaponId, reserve: i32) -> WeaponId {
        if !weapon.is_some() {
            return WeaponId::NONE;
        }
        self.controller.add_weapon(world, weapon, reserve, false);

        let displaced = std::mem::replace(&mut self.equipped, weapon);
        self.backup = displaced;
        self.controller.equip(world, weapon);
        self.publish(world);
        displaced
    }

    fn publish(&self, world: &CombatWorld) {
        world.events().publish(CombatEvent::LoadoutChanged {
            owner: self.controller.owner(),
            equipped: self.equipped,
            backup: self.backup,
        });
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::catalog::StaticCatalog;
    use crate::weapons::{WeaponDefinition, WeaponKind, WeaponRegistry};
    use nighthunter_common::EntityId;

    const PISTOL: WeaponId = WeaponId::new(1);
    const SHOTGUN: WeaponId = WeaponId::new(2);
    const KNIFE: WeaponId = WeaponId::new(3);

    fn loadout(world: &CombatWorld, equipped: WeaponId, backup: WeaponId) -> WeaponLoadout {
        let source = StaticCatalog::new()
            .with_weapon(WeaponDefinition::new(PISTOL, WeaponKind::Hitscan).with_ammo(8, 1.0))
            .with_weapon(WeaponDefinition::new(SHOTGUN, WeaponKind::Hitscan).with_ammo(2, 2.0))
            .with_weapon(WeaponDefinition::new(KNIFE, WeaponKind::Melee).with_range(1.5));
        let mut registry = WeaponRegistry::new();
        registry.load(&source).expect("load");
        let controller = WeaponController::new(EntityId::new(), Arc::new(registry));
        WeaponLoadout::new(world, controller, equipped, backup)
    }

    fn last_change(world: &CombatWorld) -> Option<(WeaponId, WeaponId)> {
        world.events().drain().into_iter().rev().find_map(|e| match e {
            CombatEvent::LoadoutChanged { equipped, backup, .. } => Some((equipped, backup)),
            _ => None,
        })
    }

    #[test]
    fn test_start_loadout_is_owned_and_equipped() {
        let world = CombatWorld::default();
        let l = loadout(&world, PISTOL, KNIFE);
        assert_eq!(l.controller().active_weapon(), PISTOL);
        assert!(l.controller().has_weapon(KNIFE));
        assert_eq!(last_change(&world), Some((PISTOL, KNIFE)));
    }

    #[test]
    fn test_swap() {
        let world = CombatWorld::default();
        let mut l = loadout(&world, PISTOL, KNIFE);
        l.swap(&world);
        assert_eq!((l.equipped(), l.backup()), (KNIFE, PISTOL));
        assert_eq!(l.controller().active_weapon(), KNIFE);

        let mut solo = loadout(&world, PISTOL, WeaponId::NONE);
        let _ = world.events().drain();
        solo.swap(&world);
        assert_eq!(solo.equipped(), PISTOL);
        assert_eq!(last_change(&world), None);
    }

    #[test]
    fn test_pickup_replaces_backup() {
        let world = CombatWorld::default();
        let mut l = loadout(&world, PISTOL, KNIFE);

        assert_eq!(l.pickup_as_backup(&world, SHOTGUN, 12, false), KNIFE);
        assert_eq!((l.equipped(), l.backup()), (PISTOL, SHOTGUN));
        assert_eq!(l.controller().ammo_of(SHOTGUN).map(|a| a.reserve), Some(102));

        assert_eq!(l.pickup_as_backup(&world, KNIFE, 0, true), SHOTGUN);
        assert_eq!((l.equipped(), l.backup()), (KNIFE, PISTOL));
        assert_eq!(l.pickup_as_backup(&world, WeaponId::NONE, 0, true), WeaponId::NONE);
    }

    #[test]
    fn test_force_equip_displaces_to_backup() {
        let world = CombatWorld::default();
        let mut l = loadout(&world, PISTOL, KNIFE);
        assert_eq!(l.force_equip(&world, SHOTGUN, 0), PISTOL);
        assert_eq!((l.equipped(), l.backup()), (SHOTGUN, PISTOL));
        assert_eq!(l.controller().active_weapon(), SHOTGUN);
        assert_eq!(last_change(&world), Some((SHOTGUN, PISTOL)));
    }
}
