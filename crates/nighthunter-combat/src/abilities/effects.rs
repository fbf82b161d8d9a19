//! Effect hooks: cast start, each impact, cast end.

use std::sync::Arc;

use glam::Vec3;
use nighthunter_common::{ColliderHandle, ModifierHandle};
use parking_lot::Mutex;
use tracing::debug;

use super::spec::EffectModule;
use super::{AbilityContext, Target};
use crate::host::CombatHost;
use crate::modifiers::{CompletionCallback, Shield};
use crate::world::CombatWorld;

impl EffectModule {
    /// Runs before delivery begins.
    ///
    /// `shield` holds the runner's current shield; a new shield replaces it.
    /// The slot is cleared when the chain reaps the shield.
    pub(crate) fn on_cast_start<H: CombatHost + ?Sized>(
        &self,
        world: &mut CombatWorld,
        host: &mut H,
        ctx: &AbilityContext,
        shield: &Arc<Mutex<Option<ModifierHandle>>>,
    ) {
        match self {
            Self::Shield(spec) => {
                let mut current = shield.lock();
                if let Some(previous) = current.take() {
                    world.detach_modifier(ctx.caster, previous);
                }

                let tracked = Arc::clone(shield);
                let on_complete: CompletionCallback = Box::new(move |handle| {
                    let mut current = tracked.lock();
                    if *current == Some(handle) {
                        *current = None;
                    }
                });
                let now = world.now();
                *current = world.attach_modifier_with_callback(
                    ctx.caster,
                    Box::new(Shield::new(spec, now)),
                    on_complete,
                );
                if current.is_none() {
                    debug!("Shield skipped: {} is not a combatant", ctx.caster);
                }
            },
            Self::SpawnDecoy { lifetime } => {
                let position = host.position(ctx.caster).unwrap_or(ctx.origin);
                world.spawn_decoy(host, ctx.caster, position, *lifetime);
            },
            Self::Damage { .. } => {},
        }
    }

    /// Runs once per impact, in module order.
    pub(crate) fn on_impact<H: CombatHost + ?Sized>(
        &self,
        world: &mut CombatWorld,
        host: &mut H,
        ctx: &AbilityContext,
        target: &Target,
    ) {
        let Self::Damage { damage, impulse } = *self else {
            return;
        };
        match *target {
            Target::Collider(collider) => {
                Self::damage_and_push(world, host, ctx, collider, damage, impulse);
            },
            Target::Entity(entity) => match host.primary_collider(entity) {
                Some(collider) => {
                    Self::damage_and_push(world, host, ctx, collider, damage, impulse);
                },
                None => {
                    if let Some(combatant) = world.combatant_of(&*host, entity) {
                        world.take_damage(combatant, damage);
                    }
                },
            },
            Target::Point(_) => {},
        }
    }

    fn damage_and_push<H: CombatHost + ?Sized>(
        world: &mut CombatWorld,
        host: &mut H,
        ctx: &AbilityContext,
        collider: ColliderHandle,
        damage: i32,
        impulse: f32,
    ) {
        world.damage_collider(&*host, collider, damage);

        let from = host.position(ctx.caster).unwrap_or(Vec3::ZERO);
        let Some(to) = host.collider_center(collider) else {
            return;
        };
        world.apply_impulse(host, collider, (to - from).normalize_or_zero(), impulse);
    }

    /// Runs after delivery completes.
    pub(crate) fn on_cast_end(&self, ctx: &AbilityContext) {
        if let Self::Shield(spec) = self {
            debug!("{} shield cast done ({} absorb)", ctx.caster, spec.absorb);
        }
    }
}
