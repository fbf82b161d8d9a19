//! Hit points and the damage pipeline.

use nighthunter_common::ModifierHandle;
use serde::{Deserialize, Serialize};

use crate::modifiers::{DamageModifier, ModifierChain};

/// Hit-point record of a combatant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    max: i32,
    current: i32,
    dead: bool,
}

impl Health {
    /// Creates a full health record.
    #[must_use]
    pub fn new(max: i32) -> Self {
        let max = max.max(1);
        Self {
            max,
            current: max,
            dead: false,
        }
    }

    /// Maximum hit points.
    #[must_use]
    pub const fn max(&self) -> i32 {
        self.max
    }

    /// Current hit points.
    #[must_use]
    pub const fn current(&self) -> i32 {
        self.current
    }

    /// Returns true once the death transition happened.
    #[must_use]
    pub const fn is_dead(&self) -> bool {
        self.dead
    }

    /// Current health as a fraction of max (for HUD bars).
    #[must_use]
    pub fn fraction(&self) -> f32 {
        self.current as f32 / self.max as f32
    }
}

/// What a single `take_damage` call did.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DamageReport {
    /// Amount requested
    pub raw: i32,
    /// Amount subtracted after modifiers and clamping
    pub applied: i32,
    /// Hit points left
    pub remaining: i32,
    /// This call caused the death transition
    pub died: bool,
    /// Modifiers that terminated during this hit
    pub expired: Vec<ModifierHandle>,
    /// The combatant was already dead and nothing happened
    pub ignored: bool,
}

/// Health plus the modifiers guarding it.
#[derive(Debug, Default)]
pub struct Combatant {
    health: Health,
    modifiers: ModifierChain,
}

impl Default for Health {
    fn default() -> Self {
        Self::new(100)
    }
}

impl Combatant {
    /// Creates a combatant with `max_hit_points`.
    #[must_use]
    pub fn new(max_hit_points: i32) -> Self {
        Self {
            health: Health::new(max_hit_points),
            modifiers: ModifierChain::new(),
        }
    }

    /// Health record.
    #[must_use]
    pub fn health(&self) -> &Health {
        &self.health
    }

    /// Modifier chain.
    #[must_use]
    pub fn modifiers(&self) -> &ModifierChain {
        &self.modifiers
    }

    /// Mutable modifier chain.
    pub fn modifiers_mut(&mut self) -> &mut ModifierChain {
        &mut self.modifiers
    }

    /// Appends a modifier to the chain.
    pub fn attach_modifier(&mut self, modifier: Box<dyn DamageModifier>) -> ModifierHandle {
        self.modifiers.attach(modifier)
    }

    /// Runs `raw` through the modifier chain and subtracts the result.
    ///
    /// Dead combatants ignore damage. Negative amounts never heal.
    pub fn take_damage(&mut self, raw: i32, now: f32) -> DamageReport {
        if self.health.dead {
            return DamageReport {
                raw,
                remaining: self.health.current,
                ignored: true,
                ..DamageReport::default()
            };
        }

        let modified = self.modifiers.apply(raw, now);
        let expired = self.modifiers.reap(now);
        let applied = modified.max(0).min(self.health.current);

        self.health.current -= applied;
        let died = self.health.current == 0;
        if died {
            self.health.dead = true;
        }

        DamageReport {
            raw,
            applied,
            remaining: self.health.current,
            died,
            expired,
            ignored: false,
        }
    }
}
