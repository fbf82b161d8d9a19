//! Damage modifiers.
//!
//! A combatant carries an ordered [`ModifierChain`]. Incoming damage passes
//! through each modifier in attach order; each one may transform the amount
//! and may terminate on its own schedule. Terminated modifiers are removed by
//! [`ModifierChain::reap`], which also fires their completion callbacks.

use nighthunter_common::ModifierHandle;
use serde::{Deserialize, Serialize};

/// Transforms incoming damage for the combatant it is attached to.
pub trait DamageModifier: std::fmt::Debug + Send {
    /// Returns the damage that passes through this modifier.
    fn modify(&mut self, incoming: i32, now: f32) -> i32;

    /// Returns true once the modifier should leave the chain.
    fn is_terminated(&self, now: f32) -> bool;
}

/// Called once with the modifier's handle when it terminates.
pub type CompletionCallback = Box<dyn FnOnce(ModifierHandle) + Send>;

struct ChainEntry {
    handle: ModifierHandle,
    modifier: Box<dyn DamageModifier>,
    on_complete: Option<CompletionCallback>,
}

/// Ordered list of active damage modifiers.
#[derive(Default)]
pub struct ModifierChain {
    entries: Vec<ChainEntry>,
}

impl std::fmt::Debug for ModifierChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|e| (e.handle, &e.modifier)))
            .finish()
    }
}

impl ModifierChain {
    /// Creates an empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a modifier.
    pub fn attach(&mut self, modifier: Box<dyn DamageModifier>) -> ModifierHandle {
        self.push(modifier, None)
    }

    /// Appends a modifier with a completion callback.
    pub fn attach_with_callback(
        &mut self,
        modifier: Box<dyn DamageModifier>,
        on_complete: CompletionCallback,
    ) -> ModifierHandle {
        self.push(modifier, Some(on_complete))
    }

    fn push(
        &mut self,
        modifier: Box<dyn DamageModifier>,
        on_complete: Option<CompletionCallback>,
    ) -> ModifierHandle {
        let handle = ModifierHandle::new();
        self.entries.push(ChainEntry {
            handle,
            modifier,
            on_complete,
        });
        handle
    }

    /// Removes a modifier without firing its callback.
    pub fn detach(&mut self, handle: ModifierHandle) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.handle != handle);
        self.entries.len() != before
    }

    /// Runs `incoming` through every modifier in attach order.
    pub fn apply(&mut self, incoming: i32, now: f32) -> i32 {
        self.entries
            .iter_mut()
            .fold(incoming, |amount, entry| entry.modifier.modify(amount, now))
    }

    /// Removes terminated modifiers, fires their callbacks, and returns their
    /// handles in chain order.
    pub fn reap(&mut self, now: f32) -> Vec<ModifierHandle> {
        let mut removed = Vec::new();
        let mut kept = Vec::with_capacity(self.entries.len());
        for entry in self.entries.drain(..) {
            if entry.modifier.is_terminated(now) {
                removed.push(entry);
            } else {
                kept.push(entry);
            }
        }
        self.entries = kept;

        removed
            .into_iter()
            .map(|entry| {
                if let Some(callback) = entry.on_complete {
                    callback(entry.handle);
                }
                entry.handle
            })
            .collect()
    }

    /// Returns true if the handle is still attached.
    #[must_use]
    pub fn contains(&self, handle: ModifierHandle) -> bool {
        self.entries.iter().any(|e| e.handle == handle)
    }

    /// Number of attached modifiers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is attached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Parameters of a shield.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShieldSpec {
    /// Damage the pool can soak up
    #[serde(default = "default_shield_absorb")]
    pub absorb: i32,
    /// Fraction of incoming damage removed before the pool (0..=1)
    #[serde(default = "default_shield_reduce")]
    pub reduce_percent: f32,
    /// Hits before the shield breaks (0 = unlimited)
    #[serde(default)]
    pub max_hits: u32,
    /// Lifetime in seconds
    #[serde(default = "default_shield_duration")]
    pub duration: f32,
}

const fn default_shield_absorb() -> i32 {
    60
}

const fn default_shield_reduce() -> f32 {
    0.3
}

const fn default_shield_duration() -> f32 {
    5.0
}

impl Default for ShieldSpec {
    fn default() -> Self {
        Self {
            absorb: default_shield_absorb(),
            reduce_percent: default_shield_reduce(),
            max_hits: 0,
            duration: default_shield_duration(),
        }
    }
}

/// Timed damage shield: percent reduction first, then an absorb pool.
#[derive(Debug, Clone, PartialEq)]
pub struct Shield {
    pool: i32,
    reduce_percent: f32,
    max_hits: u32,
    hits_taken: u32,
    expires_at: f32,
}

impl Shield {
    /// Creates a shield that expires `spec.duration` seconds after `now`.
    #[must_use]
    pub fn new(spec: &ShieldSpec, now: f32) -> Self {
        Self {
            pool: spec.absorb.max(0),
            reduce_percent: spec.reduce_percent.clamp(0.0, 1.0),
            max_hits: spec.max_hits,
            hits_taken: 0,
            expires_at: now + spec.duration.max(0.0),
        }
    }

    /// Damage left in the absorb pool.
    #[must_use]
    pub fn pool(&self) -> i32 {
        self.pool
    }

    /// Hits taken while active.
    #[must_use]
    pub fn hits_taken(&self) -> u32 {
        self.hits_taken
    }

    /// Time the shield expires.
    #[must_use]
    pub fn expires_at(&self) -> f32 {
        self.expires_at
    }
}

impl DamageModifier for Shield {
    fn modify(&mut self, incoming: i32, now: f32) -> i32 {
        if now >= self.expires_at {
            return incoming;
        }

        let reduced = (incoming as f32 * (1.0 - self.reduce_percent)).round_ties_even() as i32;
        let spent = reduced.clamp(0, self.pool);
        self.pool -= spent;
        self.hits_taken += 1;
        reduced - spent
    }

    fn is_terminated(&self, now: f32) -> bool {
        now >= self.expires_at
            || (self.max_hits > 0 && self.hits_taken >= self.max_hits)
            || (self.pool == 0 && self.reduce_percent == 0.0)
    }
}
