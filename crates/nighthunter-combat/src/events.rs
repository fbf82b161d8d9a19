//! Event bus for combat notifications.
//!
//! Everything the core reports to the outside world (death, ammo changes,
//! hit/miss lines for presentation) goes through here. Events carry no
//! gameplay semantics of their own: the state change has already happened
//! when an event is published.

use crossbeam_channel::{bounded, Receiver, Sender};
use nighthunter_common::{AbilityId, ColliderHandle, EntityId, ModifierHandle, WeaponId};
use serde::{Deserialize, Serialize};

use glam::Vec3;

/// Event types that can be sent through the event bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CombatEvent {
    /// Combatant took damage after the modifier chain ran
    Damaged {
        /// Entity that was hit
        entity: EntityId,
        /// Amount requested by the attacker
        raw: i32,
        /// Amount actually subtracted from hit points
        applied: i32,
        /// Hit points left
        remaining: i32,
    },
    /// Combatant reached zero hit points (published at most once per combatant)
    Died {
        /// Entity that died
        entity: EntityId,
    },
    /// Dead combatant was removed from the world
    Despawned {
        /// Entity removed
        entity: EntityId,
    },
    /// Clip or reserve of a weapon changed
    AmmoChanged {
        /// Owner of the weapon controller
        owner: EntityId,
        /// Weapon whose ammo changed
        weapon: WeaponId,
        /// Rounds in the clip
        clip: i32,
        /// Rounds in reserve
        reserve: i32,
    },
    /// Weapon began reloading
    ReloadStarted {
        /// Owner of the weapon controller
        owner: EntityId,
        /// Weapon being reloaded
        weapon: WeaponId,
        /// Seconds until the reload completes
        duration: f32,
    },
    /// Hitscan or melee trace for presentation (shot line)
    ShotTraced {
        /// Shooter
        owner: EntityId,
        /// Start of the line
        origin: Vec3,
        /// End of the line (hit point or max range)
        end: Vec3,
        /// Whether something was hit
        hit: bool,
    },
    /// Something was struck (for impact VFX/SFX)
    Impact {
        /// Contact point
        point: Vec3,
        /// Surface normal
        normal: Vec3,
        /// Collider struck
        collider: ColliderHandle,
    },
    /// Heavy hit wants a brief global time dilation
    HitstopRequested {
        /// Entity that landed the hit
        source: EntityId,
        /// Duration in seconds
        duration: f32,
    },
    /// A projectile entity was spawned
    ProjectileSpawned {
        /// Projectile entity
        projectile: EntityId,
        /// Shooter
        owner: EntityId,
    },
    /// Ability cast began
    CastStarted {
        /// Caster
        caster: EntityId,
        /// Ability cast
        ability: AbilityId,
    },
    /// Ability cast finished delivering and went on cooldown
    CastFinished {
        /// Caster
        caster: EntityId,
        /// Ability cast
        ability: AbilityId,
        /// Number of impacts delivered
        impacts: u32,
    },
    /// A damage modifier terminated and left its owner's chain
    ModifierExpired {
        /// Combatant that carried the modifier
        owner: EntityId,
        /// Modifier removed
        handle: ModifierHandle,
    },
    /// A decoy entity was spawned
    DecoySpawned {
        /// Decoy entity
        decoy: EntityId,
        /// Spawn position
        position: Vec3,
    },
    /// A decoy's lifetime ran out
    DecoyExpired {
        /// Decoy entity
        decoy: EntityId,
    },
    /// Equipped/backup weapons changed
    LoadoutChanged {
        /// Owner of the loadout
        owner: EntityId,
        /// Equipped weapon
        equipped: WeaponId,
        /// Backup weapon
        backup: WeaponId,
    },
}

impl CombatEvent {
    /// Short variant name, for logs and tallies.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Damaged { .. } => "damaged",
            Self::Died { .. } => "died",
            Self::Despawned { .. } => "despawned",
            Self::AmmoChanged { .. } => "ammo_changed",
            Self::ReloadStarted { .. } => "reload_started",
            Self::ShotTraced { .. } => "shot_traced",
            Self::Impact { .. } => "impact",
            Self::HitstopRequested { .. } => "hitstop_requested",
            Self::ProjectileSpawned { .. } => "projectile_spawned",
            Self::CastStarted { .. } => "cast_started",
            Self::CastFinished { .. } => "cast_finished",
            Self::ModifierExpired { .. } => "modifier_expired",
            Self::DecoySpawned { .. } => "decoy_spawned",
            Self::DecoyExpired { .. } => "decoy_expired",
            Self::LoadoutChanged { .. } => "loadout_changed",
        }
    }

    /// Returns the entity if this is a death notification.
    #[must_use]
    pub fn death_of(&self) -> Option<EntityId> {
        match self {
            Self::Died { entity } => Some(*entity),
            _ => None,
        }
    }
}

/// Event bus for broadcasting events to subscribers.
pub struct EventBus {
    /// Sender for broadcasting events
    sender: Sender<CombatEvent>,
    /// Receiver for collecting events
    receiver: Receiver<CombatEvent>,
    /// Channel capacity
    capacity: usize,
    /// Synchronous subscribers, invoked in subscription order
    handlers: Vec<Box<dyn EventHandler>>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("pending", &self.receiver.len())
            .field("capacity", &self.capacity)
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl EventBus {
    /// Creates a new event bus with the given capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity.max(1));
        Self {
            sender,
            receiver,
            capacity: capacity.max(1),
            handlers: Vec::new(),
        }
    }

    /// Registers a synchronous subscriber.
    pub fn subscribe(&mut self, handler: Box<dyn EventHandler>) {
        self.handlers.push(handler);
    }

    /// Publishes an event to the bus.
    pub fn publish(&self, event: CombatEvent) {
        for handler in &self.handlers {
            handler.handle(&event);
        }
        // Non-blocking send - if full, event is dropped
        if self.sender.try_send(event).is_err() {
            tracing::trace!("Event bus full, dropping event");
        }
    }

    /// Drains all pending events.
    pub fn drain(&self) -> Vec<CombatEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.receiver.try_recv() {
            events.push(event);
        }
        events
    }

    /// Returns the number of pending events.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }

    /// Returns the channel capacity.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Typed event handler trait.
pub trait EventHandler: Send + Sync {
    /// Handles an event.
    fn handle(&self, event: &CombatEvent);
}
