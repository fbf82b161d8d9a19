//! Timed straight-line movement (dash, melee lunge).

use glam::Vec3;
use nighthunter_common::EntityId;

use crate::host::Transforms;

/// Moves an entity from `start` to `end` over a fixed duration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearMove {
    entity: EntityId,
    start: Vec3,
    end: Vec3,
    elapsed: f32,
    duration: f32,
}

impl LinearMove {
    /// Creates a move; nothing happens until the first [`LinearMove::step`].
    #[must_use]
    pub fn new(entity: EntityId, start: Vec3, end: Vec3, duration: f32) -> Self {
        Self {
            entity,
            start,
            end,
            elapsed: 0.0,
            duration: duration.max(0.0),
        }
    }

    /// Entity being moved.
    #[must_use]
    pub fn entity(&self) -> EntityId {
        self.entity
    }

    /// Destination.
    #[must_use]
    pub fn end(&self) -> Vec3 {
        self.end
    }

    /// Advances by `dt` and moves the entity. Returns true once the entity
    /// has been placed at the destination.
    pub fn step<T: Transforms + ?Sized>(&mut self, host: &mut T, dt: f32) -> bool {
        if self.duration <= 0.0 {
            host.move_to(self.entity, self.end);
            return true;
        }

        self.elapsed = (self.elapsed + dt.max(0.0)).min(self.duration);
        let t = self.elapsed / self.duration;
        host.move_to(self.entity, self.start.lerp(self.end, t));
        self.elapsed >= self.duration
    }
}
