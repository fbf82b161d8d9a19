//! Geometry types shared by spatial queries and combat resolution.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// A ray with a normalized direction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ray {
    /// Start of the ray
    pub origin: Vec3,
    /// Unit direction (zero only if constructed from a zero vector)
    pub direction: Vec3,
}

impl Ray {
    /// Creates a ray, normalizing the direction.
    #[must_use]
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Creates a ray from `origin` pointing at `target`.
    #[must_use]
    pub fn towards(origin: Vec3, target: Vec3) -> Self {
        Self::new(origin, target - origin)
    }

    /// Returns the point `distance` units along the ray.
    #[must_use]
    pub fn point_at(&self, distance: f32) -> Vec3 {
        self.origin + self.direction * distance
    }
}

impl Default for Ray {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Vec3::NEG_Z)
    }
}

/// Result of a ray or sweep query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RayHit {
    /// World-space contact point
    pub point: Vec3,
    /// Surface normal at the contact point
    pub normal: Vec3,
    /// Collider that was hit
    pub collider: crate::ColliderHandle,
    /// Distance from the query origin to the contact
    pub distance: f32,
}

/// Bit mask of collision layers a query accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerMask(u32);

impl LayerMask {
    /// Accepts every layer.
    pub const ALL: Self = Self(u32::MAX);

    /// Accepts nothing.
    pub const NONE: Self = Self(0);

    /// Creates a mask from raw bits.
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Creates a mask containing a single layer (0..32).
    #[must_use]
    pub const fn layer(index: u8) -> Self {
        Self(1u32 << (index & 31))
    }

    /// Returns the raw bits.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Returns true if any layer in `layers` is accepted.
    #[must_use]
    pub const fn accepts(self, layers: Self) -> bool {
        self.0 & layers.0 != 0
    }

    /// Union of two masks.
    #[must_use]
    pub const fn with(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// This mask without the given layers.
    #[must_use]
    pub const fn without(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }
}

impl Default for LayerMask {
    fn default() -> Self {
        Self::ALL
    }
}

/// Moves `current` towards `target` by at most `max_delta`.
#[must_use]
pub fn move_towards(current: Vec3, target: Vec3, max_delta: f32) -> Vec3 {
    let delta = target - current;
    let distance = delta.length();
    if distance <= max_delta || distance <= f32::EPSILON {
        target
    } else {
        current + delta / distance * max_delta
    }
}

/// Projects a direction onto the horizontal plane and renormalizes it.
///
/// Returns zero for purely vertical input.
#[must_use]
pub fn flatten(direction: Vec3) -> Vec3 {
    Vec3::new(direction.x, 0.0, direction.z).normalize_or_zero()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_towards_clamps_to_target() {
        let v = move_towards(Vec3::new(6.0, 0.0, 0.0), Vec3::ZERO, 0.4);
        assert!((v.x - 5.6).abs() < 1e-5);

        let v = move_towards(Vec3::new(0.3, 0.0, 0.0), Vec3::ZERO, 0.4);
        assert_eq!(v, Vec3::ZERO);
    }

    #[test]
    fn test_flatten() {
        let d = flatten(Vec3::new(1.0, 5.0, 0.0));
        assert_eq!(d, Vec3::X);
        assert_eq!(flatten(Vec3::Y), Vec3::ZERO);
    }

    #[test]
    fn test_layer_mask() {
        let enemies = LayerMask::layer(3);
        let world = LayerMask::layer(0);
        let mask = enemies.with(world);

        assert!(mask.accepts(enemies));
        assert!(!mask.without(enemies).accepts(enemies));
        assert!(LayerMask::ALL.accepts(world));
        assert!(!LayerMask::NONE.accepts(world));
    }

    #[test]
    fn test_layer_mask_serde_transparent() {
        let json = serde_json::to_string(&LayerMask::layer(2)).expect("serialize");
        assert_eq!(json, "4");
    }
}
