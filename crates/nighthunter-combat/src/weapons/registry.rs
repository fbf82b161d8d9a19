//! Weapon registry with fast lookup.

use ahash::AHashMap;
use nighthunter_common::WeaponId;
use tracing::{debug, info, warn};

use super::definition::WeaponDefinition;
use crate::catalog::{CatalogError, CatalogResult, CatalogSource};

/// Weapon registry, loaded once from a [`CatalogSource`].
#[derive(Debug, Default)]
pub struct WeaponRegistry {
    /// Weapons by ID.
    by_id: AHashMap<WeaponId, WeaponDefinition>,
    /// IDs in registration order.
    order: Vec<WeaponId>,
    /// Whether `load` already ran.
    loaded: bool,
}

impl WeaponRegistry {
    /// Creates a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads every definition from `source`. Later calls return the current
    /// count without touching the source.
    ///
    /// Invalid and duplicate entries are dropped with a warning; the first
    /// entry for an id wins.
    pub fn load(&mut self, source: &dyn CatalogSource) -> CatalogResult<usize> {
        if self.loaded {
            return Ok(self.len());
        }

        let definitions = source.load_weapon_definitions()?;
        self.loaded = true;

        for weapon in definitions {
            let id = weapon.id;
            if let Err(e) = weapon.validate().and_then(|()| self.register(weapon)) {
                warn!("Skipping weapon {}: {}", id, e);
            }
        }

        info!("Loaded {} weapons", self.len());
        Ok(self.len())
    }

    /// Returns true once `load` has run.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Registers a weapon.
    pub fn register(&mut self, weapon: WeaponDefinition) -> CatalogResult<()> {
        if self.by_id.contains_key(&weapon.id) {
            return Err(CatalogError::DuplicateId(weapon.id.raw()));
        }

        let id = weapon.id;
        debug!("Registered weapon {} ({})", id, weapon.name);
        self.order.push(id);
        self.by_id.insert(id, weapon);
        Ok(())
    }

    /// Returns the number of registered weapons.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Returns true if the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Gets a weapon by ID.
    #[must_use]
    pub fn get(&self, id: WeaponId) -> Option<&WeaponDefinition> {
        self.by_id.get(&id)
    }

    /// Returns weapons in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &WeaponDefinition> {
        self.order.iter().filter_map(|id| self.by_id.get(id))
    }
}
