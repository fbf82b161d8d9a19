//! Catalog sources and load errors.
//!
//! Registries pull their definitions from a [`CatalogSource`] exactly once.
//! The simulator reads TOML files from disk; tests and embedders use
//! [`StaticCatalog`].

use nighthunter_common::SchemaError;
use thiserror::Error;

use crate::abilities::AbilityCatalog;
use crate::weapons::WeaponDefinition;

/// Errors that can occur while loading or validating a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Source could not be read.
    #[error("Failed to read catalog: {0}")]
    Read(String),

    /// Source could not be parsed.
    #[error("Failed to parse catalog: {0}")]
    Parse(String),

    /// Incompatible schema version.
    #[error("Catalog schema error: {0}")]
    Schema(#[from] SchemaError),

    /// An entry failed validation.
    #[error("Catalog validation error: {0}")]
    Validation(String),

    /// Duplicate catalog id.
    #[error("Duplicate catalog id: {0}")]
    DuplicateId(u32),
}

/// Result type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Supplies catalog entries to the registries.
pub trait CatalogSource {
    /// Returns every weapon definition, in load order.
    fn load_weapon_definitions(&self) -> CatalogResult<Vec<WeaponDefinition>>;

    /// Returns the ability catalog (modules and ability specs).
    fn load_ability_catalog(&self) -> CatalogResult<AbilityCatalog>;
}

/// In-memory catalog.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    weapons: Vec<WeaponDefinition>,
    abilities: AbilityCatalog,
}

impl StaticCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a weapon definition.
    #[must_use]
    pub fn with_weapon(mut self, weapon: WeaponDefinition) -> Self {
        self.weapons.push(weapon);
        self
    }

    /// Replaces the ability catalog.
    #[must_use]
    pub fn with_abilities(mut self, abilities: AbilityCatalog) -> Self {
        self.abilities = abilities;
        self
    }
}

impl CatalogSource for StaticCatalog {
    fn load_weapon_definitions(&self) -> CatalogResult<Vec<WeaponDefinition>> {
        Ok(self.weapons.clone())
    }

    fn load_ability_catalog(&self) -> CatalogResult<AbilityCatalog> {
        Ok(self.abilities.clone())
    }
}
