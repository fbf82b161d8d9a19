//! Ability registry and module composition table.

use ahash::AHashMap;
use nighthunter_common::AbilityId;
use tracing::{debug, info, warn};

use super::spec::{AbilityCatalog, DeliveryModule, EffectModule, TargetingModule};
use crate::catalog::{CatalogError, CatalogResult, CatalogSource};

/// Ability spec with module names resolved to table indices.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedAbility {
    /// Ability id
    pub id: AbilityId,
    /// Display name
    pub name: String,
    /// Cooldown in seconds
    pub cooldown: f32,
    /// Targeting module index (None if missing or unresolved)
    pub targeting: Option<usize>,
    /// Delivery module index (None if missing or unresolved)
    pub delivery: Option<usize>,
    /// Effect module indices, in invocation order
    pub effects: Vec<usize>,
}

/// Borrowed view of an ability and its modules.
#[derive(Debug, Clone)]
pub struct Composition<'a> {
    /// The resolved spec
    pub ability: &'a ResolvedAbility,
    /// Targeting module
    pub targeting: Option<&'a TargetingModule>,
    /// Delivery module
    pub delivery: Option<&'a DeliveryModule>,
    /// Effect modules
    pub effects: Vec<&'a EffectModule>,
}

/// Ability registry, loaded once from a [`CatalogSource`].
#[derive(Debug, Default)]
pub struct AbilityRegistry {
    targeting: Vec<TargetingModule>,
    delivery: Vec<DeliveryModule>,
    effects: Vec<EffectModule>,
    by_id: AHashMap<AbilityId, ResolvedAbility>,
    order: Vec<AbilityId>,
    loaded: bool,
}

impl AbilityRegistry {
    /// Creates a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the ability catalog from `source`. Later calls return the
    /// current count without touching the source.
    pub fn load(&mut self, source: &dyn CatalogSource) -> CatalogResult<usize> {
        if self.loaded {
            return Ok(self.len());
        }

        let catalog = source.load_ability_catalog()?;
        self.loaded = true;
        self.register_catalog(catalog);

        info!("Loaded {} abilities", self.len());
        Ok(self.len())
    }

    /// Returns true once `load` has run.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Adds a catalog's modules and specs, resolving module names.
    ///
    /// Duplicate ids and unresolved module names are dropped with a warning.
    pub fn register_catalog(&mut self, catalog: AbilityCatalog) {
        let targeting = index_modules(&mut self.targeting, catalog.targeting);
        let delivery = index_modules(&mut self.delivery, catalog.delivery);
        let effects = index_modules(&mut self.effects, catalog.effects);

        for def in catalog.abilities {
            if !def.id.is_some() {
                warn!("Skipping ability {:?}: reserved id 0", def.name);
                continue;
            }
            if self.by_id.contains_key(&def.id) {
                warn!("Skipping ability {}: {}", def.id, CatalogError::DuplicateId(def.id.raw()));
                continue;
            }

            let resolve = |kind: &str, name: Option<&String>, table: &AHashMap<String, usize>| {
                let name = name?;
                let index = table.get(name).copied();
                if index.is_none() {
                    warn!("Ability {} references unknown {} module {:?}", def.id, kind, name);
                }
                index
            };

            let resolved = ResolvedAbility {
                id: def.id,
                name: def.name.clone(),
                cooldown: def.cooldown.max(0.0),
                targeting: resolve("targeting", def.targeting.as_ref(), &targeting),
                delivery: resolve("delivery", def.delivery.as_ref(), &delivery),
                effects: def
                    .effects
                    .iter()
                    .filter_map(|name| resolve("effect", Some(name), &effects))
                    .collect(),
            };

            debug!("Registered ability {} ({})", resolved.id, resolved.name);
            self.order.push(resolved.id);
            self.by_id.insert(resolved.id, resolved);
        }
    }

    /// Returns the number of registered abilities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Returns true if the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Gets an ability by ID.
    #[must_use]
    pub fn get(&self, id: AbilityId) -> Option<&ResolvedAbility> {
        self.by_id.get(&id)
    }

    /// Returns abilities in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &ResolvedAbility> {
        self.order.iter().filter_map(|id| self.by_id.get(id))
    }

    /// Looks up an ability together with its modules.
    #[must_use]
    pub fn compose(&self, id: AbilityId) -> Option<Composition<'_>> {
        let ability = self.by_id.get(&id)?;
        Some(Composition {
            ability,
            targeting: ability.targeting.and_then(|i| self.targeting.get(i)),
            delivery: ability.delivery.and_then(|i| self.delivery.get(i)),
            effects: ability
                .effects
                .iter()
                .filter_map(|&i| self.effects.get(i))
                .collect(),
        })
    }
}

/// Appends modules to a table and returns their name-to-index map.
fn index_modules<M>(
    table: &mut Vec<M>,
    modules: impl IntoIterator<Item = (String, M)>,
) -> AHashMap<String, usize> {
    modules
        .into_iter()
        .map(|(name, module)| {
            table.push(module);
            (name, table.len() - 1)
        })
        .collect()
}
