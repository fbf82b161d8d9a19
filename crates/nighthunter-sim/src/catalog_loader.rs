//! TOML catalog loading.
//!
//! Weapons are read from every `*.toml` file in the weapons directory and
//! abilities from every `*.toml` file in the abilities directory. Each file
//! carries a schema `version`. A file that fails to read, parse or pass the
//! version check is skipped with a warning; the rest still load.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use nighthunter_combat::{
    AbilityCatalog, AbilityDefinition, CatalogError, CatalogResult, CatalogSource, DeliveryModule,
    EffectModule, TargetingModule, WeaponDefinition,
};
use nighthunter_common::SchemaVersion;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// A weapon catalog file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeaponFile {
    /// Schema version
    pub version: String,
    /// Weapons in this file
    #[serde(default)]
    pub weapons: Vec<WeaponDefinition>,
}

/// An ability catalog file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbilityFile {
    /// Schema version
    pub version: String,
    /// Named targeting modules
    #[serde(default)]
    pub targeting: BTreeMap<String, TargetingModule>,
    /// Named delivery modules
    #[serde(default)]
    pub delivery: BTreeMap<String, DeliveryModule>,
    /// Named effect modules
    #[serde(default)]
    pub effects: BTreeMap<String, EffectModule>,
    /// Ability specs
    #[serde(default)]
    pub abilities: Vec<AbilityDefinition>,
}

impl From<AbilityFile> for AbilityCatalog {
    fn from(file: AbilityFile) -> Self {
        Self {
            targeting: file.targeting,
            delivery: file.delivery,
            effects: file.effects,
            abilities: file.abilities,
        }
    }
}

/// Catalog source backed by two asset directories.
#[derive(Debug, Clone)]
pub struct TomlCatalog {
    weapons_dir: PathBuf,
    abilities_dir: PathBuf,
}

impl TomlCatalog {
    /// Creates a catalog over the given directories.
    pub fn new(weapons_dir: impl Into<PathBuf>, abilities_dir: impl Into<PathBuf>) -> Self {
        Self {
            weapons_dir: weapons_dir.into(),
            abilities_dir: abilities_dir.into(),
        }
    }

    /// Loads one weapon file.
    pub fn load_weapon_file(path: &Path) -> CatalogResult<Vec<WeaponDefinition>> {
        let file: WeaponFile = read_toml(path)?;
        SchemaVersion::WEAPON_CATALOG.check_readable(&file.version)?;
        Ok(file.weapons)
    }

    /// Loads one ability file.
    pub fn load_ability_file(path: &Path) -> CatalogResult<AbilityCatalog> {
        let file: AbilityFile = read_toml(path)?;
        SchemaVersion::ABILITY_CATALOG.check_readable(&file.version)?;
        Ok(file.into())
    }
}

impl CatalogSource for TomlCatalog {
    fn load_weapon_definitions(&self) -> CatalogResult<Vec<WeaponDefinition>> {
        let mut weapons = Vec::new();
        for path in toml_files(&self.weapons_dir)? {
            match Self::load_weapon_file(&path) {
                Ok(found) => {
                    debug!("Loaded {} weapons from {:?}", found.len(), path);
                    weapons.extend(found);
                },
                Err(e) => warn!("Failed to load weapon file {:?}: {}", path, e),
            }
        }
        info!("Read {} weapon definitions from {:?}", weapons.len(), self.weapons_dir);
        Ok(weapons)
    }

    fn load_ability_catalog(&self) -> CatalogResult<AbilityCatalog> {
        let mut catalog = AbilityCatalog::default();
        for path in toml_files(&self.abilities_dir)? {
            match Self::load_ability_file(&path) {
                Ok(found) => {
                    debug!("Loaded {} abilities from {:?}", found.abilities.len(), path);
                    catalog.merge(found);
                },
                Err(e) => warn!("Failed to load ability file {:?}: {}", path, e),
            }
        }
        info!(
            "Read {} ability specs from {:?}",
            catalog.abilities.len(),
            self.abilities_dir
        );
        Ok(catalog)
    }
}

fn read_toml<T: serde::de::DeserializeOwned>(path: &Path) -> CatalogResult<T> {
    let content =
        fs::read_to_string(path).map_err(|e| CatalogError::Read(format!("{}: {e}", path.display())))?;
    toml::from_str(&content).map_err(|e| CatalogError::Parse(format!("{}: {e}", path.display())))
}

/// Lists `*.toml` files in `dir`, sorted by name. A missing directory is
/// created and yields nothing.
fn toml_files(dir: &Path) -> CatalogResult<Vec<PathBuf>> {
    let read_err = |e: std::io::Error| CatalogError::Read(format!("{}: {e}", dir.display()));

    if !dir.exists() {
        info!("Catalog path does not exist, creating: {:?}", dir);
        fs::create_dir_all(dir).map_err(read_err)?;
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(read_err)? {
        let path = entry.map_err(read_err)?.path();
        if path.extension().is_some_and(|ext| ext == "toml") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nighthunter_combat::{AbilityRegistry, WeaponKind, WeaponRegistry};
    use nighthunter_common::{AbilityId, WeaponId};
    use tempfile::TempDir;

    const WEAPONS: &str = r#"
version = "1.0.0"

[[weapons]]
id = 1
name = "Pistol"
kind = "hitscan"
damage = 25
range = 50.0
uses_ammo = true
clip_size = 8

[[weapons]]
id = 2
name = "Crossbow"
kind = "ranged"

[weapons.projectile]
speed = 40.0
"#;

    const ABILITIES: &str = r#"
version = "1.0.0"

[targeting.aim]
kind = "aim_point"
max_range = 25.0

[delivery.blast]
kind = "explosion"
radius = 4.0
pulses = 2

[effects.burn]
kind = "damage"
damage = 15

[[abilities]]
id = 1
name = "Firebomb"
cooldown = 6.0
targeting = "aim"
delivery = "blast"
effects = ["burn"]
"#;

    fn dirs() -> (TempDir, PathBuf, PathBuf) {
        let root = TempDir::new().expect("tempdir");
        let weapons = root.path().join("weapons");
        let abilities = root.path().join("abilities");
        fs::create_dir_all(&weapons).expect("weapons dir");
        fs::create_dir_all(&abilities).expect("abilities dir");
        (root, weapons, abilities)
    }

    #[test]
    fn test_loads_weapons_and_abilities() {
        let (_root, weapons, abilities) = dirs();
        fs::write(weapons.join("basic.toml"), WEAPONS).expect("write");
        fs::write(abilities.join("skills.toml"), ABILITIES).expect("write");
        fs::write(weapons.join("notes.txt"), "ignored").expect("write");

        let source = TomlCatalog::new(&weapons, &abilities);

        let mut weapon_registry = WeaponRegistry::new();
        assert_eq!(weapon_registry.load(&source).expect("weapons"), 2);
        let crossbow = weapon_registry.get(WeaponId::new(2)).expect("crossbow");
        assert_eq!(crossbow.kind, WeaponKind::Ranged);
        assert_eq!(crossbow.projectile.map(|p| p.speed), Some(40.0));
        assert_eq!(crossbow.projectile.map(|p| p.lifetime), Some(5.0));

        let mut ability_registry = AbilityRegistry::new();
        assert_eq!(ability_registry.load(&source).expect("abilities"), 1);
        let bomb = ability_registry.compose(AbilityId::new(1)).expect("firebomb");
        assert!(matches!(
            bomb.delivery,
            Some(DeliveryModule::Explosion { pulses: 2, fuse, .. }) if *fuse == 0.0
        ));
        assert_eq!(bomb.effects.len(), 1);
    }

    #[test]
    fn test_bad_files_are_skipped() {
        let (_root, weapons, abilities) = dirs();
        fs::write(weapons.join("a.toml"), WEAPONS).expect("write");
        fs::write(weapons.join("b.toml"), "version = \"2.0.0\"\n").expect("write");
        fs::write(weapons.join("c.toml"), "not = [valid").expect("write");

        let source = TomlCatalog::new(&weapons, &abilities);
        assert_eq!(source.load_weapon_definitions().expect("load").len(), 2);
        assert!(matches!(
            TomlCatalog::load_weapon_file(&weapons.join("b.toml")),
            Err(CatalogError::Schema(_))
        ));
        assert!(matches!(
            TomlCatalog::load_weapon_file(&weapons.join("c.toml")),
            Err(CatalogError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_directory_is_created() {
        let root = TempDir::new().expect("tempdir");
        let weapons = root.path().join("nested").join("weapons");
        let source = TomlCatalog::new(&weapons, root.path().join("abilities"));

        assert!(source.load_weapon_definitions().expect("load").is_empty());
        assert!(weapons.is_dir());
    }
}
