//! Version types for schema compatibility.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::SchemaError;

/// Schema version using semantic versioning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SchemaVersion {
    /// Major version (breaking changes)
    pub major: u16,
    /// Minor version (backwards-compatible additions)
    pub minor: u16,
    /// Patch version (bug fixes)
    pub patch: u16,
}

impl SchemaVersion {
    /// Creates a new schema version.
    #[must_use]
    pub const fn new(major: u16, minor: u16, patch: u16) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Current weapon catalog version.
    pub const WEAPON_CATALOG: Self = Self::new(1, 0, 0);

    /// Current ability catalog version.
    pub const ABILITY_CATALOG: Self = Self::new(1, 0, 0);

    /// Current simulation config version.
    pub const SIM_CONFIG: Self = Self::new(1, 0, 0);

    /// Checks if this version is compatible with another version.
    /// Compatible means same major version and this minor >= other minor.
    #[must_use]
    pub const fn is_compatible_with(&self, other: &Self) -> bool {
        self.major == other.major && self.minor >= other.minor
    }

    /// Checks if this version can read data from another version.
    #[must_use]
    pub const fn can_read(&self, data_version: &Self) -> bool {
        self.major == data_version.major
    }

    /// Parses `data_version` and checks that this (reader) version can read it.
    pub fn check_readable(&self, data_version: &str) -> Result<Self, SchemaError> {
        let parsed: Self = data_version.parse()?;
        if self.can_read(&parsed) {
            Ok(parsed)
        } else {
            Err(SchemaError::VersionMismatch {
                expected: self.to_string(),
                actual: parsed.to_string(),
            })
        }
    }
}

impl std::fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for SchemaVersion {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || SchemaError::Malformed(s.to_string());
        let mut parts = s.trim().split('.');
        let mut next = || -> Result<u16, SchemaError> {
            parts
                .next()
                .ok_or_else(malformed)?
                .parse()
                .map_err(|_| malformed())
        };
        let major = next()?;
        let minor = next()?;
        let patch = next()?;
        if parts.next().is_some() {
            return Err(malformed());
        }
        Ok(Self::new(major, minor, patch))
    }
}
