//! Difficulty registry: maps a difficulty label to its base target window.
//! Built once, read-only afterwards; shared freely across threads.

use std::collections::HashSet;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Built-in table: label, lowest and highest winning sum.
pub const BUILTIN_DIFFICULTIES: &[(&str, u32, u32)] = &[
    ("leicht", 8, 12),
    ("mittel", 11, 15),
    ("schwer", 15, 19),
    ("ultimativ", 23, 25),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultyProfile {
    pub name: String,
    pub min_target: u32,
    pub max_target: u32,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("difficulty name must not be empty")]
    EmptyName,
    #[error("difficulty '{name}' is registered twice")]
    Duplicate { name: String },
    #[error("difficulty '{name}' has invalid window [{min}, {max}]: bounds must be >= 1 and min <= max")]
    InvalidWindow { name: String, min: u32, max: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DifficultyRegistry {
    profiles: Vec<DifficultyProfile>,
}

impl DifficultyRegistry {
    /// Process-wide registry with the built-in table.
    pub fn builtin() -> &'static DifficultyRegistry {
        static BUILTIN: OnceLock<DifficultyRegistry> = OnceLock::new();
        BUILTIN.get_or_init(|| DifficultyRegistry {
            profiles: BUILTIN_DIFFICULTIES
                .iter()
                .map(|&(name, min_target, max_target)| DifficultyProfile {
                    name: name.to_string(),
                    min_target,
                    max_target,
                })
                .collect(),
        })
    }

    /// Validate and register custom profiles. Names are stored lowercased.
    pub fn from_profiles(profiles: Vec<DifficultyProfile>) -> Result<Self, RegistryError> {
        let mut seen = HashSet::new();
        let mut normalized = Vec::with_capacity(profiles.len());
        for profile in profiles {
            let name = profile.name.trim().to_lowercase();
            if name.is_empty() {
                return Err(RegistryError::EmptyName);
            }
            if profile.min_target < 1 || profile.min_target > profile.max_target {
                return Err(RegistryError::InvalidWindow {
                    name,
                    min: profile.min_target,
                    max: profile.max_target,
                });
            }
            if !seen.insert(name.clone()) {
                return Err(RegistryError::Duplicate { name });
            }
            normalized.push(DifficultyProfile { name, ..profile });
        }
        Ok(Self {
            profiles: normalized,
        })
    }

    /// Case-insensitive lookup.
    pub fn lookup(&self, name: &str) -> Option<&DifficultyProfile> {
        let key = name.to_lowercase();
        self.profiles.iter().find(|profile| profile.name == key)
    }

    pub fn profiles(&self) -> &[DifficultyProfile] {
        &self.profiles
    }

    pub fn names(&self) -> Vec<&str> {
        self.profiles.iter().map(|p| p.name.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_table_satisfies_window_invariants() {
        let registry = DifficultyRegistry::builtin();
        assert_eq!(registry.names(), vec!["leicht", "mittel", "schwer", "ultimativ"]);
        let rebuilt = DifficultyRegistry::from_profiles(registry.profiles().to_vec());
        assert_eq!(rebuilt.as_ref(), Ok(registry));
    }

    #[test]
    fn lookup_ignores_case() {
        let registry = DifficultyRegistry::builtin();
        let profile = registry.lookup("LeIcHt").expect("leicht is built in");
        assert_eq!((profile.min_target, profile.max_target), (8, 12));
        assert_eq!(registry.lookup("Ultimativ").map(|p| p.max_target), Some(25));
        assert!(registry.lookup("bogus").is_none());
        assert!(registry.lookup("").is_none());
    }

    #[test]
    fn custom_profiles_are_validated() {
        let profile = |name: &str, min, max| DifficultyProfile {
            name: name.to_string(),
            min_target: min,
            max_target: max,
        };

        let registry = DifficultyRegistry::from_profiles(vec![profile("Sehr Schwer", 19, 23)])
            .expect("valid table");
        assert!(registry.lookup("sehr schwer").is_some());

        assert_eq!(
            DifficultyRegistry::from_profiles(vec![profile("a", 5, 4)]),
            Err(RegistryError::InvalidWindow {
                name: "a".to_string(),
                min: 5,
                max: 4
            })
        );
        assert!(DifficultyRegistry::from_profiles(vec![profile("zero", 0, 4)]).is_err());
        assert_eq!(
            DifficultyRegistry::from_profiles(vec![profile("x", 1, 2), profile("X", 3, 4)]),
            Err(RegistryError::Duplicate {
                name: "x".to_string()
            })
        );
        assert_eq!(
            DifficultyRegistry::from_profiles(vec![profile("  ", 1, 2)]),
            Err(RegistryError::EmptyName)
        );
    }
}
