//! Engine configuration: difficulty table override and probability settings.
//!
//! Read from YAML (or JSON, by extension) at `$PSI_CONFIG` or [DEFAULT_CONFIG_PATH].
//! A missing file means defaults; a present file must parse and validate.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::difficulty::{DifficultyProfile, DifficultyRegistry, RegistryError};
use crate::dice::hazard::MAX_HAZARD_DEPTH;
use crate::dice::rng::entropy_seed;
use crate::optimizer::probability::ProbabilityConfig;
use crate::optimizer::search::{SearchOptions, DEFAULT_HAZARD_BUFFER};

pub const CONFIG_ENV: &str = "PSI_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config/psi.yaml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse YAML config {path}: {source}")]
    Yaml {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("failed to parse JSON config {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("invalid difficulty table: {0}")]
    Registry(#[from] RegistryError),
    #[error("invalid config: {0}")]
    Invalid(String),
    #[error("failed to draw an entropy seed: {0}")]
    Entropy(getrandom::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Replaces the built-in difficulty table when present.
    pub difficulties: Option<Vec<DifficultyProfile>>,
    pub probability: ProbabilityConfig,
    pub hazard_buffer: u32,
    /// Fixed seed for sampled paths; a fresh entropy seed is drawn per run when absent.
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            difficulties: None,
            probability: ProbabilityConfig::default(),
            hazard_buffer: DEFAULT_HAZARD_BUFFER,
            seed: None,
        }
    }
}

impl EngineConfig {
    /// Load from `$PSI_CONFIG`, falling back to [DEFAULT_CONFIG_PATH].
    pub fn from_env() -> Result<Self, ConfigError> {
        let path = env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load(path)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let is_json = path
            .extension()
            .map_or(false, |ext| ext.eq_ignore_ascii_case("json"));
        let config: EngineConfig = if is_json {
            serde_json::from_str(&raw).map_err(|source| ConfigError::Json {
                path: path.to_path_buf(),
                source,
            })?
        } else {
            serde_yaml::from_str(&raw).map_err(|source| ConfigError::Yaml {
                path: path.to_path_buf(),
                source,
            })?
        };
        config.validate()?;
        tracing::info!(path = %path.display(), "loaded engine config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.registry()?;
        if self.probability.fair_trials == 0 || self.probability.hazard_trials == 0 {
            return Err(ConfigError::Invalid(
                "fair_trials and hazard_trials must be at least 1".to_string(),
            ));
        }
        if !(1..=MAX_HAZARD_DEPTH).contains(&self.probability.hazard_depth) {
            return Err(ConfigError::Invalid(format!(
                "hazard_depth must be between 1 and {MAX_HAZARD_DEPTH}"
            )));
        }
        Ok(())
    }

    /// Difficulty table in effect: the override if configured, else the built-in one.
    pub fn registry(&self) -> Result<DifficultyRegistry, ConfigError> {
        match &self.difficulties {
            Some(profiles) => Ok(DifficultyRegistry::from_profiles(profiles.clone())?),
            None => Ok(DifficultyRegistry::builtin().clone()),
        }
    }

    /// Explicit seed first, then the configured one, then OS entropy.
    pub fn resolve_seed(&self, explicit: Option<u64>) -> Result<u64, ConfigError> {
        match explicit.or(self.seed) {
            Some(seed) => Ok(seed),
            None => entropy_seed().map_err(ConfigError::Entropy),
        }
    }

    pub fn search_options(&self, hazard_die: bool, seed: u64) -> SearchOptions {
        SearchOptions {
            probability: self.probability.with_seed(seed),
            hazard_die,
            hazard_buffer: self.hazard_buffer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimizer::probability::HazardMode;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_path(name: &str, ext: &str) -> PathBuf {
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be after unix epoch")
            .as_nanos();
        env::temp_dir().join(format!("psi-config-{name}-{stamp}.{ext}"))
    }

    #[test]
    fn missing_file_yields_defaults() {
        let config = EngineConfig::load("/definitely/not/here/psi.yaml").expect("defaults");
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.hazard_buffer, 12);
        assert_eq!(config.probability.fair_trials, 100_000);
        assert_eq!(config.probability.hazard_trials, 10_000);
    }

    #[test]
    fn yaml_overrides_table_and_trials() {
        let path = temp_path("yaml", "yaml");
        fs::write(
            &path,
            "difficulties:\n  - { name: Leicht, min_target: 8, max_target: 12 }\n  - { name: sehr schwer, min_target: 19, max_target: 23 }\nprobability:\n  fair_trials: 5000\n  hazard_mode: sampled\nseed: 42\n",
        )
        .expect("fixture should be written");

        let config = EngineConfig::load(&path).expect("valid yaml");
        let registry = config.registry().expect("valid table");
        assert_eq!(registry.names(), vec!["leicht", "sehr schwer"]);
        assert_eq!(config.probability.fair_trials, 5000);
        assert_eq!(config.probability.exact_threshold, 8);
        assert_eq!(config.probability.hazard_mode, HazardMode::Sampled);
        assert_eq!(config.resolve_seed(None).expect("seeded"), 42);
        assert_eq!(config.resolve_seed(Some(7)).expect("seeded"), 7);

        let _ = fs::remove_file(path);
    }

    #[test]
    fn json_config_is_parsed_by_extension() {
        let path = temp_path("json", "json");
        fs::write(&path, r#"{"hazard_buffer": 18, "probability": {"exact_threshold": 10}}"#)
            .expect("fixture should be written");
        let config = EngineConfig::load(&path).expect("valid json");
        assert_eq!(config.hazard_buffer, 18);
        assert_eq!(config.probability.exact_threshold, 10);
        let _ = fs::remove_file(path);
    }

    #[test]
    fn shipped_example_config_is_valid() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("config/psi.example.yaml");
        let config = EngineConfig::load(path).expect("example config should load");
        let registry = config.registry().expect("valid table");
        assert_eq!(registry.profiles().len(), 5);
        assert!(registry.lookup("Sehr Schwer").is_some());
        assert_eq!(config.probability, ProbabilityConfig::default());
    }

    #[test]
    fn invalid_table_is_rejected() {
        let path = temp_path("bad", "yaml");
        fs::write(&path, "difficulties:\n  - { name: x, min_target: 9, max_target: 3 }\n")
            .expect("fixture should be written");
        assert!(matches!(
            EngineConfig::load(&path),
            Err(ConfigError::Registry(RegistryError::InvalidWindow { .. }))
        ));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn zero_trials_are_rejected() {
        let config = EngineConfig {
            probability: ProbabilityConfig {
                fair_trials: 0,
                ..ProbabilityConfig::default()
            },
            ..EngineConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }
}
