pub mod allocation;
pub mod export_csv;
pub mod monte_carlo;
pub mod probability;
pub mod ranking;
pub mod search;

use thiserror::Error;

use crate::data::difficulty::DifficultyRegistry;
use crate::optimizer::ranking::{assemble, BestAllocation, OptimizationReport};
use crate::optimizer::search::{find_best_with, SearchOptions};

pub use allocation::{Allocation, TargetWindow, WindowPair};
pub use probability::{success_probability, EstimateMethod, HazardMode, ProbabilityConfig};
pub use search::{find_best, CandidateEvaluation};

/// Either the winning split or the reason no split could be chosen.
pub type SearchResult = Result<BestAllocation, OptimizeError>;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OptimizeError {
    #[error("invalid difficulty '{name}'; allowed: {}", .allowed.join(", "))]
    InvalidDifficulty { name: String, allowed: Vec<String> },
    #[error("no valid combination found")]
    NoValidCombination,
}

impl OptimizeError {
    pub(crate) fn invalid_difficulty(name: &str, registry: &DifficultyRegistry) -> Self {
        Self::InvalidDifficulty {
            name: name.to_string(),
            allowed: registry.names().into_iter().map(str::to_string).collect(),
        }
    }

    /// Stable machine-readable reason.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidDifficulty { .. } => "invalid_difficulty",
            Self::NoValidCombination => "no_valid_combination",
        }
    }
}

#[derive(Debug, Clone)]
pub struct OptimizationScenario<'a> {
    pub total_dice: u32,
    pub difficulty: &'a str,
    pub required_reserved: u32,
    pub options: SearchOptions,
}

impl Default for OptimizationScenario<'_> {
    fn default() -> Self {
        Self {
            total_dice: 6,
            difficulty: "leicht",
            required_reserved: 1,
            options: SearchOptions::default(),
        }
    }
}

/// Run the search for `scenario` and package the outcome for display.
pub fn optimize_scenario(
    registry: &DifficultyRegistry,
    scenario: &OptimizationScenario<'_>,
) -> OptimizationReport {
    let result = find_best_with(
        registry,
        scenario.total_dice,
        scenario.difficulty,
        scenario.required_reserved,
        &scenario.options,
    );
    assemble(
        &result,
        scenario.options.hazard_die,
        scenario.options.probability.seed,
    )
}

/// Presentation entry point: built-in difficulties, default engine settings.
pub fn optimize(total_dice: u32, difficulty: &str, required_reserved: u32) -> OptimizationReport {
    optimize_scenario(
        DifficultyRegistry::builtin(),
        &OptimizationScenario {
            total_dice,
            difficulty,
            required_reserved,
            options: SearchOptions::default(),
        },
    )
}
