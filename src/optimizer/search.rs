//! Allocation search: score every feasible split of the pool and keep the best one.
//!
//! Candidates are visited rolled-major, expansion-minor. The first candidate to strictly beat
//! the running best wins, so ties go to the fewest rolled dice, then the smallest expansion.

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

use crate::data::difficulty::{DifficultyProfile, DifficultyRegistry};
use crate::dice::rng::derive_seed;
use crate::optimizer::allocation::{Allocation, TargetWindow, WindowPair};
use crate::optimizer::probability::{estimate, EstimateMethod, ProbabilityConfig};
use crate::optimizer::ranking::BestAllocation;
use crate::optimizer::{OptimizeError, SearchResult};

/// Extra reach granted to the hazard die when clipping the scoring window.
pub const DEFAULT_HAZARD_BUFFER: u32 = 12;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchOptions {
    pub probability: ProbabilityConfig,
    /// Replace the first rolled die with the hazard die.
    pub hazard_die: bool,
    pub hazard_buffer: u32,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            probability: ProbabilityConfig::default(),
            hazard_die: false,
            hazard_buffer: DEFAULT_HAZARD_BUFFER,
        }
    }
}

impl SearchOptions {
    fn hazard_buffer(&self) -> Option<u32> {
        self.hazard_die.then_some(self.hazard_buffer)
    }
}

/// One scored split.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CandidateEvaluation {
    pub allocation: Allocation,
    pub display_window: TargetWindow,
    pub computation_window: TargetWindow,
    pub probability: f64,
    pub method: EstimateMethod,
}

/// Every split with at least `required_reserved` reserved dice and one rolled die, in search order.
pub fn candidate_allocations(total_dice: u32, required_reserved: u32) -> Vec<Allocation> {
    let Some(max_rolled) = total_dice.checked_sub(required_reserved) else {
        return Vec::new();
    };
    (1..=max_rolled)
        .flat_map(|rolled| {
            (0..=max_rolled - rolled).filter_map(move |expansion| {
                Allocation::new(total_dice, rolled, expansion)
            })
        })
        .filter(|allocation| allocation.reserved >= required_reserved)
        .collect()
}

/// Score one split. None when its scoring window cannot be hit.
pub fn evaluate_allocation(
    profile: &DifficultyProfile,
    allocation: Allocation,
    options: &SearchOptions,
) -> Option<CandidateEvaluation> {
    let windows = WindowPair::derive(profile, &allocation, options.hazard_buffer());
    if windows.computation.is_empty() {
        debug!(
            rolled = allocation.rolled,
            expansion = allocation.expansion,
            "skipping unreachable window"
        );
        return None;
    }

    let stream = (u64::from(allocation.rolled) << 32) | u64::from(allocation.expansion);
    let config = options
        .probability
        .with_seed(derive_seed(options.probability.seed, stream));
    let result = estimate(
        allocation.rolled,
        windows.computation,
        options.hazard_die,
        &config,
    );
    debug!(
        rolled = allocation.rolled,
        expansion = allocation.expansion,
        reserved = allocation.reserved,
        min = windows.computation.min,
        max = windows.computation.max,
        probability = result.probability,
        method = result.method.as_str(),
        "scored candidate"
    );

    Some(CandidateEvaluation {
        allocation,
        display_window: windows.display,
        computation_window: windows.computation,
        probability: result.probability,
        method: result.method,
    })
}

/// Score every surviving candidate, in search order.
pub fn evaluate_candidates(
    registry: &DifficultyRegistry,
    total_dice: u32,
    difficulty: &str,
    required_reserved: u32,
    options: &SearchOptions,
) -> Result<Vec<CandidateEvaluation>, OptimizeError> {
    let profile = registry
        .lookup(difficulty)
        .ok_or_else(|| OptimizeError::invalid_difficulty(difficulty, registry))?;
    let allocations = candidate_allocations(total_dice, required_reserved);

    let scored: Vec<Option<CandidateEvaluation>> = if options.probability.parallel {
        allocations
            .par_iter()
            .map(|&allocation| evaluate_allocation(profile, allocation, options))
            .collect()
    } else {
        allocations
            .iter()
            .map(|&allocation| evaluate_allocation(profile, allocation, options))
            .collect()
    };
    Ok(scored.into_iter().flatten().collect())
}

/// First candidate that strictly improves on everything before it.
pub fn select_best(candidates: &[CandidateEvaluation]) -> Option<&CandidateEvaluation> {
    let mut best: Option<&CandidateEvaluation> = None;
    for candidate in candidates {
        if best.map_or(true, |current| candidate.probability > current.probability) {
            best = Some(candidate);
        }
    }
    best
}

/// Best split of `total_dice` for `difficulty` keeping at least `required_reserved` dice.
pub fn find_best_with(
    registry: &DifficultyRegistry,
    total_dice: u32,
    difficulty: &str,
    required_reserved: u32,
    options: &SearchOptions,
) -> SearchResult {
    let candidates =
        evaluate_candidates(registry, total_dice, difficulty, required_reserved, options)?;
    let best = select_best(&candidates).ok_or(OptimizeError::NoValidCombination)?;
    info!(
        total_dice,
        difficulty,
        required_reserved,
        candidates = candidates.len(),
        rolled = best.allocation.rolled,
        expansion = best.allocation.expansion,
        reserved = best.allocation.reserved,
        probability = best.probability,
        "search complete"
    );
    Ok(BestAllocation::from(best))
}

/// [find_best_with] against the built-in registry and default options.
pub fn find_best(total_dice: u32, difficulty: &str, required_reserved: u32) -> SearchResult {
    find_best_with(
        DifficultyRegistry::builtin(),
        total_dice,
        difficulty,
        required_reserved,
        &SearchOptions::default(),
    )
}
