use serde::Serialize;

use crate::optimizer::allocation::{Allocation, TargetWindow};
use crate::optimizer::probability::EstimateMethod;
use crate::optimizer::search::CandidateEvaluation;
use crate::optimizer::{OptimizeError, SearchResult};

/// Winning split with its display window and success probability in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BestAllocation {
    pub allocation: Allocation,
    pub window: TargetWindow,
    pub success_probability: f64,
    pub method: EstimateMethod,
}

impl From<&CandidateEvaluation> for BestAllocation {
    fn from(candidate: &CandidateEvaluation) -> Self {
        Self {
            allocation: candidate.allocation,
            window: candidate.display_window,
            success_probability: candidate.probability,
            method: candidate.method,
        }
    }
}

impl BestAllocation {
    pub fn success_percent(&self) -> f64 {
        round_percent(self.success_probability)
    }
}

/// Probability as a percentage rounded to two decimals.
pub fn round_percent(probability: f64) -> f64 {
    (probability * 10_000.0).round() / 100.0
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuccessReport {
    pub total_dice: u32,
    pub rolled: u32,
    pub expansion: u32,
    pub reserved: u32,
    pub window: [u32; 2],
    pub success_percent: f64,
    pub method: EstimateMethod,
    pub hazard_die: bool,
    pub seed: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureReport {
    pub reason: &'static str,
    pub message: String,
}

/// What the presentation layer renders: either the winning split or a tagged failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OptimizationReport {
    Ok(SuccessReport),
    Error(FailureReport),
}

impl OptimizationReport {
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }
}

impl From<&OptimizeError> for FailureReport {
    fn from(err: &OptimizeError) -> Self {
        Self {
            reason: err.code(),
            message: err.to_string(),
        }
    }
}

pub fn assemble(result: &SearchResult, hazard_die: bool, seed: u64) -> OptimizationReport {
    match result {
        Ok(best) => OptimizationReport::Ok(SuccessReport {
            total_dice: best.allocation.total_dice,
            rolled: best.allocation.rolled,
            expansion: best.allocation.expansion,
            reserved: best.allocation.reserved,
            window: best.window.bounds(),
            success_percent: best.success_percent(),
            method: best.method,
            hazard_die,
            seed,
        }),
        Err(err) => OptimizationReport::Error(FailureReport::from(err)),
    }
}
