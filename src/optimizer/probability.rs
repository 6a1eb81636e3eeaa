//! Success probability for a rolled pool against a target window.
//!
//! Fair pools up to [ProbabilityConfig::exact_threshold] dice are scored exactly from the
//! convolved sum distribution; larger fair pools are sampled. Pools with a hazard die use the
//! truncated hazard distribution convolved with the remaining fair dice unless
//! [HazardMode::Sampled] is selected.

use serde::{Deserialize, Serialize};

use crate::dice::distribution::{SumDistribution, MAX_EXACT_DICE};
use crate::dice::hazard::{HazardDie, DEFAULT_HAZARD_DEPTH, MAX_HAZARD_DEPTH};
use crate::optimizer::allocation::TargetWindow;
use crate::optimizer::monte_carlo::{sample_fair, sample_hazard};

pub const DEFAULT_EXACT_THRESHOLD: u32 = 8;
pub const DEFAULT_FAIR_TRIALS: u32 = 100_000;
pub const DEFAULT_HAZARD_TRIALS: u32 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HazardMode {
    /// Convolve the truncated hazard distribution with the fair dice.
    #[default]
    Exact,
    /// Rejection-loop sampling over [ProbabilityConfig::hazard_trials] draws.
    Sampled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EstimateMethod {
    Exact,
    Sampled,
}

impl EstimateMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Sampled => "sampled",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbabilityConfig {
    /// Largest fair pool scored exactly.
    pub exact_threshold: u32,
    pub fair_trials: u32,
    pub hazard_trials: u32,
    pub hazard_mode: HazardMode,
    /// Explosion levels kept in the exact hazard distribution.
    pub hazard_depth: u32,
    /// Base seed for sampled paths. Supplied per run, never read from config files.
    #[serde(skip)]
    pub seed: u64,
    /// Reduce sampled trials on the Rayon pool.
    pub parallel: bool,
}

impl Default for ProbabilityConfig {
    fn default() -> Self {
        Self {
            exact_threshold: DEFAULT_EXACT_THRESHOLD,
            fair_trials: DEFAULT_FAIR_TRIALS,
            hazard_trials: DEFAULT_HAZARD_TRIALS,
            hazard_mode: HazardMode::Exact,
            hazard_depth: DEFAULT_HAZARD_DEPTH,
            seed: 0,
            parallel: true,
        }
    }
}

impl ProbabilityConfig {
    pub fn with_seed(self, seed: u64) -> Self {
        Self { seed, ..self }
    }

    /// Which path a pool of `num_dice` takes. Pools whose outcome count would overflow the
    /// exact tables are always sampled.
    pub fn method_for(&self, num_dice: u32, use_hazard_die: bool) -> EstimateMethod {
        let exact = if use_hazard_die {
            let depth = self.hazard_depth.clamp(1, MAX_HAZARD_DEPTH);
            self.hazard_mode == HazardMode::Exact
                && depth + num_dice.saturating_sub(1) <= MAX_EXACT_DICE
        } else {
            num_dice <= self.exact_threshold.min(MAX_EXACT_DICE)
        };
        if exact {
            EstimateMethod::Exact
        } else {
            EstimateMethod::Sampled
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Estimate {
    pub probability: f64,
    pub method: EstimateMethod,
}

/// Probability in `[0, 1]` that the rolled sum lands inside `window`.
pub fn success_probability(
    num_dice: u32,
    window: TargetWindow,
    use_hazard_die: bool,
    config: &ProbabilityConfig,
) -> f64 {
    estimate(num_dice, window, use_hazard_die, config).probability
}

/// Like [success_probability] but also reports whether the figure is exact or sampled.
pub fn estimate(
    num_dice: u32,
    window: TargetWindow,
    use_hazard_die: bool,
    config: &ProbabilityConfig,
) -> Estimate {
    let method = config.method_for(num_dice, use_hazard_die);
    if num_dice == 0 || window.is_empty() {
        return Estimate {
            probability: 0.0,
            method,
        };
    }

    let hazard = HazardDie::with_depth(config.hazard_depth);
    let exact = match (use_hazard_die, method) {
        (_, EstimateMethod::Sampled) => None,
        (false, EstimateMethod::Exact) => SumDistribution::fair(num_dice),
        (true, EstimateMethod::Exact) => hazard_distribution(&hazard, num_dice),
    };
    let (probability, method) = match exact {
        Some(dist) => (dist.mass_between(window.min, window.max), EstimateMethod::Exact),
        None if use_hazard_die => (
            sample_hazard(
                num_dice,
                window,
                &hazard,
                config.hazard_trials as usize,
                config.seed,
                config.parallel,
            ),
            EstimateMethod::Sampled,
        ),
        None => (
            sample_fair(
                num_dice,
                window,
                config.fair_trials as usize,
                config.seed,
                config.parallel,
            ),
            EstimateMethod::Sampled,
        ),
    };

    Estimate {
        probability: probability.clamp(0.0, 1.0),
        method,
    }
}

/// Sum distribution of one hazard die plus `num_dice - 1` fair dice. None when the outcome
/// count no longer fits.
pub fn hazard_distribution(hazard: &HazardDie, num_dice: u32) -> Option<SumDistribution> {
    hazard
        .distribution()
        .with_fair_dice(num_dice.saturating_sub(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_path_is_bit_identical_across_calls() {
        let config = ProbabilityConfig::default();
        let window = TargetWindow::new(8, 12);
        let first = success_probability(4, window, false, &config);
        let second = success_probability(4, window, false, &config);
        assert_eq!(first.to_bits(), second.to_bits());
    }

    #[test]
    fn single_die_probabilities() {
        let config = ProbabilityConfig::default();
        let p = success_probability(1, TargetWindow::new(3, 4), false, &config);
        assert!((p - 2.0 / 6.0).abs() < 1e-12);
        let all = success_probability(1, TargetWindow::new(1, 6), false, &config);
        assert_eq!(all, 1.0);
    }

    #[test]
    fn threshold_selects_method() {
        let config = ProbabilityConfig::default();
        assert_eq!(config.method_for(8, false), EstimateMethod::Exact);
        assert_eq!(config.method_for(9, false), EstimateMethod::Sampled);
        assert_eq!(config.method_for(15, true), EstimateMethod::Exact);
        let sampled = ProbabilityConfig {
            hazard_mode: HazardMode::Sampled,
            ..config
        };
        assert_eq!(sampled.method_for(2, true), EstimateMethod::Sampled);
    }

    #[test]
    fn oversized_pools_fall_back_to_sampling() {
        let config = ProbabilityConfig {
            exact_threshold: 200,
            fair_trials: 2_000,
            hazard_trials: 2_000,
            ..ProbabilityConfig::default()
        };
        assert_eq!(config.method_for(MAX_EXACT_DICE, false), EstimateMethod::Exact);
        assert_eq!(config.method_for(MAX_EXACT_DICE + 1, false), EstimateMethod::Sampled);
        assert_eq!(config.method_for(38, true), EstimateMethod::Exact);
        assert_eq!(config.method_for(39, true), EstimateMethod::Sampled);

        let result = estimate(60, TargetWindow::new(150, 270), false, &config);
        assert_eq!(result.method, EstimateMethod::Sampled);
        assert!(result.probability > 0.5);
    }

    #[test]
    fn equal_fractions_score_identically_across_pool_sizes() {
        let config = ProbabilityConfig::default();
        let one = success_probability(1, TargetWindow::new(1, 6), false, &config);
        let two = success_probability(2, TargetWindow::new(2, 12), false, &config);
        assert_eq!(one.to_bits(), two.to_bits());
        assert_eq!(one, 1.0);
    }

    #[test]
    fn hazard_die_reaches_past_six_per_die() {
        let config = ProbabilityConfig::default();
        let plain = success_probability(1, TargetWindow::new(7, 12), false, &config);
        let hazard = success_probability(1, TargetWindow::new(7, 12), true, &config);
        assert_eq!(plain, 0.0);
        assert!((hazard - 5.0 / 36.0).abs() < 1e-12);
    }

    #[test]
    fn hazard_exact_and_sampled_agree() {
        let window = TargetWindow::new(8, 14);
        let exact = success_probability(3, window, true, &ProbabilityConfig::default());
        let sampled_config = ProbabilityConfig {
            hazard_mode: HazardMode::Sampled,
            hazard_trials: 200_000,
            seed: 99,
            ..ProbabilityConfig::default()
        };
        let sampled = success_probability(3, window, true, &sampled_config);
        assert!((exact - sampled).abs() < 0.01, "exact={exact} sampled={sampled}");
    }

    #[test]
    fn empty_windows_score_zero() {
        let config = ProbabilityConfig::default();
        assert_eq!(success_probability(3, TargetWindow::new(9, 8), false, &config), 0.0);
        assert_eq!(success_probability(0, TargetWindow::new(1, 8), false, &config), 0.0);
    }
}
