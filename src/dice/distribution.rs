//! Exact distribution of dice sums as integer outcome counts.
//!
//! Each fair d6 is folded into the running counts one at a time, so `n` dice cost
//! `O(n * 6n)` instead of walking all `6^n` raw outcomes. Probabilities are read off as a
//! reduced fraction of two integers, so two windows with the same rational probability give
//! bit-identical floats no matter how many dice produced them.

use crate::dice::rng::FACES;

/// Largest pool of d6 whose `6^n` outcomes still fit a `u128` count.
pub const MAX_EXACT_DICE: u32 = 49;

/// `weights[s] / denominator` is `P(sum == s)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SumDistribution {
    weights: Vec<u128>,
    denominator: u128,
}

impl SumDistribution {
    /// Point mass at zero: the sum of no dice.
    pub fn empty() -> Self {
        Self {
            weights: vec![1],
            denominator: 1,
        }
    }

    /// Outcome weights indexed by sum over a common `denominator`. None unless the weights
    /// add up to exactly `denominator`.
    pub fn from_weights(weights: Vec<u128>, denominator: u128) -> Option<Self> {
        let total = weights
            .iter()
            .try_fold(0_u128, |acc, &weight| acc.checked_add(weight))?;
        (denominator > 0 && total == denominator).then_some(Self {
            weights,
            denominator,
        })
    }

    /// Distribution of the sum of `count` fair d6. None beyond [MAX_EXACT_DICE].
    pub fn fair(count: u32) -> Option<Self> {
        Self::empty().with_fair_dice(count)
    }

    /// Fold `count` additional fair d6 into this distribution. None once the outcome count
    /// overflows.
    pub fn with_fair_dice(self, count: u32) -> Option<Self> {
        (0..count).try_fold(self, |dist, _| dist.add_fair_die())
    }

    fn add_fair_die(&self) -> Option<Self> {
        let denominator = self.denominator.checked_mul(u128::from(FACES))?;
        let faces = FACES as usize;
        let mut next = vec![0_u128; self.weights.len() + faces];
        for (sum, &weight) in self.weights.iter().enumerate() {
            if weight == 0 {
                continue;
            }
            for slot in &mut next[sum + 1..=sum + faces] {
                *slot += weight;
            }
        }
        Some(Self {
            weights: next,
            denominator,
        })
    }

    /// Outcomes whose sum lies in `[lo, hi]`.
    pub fn hits_between(&self, lo: u32, hi: u32) -> u128 {
        if lo > hi {
            return 0;
        }
        let lo = lo as usize;
        let hi = (hi as usize).min(self.weights.len().saturating_sub(1));
        self.weights.get(lo..=hi).map_or(0, |slice| slice.iter().sum())
    }

    /// Total number of equally likely outcomes.
    pub fn denominator(&self) -> u128 {
        self.denominator
    }

    pub fn probability(&self, sum: u32) -> f64 {
        self.ratio(self.hits_between(sum, sum))
    }

    /// Mass of `[lo, hi]` intersected with the support. Empty ranges give `0.0`.
    pub fn mass_between(&self, lo: u32, hi: u32) -> f64 {
        self.ratio(self.hits_between(lo, hi))
    }

    fn ratio(&self, hits: u128) -> f64 {
        let divisor = gcd(hits, self.denominator);
        (hits / divisor) as f64 / (self.denominator / divisor) as f64
    }
}

fn gcd(mut a: u128, mut b: u128) -> u128 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a.max(1)
}
