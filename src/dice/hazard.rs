//! Hazard die: an exploding d6. A six is kept and the die is rolled again; any other face
//! ends the chain. A total of `6j + f` (`f` in `1..=5`) needs exactly `j` sixes then `f`,
//! so its mass is `(1/6)^(j+1)` and no total is ever a multiple of six.

use crate::dice::distribution::SumDistribution;
use crate::dice::rng::{Rng, FACES};

/// Explosion levels kept by default. The dropped tail is `(1/6)^12 < 1e-9`.
pub const DEFAULT_HAZARD_DEPTH: u32 = 12;

/// Deepest truncation accepted. Leaves room for fair dice in a `u128` outcome count.
pub const MAX_HAZARD_DEPTH: u32 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HazardDie {
    depth: u32,
}

impl Default for HazardDie {
    fn default() -> Self {
        Self::with_depth(DEFAULT_HAZARD_DEPTH)
    }
}

impl HazardDie {
    /// Truncate the distribution after `depth` consecutive sixes, clamped to
    /// `1..=`[MAX_HAZARD_DEPTH].
    pub fn with_depth(depth: u32) -> Self {
        Self {
            depth: depth.clamp(1, MAX_HAZARD_DEPTH),
        }
    }

    /// Largest total represented in the truncated distribution.
    pub fn max_total(&self) -> u32 {
        FACES * (self.depth - 1) + (FACES - 1)
    }

    /// Truncated distribution over `6^depth` equally weighted chains. A total at level `j`
    /// carries weight `6^(depth-1-j)`; the single chain of `depth` sixes is folded into the
    /// top bucket so the weights still cover every outcome.
    pub fn distribution(&self) -> SumDistribution {
        let faces = u128::from(FACES);
        let mut weights = vec![0_u128; self.max_total() as usize + 1];
        let mut chain = faces.pow(self.depth - 1);
        for sixes in 0..self.depth {
            for face in 1..FACES {
                weights[(FACES * sixes + face) as usize] = chain;
            }
            chain /= faces;
        }
        if let Some(top) = weights.last_mut() {
            *top += 1;
        }
        SumDistribution::from_weights(weights, faces.pow(self.depth))
            .unwrap_or_else(SumDistribution::empty)
    }

    /// Roll the die once, exploding on sixes.
    pub fn sample(&self, rng: &mut Rng) -> u32 {
        let mut total = 0;
        loop {
            let face = rng.roll_d6();
            total += face;
            if face != FACES {
                return total;
            }
        }
    }
}
