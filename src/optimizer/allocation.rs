//! Pool splits and the target windows they produce.

use serde::{Deserialize, Serialize};

use crate::data::difficulty::DifficultyProfile;
use crate::dice::rng::FACES;

/// One split of the pool into rolled, window-expansion and reserved dice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Allocation {
    pub total_dice: u32,
    pub rolled: u32,
    pub expansion: u32,
    pub reserved: u32,
}

impl Allocation {
    /// Split `total_dice`; the remainder after rolling and expanding is reserved.
    /// Returns None when rolled + expansion exceeds the pool.
    pub fn new(total_dice: u32, rolled: u32, expansion: u32) -> Option<Self> {
        let reserved = total_dice.checked_sub(rolled)?.checked_sub(expansion)?;
        Some(Self {
            total_dice,
            rolled,
            expansion,
            reserved,
        })
    }
}

/// Inclusive range of winning sums.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetWindow {
    pub min: u32,
    pub max: u32,
}

impl TargetWindow {
    pub fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    /// Base window widened symmetrically by `expansion`, low end floored at 1.
    pub fn widened(profile: &DifficultyProfile, expansion: u32) -> Self {
        Self {
            min: profile.min_target.saturating_sub(expansion).max(1),
            max: profile.max_target.saturating_add(expansion),
        }
    }

    /// Cap the high end at `ceiling`.
    pub fn clipped_to(self, ceiling: u32) -> Self {
        Self {
            min: self.min,
            max: self.max.min(ceiling),
        }
    }

    /// Empty (`min > max`) or degenerate (`max < 1`) windows cannot be hit.
    pub fn is_empty(&self) -> bool {
        self.min > self.max || self.max < 1
    }

    pub fn contains(&self, sum: u32) -> bool {
        (self.min..=self.max).contains(&sum)
    }

    pub fn bounds(&self) -> [u32; 2] {
        [self.min, self.max]
    }
}

/// Unclipped window shown to the player next to the clipped one used for scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowPair {
    pub display: TargetWindow,
    pub computation: TargetWindow,
}

impl WindowPair {
    /// `hazard_buffer` is Some when the hazard die replaces one rolled die.
    pub fn derive(
        profile: &DifficultyProfile,
        allocation: &Allocation,
        hazard_buffer: Option<u32>,
    ) -> Self {
        let display = TargetWindow::widened(profile, allocation.expansion);
        let ceiling = max_achievable_sum(allocation.rolled, hazard_buffer);
        Self {
            display,
            computation: display.clipped_to(ceiling),
        }
    }
}

/// Highest sum `rolled` dice reach: `6 * rolled`, plus the buffer when a hazard die explodes.
pub fn max_achievable_sum(rolled: u32, hazard_buffer: Option<u32>) -> u32 {
    FACES * rolled + hazard_buffer.unwrap_or(0)
}
