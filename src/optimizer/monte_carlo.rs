//! Sampled success estimates for pools too large (or too explosive) to score exactly.

use crate::dice::hazard::HazardDie;
use crate::optimizer::allocation::TargetWindow;
use crate::parallel::batch::count_hits;

/// Hit rate of `dice` fair d6 over `trials` seeded draws.
pub fn sample_fair(
    dice: u32,
    window: TargetWindow,
    trials: usize,
    seed: u64,
    parallel: bool,
) -> f64 {
    let hits = count_hits(trials, seed, parallel, |rng| window.contains(rng.roll_sum(dice)));
    hit_rate(hits, trials)
}

/// Hit rate when the first of `dice` is the hazard die and the rest are fair d6.
pub fn sample_hazard(
    dice: u32,
    window: TargetWindow,
    hazard: &HazardDie,
    trials: usize,
    seed: u64,
    parallel: bool,
) -> f64 {
    if dice == 0 {
        return 0.0;
    }
    let hits = count_hits(trials, seed, parallel, |rng| {
        let total = hazard.sample(rng) + rng.roll_sum(dice - 1);
        window.contains(total)
    });
    hit_rate(hits, trials)
}

fn hit_rate(hits: usize, trials: usize) -> f64 {
    if trials == 0 {
        0.0
    } else {
        hits as f64 / trials as f64
    }
}
