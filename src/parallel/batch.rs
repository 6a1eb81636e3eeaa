//! Deterministic batching for parallel trial loops.
//!
//! Trials are cut into [TRIAL_BATCHES] batches and every batch draws from its own derived
//! generator. The partition never depends on the thread count, so a seeded run gives the
//! same hit count sequentially, on two cores or on sixty-four.

use rayon::prelude::*;

use crate::dice::rng::{derive_seed, Rng};

/// Batches per trial loop. Fixed so results do not depend on the machine.
pub const TRIAL_BATCHES: usize = 64;

/// Trial count of each batch when `trials` are spread over at most `batches` batches.
/// The first `trials % batches` batches take one extra trial; no batch is empty.
pub fn batch_sizes(trials: usize, batches: usize) -> Vec<usize> {
    let batches = batches.min(trials);
    if batches == 0 {
        return Vec::new();
    }
    let (share, extra) = (trials / batches, trials % batches);
    (0..batches)
        .map(|batch| share + usize::from(batch < extra))
        .collect()
}

/// Run `trials` independent draws of `trial` and count how many return true.
/// With `parallel` the batches are reduced on the Rayon pool; the count is identical either way.
///
/// # Example
/// ```
/// # use psi_optimizer::parallel::count_hits;
/// let sixes = |rng: &mut psi_optimizer::dice::Rng| rng.roll_d6() == 6;
/// assert_eq!(count_hits(6_000, 9, true, sixes), count_hits(6_000, 9, false, sixes));
/// ```
pub fn count_hits<F>(trials: usize, seed: u64, parallel: bool, trial: F) -> usize
where
    F: Fn(&mut Rng) -> bool + Sync,
{
    let sizes = batch_sizes(trials, TRIAL_BATCHES);
    let run_batch = |(stream, &size): (usize, &usize)| {
        let mut rng = Rng::new(derive_seed(seed, stream as u64));
        (0..size).filter(|_| trial(&mut rng)).count()
    };

    if parallel {
        sizes.par_iter().enumerate().map(run_batch).sum()
    } else {
        sizes.iter().enumerate().map(run_batch).sum()
    }
}
