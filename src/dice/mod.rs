pub mod distribution;
pub mod hazard;
pub mod rng;

pub use distribution::{SumDistribution, MAX_EXACT_DICE};
pub use hazard::{HazardDie, DEFAULT_HAZARD_DEPTH, MAX_HAZARD_DEPTH};
pub use rng::{derive_seed, entropy_seed, Rng, FACES};
