//! Dice-pool split optimizer.
//!
//! Given a pool of d6, a difficulty and a minimum number of reserved dice, search every split
//! into rolled, window-expansion and reserved dice and return the one most likely to land the
//! rolled sum inside the widened target window.

pub mod cli;
pub mod config;
pub mod data;
pub mod dice;
pub mod logging;
pub mod optimizer;
pub mod parallel;
pub mod server;

pub use optimizer::{find_best, optimize, OptimizeError, SearchResult};
