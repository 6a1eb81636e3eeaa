pub mod batch;
pub mod pool;

pub use batch::{batch_sizes, count_hits, TRIAL_BATCHES};
pub use pool::WorkerPool;
