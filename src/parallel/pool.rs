//! Rayon thread pool configuration for search workloads.
//!
//! Use [WorkerPool::install] to run a search with a fixed number of threads, or rely on
//! Rayon's default (all CPU cores).

use std::env;

use rayon::ThreadPoolBuilder;

/// Environment variable that pins the worker count.
pub const WORKERS_ENV: &str = "PSI_WORKERS";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerPool {
    /// Number of worker threads. If 0, use the global Rayon pool.
    pub workers: usize,
}

impl WorkerPool {
    pub fn with_workers(n: usize) -> Self {
        Self { workers: n }
    }

    /// Read [WORKERS_ENV]; unset or unparsable values mean the Rayon default.
    pub fn from_env() -> Self {
        let workers = env::var(WORKERS_ENV)
            .ok()
            .and_then(|raw| raw.trim().parse::<usize>().ok())
            .unwrap_or(0);
        Self { workers }
    }

    /// Run `f` on a pool of this size. Falls back to the global pool if a dedicated pool
    /// cannot be built.
    pub fn install<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R + Send,
        R: Send,
    {
        if self.workers == 0 {
            return f();
        }
        match ThreadPoolBuilder::new().num_threads(self.workers).build() {
            Ok(pool) => pool.install(f),
            Err(err) => {
                tracing::warn!(workers = self.workers, error = %err, "falling back to global rayon pool");
                f()
            }
        }
    }
}
