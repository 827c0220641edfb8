//! Bounded fan-out of independent work items

use crate::error::{ExplainError, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Configuration for parallel processing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParallelConfig {
    /// Number of threads (None = use rayon's global pool)
    pub n_threads: Option<usize>,
    /// Batches shorter than this run inline on the calling thread
    pub min_parallel_len: usize,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            n_threads: None,
            min_parallel_len: 8,
        }
    }
}

impl ParallelConfig {
    /// Create a new parallel configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set number of threads
    pub fn with_threads(mut self, n: usize) -> Self {
        self.n_threads = Some(n);
        self
    }

    /// Set the inline threshold
    pub fn with_min_parallel_len(mut self, len: usize) -> Self {
        self.min_parallel_len = len;
        self
    }

    /// Get the number of threads to use
    pub fn num_threads(&self) -> usize {
        self.n_threads.unwrap_or_else(rayon::current_num_threads)
    }
}

/// Worker pool that maps fallible work over a slice with bounded concurrency.
///
/// Results come back in input order, and the first error short-circuits the
/// whole batch so no partial output escapes.
#[derive(Debug)]
pub struct WorkerPool {
    pool: Option<rayon::ThreadPool>,
    min_parallel_len: usize,
}

impl WorkerPool {
    /// Build a pool from configuration
    pub fn new(config: &ParallelConfig) -> Result<Self> {
        let pool = match config.n_threads {
            Some(n_threads) => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(n_threads)
                    .thread_name(|i| format!("explain-worker-{}", i))
                    .build()
                    .map_err(|e| ExplainError::ThreadPoolError(e.to_string()))?,
            ),
            None => None,
        };

        Ok(Self {
            pool,
            min_parallel_len: config.min_parallel_len,
        })
    }

    /// Pool that always runs on the calling thread
    pub fn sequential() -> Self {
        Self {
            pool: None,
            min_parallel_len: usize::MAX,
        }
    }

    /// Upper bound on concurrently running work items
    pub fn concurrency(&self) -> usize {
        match &self.pool {
            Some(pool) => pool.current_num_threads(),
            None if self.min_parallel_len == usize::MAX => 1,
            None => rayon::current_num_threads(),
        }
    }

    /// Apply `f` to every item, preserving order
    pub fn try_map<T, U, F>(&self, items: &[T], f: F) -> Result<Vec<U>>
    where
        T: Sync,
        U: Send,
        F: Fn(&T) -> Result<U> + Send + Sync,
    {
        if items.len() < self.min_parallel_len {
            return items.iter().map(&f).collect();
        }

        let run = || items.par_iter().map(&f).collect::<Result<Vec<U>>>();

        match &self.pool {
            Some(pool) => pool.install(run),
            None => run(),
        }
    }
}
