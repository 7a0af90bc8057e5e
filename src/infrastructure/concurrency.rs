//! Thread pool setup for depviz.
//! Independent include traversals run on the global rayon pool.

use anyhow::Result;
use tracing::info;

/// Worker count: the requested number, else half the cores (at least one).
pub fn worker_count(requested: Option<usize>) -> usize {
    requested
        .filter(|&n| n > 0)
        .unwrap_or_else(|| std::cmp::max(1, num_cpus::get() / 2))
}

/// Initialize the global rayon thread pool.
pub fn init_thread_pool(requested: Option<usize>) -> Result<usize> {
    let workers = worker_count(requested);

    rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build_global()?;

    info!(
        "Initialized thread pool: {} workers (system has {} cores)",
        workers,
        num_cpus::get()
    );

    Ok(workers)
}
