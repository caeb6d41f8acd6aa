//! Bounded worker pool for stat and hash work

use rayon::ThreadPool;

use crate::{Error, Result};

/// Create a thread pool with the given thread count.
///
/// `None` (or `Some(0)`) uses rayon's default of one thread per CPU.
pub(crate) fn create_thread_pool(threads: Option<usize>) -> Result<ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads.unwrap_or(0))
        .thread_name(|i| format!("sysset-hash-{i}"))
        .build()
        .map_err(|e| Error::WorkerPool {
            message: e.to_string(),
        })
}
