//! Bounded background worker pool for terrain generation jobs.

use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::{Duration, Instant};

use log::{error, info};
use rayon::ThreadPoolBuilder;

use crate::error::TerrainError;

/// Jobs submitted but not yet finished, with a wakeup for waiters
#[derive(Debug, Default)]
struct InFlight {
    count: Mutex<usize>,
    idle: Condvar,
}

impl InFlight {
    fn begin(&self) {
        *self.count.lock().unwrap_or_else(PoisonError::into_inner) += 1;
    }

    fn finish(&self) {
        let mut count = self.count.lock().unwrap_or_else(PoisonError::into_inner);
        *count = count.saturating_sub(1);
        if *count == 0 {
            self.idle.notify_all();
        }
    }

    fn get(&self) -> usize {
        *self.count.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Releases a job's in-flight slot even if the job panics
struct FinishGuard(Arc<InFlight>);

impl Drop for FinishGuard {
    fn drop(&mut self) {
        self.0.finish();
    }
}

/// A wrapper around a rayon thread pool that tracks outstanding jobs
pub struct WorkerPool {
    pool: rayon::ThreadPool,
    num_threads: usize,
    in_flight: Arc<InFlight>,
}

impl WorkerPool {
    /// Create a pool with `size` threads (0 = one per CPU)
    pub fn new(size: usize) -> Result<Self, TerrainError> {
        let num_threads = if size > 0 { size } else { num_cpus::get() };

        let pool = ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .thread_name(|i| format!("terrain-worker-{}", i))
            .panic_handler(|_| error!("Terrain worker job panicked; its result is lost"))
            .build()?;

        info!("Created terrain worker pool with {} threads", num_threads);

        Ok(Self {
            pool,
            num_threads,
            in_flight: Arc::new(InFlight::default()),
        })
    }

    /// Run a job in the background
    pub fn execute<F>(&self, f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.in_flight.begin();
        let guard = FinishGuard(Arc::clone(&self.in_flight));
        self.pool.spawn(move || {
            let _guard = guard;
            f();
        });
    }

    pub fn num_threads(&self) -> usize {
        self.num_threads
    }

    /// Jobs submitted and not yet finished
    pub fn in_flight(&self) -> usize {
        self.in_flight.get()
    }

    /// Block until every submitted job has finished or `timeout` elapses.
    /// Returns true if the pool went idle.
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut count = self
            .in_flight
            .count
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        while *count > 0 {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            count = self
                .in_flight
                .idle
                .wait_timeout(count, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
        true
    }
}
