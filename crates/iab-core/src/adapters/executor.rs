//! Backend executors.

use crate::ports::{BackendExecutor, Job};
use parking_lot::Mutex;
use shared_types::BillingError;
use std::collections::VecDeque;
use tokio::runtime::Handle;
use tracing::trace;

/// Runs jobs on tokio's blocking pool.
#[derive(Debug, Clone)]
pub struct TokioExecutor {
    handle: Handle,
}

impl TokioExecutor {
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Executor bound to the runtime the caller is running in.
    pub fn current() -> Result<Self, BillingError> {
        Handle::try_current()
            .map(Self::new)
            .map_err(|e| BillingError::Setup(format!("no tokio runtime: {e}")))
    }
}

impl BackendExecutor for TokioExecutor {
    fn execute(&self, job: Job) {
        // The reply travels through the command channel; the join handle is not needed.
        drop(self.handle.spawn_blocking(job));
    }
}

/// Runs jobs immediately on the calling thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineExecutor;

impl BackendExecutor for InlineExecutor {
    fn execute(&self, job: Job) {
        job();
    }
}

/// Holds jobs until [`DeferredExecutor::run_next`] or
/// [`DeferredExecutor::run_all`] is called.
///
/// Lets tests observe the core while a request is in flight.
#[derive(Default)]
pub struct DeferredExecutor {
    jobs: Mutex<VecDeque<Job>>,
}

impl DeferredExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn pending(&self) -> usize {
        self.jobs.lock().len()
    }

    /// Run the oldest held job. Returns false if none was held.
    pub fn run_next(&self) -> bool {
        // Release the lock before running: the job may enqueue more work.
        let job = self.jobs.lock().pop_front();
        match job {
            Some(job) => {
                job();
                true
            }
            None => false,
        }
    }

    /// Run held jobs until none are left. Returns how many ran.
    pub fn run_all(&self) -> usize {
        let mut ran = 0;
        while self.run_next() {
            ran += 1;
        }
        ran
    }
}

impl BackendExecutor for DeferredExecutor {
    fn execute(&self, job: Job) {
        let mut jobs = self.jobs.lock();
        jobs.push_back(job);
        trace!(pending = jobs.len(), "Job deferred");
    }
}

impl<E: BackendExecutor + ?Sized> BackendExecutor for std::sync::Arc<E> {
    fn execute(&self, job: Job) {
        (**self).execute(job);
    }
}
