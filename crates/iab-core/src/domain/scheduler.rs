//! Request scheduler.
//!
//! Decides what happens to each submitted request and holds the per-helper
//! FIFO queues of requests waiting for the provider.
//!
//! ```text
//! submit ──→ Routing::decide
//!              ├─ LazySetup  → enqueue, dispatch Setup first
//!              ├─ Dispatch   → provider idle, run now
//!              ├─ Duplicate  → equal to the pending request, drop
//!              └─ Enqueue    → append to the helper's queue
//! ```

use super::state::BillingState;
use shared_types::BillingRequest;
use std::collections::{BTreeMap, VecDeque};
use tracing::debug;

/// Identity of a helper facade. `0` is reserved for the context itself.
pub type HelperId = u64;

/// Helper id used for requests made by the context rather than a facade.
pub const CONTEXT_HELPER: HelperId = 0;

/// What to do with a submitted request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Routing {
    /// Setup has not run yet: queue the request and start setup.
    LazySetup,
    /// Provider is idle: dispatch immediately.
    Dispatch,
    /// Request equals the one in flight: drop it.
    Duplicate,
    /// Provider is busy: queue the request.
    Enqueue,
}

impl Routing {
    #[must_use]
    pub fn decide(state: &BillingState, request: &BillingRequest) -> Self {
        if state.pending_request() == Some(request) {
            return Self::Duplicate;
        }
        let needs_setup =
            state.setup_response().is_none() && !matches!(request, BillingRequest::Setup);
        match (needs_setup, state.is_busy()) {
            (true, false) => Self::LazySetup,
            (false, false) => Self::Dispatch,
            (_, true) => Self::Enqueue,
        }
    }
}

/// Per-helper FIFO queues.
#[derive(Debug, Default)]
pub struct RequestScheduler {
    queues: BTreeMap<HelperId, VecDeque<BillingRequest>>,
}

impl RequestScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `request` to the helper's queue.
    pub fn schedule(&mut self, helper: HelperId, request: BillingRequest) {
        let queue = self.queues.entry(helper).or_default();
        queue.push_back(request);
        debug!(helper, queued = queue.len(), "Request scheduled");
    }

    /// Next request to run.
    ///
    /// The preferred helper (normally the owner of the request that just
    /// finished) goes first; otherwise the lowest helper id with work.
    pub fn pop_next(&mut self, preferred: Option<HelperId>) -> Option<(HelperId, BillingRequest)> {
        let helper = preferred
            .filter(|id| self.queues.get(id).is_some_and(|q| !q.is_empty()))
            .or_else(|| {
                self.queues
                    .iter()
                    .find(|(_, queue)| !queue.is_empty())
                    .map(|(id, _)| *id)
            })?;

        let queue = self.queues.get_mut(&helper)?;
        let request = queue.pop_front()?;
        if queue.is_empty() {
            self.queues.remove(&helper);
        }
        Some((helper, request))
    }

    /// Discard everything queued for `helper`. Returns how many were dropped.
    pub fn drop_queue(&mut self, helper: HelperId) -> usize {
        let dropped = self.queues.remove(&helper).map_or(0, |q| q.len());
        if dropped > 0 {
            debug!(helper, dropped, "Queue dropped");
        }
        dropped
    }

    pub fn queued(&self, helper: HelperId) -> impl Iterator<Item = &BillingRequest> {
        self.queues.get(&helper).into_iter().flatten()
    }

    #[must_use]
    pub fn queue_len(&self, helper: HelperId) -> usize {
        self.queues.get(&helper).map_or(0, VecDeque::len)
    }

    #[must_use]
    pub fn total_queued(&self) -> usize {
        self.queues.values().map(VecDeque::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queues.is_empty()
    }
}
