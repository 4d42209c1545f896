//! Billing state holder.
//!
//! One per context. Tracks the terminal setup result and the single request
//! currently in flight against the provider.
//!
//! Invariant: `busy <=> pending_request.is_some()`. The pending request is
//! replaced only by [`BillingState::mark_busy`] and cleared only by
//! [`BillingState::mark_idle`].

use shared_types::{BillingError, BillingRequest, SetupResponse};
use tracing::{trace, warn};

#[derive(Debug, Default)]
pub struct BillingState {
    setup_response: Option<SetupResponse>,
    pending_request: Option<BillingRequest>,
}

impl BillingState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transition idle -> busy with `request` in flight.
    pub fn mark_busy(&mut self, request: BillingRequest) -> Result<(), BillingError> {
        if let Some(pending) = &self.pending_request {
            return Err(BillingError::AlreadyBusy {
                pending: pending.kind(),
            });
        }
        trace!(%request, "Provider busy");
        self.pending_request = Some(request);
        Ok(())
    }

    /// Transition busy -> idle. Returns false (and logs) if already idle.
    pub fn mark_idle(&mut self) -> bool {
        match self.pending_request.take() {
            Some(request) => {
                trace!(%request, "Provider idle");
                true
            }
            None => {
                warn!("mark_idle called while provider is already idle");
                false
            }
        }
    }

    /// Stores the setup outcome. Only the first call has an effect.
    pub fn record_setup(&mut self, response: SetupResponse) -> bool {
        if self.setup_response.is_some() {
            warn!("Setup already recorded, ignoring later result");
            return false;
        }
        self.setup_response = Some(response);
        true
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.pending_request.is_some()
    }

    #[must_use]
    pub fn pending_request(&self) -> Option<&BillingRequest> {
        self.pending_request.as_ref()
    }

    #[must_use]
    pub fn setup_response(&self) -> Option<&SetupResponse> {
        self.setup_response.as_ref()
    }

    /// Setup finished with a usable provider.
    #[must_use]
    pub fn is_setup_successful(&self) -> bool {
        self.setup_response
            .as_ref()
            .is_some_and(SetupResponse::is_successful)
    }
}
