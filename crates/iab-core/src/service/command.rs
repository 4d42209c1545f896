//! Messages consumed by the dispatch thread.

use crate::domain::HelperId;
use crate::ports::Job;
use parking_lot::Mutex;
use shared_bus::ListenerRegistry;
use shared_types::{
    ActivityResultEvent, BillingRequest, BillingResponse, InteractionToken, LifecycleEvent,
    SetupResponse, UiHandle,
};
use std::sync::Arc;

/// How a submitted request is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SubmitMode {
    /// Queue behind the in-flight request, with lazy setup.
    Scheduled,
    /// Run now or fail immediately.
    Direct,
}

/// What a provider call produced.
#[derive(Debug)]
pub(crate) enum ProviderReply {
    Setup(SetupResponse),
    Response(BillingResponse),
    AwaitingUser(InteractionToken),
}

pub(crate) enum Command {
    Attach {
        helper: HelperId,
        slot: Arc<HelperSlot>,
    },
    Register {
        helper: HelperId,
        listeners: Arc<ListenerRegistry>,
    },
    Unregister {
        helper: HelperId,
    },
    Submit {
        helper: HelperId,
        request: BillingRequest,
        mode: SubmitMode,
    },
    Deliver(ProviderReply),
    Lifecycle(LifecycleEvent),
    ActivityResult(ActivityResultEvent),
    Resume {
        token: InteractionToken,
        ui: UiHandle,
    },
    Run(Job),
    Shutdown,
}

impl Command {
    pub(crate) fn name(&self) -> &'static str {
        match self {
            Self::Attach { .. } => "attach",
            Self::Register { .. } => "register",
            Self::Unregister { .. } => "unregister",
            Self::Submit { .. } => "submit",
            Self::Deliver(_) => "deliver",
            Self::Lifecycle(_) => "lifecycle",
            Self::ActivityResult(_) => "activity_result",
            Self::Resume { .. } => "resume",
            Self::Run(_) => "run",
            Self::Shutdown => "shutdown",
        }
    }
}

/// Observable state of an advanced helper.
///
/// ```text
/// Uninitialized ──→ AwaitingSetup ──→ Ready ⇄ Dispatching
///                                        │
///                        (any) ──unregister──→ Disposed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelperPhase {
    /// Created; the dispatch thread has not seen it register or submit yet.
    Uninitialized,
    /// Waiting for provider setup to finish.
    AwaitingSetup,
    /// Setup done, none of this helper's requests in flight.
    Ready,
    /// One of this helper's requests is in flight.
    Dispatching,
    /// Unregistered. Terminal.
    Disposed,
}

/// Phase cell shared between a helper and the dispatch thread.
#[derive(Debug)]
pub(crate) struct HelperSlot {
    phase: Mutex<HelperPhase>,
}

impl HelperSlot {
    pub(crate) fn new() -> Self {
        Self {
            phase: Mutex::new(HelperPhase::Uninitialized),
        }
    }

    pub(crate) fn phase(&self) -> HelperPhase {
        *self.phase.lock()
    }

    /// Uninitialized → AwaitingSetup. Returns whether the phase changed.
    pub(crate) fn activate(&self) -> bool {
        let mut phase = self.phase.lock();
        if *phase != HelperPhase::Uninitialized {
            return false;
        }
        *phase = HelperPhase::AwaitingSetup;
        true
    }

    /// Moves an active helper to `next`.
    ///
    /// Uninitialized and Disposed helpers are left alone. Returns the previous
    /// phase when it changed.
    pub(crate) fn advance(&self, next: HelperPhase) -> Option<HelperPhase> {
        let mut phase = self.phase.lock();
        let current = *phase;
        if matches!(current, HelperPhase::Uninitialized | HelperPhase::Disposed) || current == next {
            return None;
        }
        *phase = next;
        Some(current)
    }

    /// Marks the helper disposed. Returns false if it already was.
    pub(crate) fn dispose(&self) -> bool {
        let mut phase = self.phase.lock();
        if *phase == HelperPhase::Disposed {
            return false;
        }
        *phase = HelperPhase::Disposed;
        true
    }

    pub(crate) fn is_disposed(&self) -> bool {
        self.phase() == HelperPhase::Disposed
    }
}
