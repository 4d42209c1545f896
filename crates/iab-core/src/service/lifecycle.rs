//! Lifecycle bridge: host UI events into the billing event stream.

use super::command::Command;
use super::context::ContextHandle;
use shared_types::{ActivityResultEvent, BillingError, LifecycleEvent, LifecycleKind, UiHandle};
use tracing::trace;

/// Forwards host UI lifecycle transitions and store-screen results.
///
/// An activity result whose UI and request code match the purchase waiting
/// for the user completes that purchase.
#[derive(Clone)]
pub struct LifecycleBridge {
    context: ContextHandle,
}

impl LifecycleBridge {
    pub(crate) fn new(context: ContextHandle) -> Self {
        Self { context }
    }

    pub fn on_lifecycle(&self, kind: LifecycleKind, ui: UiHandle) -> Result<(), BillingError> {
        trace!(?kind, %ui, "Lifecycle event");
        self.context
            .send(Command::Lifecycle(LifecycleEvent::new(kind, ui)))
    }

    pub fn on_activity_result(&self, result: ActivityResultEvent) -> Result<(), BillingError> {
        trace!(
            ui = %result.ui,
            request_code = result.request_code,
            result_code = result.result_code,
            "Activity result"
        );
        self.context.send(Command::ActivityResult(result))
    }
}
