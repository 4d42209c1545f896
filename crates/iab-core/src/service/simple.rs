//! Direct helper facade.

use super::command::{Command, SubmitMode};
use super::context::ContextHandle;
use crate::domain::HelperId;
use crate::ports::BillingApi;
use shared_types::{BillingError, BillingRequest};

/// Facade that runs one request at a time against the active provider.
///
/// There is no queue and no lazy setup. A request made before setup
/// succeeded is answered with `BillingUnavailable`; one made while the
/// provider is busy is answered with `ServiceUnavailable`. Responses are
/// published like any other, so observe them through an advanced helper's
/// listeners or a tap subscription.
#[derive(Clone)]
pub struct SimpleIabHelper {
    id: HelperId,
    context: ContextHandle,
}

impl SimpleIabHelper {
    pub(crate) fn new(context: ContextHandle) -> Self {
        Self {
            id: context.next_helper_id(),
            context,
        }
    }

    #[must_use]
    pub fn id(&self) -> HelperId {
        self.id
    }
}

impl BillingApi for SimpleIabHelper {
    fn post_request(&self, request: BillingRequest) -> Result<(), BillingError> {
        self.context.send(Command::Submit {
            helper: self.id,
            request,
            mode: SubmitMode::Direct,
        })
    }
}
