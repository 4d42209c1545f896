//! Queued helper facade with per-kind listener sets.

use super::command::{Command, HelperPhase, HelperSlot, SubmitMode};
use super::context::ContextHandle;
use crate::domain::HelperId;
use crate::ports::BillingApi;
use shared_bus::{
    BillingListener, ListenerRegistry, OnConsumeListener, OnInventoryListener, OnPurchaseListener,
    OnSetupListener, OnSkuDetailsListener,
};
use shared_types::{BillingError, BillingRequest, InteractionToken, UiHandle};
use std::sync::Arc;
use tracing::debug;

/// Facade that queues requests behind the one in flight and starts setup
/// lazily.
///
/// Listeners receive events only while the helper is registered.
/// Listener registration must happen on the dispatch thread; requests may be
/// posted from anywhere.
pub struct AdvancedIabHelper {
    id: HelperId,
    context: ContextHandle,
    listeners: Arc<ListenerRegistry>,
    slot: Arc<HelperSlot>,
}

impl AdvancedIabHelper {
    pub(crate) fn attach(context: ContextHandle) -> Result<Self, BillingError> {
        let id = context.next_helper_id();
        let slot = Arc::new(HelperSlot::new());
        context.send(Command::Attach {
            helper: id,
            slot: Arc::clone(&slot),
        })?;
        debug!(helper = id, "Advanced helper created");
        Ok(Self {
            id,
            context,
            listeners: Arc::new(ListenerRegistry::new()),
            slot,
        })
    }

    #[must_use]
    pub fn id(&self) -> HelperId {
        self.id
    }

    #[must_use]
    pub fn phase(&self) -> HelperPhase {
        self.slot.phase()
    }

    /// Total listeners across all kinds.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    fn ensure_alive(&self) -> Result<(), BillingError> {
        if self.slot.is_disposed() {
            return Err(BillingError::Disposed { helper: self.id });
        }
        Ok(())
    }

    /// Start receiving events.
    pub fn register(&self) -> Result<(), BillingError> {
        self.ensure_alive()?;
        self.context.send(Command::Register {
            helper: self.id,
            listeners: Arc::clone(&self.listeners),
        })
    }

    /// Stop receiving events, drop queued requests and clear listeners.
    ///
    /// Terminal: later requests and registrations are rejected. A request
    /// already in flight still completes and is published to others.
    /// Dropping the helper does the same.
    pub fn unregister(&self) -> Result<(), BillingError> {
        if !self.slot.dispose() {
            return Ok(());
        }
        self.listeners.clear();
        self.context.send(Command::Unregister { helper: self.id })
    }

    /// Re-bind an outstanding purchase interaction to a live UI.
    pub fn resume_purchase(&self, token: &InteractionToken, ui: UiHandle) -> Result<(), BillingError> {
        self.ensure_alive()?;
        self.context.send(Command::Resume {
            token: token.clone(),
            ui,
        })
    }

    // =========================================================================
    // LISTENERS
    // =========================================================================

    /// Adds a setup listener. If setup already finished, the listener is
    /// called with the recorded response before this returns.
    pub fn add_setup_listener(&self, listener: Arc<dyn OnSetupListener>) -> Result<(), BillingError> {
        self.check_listener_call("add_setup_listener")?;
        if self.listeners.add_setup(Arc::clone(&listener)) {
            if let Some(setup) = self.context.setup_response() {
                listener.on_setup(&setup);
            }
        }
        Ok(())
    }

    pub fn add_purchase_listener(
        &self,
        listener: Arc<dyn OnPurchaseListener>,
    ) -> Result<(), BillingError> {
        self.check_listener_call("add_purchase_listener")?;
        self.listeners.add_purchase(listener);
        Ok(())
    }

    pub fn add_consume_listener(
        &self,
        listener: Arc<dyn OnConsumeListener>,
    ) -> Result<(), BillingError> {
        self.check_listener_call("add_consume_listener")?;
        self.listeners.add_consume(listener);
        Ok(())
    }

    pub fn add_sku_details_listener(
        &self,
        listener: Arc<dyn OnSkuDetailsListener>,
    ) -> Result<(), BillingError> {
        self.check_listener_call("add_sku_details_listener")?;
        self.listeners.add_sku_details(listener);
        Ok(())
    }

    pub fn add_inventory_listener(
        &self,
        listener: Arc<dyn OnInventoryListener>,
    ) -> Result<(), BillingError> {
        self.check_listener_call("add_inventory_listener")?;
        self.listeners.add_inventory(listener);
        Ok(())
    }

    /// Adds `listener` to all five sets.
    pub fn add_billing_listener<L>(&self, listener: Arc<L>) -> Result<(), BillingError>
    where
        L: BillingListener + 'static,
    {
        self.check_listener_call("add_billing_listener")?;
        self.add_setup_listener(listener.clone())?;
        self.add_purchase_listener(listener.clone())?;
        self.add_consume_listener(listener.clone())?;
        self.add_sku_details_listener(listener.clone())?;
        self.add_inventory_listener(listener)
    }

    fn check_listener_call(&self, operation: &'static str) -> Result<(), BillingError> {
        self.context.ensure_dispatch_thread(operation)?;
        self.ensure_alive()
    }
}

impl Drop for AdvancedIabHelper {
    fn drop(&mut self) {
        if let Err(err) = self.unregister() {
            debug!(helper = self.id, %err, "Helper dropped after its context closed");
        }
    }
}

impl BillingApi for AdvancedIabHelper {
    fn post_request(&self, request: BillingRequest) -> Result<(), BillingError> {
        self.ensure_alive()?;
        self.context.send(Command::Submit {
            helper: self.id,
            request,
            mode: SubmitMode::Scheduled,
        })
    }
}
