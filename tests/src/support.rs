//! Shared fixtures for the integration flows.

use iab_core::adapters::{DeferredExecutor, InlineExecutor, RecordingProvider};
use iab_core::{BillingContext, BillingProvider, IabConfig};
use parking_lot::Mutex;
use shared_bus::{
    BillingEvent, OnConsumeListener, OnInventoryListener, OnPurchaseListener, OnSetupListener,
    OnSkuDetailsListener,
};
use shared_types::{
    ConsumeResponse, InteractionToken, InventoryResponse, PurchaseResponse, RequestKind,
    SetupResponse, SkuDetailsResponse, Status,
};
use std::sync::Arc;

/// Listener for every kind that keeps what it saw, in order.
#[derive(Default)]
pub struct EventLog {
    events: Mutex<Vec<BillingEvent>>,
}

impl EventLog {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<BillingEvent> {
        self.events.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    /// `(kind, status)` of every billing response, in delivery order.
    pub fn responses(&self) -> Vec<(RequestKind, Status)> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                BillingEvent::Billing(response) => Some((response.kind(), response.status())),
                _ => None,
            })
            .collect()
    }

    pub fn setups(&self) -> Vec<SetupResponse> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                BillingEvent::Setup(setup) => Some(setup.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn tokens(&self) -> Vec<InteractionToken> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                BillingEvent::InteractionRequired(token) => Some(token.clone()),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: BillingEvent) {
        self.events.lock().push(event);
    }
}

impl OnSetupListener for EventLog {
    fn on_setup(&self, response: &SetupResponse) {
        self.push(BillingEvent::Setup(response.clone()));
    }
}

impl OnPurchaseListener for EventLog {
    fn on_purchase(&self, response: &PurchaseResponse) {
        self.push(BillingEvent::Billing(response.clone().into()));
    }

    fn on_interaction_required(&self, token: &InteractionToken) {
        self.push(BillingEvent::InteractionRequired(token.clone()));
    }
}

impl OnConsumeListener for EventLog {
    fn on_consume(&self, response: &ConsumeResponse) {
        self.push(BillingEvent::Billing(response.clone().into()));
    }
}

impl OnSkuDetailsListener for EventLog {
    fn on_sku_details(&self, response: &SkuDetailsResponse) {
        self.push(BillingEvent::Billing(response.clone().into()));
    }
}

impl OnInventoryListener for EventLog {
    fn on_inventory(&self, response: &InventoryResponse) {
        self.push(BillingEvent::Billing(response.clone().into()));
    }
}

/// Context whose provider calls run inline on the dispatch thread, so one
/// `pump` settles everything.
pub fn inline_context(provider: Arc<dyn BillingProvider>) -> BillingContext {
    BillingContext::new(IabConfig::default(), provider, Box::new(InlineExecutor))
        .expect("default config is valid")
}

pub fn recording_context(provider: RecordingProvider) -> (BillingContext, Arc<RecordingProvider>) {
    let provider = Arc::new(provider);
    (inline_context(provider.clone()), provider)
}

/// Context whose provider calls wait until the test runs them, so requests
/// can pile up behind one in flight.
pub struct Deferred {
    pub context: BillingContext,
    pub provider: Arc<RecordingProvider>,
    pub executor: Arc<DeferredExecutor>,
}

impl Deferred {
    pub fn new(provider: RecordingProvider) -> Self {
        let provider = Arc::new(provider);
        let executor = Arc::new(DeferredExecutor::new());
        let context = BillingContext::new(
            IabConfig::default(),
            provider.clone(),
            Box::new(executor.clone()),
        )
        .expect("default config is valid");
        Self {
            context,
            provider,
            executor,
        }
    }

    /// Run one round of provider calls, then handle their replies.
    pub fn step(&self) -> usize {
        let ran = self.executor.run_all();
        self.context.pump();
        ran
    }

    /// Step until no provider call is left.
    pub fn settle(&self) {
        self.context.pump();
        while self.step() > 0 {}
    }
}
