//! # Event Dispatcher
//!
//! Synchronous, kind-routed fan-out of billing events to the listener sets of
//! every registered facade, plus a broadcast mirror for async observers.

use crate::events::{BillingEvent, EventFilter};
use crate::listeners::{
    ListenerRegistry, OnConsumeListener, OnInventoryListener, OnPurchaseListener,
    OnSetupListener, OnSkuDetailsListener,
};
use crate::subscriber::{EventStream, Subscription};
use crate::DEFAULT_CHANNEL_CAPACITY;
use shared_types::{
    BillingResponse, ConsumeResponse, InteractionToken, InventoryResponse, PurchaseResponse,
    SetupResponse, SkuDetailsResponse,
};
use std::collections::BTreeMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, error, trace};

/// Identity of a registered subscriber (one per helper facade).
pub type SubscriberId = u64;

/// Broadcast mirror of every published event.
///
/// Cheap to clone and `Send + Sync`, so async observers on any thread can
/// subscribe while the dispatcher itself stays on the dispatch thread.
#[derive(Clone)]
pub struct EventTaps {
    sender: broadcast::Sender<BillingEvent>,
    capacity: usize,
}

impl EventTaps {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender, capacity }
    }

    /// Subscribe to events matching a filter.
    #[must_use]
    pub fn subscribe(&self, filter: EventFilter) -> Subscription {
        debug!(topics = ?filter.topics, "New tap subscription created");
        Subscription::new(self.sender.subscribe(), filter)
    }

    /// Stream of events matching a filter.
    #[must_use]
    pub fn event_stream(&self, filter: EventFilter) -> EventStream {
        EventStream::new(self.sender.subscribe(), filter)
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn send(&self, event: &BillingEvent) -> usize {
        // No receivers is the normal case when nobody is tapping.
        self.sender.send(event.clone()).unwrap_or(0)
    }
}

impl Default for EventTaps {
    fn default() -> Self {
        Self::new()
    }
}

/// Delivers events to registered listener sets.
///
/// Owned by the dispatch thread; no method is called concurrently.
pub struct EventDispatcher {
    /// Registered facades, in registration order.
    subscribers: BTreeMap<SubscriberId, Arc<ListenerRegistry>>,
    taps: EventTaps,
    events_published: u64,
}

impl EventDispatcher {
    #[must_use]
    pub fn new(taps: EventTaps) -> Self {
        Self {
            subscribers: BTreeMap::new(),
            taps,
            events_published: 0,
        }
    }

    /// Adds a facade's listener sets. Returns false if `id` was already registered.
    pub fn register(&mut self, id: SubscriberId, listeners: Arc<ListenerRegistry>) -> bool {
        if self.subscribers.contains_key(&id) {
            debug!(subscriber = id, "Subscriber already registered");
            return false;
        }
        self.subscribers.insert(id, listeners);
        debug!(subscriber = id, total = self.subscribers.len(), "Subscriber registered");
        true
    }

    /// Removes a facade. Returns false if `id` was not registered.
    pub fn unregister(&mut self, id: SubscriberId) -> bool {
        let removed = self.subscribers.remove(&id).is_some();
        if removed {
            debug!(subscriber = id, total = self.subscribers.len(), "Subscriber unregistered");
        }
        removed
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    #[must_use]
    pub fn taps(&self) -> &EventTaps {
        &self.taps
    }

    #[must_use]
    pub fn events_published(&self) -> u64 {
        self.events_published
    }

    /// Publish an event to every listener registered for its kind.
    ///
    /// Listener sets are captured before the first callback runs, so a
    /// listener added during the fan-out does not receive this event.
    ///
    /// # Returns
    ///
    /// The number of listener callbacks that completed without panicking.
    pub fn publish(&mut self, event: &BillingEvent) -> usize {
        self.events_published += 1;
        let topic = event.topic();

        let batches: Vec<(SubscriberId, Batch<'_>)> = self
            .subscribers
            .iter()
            .map(|(id, registry)| (*id, Batch::capture(registry, event)))
            .collect();
        let delivered: usize = batches
            .into_iter()
            .map(|(id, batch)| batch.deliver(id))
            .sum();
        let tapped = self.taps.send(event);

        debug!(
            topic = ?topic,
            subscribers = self.subscribers.len(),
            delivered,
            tapped,
            "Event published"
        );
        delivered
    }
}

/// One facade's listeners for one event, captured ahead of delivery.
enum Batch<'e> {
    Setup(Vec<Arc<dyn OnSetupListener>>, &'e SetupResponse),
    Purchase(Vec<Arc<dyn OnPurchaseListener>>, &'e PurchaseResponse),
    Interaction(Vec<Arc<dyn OnPurchaseListener>>, &'e InteractionToken),
    Consume(Vec<Arc<dyn OnConsumeListener>>, &'e ConsumeResponse),
    SkuDetails(Vec<Arc<dyn OnSkuDetailsListener>>, &'e SkuDetailsResponse),
    Inventory(Vec<Arc<dyn OnInventoryListener>>, &'e InventoryResponse),
    // Lifecycle traffic is only mirrored to taps.
    Empty,
}

impl<'e> Batch<'e> {
    fn capture(registry: &ListenerRegistry, event: &'e BillingEvent) -> Self {
        match event {
            BillingEvent::Setup(r) => Self::Setup(registry.setup_listeners(), r),
            BillingEvent::Billing(BillingResponse::Purchase(r)) => {
                Self::Purchase(registry.purchase_listeners(), r)
            }
            BillingEvent::Billing(BillingResponse::Consume(r)) => {
                Self::Consume(registry.consume_listeners(), r)
            }
            BillingEvent::Billing(BillingResponse::SkuDetails(r)) => {
                Self::SkuDetails(registry.sku_details_listeners(), r)
            }
            BillingEvent::Billing(BillingResponse::Inventory(r)) => {
                Self::Inventory(registry.inventory_listeners(), r)
            }
            BillingEvent::InteractionRequired(token) => {
                Self::Interaction(registry.purchase_listeners(), token)
            }
            BillingEvent::Lifecycle(_) | BillingEvent::ActivityResult(_) => Self::Empty,
        }
    }

    fn deliver(self, id: SubscriberId) -> usize {
        match self {
            Self::Setup(ls, r) => isolate(id, "setup", ls, |l| l.on_setup(r)),
            Self::Purchase(ls, r) => isolate(id, "purchase", ls, |l| l.on_purchase(r)),
            Self::Interaction(ls, t) => {
                isolate(id, "interaction", ls, |l| l.on_interaction_required(t))
            }
            Self::Consume(ls, r) => isolate(id, "consume", ls, |l| l.on_consume(r)),
            Self::SkuDetails(ls, r) => isolate(id, "sku_details", ls, |l| l.on_sku_details(r)),
            Self::Inventory(ls, r) => isolate(id, "inventory", ls, |l| l.on_inventory(r)),
            Self::Empty => 0,
        }
    }
}

/// Runs `call` for each listener; a panic is logged and does not stop the loop.
fn isolate<L: ?Sized>(
    subscriber: SubscriberId,
    kind: &'static str,
    listeners: Vec<Arc<L>>,
    call: impl Fn(&L),
) -> usize {
    let mut delivered = 0;
    for listener in listeners {
        match catch_unwind(AssertUnwindSafe(|| call(&listener))) {
            Ok(()) => delivered += 1,
            Err(_) => error!(subscriber, kind, "Listener panicked, continuing delivery"),
        }
    }
    trace!(subscriber, kind, delivered, "Delivered to listener set");
    delivered
}
