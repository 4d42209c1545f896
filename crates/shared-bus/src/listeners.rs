//! # Listener Sets
//!
//! One listener trait per response kind, and the per-facade collection that
//! holds them. Listeners are identified by `Arc` identity: adding the same
//! `Arc` twice is a no-op, and insertion order is delivery order.

use parking_lot::Mutex;
use shared_types::{
    ConsumeResponse, InteractionToken, InventoryResponse, PurchaseResponse, SetupResponse,
    SkuDetailsResponse,
};
use std::sync::Arc;

/// Listener for setup responses.
pub trait OnSetupListener: Send + Sync {
    fn on_setup(&self, response: &SetupResponse);
}

/// Listener for purchase responses.
pub trait OnPurchaseListener: Send + Sync {
    fn on_purchase(&self, response: &PurchaseResponse);

    /// The purchase is waiting for the user. Keep `token` to resume the flow
    /// in another UI context if the current one goes away.
    fn on_interaction_required(&self, _token: &InteractionToken) {}
}

/// Listener for consume responses.
pub trait OnConsumeListener: Send + Sync {
    fn on_consume(&self, response: &ConsumeResponse);
}

/// Listener for sku details responses.
pub trait OnSkuDetailsListener: Send + Sync {
    fn on_sku_details(&self, response: &SkuDetailsResponse);
}

/// Listener for inventory responses.
pub trait OnInventoryListener: Send + Sync {
    fn on_inventory(&self, response: &InventoryResponse);
}

/// Listener for every response kind.
pub trait BillingListener:
    OnSetupListener + OnPurchaseListener + OnConsumeListener + OnSkuDetailsListener + OnInventoryListener
{
}

// Blanket implementation - anything that listens to all five kinds is a BillingListener
impl<T> BillingListener for T where
    T: OnSetupListener
        + OnPurchaseListener
        + OnConsumeListener
        + OnSkuDetailsListener
        + OnInventoryListener
{
}

/// Ordered set of listeners with `Arc` identity semantics.
pub struct ListenerSet<L: ?Sized> {
    listeners: Vec<Arc<L>>,
}

impl<L: ?Sized> ListenerSet<L> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    /// Adds `listener`. Returns false if it was already present.
    pub fn insert(&mut self, listener: Arc<L>) -> bool {
        if self.contains(&listener) {
            return false;
        }
        self.listeners.push(listener);
        true
    }

    #[must_use]
    pub fn contains(&self, listener: &Arc<L>) -> bool {
        self.listeners.iter().any(|l| same_listener(l, listener))
    }

    /// Copy of the current listeners, safe to iterate while the set changes.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Arc<L>> {
        self.listeners.clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub fn clear(&mut self) {
        self.listeners.clear();
    }
}

impl<L: ?Sized> Default for ListenerSet<L> {
    fn default() -> Self {
        Self::new()
    }
}

/// Data-pointer identity; vtable pointers may differ between codegen units.
fn same_listener<L: ?Sized>(a: &Arc<L>, b: &Arc<L>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

/// The five listener sets owned by one facade.
#[derive(Default)]
pub struct ListenerSets {
    pub setup: ListenerSet<dyn OnSetupListener>,
    pub purchase: ListenerSet<dyn OnPurchaseListener>,
    pub consume: ListenerSet<dyn OnConsumeListener>,
    pub sku_details: ListenerSet<dyn OnSkuDetailsListener>,
    pub inventory: ListenerSet<dyn OnInventoryListener>,
}

impl ListenerSets {
    /// Total listeners across all kinds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.setup.len()
            + self.purchase.len()
            + self.consume.len()
            + self.sku_details.len()
            + self.inventory.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.setup.clear();
        self.purchase.clear();
        self.consume.clear();
        self.sku_details.clear();
        self.inventory.clear();
    }
}

/// Shareable handle to a facade's listener sets.
///
/// Only the dispatch thread mutates or reads the sets; the mutex exists so
/// the registry can be shared between the facade and the dispatcher. It is
/// never held while a listener runs, so listeners may register further
/// listeners from inside a callback.
#[derive(Default)]
pub struct ListenerRegistry {
    sets: Mutex<ListenerSets>,
}

impl ListenerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_setup(&self, listener: Arc<dyn OnSetupListener>) -> bool {
        self.sets.lock().setup.insert(listener)
    }

    pub fn add_purchase(&self, listener: Arc<dyn OnPurchaseListener>) -> bool {
        self.sets.lock().purchase.insert(listener)
    }

    pub fn add_consume(&self, listener: Arc<dyn OnConsumeListener>) -> bool {
        self.sets.lock().consume.insert(listener)
    }

    pub fn add_sku_details(&self, listener: Arc<dyn OnSkuDetailsListener>) -> bool {
        self.sets.lock().sku_details.insert(listener)
    }

    pub fn add_inventory(&self, listener: Arc<dyn OnInventoryListener>) -> bool {
        self.sets.lock().inventory.insert(listener)
    }

    #[must_use]
    pub fn setup_listeners(&self) -> Vec<Arc<dyn OnSetupListener>> {
        self.sets.lock().setup.snapshot()
    }

    #[must_use]
    pub fn purchase_listeners(&self) -> Vec<Arc<dyn OnPurchaseListener>> {
        self.sets.lock().purchase.snapshot()
    }

    #[must_use]
    pub fn consume_listeners(&self) -> Vec<Arc<dyn OnConsumeListener>> {
        self.sets.lock().consume.snapshot()
    }

    #[must_use]
    pub fn sku_details_listeners(&self) -> Vec<Arc<dyn OnSkuDetailsListener>> {
        self.sets.lock().sku_details.snapshot()
    }

    #[must_use]
    pub fn inventory_listeners(&self) -> Vec<Arc<dyn OnInventoryListener>> {
        self.sets.lock().inventory.snapshot()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sets.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sets.lock().is_empty()
    }

    pub fn clear(&self) {
        self.sets.lock().clear();
    }
}
