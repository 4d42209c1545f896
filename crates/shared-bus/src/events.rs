//! # Billing Events
//!
//! Every event that flows through the dispatcher, as one tagged union.

use serde::{Deserialize, Serialize};
use shared_types::{
    ActivityResultEvent, BillingResponse, InteractionToken, LifecycleEvent, RequestKind,
    SetupResponse,
};

/// All events that can be published by the billing core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum BillingEvent {
    // =========================================================================
    // PROVIDER RESPONSES
    // =========================================================================
    /// Provider setup finished (successfully or not). Published once.
    Setup(SetupResponse),

    /// A purchase, consume, sku-details or inventory request finished.
    Billing(BillingResponse),

    /// A purchase needs the user to confirm it in a store screen.
    /// Delivered to purchase listeners.
    InteractionRequired(InteractionToken),

    // =========================================================================
    // HOST UI
    // =========================================================================
    /// Host UI lifecycle transition, forwarded by the lifecycle bridge.
    Lifecycle(LifecycleEvent),

    /// Result of a store screen, forwarded by the lifecycle bridge.
    ActivityResult(ActivityResultEvent),
}

impl BillingEvent {
    /// Get the topic for this event (for routing and filtering).
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::Setup(_) => EventTopic::Setup,
            Self::Billing(response) => EventTopic::from(response.kind()),
            Self::InteractionRequired(_) => EventTopic::Purchase,
            Self::Lifecycle(_) | Self::ActivityResult(_) => EventTopic::Lifecycle,
        }
    }
}

/// Event topics for routing and subscription filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    Setup,
    Purchase,
    Consume,
    SkuDetails,
    Inventory,
    /// Lifecycle transitions and activity results.
    Lifecycle,
    /// All events (no filtering).
    All,
}

impl From<RequestKind> for EventTopic {
    fn from(kind: RequestKind) -> Self {
        match kind {
            RequestKind::Setup => Self::Setup,
            RequestKind::Purchase => Self::Purchase,
            RequestKind::Consume => Self::Consume,
            RequestKind::SkuDetails => Self::SkuDetails,
            RequestKind::Inventory => Self::Inventory,
        }
    }
}

/// Filter for subscribing to specific events.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Topics to include. Empty means all topics.
    pub topics: Vec<EventTopic>,
}

impl EventFilter {
    /// Create a filter that accepts all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific topics.
    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self { topics }
    }

    /// Only provider responses (everything except lifecycle traffic).
    #[must_use]
    pub fn responses() -> Self {
        Self::topics(vec![
            EventTopic::Setup,
            EventTopic::Purchase,
            EventTopic::Consume,
            EventTopic::SkuDetails,
            EventTopic::Inventory,
        ])
    }

    /// Check if an event matches this filter.
    #[must_use]
    pub fn matches(&self, event: &BillingEvent) -> bool {
        self.topics.is_empty()
            || self.topics.contains(&EventTopic::All)
            || self.topics.contains(&event.topic())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::{
        InventoryResponse, LifecycleKind, ProviderInfo, PurchaseResponse, Status, UiHandle,
    };

    fn setup_event() -> BillingEvent {
        BillingEvent::Setup(SetupResponse::success(ProviderInfo::new("Test", "test")))
    }

    #[test]
    fn test_event_topic_mapping() {
        assert_eq!(setup_event().topic(), EventTopic::Setup);

        let inventory = BillingEvent::Billing(InventoryResponse::failure(None, Status::UnknownError).into());
        assert_eq!(inventory.topic(), EventTopic::Inventory);

        let token = InteractionToken::new("sku", UiHandle::new(), 1);
        assert_eq!(BillingEvent::InteractionRequired(token).topic(), EventTopic::Purchase);

        let lifecycle = BillingEvent::Lifecycle(LifecycleEvent::new(LifecycleKind::Resume, UiHandle::new()));
        assert_eq!(lifecycle.topic(), EventTopic::Lifecycle);
    }

    #[test]
    fn test_filter_all() {
        assert!(EventFilter::all().matches(&setup_event()));
        assert!(EventFilter::topics(vec![EventTopic::All]).matches(&setup_event()));
    }

    #[test]
    fn test_filter_by_topic() {
        let filter = EventFilter::topics(vec![EventTopic::Purchase]);
        let purchase = BillingEvent::Billing(PurchaseResponse::failure(None, Status::UserCanceled).into());
        assert!(filter.matches(&purchase));
        assert!(!filter.matches(&setup_event()));
    }

    #[test]
    fn test_responses_filter_excludes_lifecycle() {
        let filter = EventFilter::responses();
        let lifecycle = BillingEvent::Lifecycle(LifecycleEvent::new(LifecycleKind::Stop, UiHandle::new()));
        assert!(!filter.matches(&lifecycle));
        assert!(filter.matches(&setup_event()));
    }
}
