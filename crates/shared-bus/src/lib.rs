//! # Shared Bus - Typed Billing Event Dispatch
//!
//! Delivers provider responses and lifecycle events to the listeners that
//! registered for them.
//!
//! ## Delivery Rules
//!
//! - Every event has exactly one [`EventTopic`]; a setup response never reaches
//!   a purchase listener.
//! - Fan-out is synchronous and serial. A listener that panics is logged and
//!   skipped; the remaining listeners still receive the event.
//! - Every published event is also mirrored to async taps
//!   ([`Subscription`], [`EventStream`]) for observers that live outside the
//!   dispatch thread.
//!
//! ```text
//!   BillingCore ──publish()──→ EventDispatcher ──→ facade listener sets
//!                                    │
//!                                    └──→ EventTaps ──→ Subscription / EventStream
//! ```

#![allow(clippy::missing_const_for_fn)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod dispatcher;
pub mod events;
pub mod listeners;
pub mod subscriber;

pub use dispatcher::{EventDispatcher, EventTaps, SubscriberId};
pub use events::{BillingEvent, EventFilter, EventTopic};
pub use listeners::{
    BillingListener, ListenerRegistry, ListenerSet, ListenerSets, OnConsumeListener,
    OnInventoryListener, OnPurchaseListener, OnSetupListener, OnSkuDetailsListener,
};
pub use subscriber::{EventStream, Subscription, SubscriptionError};

/// Maximum events buffered per tap subscriber before it starts lagging.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;
