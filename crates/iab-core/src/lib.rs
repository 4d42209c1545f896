//! # IAB Core - Billing Request Scheduler
//!
//! Serializes billing requests from any number of helper facades against a
//! single active provider, and fans typed responses out to listeners.
//!
//! ## Guarantees
//!
//! | Guarantee | Enforcement |
//! |-----------|-------------|
//! | At most one request in flight | `domain/state.rs` - `mark_busy` |
//! | Setup runs first, exactly once | `domain/scheduler.rs` - `Routing::LazySetup` |
//! | Duplicate of the in-flight request is dropped | `Routing::Duplicate` |
//! | FIFO per helper | `RequestScheduler` queues |
//! | Every response advances the queue | `on_response_delivered` in the core |
//! | Listener mutation only on the dispatch thread | `BillingError::WrongThread` |
//!
//! ## Request Lifecycle
//!
//! ```text
//! helper.purchase() ──Submit──→ dispatch thread
//!                                  │ Routing::decide
//!                                  ├─ queue ─────────────┐
//!                                  └─ dispatch ──→ BackendExecutor
//!                                                     │ provider call
//!                                  ┌──── Deliver ─────┘
//!                                  ↓
//!                         EventDispatcher::publish ──→ listeners, taps
//!                                  ↓
//!                         on_response_delivered ──→ next queued request
//! ```
//!
//! ## Module Structure (Hexagonal Architecture)
//!
//! - `domain/` - `BillingState`, `RequestScheduler`, `Routing`
//! - `ports/` - `BillingApi` (inbound), `BillingProvider`, `BackendExecutor` (outbound)
//! - `adapters/` - tokio/inline/deferred executors, `RecordingProvider`
//! - `service/` - `BillingContext`, helper facades, `LifecycleBridge`

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod service;

pub use config::IabConfig;
pub use domain::{BillingState, HelperId, RequestScheduler, Routing};
pub use ports::{BackendExecutor, BillingApi, BillingProvider, PurchaseOutcome};
pub use service::{
    spawn_dispatch_thread, AdvancedIabHelper, BillingContext, ContextHandle, DispatchThread,
    HelperPhase, LifecycleBridge, SimpleIabHelper,
};
