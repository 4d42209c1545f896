//! Ports (hexagonal architecture).

pub mod inbound;
pub mod outbound;

pub use inbound::BillingApi;
pub use outbound::{BackendExecutor, BillingProvider, Job, PurchaseOutcome};
