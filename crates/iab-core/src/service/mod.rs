//! Service layer: the dispatch thread and the facades that feed it.

pub mod advanced;
mod billing_core;
mod command;
pub mod context;
pub mod lifecycle;
pub mod simple;

pub use advanced::AdvancedIabHelper;
pub use command::HelperPhase;
pub use context::{spawn_dispatch_thread, BillingContext, ContextHandle, DispatchThread};
pub use lifecycle::LifecycleBridge;
pub use simple::SimpleIabHelper;
