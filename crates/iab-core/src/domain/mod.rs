//! Domain layer: billing state and request scheduling.
//!
//! Pure data structures with no I/O; the service layer drives them from the
//! dispatch thread.

pub mod scheduler;
pub mod state;

pub use scheduler::{HelperId, RequestScheduler, Routing, CONTEXT_HELPER};
pub use state::BillingState;
