//! # Shared Types Crate
//!
//! Canonical request/response model for the unified in-app-purchase layer.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: Every provider maps its native representation
//!   into these entities; nothing downstream sees backend-specific models.
//! - **Status, not faults**: Billing outcomes travel as [`Status`] values on
//!   responses. [`BillingError`] is reserved for contract violations.
//! - **Payload iff success**: Response constructors guarantee that a
//!   non-successful response never carries a payload.

pub mod entities;
pub mod errors;
pub mod interaction;
pub mod lifecycle;
pub mod requests;
pub mod responses;
pub mod status;

pub use entities::*;
pub use errors::*;
pub use interaction::*;
pub use lifecycle::*;
pub use requests::*;
pub use responses::*;
pub use status::*;
