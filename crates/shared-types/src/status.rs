//! Canonical billing status taxonomy.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of a billing operation as reported to listeners.
///
/// Failures are never surfaced as `Err` to the caller; they travel as one of
/// these values on the corresponding response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    Success,
    /// The user backed out of the purchase flow.
    UserCanceled,
    /// The store service could not be reached.
    ServiceUnavailable,
    /// The requested item is not available for purchase.
    ItemUnavailable,
    /// The user already owns a non-consumable item.
    ItemAlreadyOwned,
    /// Billing is not supported for this user or device.
    BillingUnavailable,
    /// The user must sign in to the store first.
    Unauthorised,
    UnknownError,
}

impl Status {
    /// Every status, in declaration order.
    pub const ALL: [Status; 8] = [
        Status::Success,
        Status::UserCanceled,
        Status::ServiceUnavailable,
        Status::ItemUnavailable,
        Status::ItemAlreadyOwned,
        Status::BillingUnavailable,
        Status::Unauthorised,
        Status::UnknownError,
    ];

    #[must_use]
    pub fn is_success(self) -> bool {
        matches!(self, Status::Success)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Status::Success => "SUCCESS",
            Status::UserCanceled => "USER_CANCELED",
            Status::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            Status::ItemUnavailable => "ITEM_UNAVAILABLE",
            Status::ItemAlreadyOwned => "ITEM_ALREADY_OWNED",
            Status::BillingUnavailable => "BILLING_UNAVAILABLE",
            Status::Unauthorised => "UNAUTHORISED",
            Status::UnknownError => "UNKNOWN_ERROR",
        };
        f.write_str(name)
    }
}
