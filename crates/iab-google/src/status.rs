//! Google response codes and their billing status.
//!
//! The mapping is one table. The only context-dependent entry is
//! `BILLING_UNAVAILABLE`, which becomes `Unauthorised` when no store account
//! is signed in.

use shared_types::Status;
use std::fmt;

/// Response codes returned by the Google billing service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GoogleResponse {
    Ok,
    UserCanceled,
    ServiceUnavailable,
    BillingUnavailable,
    ItemUnavailable,
    DeveloperError,
    Error,
    ItemAlreadyOwned,
    ItemNotOwned,
}

impl GoogleResponse {
    pub const ALL: [GoogleResponse; 9] = [
        Self::Ok,
        Self::UserCanceled,
        Self::ServiceUnavailable,
        Self::BillingUnavailable,
        Self::ItemUnavailable,
        Self::DeveloperError,
        Self::Error,
        Self::ItemAlreadyOwned,
        Self::ItemNotOwned,
    ];

    /// Wire code of this response.
    #[must_use]
    pub fn code(self) -> i32 {
        match self {
            Self::Ok => 0,
            Self::UserCanceled => 1,
            Self::ServiceUnavailable => 2,
            Self::BillingUnavailable => 3,
            Self::ItemUnavailable => 4,
            Self::DeveloperError => 5,
            Self::Error => 6,
            Self::ItemAlreadyOwned => 7,
            Self::ItemNotOwned => 8,
        }
    }

    #[must_use]
    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.code() == code)
    }
}

impl fmt::Display for GoogleResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Ok => "OK",
            Self::UserCanceled => "USER_CANCELED",
            Self::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            Self::BillingUnavailable => "BILLING_UNAVAILABLE",
            Self::ItemUnavailable => "ITEM_UNAVAILABLE",
            Self::DeveloperError => "DEVELOPER_ERROR",
            Self::Error => "ERROR",
            Self::ItemAlreadyOwned => "ITEM_ALREADY_OWNED",
            Self::ItemNotOwned => "ITEM_NOT_OWNED",
        };
        f.write_str(name)
    }
}

/// Google response -> billing status.
pub const STATUS_TABLE: [(GoogleResponse, Status); 9] = [
    (GoogleResponse::Ok, Status::Success),
    (GoogleResponse::UserCanceled, Status::UserCanceled),
    (GoogleResponse::ServiceUnavailable, Status::ServiceUnavailable),
    (GoogleResponse::BillingUnavailable, Status::BillingUnavailable),
    (GoogleResponse::ItemUnavailable, Status::ItemUnavailable),
    (GoogleResponse::DeveloperError, Status::UnknownError),
    (GoogleResponse::Error, Status::UnknownError),
    (GoogleResponse::ItemAlreadyOwned, Status::ItemAlreadyOwned),
    (GoogleResponse::ItemNotOwned, Status::UnknownError),
];

/// Billing status for a response. A missing or unknown response is an
/// `UnknownError`.
#[must_use]
pub fn status_for(response: Option<GoogleResponse>, authorised: bool) -> Status {
    let status = response
        .and_then(|response| {
            STATUS_TABLE
                .iter()
                .find(|(r, _)| *r == response)
                .map(|(_, status)| *status)
        })
        .unwrap_or(Status::UnknownError);

    if status == Status::BillingUnavailable && !authorised {
        Status::Unauthorised
    } else {
        status
    }
}

/// Same as [`status_for`] for a raw wire code.
#[must_use]
pub fn status_for_code(code: i32, authorised: bool) -> Status {
    status_for(GoogleResponse::from_code(code), authorised)
}
