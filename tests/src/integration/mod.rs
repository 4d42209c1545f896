//! Cross-crate integration flows.

pub mod google;
pub mod interaction;
pub mod isolation;
pub mod scheduling;
pub mod setup;
pub mod taps;
