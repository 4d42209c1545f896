//! # Unified IAB Test Suite
//!
//! Cross-crate flows that exercise helpers, the billing core, the event bus
//! and the Google provider together.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── support.rs        # Recording listeners and context builders
//! └── integration/
//!     ├── scheduling.rs # Queueing, dedup, lazy setup, unregister
//!     ├── setup.rs      # Setup replay and failed setup
//!     ├── interaction.rs# Interaction tokens, activity results, resume
//!     ├── isolation.rs  # Provider and listener panics
//!     ├── taps.rs       # Async event taps on a dispatch thread
//!     └── google.rs     # Full stack against the Google provider
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p iab-tests
//! cargo test -p iab-tests integration::google::
//! ```

#![allow(dead_code)]

pub mod integration;
pub mod support;
