//! # IAB Runtime
//!
//! Composition root for the billing stack.
//!
//! ## Startup Sequence
//!
//! 1. Load [`RuntimeConfig`] from the environment
//! 2. Initialise tracing ([`init_tracing`])
//! 3. Build the fixture backend and the Google provider
//! 4. Spawn the dispatch thread with a Tokio blocking-pool executor
//!
//! ## Modules
//!
//! - `logging` - `tracing-subscriber` setup from [`LogConfig`]
//! - `wiring` - provider construction and the [`Runtime`] handle
//! - `error` - [`ConfigError`]

pub mod error;
pub mod logging;
pub mod wiring;

pub use error::ConfigError;
pub use logging::{init_tracing, LogConfig};
pub use wiring::{build_provider, builtin_backend, start, Runtime, RuntimeConfig};
