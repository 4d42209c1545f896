//! Adapters: concrete executors and an in-memory provider.

pub mod executor;
pub mod recording;

pub use executor::{DeferredExecutor, InlineExecutor, TokioExecutor};
pub use recording::{ProviderCall, PurchaseMode, RecordingProvider, RECORDING_REQUEST_CODE};
