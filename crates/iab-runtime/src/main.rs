//! # IAB Runtime
//!
//! Runs a billing context on a dedicated dispatch thread against the Google
//! provider and a fixture backend, logs every event and exits on Ctrl-C.
//!
//! ```text
//! main ──post──→ dispatch thread ──spawn_blocking──→ GoogleBillingProvider
//!   ↑                  │                                     │
//!   └── event tap ─────┴───────────── reply ─────────────────┘
//! ```

use anyhow::{Context, Result};
use iab_core::{AdvancedIabHelper, BillingApi, ContextHandle};
use iab_runtime::{init_tracing, start, RuntimeConfig};
use shared_bus::{BillingEvent, EventFilter};
use tokio_stream::StreamExt;
use tracing::{debug, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let config = RuntimeConfig::from_env();
    init_tracing(&config.log).context("failed to initialise tracing")?;
    info!(version = env!("CARGO_PKG_VERSION"), "Starting IAB runtime");

    let runtime = start(&config).context("failed to start billing runtime")?;
    let handle = runtime.handle().clone();

    let mut events = handle.event_stream(EventFilter::all());
    let logger = tokio::spawn(async move {
        while let Some(event) = events.next().await {
            log_event(&event);
        }
    });

    // Dropping the helper would discard its queued startup requests.
    let startup = warm_up(&handle).context("failed to post startup requests")?;

    info!("Billing runtime ready, press Ctrl-C to stop");
    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl-C")?;

    info!("Shutting down");
    drop(startup);
    runtime.shutdown().context("dispatch thread did not stop cleanly")?;
    logger.abort();
    Ok(())
}

/// Runs setup and loads the first inventory page.
fn warm_up(handle: &ContextHandle) -> Result<AdvancedIabHelper> {
    let helper = handle.advanced_helper()?;
    helper.setup()?;
    helper.inventory(true)?;
    Ok(helper)
}

fn log_event(event: &BillingEvent) {
    match event {
        BillingEvent::Setup(response) => {
            info!(successful = response.is_successful(), "Setup finished");
        }
        BillingEvent::Billing(response) => {
            if response.status().is_success() {
                info!(kind = %response.kind(), "Request succeeded");
            } else {
                warn!(kind = %response.kind(), status = %response.status(), "Request failed");
            }
        }
        BillingEvent::InteractionRequired(token) => {
            info!(sku = token.sku(), ui = %token.ui(), "Waiting for user confirmation");
        }
        BillingEvent::Lifecycle(lifecycle) => {
            debug!(kind = ?lifecycle.kind, ui = %lifecycle.ui, "Lifecycle event");
        }
        BillingEvent::ActivityResult(result) => {
            debug!(
                request_code = result.request_code,
                result_code = result.result_code,
                "Activity result"
            );
        }
    }
}
