//! Provider and dispatch thread assembly.

use crate::error::ConfigError;
use crate::logging::LogConfig;
use iab_core::adapters::TokioExecutor;
use iab_core::{spawn_dispatch_thread, ContextHandle, DispatchThread, IabConfig};
use iab_google::{FixtureBackend, GoogleBillingProvider, GoogleConfig, ItemType};
use shared_types::SkuType;
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Everything the binary reads from the environment.
#[derive(Debug, Clone, Default)]
pub struct RuntimeConfig {
    pub core: IabConfig,
    pub google: GoogleConfig,
    pub log: LogConfig,
    /// Fixture served by the backend; a small built-in catalog when unset.
    pub fixture: Option<PathBuf>,
}

impl RuntimeConfig {
    /// # Environment Variables
    ///
    /// See [`IabConfig::from_env`], [`GoogleConfig::from_env`] and
    /// [`LogConfig::from_env`], plus `IAB_GOOGLE_FIXTURE` (fixture path).
    pub fn from_env() -> Self {
        Self {
            core: IabConfig::from_env(),
            google: GoogleConfig::from_env(),
            log: LogConfig::from_env(),
            fixture: env::var_os("IAB_GOOGLE_FIXTURE").map(PathBuf::from),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.core.validate()?;
        self.google.validate()?;
        self.log.filter()?;
        Ok(())
    }
}

/// Catalog used when no fixture file is configured.
pub fn builtin_backend() -> FixtureBackend {
    FixtureBackend::new()
        .with_product("gems_100", ItemType::Inapp, "$0.99")
        .with_product("remove_ads", ItemType::Inapp, "$2.99")
        .with_product("premium_monthly", ItemType::Subs, "$4.99")
}

/// Backend plus provider built from `config`. In-app products are treated
/// as consumables.
pub fn build_provider(
    config: &RuntimeConfig,
) -> Result<(Arc<FixtureBackend>, Arc<GoogleBillingProvider>), ConfigError> {
    let backend = Arc::new(match &config.fixture {
        Some(path) => FixtureBackend::load(path)?,
        None => builtin_backend(),
    });
    let provider = GoogleBillingProvider::builder(backend.clone())
        .resolver(Arc::new(backend.resolver(SkuType::Consumable)))
        .config(config.google.clone())
        .build()?;
    Ok((backend, Arc::new(provider)))
}

/// A running dispatch thread and the backend it talks to.
pub struct Runtime {
    dispatch: DispatchThread,
    backend: Arc<FixtureBackend>,
}

impl Runtime {
    pub fn handle(&self) -> &ContextHandle {
        self.dispatch.handle()
    }

    pub fn backend(&self) -> &Arc<FixtureBackend> {
        &self.backend
    }

    /// Stop the dispatch thread and wait for it.
    pub fn shutdown(self) -> Result<(), ConfigError> {
        self.dispatch.shutdown()?;
        info!("Billing runtime stopped");
        Ok(())
    }
}

/// Start the billing runtime. Must be called inside a Tokio runtime; provider
/// calls run on its blocking pool.
pub fn start(config: &RuntimeConfig) -> Result<Runtime, ConfigError> {
    config.validate()?;
    let (backend, provider) = build_provider(config)?;
    let executor = TokioExecutor::current()?;
    let dispatch = spawn_dispatch_thread(config.core.clone(), provider, Box::new(executor))?;

    info!(
        thread = %config.core.dispatch_thread_name,
        products = backend.product_count(),
        fixture = ?config.fixture,
        "Billing runtime started"
    );
    Ok(Runtime { dispatch, backend })
}
