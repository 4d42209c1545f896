//! # Billing Context
//!
//! Composition root for one active provider. A context owns the state
//! holder, scheduler and dispatcher; nothing in this crate is global.
//!
//! ```text
//!  any thread                         dispatch thread
//!  ──────────                         ───────────────
//!  ContextHandle ──Command──→ mpsc ──→ BillingContext::pump()/run()
//!    helpers                             └─ BillingCore::handle()
//!    lifecycle bridge                          ├─ scheduler / state
//!    taps ←────────── broadcast ───────────────┴─ EventDispatcher
//! ```
//!
//! The thread that creates a [`BillingContext`] is its dispatch thread. It
//! either calls [`BillingContext::pump`] from its own event loop or hands
//! control to [`BillingContext::run`]; [`spawn_dispatch_thread`] does the
//! latter on a dedicated thread.

use super::advanced::AdvancedIabHelper;
use super::command::{Command, SubmitMode};
use super::billing_core::{BillingCore, Flow};
use super::lifecycle::LifecycleBridge;
use super::simple::SimpleIabHelper;
use crate::config::IabConfig;
use crate::domain::{HelperId, CONTEXT_HELPER};
use crate::ports::{BackendExecutor, BillingProvider};
use parking_lot::RwLock;
use shared_bus::{EventDispatcher, EventFilter, EventStream, EventTaps, Subscription};
use shared_types::{BillingError, BillingRequest, ProviderInfo, SetupResponse};
use std::cell::RefCell;
use std::marker::PhantomData;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{mpsc as std_mpsc, Arc};
use std::thread::{self, JoinHandle, ThreadId};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// State shared between the dispatch thread and every handle.
pub(crate) struct Shared {
    pub(crate) commands: mpsc::UnboundedSender<Command>,
    pub(crate) dispatch_thread: ThreadId,
    /// Mirror of the recorded setup response, for replay to late listeners.
    pub(crate) last_setup: RwLock<Option<SetupResponse>>,
    pub(crate) next_helper: AtomicU64,
    pub(crate) taps: EventTaps,
    pub(crate) closed: AtomicBool,
    pub(crate) provider: ProviderInfo,
}

struct Looper {
    core: BillingCore,
    commands: mpsc::UnboundedReceiver<Command>,
    stopped: bool,
}

/// Owner of the dispatch loop. Not `Send`: it stays on the thread that
/// created it.
pub struct BillingContext {
    handle: ContextHandle,
    looper: RefCell<Looper>,
    _not_send: PhantomData<Rc<()>>,
}

impl BillingContext {
    /// Create a context whose dispatch thread is the calling thread.
    pub fn new(
        config: IabConfig,
        provider: Arc<dyn BillingProvider>,
        executor: Box<dyn BackendExecutor>,
    ) -> Result<Self, BillingError> {
        config.validate()?;

        let (tx, rx) = mpsc::unbounded_channel();
        let taps = EventTaps::with_capacity(config.tap_capacity);
        let info = provider.info();
        let shared = Arc::new(Shared {
            commands: tx,
            dispatch_thread: thread::current().id(),
            last_setup: RwLock::new(None),
            next_helper: AtomicU64::new(CONTEXT_HELPER + 1),
            taps: taps.clone(),
            closed: AtomicBool::new(false),
            provider: info.clone(),
        });
        let core = BillingCore::new(
            provider,
            executor,
            EventDispatcher::new(taps),
            Arc::clone(&shared),
        );

        info!(
            provider = %info,
            tap_capacity = config.tap_capacity,
            "Billing context created"
        );

        Ok(Self {
            handle: ContextHandle { shared },
            looper: RefCell::new(Looper {
                core,
                commands: rx,
                stopped: false,
            }),
            _not_send: PhantomData,
        })
    }

    #[must_use]
    pub fn handle(&self) -> ContextHandle {
        self.handle.clone()
    }

    /// Handle every command currently queued, including ones posted while
    /// handling. Returns how many were handled.
    ///
    /// Calling `pump` from inside a listener callback is a no-op.
    pub fn pump(&self) -> usize {
        let Ok(mut looper) = self.looper.try_borrow_mut() else {
            warn!("Nested pump ignored");
            return 0;
        };
        let looper = &mut *looper;

        let mut handled = 0;
        while !looper.stopped {
            let Ok(command) = looper.commands.try_recv() else {
                break;
            };
            handled += 1;
            if looper.core.handle(command) == Flow::Shutdown {
                looper.stopped = true;
            }
        }
        handled
    }

    /// Block the calling thread handling commands until shutdown.
    ///
    /// Must not be called from inside an async runtime.
    pub fn run(&self) {
        let Ok(mut looper) = self.looper.try_borrow_mut() else {
            warn!("Nested run ignored");
            return;
        };
        let looper = &mut *looper;

        info!("Dispatch loop started");
        while !looper.stopped {
            match looper.commands.blocking_recv() {
                Some(command) => {
                    if looper.core.handle(command) == Flow::Shutdown {
                        looper.stopped = true;
                    }
                }
                None => break,
            }
        }
        info!("Dispatch loop stopped");
    }

    /// Advanced helpers attached to this context and not yet unregistered.
    /// Zero while called from inside a listener callback.
    #[must_use]
    pub fn helper_count(&self) -> usize {
        self.looper.try_borrow().map_or(0, |l| l.core.helper_count())
    }

    /// Whether a shutdown command has been handled.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.looper.try_borrow().map_or(false, |l| l.stopped)
    }
}

/// Cloneable, thread-safe entry point into a billing context.
#[derive(Clone)]
pub struct ContextHandle {
    shared: Arc<Shared>,
}

impl ContextHandle {
    pub(crate) fn send(&self, command: Command) -> Result<(), BillingError> {
        if self.shared.closed.load(Ordering::SeqCst) {
            return Err(BillingError::ContextClosed);
        }
        self.shared
            .commands
            .send(command)
            .map_err(|_| BillingError::ContextClosed)
    }

    pub(crate) fn next_helper_id(&self) -> HelperId {
        self.shared.next_helper.fetch_add(1, Ordering::Relaxed)
    }

    pub(crate) fn ensure_dispatch_thread(&self, operation: &'static str) -> Result<(), BillingError> {
        if self.is_dispatch_thread() {
            Ok(())
        } else {
            Err(BillingError::WrongThread { operation })
        }
    }

    #[must_use]
    pub fn is_dispatch_thread(&self) -> bool {
        thread::current().id() == self.shared.dispatch_thread
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.shared.closed.load(Ordering::SeqCst)
    }

    /// Identity of the active provider.
    #[must_use]
    pub fn provider_info(&self) -> &ProviderInfo {
        &self.shared.provider
    }

    /// The recorded setup outcome, if setup has finished.
    #[must_use]
    pub fn setup_response(&self) -> Option<SetupResponse> {
        self.shared.last_setup.read().clone()
    }

    /// Create a queued facade with its own listener sets.
    pub fn advanced_helper(&self) -> Result<AdvancedIabHelper, BillingError> {
        AdvancedIabHelper::attach(self.clone())
    }

    /// Create a direct facade: no queue, no lazy setup.
    #[must_use]
    pub fn simple_helper(&self) -> SimpleIabHelper {
        SimpleIabHelper::new(self.clone())
    }

    #[must_use]
    pub fn lifecycle_bridge(&self) -> LifecycleBridge {
        LifecycleBridge::new(self.clone())
    }

    /// Subscribe to the event stream from any thread.
    #[must_use]
    pub fn subscribe(&self, filter: EventFilter) -> Subscription {
        self.shared.taps.subscribe(filter)
    }

    #[must_use]
    pub fn event_stream(&self, filter: EventFilter) -> EventStream {
        self.shared.taps.event_stream(filter)
    }

    /// Run `f` on the dispatch thread.
    pub fn post<F>(&self, f: F) -> Result<(), BillingError>
    where
        F: FnOnce() + Send + 'static,
    {
        self.send(Command::Run(Box::new(f)))
    }

    /// Start provider setup without waiting for a request to need it.
    pub fn setup(&self) -> Result<(), BillingError> {
        self.send(Command::Submit {
            helper: CONTEXT_HELPER,
            request: BillingRequest::Setup,
            mode: SubmitMode::Scheduled,
        })
    }

    /// Stop the dispatch loop. Queued requests are discarded.
    pub fn shutdown(&self) -> Result<(), BillingError> {
        debug!("Shutdown requested");
        self.send(Command::Shutdown)
    }
}

/// A dispatch loop running on its own thread.
pub struct DispatchThread {
    handle: ContextHandle,
    join: Option<JoinHandle<()>>,
}

impl DispatchThread {
    #[must_use]
    pub fn handle(&self) -> &ContextHandle {
        &self.handle
    }

    /// Stop the loop and wait for the thread to exit.
    pub fn shutdown(mut self) -> Result<(), BillingError> {
        // Already closed is fine: the loop is exiting either way.
        let _ = self.handle.shutdown();
        match self.join.take() {
            Some(join) => join
                .join()
                .map_err(|_| BillingError::Setup("dispatch thread panicked".into())),
            None => Ok(()),
        }
    }
}

impl Drop for DispatchThread {
    fn drop(&mut self) {
        if self.join.is_some() {
            let _ = self.handle.shutdown();
        }
    }
}

/// Start a dedicated dispatch thread running a new context.
///
/// Returns once the context exists, so the handle is usable immediately.
pub fn spawn_dispatch_thread(
    config: IabConfig,
    provider: Arc<dyn BillingProvider>,
    executor: Box<dyn BackendExecutor>,
) -> Result<DispatchThread, BillingError> {
    let (ready_tx, ready_rx) = std_mpsc::sync_channel(1);
    let name = config.dispatch_thread_name.clone();

    let join = thread::Builder::new()
        .name(name.clone())
        .spawn(move || {
            let context = match BillingContext::new(config, provider, executor) {
                Ok(context) => context,
                Err(err) => {
                    let _ = ready_tx.send(Err(err));
                    return;
                }
            };
            if ready_tx.send(Ok(context.handle())).is_err() {
                return;
            }
            context.run();
        })
        .map_err(|e| BillingError::Setup(format!("failed to spawn dispatch thread: {e}")))?;

    let handle = ready_rx
        .recv()
        .map_err(|_| BillingError::ContextClosed)??;

    info!(thread = %name, "Dispatch thread started");
    Ok(DispatchThread {
        handle,
        join: Some(join),
    })
}
