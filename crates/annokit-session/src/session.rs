//! Tool session.
//!
//! A [`ToolSession`] binds one tool's working state to a [`HistoryStore`]
//! and owns the tool's compute worker for the lifetime of one mount:
//!
//! - the worker is created lazily by [`ToolSession::load`], at most once;
//! - [`ToolSession::mutate`] applies only the result of the most recent
//!   request, and only while the session is mounted;
//! - [`ToolSession::unmount`] runs teardown hooks (unfinished-work
//!   recovery) and then disposes the worker.
//!
//! Worker failures are not retried. The user is notified and the working
//! state falls back to empty, since partial geometry may be invalid.

use annokit_core::event_bus::{AppEvent, EventBus, SessionEvent};
use annokit_core::notify::{NotificationSink, Severity, TracingNotifier};
use annokit_core::{SessionError, WorkerError};
use annokit_history::{HistoryLink, HistoryStore};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tokio::sync::OnceCell;

use crate::worker::{ComputeWorker, Ticket, WorkerFactory, WorkerHandle};

type Request<F> = <<F as WorkerFactory>::Worker as ComputeWorker>::Request;
type Response<F> = <<F as WorkerFactory>::Worker as ComputeWorker>::Response;
type TeardownHook = Box<dyn FnOnce() + Send>;

/// What happened to the result of a [`ToolSession::mutate`] call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutateOutcome<R> {
    /// The result was current and was applied.
    Applied(R),
    /// A newer request, a cancel or an unmount superseded the result.
    Discarded,
    /// The worker failed; the user was notified and state was reset.
    Failed(WorkerError),
}

impl<R> MutateOutcome<R> {
    /// Whether the result was applied
    pub fn is_applied(&self) -> bool {
        matches!(self, MutateOutcome::Applied(_))
    }

    /// Whether the result was dropped as stale
    pub fn is_discarded(&self) -> bool {
        matches!(self, MutateOutcome::Discarded)
    }

    /// The applied value, if any
    pub fn applied(self) -> Option<R> {
        match self {
            MutateOutcome::Applied(value) => Some(value),
            _ => None,
        }
    }
}

pub(crate) struct SessionInner<F: WorkerFactory, S> {
    name: String,
    history: HistoryStore<S>,
    factory: F,
    worker: OnceCell<Arc<WorkerHandle<F::Worker>>>,
    mounted: AtomicBool,
    disposed: AtomicBool,
    next_ticket: AtomicU64,
    latest: AtomicU64,
    // Held while a result is applied and while cancel/unmount run, so no
    // result lands after either returns
    gate: Mutex<()>,
    teardown: Mutex<Vec<TeardownHook>>,
    notifier: Arc<dyn NotificationSink>,
    bus: Option<Arc<EventBus>>,
}

/// Working state, history and compute worker of one mounted tool
pub struct ToolSession<F: WorkerFactory, S> {
    inner: Arc<SessionInner<F, S>>,
}

impl<F: WorkerFactory, S> Clone for ToolSession<F, S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

/// Builder for [`ToolSession`]
pub struct ToolSessionBuilder<F, S> {
    name: String,
    factory: F,
    initial: S,
    link: Option<HistoryLink>,
    notifier: Arc<dyn NotificationSink>,
    bus: Option<Arc<EventBus>>,
}

impl<F, S> ToolSessionBuilder<F, S>
where
    F: WorkerFactory,
    S: Clone + Default + Send + Sync + 'static,
{
    /// Initial working state (defaults to `S::default()`)
    pub fn initial(mut self, initial: S) -> Self {
        self.initial = initial;
        self
    }

    /// Nest the session's history inside an enclosing scope
    pub fn parent(mut self, link: HistoryLink) -> Self {
        self.link = Some(link);
        self
    }

    /// Where user-facing failures are reported
    pub fn notifier(mut self, notifier: Arc<dyn NotificationSink>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Publish lifecycle events on `bus`
    pub fn event_bus(mut self, bus: Arc<EventBus>) -> Self {
        self.bus = Some(bus);
        self
    }

    /// Mount the session
    pub fn build(self) -> ToolSession<F, S> {
        let inner = Arc::new(SessionInner {
            name: self.name,
            history: HistoryStore::with_link(self.initial, self.link),
            factory: self.factory,
            worker: OnceCell::new(),
            mounted: AtomicBool::new(true),
            disposed: AtomicBool::new(false),
            next_ticket: AtomicU64::new(0),
            latest: AtomicU64::new(0),
            gate: Mutex::new(()),
            teardown: Mutex::new(Vec::new()),
            notifier: self.notifier,
            bus: self.bus,
        });
        tracing::debug!("Session {} mounted", inner.name);
        inner.publish(SessionEvent::Mounted {
            session: inner.name.clone(),
        });
        ToolSession { inner }
    }
}

impl<F, S> ToolSession<F, S>
where
    F: WorkerFactory,
    S: Clone + Default + Send + Sync + 'static,
{
    /// Start building a session named `name` around `factory`
    pub fn builder(name: impl Into<String>, factory: F) -> ToolSessionBuilder<F, S> {
        ToolSessionBuilder {
            name: name.into(),
            factory,
            initial: S::default(),
            link: None,
            notifier: Arc::new(TracingNotifier),
            bus: None,
        }
    }

    /// Session name, used in logs and events
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// The working-state history
    pub fn history(&self) -> &HistoryStore<S> {
        &self.inner.history
    }

    /// Current working state
    pub fn state(&self) -> S {
        self.inner.history.value()
    }

    /// Whether the session is still mounted
    pub fn is_mounted(&self) -> bool {
        self.inner.mounted.load(Ordering::SeqCst)
    }

    /// Whether a worker has been created
    pub fn is_loaded(&self) -> bool {
        self.inner.worker.initialized()
    }

    /// Whether the worker has been released
    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.load(Ordering::SeqCst)
    }

    /// Fail with [`SessionError::NotMounted`] once the session is unmounted
    pub fn ensure_mounted(&self) -> Result<(), SessionError> {
        if self.is_mounted() {
            Ok(())
        } else {
            Err(SessionError::NotMounted {
                session: self.inner.name.clone(),
            })
        }
    }

    /// Obtain the worker, creating it on first use
    ///
    /// Concurrent callers share a single creation. A load failure notifies
    /// the user and resets the working state; it is not retried here.
    pub async fn load(&self) -> Result<Arc<WorkerHandle<F::Worker>>, SessionError> {
        self.ensure_mounted()?;
        if self.is_disposed() {
            return Err(SessionError::Disposed {
                session: self.inner.name.clone(),
            });
        }

        let inner = &self.inner;
        let created = inner
            .worker
            .get_or_try_init(|| async {
                tracing::debug!("Session {} loading worker", inner.name);
                let worker = inner.factory.create().await?;
                inner.publish(SessionEvent::WorkerLoaded {
                    session: inner.name.clone(),
                });
                Ok::<_, WorkerError>(Arc::new(WorkerHandle::spawn(worker)))
            })
            .await;

        match created {
            Ok(handle) => {
                if !self.is_mounted() || self.is_disposed() {
                    // Unmounted while the worker was being created
                    handle.dispose();
                    return Err(SessionError::NotMounted {
                        session: inner.name.clone(),
                    });
                }
                if handle.is_disposed() {
                    return Err(SessionError::Disposed {
                        session: inner.name.clone(),
                    });
                }
                Ok(handle.clone())
            }
            Err(error) => {
                let _gate = inner.gate.lock();
                if inner.mounted.load(Ordering::SeqCst) {
                    inner.publish(SessionEvent::WorkerLoadFailed {
                        session: inner.name.clone(),
                        error: error.to_string(),
                    });
                    inner.fail(&error);
                }
                Err(SessionError::Worker(error))
            }
        }
    }

    /// Send `request` to the worker and apply its result with `apply`
    ///
    /// `apply` runs only if, when the reply arrives, this is still the most
    /// recent request and the session is still mounted. It runs under the
    /// session gate and must not call [`ToolSession::cancel`] or
    /// [`ToolSession::unmount`].
    pub async fn mutate<R>(
        &self,
        request: Request<F>,
        apply: impl FnOnce(&HistoryStore<S>, Response<F>) -> R + Send,
    ) -> Result<MutateOutcome<R>, SessionError> {
        self.ensure_mounted()?;
        let ticket = self.inner.issue_ticket();

        let worker = match self.load().await {
            Ok(worker) => worker,
            Err(SessionError::Worker(error)) => return Ok(MutateOutcome::Failed(error)),
            Err(other) => return Err(other),
        };

        let result = worker.call(ticket, request).await;

        let inner = &self.inner;
        let _gate = inner.gate.lock();
        if !inner.is_current(ticket) {
            tracing::debug!("Session {} discarded stale result #{}", inner.name, ticket);
            inner.publish(SessionEvent::ResultDiscarded {
                session: inner.name.clone(),
                ticket,
            });
            return Ok(MutateOutcome::Discarded);
        }

        match result {
            Ok(response) => Ok(MutateOutcome::Applied(apply(&inner.history, response))),
            Err(error) => {
                inner.publish(SessionEvent::RequestFailed {
                    session: inner.name.clone(),
                    error: error.to_string(),
                });
                inner.fail(&error);
                Ok(MutateOutcome::Failed(error))
            }
        }
    }

    /// Ignore the results of every request issued so far
    ///
    /// The computations themselves keep running; their results are dropped.
    pub fn cancel(&self) {
        self.inner.cancel();
    }

    /// Run `f` against the history under the session gate, if still mounted
    ///
    /// Async callers use this to make a follow-up change that must not race
    /// with unmount.
    pub fn with_mounted<R>(&self, f: impl FnOnce(&HistoryStore<S>) -> R) -> Option<R> {
        self.inner.with_mounted(f)
    }

    /// Run `hook` during unmount, before the worker is disposed
    ///
    /// Hooks registered after unmount never run.
    pub fn on_teardown(&self, hook: impl FnOnce() + Send + 'static) {
        if self.is_mounted() {
            self.inner.teardown.lock().push(Box::new(hook));
        }
    }

    /// Release the worker. Idempotent.
    pub fn dispose(&self) {
        self.inner.dispose();
    }

    /// End the session: drop in-flight results, run teardown hooks, then
    /// dispose the worker. Idempotent.
    pub fn unmount(&self) {
        self.inner.unmount();
    }

    pub(crate) fn downgrade(&self) -> Weak<SessionInner<F, S>> {
        Arc::downgrade(&self.inner)
    }

    pub(crate) fn event_bus(&self) -> Option<Arc<EventBus>> {
        self.inner.bus.clone()
    }
}

impl<F: WorkerFactory, S> SessionInner<F, S>
where
    S: Clone + Default + Send + Sync + 'static,
{
    fn issue_ticket(&self) -> Ticket {
        let ticket = self.next_ticket.fetch_add(1, Ordering::SeqCst) + 1;
        self.latest.store(ticket, Ordering::SeqCst);
        ticket
    }

    fn is_current(&self, ticket: Ticket) -> bool {
        self.mounted.load(Ordering::SeqCst) && self.latest.load(Ordering::SeqCst) == ticket
    }

    pub(crate) fn cancel(&self) {
        let _gate = self.gate.lock();
        let ticket = self.issue_ticket();
        tracing::trace!("Session {} cancelled requests before #{}", self.name, ticket);
    }

    pub(crate) fn with_mounted<R>(&self, f: impl FnOnce(&HistoryStore<S>) -> R) -> Option<R> {
        let _gate = self.gate.lock();
        if self.mounted.load(Ordering::SeqCst) {
            Some(f(&self.history))
        } else {
            None
        }
    }

    fn fail(&self, error: &WorkerError) {
        tracing::warn!("Session {} worker failure: {}", self.name, error);
        self.notifier.notify(
            &format!("{} failed: {}", self.name, error),
            Severity::Error,
        );
        self.history.reset(Some(S::default()));
    }

    fn dispose(&self) {
        if self.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Some(worker) = self.worker.get() {
            worker.dispose();
            self.publish(SessionEvent::WorkerDisposed {
                session: self.name.clone(),
            });
        }
    }

    fn unmount(&self) {
        {
            let _gate = self.gate.lock();
            if !self.mounted.swap(false, Ordering::SeqCst) {
                return;
            }
            self.issue_ticket();
        }

        let hooks: Vec<TeardownHook> = std::mem::take(&mut *self.teardown.lock());
        for hook in hooks {
            hook();
        }

        self.dispose();
        tracing::debug!("Session {} unmounted", self.name);
        self.publish(SessionEvent::Unmounted {
            session: self.name.clone(),
        });
    }

    fn publish(&self, event: SessionEvent) {
        if let Some(bus) = &self.bus {
            bus.publish(AppEvent::Session(event));
        }
    }
}

impl<F: WorkerFactory, S> Drop for SessionInner<F, S> {
    fn drop(&mut self) {
        // Dropping the last handle of a mounted session tears it down
        if *self.mounted.get_mut() {
            *self.mounted.get_mut() = false;
            for hook in std::mem::take(self.teardown.get_mut()) {
                hook();
            }
            if let Some(worker) = self.worker.get() {
                worker.dispose();
            }
            tracing::debug!("Session {} dropped while mounted", self.name);
        }
    }
}
