//! Recovery of unfinished geometry.
//!
//! An [`UnfinishedWorkGuard`] watches a session's working state through a
//! caller-supplied extractor that yields the partial shapes it contains.
//!
//! - While partial shapes exist, a finalizer is registered with the
//!   [`SubmitCoordinator`], so a global submit commits them and resets the
//!   session.
//! - When the partial shape set becomes empty, the finalizer is cleared.
//! - On teardown the remaining shapes are committed to the scene once,
//!   before the session disposes its worker.

use annokit_core::event_bus::{AppEvent, EventBus, SessionEvent};
use annokit_core::{AnnotationScene, Shape};
use annokit_history::{HistoryStore, ListenerId, WeakHistoryStore};
use parking_lot::Mutex;
use std::sync::{Arc, Weak};

use crate::coordinator::{FinalizerOwner, SubmitCoordinator};
use crate::session::ToolSession;
use crate::worker::WorkerFactory;

type Extractor<S> = Box<dyn Fn(&S) -> Vec<Shape> + Send + Sync>;
// Runs the closure under the session gate; false once unmounted
type GatedAction<S> = Box<dyn Fn(&mut dyn FnMut(&HistoryStore<S>)) -> bool + Send + Sync>;
type SessionAction = Box<dyn Fn() + Send + Sync>;

struct GuardInner<S> {
    this: Weak<GuardInner<S>>,
    session: String,
    owner: FinalizerOwner,
    history: WeakHistoryStore<S>,
    scene: Arc<dyn AnnotationScene>,
    coordinator: Arc<SubmitCoordinator>,
    extract: Extractor<S>,
    cancel_session: SessionAction,
    while_mounted: GatedAction<S>,
    listener: Mutex<Option<ListenerId>>,
    bus: Option<Arc<EventBus>>,
}

/// Commits a session's partial shapes instead of letting them be lost
pub struct UnfinishedWorkGuard<S> {
    inner: Arc<GuardInner<S>>,
}

impl<S> UnfinishedWorkGuard<S>
where
    S: Clone + Default + Send + Sync + 'static,
{
    /// Attach a guard to `session`
    ///
    /// `extract` maps the working state to the partial shapes it holds.
    pub fn install<F: WorkerFactory>(
        session: &ToolSession<F, S>,
        scene: Arc<dyn AnnotationScene>,
        coordinator: Arc<SubmitCoordinator>,
        extract: impl Fn(&S) -> Vec<Shape> + Send + Sync + 'static,
    ) -> Self {
        let for_cancel = session.downgrade();
        let for_gate = session.downgrade();

        let inner = Arc::new_cyclic(|this| GuardInner {
            this: this.clone(),
            session: session.name().to_string(),
            owner: FinalizerOwner::new(),
            history: session.history().downgrade(),
            scene,
            coordinator,
            extract: Box::new(extract),
            cancel_session: Box::new(move || {
                if let Some(session) = for_cancel.upgrade() {
                    session.cancel();
                }
            }),
            while_mounted: Box::new(move |f: &mut dyn FnMut(&HistoryStore<S>)| {
                for_gate
                    .upgrade()
                    .and_then(|session| session.with_mounted(|history| f(history)))
                    .is_some()
            }),
            listener: Mutex::new(None),
            bus: session.event_bus(),
        });

        let weak = Arc::downgrade(&inner);
        let listener = session.history().subscribe(move |state| {
            if let Some(guard) = weak.upgrade() {
                guard.on_change(state);
            }
        });
        *inner.listener.lock() = Some(listener);

        let teardown = inner.clone();
        session.on_teardown(move || teardown.teardown());

        inner.on_change(&session.state());
        Self { inner }
    }

    /// Commit the partial shapes now and reset the session
    ///
    /// In-flight worker results are cancelled first so they cannot land on
    /// the reset state. Returns the number of shapes committed.
    pub fn finalize(&self) -> usize {
        self.inner.finalize()
    }

    /// Whether the session currently holds partial shapes
    pub fn has_unfinished_work(&self) -> bool {
        self.inner
            .history
            .upgrade()
            .is_some_and(|history| history.with_value(|state| !(self.inner.extract)(state).is_empty()))
    }

    /// Identity used for the finalizer registration
    pub fn owner(&self) -> FinalizerOwner {
        self.inner.owner
    }
}

impl<S> GuardInner<S>
where
    S: Clone + Default + Send + Sync + 'static,
{
    fn on_change(&self, state: &S) {
        if (self.extract)(state).is_empty() {
            self.coordinator.release(self.owner);
            return;
        }

        let this = self.this.clone();
        self.coordinator.register_finalizer(
            self.owner,
            Some(Arc::new(move || {
                if let Some(guard) = this.upgrade() {
                    guard.finalize();
                }
            })),
        );
    }

    fn finalize(&self) -> usize {
        (self.cancel_session)();

        // Unmount flips the mounted flag under the same gate, so teardown
        // sees either these shapes or the reset state, never both
        let mut committed = 0;
        (self.while_mounted)(&mut |history: &HistoryStore<S>| {
            let shapes = history.with_value(|state| (self.extract)(state));
            if !shapes.is_empty() {
                committed = self.commit(shapes);
                history.reset(Some(S::default()));
            }
        });
        committed
    }

    fn teardown(&self) {
        let history = self.history.upgrade();
        if let (Some(id), Some(history)) = (self.listener.lock().take(), history.as_ref()) {
            history.unsubscribe(id);
        }

        if let Some(history) = history {
            let shapes = history.with_value(|state| (self.extract)(state));
            if !shapes.is_empty() {
                self.commit(shapes);
            }
        }

        self.coordinator.release(self.owner);
    }

    fn commit(&self, shapes: Vec<Shape>) -> usize {
        let count = shapes.len();
        self.scene.add_shapes(shapes, None);
        tracing::info!("Session {} committed {} unfinished shape(s)", self.session, count);
        if let Some(bus) = &self.bus {
            bus.publish(AppEvent::Session(SessionEvent::UnfinishedWorkCommitted {
                session: self.session.clone(),
                shapes: count,
            }));
        }
        count
    }
}
