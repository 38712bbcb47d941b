//! Shared, observable history store.
//!
//! [`HistoryStore`] is a cheap-to-clone handle; all clones see the same
//! stack. Listeners run after every change, outside the store lock, so a
//! listener may read the store or even mutate it.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use crate::delegation::{redo_route, undo_route, HistoryLink, Route, UndoScope};
use crate::stack::HistoryStack;

/// Handle returned by [`HistoryStore::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct StoreInner<T> {
    stack: Mutex<HistoryStack<T>>,
    listeners: Mutex<Vec<(ListenerId, Listener<T>)>>,
    next_listener: AtomicU64,
    link: Option<HistoryLink>,
}

/// Undo/redo container for a tool's working state
pub struct HistoryStore<T> {
    inner: Arc<StoreInner<T>>,
}

impl<T> Clone for HistoryStore<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Clone + Send + 'static> HistoryStore<T> {
    /// Create a store holding `value`
    pub fn new(value: T) -> Self {
        Self::with_link(value, None)
    }

    /// Create a store whose initial value is computed once, now
    pub fn with_init(init: impl FnOnce() -> T) -> Self {
        Self::new(init())
    }

    /// Create a store nested inside the scope `link` points to
    pub fn with_link(value: T, link: Option<HistoryLink>) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                stack: Mutex::new(HistoryStack::new(value)),
                listeners: Mutex::new(Vec::new()),
                next_listener: AtomicU64::new(0),
                link,
            }),
        }
    }

    /// Current value
    pub fn value(&self) -> T {
        self.inner.stack.lock().value().clone()
    }

    /// Borrow the current value for the duration of `f`
    ///
    /// `f` runs under the store lock and must not touch the store.
    pub fn with_value<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(self.inner.stack.lock().value())
    }

    /// Replace the value
    ///
    /// With `skip_history` the value changes without recording an entry;
    /// this is meant for high-frequency transient updates such as a drag
    /// in progress.
    pub fn set_state(&self, value: T, skip_history: bool) {
        self.update(move |_| value, skip_history);
    }

    /// Compute the next value from the current one
    ///
    /// `updater` runs under the store lock and must not touch the store.
    /// Listeners run after the lock is released and may read it.
    pub fn update(&self, updater: impl FnOnce(&T) -> T, skip_history: bool) {
        let snapshot = {
            let mut stack = self.inner.stack.lock();
            let next = updater(stack.value());
            if skip_history {
                stack.replace(next);
            } else {
                stack.push(next);
            }
            stack.value().clone()
        };
        self.notify(&snapshot);
    }

    /// Undo one step, delegating to the parent scope once local history is
    /// exhausted
    pub fn undo(&self) {
        let parent_can_undo = self.parent().is_some_and(|p| p.can_undo());
        match undo_route(self.local_can_undo(), parent_can_undo) {
            Route::Local => self.local_step(HistoryStack::undo),
            Route::Parent => {
                tracing::trace!("Undo delegated to parent history");
                if let Some(parent) = self.parent() {
                    parent.undo();
                }
            }
            Route::Nowhere => {}
        }
    }

    /// Redo one step, replaying the parent scope's future first
    pub fn redo(&self) {
        let parent_can_redo = self.parent().is_some_and(|p| p.can_redo());
        match redo_route(self.local_can_redo(), parent_can_redo) {
            Route::Parent => {
                tracing::trace!("Redo delegated to parent history");
                if let Some(parent) = self.parent() {
                    parent.redo();
                }
            }
            Route::Local => self.local_step(HistoryStack::redo),
            Route::Nowhere => {}
        }
    }

    /// Collapse history to a single entry: `value`, or the initial value
    pub fn reset(&self, value: Option<T>) {
        let snapshot = {
            let mut stack = self.inner.stack.lock();
            stack.reset(value);
            stack.value().clone()
        };
        self.notify(&snapshot);
    }

    /// Whether undo would change this store or its ancestors
    pub fn can_undo(&self) -> bool {
        self.local_can_undo() || self.parent().is_some_and(|p| p.can_undo())
    }

    /// Whether redo would change this store or its ancestors
    pub fn can_redo(&self) -> bool {
        self.local_can_redo() || self.parent().is_some_and(|p| p.can_redo())
    }

    /// Whether this store alone has something to undo
    pub fn local_can_undo(&self) -> bool {
        self.inner.stack.lock().can_undo()
    }

    /// Whether this store alone has something to redo
    pub fn local_can_redo(&self) -> bool {
        self.inner.stack.lock().can_redo()
    }

    /// Number of recorded entries
    pub fn history_len(&self) -> usize {
        self.inner.stack.lock().len()
    }

    /// Register a change listener
    pub fn subscribe(&self, listener: impl Fn(&T) + Send + Sync + 'static) -> ListenerId {
        let id = ListenerId(self.inner.next_listener.fetch_add(1, Ordering::Relaxed));
        self.inner.listeners.lock().push((id, Arc::new(listener)));
        id
    }

    /// Remove a change listener. Returns true if it was registered.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut listeners = self.inner.listeners.lock();
        let before = listeners.len();
        listeners.retain(|(lid, _)| *lid != id);
        listeners.len() != before
    }

    /// This store as a delegation target for nested stores
    pub fn as_scope(&self) -> Arc<dyn UndoScope>
    where
        T: Sync,
    {
        Arc::new(self.clone())
    }

    /// A link that nests a new store inside this one
    pub fn link(&self) -> HistoryLink
    where
        T: Sync,
    {
        HistoryLink::new(self.as_scope())
    }

    /// Non-owning handle, for listeners that must not keep the store alive
    pub fn downgrade(&self) -> WeakHistoryStore<T> {
        WeakHistoryStore {
            inner: Arc::downgrade(&self.inner),
        }
    }

    fn parent(&self) -> Option<&dyn UndoScope> {
        self.inner.link.as_ref().map(HistoryLink::parent)
    }

    fn local_step(&self, step: fn(&mut HistoryStack<T>) -> bool) {
        let snapshot = {
            let mut stack = self.inner.stack.lock();
            if !step(&mut stack) {
                return;
            }
            stack.value().clone()
        };
        self.notify(&snapshot);
    }

    fn notify(&self, value: &T) {
        let listeners: Vec<Listener<T>> = self
            .inner
            .listeners
            .lock()
            .iter()
            .map(|(_, l)| l.clone())
            .collect();
        for listener in listeners {
            listener(value);
        }
    }
}

impl<T: Clone + Send + Sync + 'static> UndoScope for HistoryStore<T> {
    fn can_undo(&self) -> bool {
        HistoryStore::can_undo(self)
    }

    fn can_redo(&self) -> bool {
        HistoryStore::can_redo(self)
    }

    fn undo(&self) {
        HistoryStore::undo(self)
    }

    fn redo(&self) {
        HistoryStore::redo(self)
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for HistoryStore<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryStore")
            .field("stack", &*self.inner.stack.lock())
            .field("linked", &self.inner.link.is_some())
            .finish()
    }
}

/// Weak counterpart of [`HistoryStore`]
pub struct WeakHistoryStore<T> {
    inner: Weak<StoreInner<T>>,
}

impl<T> Clone for WeakHistoryStore<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> WeakHistoryStore<T> {
    /// Recover a strong handle if the store is still alive
    pub fn upgrade(&self) -> Option<HistoryStore<T>> {
        self.inner.upgrade().map(|inner| HistoryStore { inner })
    }
}
