//! Global submit coordination.
//!
//! The active tool registers a finalizer that flushes its unfinished
//! geometry. A global "submit annotations" action calls [`SubmitCoordinator::submit`]
//! without knowing which tool is active.

use annokit_core::event_bus::{AppEvent, EventBus, SubmitEvent};
use annokit_core::types::Callback;
use parking_lot::Mutex;
use std::sync::Arc;
use uuid::Uuid;

/// Identity of a finalizer registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FinalizerOwner(Uuid);

impl FinalizerOwner {
    /// Fresh owner identity
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Underlying identifier
    pub fn id(&self) -> Uuid {
        self.0
    }
}

impl Default for FinalizerOwner {
    fn default() -> Self {
        Self::new()
    }
}

/// Holds at most one finalizer, owned by the active tool
#[derive(Default)]
pub struct SubmitCoordinator {
    slot: Mutex<Option<(FinalizerOwner, Callback)>>,
    bus: Option<Arc<EventBus>>,
}

impl SubmitCoordinator {
    /// Create an empty coordinator
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty coordinator that announces changes on `bus`
    pub fn with_event_bus(bus: Arc<EventBus>) -> Self {
        Self {
            slot: Mutex::new(None),
            bus: Some(bus),
        }
    }

    /// Register `finalizer` for `owner`, replacing any other registration
    ///
    /// Passing `None` clears the slot, but only if `owner` holds it.
    pub fn register_finalizer(&self, owner: FinalizerOwner, finalizer: Option<Callback>) {
        match finalizer {
            Some(finalizer) => {
                let previous = self.slot.lock().replace((owner, finalizer));
                if previous.is_none_or(|(prev, _)| prev != owner) {
                    tracing::debug!("Finalizer registered for {}", owner.id());
                    self.publish(SubmitEvent::FinalizerRegistered { owner: owner.id() });
                }
            }
            None => {
                self.release(owner);
            }
        }
    }

    /// Clear the slot if `owner` holds it. Returns true if it did.
    pub fn release(&self, owner: FinalizerOwner) -> bool {
        let released = {
            let mut slot = self.slot.lock();
            if slot.as_ref().is_some_and(|(current, _)| *current == owner) {
                slot.take();
                true
            } else {
                false
            }
        };
        if released {
            tracing::debug!("Finalizer cleared for {}", owner.id());
            self.publish(SubmitEvent::FinalizerCleared { owner: owner.id() });
        }
        released
    }

    /// Run the registered finalizer, if any. Returns true if one ran.
    pub fn submit(&self) -> bool {
        // The finalizer typically releases itself, so it runs unlocked
        let registered = self.slot.lock().clone();
        match registered {
            Some((owner, finalizer)) => {
                tracing::info!("Submitting unfinished work of {}", owner.id());
                self.publish(SubmitEvent::FinalizerInvoked { owner: owner.id() });
                finalizer();
                true
            }
            None => false,
        }
    }

    /// Whether a finalizer is registered
    pub fn has_finalizer(&self) -> bool {
        self.slot.lock().is_some()
    }

    /// Owner of the registered finalizer
    pub fn current_owner(&self) -> Option<FinalizerOwner> {
        self.slot.lock().as_ref().map(|(owner, _)| *owner)
    }

    fn publish(&self, event: SubmitEvent) {
        if let Some(bus) = &self.bus {
            bus.publish(AppEvent::Submit(event));
        }
    }
}

impl std::fmt::Debug for SubmitCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubmitCoordinator")
            .field("owner", &self.current_owner())
            .finish()
    }
}
