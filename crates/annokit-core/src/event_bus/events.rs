//! Event type definitions for the event bus.
//!
//! Events are cloneable and serializable so a front end can log or replay them.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::notify::Severity;

/// Root event enum for all application events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AppEvent {
    /// Tool session lifecycle
    Session(SessionEvent),
    /// Annotation scene changes
    Annotation(AnnotationEvent),
    /// User-facing notifications
    Notification(NotificationEvent),
    /// Global submit flow
    Submit(SubmitEvent),
}

impl AppEvent {
    /// Get the category of this event
    pub fn category(&self) -> EventCategory {
        match self {
            AppEvent::Session(_) => EventCategory::Session,
            AppEvent::Annotation(_) => EventCategory::Annotation,
            AppEvent::Notification(_) => EventCategory::Notification,
            AppEvent::Submit(_) => EventCategory::Submit,
        }
    }

    /// Get a short description of this event for logging
    pub fn description(&self) -> String {
        match self {
            AppEvent::Session(e) => e.description(),
            AppEvent::Annotation(e) => e.description(),
            AppEvent::Notification(e) => format!("[{}] {}", e.severity, e.message),
            AppEvent::Submit(e) => e.description(),
        }
    }
}

/// Event category for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventCategory {
    /// Tool session lifecycle events.
    Session,
    /// Annotation scene events.
    Annotation,
    /// User-facing notification events.
    Notification,
    /// Submit coordinator events.
    Submit,
}

impl std::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventCategory::Session => write!(f, "Session"),
            EventCategory::Annotation => write!(f, "Annotation"),
            EventCategory::Notification => write!(f, "Notification"),
            EventCategory::Submit => write!(f, "Submit"),
        }
    }
}

/// Tool session lifecycle events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SessionEvent {
    /// Session mounted.
    Mounted {
        /// Session name.
        session: String,
    },
    /// Compute worker created.
    WorkerLoaded {
        /// Session name.
        session: String,
    },
    /// Compute worker could not be created.
    WorkerLoadFailed {
        /// Session name.
        session: String,
        /// Error message.
        error: String,
    },
    /// A worker request failed and working state was reset.
    RequestFailed {
        /// Session name.
        session: String,
        /// Error message.
        error: String,
    },
    /// A superseded or cancelled result arrived and was dropped.
    ResultDiscarded {
        /// Session name.
        session: String,
        /// Ticket of the dropped request.
        ticket: u64,
    },
    /// Compute worker released.
    WorkerDisposed {
        /// Session name.
        session: String,
    },
    /// Unfinished geometry committed on teardown or submit.
    UnfinishedWorkCommitted {
        /// Session name.
        session: String,
        /// Number of shapes committed.
        shapes: usize,
    },
    /// Session unmounted.
    Unmounted {
        /// Session name.
        session: String,
    },
}

impl SessionEvent {
    fn description(&self) -> String {
        match self {
            SessionEvent::Mounted { session } => format!("Session {} mounted", session),
            SessionEvent::WorkerLoaded { session } => format!("Session {} worker loaded", session),
            SessionEvent::WorkerLoadFailed { session, error } => {
                format!("Session {} worker failed to load: {}", session, error)
            }
            SessionEvent::RequestFailed { session, error } => {
                format!("Session {} request failed: {}", session, error)
            }
            SessionEvent::ResultDiscarded { session, ticket } => {
                format!("Session {} discarded stale result #{}", session, ticket)
            }
            SessionEvent::WorkerDisposed { session } => {
                format!("Session {} worker disposed", session)
            }
            SessionEvent::UnfinishedWorkCommitted { session, shapes } => {
                format!("Session {} committed {} unfinished shape(s)", session, shapes)
            }
            SessionEvent::Unmounted { session } => format!("Session {} unmounted", session),
        }
    }
}

/// Annotation scene events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AnnotationEvent {
    /// Annotations were added to the scene.
    Added {
        /// Identifiers of the new annotations.
        ids: Vec<Uuid>,
    },
}

impl AnnotationEvent {
    fn description(&self) -> String {
        match self {
            AnnotationEvent::Added { ids } => format!("{} annotation(s) added", ids.len()),
        }
    }
}

/// User-facing notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationEvent {
    /// Message text.
    pub message: String,
    /// Severity.
    pub severity: Severity,
}

/// Submit coordinator events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SubmitEvent {
    /// A tool registered its finalizer.
    FinalizerRegistered {
        /// Owner of the finalizer.
        owner: Uuid,
    },
    /// The registered finalizer was cleared.
    FinalizerCleared {
        /// Owner of the cleared finalizer.
        owner: Uuid,
    },
    /// Submit ran the registered finalizer.
    FinalizerInvoked {
        /// Owner of the finalizer.
        owner: Uuid,
    },
}

impl SubmitEvent {
    fn description(&self) -> String {
        match self {
            SubmitEvent::FinalizerRegistered { owner } => format!("Finalizer {} registered", owner),
            SubmitEvent::FinalizerCleared { owner } => format!("Finalizer {} cleared", owner),
            SubmitEvent::FinalizerInvoked { owner } => format!("Finalizer {} invoked", owner),
        }
    }
}
