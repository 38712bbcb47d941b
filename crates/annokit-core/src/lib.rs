//! # annokit Core
//!
//! Core types, traits, and utilities shared by every annokit crate.
//! Provides the geometry model, the annotation scene and notification
//! collaborators, the error taxonomy and the application event bus.

pub mod annotation;
pub mod error;
pub mod event_bus;
pub mod geometry;
pub mod notify;
pub mod scene;
pub mod types;

pub use annotation::{Annotation, Label};

pub use error::{Error, Result, SessionError, WorkerError};

pub use geometry::{Point, Shape};

pub use notify::{EventBusNotifier, NotificationSink, Severity, TracingNotifier};

pub use scene::{AnnotationScene, InMemoryScene};

// Re-export event bus for convenience
pub use event_bus::{
    event_bus, AnnotationEvent, AppEvent, EventBus, EventBusConfig, EventCategory, EventFilter,
    NotificationEvent, SessionEvent, SubmitEvent, SubscriptionId,
};

// Re-export type aliases for convenience
pub use types::{thread_safe, Callback, ThreadSafe};
