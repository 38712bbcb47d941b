//! Shared annotation scene.
//!
//! The scene is where accepted geometry ends up. Tool sessions only ever
//! append to it; they never read back what another tool committed.

use parking_lot::RwLock;
use std::sync::Arc;

use crate::annotation::{Annotation, Label};
use crate::event_bus::{AnnotationEvent, AppEvent, EventBus};
use crate::geometry::Shape;

/// Destination for committed shapes
pub trait AnnotationScene: Send + Sync {
    /// Commit `shapes`, optionally labelled, and return the new annotations
    fn add_shapes(&self, shapes: Vec<Shape>, labels: Option<Vec<Label>>) -> Vec<Annotation>;

    /// All annotations currently in the scene, in commit order
    fn current_annotations(&self) -> Vec<Annotation>;
}

/// Scene that keeps annotations in memory
#[derive(Debug, Default)]
pub struct InMemoryScene {
    annotations: RwLock<Vec<Annotation>>,
    bus: Option<Arc<EventBus>>,
}

impl InMemoryScene {
    /// Create an empty scene
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty scene that announces commits on `bus`
    pub fn with_event_bus(bus: Arc<EventBus>) -> Self {
        Self {
            annotations: RwLock::new(Vec::new()),
            bus: Some(bus),
        }
    }

    /// Number of committed annotations
    pub fn len(&self) -> usize {
        self.annotations.read().len()
    }

    /// Whether the scene is empty
    pub fn is_empty(&self) -> bool {
        self.annotations.read().is_empty()
    }
}

impl AnnotationScene for InMemoryScene {
    fn add_shapes(&self, shapes: Vec<Shape>, labels: Option<Vec<Label>>) -> Vec<Annotation> {
        let labels = labels.unwrap_or_default();
        let added: Vec<Annotation> = shapes
            .into_iter()
            .map(|shape| Annotation::new(shape, labels.clone()))
            .collect();

        self.annotations.write().extend(added.iter().cloned());
        tracing::info!("Committed {} annotation(s) to scene", added.len());

        if let Some(bus) = &self.bus {
            bus.publish(AppEvent::Annotation(AnnotationEvent::Added {
                ids: added.iter().map(|a| a.id).collect(),
            }));
        }

        added
    }

    fn current_annotations(&self) -> Vec<Annotation> {
        self.annotations.read().clone()
    }
}
