//! Committed annotations and their labels.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geometry::Shape;

/// A label attached to an annotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    /// Unique label identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
}

impl Label {
    /// Create a label with a fresh identifier
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
        }
    }
}

/// A shape that has been accepted into the annotation scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    /// Unique annotation identifier.
    pub id: Uuid,
    /// Committed geometry.
    pub shape: Shape,
    /// Labels assigned at commit time.
    pub labels: Vec<Label>,
    /// When the annotation was committed.
    pub created_at: DateTime<Utc>,
}

impl Annotation {
    /// Create a new annotation stamped with the current time
    pub fn new(shape: Shape, labels: Vec<Label>) -> Self {
        Self {
            id: Uuid::new_v4(),
            shape,
            labels,
            created_at: Utc::now(),
        }
    }
}
