//! Drawing modes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Mode of the polygon tool while a path is being drawn
///
/// Idle is `Option::<PolygonMode>::None`. The `*Close` variants are only
/// entered by hovering near the start of the path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolygonMode {
    /// Click-to-place vertices.
    Polygon,
    /// Free-hand tracing with the primary button held.
    Lasso,
    /// Polygon or lasso, hovering over the start point.
    LassoClose,
    /// Boundary-snapped tracing between anchors.
    MagneticLasso,
    /// Magnetic lasso, hovering over the start point.
    MagneticLassoClose,
    /// Removing vertices under the cursor.
    Eraser,
}

impl PolygonMode {
    /// Whether this is a proximity-entered closable variant
    pub fn is_closable(self) -> bool {
        match self {
            PolygonMode::LassoClose | PolygonMode::MagneticLassoClose => true,
            PolygonMode::Polygon
            | PolygonMode::Lasso
            | PolygonMode::MagneticLasso
            | PolygonMode::Eraser => false,
        }
    }

    /// Variant entered when the cursor reaches the start point
    pub fn closable_variant(self) -> Option<PolygonMode> {
        match self {
            PolygonMode::Polygon | PolygonMode::Lasso | PolygonMode::LassoClose => {
                Some(PolygonMode::LassoClose)
            }
            PolygonMode::MagneticLasso | PolygonMode::MagneticLassoClose => {
                Some(PolygonMode::MagneticLassoClose)
            }
            PolygonMode::Eraser => None,
        }
    }

    /// Whether points are placed through the boundary service
    pub fn is_magnetic(self) -> bool {
        match self {
            PolygonMode::MagneticLasso | PolygonMode::MagneticLassoClose => true,
            PolygonMode::Polygon
            | PolygonMode::Lasso
            | PolygonMode::LassoClose
            | PolygonMode::Eraser => false,
        }
    }

    /// Whether the mode adds geometry, as opposed to erasing it
    pub fn is_drawing(self) -> bool {
        !matches!(self, PolygonMode::Eraser)
    }
}

impl fmt::Display for PolygonMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PolygonMode::Polygon => "polygon",
            PolygonMode::Lasso => "lasso",
            PolygonMode::LassoClose => "lasso-close",
            PolygonMode::MagneticLasso => "magnetic-lasso",
            PolygonMode::MagneticLassoClose => "magnetic-lasso-close",
            PolygonMode::Eraser => "eraser",
        };
        f.write_str(name)
    }
}

/// Base style used when a path starts from idle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawingStyle {
    /// Click-placed vertices, free-hand lasso while dragging
    #[default]
    Polygon,
    /// Boundary-snapped magnetic lasso
    MagneticLasso,
}

impl DrawingStyle {
    /// Mode a new path starts in
    pub fn mode(self) -> PolygonMode {
        match self {
            DrawingStyle::Polygon => PolygonMode::Polygon,
            DrawingStyle::MagneticLasso => PolygonMode::MagneticLasso,
        }
    }
}

/// Pointer button of a press
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerButton {
    #[default]
    Primary,
    Secondary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closable_variants() {
        assert_eq!(
            PolygonMode::Polygon.closable_variant(),
            Some(PolygonMode::LassoClose)
        );
        assert_eq!(
            PolygonMode::Lasso.closable_variant(),
            Some(PolygonMode::LassoClose)
        );
        assert_eq!(
            PolygonMode::MagneticLasso.closable_variant(),
            Some(PolygonMode::MagneticLassoClose)
        );
        assert_eq!(PolygonMode::Eraser.closable_variant(), None);

        assert!(PolygonMode::LassoClose.is_closable());
        assert!(!PolygonMode::Lasso.is_closable());
        assert!(PolygonMode::MagneticLassoClose.is_magnetic());
    }

    #[test]
    fn test_style_serde() {
        let style: DrawingStyle = serde_json::from_str("\"magnetic_lasso\"").unwrap();
        assert_eq!(style, DrawingStyle::MagneticLasso);
        assert_eq!(style.mode(), PolygonMode::MagneticLasso);
    }
}
