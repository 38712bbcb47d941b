//! Reference boundary service.
//!
//! Traces straight pixel-stepped lines inside the image bounds and smooths
//! finished polygons with Ramer-Douglas-Peucker. Useful wherever no vision
//! backend is available.

use annokit_core::{Point, WorkerError};
use async_trait::async_trait;
use image::GrayImage;
use parking_lot::Mutex;
use std::sync::Arc;

use crate::boundary::{BoundaryService, BoundaryWorkerFactory};
use crate::geometry::{is_valid_polygon, simplify};

/// Straight-line boundary service over a grayscale image
#[derive(Debug)]
pub struct LinearBoundaryService {
    image: Arc<GrayImage>,
    tolerance: f64,
    anchor: Mutex<Option<Point>>,
}

impl LinearBoundaryService {
    /// Service over `image`, simplifying with `tolerance` pixels
    pub fn new(image: Arc<GrayImage>, tolerance: f64) -> Self {
        Self {
            image,
            tolerance,
            anchor: Mutex::new(None),
        }
    }

    /// Factory producing one service per session
    ///
    /// Fails to load for an empty image.
    pub fn factory(image: GrayImage, tolerance: f64) -> BoundaryWorkerFactory<Self> {
        let image = Arc::new(image);
        BoundaryWorkerFactory::new(move || {
            if image.width() == 0 || image.height() == 0 {
                return Err(WorkerError::load("image has no pixels"));
            }
            Ok(Self::new(image.clone(), tolerance))
        })
    }

    /// Anchor of the current map
    pub fn anchor(&self) -> Option<Point> {
        *self.anchor.lock()
    }

    fn clamp(&self, point: Point) -> Point {
        let max_x = self.image.width().saturating_sub(1) as f64;
        let max_y = self.image.height().saturating_sub(1) as f64;
        Point::new(point.x.round().clamp(0.0, max_x), point.y.round().clamp(0.0, max_y))
    }
}

#[async_trait]
impl BoundaryService for LinearBoundaryService {
    async fn build_map(&self, anchor: Point) -> Result<(), WorkerError> {
        *self.anchor.lock() = Some(self.clamp(anchor));
        Ok(())
    }

    async fn trace_path(&self, target: Point) -> Result<Vec<Point>, WorkerError> {
        let anchor = self
            .anchor()
            .ok_or_else(|| WorkerError::request("no boundary map built"))?;
        let target = self.clamp(target);

        let dx = target.x - anchor.x;
        let dy = target.y - anchor.y;
        let steps = dx.abs().max(dy.abs()) as usize;

        let mut path: Vec<Point> = Vec::with_capacity(steps);
        for step in 1..=steps {
            let t = step as f64 / steps as f64;
            let point = Point::new((anchor.x + dx * t).round(), (anchor.y + dy * t).round());
            if path.last() != Some(&point) {
                path.push(point);
            }
        }
        Ok(path)
    }

    async fn optimize_path(&self, points: Vec<Point>) -> Result<Vec<Point>, WorkerError> {
        let simplified = simplify(&points, self.tolerance);
        if is_valid_polygon(&simplified) {
            Ok(simplified)
        } else {
            Ok(points)
        }
    }

    fn dispose(&self) {
        self.anchor.lock().take();
    }
}
