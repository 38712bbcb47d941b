//! Boundary snapping as a session compute worker.
//!
//! A [`BoundaryService`] builds a cost map around an anchor point and then
//! traces shortest paths from that anchor. [`BoundaryWorker`] adapts a
//! service to the request/response protocol of a session worker.

use annokit_core::{Point, WorkerError};
use annokit_session::{ComputeWorker, WorkerFactory};
use async_trait::async_trait;
use std::sync::Arc;

/// Boundary computation backing the magnetic lasso
#[async_trait]
pub trait BoundaryService: Send + Sync + 'static {
    /// Build the cost map around `anchor`
    ///
    /// Paths are traced from the most recently built anchor.
    async fn build_map(&self, anchor: Point) -> Result<(), WorkerError>;

    /// Shortest path from the anchor to `target`, excluding the anchor
    async fn trace_path(&self, target: Point) -> Result<Vec<Point>, WorkerError>;

    /// Smooth a finished polygon
    async fn optimize_path(&self, points: Vec<Point>) -> Result<Vec<Point>, WorkerError>;

    /// Release native resources
    fn dispose(&self) {}
}

/// Request sent to a boundary worker
#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryRequest {
    BuildMap { anchor: Point },
    TracePath { target: Point },
    OptimizePath { points: Vec<Point> },
}

/// Reply from a boundary worker
#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryResponse {
    MapBuilt { anchor: Point },
    Path(Vec<Point>),
}

impl BoundaryResponse {
    /// Points of a path reply
    pub fn into_path(self) -> Option<Vec<Point>> {
        match self {
            BoundaryResponse::Path(points) => Some(points),
            BoundaryResponse::MapBuilt { .. } => None,
        }
    }
}

/// Runs a [`BoundaryService`] behind a session worker handle
pub struct BoundaryWorker<B> {
    service: B,
}

impl<B: BoundaryService> BoundaryWorker<B> {
    pub fn new(service: B) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &B {
        &self.service
    }
}

#[async_trait]
impl<B: BoundaryService> ComputeWorker for BoundaryWorker<B> {
    type Request = BoundaryRequest;
    type Response = BoundaryResponse;

    async fn compute(&self, request: BoundaryRequest) -> Result<BoundaryResponse, WorkerError> {
        match request {
            BoundaryRequest::BuildMap { anchor } => {
                tracing::trace!("Building boundary map at {}", anchor);
                self.service.build_map(anchor).await?;
                Ok(BoundaryResponse::MapBuilt { anchor })
            }
            BoundaryRequest::TracePath { target } => {
                self.service.trace_path(target).await.map(BoundaryResponse::Path)
            }
            BoundaryRequest::OptimizePath { points } => {
                self.service.optimize_path(points).await.map(BoundaryResponse::Path)
            }
        }
    }

    fn dispose(&self) {
        self.service.dispose();
    }
}

type Loader<B> = Arc<dyn Fn() -> Result<B, WorkerError> + Send + Sync>;

/// Creates a fresh boundary service for each session
pub struct BoundaryWorkerFactory<B> {
    loader: Loader<B>,
}

impl<B: BoundaryService> BoundaryWorkerFactory<B> {
    /// Factory calling `loader` once per session load
    pub fn new(loader: impl Fn() -> Result<B, WorkerError> + Send + Sync + 'static) -> Self {
        Self {
            loader: Arc::new(loader),
        }
    }
}

impl<B> Clone for BoundaryWorkerFactory<B> {
    fn clone(&self) -> Self {
        Self {
            loader: self.loader.clone(),
        }
    }
}

#[async_trait]
impl<B: BoundaryService> WorkerFactory for BoundaryWorkerFactory<B> {
    type Worker = BoundaryWorker<B>;

    async fn create(&self) -> Result<BoundaryWorker<B>, WorkerError> {
        let service = (self.loader)()?;
        Ok(BoundaryWorker::new(service))
    }
}
