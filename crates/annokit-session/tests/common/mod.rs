#![allow(dead_code)]

use annokit_core::{Annotation, AnnotationScene, Label, NotificationSink, Point, Severity, Shape};
use annokit_core::{InMemoryScene, WorkerError};
use annokit_session::{ComputeWorker, WorkerFactory};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::oneshot;

pub type Segments = Vec<Vec<Point>>;
pub type Log = Arc<Mutex<Vec<String>>>;

/// Worker whose replies are released by the test
pub struct GatedWorker {
    log: Log,
}

#[async_trait]
impl ComputeWorker for GatedWorker {
    type Request = oneshot::Receiver<Result<Segments, WorkerError>>;
    type Response = Segments;

    async fn compute(&self, gate: Self::Request) -> Result<Segments, WorkerError> {
        gate.await.unwrap_or(Err(WorkerError::Disconnected))
    }

    fn dispose(&self) {
        self.log.lock().push("dispose".to_string());
    }
}

pub struct GatedFactory {
    pub log: Log,
    pub created: Arc<AtomicUsize>,
    pub fail: bool,
}

impl GatedFactory {
    pub fn new(log: &Log) -> Self {
        Self {
            log: log.clone(),
            created: Arc::new(AtomicUsize::new(0)),
            fail: false,
        }
    }

    pub fn failing(log: &Log) -> Self {
        Self {
            fail: true,
            ..Self::new(log)
        }
    }
}

#[async_trait]
impl WorkerFactory for GatedFactory {
    type Worker = GatedWorker;

    async fn create(&self) -> Result<GatedWorker, WorkerError> {
        // Let concurrent loaders pile up before creation finishes
        tokio::task::yield_now().await;
        self.created.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(WorkerError::load("missing vision module"));
        }
        Ok(GatedWorker {
            log: self.log.clone(),
        })
    }
}

/// Scene that records every add_shapes call in the shared log
pub struct RecordingScene {
    pub log: Log,
    pub calls: Mutex<Vec<Vec<Shape>>>,
    scene: InMemoryScene,
}

impl RecordingScene {
    pub fn new(log: &Log) -> Arc<Self> {
        Arc::new(Self {
            log: log.clone(),
            calls: Mutex::new(Vec::new()),
            scene: InMemoryScene::new(),
        })
    }
}

impl AnnotationScene for RecordingScene {
    fn add_shapes(&self, shapes: Vec<Shape>, labels: Option<Vec<Label>>) -> Vec<Annotation> {
        self.log.lock().push(format!("add_shapes:{}", shapes.len()));
        self.calls.lock().push(shapes.clone());
        self.scene.add_shapes(shapes, labels)
    }

    fn current_annotations(&self) -> Vec<Annotation> {
        self.scene.current_annotations()
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub messages: Mutex<Vec<(String, Severity)>>,
}

impl NotificationSink for RecordingNotifier {
    fn notify(&self, message: &str, severity: Severity) {
        self.messages.lock().push((message.to_string(), severity));
    }
}

pub fn new_log() -> Log {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn segment(points: &[(f64, f64)]) -> Vec<Point> {
    points.iter().map(|&(x, y)| Point::new(x, y)).collect()
}

pub fn segments_to_shapes(segments: &Segments) -> Vec<Shape> {
    segments
        .iter()
        .filter(|s| !s.is_empty())
        .map(|s| Shape::polygon(s.clone()))
        .collect()
}

/// Give spawned tasks a chance to run up to their next suspension point
pub async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}
