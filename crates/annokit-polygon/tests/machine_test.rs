use annokit_core::{AnnotationScene, InMemoryScene, Point, WorkerError};
use annokit_history::HistoryStore;
use annokit_polygon::{
    BoundaryService, BoundaryWorkerFactory, DrawingStyle, LinearBoundaryService, MachineOptions,
    PointerButton, PolygonMode, PolygonModeMachine,
};
use annokit_session::SubmitCoordinator;
use async_trait::async_trait;
use image::GrayImage;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Linear service that counts the requests it serves
struct CountingService {
    inner: LinearBoundaryService,
    maps: Arc<AtomicUsize>,
    traces: Arc<AtomicUsize>,
}

#[async_trait]
impl BoundaryService for CountingService {
    async fn build_map(&self, anchor: Point) -> Result<(), WorkerError> {
        self.maps.fetch_add(1, Ordering::SeqCst);
        self.inner.build_map(anchor).await
    }

    async fn trace_path(&self, target: Point) -> Result<Vec<Point>, WorkerError> {
        self.traces.fetch_add(1, Ordering::SeqCst);
        self.inner.trace_path(target).await
    }

    async fn optimize_path(&self, points: Vec<Point>) -> Result<Vec<Point>, WorkerError> {
        self.inner.optimize_path(points).await
    }
}

struct Counters {
    maps: Arc<AtomicUsize>,
    traces: Arc<AtomicUsize>,
}

fn counting_factory() -> (BoundaryWorkerFactory<CountingService>, Counters) {
    let image = Arc::new(GrayImage::new(100, 100));
    let maps = Arc::new(AtomicUsize::new(0));
    let traces = Arc::new(AtomicUsize::new(0));
    let counters = Counters {
        maps: maps.clone(),
        traces: traces.clone(),
    };
    let factory = BoundaryWorkerFactory::new(move || {
        Ok(CountingService {
            inner: LinearBoundaryService::new(image.clone(), 1.0),
            maps: maps.clone(),
            traces: traces.clone(),
        })
    });
    (factory, counters)
}

struct Fixture<B: BoundaryService> {
    scene: Arc<InMemoryScene>,
    coordinator: Arc<SubmitCoordinator>,
    machine: PolygonModeMachine<B>,
}

fn fixture(style: DrawingStyle) -> Fixture<LinearBoundaryService> {
    let scene = Arc::new(InMemoryScene::new());
    let coordinator = Arc::new(SubmitCoordinator::new());
    let machine = PolygonModeMachine::builder(
        LinearBoundaryService::factory(GrayImage::new(100, 100), 1.0),
        scene.clone(),
        coordinator.clone(),
    )
    .options(MachineOptions {
        style,
        ..MachineOptions::default()
    })
    .build();
    Fixture {
        scene,
        coordinator,
        machine,
    }
}

fn p(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

fn click<B: BoundaryService>(machine: &PolygonModeMachine<B>, point: Point) {
    machine.pointer_down(point, PointerButton::Primary);
    machine.pointer_up(point);
}

fn triangle<B: BoundaryService>(machine: &PolygonModeMachine<B>) {
    click(machine, p(0.0, 0.0));
    click(machine, p(10.0, 0.0));
    click(machine, p(10.0, 10.0));
}

#[tokio::test]
async fn test_click_polygon_closes_on_start_point() {
    let f = fixture(DrawingStyle::Polygon);
    triangle(&f.machine);
    assert_eq!(f.machine.mode(), Some(PolygonMode::Polygon));
    assert_eq!(f.machine.segments().len(), 3);

    f.machine.pointer_move(p(1.0, 1.0));
    assert_eq!(f.machine.mode(), Some(PolygonMode::LassoClose));
    f.machine.pointer_move(p(30.0, 30.0));
    assert_eq!(f.machine.mode(), Some(PolygonMode::Polygon));

    f.machine.pointer_move(p(1.0, 1.0));
    click(&f.machine, p(1.0, 1.0));
    assert_eq!(f.machine.mode(), None);
    f.machine.flush().await;

    let annotations = f.scene.current_annotations();
    assert_eq!(annotations.len(), 1);
    assert_eq!(
        annotations[0].shape.points(),
        &[p(0.0, 0.0), p(10.0, 0.0), p(10.0, 10.0)]
    );
    assert!(f.machine.segments().is_empty());
    assert!(f.machine.pending().is_none());
    assert!(!f.machine.history().can_undo());
    assert!(!f.coordinator.has_finalizer());
}

#[tokio::test]
async fn test_press_near_start_closes_without_hover() {
    let f = fixture(DrawingStyle::Polygon);
    triangle(&f.machine);

    f.machine.pointer_down(p(2.0, 1.0), PointerButton::Primary);
    assert_eq!(f.machine.mode(), None);
    f.machine.flush().await;
    assert_eq!(f.scene.len(), 1);
}

#[tokio::test]
async fn test_degenerate_path_does_not_close() {
    let f = fixture(DrawingStyle::Polygon);
    click(&f.machine, p(0.0, 0.0));
    click(&f.machine, p(10.0, 0.0));

    f.machine.pointer_move(p(1.0, 1.0));
    assert_eq!(f.machine.mode(), Some(PolygonMode::Polygon));
    click(&f.machine, p(1.0, 1.0));
    assert_eq!(f.machine.segments().len(), 3);
    assert!(f.scene.is_empty());
}

#[tokio::test]
async fn test_freehand_lasso() {
    let f = fixture(DrawingStyle::Polygon);
    f.machine.pointer_down(p(0.0, 0.0), PointerButton::Primary);
    f.machine.pointer_move(p(20.0, 0.0));
    assert_eq!(f.machine.mode(), Some(PolygonMode::Lasso));
    f.machine.pointer_move(p(20.0, 20.0));
    f.machine.pointer_move(p(2.0, 2.0));
    assert_eq!(f.machine.mode(), Some(PolygonMode::LassoClose));
    assert_eq!(f.machine.lasso().len(), 3);

    f.machine.pointer_up(p(2.0, 2.0));
    f.machine.flush().await;

    let annotations = f.scene.current_annotations();
    assert_eq!(annotations.len(), 1);
    assert_eq!(
        annotations[0].shape.points(),
        &[p(0.0, 0.0), p(20.0, 0.0), p(20.0, 20.0), p(2.0, 2.0)]
    );
}

#[tokio::test]
async fn test_lasso_released_away_from_start_becomes_segment() {
    let f = fixture(DrawingStyle::Polygon);
    f.machine.pointer_down(p(0.0, 0.0), PointerButton::Primary);
    f.machine.pointer_move(p(20.0, 0.0));
    f.machine.pointer_move(p(20.0, 20.0));
    f.machine.pointer_up(p(20.0, 20.0));

    assert_eq!(f.machine.mode(), Some(PolygonMode::Polygon));
    assert!(f.machine.lasso().is_empty());
    assert_eq!(
        f.machine.segments(),
        vec![vec![p(0.0, 0.0)], vec![p(20.0, 0.0), p(20.0, 20.0)]]
    );
}

#[tokio::test]
async fn test_eraser_removes_nearest_point() {
    let f = fixture(DrawingStyle::Polygon);
    triangle(&f.machine);

    f.machine.pointer_down(p(30.0, 30.0), PointerButton::Secondary);
    assert_eq!(f.machine.mode(), Some(PolygonMode::Eraser));
    f.machine.pointer_move(p(10.0, 1.0));
    f.machine.pointer_up(p(10.0, 1.0));

    assert_eq!(f.machine.mode(), Some(PolygonMode::Polygon));
    assert_eq!(
        f.machine.segments(),
        vec![vec![p(0.0, 0.0)], vec![p(10.0, 10.0)]]
    );

    f.machine.undo();
    assert_eq!(f.machine.segments().len(), 3);
}

#[tokio::test]
async fn test_erasing_everything_returns_to_idle() {
    let f = fixture(DrawingStyle::Polygon);
    click(&f.machine, p(0.0, 0.0));

    f.machine.pointer_down(p(0.0, 0.0), PointerButton::Secondary);
    f.machine.pointer_move(p(0.0, 1.0));
    f.machine.pointer_up(p(0.0, 1.0));
    assert_eq!(f.machine.mode(), None);
}

#[tokio::test]
async fn test_escape_discards_path() {
    let f = fixture(DrawingStyle::Polygon);
    triangle(&f.machine);
    assert!(f.machine.has_unfinished_work());

    f.machine.escape();
    assert_eq!(f.machine.mode(), None);
    assert!(f.machine.segments().is_empty());
    assert!(!f.machine.has_unfinished_work());
    assert!(!f.coordinator.has_finalizer());

    f.machine.unmount();
    assert!(f.scene.is_empty());
}

#[tokio::test]
async fn test_escape_can_be_undone() {
    let f = fixture(DrawingStyle::Polygon);
    triangle(&f.machine);

    f.machine.escape();
    assert!(f.machine.segments().is_empty());
    assert!(f.machine.history().can_undo());

    f.machine.undo();
    assert_eq!(f.machine.segments().len(), 3);
    assert_eq!(f.machine.mode(), Some(PolygonMode::Polygon));
    assert!(f.coordinator.has_finalizer());

    f.machine.redo();
    assert!(f.machine.segments().is_empty());
    assert_eq!(f.machine.mode(), None);

    // Escape while idle adds no history entry
    f.machine.undo();
    f.machine.escape();
    f.machine.escape();
    f.machine.undo();
    assert_eq!(f.machine.segments().len(), 3);
}

#[tokio::test]
async fn test_undo_redo_points() {
    let f = fixture(DrawingStyle::Polygon);
    triangle(&f.machine);

    f.machine.undo();
    f.machine.undo();
    assert_eq!(f.machine.segments(), vec![vec![p(0.0, 0.0)]]);
    f.machine.redo();
    assert_eq!(f.machine.segments().len(), 2);

    f.machine.undo();
    f.machine.undo();
    assert_eq!(f.machine.mode(), None);
    f.machine.redo();
    assert_eq!(f.machine.mode(), Some(PolygonMode::Polygon));

    // Continuing after redo appends instead of starting over
    click(&f.machine, p(50.0, 50.0));
    assert_eq!(f.machine.segments().len(), 2);
}

#[tokio::test]
async fn test_undo_delegates_to_parent_scope() {
    let parent = HistoryStore::new(0u32);
    let scene = Arc::new(InMemoryScene::new());
    let machine = PolygonModeMachine::builder(
        LinearBoundaryService::factory(GrayImage::new(100, 100), 1.0),
        scene,
        Arc::new(SubmitCoordinator::new()),
    )
    .parent(parent.link())
    .build();

    parent.set_state(1, false);
    click(&machine, p(0.0, 0.0));

    machine.undo();
    assert!(machine.segments().is_empty());
    assert_eq!(parent.value(), 1);

    machine.undo();
    assert_eq!(parent.value(), 0);

    // Redo replays the parent first
    machine.redo();
    assert_eq!(parent.value(), 1);
    assert!(machine.segments().is_empty());
    machine.redo();
    assert_eq!(machine.segments().len(), 1);
}

#[tokio::test]
async fn test_unmount_commits_unfinished_polygon() {
    let f = fixture(DrawingStyle::Polygon);
    triangle(&f.machine);
    assert!(f.coordinator.has_finalizer());

    f.machine.unmount();
    f.machine.unmount();

    assert_eq!(f.scene.len(), 1);
    assert!(!f.coordinator.has_finalizer());
    assert!(f.machine.session().is_disposed());

    // Events after unmount are ignored
    click(&f.machine, p(40.0, 40.0));
    assert_eq!(f.machine.mode(), None);
}

#[test]
fn test_drawing_without_runtime_commits_as_drawn() {
    let f = fixture(DrawingStyle::Polygon);
    triangle(&f.machine);
    click(&f.machine, p(1.0, 1.0));

    // No runtime to optimize on: the closed polygon waits as drawn
    assert_eq!(f.machine.mode(), None);
    assert_eq!(
        f.machine.pending(),
        Some(vec![p(0.0, 0.0), p(10.0, 0.0), p(10.0, 10.0)])
    );

    // Starting the next path commits it; anchoring and tracing are skipped
    f.machine.set_style(DrawingStyle::MagneticLasso);
    click(&f.machine, p(50.0, 50.0));
    assert_eq!(f.machine.mode(), Some(PolygonMode::MagneticLasso));
    f.machine.pointer_move(p(60.0, 50.0));
    assert_eq!(f.scene.len(), 1);

    f.machine.unmount();
    let annotations = f.scene.current_annotations();
    assert_eq!(annotations.len(), 1);
    assert_eq!(
        annotations[0].shape.points(),
        &[p(0.0, 0.0), p(10.0, 0.0), p(10.0, 10.0)]
    );
}

#[tokio::test]
async fn test_submit_commits_and_resets() {
    let f = fixture(DrawingStyle::Polygon);
    triangle(&f.machine);

    assert!(f.coordinator.submit());
    assert_eq!(f.scene.len(), 1);
    assert_eq!(f.machine.mode(), None);
    assert!(f.machine.segments().is_empty());
    assert!(!f.machine.history().can_undo());

    drop(f.machine);
    assert_eq!(f.scene.len(), 1);
}

#[tokio::test]
async fn test_zoom_scales_closable_radius() {
    let f = fixture(DrawingStyle::Polygon);
    triangle(&f.machine);

    assert!(f.machine.can_close(p(4.0, 0.0)));
    f.machine.set_zoom(2.0);
    assert_eq!(f.machine.closable_radius(), 3.0);
    assert!(!f.machine.can_close(p(4.0, 0.0)));

    f.machine.set_zoom(0.0);
    assert_eq!(f.machine.zoom(), 2.0);
}

#[tokio::test(start_paused = true)]
async fn test_magnetic_lasso_traces_and_closes() {
    let (factory, counters) = counting_factory();
    let scene = Arc::new(InMemoryScene::new());
    let machine = PolygonModeMachine::builder(factory, scene.clone(), Arc::new(SubmitCoordinator::new()))
        .options(MachineOptions {
            style: DrawingStyle::MagneticLasso,
            ..MachineOptions::default()
        })
        .build();

    click(&machine, p(0.0, 0.0));
    machine.flush().await;
    assert_eq!(machine.mode(), Some(PolygonMode::MagneticLasso));
    assert_eq!(machine.anchor(), Some(p(0.0, 0.0)));
    assert_eq!(counters.maps.load(Ordering::SeqCst), 1);

    // Moves inside the debounce window collapse into one trace
    machine.pointer_move(p(5.0, 0.0));
    tokio::time::sleep(Duration::from_millis(100)).await;
    machine.pointer_move(p(10.0, 0.0));
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(counters.traces.load(Ordering::SeqCst), 1);
    assert_eq!(machine.lasso().len(), 10);
    assert_eq!(machine.lasso().last(), Some(&p(10.0, 0.0)));

    click(&machine, p(10.0, 0.0));
    machine.flush().await;
    assert_eq!(machine.segments().len(), 2);
    assert_eq!(machine.segments()[1].len(), 10);
    assert_eq!(machine.anchor(), Some(p(10.0, 0.0)));
    assert_eq!(counters.maps.load(Ordering::SeqCst), 2);

    machine.pointer_move(p(10.0, 10.0));
    tokio::time::sleep(Duration::from_millis(300)).await;
    click(&machine, p(10.0, 10.0));
    machine.flush().await;

    machine.pointer_move(p(1.0, 1.0));
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(machine.mode(), Some(PolygonMode::MagneticLassoClose));
    click(&machine, p(1.0, 1.0));
    machine.flush().await;

    // Collinear runs of the traced path are simplified away
    let annotations = scene.current_annotations();
    assert_eq!(annotations.len(), 1);
    assert_eq!(
        annotations[0].shape.points(),
        &[p(0.0, 0.0), p(10.0, 0.0), p(10.0, 10.0), p(1.0, 1.0)]
    );
}

#[tokio::test(start_paused = true)]
async fn test_anchor_is_not_rebuilt_for_same_point() {
    let (factory, counters) = counting_factory();
    let machine = PolygonModeMachine::builder(
        factory,
        Arc::new(InMemoryScene::new()),
        Arc::new(SubmitCoordinator::new()),
    )
    .options(MachineOptions {
        style: DrawingStyle::MagneticLasso,
        ..MachineOptions::default()
    })
    .build();

    click(&machine, p(0.0, 0.0));
    click(&machine, p(0.0, 0.0));
    machine.flush().await;

    assert_eq!(machine.segments().len(), 2);
    assert_eq!(counters.maps.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_escape_cancels_pending_trace() {
    let (factory, counters) = counting_factory();
    let machine = PolygonModeMachine::builder(
        factory,
        Arc::new(InMemoryScene::new()),
        Arc::new(SubmitCoordinator::new()),
    )
    .options(MachineOptions {
        style: DrawingStyle::MagneticLasso,
        ..MachineOptions::default()
    })
    .build();

    click(&machine, p(0.0, 0.0));
    machine.flush().await;
    machine.pointer_move(p(10.0, 0.0));
    machine.escape();
    tokio::time::sleep(Duration::from_millis(500)).await;

    assert_eq!(counters.traces.load(Ordering::SeqCst), 0);
    assert!(machine.lasso().is_empty());
    assert_eq!(machine.mode(), None);
}

#[tokio::test]
async fn test_load_failure_resets_to_empty() {
    let scene = Arc::new(InMemoryScene::new());
    let machine = PolygonModeMachine::builder(
        LinearBoundaryService::factory(GrayImage::new(0, 0), 1.0),
        scene.clone(),
        Arc::new(SubmitCoordinator::new()),
    )
    .options(MachineOptions {
        style: DrawingStyle::MagneticLasso,
        ..MachineOptions::default()
    })
    .build();

    click(&machine, p(0.0, 0.0));
    machine.flush().await;

    assert_eq!(machine.mode(), None);
    assert!(machine.segments().is_empty());
    assert_eq!(machine.anchor(), None);
    assert!(scene.is_empty());
}

#[tokio::test]
async fn test_new_path_commits_polygon_awaiting_optimization() {
    let f = fixture(DrawingStyle::Polygon);
    triangle(&f.machine);
    click(&f.machine, p(1.0, 1.0));
    assert!(f.machine.pending().is_some());

    // Start another path before the optimization lands
    click(&f.machine, p(50.0, 50.0));
    assert!(f.machine.pending().is_none());
    assert_eq!(f.scene.len(), 1);

    f.machine.flush().await;
    assert_eq!(f.scene.len(), 1);
    assert_eq!(f.machine.segments(), vec![vec![p(50.0, 50.0)]]);
}
