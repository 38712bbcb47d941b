//! Polygon drawing state machine.
//!
//! [`PolygonModeMachine`] turns pointer and key events into polygon
//! segments. Pointer handling is synchronous; boundary anchoring, path
//! tracing and the final optimization run as background session requests.
//!
//! Only committed segments and a closed polygon awaiting optimization live
//! in the session history. The transient lasso path, the mode and the
//! anchor are machine state and are not undoable.
//!
//! Background work runs on the tokio runtime captured when the machine is
//! built. A machine built outside any runtime still draws, but skips
//! anchoring, tracing and optimization; closed polygons are then committed
//! as drawn by the next path, a submit or unmount.
//!
//! Lock order: session gate, then draw state. Draw state is never held
//! while calling into the session.

use annokit_core::event_bus::EventBus;
use annokit_core::notify::NotificationSink;
use annokit_core::{AnnotationScene, Point, Shape};
use annokit_history::{HistoryLink, HistoryStore};
use annokit_session::{
    CancellableTimer, MutateOutcome, SubmitCoordinator, ToolSession, UnfinishedWorkGuard,
};
use parking_lot::{Mutex, MutexGuard};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::boundary::{BoundaryRequest, BoundaryService, BoundaryWorkerFactory};
use crate::geometry::{
    can_path_be_closed, erase_nearest, flatten, is_valid_polygon, remove_trailing_duplicate,
};
use crate::mode::{DrawingStyle, PointerButton, PolygonMode};

type Session<B> = ToolSession<BoundaryWorkerFactory<B>, PolygonState>;

/// Working state kept in the session history
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PolygonState {
    /// Segments of the path being drawn, in drawing order
    pub segments: Vec<Vec<Point>>,
    /// Closed polygon whose optimization has not landed yet
    pub pending: Option<Vec<Point>>,
}

impl PolygonState {
    /// Geometry that would be lost if the tool went away now
    ///
    /// The pending polygon, plus the path drawn so far once it has at least
    /// three distinct points.
    pub fn unfinished_shapes(&self) -> Vec<Shape> {
        let mut shapes = Vec::new();
        if let Some(pending) = self.pending.as_ref().filter(|p| is_valid_polygon(p)) {
            shapes.push(Shape::polygon(pending.clone()));
        }
        let drawn = flatten(&self.segments);
        if is_valid_polygon(&drawn) {
            shapes.push(Shape::polygon(drawn));
        }
        shapes
    }
}

/// Tuning of the polygon tool
#[derive(Debug, Clone, PartialEq)]
pub struct MachineOptions {
    /// Distance from the start point that closes the path, in screen pixels
    pub closable_radius: f64,
    /// Eraser reach, in screen pixels
    pub eraser_radius: f64,
    /// Quiet period before a magnetic trace is requested
    pub debounce: Duration,
    /// Style of new paths
    pub style: DrawingStyle,
}

impl Default for MachineOptions {
    fn default() -> Self {
        Self {
            closable_radius: 6.0,
            eraser_radius: 5.0,
            debounce: Duration::from_millis(250),
            style: DrawingStyle::Polygon,
        }
    }
}

#[derive(Debug)]
struct DrawState {
    mode: Option<PolygonMode>,
    // Mode to fall back to when leaving a closable variant or the eraser
    base: PolygonMode,
    lasso: Vec<Point>,
    anchor: Option<Point>,
    held: bool,
    zoom: f64,
    style: DrawingStyle,
}

impl DrawState {
    fn new(style: DrawingStyle) -> Self {
        Self {
            mode: None,
            base: style.mode(),
            lasso: Vec::new(),
            anchor: None,
            held: false,
            zoom: 1.0,
            style,
        }
    }

    fn go_idle(&mut self) {
        self.mode = None;
        self.base = self.style.mode();
        self.lasso.clear();
        self.anchor = None;
        self.held = false;
    }

    /// Idle exactly when there are no segments. Undo, redo, submit and
    /// worker failures change segments behind the machine's back.
    fn reconcile(&mut self, state: &PolygonState) {
        match (self.mode, state.segments.is_empty()) {
            (Some(_), true) => self.go_idle(),
            (None, false) => {
                self.base = self.style.mode();
                self.mode = Some(self.base);
            }
            _ => {}
        }
    }

    fn closable_radius(&self, options: &MachineOptions) -> f64 {
        options.closable_radius / self.zoom
    }

    fn eraser_radius(&self, options: &MachineOptions) -> f64 {
        options.eraser_radius / self.zoom
    }

    fn is_magnetic(&self) -> bool {
        self.mode.is_some() && self.base.is_magnetic()
    }

    fn fall_back(&mut self) {
        if self.mode.is_some_and(PolygonMode::is_drawing) {
            self.mode = Some(self.base);
        }
    }
}

enum PressAction {
    Start,
    Append,
    Close,
    Wait,
}

struct Shared<B: BoundaryService> {
    session: Session<B>,
    scene: Arc<dyn AnnotationScene>,
    options: MachineOptions,
    draw: Mutex<DrawState>,
    timer: CancellableTimer,
    runtime: Option<Handle>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl<B: BoundaryService> Shared<B> {
    fn history(&self) -> &HistoryStore<PolygonState> {
        self.session.history()
    }

    fn lock_draw(&self) -> (PolygonState, MutexGuard<'_, DrawState>) {
        let state = self.session.state();
        let mut draw = self.draw.lock();
        if self.session.is_mounted() {
            draw.reconcile(&state);
        }
        (state, draw)
    }

    fn spawn(&self, task: impl Future<Output = ()> + Send + 'static) {
        let Some(runtime) = &self.runtime else {
            tracing::warn!("No tokio runtime, background polygon work skipped");
            return;
        };
        let handle = runtime.spawn(task);
        let mut tasks = self.tasks.lock();
        tasks.retain(|task| !task.is_finished());
        tasks.push(handle);
    }

    fn start_path(self: &Arc<Self>, point: Point) {
        self.commit_pending();
        self.history().set_state(
            PolygonState {
                segments: vec![vec![point]],
                pending: None,
            },
            false,
        );

        let magnetic = {
            let mut draw = self.draw.lock();
            draw.base = draw.style.mode();
            draw.mode = Some(draw.base);
            draw.lasso.clear();
            draw.held = true;
            draw.base.is_magnetic()
        };
        tracing::debug!("Path started at {}", point);
        if magnetic {
            self.anchor(point);
        }
    }

    /// Rebuild the boundary map at `point`, unless it is already built there
    fn anchor(self: &Arc<Self>, point: Point) {
        {
            let mut draw = self.draw.lock();
            if draw.anchor == Some(point) {
                tracing::trace!("Boundary map already anchored at {}", point);
                return;
            }
            draw.anchor = Some(point);
        }

        let shared = self.clone();
        self.spawn(async move {
            let outcome = shared
                .session
                .mutate(BoundaryRequest::BuildMap { anchor: point }, |_, _| ())
                .await;
            match outcome {
                Ok(MutateOutcome::Failed(_)) => {
                    let mut draw = shared.draw.lock();
                    if draw.anchor == Some(point) {
                        draw.anchor = None;
                    }
                }
                Ok(_) => {}
                Err(error) => tracing::debug!("Anchoring at {} skipped: {}", point, error),
            }
        });
    }

    fn reanchor(self: &Arc<Self>) {
        let (state, draw) = self.lock_draw();
        let magnetic = draw.is_magnetic();
        drop(draw);
        if let Some(last) = state.segments.last().and_then(|segment| segment.last()) {
            if magnetic {
                self.anchor(*last);
            }
        }
    }

    fn schedule_trace(self: &Arc<Self>, target: Point, anchor: Option<Point>) {
        let shared = self.clone();
        self.timer.schedule(async move {
            shared.trace(target, anchor).await;
        });
    }

    async fn trace(&self, target: Point, anchor: Option<Point>) {
        let outcome = self
            .session
            .mutate(BoundaryRequest::TracePath { target }, |_, response| {
                // A path traced from an older anchor is useless
                let mut draw = self.draw.lock();
                if draw.is_magnetic() && draw.anchor == anchor {
                    if let Some(path) = response.into_path() {
                        draw.lasso = path;
                    }
                }
            })
            .await;
        if let Err(error) = outcome {
            tracing::debug!("Trace to {} skipped: {}", target, error);
        }
    }

    /// Close the path. Returns false if it is degenerate.
    fn complete(self: &Arc<Self>) -> bool {
        let state = self.session.state();
        let lasso = self.draw.lock().lasso.clone();

        let mut points = flatten(&state.segments);
        points.extend(lasso);
        remove_trailing_duplicate(&mut points);
        if !is_valid_polygon(&points) {
            tracing::debug!("Ignoring close of a degenerate path");
            return false;
        }

        self.timer.cancel();
        self.session.cancel();
        self.draw.lock().go_idle();
        self.history().reset(Some(PolygonState {
            segments: Vec::new(),
            pending: Some(points.clone()),
        }));
        tracing::debug!("Path closed with {} points", points.len());

        let shared = self.clone();
        self.spawn(async move { shared.optimize(points).await });
        true
    }

    async fn optimize(&self, raw: Vec<Point>) {
        let scene = &self.scene;
        let outcome = self
            .session
            .mutate(
                BoundaryRequest::OptimizePath {
                    points: raw.clone(),
                },
                |history, response| {
                    // Submit or a new path may already have committed it
                    if !history.with_value(|state| state.pending.as_ref() == Some(&raw)) {
                        return false;
                    }
                    let points = response
                        .into_path()
                        .filter(|points| is_valid_polygon(points))
                        .unwrap_or_else(|| raw.clone());
                    scene.add_shapes(vec![Shape::polygon(points)], None);
                    history.reset(Some(PolygonState::default()));
                    true
                },
            )
            .await;

        match outcome {
            Ok(MutateOutcome::Applied(true)) => {
                tracing::info!("Committed optimized polygon");
            }
            Ok(MutateOutcome::Applied(false)) => {
                tracing::debug!("Optimized polygon was already committed");
            }
            Ok(MutateOutcome::Discarded) => {
                // Superseded: keep the polygon as drawn
                self.session.with_mounted(|history| {
                    if history.with_value(|state| state.pending.as_ref() == Some(&raw)) {
                        scene.add_shapes(vec![Shape::polygon(raw.clone())], None);
                        history.reset(Some(PolygonState::default()));
                    }
                });
            }
            Ok(MutateOutcome::Failed(error)) => {
                tracing::warn!("Optimization failed, committing polygon as drawn: {}", error);
                self.session.with_mounted(|_| {
                    scene.add_shapes(vec![Shape::polygon(raw.clone())], None);
                });
            }
            Err(error) => tracing::debug!("Optimization skipped: {}", error),
        }
    }

    /// Commit a closed polygon whose optimization is still running, as drawn
    fn commit_pending(&self) {
        if self.history().with_value(|state| state.pending.is_none()) {
            return;
        }
        self.session.cancel();
        self.session.with_mounted(|history| {
            if let Some(points) = history.with_value(|state| state.pending.clone()) {
                self.scene.add_shapes(vec![Shape::polygon(points)], None);
                history.reset(Some(PolygonState::default()));
            }
        });
    }

    fn finish_lasso(&self, mut draw: MutexGuard<'_, DrawState>) {
        let lasso = std::mem::take(&mut draw.lasso);
        draw.base = PolygonMode::Polygon;
        draw.mode = Some(PolygonMode::Polygon);
        drop(draw);

        if !lasso.is_empty() {
            self.history().update(
                |state| {
                    let mut next = state.clone();
                    next.segments.push(lasso);
                    next
                },
                false,
            );
        }
    }
}

/// Builder for [`PolygonModeMachine`]
pub struct PolygonModeMachineBuilder<B: BoundaryService> {
    factory: BoundaryWorkerFactory<B>,
    scene: Arc<dyn AnnotationScene>,
    coordinator: Arc<SubmitCoordinator>,
    options: MachineOptions,
    link: Option<HistoryLink>,
    notifier: Option<Arc<dyn NotificationSink>>,
    bus: Option<Arc<EventBus>>,
    runtime: Option<Handle>,
}

impl<B: BoundaryService> PolygonModeMachineBuilder<B> {
    pub fn options(mut self, options: MachineOptions) -> Self {
        self.options = options;
        self
    }

    /// Nest the tool's history inside an enclosing scope
    pub fn parent(mut self, link: HistoryLink) -> Self {
        self.link = Some(link);
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn NotificationSink>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn event_bus(mut self, bus: Arc<EventBus>) -> Self {
        self.bus = Some(bus);
        self
    }

    /// Runtime for background work, instead of the one current at `build`
    pub fn runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Mount the tool
    pub fn build(self) -> PolygonModeMachine<B> {
        let mut session = ToolSession::builder("polygon", self.factory);
        if let Some(link) = self.link {
            session = session.parent(link);
        }
        if let Some(notifier) = self.notifier {
            session = session.notifier(notifier);
        }
        if let Some(bus) = self.bus {
            session = session.event_bus(bus);
        }
        let session = session.build();

        let guard = UnfinishedWorkGuard::install(
            &session,
            self.scene.clone(),
            self.coordinator,
            PolygonState::unfinished_shapes,
        );

        let draw = DrawState::new(self.options.style);
        let runtime = self.runtime.or_else(|| Handle::try_current().ok());
        let timer = match &runtime {
            Some(runtime) => CancellableTimer::with_runtime(self.options.debounce, runtime.clone()),
            None => CancellableTimer::new(self.options.debounce),
        };
        PolygonModeMachine {
            shared: Arc::new(Shared {
                session,
                scene: self.scene,
                options: self.options,
                draw: Mutex::new(draw),
                timer,
                runtime,
                tasks: Mutex::new(Vec::new()),
            }),
            guard,
        }
    }
}

/// Pointer-driven polygon, lasso and magnetic-lasso tool
pub struct PolygonModeMachine<B: BoundaryService> {
    shared: Arc<Shared<B>>,
    guard: UnfinishedWorkGuard<PolygonState>,
}

impl<B: BoundaryService> PolygonModeMachine<B> {
    /// Start building a tool backed by `factory`
    ///
    /// Finished polygons go to `scene`; unfinished ones are registered with
    /// `coordinator` for global submit.
    pub fn builder(
        factory: BoundaryWorkerFactory<B>,
        scene: Arc<dyn AnnotationScene>,
        coordinator: Arc<SubmitCoordinator>,
    ) -> PolygonModeMachineBuilder<B> {
        PolygonModeMachineBuilder {
            factory,
            scene,
            coordinator,
            options: MachineOptions::default(),
            link: None,
            notifier: None,
            bus: None,
            runtime: None,
        }
    }

    /// Current mode; `None` while idle
    pub fn mode(&self) -> Option<PolygonMode> {
        self.shared.lock_draw().1.mode
    }

    /// Segments of the path being drawn
    pub fn segments(&self) -> Vec<Vec<Point>> {
        self.shared.history().with_value(|state| state.segments.clone())
    }

    /// In-progress lasso or traced path, not yet part of the segments
    pub fn lasso(&self) -> Vec<Point> {
        self.shared.draw.lock().lasso.clone()
    }

    /// Closed polygon still awaiting optimization
    pub fn pending(&self) -> Option<Vec<Point>> {
        self.shared.history().with_value(|state| state.pending.clone())
    }

    /// Point the boundary map was last requested for
    pub fn anchor(&self) -> Option<Point> {
        self.shared.draw.lock().anchor
    }

    pub fn history(&self) -> &HistoryStore<PolygonState> {
        self.shared.history()
    }

    pub fn session(&self) -> &ToolSession<BoundaryWorkerFactory<B>, PolygonState> {
        &self.shared.session
    }

    pub fn options(&self) -> &MachineOptions {
        &self.shared.options
    }

    pub fn style(&self) -> DrawingStyle {
        self.shared.draw.lock().style
    }

    /// Style used by the next path
    pub fn set_style(&self, style: DrawingStyle) {
        let mut draw = self.shared.draw.lock();
        draw.style = style;
        if draw.mode.is_none() {
            draw.base = style.mode();
        }
    }

    pub fn zoom(&self) -> f64 {
        self.shared.draw.lock().zoom
    }

    /// Set the view zoom; radii shrink as the view zooms in
    pub fn set_zoom(&self, zoom: f64) {
        if !zoom.is_finite() || zoom <= 0.0 {
            tracing::warn!("Ignoring invalid zoom {}", zoom);
            return;
        }
        self.shared.draw.lock().zoom = zoom;
    }

    /// Closing distance in image pixels at the current zoom
    pub fn closable_radius(&self) -> f64 {
        self.shared.draw.lock().closable_radius(&self.shared.options)
    }

    /// Eraser reach in image pixels at the current zoom
    pub fn eraser_radius(&self) -> f64 {
        self.shared.draw.lock().eraser_radius(&self.shared.options)
    }

    /// Whether clicking at `cursor` would close the path
    pub fn can_close(&self, cursor: Point) -> bool {
        let (state, draw) = self.shared.lock_draw();
        can_path_be_closed(
            &state.segments,
            &draw.lasso,
            cursor,
            draw.closable_radius(&self.shared.options),
        )
    }

    /// Whether drawn geometry would be committed on unmount
    pub fn has_unfinished_work(&self) -> bool {
        self.guard.has_unfinished_work()
    }

    pub fn pointer_down(&self, point: Point, button: PointerButton) {
        let shared = &self.shared;
        if !shared.session.is_mounted() {
            return;
        }
        let (state, mut draw) = shared.lock_draw();

        if button == PointerButton::Secondary {
            if !state.segments.is_empty() {
                draw.mode = Some(PolygonMode::Eraser);
                draw.held = true;
                drop(draw);
                shared.timer.cancel();
            }
            return;
        }

        draw.held = true;
        let action = match draw.mode {
            None => PressAction::Start,
            Some(PolygonMode::Polygon | PolygonMode::MagneticLasso) => {
                let radius = draw.closable_radius(&shared.options);
                if can_path_be_closed(&state.segments, &draw.lasso, point, radius) {
                    PressAction::Close
                } else {
                    PressAction::Append
                }
            }
            Some(
                PolygonMode::LassoClose
                | PolygonMode::MagneticLassoClose
                | PolygonMode::Lasso
                | PolygonMode::Eraser,
            ) => PressAction::Wait,
        };

        match action {
            PressAction::Start => {
                drop(draw);
                shared.start_path(point);
            }
            PressAction::Append => {
                let mut segment = std::mem::take(&mut draw.lasso);
                if segment.last() != Some(&point) {
                    segment.push(point);
                }
                let magnetic = draw.is_magnetic();
                drop(draw);

                shared.timer.cancel();
                shared.history().update(
                    |state| {
                        let mut next = state.clone();
                        next.segments.push(segment);
                        next
                    },
                    false,
                );
                if magnetic {
                    shared.anchor(point);
                }
            }
            PressAction::Close => {
                drop(draw);
                shared.complete();
            }
            PressAction::Wait => {}
        }
    }

    pub fn pointer_move(&self, point: Point) {
        let shared = &self.shared;
        if !shared.session.is_mounted() {
            return;
        }
        let (state, mut draw) = shared.lock_draw();
        let Some(mode) = draw.mode else {
            return;
        };

        if mode == PolygonMode::Eraser {
            let radius = draw.eraser_radius(&shared.options);
            drop(draw);
            if let Some(segments) = erase_nearest(&state.segments, point, radius) {
                tracing::trace!("Erased point near {}", point);
                shared.history().set_state(
                    PolygonState {
                        segments,
                        pending: state.pending,
                    },
                    false,
                );
            }
            return;
        }

        if draw.held && !draw.base.is_magnetic() {
            draw.base = PolygonMode::Lasso;
            if mode == PolygonMode::Polygon {
                draw.mode = Some(PolygonMode::Lasso);
            }
            draw.lasso.push(point);
        }

        let radius = draw.closable_radius(&shared.options);
        let closable = can_path_be_closed(&state.segments, &draw.lasso, point, radius);
        let current = draw.mode.unwrap_or(draw.base);
        if closable && !current.is_closable() {
            draw.mode = draw.base.closable_variant();
        } else if !closable && current.is_closable() {
            draw.mode = Some(draw.base);
        }

        let trace = draw.is_magnetic() && !draw.held;
        let anchor = draw.anchor;
        drop(draw);
        if trace {
            shared.schedule_trace(point, anchor);
        }
    }

    pub fn pointer_up(&self, point: Point) {
        let shared = &self.shared;
        if !shared.session.is_mounted() {
            return;
        }
        let (state, mut draw) = shared.lock_draw();
        draw.held = false;
        let Some(mode) = draw.mode else {
            return;
        };

        match mode {
            PolygonMode::Eraser => {
                draw.mode = Some(draw.base);
            }
            PolygonMode::LassoClose | PolygonMode::MagneticLassoClose => {
                let radius = draw.closable_radius(&shared.options);
                if can_path_be_closed(&state.segments, &draw.lasso, point, radius) {
                    drop(draw);
                    if !shared.complete() {
                        shared.draw.lock().fall_back();
                    }
                } else if draw.base == PolygonMode::Lasso {
                    shared.finish_lasso(draw);
                } else {
                    draw.mode = Some(draw.base);
                }
            }
            PolygonMode::Lasso => shared.finish_lasso(draw),
            PolygonMode::Polygon | PolygonMode::MagneticLasso => {}
        }
    }

    /// Discard the path being drawn, as one undoable step
    ///
    /// A closed polygon still being optimized is committed as drawn.
    pub fn escape(&self) {
        let shared = &self.shared;
        shared.timer.cancel();
        shared.commit_pending();
        shared.session.cancel();
        shared.draw.lock().go_idle();
        let history = shared.history();
        if shared.session.is_mounted() && history.with_value(|state| !state.segments.is_empty()) {
            history.set_state(PolygonState::default(), false);
        }
        tracing::debug!("Path discarded");
    }

    pub fn undo(&self) {
        self.step_history(true);
    }

    pub fn redo(&self) {
        self.step_history(false);
    }

    fn step_history(&self, undo: bool) {
        let shared = &self.shared;
        let history = shared.history();
        let (possible, local) = if undo {
            (history.can_undo(), history.local_can_undo())
        } else {
            (history.can_redo(), history.local_can_redo())
        };
        if !possible {
            return;
        }

        shared.timer.cancel();
        if local {
            // Results computed for the state being left must not land
            shared.session.cancel();
        }
        {
            let mut draw = shared.draw.lock();
            draw.lasso.clear();
            if draw.base == PolygonMode::Lasso {
                draw.base = PolygonMode::Polygon;
            }
            draw.fall_back();
        }

        if undo {
            history.undo();
        } else {
            history.redo();
        }
        shared.reanchor();
    }

    /// Wait for background anchoring and optimization to settle
    ///
    /// Debounced traces that have not fired yet are not waited for.
    pub async fn flush(&self) {
        loop {
            let tasks = std::mem::take(&mut *self.shared.tasks.lock());
            if tasks.is_empty() {
                break;
            }
            for task in tasks {
                if let Err(error) = task.await {
                    tracing::warn!("Background polygon task failed: {}", error);
                }
            }
        }
    }

    /// Unmount the tool, committing unfinished geometry. Idempotent.
    pub fn unmount(&self) {
        self.shared.timer.cancel();
        self.shared.session.unmount();
        self.shared.draw.lock().go_idle();
    }
}

impl<B: BoundaryService> Drop for PolygonModeMachine<B> {
    fn drop(&mut self) {
        self.unmount();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(coords: &[(f64, f64)]) -> Vec<Point> {
        coords.iter().map(|&c| Point::from(c)).collect()
    }

    #[test]
    fn test_unfinished_shapes() {
        let mut state = PolygonState::default();
        assert!(state.unfinished_shapes().is_empty());

        state.segments = vec![pts(&[(0.0, 0.0)]), pts(&[(10.0, 0.0)])];
        assert!(state.unfinished_shapes().is_empty());

        state.segments.push(pts(&[(10.0, 10.0)]));
        assert_eq!(state.unfinished_shapes().len(), 1);

        state.pending = Some(pts(&[(20.0, 20.0), (30.0, 20.0), (30.0, 30.0)]));
        let shapes = state.unfinished_shapes();
        assert_eq!(shapes.len(), 2);
        assert_eq!(shapes[0].points()[0], Point::new(20.0, 20.0));
    }

    #[test]
    fn test_reconcile_tracks_segments() {
        let mut draw = DrawState::new(DrawingStyle::MagneticLasso);
        let mut state = PolygonState {
            segments: vec![pts(&[(1.0, 1.0)])],
            pending: None,
        };

        draw.reconcile(&state);
        assert_eq!(draw.mode, Some(PolygonMode::MagneticLasso));

        state.segments.clear();
        draw.anchor = Some(Point::new(1.0, 1.0));
        draw.reconcile(&state);
        assert_eq!(draw.mode, None);
        assert_eq!(draw.anchor, None);
    }

    #[test]
    fn test_radii_scale_with_zoom() {
        let options = MachineOptions::default();
        let mut draw = DrawState::new(DrawingStyle::Polygon);
        draw.zoom = 2.0;
        assert_eq!(draw.closable_radius(&options), 3.0);
        assert_eq!(draw.eraser_radius(&options), 2.5);
    }
}
