//! Scripted session replay.
//!
//! A script describes an image, a drawing style and an ordered list of
//! input events. Replaying it drives a [`PolygonModeMachine`] against the
//! linear boundary service and an in-memory scene, and yields the
//! annotations committed along the way.

use anyhow::{ensure, Context};
use annokit_core::event_bus::{AppEvent, EventBus, EventCategory, EventFilter};
use annokit_core::{Annotation, AnnotationScene, EventBusNotifier, InMemoryScene, Point};
use annokit_polygon::{
    DrawingStyle, LinearBoundaryService, MachineOptions, PointerButton, PolygonModeMachine,
};
use annokit_session::SubmitCoordinator;
use annokit_settings::Config;
use image::GrayImage;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Dimensions of the image being annotated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

/// One input event of a script
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReplayEvent {
    Down {
        x: f64,
        y: f64,
        #[serde(default)]
        button: PointerButton,
    },
    Move {
        x: f64,
        y: f64,
    },
    Up {
        x: f64,
        y: f64,
    },
    /// Primary press and release at the same point
    Click {
        x: f64,
        y: f64,
    },
    Escape,
    Undo,
    Redo,
    Zoom {
        value: f64,
    },
    Style {
        style: DrawingStyle,
    },
    /// Let debounced work fire
    Wait {
        ms: u64,
    },
    /// Global "submit annotations"
    Submit,
    Unmount,
}

/// A replayable drawing session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayScript {
    pub image: ImageSize,
    /// Overrides the configured default style
    #[serde(default)]
    pub style: Option<DrawingStyle>,
    #[serde(default)]
    pub zoom: Option<f64>,
    pub events: Vec<ReplayEvent>,
}

impl ReplayScript {
    /// Parse a script from JSON text
    pub fn from_json(text: &str) -> anyhow::Result<Self> {
        let script: Self = serde_json::from_str(text).context("Invalid replay script")?;
        ensure!(
            script.image.width > 0 && script.image.height > 0,
            "Replay image must not be empty"
        );
        Ok(script)
    }

    /// Read a script from a JSON file
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read replay script {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("In {}", path.display()))
    }
}

/// Replay `script` and return the annotations it committed
///
/// Background work is flushed after every event. Whatever is still
/// unfinished at the end is committed by unmounting the tool.
pub async fn run(
    script: &ReplayScript,
    config: &Config,
    bus: Arc<EventBus>,
) -> anyhow::Result<Vec<Annotation>> {
    let subscription = bus.subscribe(EventFilter::All, |event: AppEvent| {
        if event.category() == EventCategory::Notification {
            tracing::warn!("{}", event.description());
        } else {
            tracing::debug!("{}", event.description());
        }
    });

    let scene = Arc::new(InMemoryScene::with_event_bus(bus.clone()));
    let coordinator = Arc::new(SubmitCoordinator::with_event_bus(bus.clone()));
    let image = GrayImage::new(script.image.width, script.image.height);

    let options = MachineOptions {
        style: script.style.unwrap_or(config.polygon.default_style),
        ..config.polygon.machine_options()
    };
    let machine = PolygonModeMachine::builder(
        LinearBoundaryService::factory(image, config.polygon.optimize_tolerance),
        scene.clone(),
        coordinator.clone(),
    )
    .options(options)
    .notifier(Arc::new(EventBusNotifier::new(bus.clone())))
    .event_bus(bus.clone())
    .build();

    if let Some(zoom) = script.zoom {
        machine.set_zoom(zoom);
    }

    tracing::info!("Replaying {} event(s)", script.events.len());
    for (index, event) in script.events.iter().enumerate() {
        tracing::trace!("Event #{}: {:?}", index, event);
        apply(&machine, &coordinator, event).await;
        machine.flush().await;
    }

    machine.unmount();
    machine.flush().await;
    bus.unsubscribe(subscription);

    Ok(scene.current_annotations())
}

async fn apply(
    machine: &PolygonModeMachine<LinearBoundaryService>,
    coordinator: &SubmitCoordinator,
    event: &ReplayEvent,
) {
    match *event {
        ReplayEvent::Down { x, y, button } => machine.pointer_down(Point::new(x, y), button),
        ReplayEvent::Move { x, y } => machine.pointer_move(Point::new(x, y)),
        ReplayEvent::Up { x, y } => machine.pointer_up(Point::new(x, y)),
        ReplayEvent::Click { x, y } => {
            let point = Point::new(x, y);
            machine.pointer_down(point, PointerButton::Primary);
            machine.pointer_up(point);
        }
        ReplayEvent::Escape => machine.escape(),
        ReplayEvent::Undo => machine.undo(),
        ReplayEvent::Redo => machine.redo(),
        ReplayEvent::Zoom { value } => machine.set_zoom(value),
        ReplayEvent::Style { style } => machine.set_style(style),
        ReplayEvent::Wait { ms } => tokio::time::sleep(Duration::from_millis(ms)).await,
        ReplayEvent::Submit => {
            if !coordinator.submit() {
                tracing::debug!("Nothing to submit");
            }
        }
        ReplayEvent::Unmount => machine.unmount(),
    }
}
