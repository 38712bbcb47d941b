//! # annokit
//!
//! Interactive annotation session core: the machinery that lets a user
//! drive semi-automatic drawing tools with undo/redo, cancellation and
//! recovery of in-progress work.
//!
//! ## Architecture
//!
//! annokit is organized as a workspace with multiple crates:
//!
//! 1. **annokit-core** - Geometry, scene and notification collaborators, errors, events
//! 2. **annokit-history** - Undo/redo history stores and parent delegation
//! 3. **annokit-session** - Tool sessions, compute workers, unfinished-work recovery
//! 4. **annokit-polygon** - Polygon, lasso and magnetic-lasso state machine
//! 5. **annokit-settings** - Configuration persistence and validation
//! 6. **annokit** - Logging setup, scripted replay and the command-line binary

pub mod replay;

pub use annokit_core::{
    event_bus, Annotation, AnnotationScene, AppEvent, Error, EventBus, EventFilter,
    InMemoryScene, Label, NotificationSink, Point, Result, SessionError, Severity, Shape,
    WorkerError,
};
pub use annokit_history::{HistoryLink, HistoryStore, UndoScope};
pub use annokit_polygon::{
    BoundaryService, DrawingStyle, LinearBoundaryService, MachineOptions, PointerButton,
    PolygonMode, PolygonModeMachine,
};
pub use annokit_session::{SubmitCoordinator, ToolSession, UnfinishedWorkGuard};
pub use annokit_settings::{Config, LoggingSettings};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging from the logging settings
///
/// Sets up structured logging with:
/// - RUST_LOG environment variable support, falling back to `settings.level`
/// - Human-readable or JSON lines output on stderr
pub fn init_logging(settings: &LoggingSettings) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .map_err(|e| anyhow::anyhow!("Invalid log filter '{}': {}", settings.level, e))?;

    // stdout carries replay output
    let registry = tracing_subscriber::registry().with(env_filter);
    if settings.json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()?;
    } else {
        registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_level(true)
                    .with_line_number(true),
            )
            .try_init()?;
    }

    Ok(())
}
