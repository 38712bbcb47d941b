//! # annokit Polygon
//!
//! Pointer-driven polygon drawing:
//!
//! - [`PolygonMode`]: the drawing modes and their closable variants
//! - [`geometry`]: closability, eraser and path simplification helpers
//! - [`BoundaryService`]: boundary snapping used by the magnetic lasso,
//!   run as a session compute worker
//! - [`PolygonModeMachine`]: interprets pointer and key events into
//!   segments and commits finished polygons to the scene

pub mod boundary;
pub mod geometry;
pub mod linear;
pub mod machine;
pub mod mode;

pub use boundary::{
    BoundaryRequest, BoundaryResponse, BoundaryService, BoundaryWorker, BoundaryWorkerFactory,
};
pub use linear::LinearBoundaryService;
pub use machine::{MachineOptions, PolygonModeMachine, PolygonModeMachineBuilder, PolygonState};
pub use mode::{DrawingStyle, PointerButton, PolygonMode};
