//! # annokit Session
//!
//! Everything a drawing tool needs around its working state:
//!
//! - [`ToolSession`]: working state in a history store, plus a lazily
//!   loaded compute worker whose results are applied latest-wins
//! - [`UnfinishedWorkGuard`]: commits partial geometry on teardown or on a
//!   global submit
//! - [`SubmitCoordinator`]: the single finalizer slot used by submit
//! - [`CancellableTimer`]: a debounce timer with one pending slot
//! - [`WorkerHandle`]: message-passing front of a compute worker

pub mod coordinator;
pub mod guard;
pub mod session;
pub mod timer;
pub mod worker;

pub use coordinator::{FinalizerOwner, SubmitCoordinator};
pub use guard::UnfinishedWorkGuard;
pub use session::{MutateOutcome, ToolSession, ToolSessionBuilder};
pub use timer::CancellableTimer;
pub use worker::{ComputeWorker, Ticket, WorkerFactory, WorkerHandle};
