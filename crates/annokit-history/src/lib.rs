//! # annokit History
//!
//! Undo/redo history for tool sessions.
//!
//! - [`HistoryStack`]: the versioned value container (value, entries, index)
//! - [`HistoryStore`]: a shared, observable handle around a stack
//! - [`HistoryLink`] / [`UndoScope`]: delegation from a nested store to the
//!   store of its enclosing scope

pub mod delegation;
pub mod stack;
pub mod store;

pub use delegation::{redo_route, undo_route, HistoryLink, Route, UndoScope};
pub use stack::HistoryStack;
pub use store::{HistoryStore, ListenerId, WeakHistoryStore};
