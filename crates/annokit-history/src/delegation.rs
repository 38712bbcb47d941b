//! Undo/redo delegation between nested history stores.
//!
//! A store created inside the scope of another store holds a [`HistoryLink`]
//! to it. Undo and redo are routed asymmetrically:
//!
//! - undo unwinds the child first and reaches the parent only once the
//!   child has nothing left to undo;
//! - redo replays the parent first and reaches the child only once the
//!   parent has nothing left to redo.
//!
//! A child's redoable future was recorded while the parent was in a
//! particular state, so the parent's future is replayed before it.

use std::sync::Arc;

/// Anything that can take part in undo/redo delegation
pub trait UndoScope: Send + Sync {
    /// Whether undo would change anything in this scope or its ancestors
    fn can_undo(&self) -> bool;

    /// Whether redo would change anything in this scope or its ancestors
    fn can_redo(&self) -> bool;

    /// Undo one step
    fn undo(&self);

    /// Redo one step
    fn redo(&self);
}

/// Where an undo or redo request is carried out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// In the store that received the request.
    Local,
    /// In the linked parent scope.
    Parent,
    /// Nowhere; the request is a no-op.
    Nowhere,
}

/// Route an undo: local history wins over the parent's
pub fn undo_route(local_can_undo: bool, parent_can_undo: bool) -> Route {
    match (local_can_undo, parent_can_undo) {
        (true, _) => Route::Local,
        (false, true) => Route::Parent,
        (false, false) => Route::Nowhere,
    }
}

/// Route a redo: the parent's pending redo wins over local history
pub fn redo_route(local_can_redo: bool, parent_can_redo: bool) -> Route {
    match (parent_can_redo, local_can_redo) {
        (true, _) => Route::Parent,
        (false, true) => Route::Local,
        (false, false) => Route::Nowhere,
    }
}

/// Edge from a child store to the scope it was created in
#[derive(Clone)]
pub struct HistoryLink {
    parent: Arc<dyn UndoScope>,
}

impl HistoryLink {
    /// Link to `parent`
    pub fn new(parent: Arc<dyn UndoScope>) -> Self {
        Self { parent }
    }

    /// The linked parent scope
    pub fn parent(&self) -> &dyn UndoScope {
        self.parent.as_ref()
    }
}

impl std::fmt::Debug for HistoryLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryLink")
            .field("parent_can_undo", &self.parent.can_undo())
            .field("parent_can_redo", &self.parent.can_redo())
            .finish()
    }
}
