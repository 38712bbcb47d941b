//! Versioned value container.

/// A value together with the linear history of values it has held.
///
/// `entries[index]` is the value the stack was last committed to. A
/// transient replacement (see [`HistoryStack::replace`]) changes `value`
/// without recording an entry, so undo returns to the last committed entry
/// before it.
#[derive(Debug, Clone)]
pub struct HistoryStack<T> {
    value: T,
    entries: Vec<T>,
    index: usize,
}

impl<T: Clone> HistoryStack<T> {
    /// Create a stack holding a single entry
    pub fn new(value: T) -> Self {
        Self {
            entries: vec![value.clone()],
            value,
            index: 0,
        }
    }

    /// Current value
    pub fn value(&self) -> &T {
        &self.value
    }

    /// Position of the current entry
    pub fn index(&self) -> usize {
        self.index
    }

    /// Number of recorded entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false; a stack holds at least its initial entry
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Record `value` as a new entry, discarding any redoable future
    pub fn push(&mut self, value: T) {
        self.entries.truncate(self.index + 1);
        self.entries.push(value.clone());
        self.index = self.entries.len() - 1;
        self.value = value;
    }

    /// Replace the current value without recording an entry
    pub fn replace(&mut self, value: T) {
        self.value = value;
    }

    /// Whether there is an earlier entry to return to
    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    /// Whether there is a later entry to move to
    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.entries.len()
    }

    /// Step back one entry. Returns false if there was nothing to undo.
    pub fn undo(&mut self) -> bool {
        if !self.can_undo() {
            return false;
        }
        self.index -= 1;
        self.value = self.entries[self.index].clone();
        true
    }

    /// Step forward one entry. Returns false if there was nothing to redo.
    pub fn redo(&mut self) -> bool {
        if !self.can_redo() {
            return false;
        }
        self.index += 1;
        self.value = self.entries[self.index].clone();
        true
    }

    /// Collapse to a single entry: `value`, or the first entry ever recorded
    pub fn reset(&mut self, value: Option<T>) {
        let value = match value {
            Some(value) => value,
            None => self.entries.swap_remove(0),
        };
        self.entries.clear();
        self.entries.push(value.clone());
        self.index = 0;
        self.value = value;
    }
}
