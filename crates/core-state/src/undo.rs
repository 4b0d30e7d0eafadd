use core_text::{Buffer, Rope};
use std::collections::VecDeque;
use tracing::trace;

/// Default number of snapshots retained in undo history.
pub const UNDO_LEVELS_DEFAULT: usize = 100;

/// A `(text, cursor)` history entry. Rope clones share structure, so a snapshot is cheap.
#[derive(Clone, Debug)]
pub struct Snapshot {
    pub text: Rope,
    pub cursor: usize,
}

impl Snapshot {
    pub fn capture(buffer: &Buffer) -> Self {
        Self {
            text: buffer.rope().clone(),
            cursor: buffer.cursor(),
        }
    }
}

/// Bounded undo/redo history. The oldest undo entry is evicted once `capacity` is exceeded;
/// the redo stack only ever receives entries popped from the undo side, so it shares the bound.
#[derive(Debug)]
pub struct UndoEngine {
    undo_stack: VecDeque<Snapshot>,
    redo_stack: Vec<Snapshot>,
    capacity: usize,
}

impl Default for UndoEngine {
    fn default() -> Self {
        Self::new(UNDO_LEVELS_DEFAULT)
    }
}

impl UndoEngine {
    pub fn new(capacity: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }
    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity.max(1);
        while self.undo_stack.len() > self.capacity {
            self.undo_stack.pop_front();
        }
        self.redo_stack.truncate(self.capacity);
    }

    /// Record the state about to be mutated. Clears redo.
    pub fn push_snapshot(&mut self, buffer: &Buffer) {
        self.undo_stack.push_back(Snapshot::capture(buffer));
        trace!(target: "state.undo", undo_depth = self.undo_stack.len(), redo_depth = self.redo_stack.len(), cursor = buffer.cursor(), "push_snapshot");
        if self.undo_stack.len() > self.capacity {
            self.undo_stack.pop_front();
            trace!(target: "state.undo", "undo_stack_trimmed");
        }
        if !self.redo_stack.is_empty() {
            self.redo_stack.clear();
            trace!(target: "state.undo", "redo_stack_cleared_on_new_edit");
        }
    }

    /// Restore the most recent snapshot, saving the live state for redo. Returns false when
    /// there is nothing to undo.
    pub fn undo(&mut self, buffer: &mut Buffer) -> bool {
        let Some(last) = self.undo_stack.pop_back() else {
            return false;
        };
        self.redo_stack.push(Snapshot::capture(buffer));
        trace!(target: "state.undo", undo_depth = self.undo_stack.len(), redo_depth = self.redo_stack.len(), "undo_pop");
        buffer.restore(last.text, last.cursor);
        true
    }

    /// Mirror of [`UndoEngine::undo`].
    pub fn redo(&mut self, buffer: &mut Buffer) -> bool {
        let Some(next) = self.redo_stack.pop() else {
            return false;
        };
        self.undo_stack.push_back(Snapshot::capture(buffer));
        if self.undo_stack.len() > self.capacity {
            self.undo_stack.pop_front();
        }
        trace!(target: "state.undo", undo_depth = self.undo_stack.len(), redo_depth = self.redo_stack.len(), "redo_pop");
        buffer.restore(next.text, next.cursor);
        true
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}
