//! Undo / redo.
//!
//! Snapshots live in the bounded [`core_state::UndoEngine`]; this layer repeats a step for a
//! count and fails only when not even one step was possible.

use super::Editor;
use crate::EditError;
use tracing::trace;

impl Editor {
    pub(super) fn undo_times(&mut self, count: usize) -> Result<(), EditError> {
        let mut done = 0;
        while done < count.max(1) && self.state.undo() {
            done += 1;
        }
        if done == 0 {
            return Err(EditError::NothingToUndo);
        }
        self.after_history_step(done, "undo");
        Ok(())
    }

    pub(super) fn redo_times(&mut self, count: usize) -> Result<(), EditError> {
        let mut done = 0;
        while done < count.max(1) && self.state.redo() {
            done += 1;
        }
        if done == 0 {
            return Err(EditError::NothingToRedo);
        }
        self.after_history_step(done, "redo");
        Ok(())
    }

    fn after_history_step(&mut self, steps: usize, what: &'static str) {
        self.touch();
        self.sticky_col = None;
        trace!(target: "actions.dispatch", steps, what, undo = self.undo_depth(), redo = self.redo_depth(), "history_step");
    }
}
