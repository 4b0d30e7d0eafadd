//! Macro recording and playback.
//!
//! Playback feeds the stored keys back through [`Editor::dispatch_key`], the same path live
//! keys take, with recording suspended so a macro never captures its own replay. The first key
//! that fails aborts the rest of the playback (and of every enclosing playback), which is what
//! ends a self-recursive macro once it runs out of text.

use super::Editor;
use crate::EditError;
use tracing::{debug, trace};

impl Editor {
    pub(super) fn start_recording(&mut self, name: char) -> Result<(), EditError> {
        self.state.macros.start(name)?;
        self.state
            .set_status(format!("recording @{}", name.to_ascii_lowercase()));
        Ok(())
    }

    pub(super) fn stop_recording(&mut self) {
        if let Some((name, keys)) = self.state.macros.stop() {
            debug!(target: "actions.macro", register = %name, keys, "recorded");
            self.state.clear_status();
        }
    }

    /// `{count}@{name}`. `@@` replays the last played macro, `@:` the last command line.
    pub(super) fn play_macro(&mut self, name: char, count: usize) -> Result<(), EditError> {
        let name = match name {
            '@' => self
                .state
                .macros
                .last_played()
                .ok_or(EditError::NoPreviousMacro)?,
            other => other,
        };
        if name == ':' {
            return self.repeat_command_line(count);
        }
        let keys = self
            .state
            .macros
            .get(name)
            .ok_or(EditError::EmptyMacro(name))?
            .to_vec();
        if self.state.macros.depth() as usize >= self.state.options.macro_depth {
            return Err(EditError::MacroDepth);
        }
        self.state.macros.set_last_played(name);
        debug!(target: "actions.macro", register = %name, keys = keys.len(), count, depth = self.state.macros.depth(), "play");

        self.state.macros.suspend();
        let mut outcome = Ok(());
        'runs: for _ in 0..count.max(1) {
            for key in &keys {
                let result = self.dispatch_key(*key);
                self.replaced |= result.buffer_replaced;
                if result.host.is_some() {
                    self.host = result.host;
                }
                if result.failed {
                    trace!(target: "actions.macro", register = %name, key = %key, "playback_aborted");
                    outcome = Err(EditError::Blocked);
                    break 'runs;
                }
            }
        }
        self.state.macros.resume();
        outcome
    }

    /// `@:`: run the last submitted command line again, `count` times.
    fn repeat_command_line(&mut self, count: usize) -> Result<(), EditError> {
        let line = self.last_ex.clone().ok_or(EditError::NoPreviousCommand)?;
        for _ in 0..count.max(1) {
            self.run_ex(&line)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::Editor;
    use pretty_assertions::assert_eq;

    #[test]
    fn record_and_play() {
        let mut ed = Editor::from_text("a\nb\nc\nd\n");
        ed.dispatch_keys("qaA!<Esc>jq");
        assert_eq!(ed.recording(), None);
        assert_eq!(ed.buffer_text(), "a!\nb\nc\nd\n");
        ed.dispatch_keys("2@a");
        assert_eq!(ed.buffer_text(), "a!\nb!\nc!\nd\n");
        ed.dispatch_keys("@@");
        assert_eq!(ed.buffer_text(), "a!\nb!\nc!\nd!\n");
    }

    #[test]
    fn recursive_macro_stops_at_first_failure() {
        let mut ed = Editor::from_text("1\n2\n3\n");
        ed.dispatch_keys("qbqqbI-<Esc>j@bq");
        ed.dispatch_keys("gg@b");
        assert_eq!(ed.buffer_text(), "--1\n-2\n-3\n");
    }

    #[test]
    fn uppercase_register_appends() {
        let mut ed = Editor::from_text("abcdef\n");
        ed.dispatch_keys("qaxqqAxq");
        assert_eq!(ed.buffer_text(), "cdef\n");
        ed.dispatch_keys("@a");
        assert_eq!(ed.buffer_text(), "ef\n");
    }

    #[test]
    fn unknown_macro_is_a_soft_error() {
        let mut ed = Editor::from_text("x\n");
        let r = ed.dispatch_keys("@z");
        assert!(r.failed);
        assert_eq!(ed.status(), Some("macro register z is empty"));
        assert!(ed.dispatch_keys("@@").failed);
        assert_eq!(ed.buffer_text(), "x\n");
        assert_eq!(ed.undo_depth(), 0);
    }

    #[test]
    fn empty_macro_aborts_enclosing_playback() {
        let mut ed = Editor::from_text("xy\n");
        ed.dispatch_keys("qa@zxq");
        assert_eq!(ed.buffer_text(), "y\n");
        let r = ed.dispatch_keys("@a");
        assert!(r.failed);
        assert_eq!(ed.buffer_text(), "y\n");
    }

    #[test]
    fn recording_status_and_nested_playback_is_not_recorded() {
        let mut ed = Editor::from_text("abc\n");
        ed.dispatch_keys("qax");
        assert_eq!(ed.status(), Some("recording @a"));
        ed.dispatch_keys("q");
        ed.dispatch_keys("qb@aq");
        assert_eq!(ed.buffer_text(), "c\n");
        ed.dispatch_keys("u@b");
        assert_eq!(ed.buffer_text(), "c\n");
    }
}
