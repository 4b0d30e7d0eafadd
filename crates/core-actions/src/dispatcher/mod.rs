//! Dispatcher: the [`Editor`] facade driving the editing state machine.
//!
//! Every key enters through [`Editor::dispatch_key`]: it is offered to the macro recorder,
//! translated into an [`Action`], executed, and the cursor/selection are normalized for the
//! resulting mode. The handlers live in focused sub-modules, each extending `impl Editor`:
//! * `motion`   - cursor motions, counts, sticky column
//! * `operator` - delete / yank / change / indent / case over a resolved span
//! * `edit`     - single-key edits (`r`, `~`, `J`) and paste
//! * `mode`     - insert sessions
//! * `visual`   - visual selections
//! * `undo`     - undo / redo
//! * `repeat`   - dot-repeat
//! * `macros`   - recording and playback
//! * `command`  - the `:` command line (parsing in `command_parser`)
//!
//! Handlers return `Result<(), EditError>`. A failure never leaves pending state behind: the
//! translator has already reset, and the error becomes a status message plus
//! [`DispatchResult::failed`].

use std::fmt;
use std::path::PathBuf;

use core_events::{ClipboardTicket, KeyEvent, parse_keys};
use core_state::{
    EditorState, EngineOptions, MarkTable, Mode, RegisterBank, WriteKind, WriteOutcome,
};
use core_text::motion::{self as text_motion, FindSpec};
use core_text::{Buffer, Selection};
use tracing::{debug, trace};

use crate::clipboard::{Clipboard, PendingPaste};
use crate::key_translator::{KeyTranslator, Translation};
use crate::{Action, EditError};

mod command;
mod command_parser;
mod edit;
mod macros;
mod mode;
mod motion;
mod operator;
mod repeat;
mod undo;
mod visual;

use mode::InsertSession;
use repeat::RepeatCommand;

/// Requests the engine cannot fulfil itself and hands to its host (file I/O, exit).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostRequest {
    /// `:w [path]`
    Write { path: Option<PathBuf> },
    /// `:q`, `:q!`
    Quit { force: bool },
    /// `:wq [path]`, `:x`
    WriteQuit { path: Option<PathBuf> },
    /// `:e[!] path`; the host answers with [`Editor::replace_entire_buffer`].
    Edit { path: PathBuf, force: bool },
}

/// Result of dispatching one key (or one host call).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchResult {
    /// Something visible changed: text, cursor, selection, mode or pending keys.
    pub dirty: bool,
    /// The key failed (soft error); the status line carries the message.
    pub failed: bool,
    /// The whole document was replaced; cached views must be rebuilt.
    pub buffer_replaced: bool,
    pub host: Option<HostRequest>,
}

impl DispatchResult {
    pub fn clean() -> Self {
        Self::default()
    }

    pub fn dirty() -> Self {
        Self {
            dirty: true,
            ..Self::default()
        }
    }

    /// Fold a later result into this one.
    pub fn merge(&mut self, other: DispatchResult) {
        self.dirty |= other.dirty;
        self.failed |= other.failed;
        self.buffer_replaced |= other.buffer_replaced;
        if other.host.is_some() {
            self.host = other.host;
        }
    }
}

/// Cheap summary of everything a renderer shows, compared before and after a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Fingerprint {
    revision: u64,
    cursor: usize,
    selection: Selection,
    mode: Mode,
    command_len: usize,
    pending_len: usize,
}

pub struct Editor {
    state: EditorState,
    translator: KeyTranslator,
    clipboard: Option<Box<dyn Clipboard>>,
    last_ticket: ClipboardTicket,
    pending_paste: Option<PendingPaste>,
    insert: Option<InsertSession>,
    last_change: Option<RepeatCommand>,
    last_find: Option<FindSpec>,
    last_ex: Option<String>,
    /// Display column kept across vertical motions; `usize::MAX` after `$`.
    sticky_col: Option<usize>,
    /// Bumped on every buffer mutation.
    revision: u64,
    host: Option<HostRequest>,
    replaced: bool,
}

impl fmt::Debug for Editor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Editor")
            .field("mode", &self.state.mode)
            .field("cursor", &self.state.buffer.cursor())
            .field("revision", &self.revision)
            .field("clipboard", &self.clipboard.is_some())
            .finish_non_exhaustive()
    }
}

impl Editor {
    pub fn new(buffer: Buffer, options: EngineOptions) -> Self {
        let translator = KeyTranslator::new(options.max_count);
        Self {
            state: EditorState::new(buffer, options),
            translator,
            clipboard: None,
            last_ticket: ClipboardTicket(0),
            pending_paste: None,
            insert: None,
            last_change: None,
            last_find: None,
            last_ex: None,
            sticky_col: None,
            revision: 0,
            host: None,
            replaced: false,
        }
    }

    /// Editor over `text` with default options.
    pub fn from_text(text: &str) -> Self {
        Self::new(Buffer::from(text), EngineOptions::default())
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    /// Sole entry point for live and replayed keys.
    pub fn dispatch_key(&mut self, key: KeyEvent) -> DispatchResult {
        self.state.macros.record(key);
        let before = self.fingerprint();
        let recording = self.state.macros.is_recording();
        let outcome = match self.translator.translate(self.state.mode, recording, &key) {
            Translation::Pending | Translation::Cancelled => Ok(()),
            Translation::Invalid => Err(EditError::UnknownKey),
            Translation::Ready(action) => {
                trace!(target: "actions.dispatch", ?action, "execute");
                self.execute(action)
            }
        };
        let failed = match outcome {
            Ok(()) => false,
            Err(err) => {
                self.report(&err);
                true
            }
        };
        self.normalize();
        DispatchResult {
            dirty: failed || before != self.fingerprint(),
            failed,
            buffer_replaced: std::mem::take(&mut self.replaced),
            host: self.host.take(),
        }
    }

    /// Dispatch every key of a key-notation string (`"3dw<Esc>"`), merging the results.
    pub fn dispatch_keys(&mut self, keys: &str) -> DispatchResult {
        let mut result = DispatchResult::clean();
        for key in parse_keys(keys) {
            result.merge(self.dispatch_key(key));
        }
        result
    }

    pub fn buffer_text(&self) -> String {
        self.state.buffer.text()
    }

    pub fn buffer(&self) -> &Buffer {
        &self.state.buffer
    }

    pub fn selection(&self) -> Selection {
        self.state.buffer.selection()
    }

    pub fn cursor(&self) -> usize {
        self.state.buffer.cursor()
    }

    pub fn mode(&self) -> Mode {
        self.state.mode
    }

    /// Keys typed toward an incomplete command (`2d`, `"a`).
    pub fn pending_display(&self) -> &str {
        self.translator.pending_display()
    }

    pub fn status(&self) -> Option<&str> {
        self.state.status()
    }

    /// Host-side message (file written, open failed).
    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.state.set_status(msg);
    }

    /// Expire the status message; true when it was cleared.
    pub fn tick_status(&mut self) -> bool {
        self.state.tick_status()
    }

    /// Command line being typed, including the ':' prompt.
    pub fn command_line(&self) -> &str {
        self.state.command_line.buffer()
    }

    /// Register currently being recorded into.
    pub fn recording(&self) -> Option<char> {
        self.state.macros.recording_name()
    }

    /// Insert host-provided text at the cursor as one undoable change.
    pub fn insert_at_cursor(&mut self, text: &str) -> DispatchResult {
        if text.is_empty() {
            return DispatchResult::clean();
        }
        self.snapshot();
        let at = self.state.buffer.cursor();
        let n = self.state.buffer.insert(at, text);
        self.state.buffer.set_cursor(at + n);
        self.normalize();
        DispatchResult::dirty()
    }

    /// Replace the whole document (file open). Marks, pending input and visual state are
    /// dropped; the previous document stays reachable through undo.
    pub fn replace_entire_buffer(&mut self, text: &str) -> DispatchResult {
        self.snapshot();
        self.state.buffer.replace_all(text);
        self.state.marks.clear();
        self.state.mode = Mode::Normal;
        self.state.last_visual = None;
        self.state.command_line.clear();
        self.insert = None;
        self.pending_paste = None;
        self.sticky_col = None;
        self.translator.reset();
        debug!(target: "actions.dispatch", chars = self.state.buffer.len_chars(), "buffer_replaced");
        DispatchResult {
            dirty: true,
            buffer_replaced: true,
            ..DispatchResult::default()
        }
    }

    pub fn registers(&self) -> &RegisterBank {
        &self.state.registers
    }

    pub fn registers_mut(&mut self) -> &mut RegisterBank {
        &mut self.state.registers
    }

    pub fn marks(&self) -> &MarkTable {
        &self.state.marks
    }

    pub fn marks_mut(&mut self) -> &mut MarkTable {
        &mut self.state.marks
    }

    /// Attach (or detach) the system clipboard collaborator.
    pub fn set_clipboard(&mut self, clipboard: Option<Box<dyn Clipboard>>) {
        self.clipboard = clipboard;
        self.pending_paste = None;
    }

    pub fn undo_depth(&self) -> usize {
        self.state.undo.undo_depth()
    }

    pub fn redo_depth(&self) -> usize {
        self.state.undo.redo_depth()
    }

    fn execute(&mut self, action: Action) -> Result<(), EditError> {
        match action {
            Action::Motion { motion, count } => self.move_cursor(motion, count),
            Action::Operator {
                op,
                target,
                count,
                register,
            } => self.apply_operator(op, target, count, register),
            Action::Insert { entry, count } => {
                self.begin_insert(entry, count);
                Ok(())
            }
            Action::Replace { ch, count } => self.replace_chars(ch, count),
            Action::ToggleCaseChar { count } => self.toggle_case_chars(count),
            Action::Join { count, spaces } => self.join(count, spaces),
            Action::Paste {
                before,
                count,
                register,
            } => self.paste(before, count, register),
            Action::Undo { count } => self.undo_times(count),
            Action::Redo { count } => self.redo_times(count),
            Action::Repeat { count } => self.repeat_last(count),
            Action::SetMark(name) => {
                let at = self.state.buffer.cursor();
                self.state.marks.set(name, at)?;
                Ok(())
            }
            Action::StartRecording(name) => self.start_recording(name),
            Action::StopRecording => {
                self.stop_recording();
                Ok(())
            }
            Action::PlayMacro { name, count } => self.play_macro(name, count),
            Action::EnterVisual { linewise } => {
                self.enter_visual(linewise);
                Ok(())
            }
            Action::Visual { action, count } => self.apply_visual(action, count),
            Action::ExitVisual => {
                self.exit_visual();
                Ok(())
            }
            Action::CommandLineStart => {
                self.begin_command_line("");
                Ok(())
            }
            Action::InsertKey(key) => {
                self.insert_key(key);
                Ok(())
            }
            Action::CommandKey(key) => self.command_key(key),
        }
    }

    fn report(&mut self, err: &EditError) {
        debug!(target: "actions.dispatch", error = %err, mode = %self.state.mode, "soft_failure");
        if !err.is_silent() {
            self.state.set_status(err.to_string());
        }
    }

    /// Re-establish the cursor and selection conventions of the current mode.
    fn normalize(&mut self) {
        match self.state.mode {
            Mode::Normal | Mode::CommandLine => {
                let buf = &mut self.state.buffer;
                let at = text_motion::normal_clamp(buf, buf.cursor());
                buf.set_cursor(at);
                buf.collapse_selection();
            }
            Mode::Visual | Mode::VisualLine => {
                let buf = &mut self.state.buffer;
                let at = text_motion::normal_clamp(buf, buf.cursor());
                buf.set_cursor(at);
                self.sync_visual_selection();
            }
            Mode::Insert => self.state.buffer.collapse_selection(),
        }
    }

    fn fingerprint(&self) -> Fingerprint {
        Fingerprint {
            revision: self.revision,
            cursor: self.state.buffer.cursor(),
            selection: self.state.buffer.selection(),
            mode: self.state.mode,
            command_len: self.state.command_line.buffer().len(),
            pending_len: self.translator.pending_display().len(),
        }
    }

    /// Undo checkpoint before a mutation.
    fn snapshot(&mut self) {
        self.state.push_snapshot();
        self.revision += 1;
    }

    /// Mark a mutation that belongs to an already checkpointed change (insert-mode typing).
    fn touch(&mut self) {
        self.revision += 1;
    }

    fn clipboard_mut(&mut self) -> Option<&mut (dyn Clipboard + 'static)> {
        if !self.state.options.clipboard_enabled {
            return None;
        }
        self.clipboard.as_deref_mut()
    }

    fn clipboard_ready(&self) -> bool {
        self.state.options.clipboard_enabled && self.clipboard.is_some()
    }

    /// Store into a register, mirroring `*`/`+` to the clipboard.
    fn write_register(
        &mut self,
        register: Option<char>,
        text: &str,
        kind: WriteKind,
    ) -> Result<(), EditError> {
        let outcome = self.state.registers.write(register, text, kind)?;
        if let WriteOutcome::Clipboard(text) = outcome
            && let Some(clipboard) = self.clipboard_mut()
        {
            clipboard.write(&text);
            trace!(target: "actions.clipboard", chars = text.chars().count(), "clipboard_write");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn dirty_tracks_visible_changes_only() {
        let mut ed = Editor::from_text("abc\n");
        assert!(ed.dispatch_keys("l").dirty);
        let r = ed.dispatch_keys("2");
        assert!(r.dirty, "pending count is visible");
        assert!(!ed.dispatch_keys("<Esc><Esc>").failed);
        let r = ed.dispatch_keys("h");
        assert!(r.dirty);
        let r = ed.dispatch_keys("h");
        assert!(r.failed);
        assert_eq!(ed.status(), None, "blocked motions are silent");
    }

    #[test]
    fn replace_entire_buffer_resets_transient_state() {
        let mut ed = Editor::from_text("one\ntwo\n");
        ed.dispatch_keys("ma\"a2");
        let r = ed.replace_entire_buffer("fresh\n");
        assert!(r.buffer_replaced);
        assert_eq!(ed.buffer_text(), "fresh\n");
        assert_eq!(ed.pending_display(), "");
        assert!(ed.marks().is_empty());
        assert_eq!(ed.cursor(), 0);
        ed.dispatch_keys("u");
        assert_eq!(ed.buffer_text(), "one\ntwo\n");
    }

    #[test]
    fn insert_at_cursor_is_one_undo_step() {
        let mut ed = Editor::from_text("ac");
        ed.dispatch_keys("l");
        ed.insert_at_cursor("b");
        assert_eq!(ed.buffer_text(), "abc");
        assert_eq!(ed.undo_depth(), 1);
        ed.dispatch_keys("u");
        assert_eq!(ed.buffer_text(), "ac");
    }

    #[test]
    fn soft_errors_set_status() {
        let mut ed = Editor::from_text("abc");
        let r = ed.dispatch_keys("`z");
        assert!(r.failed);
        assert_eq!(ed.status(), Some("E20: Mark not set"));
        assert_eq!(ed.mode(), Mode::Normal);
    }
}
