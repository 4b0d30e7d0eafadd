//! Editor state container and the stores hanging off it.
//!
//! [`EditorState`] is constructed once per editing session and owned by the dispatcher in
//! `core-actions`; every handler receives it explicitly. Nothing here interprets keys.

use std::fmt;
use std::time::{Duration, Instant};

use core_text::Buffer;
use thiserror::Error;

pub mod macros;
pub mod marks;
pub mod registers;
pub mod undo;

pub use macros::MacroStore;
pub use marks::MarkTable;
pub use registers::{RegisterBank, RegisterContent, WriteKind, WriteOutcome, is_valid_register};
pub use undo::{Snapshot, UNDO_LEVELS_DEFAULT, UndoEngine};

/// Errors raised by the state stores.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("E354: Invalid register name: '{0}'")]
    InvalidRegister(char),
    #[error("E191: Argument must be a letter: '{0}'")]
    InvalidMark(char),
}

/// Current editor mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Normal,
    Insert,
    /// Charwise visual selection.
    Visual,
    /// Linewise visual selection.
    VisualLine,
    CommandLine,
}

impl Mode {
    pub fn is_visual(self) -> bool {
        matches!(self, Mode::Visual | Mode::VisualLine)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Mode::Normal => "NORMAL",
            Mode::Insert => "INSERT",
            Mode::Visual => "VISUAL",
            Mode::VisualLine => "VISUAL LINE",
            Mode::CommandLine => "COMMAND",
        })
    }
}

/// Runtime knobs of the engine. Built from configuration by `core-config`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOptions {
    pub undo_levels: usize,
    /// Spaces per indent unit.
    pub shift_width: usize,
    pub max_count: usize,
    /// Maximum macro playback nesting.
    pub macro_depth: usize,
    pub status_ttl: Duration,
    pub clipboard_enabled: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            undo_levels: UNDO_LEVELS_DEFAULT,
            shift_width: 2,
            max_count: 999_999,
            macro_depth: 64,
            status_ttl: Duration::from_millis(3000),
            clipboard_enabled: true,
        }
    }
}

/// Command-line input. Stores the raw line including the leading ':' while active.
#[derive(Debug, Default, Clone)]
pub struct CommandLineState {
    buf: String,
}

impl CommandLineState {
    pub fn is_active(&self) -> bool {
        self.buf.starts_with(':')
    }
    /// Raw line including ':'.
    pub fn buffer(&self) -> &str {
        &self.buf
    }
    /// Typed command without the ':' prompt.
    pub fn content(&self) -> &str {
        self.buf.strip_prefix(':').unwrap_or(&self.buf)
    }
    pub fn clear(&mut self) {
        self.buf.clear();
    }
    /// Begin a new command, optionally pre-filled (visual mode inserts `'<,'>`).
    pub fn begin(&mut self, prefill: &str) {
        self.buf.clear();
        self.buf.push(':');
        self.buf.push_str(prefill);
    }
    pub fn push_char(&mut self, ch: char) {
        if self.buf.is_empty() {
            self.buf.push(':');
        }
        self.buf.push(ch);
    }
    /// Remove the last char. Removing the ':' itself deactivates the line; returns false then.
    pub fn backspace(&mut self) -> bool {
        if self.buf.chars().count() > 1 {
            self.buf.pop();
            true
        } else {
            self.buf.clear();
            false
        }
    }
}

/// Status line message with an expiry.
#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub expires_at: Instant,
}

/// Last visual selection, for `'<,'>` ranges and `gv`-style reuse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisualMarks {
    pub start: usize,
    pub end: usize,
    pub linewise: bool,
}

#[derive(Debug)]
pub struct EditorState {
    pub buffer: Buffer,
    pub mode: Mode,
    pub undo: UndoEngine,
    pub registers: RegisterBank,
    pub marks: MarkTable,
    pub macros: MacroStore,
    pub command_line: CommandLineState,
    pub options: EngineOptions,
    /// Fixed end of the visual selection; the cursor is the moving end.
    pub visual_anchor: usize,
    pub last_visual: Option<VisualMarks>,
    status: Option<StatusMessage>,
}

impl EditorState {
    pub fn new(buffer: Buffer, options: EngineOptions) -> Self {
        Self {
            buffer,
            mode: Mode::Normal,
            undo: UndoEngine::new(options.undo_levels),
            registers: RegisterBank::new(),
            marks: MarkTable::new(),
            macros: MacroStore::new(),
            command_line: CommandLineState::default(),
            visual_anchor: 0,
            last_visual: None,
            status: None,
            options,
        }
    }

    /// Snapshot the live buffer before a mutation.
    pub fn push_snapshot(&mut self) {
        self.undo.push_snapshot(&self.buffer);
    }

    pub fn undo(&mut self) -> bool {
        self.undo.undo(&mut self.buffer)
    }

    pub fn redo(&mut self) -> bool {
        self.undo.redo(&mut self.buffer)
    }

    /// Set a status message expiring after the configured TTL.
    pub fn set_status<S: Into<String>>(&mut self, msg: S) {
        self.status = Some(StatusMessage {
            text: msg.into(),
            expires_at: Instant::now() + self.options.status_ttl,
        });
    }

    pub fn clear_status(&mut self) {
        self.status = None;
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_ref().map(|m| m.text.as_str())
    }

    /// Drop the status message once expired; returns true if it was cleared.
    pub fn tick_status(&mut self) -> bool {
        if let Some(m) = &self.status
            && Instant::now() >= m.expires_at
        {
            self.status = None;
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_undo_redo_through_state() {
        let mut st = EditorState::new(Buffer::from("abc"), EngineOptions::default());
        st.push_snapshot();
        st.buffer.remove(0, 1);
        assert!(st.undo());
        assert_eq!(st.buffer.text(), "abc");
        assert!(st.redo());
        assert_eq!(st.buffer.text(), "bc");
        assert!(!st.redo());
    }

    #[test]
    fn status_expires_after_ttl() {
        let opts = EngineOptions {
            status_ttl: Duration::ZERO,
            ..EngineOptions::default()
        };
        let mut st = EditorState::new(Buffer::new(), opts);
        st.set_status("E20: Mark not set");
        assert_eq!(st.status(), Some("E20: Mark not set"));
        assert!(st.tick_status());
        assert_eq!(st.status(), None);
    }

    #[test]
    fn command_line_backspace_past_prompt_cancels() {
        let mut cl = CommandLineState::default();
        cl.begin("'<,'>");
        assert_eq!(cl.content(), "'<,'>");
        cl.clear();
        cl.begin("");
        cl.push_char('w');
        assert!(cl.backspace());
        assert!(!cl.backspace());
        assert!(!cl.is_active());
    }

    #[test]
    fn mode_display_names() {
        assert_eq!(Mode::VisualLine.to_string(), "VISUAL LINE");
        assert!(Mode::Visual.is_visual());
        assert!(!Mode::Insert.is_visual());
    }
}
