//! Insert sessions (Normal <-> Insert).
//!
//! An insert session starts with one undo snapshot and collects every char typed until
//! `<Esc>`. On exit the typed text is repeated for a count (`3ihi<Esc>`), the cursor retreats
//! onto the last typed char, and the session becomes the dot-repeat command. Arrow keys
//! restart the session in place, so only text typed after the last arrow is repeated.

use super::Editor;
use super::repeat::RepeatCommand;
use crate::{InsertEntry, InsertKey, span_resolver};
use core_state::Mode;
use core_text::{grapheme, motion};
use tracing::trace;

#[derive(Debug, Clone)]
pub(super) struct InsertSession {
    entry: InsertEntry,
    count: usize,
    typed: String,
    /// Operator that opened the session (`c`), completed with the typed text on exit.
    change: Option<RepeatCommand>,
}

impl Editor {
    /// Position the cursor for `entry` and open a session.
    pub(super) fn begin_insert(&mut self, entry: InsertEntry, count: usize) {
        self.snapshot();
        let buf = &mut self.state.buffer;
        let at = buf.cursor();
        let line = buf.line_of(at);
        match entry {
            InsertEntry::Insert => {}
            InsertEntry::Append => {
                if !matches!(buf.char_at(at), None | Some('\n')) {
                    let to = span_resolver::inclusive_end(buf, at, false);
                    buf.set_cursor(to);
                }
            }
            InsertEntry::InsertLineStart => {
                let to = buf.first_non_blank(line);
                buf.set_cursor(to);
            }
            InsertEntry::AppendLineEnd => {
                let to = buf.line_end(line);
                buf.set_cursor(to);
            }
            InsertEntry::OpenBelow => {
                let end = buf.line_end(line);
                buf.insert(end, "\n");
                buf.set_cursor(end + 1);
            }
            InsertEntry::OpenAbove => {
                let start = buf.line_start(line);
                buf.insert(start, "\n");
                buf.set_cursor(start);
            }
        }
        self.open_session(entry, count, None);
    }

    /// Enter Insert mode without moving the cursor. The caller has already snapshotted.
    pub(super) fn open_session(
        &mut self,
        entry: InsertEntry,
        count: usize,
        change: Option<RepeatCommand>,
    ) {
        self.state.mode = Mode::Insert;
        self.sticky_col = None;
        self.insert = Some(InsertSession {
            entry,
            count: count.max(1),
            typed: String::new(),
            change,
        });
        trace!(target: "actions.dispatch", ?entry, count, "insert_begin");
    }

    pub(super) fn insert_key(&mut self, key: InsertKey) {
        match key {
            InsertKey::Char(c) => {
                let mut tmp = [0u8; 4];
                self.type_text(c.encode_utf8(&mut tmp));
            }
            InsertKey::Newline => self.type_text("\n"),
            InsertKey::Backspace => self.backspace(),
            InsertKey::Delete => {
                let at = self.state.buffer.cursor();
                if at < self.state.buffer.len_chars() {
                    self.state.buffer.remove(at, at + 1);
                    self.touch();
                }
            }
            InsertKey::Left | InsertKey::Right | InsertKey::Up | InsertKey::Down => {
                self.insert_arrow(key);
            }
            InsertKey::Exit => self.finish_insert(),
        }
    }

    /// Type `text` at the cursor as part of the running session.
    pub(super) fn type_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let buf = &mut self.state.buffer;
        let at = buf.cursor();
        let n = buf.insert(at, text);
        buf.set_cursor(at + n);
        if let Some(session) = &mut self.insert {
            session.typed.push_str(text);
        }
        self.touch();
    }

    fn backspace(&mut self) {
        let buf = &mut self.state.buffer;
        let at = buf.cursor();
        if at == 0 {
            return;
        }
        let from = match buf.char_at(at - 1) {
            Some('\n') => at - 1,
            _ => {
                let line = buf.line_of(at);
                let start = buf.line_start(line);
                start + grapheme::prev_boundary(&buf.line_text(line), at - start)
            }
        };
        let removed = buf.remove(from, at);
        buf.set_cursor(from);
        if let Some(session) = &mut self.insert {
            if session.typed.ends_with(removed.as_str()) {
                let keep = session.typed.len() - removed.len();
                session.typed.truncate(keep);
            } else {
                session.typed.clear();
            }
        }
        self.touch();
    }

    fn insert_arrow(&mut self, key: InsertKey) {
        let buf = &self.state.buffer;
        let at = buf.cursor();
        let want = motion::display_column(buf, at);
        let to = match key {
            InsertKey::Left => motion::left(buf, at),
            InsertKey::Right => motion::right(buf, at, true),
            InsertKey::Up => motion::vertical(buf, at, -1, want),
            _ => motion::vertical(buf, at, 1, want),
        };
        if let Some(to) = to {
            self.state.buffer.set_cursor(to);
        }
        if let Some(session) = &mut self.insert {
            session.entry = InsertEntry::Insert;
            session.count = 1;
            session.typed.clear();
            session.change = None;
        }
    }

    /// Leave Insert mode: apply the count, retreat the cursor, record dot-repeat.
    pub(super) fn finish_insert(&mut self) {
        self.state.mode = Mode::Normal;
        let Some(session) = self.insert.take() else {
            return;
        };
        if session.count > 1 && !session.typed.is_empty() {
            let unit = match session.entry {
                InsertEntry::OpenBelow | InsertEntry::OpenAbove => format!("\n{}", session.typed),
                _ => session.typed.clone(),
            };
            let more = unit.repeat(session.count - 1);
            let buf = &mut self.state.buffer;
            let at = buf.cursor();
            let n = buf.insert(at, &more);
            buf.set_cursor(at + n);
            self.touch();
        }
        let buf = &mut self.state.buffer;
        if let Some(to) = motion::left(buf, buf.cursor()) {
            buf.set_cursor(to);
        }
        trace!(target: "actions.dispatch", chars = session.typed.chars().count(), count = session.count, "insert_end");
        self.last_change = Some(match session.change {
            Some(change) => change.with_inserted(session.typed),
            None => RepeatCommand::Insert {
                entry: session.entry,
                count: session.count,
                text: session.typed,
            },
        });
    }
}
