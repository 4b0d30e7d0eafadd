//! Single-key edits (`r`, `~`, `J`, `gJ`) and paste.
//!
//! Pastes from `*`/`+` with a clipboard attached are asynchronous: the paste is parked under
//! a fresh ticket and completed by [`Editor::resolve_clipboard_read`]. Issuing a second
//! paste replaces the parked one, so a late answer to the first ticket is dropped. An answer
//! arriving outside Normal mode only refreshes the register.

use super::repeat::RepeatCommand;
use super::{DispatchResult, Editor, operator};
use crate::EditError;
use crate::clipboard::PendingPaste;
use crate::span_resolver;
use core_events::ClipboardTicket;
use core_state::{Mode, RegisterContent};
use tracing::{debug, trace};

impl Editor {
    /// `{count}r{ch}`: fails when fewer than `count` chars remain on the line.
    pub(super) fn replace_chars(&mut self, ch: char, count: usize) -> Result<(), EditError> {
        let count = count.max(1);
        let buf = &self.state.buffer;
        let at = buf.cursor();
        let end = buf.line_end(buf.line_of(at));
        if at >= end || at.saturating_add(count) > end {
            return Err(EditError::Blocked);
        }
        self.snapshot();
        let buf = &mut self.state.buffer;
        buf.remove(at, at + count);
        if ch == '\n' {
            buf.insert(at, "\n");
            buf.set_cursor(at + 1);
        } else {
            let with: String = std::iter::repeat_n(ch, count).collect();
            buf.insert(at, &with);
            buf.set_cursor(at + count - 1);
        }
        self.last_change = Some(RepeatCommand::Replace { ch, count });
        Ok(())
    }

    /// `{count}~`: toggle case and advance, stopping at the line end.
    pub(super) fn toggle_case_chars(&mut self, count: usize) -> Result<(), EditError> {
        let buf = &self.state.buffer;
        let at = buf.cursor();
        let end = buf.line_end(buf.line_of(at));
        if at >= end {
            return Ok(());
        }
        let stop = at.saturating_add(count.max(1)).min(end);
        let text = buf.slice(at, stop);
        let mapped = operator::toggle_case(&text);
        self.snapshot();
        let buf = &mut self.state.buffer;
        buf.remove(at, stop);
        let n = buf.insert(at, &mapped);
        buf.set_cursor(at + n);
        self.last_change = Some(RepeatCommand::ToggleCase { count });
        Ok(())
    }

    /// `{count}J` / `{count}gJ`: join `count` lines (at least two).
    pub(super) fn join(&mut self, count: usize, spaces: bool) -> Result<(), EditError> {
        let buf = &self.state.buffer;
        let line = buf.line_of(buf.cursor());
        let last = buf.last_line();
        if line >= last {
            return Err(EditError::CannotJoin);
        }
        let joins = count.saturating_sub(1).max(1).min(last - line);
        self.snapshot();
        let mut at = self.state.buffer.cursor();
        for _ in 0..joins {
            at = self.join_once(line, spaces);
        }
        self.state.buffer.set_cursor(at);
        self.last_change = Some(RepeatCommand::Join { count, spaces });
        Ok(())
    }

    /// Join `line` with the next one; returns the join point. With `spaces` the next line's
    /// indent collapses into one space (none after trailing white space, before `)`, or
    /// around an empty line).
    fn join_once(&mut self, line: usize, spaces: bool) -> usize {
        let buf = &mut self.state.buffer;
        let newline = buf.line_end(line);
        if !spaces {
            buf.remove(newline, newline + 1);
            return newline;
        }
        let mut indent_end = newline + 1;
        while matches!(buf.char_at(indent_end), Some(' ' | '\t')) {
            indent_end += 1;
        }
        let next = buf.char_at(indent_end);
        buf.remove(newline, indent_end);
        let prev = if newline > buf.line_start(line) {
            buf.char_at(newline - 1)
        } else {
            None
        };
        let space = !matches!(next, None | Some('\n' | ')')) && !matches!(prev, None | Some(' ' | '\t'));
        if space {
            buf.insert(newline, " ");
        }
        newline
    }

    /// `p` / `P`.
    pub(super) fn paste(
        &mut self,
        before: bool,
        count: usize,
        register: Option<char>,
    ) -> Result<(), EditError> {
        let name = register.unwrap_or('"');
        if matches!(name, '*' | '+') && self.clipboard_ready() {
            let ticket = self.last_ticket.next();
            self.last_ticket = ticket;
            self.pending_paste = Some(PendingPaste {
                ticket,
                register: name,
                before,
                count,
            });
            if let Some(clipboard) = self.clipboard_mut() {
                clipboard.request_read(ticket);
            }
            trace!(target: "actions.clipboard", ticket = ticket.0, register = %name, "clipboard_read_requested");
            return Ok(());
        }
        let content = self
            .state
            .registers
            .read(register)
            .ok_or(EditError::EmptyRegister(name))?;
        self.put_text(&content, before, count);
        self.last_change = Some(RepeatCommand::Paste {
            before,
            count,
            register,
        });
        Ok(())
    }

    /// Complete a clipboard paste. Answers to any ticket other than the one parked last are
    /// discarded without touching registers or text.
    pub fn resolve_clipboard_read(&mut self, ticket: ClipboardTicket, text: String) -> DispatchResult {
        let pending = match self.pending_paste {
            Some(p) if p.ticket == ticket => p,
            _ => {
                debug!(target: "actions.clipboard", ticket = ticket.0, latest = self.last_ticket.0, "stale_clipboard_read_dropped");
                return DispatchResult::clean();
            }
        };
        self.pending_paste = None;
        let before = self.fingerprint();
        if let Err(err) = self.state.registers.set(pending.register, text.as_str()) {
            debug!(target: "actions.clipboard", error = %err, "clipboard_register_rejected");
        }
        if self.state.mode != Mode::Normal {
            debug!(target: "actions.clipboard", ticket = ticket.0, mode = %self.state.mode, "clipboard_paste_dropped_outside_normal");
            return DispatchResult::clean();
        }
        let failed = if text.is_empty() {
            self.report(&EditError::EmptyRegister(pending.register));
            true
        } else {
            self.put_text(&RegisterContent::new(text), pending.before, pending.count);
            self.last_change = Some(RepeatCommand::Paste {
                before: pending.before,
                count: pending.count,
                register: Some(pending.register),
            });
            false
        };
        trace!(target: "actions.clipboard", ticket = ticket.0, failed, "clipboard_read_resolved");
        self.normalize();
        DispatchResult {
            dirty: failed || before != self.fingerprint(),
            failed,
            ..DispatchResult::default()
        }
    }

    /// Insert register content `count` times relative to the cursor, as one change.
    pub(super) fn put_text(&mut self, content: &RegisterContent, before: bool, count: usize) {
        let text = content.text.repeat(count.max(1));
        self.snapshot();
        let buf = &mut self.state.buffer;
        let at = buf.cursor();
        let line = buf.line_of(at);
        if content.linewise {
            let target_line = if before { line } else { line + 1 };
            if before {
                let start = buf.line_start(line);
                buf.insert(start, &text);
            } else if line == buf.last_line() && !buf.ends_with_newline() {
                let body = text.strip_suffix('\n').unwrap_or(&text);
                let end = buf.len_chars();
                buf.insert(end, &format!("\n{body}"));
            } else {
                let next = buf.line_end_with_newline(line);
                buf.insert(next, &text);
            }
            let to = buf.first_non_blank(target_line);
            buf.set_cursor(to);
        } else {
            let pos = if before || matches!(buf.char_at(at), None | Some('\n')) {
                at
            } else {
                span_resolver::inclusive_end(buf, at, false)
            };
            let n = buf.insert(pos, &text);
            let to = if text.contains('\n') {
                pos
            } else {
                pos + n.saturating_sub(1)
            };
            buf.set_cursor(to);
        }
        debug!(target: "actions.operator", chars = text.chars().count(), linewise = content.linewise, before, "put");
    }
}

#[cfg(test)]
mod tests {
    use crate::Editor;
    use pretty_assertions::assert_eq;

    fn run(text: &str, keys: &str) -> Editor {
        let mut ed = Editor::from_text(text);
        ed.dispatch_keys(keys);
        ed
    }

    #[test]
    fn replace_with_count_and_newline() {
        let ed = run("abcd\n", "2rx");
        assert_eq!(ed.buffer_text(), "xxcd\n");
        assert_eq!(ed.cursor(), 1);
        assert_eq!(run("ab cd\n", "llr<CR>").buffer_text(), "ab\ncd\n");
        let ed = run("ab\n", "5rx");
        assert_eq!(ed.buffer_text(), "ab\n");
        assert_eq!(ed.undo_depth(), 0);
    }

    #[test]
    fn tilde_advances() {
        let ed = run("abc\n", "~~");
        assert_eq!(ed.buffer_text(), "ABc\n");
        assert_eq!(ed.cursor(), 2);
        assert_eq!(run("abc\n", "10~").buffer_text(), "ABC\n");
    }

    #[test]
    fn join_variants() {
        assert_eq!(run("a\n   b\n", "J").buffer_text(), "a b\n");
        assert_eq!(run("a \nb\n", "J").buffer_text(), "a b\n");
        assert_eq!(run("f(\n)\n", "J").buffer_text(), "f()\n");
        assert_eq!(run("a\n  b\n", "gJ").buffer_text(), "a  b\n");
        assert_eq!(run("a\nb\nc\nd\n", "3J").buffer_text(), "a b c\nd\n");
        let ed = run("only\n", "J");
        assert_eq!(ed.status(), Some("cannot join past the last line"));
    }

    #[test]
    fn paste_charwise_and_linewise() {
        assert_eq!(run("ab\n", "xp").buffer_text(), "ba\n");
        assert_eq!(run("one\ntwo\n", "yyjp").buffer_text(), "one\ntwo\none\n");
        assert_eq!(run("one\ntwo", "yyjp").buffer_text(), "one\ntwo\none");
        assert_eq!(run("one\ntwo\n", "jyykP").buffer_text(), "two\none\ntwo\n");
        assert_eq!(run("ab\n", "yl3p").buffer_text(), "aaaab\n");
    }

    #[test]
    fn paste_from_empty_register_fails() {
        let ed = run("ab\n", "\"qp");
        assert_eq!(ed.buffer_text(), "ab\n");
        assert_eq!(ed.status(), Some("E353: Nothing in register q"));
    }

    #[test]
    fn delete_then_paste_round_trips() {
        let ed = run("hello world\n", "dwP");
        assert_eq!(ed.buffer_text(), "hello world\n");
        let ed = run("a\nb\nc\n", "jddP");
        assert_eq!(ed.buffer_text(), "a\nb\nc\n");
    }
}
