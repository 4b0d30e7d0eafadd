//! Visual and VisualLine modes.
//!
//! The selection is derived from `visual_anchor` and the cursor after every key: charwise it
//! covers both ends inclusively, linewise it covers whole lines. Operators leave visual mode
//! first and then run through the shared operator engine with the selection as their span.

use super::Editor;
use super::repeat::RepeatCommand;
use crate::span_resolver::{self, Span};
use crate::{EditError, OperatorKind, VisualAction, text_object};
use core_state::{Mode, VisualMarks, WriteKind};
use tracing::trace;

impl Editor {
    pub(super) fn enter_visual(&mut self, linewise: bool) {
        self.state.visual_anchor = self.state.buffer.cursor();
        self.state.mode = if linewise {
            Mode::VisualLine
        } else {
            Mode::Visual
        };
        trace!(target: "actions.dispatch", anchor = self.state.visual_anchor, linewise, "visual_enter");
    }

    /// Back to Normal, remembering the selection for `'<`/`'>` and `gv`-style ranges.
    pub(super) fn exit_visual(&mut self) {
        if !self.state.mode.is_visual() {
            return;
        }
        let span = self.visual_span();
        self.state.last_visual = Some(VisualMarks {
            start: span.start,
            end: span.end.saturating_sub(1).max(span.start),
            linewise: span.linewise,
        });
        self.state.mode = Mode::Normal;
        self.state.buffer.collapse_selection();
        trace!(target: "actions.dispatch", start = span.start, end = span.end, "visual_exit");
    }

    pub(super) fn sync_visual_selection(&mut self) {
        let span = self.visual_span();
        self.state.buffer.set_selection(span.start, span.end);
    }

    /// Current selection as an operator span.
    fn visual_span(&self) -> Span {
        let buf = &self.state.buffer;
        let anchor = self.state.visual_anchor.min(buf.len_chars());
        let cursor = buf.cursor();
        let (lo, hi) = if anchor <= cursor {
            (anchor, cursor)
        } else {
            (cursor, anchor)
        };
        if self.state.mode == Mode::VisualLine {
            span_resolver::line_span(buf, buf.line_of(lo), buf.line_of(hi))
        } else {
            Span::chars(lo, span_resolver::inclusive_end(buf, hi, true))
        }
    }

    pub(super) fn apply_visual(
        &mut self,
        action: VisualAction,
        count: Option<usize>,
    ) -> Result<(), EditError> {
        match action {
            VisualAction::Operator { op, register } => {
                let span = self.visual_span();
                self.visual_operator(op, span, register, count)
            }
            VisualAction::LineOperator { op, register } => {
                let span = self.visual_span();
                let (first, last) = self.span_lines(span);
                let span = span_resolver::line_span(&self.state.buffer, first, last);
                self.visual_operator(op, span, register, count)
            }
            VisualAction::SwapEnds => {
                let at = self.state.buffer.cursor();
                let anchor = self.state.visual_anchor;
                self.state.buffer.set_cursor(anchor);
                self.state.visual_anchor = at;
                Ok(())
            }
            VisualAction::Switch { linewise } => {
                if (self.state.mode == Mode::VisualLine) == linewise {
                    self.exit_visual();
                } else {
                    self.state.mode = if linewise {
                        Mode::VisualLine
                    } else {
                        Mode::Visual
                    };
                }
                Ok(())
            }
            VisualAction::Replace(ch) => {
                let span = self.visual_span();
                self.exit_visual();
                let text = self.state.buffer.slice(span.start, span.end);
                let mapped: String = text
                    .chars()
                    .map(|c| if c == '\n' { c } else { ch })
                    .collect();
                if mapped != text {
                    self.snapshot();
                    let buf = &mut self.state.buffer;
                    buf.remove(span.start, span.end);
                    buf.insert(span.start, &mapped);
                }
                self.state.buffer.set_cursor(span.start);
                Ok(())
            }
            VisualAction::Join { spaces } => {
                let span = self.visual_span();
                let (first, last) = self.span_lines(span);
                self.exit_visual();
                let start = self.state.buffer.line_start(first);
                self.state.buffer.set_cursor(start);
                self.join((last - first + 1).max(2), spaces)
            }
            VisualAction::Paste { register } => self.visual_paste(register, count.unwrap_or(1)),
            VisualAction::Object(scope, kind) => {
                let buf = &self.state.buffer;
                let found = text_object::resolve(buf, buf.cursor(), scope, kind, count.unwrap_or(1))
                    .filter(|o| o.end > o.start)
                    .ok_or(EditError::NoTextObject)?;
                self.state.visual_anchor = found.start;
                self.state.buffer.set_cursor(found.end - 1);
                if found.linewise {
                    self.state.mode = Mode::VisualLine;
                }
                Ok(())
            }
            VisualAction::CommandLine => {
                self.exit_visual();
                self.begin_command_line("'<,'>");
                Ok(())
            }
        }
    }

    /// Leave visual mode and run `op` over `span`. For indent operators the count is the
    /// number of shift units.
    fn visual_operator(
        &mut self,
        op: OperatorKind,
        span: Span,
        register: Option<char>,
        count: Option<usize>,
    ) -> Result<(), EditError> {
        let units = count.unwrap_or(1).max(1);
        let record = RepeatCommand::Visual {
            op,
            extent: self.visual_extent(span),
            register,
            units,
            inserted: None,
        };
        self.exit_visual();
        self.state.buffer.set_cursor(span.start);
        self.apply_span(op, span, register, units, Some(record))
    }

    /// Replace the selection with register content. The replaced text goes to the unnamed
    /// register afterwards, so the pasted register stays intact for the next paste.
    fn visual_paste(&mut self, register: Option<char>, count: usize) -> Result<(), EditError> {
        let name = register.unwrap_or('"');
        let content = self
            .state
            .registers
            .read(register)
            .ok_or(EditError::EmptyRegister(name))?;
        let span = self.visual_span();
        let (first, last) = self.span_lines(span);
        self.exit_visual();

        let body = content.text.repeat(count.max(1));
        let buf = &self.state.buffer;
        let (start, end, insert) = if span.linewise {
            let insert = body.strip_suffix('\n').unwrap_or(&body).to_string();
            (buf.line_start(first), buf.line_end(last), insert)
        } else if content.linewise {
            (span.start, span.end, format!("\n{body}"))
        } else {
            (span.start, span.end, body)
        };
        let mut removed = buf.slice(span.start, span.end);
        if span.linewise && !removed.ends_with('\n') {
            removed.push('\n');
        }

        self.snapshot();
        let buf = &mut self.state.buffer;
        buf.remove(start, end);
        let n = buf.insert(start, &insert);
        let at = if span.linewise || content.linewise {
            let line = buf.line_of(start) + usize::from(!span.linewise);
            buf.first_non_blank(line)
        } else if insert.contains('\n') {
            start
        } else {
            start + n.saturating_sub(1)
        };
        buf.set_cursor(at);
        self.write_register(None, &removed, WriteKind::Delete)?;
        trace!(target: "actions.operator", register = %name, start, end, "visual_paste");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::Editor;
    use core_state::Mode;
    use core_text::Selection;
    use pretty_assertions::assert_eq;

    fn run(text: &str, keys: &str) -> Editor {
        let mut ed = Editor::from_text(text);
        ed.dispatch_keys(keys);
        ed
    }

    #[test]
    fn charwise_selection_is_inclusive() {
        let ed = run("hello world\n", "vll");
        assert_eq!(ed.mode(), Mode::Visual);
        assert_eq!(ed.selection(), Selection { start: 0, end: 3 });
        let ed = run("hello world\n", "wvb");
        assert_eq!(ed.selection(), Selection { start: 0, end: 7 });
    }

    #[test]
    fn linewise_selection_covers_lines() {
        let ed = run("ab\ncd\nef\n", "lVj");
        assert_eq!(ed.selection(), Selection { start: 0, end: 6 });
        let ed = run("ab\ncd\nef\n", "lVj<Esc>");
        assert_eq!(ed.mode(), Mode::Normal);
        assert_eq!(ed.selection(), Selection::collapsed(ed.cursor()));
    }

    #[test]
    fn visual_operators() {
        assert_eq!(run("hello world\n", "vex").buffer_text(), " world\n");
        let ed = run("hello world\n", "wvey");
        assert_eq!(ed.registers().get('0'), Some("world"));
        assert_eq!(ed.cursor(), 6);
        assert_eq!(run("a\nb\nc\n", "Vjd").buffer_text(), "c\n");
        assert_eq!(run("ab\ncd\n", "vD").buffer_text(), "cd\n");
        assert_eq!(run("abc\n", "vlU").buffer_text(), "ABc\n");
        assert_eq!(run("a\nb\n", "Vj2>").buffer_text(), "    a\n    b\n");
        let ed = run("foo bar\n", "vecX<Esc>");
        assert_eq!(ed.buffer_text(), "X bar\n");
    }

    #[test]
    fn swap_ends_and_switch() {
        let mut ed = run("abcdef\n", "lvll");
        ed.dispatch_keys("o");
        assert_eq!(ed.cursor(), 1);
        ed.dispatch_keys("h");
        assert_eq!(ed.selection(), Selection { start: 0, end: 4 });
        ed.dispatch_keys("V");
        assert_eq!(ed.mode(), Mode::VisualLine);
        ed.dispatch_keys("V");
        assert_eq!(ed.mode(), Mode::Normal);
    }

    #[test]
    fn replace_join_and_paste() {
        assert_eq!(run("abc\nde\n", "vj$rx").buffer_text(), "xxx\nxx\n");
        assert_eq!(run("a\nb\nc\n", "VjJ").buffer_text(), "a b\nc\n");
        let ed = run("one two\n", "yiwwviwp");
        assert_eq!(ed.buffer_text(), "one one\n");
        assert_eq!(ed.registers().get('"'), Some("two"));
        let ed = run("x\ny\n", "yyjVp");
        assert_eq!(ed.buffer_text(), "x\nx\n");
    }

    #[test]
    fn text_object_extends_selection() {
        let ed = run("f(a, b)\n", "fav");
        assert_eq!(ed.selection(), Selection { start: 2, end: 3 });
        let mut ed = run("f(a, b)\n", "favi(");
        assert_eq!(ed.selection(), Selection { start: 2, end: 6 });
        ed.dispatch_keys("d");
        assert_eq!(ed.buffer_text(), "f()\n");
        let ed = run("a\nb\n\nc\n", "vip");
        assert_eq!(ed.mode(), Mode::VisualLine);
        assert_eq!(ed.selection(), Selection { start: 0, end: 4 });
    }

    #[test]
    fn marks_of_last_selection() {
        let mut ed = run("one\ntwo\nthree\n", "jVj<Esc>gg");
        ed.dispatch_keys("`>");
        assert_eq!(ed.cursor(), 12);
        ed.dispatch_keys("`<");
        assert_eq!(ed.cursor(), 4);
    }
}
