//! Operator engine: delete, yank, change, indent and case over a resolved [`Span`].
//!
//! Resolution paths: doubled key (`count` lines from the cursor line), motion (through
//! `span_resolver`), or text object. Every mutating operator takes exactly one undo snapshot;
//! a change shares its snapshot with the insert session it opens.

use super::Editor;
use super::repeat::RepeatCommand;
use crate::span_resolver::{self, Span};
use crate::{EditError, InsertEntry, MotionKind, OperatorKind, OperatorTarget, text_object};
use core_state::WriteKind;
use core_text::class;
use tracing::debug;

/// Swap the case of every char.
pub(super) fn toggle_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_uppercase() {
            out.extend(c.to_lowercase());
        } else {
            out.extend(c.to_uppercase());
        }
    }
    out
}

impl Editor {
    pub(super) fn apply_operator(
        &mut self,
        op: OperatorKind,
        target: OperatorTarget,
        count: Option<usize>,
        register: Option<char>,
    ) -> Result<(), EditError> {
        let span = self.operator_span(op, target, count)?;
        let record = RepeatCommand::Operator {
            op,
            target,
            count,
            register,
            inserted: None,
        };
        self.apply_span(op, span, register, 1, Some(record))
    }

    fn operator_span(
        &mut self,
        op: OperatorKind,
        target: OperatorTarget,
        count: Option<usize>,
    ) -> Result<Span, EditError> {
        let origin = self.state.buffer.cursor();
        match target {
            OperatorTarget::Lines => {
                let buf = &self.state.buffer;
                let first = buf.line_of(origin);
                let n = count.unwrap_or(1).max(1);
                let last = first.saturating_add(n - 1).min(buf.last_line());
                Ok(span_resolver::line_span(buf, first, last))
            }
            OperatorTarget::Object(scope, kind) => {
                let found = text_object::resolve(
                    &self.state.buffer,
                    origin,
                    scope,
                    kind,
                    count.unwrap_or(1),
                )
                .ok_or(EditError::NoTextObject)?;
                Ok(Span {
                    start: found.start,
                    end: found.end,
                    linewise: found.linewise,
                })
            }
            OperatorTarget::Motion(motion) => {
                let word = matches!(motion, MotionKind::WordForward | MotionKind::BigWordForward);
                let buf = &self.state.buffer;
                if op == OperatorKind::Change
                    && word
                    && buf.char_at(origin).is_some_and(|c| !class::is_blank(c))
                {
                    let big = motion == MotionKind::BigWordForward;
                    let end = span_resolver::change_word_end(buf, origin, big, count.unwrap_or(1));
                    return Ok(Span::chars(
                        origin,
                        span_resolver::inclusive_end(buf, end, false),
                    ));
                }
                let to = self.motion_target(motion, count, origin, true)?;
                let class = self.motion_class(motion, count);
                Ok(span_resolver::motion_span(
                    &self.state.buffer,
                    origin,
                    to,
                    class,
                    word,
                ))
            }
        }
    }

    /// Run `op` over `span`. `units` scales indent operators. `record` becomes the dot-repeat
    /// command once the operator succeeds (a change hands it to its insert session).
    pub(super) fn apply_span(
        &mut self,
        op: OperatorKind,
        span: Span,
        register: Option<char>,
        units: usize,
        record: Option<RepeatCommand>,
    ) -> Result<(), EditError> {
        debug!(target: "actions.operator", ?op, start = span.start, end = span.end, linewise = span.linewise, "apply_operator");
        match op {
            OperatorKind::Yank => return self.yank_span(span, register),
            OperatorKind::Change => return self.change_span(span, register, record),
            OperatorKind::Delete => {
                if span.is_empty() {
                    return Ok(());
                }
                self.delete_span(span, register)?;
            }
            OperatorKind::IndentRight | OperatorKind::IndentLeft => {
                let (first, last) = self.span_lines(span);
                self.snapshot();
                self.shift_lines(first, last, units, op == OperatorKind::IndentRight);
                let at = self.state.buffer.first_non_blank(first);
                self.state.buffer.set_cursor(at);
            }
            OperatorKind::ToggleCase | OperatorKind::Lowercase | OperatorKind::Uppercase => {
                self.case_span(op, span);
            }
        }
        self.sticky_col = None;
        if let Some(record) = record {
            self.last_change = Some(record);
        }
        Ok(())
    }

    /// First and last line touched by `span`.
    pub(super) fn span_lines(&self, span: Span) -> (usize, usize) {
        let buf = &self.state.buffer;
        let last_char = span.end.saturating_sub(1).max(span.start);
        (buf.line_of(span.start), buf.line_of(last_char))
    }

    fn yank_span(&mut self, span: Span, register: Option<char>) -> Result<(), EditError> {
        let buf = &self.state.buffer;
        let mut text = buf.slice(span.start, span.end);
        if span.linewise && !text.ends_with('\n') {
            text.push('\n');
        }
        if text.is_empty() {
            return Ok(());
        }
        self.write_register(register, &text, WriteKind::Yank)?;
        let buf = &self.state.buffer;
        let origin = buf.cursor();
        let at = if span.linewise {
            let first = buf.line_of(span.start);
            buf.line_start(first) + buf.column(origin).min(buf.line_len(first))
        } else {
            span.start
        };
        self.state.buffer.set_cursor(at);
        let lines = text.matches('\n').count();
        if span.linewise && lines > 2 {
            self.state.set_status(format!("{lines} lines yanked"));
        }
        Ok(())
    }

    /// Remove `span` into `register` (with its own snapshot). A linewise span on the last
    /// line also takes the newline before it, so no empty line is left behind.
    pub(super) fn delete_span(&mut self, span: Span, register: Option<char>) -> Result<(), EditError> {
        let buf = &self.state.buffer;
        let mut start = span.start;
        let mut text = buf.slice(span.start, span.end);
        if span.linewise && !text.ends_with('\n') {
            text.push('\n');
            start = start.saturating_sub(1);
        }
        self.write_register(register, &text, WriteKind::Delete)?;
        self.snapshot();
        let buf = &mut self.state.buffer;
        buf.remove(start, span.end);
        let at = if span.linewise {
            buf.first_non_blank(buf.line_of(start))
        } else {
            start
        };
        buf.set_cursor(at);
        Ok(())
    }

    fn change_span(
        &mut self,
        span: Span,
        register: Option<char>,
        record: Option<RepeatCommand>,
    ) -> Result<(), EditError> {
        let (start, end, text) = if span.linewise {
            let (first, last) = self.span_lines(span);
            let buf = &self.state.buffer;
            let mut text = buf.slice(span.start, span.end);
            if !text.ends_with('\n') {
                text.push('\n');
            }
            (buf.line_start(first), buf.line_end(last), text)
        } else {
            let text = self.state.buffer.slice(span.start, span.end);
            (span.start, span.end, text)
        };
        if !text.is_empty() {
            self.write_register(register, &text, WriteKind::Delete)?;
        }
        self.snapshot();
        self.state.buffer.remove(start, end);
        self.state.buffer.set_cursor(start);
        self.open_session(InsertEntry::Insert, 1, record);
        Ok(())
    }

    /// Shift lines `first..=last` by `units` indent units. Empty lines are left alone; when
    /// shifting left a tab counts as one unit.
    pub(super) fn shift_lines(&mut self, first: usize, last: usize, units: usize, right: bool) {
        let unit = self.state.options.shift_width.max(1);
        let width = unit.saturating_mul(units.max(1));
        let buf = &mut self.state.buffer;
        for line in first..=last.min(buf.last_line()) {
            if buf.line_len(line) == 0 {
                continue;
            }
            let start = buf.line_start(line);
            if right {
                buf.insert(start, &" ".repeat(width));
                continue;
            }
            let mut cols = 0;
            let mut end = start;
            while cols < width {
                match buf.char_at(end) {
                    Some(' ') => cols += 1,
                    Some('\t') => cols += unit,
                    _ => break,
                }
                end += 1;
            }
            buf.remove(start, end);
        }
        debug!(target: "actions.operator", first, last, width, right, "shift_lines");
    }

    fn case_span(&mut self, op: OperatorKind, span: Span) {
        let buf = &self.state.buffer;
        let origin = buf.cursor();
        let text = buf.slice(span.start, span.end);
        let mapped = match op {
            OperatorKind::Lowercase => text.to_lowercase(),
            OperatorKind::Uppercase => text.to_uppercase(),
            _ => toggle_case(&text),
        };
        if mapped != text {
            self.snapshot();
            let buf = &mut self.state.buffer;
            buf.remove(span.start, span.end);
            buf.insert(span.start, &mapped);
        }
        let at = if span.linewise { origin } else { span.start };
        self.state.buffer.set_cursor(at);
    }
}
