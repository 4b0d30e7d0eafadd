//! Dot-repeat.
//!
//! Every mutating command leaves a [`RepeatCommand`] in `Editor::last_change`. `.` replays it
//! through the same handlers that ran it the first time; a count given to `.` replaces the
//! recorded one. Insert-family commands re-type their recorded text instead of entering an
//! interactive session.

use super::Editor;
use crate::span_resolver::{self, Span};
use crate::{EditError, InsertEntry, OperatorKind, OperatorTarget};
use core_state::Mode;
use tracing::{debug, trace};

/// Shape of a visual selection, replayed relative to the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum VisualExtent {
    /// `n` whole lines.
    Lines(usize),
    /// Charwise: `lines` extra lines; `end` is the length when `lines == 0`, otherwise the
    /// exclusive end column on the last line.
    Chars { lines: usize, end: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum RepeatCommand {
    Insert {
        entry: InsertEntry,
        count: usize,
        text: String,
    },
    Operator {
        op: OperatorKind,
        target: OperatorTarget,
        count: Option<usize>,
        register: Option<char>,
        inserted: Option<String>,
    },
    Replace {
        ch: char,
        count: usize,
    },
    ToggleCase {
        count: usize,
    },
    Join {
        count: usize,
        spaces: bool,
    },
    Paste {
        before: bool,
        count: usize,
        register: Option<char>,
    },
    Visual {
        op: OperatorKind,
        extent: VisualExtent,
        register: Option<char>,
        units: usize,
        inserted: Option<String>,
    },
}

impl RepeatCommand {
    /// Attach the text typed by the insert session a change opened.
    pub(super) fn with_inserted(self, text: String) -> Self {
        match self {
            RepeatCommand::Operator {
                op,
                target,
                count,
                register,
                ..
            } => RepeatCommand::Operator {
                op,
                target,
                count,
                register,
                inserted: Some(text),
            },
            RepeatCommand::Visual {
                op,
                extent,
                register,
                units,
                ..
            } => RepeatCommand::Visual {
                op,
                extent,
                register,
                units,
                inserted: Some(text),
            },
            other => other,
        }
    }
}

impl Editor {
    pub(super) fn repeat_last(&mut self, count: Option<usize>) -> Result<(), EditError> {
        let Some(command) = self.last_change.clone() else {
            trace!(target: "actions.repeat", "nothing_to_repeat");
            return Ok(());
        };
        debug!(target: "actions.repeat", ?command, ?count, "repeat");
        match command {
            RepeatCommand::Insert {
                entry,
                count: recorded,
                text,
            } => {
                self.begin_insert(entry, count.unwrap_or(recorded));
                self.type_text(&text);
                self.finish_insert();
                Ok(())
            }
            RepeatCommand::Operator {
                op,
                target,
                count: recorded,
                register,
                inserted,
            } => {
                self.apply_operator(op, target, count.or(recorded), register)?;
                self.complete_change(inserted.as_deref());
                Ok(())
            }
            RepeatCommand::Replace { ch, count: recorded } => {
                self.replace_chars(ch, count.unwrap_or(recorded))
            }
            RepeatCommand::ToggleCase { count: recorded } => {
                self.toggle_case_chars(count.unwrap_or(recorded))
            }
            RepeatCommand::Join {
                count: recorded,
                spaces,
            } => self.join(count.unwrap_or(recorded), spaces),
            RepeatCommand::Paste {
                before,
                count: recorded,
                register,
            } => self.paste(before, count.unwrap_or(recorded), register),
            RepeatCommand::Visual {
                op,
                extent,
                register,
                units,
                inserted,
            } => {
                let span = self.extent_span(extent);
                let record = RepeatCommand::Visual {
                    op,
                    extent,
                    register,
                    units,
                    inserted: None,
                };
                self.apply_span(op, span, register, units, Some(record))?;
                self.complete_change(inserted.as_deref());
                Ok(())
            }
        }
    }

    /// Finish the insert session a replayed change opened by re-typing its text.
    fn complete_change(&mut self, inserted: Option<&str>) {
        if self.state.mode == Mode::Insert {
            self.type_text(inserted.unwrap_or_default());
            self.finish_insert();
        }
    }

    /// Region of the same shape as a recorded selection, starting at the cursor.
    fn extent_span(&self, extent: VisualExtent) -> Span {
        let buf = &self.state.buffer;
        let at = buf.cursor();
        let line = buf.line_of(at);
        match extent {
            VisualExtent::Lines(n) => {
                let last = line.saturating_add(n.saturating_sub(1)).min(buf.last_line());
                span_resolver::line_span(buf, line, last)
            }
            VisualExtent::Chars { lines: 0, end } => {
                Span::chars(at, at.saturating_add(end).min(buf.len_chars()))
            }
            VisualExtent::Chars { lines, end } => {
                let last = line.saturating_add(lines).min(buf.last_line());
                let stop = (buf.line_start(last) + end).min(buf.line_end_with_newline(last));
                Span::chars(at, stop.max(at))
            }
        }
    }

    /// Shape of `span` for a later [`VisualExtent`] replay.
    pub(super) fn visual_extent(&self, span: Span) -> VisualExtent {
        let buf = &self.state.buffer;
        let (first, last) = self.span_lines(span);
        if span.linewise {
            return VisualExtent::Lines(last - first + 1);
        }
        if first == last {
            VisualExtent::Chars {
                lines: 0,
                end: span.end - span.start,
            }
        } else {
            VisualExtent::Chars {
                lines: last - first,
                end: span.end - buf.line_start(last),
            }
        }
    }
}
