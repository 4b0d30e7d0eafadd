//! Command line editing and execution.
//!
//! `:` opens the line, `<CR>` submits it to [`CommandParser`] and runs the result. Text
//! commands (substitute, delete, yank, shift) run inside the engine and share the operator
//! engine's register and undo handling. File and exit commands are not executed here: they
//! become a [`HostRequest`] on the dispatch result.

use super::command_parser::{Address, CommandParser, ExCommand, LineAddress, LineRange, Substitute};
use super::{Editor, HostRequest};
use crate::span_resolver;
use crate::{CommandKey, EditError, OperatorKind};
use core_state::{Mode, StateError};
use regex::RegexBuilder;
use tracing::debug;

/// Longest register preview shown by `:registers`.
const PREVIEW_CHARS: usize = 40;

impl Editor {
    pub(super) fn begin_command_line(&mut self, prefill: &str) {
        self.state.mode = Mode::CommandLine;
        self.state.command_line.begin(prefill);
    }

    pub(super) fn command_key(&mut self, key: CommandKey) -> Result<(), EditError> {
        match key {
            CommandKey::Char(c) => {
                self.state.command_line.push_char(c);
                Ok(())
            }
            CommandKey::Backspace => {
                if !self.state.command_line.backspace() {
                    self.state.mode = Mode::Normal;
                }
                Ok(())
            }
            CommandKey::Cancel => {
                self.state.command_line.clear();
                self.state.mode = Mode::Normal;
                Ok(())
            }
            CommandKey::Submit => {
                let line = self.state.command_line.content().to_string();
                self.state.command_line.clear();
                self.state.mode = Mode::Normal;
                if !line.trim().is_empty() {
                    self.last_ex = Some(line.clone());
                }
                self.run_ex(&line)
            }
        }
    }

    /// Parse and execute one command line (without the ':' prompt).
    pub(super) fn run_ex(&mut self, line: &str) -> Result<(), EditError> {
        let parsed = CommandParser::parse(line)?;
        debug!(target: "actions.command", line, command = ?parsed.command, "ex_command");
        let range = parsed.range;
        match parsed.command {
            ExCommand::Nop => Ok(()),
            ExCommand::Goto => {
                let (_, last) = self.resolve_range(range, true)?;
                let at = self.state.buffer.first_non_blank(last);
                self.state.buffer.set_cursor(at);
                self.sticky_col = None;
                Ok(())
            }
            ExCommand::Substitute(sub) => {
                let (first, last) = self.resolve_range(range, false)?;
                self.substitute(first, last, &sub)
            }
            ExCommand::Delete { register, count } => {
                let (first, last) = self.counted_range(range, count)?;
                let span = span_resolver::line_span(&self.state.buffer, first, last);
                self.delete_span(span, register)
            }
            ExCommand::Yank { register, count } => {
                let (first, last) = self.counted_range(range, count)?;
                let origin = self.state.buffer.cursor();
                let span = span_resolver::line_span(&self.state.buffer, first, last);
                self.apply_span(OperatorKind::Yank, span, register, 1, None)?;
                self.state.buffer.set_cursor(origin);
                Ok(())
            }
            ExCommand::Shift { right, units } => {
                let (first, last) = self.resolve_range(range, false)?;
                self.snapshot();
                self.shift_lines(first, last, units, right);
                let at = self.state.buffer.first_non_blank(last);
                self.state.buffer.set_cursor(at);
                Ok(())
            }
            ExCommand::Undo => self.undo_times(1),
            ExCommand::Redo => self.redo_times(1),
            ExCommand::Registers => {
                let listing = self.register_listing();
                self.state.set_status(listing);
                Ok(())
            }
            ExCommand::Marks => {
                let listing = self.mark_listing().ok_or(EditError::NoMarks)?;
                self.state.set_status(listing);
                Ok(())
            }
            ExCommand::DeleteMarks { names, all } => {
                if all {
                    self.state.marks.clear();
                    return Ok(());
                }
                for name in expand_mark_names(&names)? {
                    self.state.marks.remove(name);
                }
                Ok(())
            }
            ExCommand::Write { path } => self.request(HostRequest::Write { path }),
            ExCommand::Quit { force } => self.request(HostRequest::Quit { force }),
            ExCommand::WriteQuit { path } => self.request(HostRequest::WriteQuit { path }),
            ExCommand::Edit { path, force } => self.request(HostRequest::Edit { path, force }),
        }
    }

    fn request(&mut self, request: HostRequest) -> Result<(), EditError> {
        debug!(target: "actions.command", ?request, "host_request");
        self.host = Some(request);
        Ok(())
    }

    /// 0-based `(first, last)` lines of `range`; the cursor line when absent. Backwards ranges
    /// are swapped. With `clamp` an address past the end means the last line instead of an
    /// error.
    fn resolve_range(
        &self,
        range: Option<LineRange>,
        clamp: bool,
    ) -> Result<(usize, usize), EditError> {
        let buf = &self.state.buffer;
        match range {
            None => {
                let line = buf.line_of(buf.cursor());
                Ok((line, line))
            }
            Some(LineRange::Whole) => Ok((0, buf.last_line())),
            Some(LineRange::Single(a)) => {
                let line = self.resolve_address(a, clamp)?;
                Ok((line, line))
            }
            Some(LineRange::Pair(a, b)) => {
                let a = self.resolve_address(a, clamp)?;
                let b = self.resolve_address(b, clamp)?;
                Ok((a.min(b), a.max(b)))
            }
        }
    }

    /// `:d`/`:y` with a count start at the last line of the range.
    fn counted_range(
        &self,
        range: Option<LineRange>,
        count: Option<usize>,
    ) -> Result<(usize, usize), EditError> {
        let (first, last) = self.resolve_range(range, false)?;
        Ok(match count {
            Some(n) => (
                last,
                last.saturating_add(n - 1).min(self.state.buffer.last_line()),
            ),
            None => (first, last),
        })
    }

    fn resolve_address(&self, address: LineAddress, clamp: bool) -> Result<usize, EditError> {
        let buf = &self.state.buffer;
        let len = buf.len_chars();
        let base = match address.base {
            Address::Line(n) => n.saturating_sub(1),
            Address::Current => buf.line_of(buf.cursor()),
            Address::Last => buf.last_line(),
            Address::Mark(name) => {
                let offset = match name {
                    '<' => self.state.last_visual.map(|v| v.start),
                    '>' => self.state.last_visual.map(|v| v.end),
                    _ => self.state.marks.get(name, len),
                }
                .ok_or(EditError::MarkNotSet(name))?;
                buf.line_of(offset.min(len))
            }
        };
        let base = isize::try_from(base).unwrap_or(isize::MAX);
        let line = base.saturating_add(address.offset);
        let last = isize::try_from(buf.last_line()).unwrap_or(isize::MAX);
        match line {
            l if (0..=last).contains(&l) => Ok(l as usize),
            l if clamp && l > last => Ok(last as usize),
            _ => Err(EditError::InvalidRange),
        }
    }

    /// `:s` over lines `first..=last` as one undoable change.
    fn substitute(&mut self, first: usize, last: usize, sub: &Substitute) -> Result<(), EditError> {
        let re = RegexBuilder::new(&sub.pattern)
            .case_insensitive(sub.ignore_case)
            .build()
            .map_err(|err| {
                debug!(target: "actions.command", pattern = %sub.pattern, error = %err, "bad_pattern");
                EditError::BadPattern(sub.pattern.clone())
            })?;

        let buf = &self.state.buffer;
        let mut edits = Vec::new();
        let mut matches = 0;
        for line in first..=last {
            let text = buf.line_text(line);
            let found = if sub.global {
                re.find_iter(&text).count()
            } else {
                usize::from(re.is_match(&text))
            };
            if found == 0 {
                continue;
            }
            matches += found;
            let replaced = if sub.global {
                re.replace_all(&text, sub.replacement.as_str())
            } else {
                re.replace(&text, sub.replacement.as_str())
            };
            if replaced != text {
                edits.push((
                    buf.line_start(line),
                    buf.line_end(line),
                    replaced.into_owned(),
                ));
            }
        }
        if matches == 0 {
            return Err(EditError::PatternNotFound(sub.pattern.clone()));
        }

        let lines = edits.len();
        if let Some(&(bottom, _, _)) = edits.last() {
            self.snapshot();
            let buf = &mut self.state.buffer;
            // bottom-up keeps the stored offsets of the remaining edits valid
            for (start, end, text) in edits.iter().rev() {
                buf.remove(*start, *end);
                buf.insert(*start, text);
            }
            let shift: isize = edits[..lines - 1]
                .iter()
                .map(|(s, e, t)| t.chars().count() as isize - (e - s) as isize)
                .sum();
            let at = bottom.saturating_add_signed(shift);
            let line = buf.line_of(at);
            let to = buf.first_non_blank(line);
            buf.set_cursor(to);
        }
        if lines > 2 {
            self.state
                .set_status(format!("{matches} substitutions on {lines} lines"));
        }
        debug!(target: "actions.command", matches, lines, "substitute");
        Ok(())
    }

    fn register_listing(&self) -> String {
        let mut out = String::from("Type Name Content");
        for (name, text) in self.state.registers.entries() {
            let kind = if text.ends_with('\n') { 'l' } else { 'c' };
            let preview: String = text
                .chars()
                .take(PREVIEW_CHARS)
                .map(|c| if c == '\n' { '^' } else { c })
                .collect();
            out.push_str(&format!("\n  {kind}  \"{name}   {preview}"));
        }
        out
    }

    /// `None` when no mark is set.
    fn mark_listing(&self) -> Option<String> {
        if self.state.marks.is_empty() {
            return None;
        }
        let buf = &self.state.buffer;
        let mut out = String::from("mark line  col text");
        for (name, offset) in self.state.marks.iter() {
            let offset = offset.min(buf.len_chars());
            let line = buf.line_of(offset);
            out.push_str(&format!(
                "\n {name} {:>6} {:>4} {}",
                line + 1,
                buf.column(offset),
                buf.line_text(line).trim()
            ));
        }
        Some(out)
    }
}

/// Expand `:delmarks` arguments: single letters and `a-d` style ranges, blanks ignored.
fn expand_mark_names(spec: &str) -> Result<Vec<char>, EditError> {
    let chars: Vec<char> = spec.chars().filter(|c| !c.is_whitespace()).collect();
    let mut out = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if !c.is_ascii_lowercase() {
            return Err(StateError::InvalidMark(c).into());
        }
        if chars.get(i + 1) == Some(&'-') {
            let end = chars
                .get(i + 2)
                .copied()
                .filter(|e| e.is_ascii_lowercase() && *e >= c)
                .ok_or(StateError::InvalidMark('-'))?;
            out.extend(c..=end);
            i += 3;
        } else {
            out.push(c);
            i += 1;
        }
    }
    Ok(out)
}
