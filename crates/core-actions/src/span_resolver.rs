//! Operator span resolution.
//!
//! Converts a motion result `(origin, target, class)` into the `[start, end)` range an
//! operator acts on:
//! * Linewise motions snap to whole lines, newline included.
//! * Inclusive motions extend the end by one grapheme, never over a newline.
//! * Exclusive motions whose end lands in column 0 of a later line are pulled back to the end
//!   of the previous line. When the start is at or before the first non-blank the span then
//!   becomes linewise, except for `w`/`W` which keep the charwise span.
//!
//! Nothing here mutates the buffer.

use crate::MotionClass;
use core_text::{Buffer, grapheme, motion};

/// Resolved operator range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub linewise: bool,
}

impl Span {
    pub fn chars(start: usize, end: usize) -> Self {
        Self {
            start,
            end,
            linewise: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

/// Whole lines `first..=last`, including the final newline when present.
pub fn line_span(buf: &Buffer, first: usize, last: usize) -> Span {
    let (first, last) = if first <= last {
        (first, last)
    } else {
        (last, first)
    };
    Span {
        start: buf.line_start(first),
        end: buf.line_end_with_newline(last),
        linewise: true,
    }
}

/// Offset just past the grapheme at `offset`. On a newline (or the document end) the offset is
/// returned unchanged unless `over_newline` is set.
pub fn inclusive_end(buf: &Buffer, offset: usize, over_newline: bool) -> usize {
    match buf.char_at(offset) {
        None => offset,
        Some('\n') if over_newline => offset + 1,
        Some('\n') => offset,
        Some(_) => {
            let line = buf.line_of(offset);
            let start = buf.line_start(line);
            start + grapheme::next_boundary(&buf.line_text(line), offset - start)
        }
    }
}

/// Span for an operator applied through a motion. `word_motion` marks `w`/`W`, which never
/// turn linewise when pulled back.
pub fn motion_span(
    buf: &Buffer,
    origin: usize,
    target: usize,
    class: MotionClass,
    word_motion: bool,
) -> Span {
    let (start, end) = if origin <= target {
        (origin, target)
    } else {
        (target, origin)
    };
    if class.linewise {
        return line_span(buf, buf.line_of(start), buf.line_of(end));
    }
    if class.inclusive {
        return Span::chars(start, inclusive_end(buf, end, false));
    }
    let start_line = buf.line_of(start);
    let end_line = buf.line_of(end);
    if end > start && end_line > start_line && buf.column(end) == 0 {
        let prev = end_line - 1;
        if !word_motion && start <= buf.first_non_blank(start_line) {
            return line_span(buf, start_line, prev);
        }
        return Span::chars(start, buf.line_end(prev).max(start));
    }
    // a motion that ran off the document keeps the final newline out of the span
    if end > start && end == buf.len_chars() && buf.ends_with_newline() {
        return Span::chars(start, end - 1);
    }
    Span::chars(start, end)
}

/// Inclusive end offset for `cw`/`cW` started on a non-blank: like `ce`, except that the first
/// iteration stays put when the cursor already sits on the last char of its word.
pub fn change_word_end(buf: &Buffer, origin: usize, big: bool, count: usize) -> usize {
    let classify = if big {
        core_text::class::classify_big
    } else {
        core_text::class::classify
    };
    let mut at = origin;
    for i in 0..count.max(1) {
        let cur = buf.char_at(at).map(classify);
        let next = buf
            .char_at(at + 1)
            .filter(|&c| c != '\n')
            .map(classify);
        if i == 0 && cur != next {
            continue;
        }
        at = motion::word_end(buf, at, big);
    }
    at
}
