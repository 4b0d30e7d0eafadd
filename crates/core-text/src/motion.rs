//! Cursor motion primitives.
//!
//! Pure functions over a [`Buffer`] and a char offset. They know nothing about modes,
//! counts, or operators: the caller repeats a primitive `count` times, each iteration
//! starting from the offset produced by the previous one, and decides whether a
//! primitive that cannot move (`None`) is a failure.

use crate::class::{self, CharClass};
use crate::{Buffer, grapheme, width};

/// Clamp an offset for Normal-mode display: the cursor rests on a real character, never
/// on the end-of-line position of a non-empty line.
pub fn normal_clamp(buf: &Buffer, offset: usize) -> usize {
    let line = buf.line_of(offset);
    let start = buf.line_start(line);
    let end = buf.line_end(line);
    if offset < end {
        return offset.max(start);
    }
    if end == start {
        return start;
    }
    let text = buf.line_text(line);
    start + grapheme::prev_boundary(&text, end - start)
}

/// One grapheme left within the line.
pub fn left(buf: &Buffer, offset: usize) -> Option<usize> {
    let line = buf.line_of(offset);
    let start = buf.line_start(line);
    if offset <= start {
        return None;
    }
    let text = buf.line_text(line);
    Some(start + grapheme::prev_boundary(&text, offset - start))
}

/// One grapheme right within the line. With `past_end` the end-of-line position is a valid
/// target (Insert mode, operator-pending `l`).
pub fn right(buf: &Buffer, offset: usize, past_end: bool) -> Option<usize> {
    let line = buf.line_of(offset);
    let start = buf.line_start(line);
    let end = buf.line_end(line);
    let text = buf.line_text(line);
    let next = start + grapheme::next_boundary(&text, offset - start);
    let limit = if past_end {
        end
    } else {
        // last grapheme start
        start + grapheme::prev_boundary(&text, end - start)
    };
    if next > limit || next <= offset {
        None
    } else {
        Some(next)
    }
}

/// Move `delta` lines (negative is up) keeping display column `want`. Partial moves
/// clamp at the document edges; `None` only when no line change is possible.
pub fn vertical(buf: &Buffer, offset: usize, delta: isize, want: usize) -> Option<usize> {
    let line = buf.line_of(offset);
    let target = if delta < 0 {
        line.saturating_sub(delta.unsigned_abs())
    } else {
        line.saturating_add(delta as usize).min(buf.last_line())
    };
    if target == line {
        return None;
    }
    let text = buf.line_text(target);
    Some(buf.line_start(target) + width::col_for_display(&text, want))
}

/// Display column of `offset`, used to seed the sticky column.
pub fn display_column(buf: &Buffer, offset: usize) -> usize {
    let line = buf.line_of(offset);
    width::display_col(&buf.line_text(line), buf.column(offset))
}

fn classifier(big: bool) -> fn(char) -> CharClass {
    if big { class::classify_big } else { class::classify }
}

fn is_empty_line_at(buf: &Buffer, i: usize) -> bool {
    buf.char_at(i) == Some('\n') && (i == 0 || buf.char_at(i - 1) == Some('\n'))
}

/// Start of the next word (`w`/`W`). Empty lines count as words. Returns the document
/// length when no further word exists.
pub fn word_forward(buf: &Buffer, offset: usize, big: bool) -> usize {
    let classify = classifier(big);
    let len = buf.len_chars();
    let mut i = offset;
    if i >= len {
        return len;
    }
    let cls = classify(buf.rope().char(i));
    if cls != CharClass::Blank {
        while i < len && classify(buf.rope().char(i)) == cls {
            i += 1;
        }
    }
    while i < len {
        let ch = buf.rope().char(i);
        if ch == '\n' {
            i += 1;
            if i < len && buf.rope().char(i) == '\n' {
                return i;
            }
        } else if class::is_blank(ch) {
            i += 1;
        } else {
            break;
        }
    }
    i
}

/// Start of the current or previous word (`b`/`B`).
pub fn word_backward(buf: &Buffer, offset: usize, big: bool) -> usize {
    let classify = classifier(big);
    let mut i = offset.min(buf.len_chars());
    if i == 0 {
        return 0;
    }
    i -= 1;
    while i > 0 && class::is_blank(buf.rope().char(i)) {
        if is_empty_line_at(buf, i) {
            return i;
        }
        i -= 1;
    }
    let cls = classify(buf.rope().char(i));
    if cls == CharClass::Blank {
        return i;
    }
    while i > 0 && classify(buf.rope().char(i - 1)) == cls {
        i -= 1;
    }
    i
}

/// End of the current or next word (`e`/`E`), inclusive.
pub fn word_end(buf: &Buffer, offset: usize, big: bool) -> usize {
    let classify = classifier(big);
    let len = buf.len_chars();
    if len == 0 {
        return 0;
    }
    let mut i = offset + 1;
    while i < len && class::is_blank(buf.rope().char(i)) {
        i += 1;
    }
    if i >= len {
        return len - 1;
    }
    let cls = classify(buf.rope().char(i));
    while i + 1 < len && classify(buf.rope().char(i + 1)) == cls {
        i += 1;
    }
    i
}

/// End of the previous word (`ge`/`gE`), inclusive.
pub fn word_end_backward(buf: &Buffer, offset: usize, big: bool) -> usize {
    let classify = classifier(big);
    let mut i = offset.min(buf.len_chars().saturating_sub(1));
    if i == 0 {
        return 0;
    }
    let cls = classify(buf.rope().char(i));
    if cls != CharClass::Blank {
        while i > 0 && classify(buf.rope().char(i - 1)) == cls {
            i -= 1;
        }
        if i == 0 {
            return 0;
        }
    }
    i -= 1;
    while i > 0 && class::is_blank(buf.rope().char(i)) {
        if is_empty_line_at(buf, i) {
            return i;
        }
        i -= 1;
    }
    i
}

/// Next blank line after the current paragraph (`}`), or the document end.
pub fn paragraph_forward(buf: &Buffer, offset: usize) -> usize {
    let last = buf.last_line();
    let mut l = buf.line_of(offset);
    while l <= last && buf.is_blank_line(l) {
        l += 1;
    }
    while l <= last && !buf.is_blank_line(l) {
        l += 1;
    }
    if l > last {
        buf.len_chars()
    } else {
        buf.line_start(l)
    }
}

/// Previous blank line before the current paragraph (`{`), or the document start.
pub fn paragraph_backward(buf: &Buffer, offset: usize) -> usize {
    let mut l = buf.line_of(offset);
    if l == 0 {
        return 0;
    }
    l -= 1;
    while l > 0 && buf.is_blank_line(l) {
        l -= 1;
    }
    while l > 0 && !buf.is_blank_line(l) {
        l -= 1;
    }
    if buf.is_blank_line(l) {
        buf.line_start(l)
    } else {
        0
    }
}

fn bracket_pair(c: char) -> Option<(char, char, bool)> {
    match c {
        '(' => Some(('(', ')', true)),
        '[' => Some(('[', ']', true)),
        '{' => Some(('{', '}', true)),
        '<' => Some(('<', '>', true)),
        ')' => Some(('(', ')', false)),
        ']' => Some(('[', ']', false)),
        '}' => Some(('{', '}', false)),
        '>' => Some(('<', '>', false)),
        _ => None,
    }
}

/// Matching bracket (`%`). Uses the bracket under the cursor or the first one after it on
/// the line, then scans with a depth counter across lines.
pub fn matching_bracket(buf: &Buffer, offset: usize) -> Option<usize> {
    let line_end = buf.line_end(buf.line_of(offset));
    let (pos, (open, close, forward)) =
        (offset..line_end).find_map(|i| bracket_pair(buf.rope().char(i)).map(|p| (i, p)))?;
    let mut depth = 0usize;
    if forward {
        for i in pos..buf.len_chars() {
            let c = buf.rope().char(i);
            if c == open {
                depth += 1;
            } else if c == close {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
        }
    } else {
        for i in (0..=pos).rev() {
            let c = buf.rope().char(i);
            if c == close {
                depth += 1;
            } else if c == open {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
        }
    }
    None
}

/// In-line character search parameters (`f`, `t`, `F`, `T`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FindSpec {
    pub ch: char,
    pub forward: bool,
    /// Stop one char short of the match (`t`/`T`).
    pub till: bool,
}

/// Find the `count`-th occurrence of the searched char on the cursor's line. For a
/// repeated till search (`;` after `t`) an adjacent match is skipped so the motion
/// makes progress.
pub fn find_in_line(
    buf: &Buffer,
    offset: usize,
    spec: FindSpec,
    count: usize,
    repeat: bool,
) -> Option<usize> {
    let line = buf.line_of(offset);
    let start = buf.line_start(line);
    let end = buf.line_end(line);
    let skip = usize::from(spec.till && repeat);
    let mut remaining = count.max(1);
    if spec.forward {
        let from = offset + 1 + skip;
        for i in from..end {
            if buf.rope().char(i) == spec.ch {
                remaining -= 1;
                if remaining == 0 {
                    return Some(if spec.till { i - 1 } else { i });
                }
            }
        }
    } else {
        let upto = offset.saturating_sub(skip);
        for i in (start..upto).rev() {
            if buf.rope().char(i) == spec.ch {
                remaining -= 1;
                if remaining == 0 {
                    return Some(if spec.till { i + 1 } else { i });
                }
            }
        }
    }
    None
}

/// First non-blank of 1-based line `n` (clamped to the document).
pub fn goto_line(buf: &Buffer, n: usize) -> usize {
    let line = n.saturating_sub(1).min(buf.last_line());
    buf.first_non_blank(line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn word_forward_crosses_punctuation_and_lines() {
        let b = Buffer::from("foo.bar baz\nqux");
        assert_eq!(word_forward(&b, 0, false), 3);
        assert_eq!(word_forward(&b, 3, false), 4);
        assert_eq!(word_forward(&b, 4, false), 8);
        assert_eq!(word_forward(&b, 8, false), 12);
        assert_eq!(word_forward(&b, 0, true), 8);
        assert_eq!(word_forward(&b, 12, false), 15);
    }

    #[test]
    fn word_forward_stops_on_empty_line() {
        let b = Buffer::from("a\n\nb");
        assert_eq!(word_forward(&b, 0, false), 2);
        assert_eq!(word_forward(&b, 2, false), 3);
    }

    #[test]
    fn word_backward_and_end() {
        let b = Buffer::from("hello world  foo");
        assert_eq!(word_backward(&b, 13, false), 6);
        assert_eq!(word_backward(&b, 8, false), 6);
        assert_eq!(word_backward(&b, 0, false), 0);
        assert_eq!(word_end(&b, 0, false), 4);
        assert_eq!(word_end(&b, 4, false), 10);
        assert_eq!(word_end_backward(&b, 13, false), 10);
        assert_eq!(word_end_backward(&b, 8, false), 4);
    }

    #[test]
    fn cjk_run_is_a_single_word() {
        let b = Buffer::from("漢字 abc");
        assert_eq!(word_forward(&b, 0, false), 3);
        assert_eq!(word_end(&b, 0, false), 1);
    }

    #[test]
    fn paragraphs_are_delimited_by_blank_lines() {
        let b = Buffer::from("a\nb\n\nc\nd\n\ne");
        assert_eq!(paragraph_forward(&b, 0), 4);
        assert_eq!(paragraph_forward(&b, 4), 9);
        assert_eq!(paragraph_forward(&b, 10), b.len_chars());
        assert_eq!(paragraph_backward(&b, 7), 4);
        assert_eq!(paragraph_backward(&b, 2), 0);
    }

    #[test]
    fn matching_bracket_counts_depth() {
        let b = Buffer::from("x (a (b) c) y");
        assert_eq!(matching_bracket(&b, 0), Some(10));
        assert_eq!(matching_bracket(&b, 10), Some(2));
        assert_eq!(matching_bracket(&b, 5), Some(7));
        assert_eq!(matching_bracket(&b, 11), None);
    }

    #[test]
    fn find_and_till() {
        let b = Buffer::from("a,b,c,d");
        let f = FindSpec { ch: ',', forward: true, till: false };
        let t = FindSpec { till: true, ..f };
        assert_eq!(find_in_line(&b, 0, f, 1, false), Some(1));
        assert_eq!(find_in_line(&b, 0, f, 3, false), Some(5));
        assert_eq!(find_in_line(&b, 0, f, 4, false), None);
        assert_eq!(find_in_line(&b, 0, t, 1, false), Some(0));
        assert_eq!(find_in_line(&b, 0, t, 1, true), Some(2));
        let bt = FindSpec { ch: ',', forward: false, till: true };
        assert_eq!(find_in_line(&b, 6, bt, 1, false), Some(6));
        assert_eq!(find_in_line(&b, 6, bt, 1, true), Some(4));
    }

    #[test]
    fn vertical_keeps_display_column() {
        let b = Buffer::from("abcdef\nab\n漢字漢字");
        let want = display_column(&b, 4);
        let down = vertical(&b, 4, 1, want).unwrap();
        assert_eq!(down, 9);
        let down2 = vertical(&b, down, 1, want).unwrap();
        assert_eq!(down2, 10 + 2);
        assert_eq!(vertical(&b, 0, -1, 0), None);
        assert_eq!(vertical(&b, 0, 10, 0), Some(10));
    }

    #[test]
    fn left_right_respect_line_bounds() {
        let b = Buffer::from("ab\ncd");
        assert_eq!(left(&b, 3), None);
        assert_eq!(right(&b, 1, false), None);
        assert_eq!(right(&b, 1, true), Some(2));
        assert_eq!(right(&b, 0, false), Some(1));
        assert_eq!(normal_clamp(&b, 2), 1);
        assert_eq!(normal_clamp(&Buffer::from("\n"), 1), 0);
    }

    proptest! {
        #[test]
        fn word_round_trip_is_idempotent(text in "[a-z .,\n]{0,40}", at in 0usize..40) {
            let b = Buffer::from(text.as_str());
            let at = at.min(b.len_chars());
            let once = word_backward(&b, word_forward(&b, at, false), false);
            let twice = word_backward(&b, word_forward(&b, once, false), false);
            prop_assert!(once <= b.len_chars());
            prop_assert_eq!(
                word_backward(&b, word_forward(&b, twice, false), false),
                twice
            );
        }

        #[test]
        fn motions_stay_in_bounds(text in "\\PC{0,30}", at in 0usize..40) {
            let b = Buffer::from(text.as_str());
            let len = b.len_chars();
            let at = at.min(len);
            prop_assert!(word_forward(&b, at, true) <= len);
            prop_assert!(word_backward(&b, at, false) <= len);
            prop_assert!(word_end(&b, at, false) <= len);
            prop_assert!(paragraph_forward(&b, at) <= len);
            prop_assert!(paragraph_backward(&b, at) <= len);
        }
    }
}
