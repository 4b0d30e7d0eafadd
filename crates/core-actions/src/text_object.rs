//! Text object resolution (`iw`, `a"`, `i(`, `ap`, ...).
//!
//! Given a cursor offset and a `(scope, kind)` request, [`resolve`] computes a half-open
//! `[start, end)` span or `None` when the cursor is not inside a matching object. Word and
//! quote objects never leave the cursor's line; bracket objects may span lines; paragraph
//! objects are linewise.

use core_text::Buffer;
use core_text::class::{self, CharClass};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectScope {
    Inner,
    Around,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextObjectKind {
    Word,
    BigWord,
    /// Quote char: `"`, `'` or `` ` ``.
    Quote(char),
    /// Open and close delimiters.
    Bracket(char, char),
    Paragraph,
}

impl TextObjectKind {
    pub fn from_key(c: char) -> Option<Self> {
        Some(match c {
            'w' => TextObjectKind::Word,
            'W' => TextObjectKind::BigWord,
            '"' | '\'' | '`' => TextObjectKind::Quote(c),
            '(' | ')' | 'b' => TextObjectKind::Bracket('(', ')'),
            '[' | ']' => TextObjectKind::Bracket('[', ']'),
            '{' | '}' | 'B' => TextObjectKind::Bracket('{', '}'),
            '<' | '>' => TextObjectKind::Bracket('<', '>'),
            'p' => TextObjectKind::Paragraph,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectSpan {
    pub start: usize,
    pub end: usize,
    pub linewise: bool,
}

impl ObjectSpan {
    fn chars(start: usize, end: usize) -> Self {
        Self {
            start,
            end,
            linewise: false,
        }
    }
}

/// Resolve a text object around `offset`. `count` selects more words, an outer bracket level,
/// or more paragraphs.
pub fn resolve(
    buf: &Buffer,
    offset: usize,
    scope: ObjectScope,
    kind: TextObjectKind,
    count: usize,
) -> Option<ObjectSpan> {
    let count = count.max(1);
    let span = match kind {
        TextObjectKind::Word => word(buf, offset, scope, false, count),
        TextObjectKind::BigWord => word(buf, offset, scope, true, count),
        TextObjectKind::Quote(q) => quote(buf, offset, scope, q),
        TextObjectKind::Bracket(open, close) => bracket(buf, offset, scope, open, close, count),
        TextObjectKind::Paragraph => paragraph(buf, offset, scope, count),
    };
    tracing::trace!(target: "actions.operator", ?kind, ?scope, offset, ?span, "text_object");
    span
}

struct LineRuns<'a> {
    buf: &'a Buffer,
    start: usize,
    end: usize,
    classify: fn(char) -> CharClass,
}

impl LineRuns<'_> {
    fn class_at(&self, i: usize) -> CharClass {
        (self.classify)(self.buf.rope().char(i))
    }
    fn is_blank(&self, i: usize) -> bool {
        self.class_at(i) == CharClass::Blank
    }
    /// End of the same-class run containing `i`.
    fn run_end(&self, i: usize) -> usize {
        let c = self.class_at(i);
        let mut j = i;
        while j < self.end && self.class_at(j) == c {
            j += 1;
        }
        j
    }
    fn run_start(&self, i: usize) -> usize {
        let c = self.class_at(i);
        let mut j = i;
        while j > self.start && self.class_at(j - 1) == c {
            j -= 1;
        }
        j
    }
}

fn word(
    buf: &Buffer,
    offset: usize,
    scope: ObjectScope,
    big: bool,
    count: usize,
) -> Option<ObjectSpan> {
    let line = buf.line_of(offset);
    let runs = LineRuns {
        buf,
        start: buf.line_start(line),
        end: buf.line_end(line),
        classify: if big {
            class::classify_big
        } else {
            class::classify
        },
    };
    if runs.start == runs.end {
        return None;
    }
    let at = offset.clamp(runs.start, runs.end - 1);
    let mut s = runs.run_start(at);
    let mut e = runs.run_end(at);
    match scope {
        ObjectScope::Inner => {
            for _ in 1..count {
                if e >= runs.end {
                    break;
                }
                e = runs.run_end(e);
            }
        }
        ObjectScope::Around => {
            let on_blank = runs.is_blank(at);
            let mut trailing = false;
            for i in 0..count {
                if i > 0 {
                    if e >= runs.end {
                        break;
                    }
                    e = runs.run_end(e);
                }
                if e < runs.end && (on_blank || runs.is_blank(e)) {
                    e = runs.run_end(e);
                    trailing = true;
                }
            }
            if !trailing || on_blank {
                // no trailing white space: take the leading run instead
                if !on_blank {
                    while s > runs.start && runs.is_blank(s - 1) {
                        s -= 1;
                    }
                }
            }
        }
    }
    Some(ObjectSpan::chars(s, e))
}

fn quote(buf: &Buffer, offset: usize, scope: ObjectScope, q: char) -> Option<ObjectSpan> {
    let line = buf.line_of(offset);
    let ls = buf.line_start(line);
    let chars: Vec<char> = buf.line_text(line).chars().collect();
    let col = offset.saturating_sub(ls);
    let quotes: Vec<usize> = chars
        .iter()
        .enumerate()
        .filter(|&(i, &c)| c == q && !is_escaped(&chars, i))
        .map(|(i, _)| i)
        .collect();
    let pairs: Vec<(usize, usize)> = quotes.chunks_exact(2).map(|p| (p[0], p[1])).collect();
    let (a, b) = pairs
        .iter()
        .copied()
        .find(|&(a, b)| a <= col && col <= b)
        .or_else(|| pairs.iter().copied().find(|&(a, _)| a > col))?;
    Some(match scope {
        ObjectScope::Inner => ObjectSpan::chars(ls + a + 1, ls + b),
        ObjectScope::Around => {
            let mut s = a;
            let mut e = b + 1;
            let blank = |c: char| c == ' ' || c == '\t';
            if e < chars.len() && blank(chars[e]) {
                while e < chars.len() && blank(chars[e]) {
                    e += 1;
                }
            } else {
                while s > 0 && blank(chars[s - 1]) {
                    s -= 1;
                }
            }
            ObjectSpan::chars(ls + s, ls + e)
        }
    })
}

/// An odd run of backslashes before `i` escapes the char at `i`.
fn is_escaped(chars: &[char], i: usize) -> bool {
    chars[..i].iter().rev().take_while(|&&c| c == '\\').count() % 2 == 1
}

/// Nearest unmatched `open` at or before `from`.
fn find_open(buf: &Buffer, from: usize, open: char, close: char) -> Option<usize> {
    let mut depth = 0usize;
    for i in (0..=from).rev() {
        let c = buf.rope().char(i);
        if c == close {
            depth += 1;
        } else if c == open {
            if depth == 0 {
                return Some(i);
            }
            depth -= 1;
        }
    }
    None
}

fn find_close(buf: &Buffer, open_at: usize, open: char, close: char) -> Option<usize> {
    let mut depth = 0usize;
    for i in open_at + 1..buf.len_chars() {
        let c = buf.rope().char(i);
        if c == open {
            depth += 1;
        } else if c == close {
            if depth == 0 {
                return Some(i);
            }
            depth -= 1;
        }
    }
    None
}

fn bracket(
    buf: &Buffer,
    offset: usize,
    scope: ObjectScope,
    open: char,
    close: char,
    count: usize,
) -> Option<ObjectSpan> {
    let len = buf.len_chars();
    if len == 0 {
        return None;
    }
    let at = offset.min(len - 1);
    let under = buf.rope().char(at);
    let mut open_at = if under == open {
        at
    } else if under == close {
        find_open(buf, at.checked_sub(1)?, open, close)?
    } else {
        find_open(buf, at, open, close)?
    };
    for _ in 1..count {
        open_at = find_open(buf, open_at.checked_sub(1)?, open, close)?;
    }
    let close_at = find_close(buf, open_at, open, close)?;
    Some(match scope {
        ObjectScope::Around => ObjectSpan::chars(open_at, close_at + 1),
        ObjectScope::Inner => {
            let mut s = open_at + 1;
            let mut e = close_at;
            if buf.char_at(s) == Some('\n') {
                s += 1;
                let close_line = buf.line_of(close_at);
                let close_ls = buf.line_start(close_line);
                if close_line > buf.line_of(open_at)
                    && (close_ls..close_at).all(|i| matches!(buf.rope().char(i), ' ' | '\t'))
                {
                    e = close_ls;
                }
            }
            ObjectSpan::chars(s.min(e), e)
        }
    })
}

fn paragraph(buf: &Buffer, offset: usize, scope: ObjectScope, count: usize) -> Option<ObjectSpan> {
    let last = buf.last_line();
    let line = buf.line_of(offset);
    let blank = buf.is_blank_line(line);
    let mut first = line;
    while first > 0 && buf.is_blank_line(first - 1) == blank {
        first -= 1;
    }
    let run_end = |from: usize| {
        let b = buf.is_blank_line(from);
        let mut l = from;
        while l < last && buf.is_blank_line(l + 1) == b {
            l += 1;
        }
        l
    };
    let mut end = run_end(line);
    let runs = match scope {
        ObjectScope::Inner => count,
        ObjectScope::Around => count * 2,
    };
    let mut taken = 1;
    while taken < runs && end < last {
        end = run_end(end + 1);
        taken += 1;
    }
    if scope == ObjectScope::Around && taken < runs && !blank {
        while first > 0 && buf.is_blank_line(first - 1) {
            first -= 1;
        }
    }
    Some(ObjectSpan {
        start: buf.line_start(first),
        end: buf.line_end_with_newline(end),
        linewise: true,
    })
}
