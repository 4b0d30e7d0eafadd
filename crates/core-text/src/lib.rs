//! Rope-based text buffer abstraction.
//!
//! A [`Buffer`] owns the document text plus the cursor and selection offsets. Every
//! offset is a `char` index into the flattened text. All mutators clamp so that
//! `0 <= selection.start <= selection.end <= len_chars()` and `cursor <= len_chars()`
//! hold after every call, regardless of the arguments supplied.
//!
//! Lines are separated by `'\n'` only. A trailing newline terminates the last line
//! rather than opening a new, empty one: `"a\nb\n"` has two lines.

pub use ropey::Rope;

pub mod motion;
pub mod width;

pub use width::{char_width, display_col};

/// Half-open `[start, end)` selection in char offsets. Collapsed when `start == end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    pub start: usize,
    pub end: usize,
}

impl Selection {
    pub fn collapsed(at: usize) -> Self {
        Self { start: at, end: at }
    }
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
    pub fn len(&self) -> usize {
        self.end - self.start
    }
}

/// A text buffer backed by a `ropey::Rope`.
#[derive(Clone, Debug, Default)]
pub struct Buffer {
    rope: Rope,
    cursor: usize,
    selection: Selection,
}

impl From<&str> for Buffer {
    fn from(content: &str) -> Self {
        Self {
            rope: Rope::from_str(content),
            cursor: 0,
            selection: Selection::default(),
        }
    }
}

impl From<String> for Buffer {
    fn from(content: String) -> Self {
        Self::from(content.as_str())
    }
}

impl Buffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of chars.
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    /// Owned copy of the whole document.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    pub fn rope(&self) -> &Rope {
        &self.rope
    }

    pub fn char_at(&self, idx: usize) -> Option<char> {
        if idx < self.rope.len_chars() {
            Some(self.rope.char(idx))
        } else {
            None
        }
    }

    /// Text in `[start, end)`; arguments are ordered and clamped.
    pub fn slice(&self, start: usize, end: usize) -> String {
        let (s, e) = self.clamp_range(start, end);
        if s == e {
            return String::new();
        }
        self.rope.slice(s..e).to_string()
    }

    /// Insert `text` at `at` (clamped). Returns the number of chars inserted.
    pub fn insert(&mut self, at: usize, text: &str) -> usize {
        let at = at.min(self.rope.len_chars());
        self.rope.insert(at, text);
        text.chars().count()
    }

    /// Remove `[start, end)` (ordered and clamped) returning the removed text.
    /// Cursor and selection are clamped to the shortened document.
    pub fn remove(&mut self, start: usize, end: usize) -> String {
        let (s, e) = self.clamp_range(start, end);
        if s == e {
            return String::new();
        }
        let removed = self.rope.slice(s..e).to_string();
        self.rope.remove(s..e);
        self.clamp_offsets();
        removed
    }

    /// Replace the entire document. Cursor returns to the origin.
    pub fn replace_all(&mut self, content: &str) {
        self.rope = Rope::from_str(content);
        self.cursor = 0;
        self.selection = Selection::default();
    }

    /// Restore text and cursor from a history snapshot. The selection collapses onto the cursor.
    pub fn restore(&mut self, rope: Rope, cursor: usize) {
        self.rope = rope;
        self.cursor = cursor.min(self.rope.len_chars());
        self.selection = Selection::collapsed(self.cursor);
    }

    fn clamp_range(&self, a: usize, b: usize) -> (usize, usize) {
        let len = self.rope.len_chars();
        let (s, e) = if a <= b { (a, b) } else { (b, a) };
        (s.min(len), e.min(len))
    }

    // ---------------------------------------------------------------- lines

    /// Number of lines. A trailing newline does not open an extra line.
    pub fn line_count(&self) -> usize {
        let n = self.rope.len_lines();
        if n > 1 && self.ends_with_newline() {
            n - 1
        } else {
            n
        }
    }

    pub fn last_line(&self) -> usize {
        self.line_count() - 1
    }

    pub fn ends_with_newline(&self) -> bool {
        let len = self.rope.len_chars();
        len > 0 && self.rope.char(len - 1) == '\n'
    }

    /// Line containing `offset` (clamped to the last line).
    pub fn line_of(&self, offset: usize) -> usize {
        let offset = offset.min(self.rope.len_chars());
        self.rope.char_to_line(offset).min(self.last_line())
    }

    /// Offset of the first char of `line` (clamped to the last line).
    pub fn line_start(&self, line: usize) -> usize {
        self.rope.line_to_char(line.min(self.last_line()))
    }

    /// Offset just past the last char of `line`, excluding its newline.
    pub fn line_end(&self, line: usize) -> usize {
        let line = line.min(self.last_line());
        let start = self.rope.line_to_char(line);
        let slice = self.rope.line(line);
        let mut len = slice.len_chars();
        if len > 0 && slice.char(len - 1) == '\n' {
            len -= 1;
        }
        start + len
    }

    /// Offset of the first char of the following line, or the document end.
    pub fn line_end_with_newline(&self, line: usize) -> usize {
        let line = line.min(self.last_line());
        self.rope.line_to_char(line) + self.rope.line(line).len_chars()
    }

    /// Line content without its newline.
    pub fn line_text(&self, line: usize) -> String {
        let s = self.line_start(line);
        let e = self.line_end(line);
        self.rope.slice(s..e).to_string()
    }

    pub fn line_len(&self, line: usize) -> usize {
        self.line_end(line) - self.line_start(line)
    }

    /// Column (in chars) of `offset` within its line.
    pub fn column(&self, offset: usize) -> usize {
        let offset = offset.min(self.rope.len_chars());
        offset - self.line_start(self.line_of(offset))
    }

    /// Offset of the first non-blank char of `line` (line end when all blank).
    pub fn first_non_blank(&self, line: usize) -> usize {
        let start = self.line_start(line);
        let end = self.line_end(line);
        (start..end)
            .find(|&i| !matches!(self.rope.char(i), ' ' | '\t'))
            .unwrap_or(end)
    }

    /// True for lines that are empty or contain only spaces/tabs.
    pub fn is_blank_line(&self, line: usize) -> bool {
        self.first_non_blank(line) == self.line_end(line)
    }

    /// Offset of the last char on `line`, or the line start for an empty line.
    pub fn last_char_on_line(&self, line: usize) -> usize {
        let start = self.line_start(line);
        let end = self.line_end(line);
        if end > start { end - 1 } else { start }
    }

    // ------------------------------------------------------- cursor & selection

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn set_cursor(&mut self, offset: usize) {
        self.cursor = offset.min(self.rope.len_chars());
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Set the selection from two endpoints in any order (clamped).
    pub fn set_selection(&mut self, a: usize, b: usize) {
        let (s, e) = self.clamp_range(a, b);
        self.selection = Selection { start: s, end: e };
    }

    /// Collapse the selection onto the cursor.
    pub fn collapse_selection(&mut self) {
        self.selection = Selection::collapsed(self.cursor);
    }

    fn clamp_offsets(&mut self) {
        let len = self.rope.len_chars();
        self.cursor = self.cursor.min(len);
        self.selection.end = self.selection.end.min(len);
        self.selection.start = self.selection.start.min(self.selection.end);
    }
}

/// Character classification used by word motions and text objects.
pub mod class {
    /// Word-motion class of a single char. Newlines count as blanks.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum CharClass {
        Blank,
        Word,
        Punct,
    }

    pub fn is_blank(c: char) -> bool {
        c.is_whitespace()
    }

    /// CJK ideographs plus kana and hangul syllables.
    pub fn is_cjk(c: char) -> bool {
        matches!(c as u32,
            0x3040..=0x30FF
            | 0x3400..=0x4DBF
            | 0x4E00..=0x9FFF
            | 0xAC00..=0xD7AF
            | 0xF900..=0xFAFF
            | 0x20000..=0x2A6DF
            | 0x2A700..=0x2EBEF)
    }

    /// ASCII word characters, CJK ideographs, and other alphanumerics.
    pub fn is_word(c: char) -> bool {
        c == '_' || c.is_ascii_alphanumeric() || is_cjk(c) || (!c.is_ascii() && c.is_alphanumeric())
    }

    pub fn classify(c: char) -> CharClass {
        if is_blank(c) {
            CharClass::Blank
        } else if is_word(c) {
            CharClass::Word
        } else {
            CharClass::Punct
        }
    }

    /// WORD classification: everything that is not blank is one class.
    pub fn classify_big(c: char) -> CharClass {
        if is_blank(c) {
            CharClass::Blank
        } else {
            CharClass::Word
        }
    }
}

/// Grapheme helpers operating on a single line, in char columns.
pub mod grapheme {
    use unicode_segmentation::UnicodeSegmentation;

    /// Iterate grapheme clusters in a line.
    pub fn iter(line: &str) -> impl Iterator<Item = &str> {
        line.graphemes(true)
    }

    /// Next grapheme boundary strictly after `col` (line length when at or past the end).
    pub fn next_boundary(line: &str, col: usize) -> usize {
        let mut acc = 0;
        for g in line.graphemes(true) {
            acc += g.chars().count();
            if acc > col {
                return acc;
            }
        }
        acc
    }

    /// Previous grapheme boundary strictly before `col` (0 at the start).
    pub fn prev_boundary(line: &str, col: usize) -> usize {
        let mut acc = 0;
        let mut last = 0;
        for g in line.graphemes(true) {
            if acc >= col {
                break;
            }
            last = acc;
            acc += g.chars().count();
        }
        last
    }
}
