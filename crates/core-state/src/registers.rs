//! Register bank.
//!
//! Slots: unnamed `"`, numbered `0`-`9`, named `a`-`z` (uppercase `A`-`Z` appends), clipboard
//! `*`/`+`, and the black hole `_`. A register's content is linewise when it ends in `'\n'`.
//!
//! Numbering follows Vim: a yank fills `0`; a delete or change whose text is linewise or spans
//! several lines shifts `1`..`8` down to `2`..`9` and fills `1`. Small deletes touch only the
//! unnamed register (and an explicitly named one).

use tracing::trace;

use crate::StateError;

/// Whether a write comes from a yank or a delete/change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteKind {
    Yank,
    Delete,
}

/// What a write did, so the caller can mirror clipboard registers outward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    Stored,
    /// Black hole: nothing was stored anywhere.
    Discarded,
    /// Stored in `*`/`+`; the text should also go to the system clipboard.
    Clipboard(String),
}

/// Register content plus its shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterContent {
    pub text: String,
    pub linewise: bool,
}

impl RegisterContent {
    pub fn new(text: String) -> Self {
        let linewise = text.ends_with('\n');
        Self { text, linewise }
    }
}

pub fn is_valid_register(c: char) -> bool {
    matches!(c, '"' | '*' | '+' | '_') || c.is_ascii_digit() || c.is_ascii_alphabetic()
}

#[derive(Debug, Clone, Default)]
pub struct RegisterBank {
    unnamed: String,
    numbered: [String; 10],
    named: [String; 26],
    star: String,
    plus: String,
}

fn named_index(c: char) -> usize {
    (c.to_ascii_lowercase() as u8 - b'a') as usize
}

impl RegisterBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `text` for a yank/delete into register `name` (`None` = unnamed).
    pub fn write(
        &mut self,
        name: Option<char>,
        text: &str,
        kind: WriteKind,
    ) -> Result<WriteOutcome, StateError> {
        let name = name.unwrap_or('"');
        if !is_valid_register(name) {
            return Err(StateError::InvalidRegister(name));
        }
        if name == '_' {
            trace!(target: "state.registers", "black_hole_write");
            return Ok(WriteOutcome::Discarded);
        }
        let mut stored = text.to_string();
        let mut outcome = WriteOutcome::Stored;
        match name {
            'a'..='z' => self.named[named_index(name)] = stored.clone(),
            'A'..='Z' => {
                let slot = &mut self.named[named_index(name)];
                slot.push_str(text);
                stored = slot.clone();
            }
            '0'..='9' => self.numbered[(name as u8 - b'0') as usize] = stored.clone(),
            '*' | '+' => {
                if name == '*' {
                    self.star = stored.clone();
                } else {
                    self.plus = stored.clone();
                }
                outcome = WriteOutcome::Clipboard(stored.clone());
            }
            _ => {}
        }
        match kind {
            WriteKind::Yank => self.numbered[0] = text.to_string(),
            WriteKind::Delete if text.contains('\n') => {
                self.numbered[1..].rotate_right(1);
                self.numbered[1] = text.to_string();
            }
            WriteKind::Delete => {}
        }
        trace!(target: "state.registers", register = %name, kind = ?kind, chars = text.chars().count(), "register_write");
        self.unnamed = stored;
        Ok(outcome)
    }

    /// Raw slot content without fallback (`None` for an empty slot).
    pub fn get(&self, name: char) -> Option<&str> {
        let s = match name {
            '"' => &self.unnamed,
            '0'..='9' => &self.numbered[(name as u8 - b'0') as usize],
            'a'..='z' | 'A'..='Z' => &self.named[named_index(name)],
            '*' => &self.star,
            '+' => &self.plus,
            _ => return None,
        };
        if s.is_empty() { None } else { Some(s.as_str()) }
    }

    /// Content for a paste from `name` (`None` = unnamed). An empty slot falls back to the
    /// unnamed register; the black hole always reads empty.
    pub fn read(&self, name: Option<char>) -> Option<RegisterContent> {
        let name = name.unwrap_or('"');
        if name == '_' {
            return None;
        }
        self.get(name)
            .or_else(|| self.get('"'))
            .map(|s| RegisterContent::new(s.to_string()))
    }

    /// Overwrite a slot directly, bypassing numbering rules (persistence, clipboard resolution).
    pub fn set(&mut self, name: char, text: impl Into<String>) -> Result<(), StateError> {
        let text = text.into();
        match name {
            '"' => self.unnamed = text,
            '0'..='9' => self.numbered[(name as u8 - b'0') as usize] = text,
            'a'..='z' | 'A'..='Z' => self.named[named_index(name)] = text,
            '*' => self.star = text,
            '+' => self.plus = text,
            '_' => {}
            _ => return Err(StateError::InvalidRegister(name)),
        }
        Ok(())
    }

    /// Non-empty registers in display order (`"`, `0`-`9`, `a`-`z`, `*`, `+`).
    pub fn entries(&self) -> Vec<(char, &str)> {
        let mut out = Vec::new();
        let names = std::iter::once('"')
            .chain('0'..='9')
            .chain('a'..='z')
            .chain(['*', '+']);
        for name in names {
            if let Some(text) = self.get(name) {
                out.push((name, text));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn yank_updates_unnamed_and_zero() {
        let mut r = RegisterBank::new();
        r.write(None, "foo", WriteKind::Yank).unwrap();
        assert_eq!(r.get('"'), Some("foo"));
        assert_eq!(r.get('0'), Some("foo"));
        assert_eq!(r.get('1'), None);
    }

    #[test]
    fn small_delete_only_touches_unnamed() {
        let mut r = RegisterBank::new();
        r.write(None, "keep", WriteKind::Yank).unwrap();
        r.write(None, "x", WriteKind::Delete).unwrap();
        assert_eq!(r.get('"'), Some("x"));
        assert_eq!(r.get('0'), Some("keep"));
        assert_eq!(r.get('1'), None);
    }

    #[test]
    fn linewise_deletes_shift_numbered() {
        let mut r = RegisterBank::new();
        r.write(None, "one\n", WriteKind::Delete).unwrap();
        r.write(None, "two\n", WriteKind::Delete).unwrap();
        assert_eq!(r.get('1'), Some("two\n"));
        assert_eq!(r.get('2'), Some("one\n"));
        for i in 0..12 {
            r.write(None, &format!("{i}\n"), WriteKind::Delete).unwrap();
        }
        assert_eq!(r.get('1'), Some("11\n"));
        assert_eq!(r.get('9'), Some("3\n"));
    }

    #[test]
    fn uppercase_appends_to_lowercase_slot() {
        let mut r = RegisterBank::new();
        r.write(Some('a'), "hello ", WriteKind::Yank).unwrap();
        r.write(Some('A'), "world", WriteKind::Yank).unwrap();
        assert_eq!(r.get('a'), Some("hello world"));
        assert_eq!(r.get('"'), Some("hello world"));
    }

    #[test]
    fn black_hole_discards_everything() {
        let mut r = RegisterBank::new();
        r.write(None, "keep", WriteKind::Yank).unwrap();
        let out = r.write(Some('_'), "gone\n", WriteKind::Delete).unwrap();
        assert_eq!(out, WriteOutcome::Discarded);
        assert_eq!(r.get('"'), Some("keep"));
        assert_eq!(r.get('1'), None);
        assert_eq!(r.read(Some('_')), None);
    }

    #[test]
    fn clipboard_registers_report_mirror() {
        let mut r = RegisterBank::new();
        let out = r.write(Some('+'), "clip", WriteKind::Yank).unwrap();
        assert_eq!(out, WriteOutcome::Clipboard("clip".into()));
        assert_eq!(r.get('+'), Some("clip"));
    }

    #[test]
    fn read_falls_back_to_unnamed_and_detects_linewise() {
        let mut r = RegisterBank::new();
        r.write(None, "line\n", WriteKind::Yank).unwrap();
        let c = r.read(Some('q')).unwrap();
        assert_eq!(c.text, "line\n");
        assert!(c.linewise);
        assert_eq!(RegisterBank::new().read(None), None);
    }

    #[test]
    fn invalid_names_are_rejected() {
        let mut r = RegisterBank::new();
        assert_eq!(
            r.write(Some('#'), "x", WriteKind::Yank),
            Err(StateError::InvalidRegister('#'))
        );
        assert!(r.set('!', "x").is_err());
    }

    #[test]
    fn entries_list_in_display_order() {
        let mut r = RegisterBank::new();
        r.write(Some('b'), "bee", WriteKind::Yank).unwrap();
        let names: Vec<char> = r.entries().iter().map(|(c, _)| *c).collect();
        assert_eq!(names, vec!['"', '0', 'b']);
    }
}
