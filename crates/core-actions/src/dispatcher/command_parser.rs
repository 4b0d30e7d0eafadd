//! Structured command line parsing.
//!
//! Converts the typed command line (with or without the leading ':') into a
//! [`ParsedCommand`]: an optional line range plus an [`ExCommand`]. Parsing is pure; range
//! addresses stay symbolic until the executor resolves them against the buffer.

use std::path::PathBuf;

use crate::EditError;

/// Base of a line address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Address {
    /// 1-based line number.
    Line(usize),
    /// `.`
    Current,
    /// `$`
    Last,
    /// `'x`, including `'<` / `'>`
    Mark(char),
}

/// An address with its `+N`/`-N` adjustments folded in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineAddress {
    pub base: Address,
    pub offset: isize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineRange {
    /// `%`
    Whole,
    Single(LineAddress),
    Pair(LineAddress, LineAddress),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitute {
    pub pattern: String,
    /// Replacement already converted to `regex` expansion syntax.
    pub replacement: String,
    pub global: bool,
    pub ignore_case: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExCommand {
    /// Empty command line.
    Nop,
    /// A bare range: jump to its last line.
    Goto,
    Substitute(Substitute),
    Delete {
        register: Option<char>,
        count: Option<usize>,
    },
    Yank {
        register: Option<char>,
        count: Option<usize>,
    },
    Shift {
        right: bool,
        units: usize,
    },
    Undo,
    Redo,
    Registers,
    Marks,
    DeleteMarks {
        names: String,
        all: bool,
    },
    Write {
        path: Option<PathBuf>,
    },
    Quit {
        force: bool,
    },
    WriteQuit {
        path: Option<PathBuf>,
    },
    Edit {
        path: PathBuf,
        force: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    pub range: Option<LineRange>,
    pub command: ExCommand,
}

pub struct CommandParser;

impl CommandParser {
    pub fn parse(raw: &str) -> Result<ParsedCommand, EditError> {
        let body = raw.strip_prefix(':').unwrap_or(raw);
        let mut cur = Cursor::new(body.trim_start_matches([' ', ':']));
        let range = cur.range()?;
        cur.skip_blanks();
        let name = cur.name();
        let bang = cur.eat('!');
        let rest = cur.rest();
        let command = Self::command(&name, bang, rest, range.is_some())?;
        Ok(ParsedCommand { range, command })
    }

    fn command(
        name: &str,
        bang: bool,
        rest: &str,
        has_range: bool,
    ) -> Result<ExCommand, EditError> {
        let args = rest.trim();
        let no_args = |cmd: ExCommand| {
            if args.is_empty() {
                Ok(cmd)
            } else {
                Err(EditError::TrailingCharacters(args.to_string()))
            }
        };
        if name.is_empty() {
            if bang {
                return Err(EditError::UnknownCommand("!".into()));
            }
            return no_args(if has_range {
                ExCommand::Goto
            } else {
                ExCommand::Nop
            });
        }
        if name.starts_with(['>', '<']) {
            return no_args(ExCommand::Shift {
                right: name.starts_with('>'),
                units: name.chars().count(),
            });
        }
        let path = || (!args.is_empty()).then(|| PathBuf::from(args));
        if abbrev(name, "substitute", 1) {
            return parse_substitute(rest).map(ExCommand::Substitute);
        }
        if abbrev(name, "delmarks", 4) {
            if bang {
                return no_args(ExCommand::DeleteMarks {
                    names: String::new(),
                    all: true,
                });
            }
            if args.is_empty() {
                return Err(EditError::ArgumentRequired);
            }
            return Ok(ExCommand::DeleteMarks {
                names: args.to_string(),
                all: false,
            });
        }
        if abbrev(name, "display", 2) || abbrev(name, "registers", 3) {
            return Ok(ExCommand::Registers);
        }
        if abbrev(name, "delete", 1) {
            let (register, count) = register_and_count(args)?;
            return Ok(ExCommand::Delete { register, count });
        }
        if abbrev(name, "yank", 1) {
            let (register, count) = register_and_count(args)?;
            return Ok(ExCommand::Yank { register, count });
        }
        if abbrev(name, "undo", 1) {
            return no_args(ExCommand::Undo);
        }
        if abbrev(name, "redo", 3) {
            return no_args(ExCommand::Redo);
        }
        if name == "marks" {
            return Ok(ExCommand::Marks);
        }
        if name == "wq" {
            return Ok(ExCommand::WriteQuit { path: path() });
        }
        if abbrev(name, "xit", 1) {
            return Ok(ExCommand::WriteQuit { path: path() });
        }
        if abbrev(name, "write", 1) {
            return Ok(ExCommand::Write { path: path() });
        }
        if abbrev(name, "quit", 1) {
            return no_args(ExCommand::Quit { force: bang });
        }
        if abbrev(name, "edit", 1) {
            let path = path().ok_or(EditError::ArgumentRequired)?;
            return Ok(ExCommand::Edit { path, force: bang });
        }
        Err(EditError::UnknownCommand(format!("{name}{rest}")))
    }
}

/// `name` is a prefix of `full` at least `min` chars long.
fn abbrev(name: &str, full: &str, min: usize) -> bool {
    name.len() >= min && full.starts_with(name)
}

/// `[x] [count]` argument of `:d` / `:y`.
fn register_and_count(args: &str) -> Result<(Option<char>, Option<usize>), EditError> {
    let mut rest = args;
    let mut register = None;
    if let Some(c) = rest.chars().next()
        && !c.is_ascii_digit()
        && core_state::is_valid_register(c)
    {
        register = Some(c);
        rest = rest[c.len_utf8()..].trim_start();
    }
    if rest.is_empty() {
        return Ok((register, None));
    }
    match rest.parse::<usize>() {
        Ok(n) if n > 0 => Ok((register, Some(n))),
        _ => Err(EditError::TrailingCharacters(rest.to_string())),
    }
}

fn parse_substitute(rest: &str) -> Result<Substitute, EditError> {
    let mut chars = rest.chars();
    let delim = match chars.next() {
        Some(c) if !c.is_alphanumeric() && !matches!(c, ' ' | '\\' | '"' | '|') => c,
        _ => return Err(EditError::ArgumentRequired),
    };
    let tail = chars.as_str();
    let (pattern, tail) = split_unescaped(tail, delim, true);
    if pattern.is_empty() {
        return Err(EditError::ArgumentRequired);
    }
    let (replacement, flags) = match tail {
        Some(t) => {
            let (rep, flags) = split_unescaped(t, delim, false);
            (rep, flags.unwrap_or(""))
        }
        None => (String::new(), ""),
    };
    let mut global = false;
    let mut ignore_case = false;
    for (i, c) in flags.trim_end().char_indices() {
        match c {
            'g' => global = true,
            'i' => ignore_case = true,
            'I' => ignore_case = false,
            _ => return Err(EditError::TrailingCharacters(flags[i..].to_string())),
        }
    }
    Ok(Substitute {
        pattern,
        replacement: convert_replacement(&replacement),
        global,
        ignore_case,
    })
}

/// Text up to the first unescaped `delim`, and what follows it (None when the delimiter never
/// appears). An escaped delimiter becomes literal; other escapes are kept. In a pattern a
/// literal delimiter that is also a regex metachar stays escaped.
fn split_unescaped(s: &str, delim: char, pattern: bool) -> (String, Option<&str>) {
    let mut out = String::new();
    let mut iter = s.char_indices();
    while let Some((i, c)) = iter.next() {
        if c == delim {
            return (out, Some(&s[i + c.len_utf8()..]));
        }
        if c == '\\' {
            match iter.next() {
                Some((_, next)) if next == delim => {
                    if pattern && regex_syntax_char(next) {
                        out.push('\\');
                    }
                    out.push(next);
                }
                Some((_, next)) => {
                    out.push('\\');
                    out.push(next);
                }
                None => out.push('\\'),
            }
            continue;
        }
        out.push(c);
    }
    (out, None)
}

fn regex_syntax_char(c: char) -> bool {
    matches!(
        c,
        '\\' | '.' | '+' | '*' | '?' | '(' | ')' | '|' | '[' | ']' | '{' | '}' | '^' | '$' | '#'
            | '&' | '-' | '~'
    )
}

/// Translate a substitute replacement into `regex` expansion syntax: `&` and `\0` are the
/// whole match, `\1`-`\9` groups, `\n`/`\r` a newline, `\t` a tab, `\&` a literal `&`.
pub fn convert_replacement(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        match c {
            '&' => out.push_str("${0}"),
            '$' => out.push_str("$$"),
            '\\' => match chars.next() {
                Some(d @ '0'..='9') => {
                    out.push_str("${");
                    out.push(d);
                    out.push('}');
                }
                Some('n' | 'r') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some(other) => out.push(other),
                None => out.push('\\'),
            },
            other => out.push(other),
        }
    }
    out
}

/// Char cursor over the command text.
struct Cursor<'a> {
    s: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(s: &'a str) -> Self {
        Self { s, pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.s[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, want: char) -> bool {
        if self.peek() == Some(want) {
            self.pos += want.len_utf8();
            true
        } else {
            false
        }
    }

    fn skip_blanks(&mut self) {
        while matches!(self.peek(), Some(' ' | '\t')) {
            self.pos += 1;
        }
    }

    fn rest(&self) -> &'a str {
        &self.s[self.pos..]
    }

    fn number(&mut self) -> Option<usize> {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
        }
        let digits = &self.s[start..self.pos];
        if digits.is_empty() {
            return None;
        }
        Some(digits.parse().unwrap_or(usize::MAX))
    }

    fn range(&mut self) -> Result<Option<LineRange>, EditError> {
        if self.eat('%') {
            return Ok(Some(LineRange::Whole));
        }
        let Some(first) = self.address()? else {
            if self.eat(',') {
                let second = self.address()?.unwrap_or(CURRENT);
                return Ok(Some(LineRange::Pair(CURRENT, second)));
            }
            return Ok(None);
        };
        if self.eat(',') || self.eat(';') {
            let second = self.address()?.unwrap_or(CURRENT);
            return Ok(Some(LineRange::Pair(first, second)));
        }
        Ok(Some(LineRange::Single(first)))
    }

    fn address(&mut self) -> Result<Option<LineAddress>, EditError> {
        self.skip_blanks();
        let base = match self.peek() {
            Some(c) if c.is_ascii_digit() => self.number().map(Address::Line),
            Some('.') => {
                self.bump();
                Some(Address::Current)
            }
            Some('$') => {
                self.bump();
                Some(Address::Last)
            }
            Some('\'') => {
                self.bump();
                match self.bump() {
                    Some(c) => Some(Address::Mark(c)),
                    None => return Err(EditError::InvalidRange),
                }
            }
            _ => None,
        };
        let mut offset: isize = 0;
        let mut adjusted = false;
        loop {
            self.skip_blanks();
            let sign: isize = match self.peek() {
                Some('+') => 1,
                Some('-') => -1,
                _ => break,
            };
            self.bump();
            let n = self.number().unwrap_or(1);
            let n = isize::try_from(n).unwrap_or(isize::MAX);
            offset = offset.saturating_add(sign.saturating_mul(n));
            adjusted = true;
        }
        Ok(match (base, adjusted) {
            (Some(base), _) => Some(LineAddress { base, offset }),
            (None, true) => Some(LineAddress {
                base: Address::Current,
                offset,
            }),
            (None, false) => None,
        })
    }

    /// Command name: a run of letters, or a run of `>` / `<`.
    fn name(&mut self) -> String {
        let start = self.pos;
        match self.peek() {
            Some(c @ ('>' | '<')) => {
                while self.peek() == Some(c) {
                    self.pos += 1;
                }
            }
            _ => {
                while self.peek().is_some_and(|c| c.is_ascii_alphabetic()) {
                    self.pos += 1;
                }
            }
        }
        self.s[start..self.pos].to_string()
    }
}

const CURRENT: LineAddress = LineAddress {
    base: Address::Current,
    offset: 0,
};
