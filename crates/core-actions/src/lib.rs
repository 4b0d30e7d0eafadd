//! Key-driven modal editing engine.
//!
//! Live keys enter through [`Editor::dispatch_key`]. The [`KeyTranslator`] turns them into
//! [`Action`]s (a tagged command table resolved once per key); the dispatcher then routes each
//! action to the motion, operator, text-object, register, macro, repeat, or command-line
//! handlers, all of which receive the editor state explicitly.

use core_state::StateError;
use core_text::motion::FindSpec;
use thiserror::Error;

pub mod clipboard;
pub mod dispatcher;
pub mod key_translator;
pub mod span_resolver;
pub mod text_object;

pub use clipboard::Clipboard;
pub use dispatcher::{DispatchResult, Editor, HostRequest};
pub use key_translator::{KeyTranslator, Translation};
pub use span_resolver::Span;
pub use text_object::{ObjectScope, TextObjectKind};

/// Soft failures. None of them is fatal: the dispatcher turns an error into a status message
/// plus `DispatchResult::failed` and leaves the editor in a consistent state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("cannot move further")]
    Blocked,
    #[error("unknown key sequence")]
    UnknownKey,
    #[error("E20: Mark not set")]
    MarkNotSet(char),
    #[error("no match for text object")]
    NoTextObject,
    #[error("E348: Character not found: {0}")]
    CharNotFound(char),
    #[error("no previous character search")]
    NoPreviousFind,
    #[error("no matching bracket")]
    NoMatchingBracket,
    #[error("Nothing to undo")]
    NothingToUndo,
    #[error("Nothing to redo")]
    NothingToRedo,
    #[error("E353: Nothing in register {0}")]
    EmptyRegister(char),
    #[error(transparent)]
    State(#[from] StateError),
    #[error("E748: No previously used register")]
    NoPreviousMacro,
    #[error("macro register {0} is empty")]
    EmptyMacro(char),
    #[error("E169: Command too recursive")]
    MacroDepth,
    #[error("E30: No previous command line")]
    NoPreviousCommand,
    #[error("E492: Not an editor command: {0}")]
    UnknownCommand(String),
    #[error("E16: Invalid range")]
    InvalidRange,
    #[error("E486: Pattern not found: {0}")]
    PatternNotFound(String),
    #[error("E383: Invalid search string: {0}")]
    BadPattern(String),
    #[error("E488: Trailing characters: {0}")]
    TrailingCharacters(String),
    #[error("E471: Argument required")]
    ArgumentRequired,
    #[error("cannot join past the last line")]
    CannotJoin,
    #[error("E283: No marks matched")]
    NoMarks,
}

impl EditError {
    /// Failures that only "beep": they fail the key but leave no status message.
    pub fn is_silent(&self) -> bool {
        matches!(self, EditError::Blocked | EditError::UnknownKey)
    }
}

/// Motion identifiers. Classification lives in [`MotionKind::class`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionKind {
    Left,
    Right,
    Up,
    Down,
    WordForward,
    WordBackward,
    WordEnd,
    WordEndBackward,
    BigWordForward,
    BigWordBackward,
    BigWordEnd,
    BigWordEndBackward,
    LineStart,
    FirstNonBlank,
    LineEnd,
    /// `+` / `<CR>`
    NextLineStart,
    /// `-`
    PrevLineStart,
    /// `gg` (with a count: go to line N)
    DocStart,
    /// `G` (with a count: go to line N)
    DocEnd,
    ParagraphForward,
    ParagraphBackward,
    MatchingBracket,
    Find(FindSpec),
    RepeatFind,
    RepeatFindReverse,
    /// `` `x `` (exact, charwise) or `'x` (linewise).
    Mark { name: char, linewise: bool },
}

/// Inclusive/exclusive x charwise/linewise classification of a motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotionClass {
    pub inclusive: bool,
    pub linewise: bool,
}

impl MotionClass {
    pub const EXCLUSIVE: Self = Self {
        inclusive: false,
        linewise: false,
    };
    pub const INCLUSIVE: Self = Self {
        inclusive: true,
        linewise: false,
    };
    pub const LINEWISE: Self = Self {
        inclusive: false,
        linewise: true,
    };
}

impl MotionKind {
    /// Classification for operator spans. Repeat-find motions are classified by the caller
    /// from the search they repeat.
    pub fn class(self) -> MotionClass {
        use MotionKind::*;
        match self {
            Up | Down | NextLineStart | PrevLineStart | DocStart | DocEnd => MotionClass::LINEWISE,
            Mark { linewise: true, .. } => MotionClass::LINEWISE,
            WordEnd | WordEndBackward | BigWordEnd | BigWordEndBackward | LineEnd
            | MatchingBracket => MotionClass::INCLUSIVE,
            Find(spec) if spec.forward => MotionClass::INCLUSIVE,
            _ => MotionClass::EXCLUSIVE,
        }
    }

    pub fn is_vertical(self) -> bool {
        matches!(self, MotionKind::Up | MotionKind::Down)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorKind {
    Delete,
    Yank,
    Change,
    IndentRight,
    IndentLeft,
    ToggleCase,
    Lowercase,
    Uppercase,
}

impl OperatorKind {
    /// Key that, typed again, applies the operator linewise (`dd`, `>>`, `g~~`).
    pub fn doubled_key(self) -> char {
        match self {
            OperatorKind::Delete => 'd',
            OperatorKind::Yank => 'y',
            OperatorKind::Change => 'c',
            OperatorKind::IndentRight => '>',
            OperatorKind::IndentLeft => '<',
            OperatorKind::ToggleCase => '~',
            OperatorKind::Lowercase => 'u',
            OperatorKind::Uppercase => 'U',
        }
    }

    pub fn is_case(self) -> bool {
        matches!(
            self,
            OperatorKind::ToggleCase | OperatorKind::Lowercase | OperatorKind::Uppercase
        )
    }
}

/// What an operator applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorTarget {
    Motion(MotionKind),
    Object(ObjectScope, TextObjectKind),
    /// Doubled operator: `count` whole lines from the cursor line.
    Lines,
}

/// How an insert session positions the cursor before typing starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertEntry {
    /// `i`
    Insert,
    /// `a`
    Append,
    /// `I`
    InsertLineStart,
    /// `A`
    AppendLineEnd,
    /// `o`
    OpenBelow,
    /// `O`
    OpenAbove,
}

/// Keys meaningful inside Insert mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertKey {
    Char(char),
    Newline,
    Backspace,
    Delete,
    Left,
    Right,
    Up,
    Down,
    Exit,
}

/// Keys meaningful while typing a `:` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKey {
    Char(char),
    Backspace,
    Submit,
    Cancel,
}

/// Visual-mode commands operating on the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisualAction {
    Operator { op: OperatorKind, register: Option<char> },
    /// Force a linewise operator from charwise visual (`D`, `X`, `Y`, `C`, `S`, `R`).
    LineOperator { op: OperatorKind, register: Option<char> },
    SwapEnds,
    /// `v` / `V`: switch kind or leave when already in that kind.
    Switch { linewise: bool },
    Replace(char),
    Join { spaces: bool },
    Paste { register: Option<char> },
    Object(ObjectScope, TextObjectKind),
    CommandLine,
}

/// A fully resolved command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Motion {
        motion: MotionKind,
        count: Option<usize>,
    },
    Operator {
        op: OperatorKind,
        target: OperatorTarget,
        count: Option<usize>,
        register: Option<char>,
    },
    Insert {
        entry: InsertEntry,
        count: usize,
    },
    Replace {
        ch: char,
        count: usize,
    },
    ToggleCaseChar {
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
    Undo {
        count: usize,
    },
    Redo {
        count: usize,
    },
    Repeat {
        count: Option<usize>,
    },
    SetMark(char),
    StartRecording(char),
    StopRecording,
    PlayMacro {
        name: char,
        count: usize,
    },
    EnterVisual {
        linewise: bool,
    },
    Visual {
        action: VisualAction,
        count: Option<usize>,
    },
    ExitVisual,
    CommandLineStart,
    InsertKey(InsertKey),
    CommandKey(CommandKey),
}
