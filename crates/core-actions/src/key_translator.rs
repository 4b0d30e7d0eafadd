//! KeyTranslator: stateful key -> [`Action`] translation.
//!
//! State machine:
//! * Idle: optional prefix `count` and register (`"x`) accumulate.
//! * OperatorPending(op): operator captured; digits 1-9 start a post-operator count, a leading
//!   `0` is the `LineStart` motion. The doubled operator key (`dd`, `>>`, `g~~`) applies it
//!   linewise; a motion, text object, or multi-key motion (`f`, `'`, `g`) completes it.
//! * PendingKey: a multi-key command waiting for its argument (`g`, `f{c}`, `r{c}`, `"x`,
//!   `m{a-z}`, `` `x ``, `q{a-z}`, `@{a-z}`, `i{obj}`).
//!
//! Counts multiply (`2d3w` => 6) and are clamped at `max_count`. Every resolution (action,
//! cancel, or invalid continuation) resets the whole state, so a register selection is single
//! use and never leaks into the following command. Insert and command-line keys bypass the
//! state machine.

use crate::text_object::{ObjectScope, TextObjectKind};
use crate::{Action, CommandKey, InsertKey, MotionKind, OperatorKind, OperatorTarget, VisualAction};
use crate::{InsertEntry, MotionKind::*};
use core_events::{KeyCode, KeyEvent, KeyModifiers};
use core_state::Mode;
use core_text::motion::FindSpec;

/// Multi-key command waiting for its next key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PendingKey {
    #[default]
    None,
    G,
    Find {
        forward: bool,
        till: bool,
    },
    Replace,
    Register,
    MarkSet,
    MarkJump {
        linewise: bool,
    },
    MacroRecord,
    MacroPlay,
    TextObject(ObjectScope),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingOperator {
    op: OperatorKind,
    count: Option<usize>,
}

/// Outcome of feeding one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Translation {
    /// Key absorbed; more keys are needed.
    Pending,
    Ready(Action),
    /// Pending state dropped on request (`<Esc>`); not a failure.
    Cancelled,
    /// Key has no meaning in the current state; pending state dropped.
    Invalid,
}

#[derive(Debug)]
pub struct KeyTranslator {
    count: Option<usize>,
    register: Option<char>,
    operator: Option<PendingOperator>,
    pending: PendingKey,
    /// Keys absorbed so far, for display.
    typed: String,
    max_count: usize,
}

impl Default for KeyTranslator {
    fn default() -> Self {
        Self::new(999_999)
    }
}

impl KeyTranslator {
    pub fn new(max_count: usize) -> Self {
        Self {
            count: None,
            register: None,
            operator: None,
            pending: PendingKey::None,
            typed: String::new(),
            max_count: max_count.max(1),
        }
    }

    /// Drop counts, operator, register selection and any pending key.
    pub fn reset(&mut self) {
        self.count = None;
        self.register = None;
        self.operator = None;
        self.pending = PendingKey::None;
        self.typed.clear();
    }

    pub fn is_idle(&self) -> bool {
        self.count.is_none()
            && self.register.is_none()
            && self.operator.is_none()
            && self.pending == PendingKey::None
    }

    /// Keys typed toward the command in progress (`2d`, `"a`).
    pub fn pending_display(&self) -> &str {
        &self.typed
    }

    pub fn pending_key(&self) -> PendingKey {
        self.pending
    }

    /// Core translation entrypoint. `recording` selects what a bare `q` means.
    pub fn translate(&mut self, mode: Mode, recording: bool, key: &KeyEvent) -> Translation {
        let out = match mode {
            Mode::Insert => insert_key(key)
                .map(|k| Translation::Ready(Action::InsertKey(k)))
                .unwrap_or(Translation::Cancelled),
            Mode::CommandLine => command_key(key)
                .map(|k| Translation::Ready(Action::CommandKey(k)))
                .unwrap_or(Translation::Cancelled),
            Mode::Normal | Mode::Visual | Mode::VisualLine => {
                self.translate_command(key, mode.is_visual(), recording)
            }
        };
        tracing::trace!(target: "actions.translate", mode = ?mode, key = %key, pending = ?self.pending, outcome = ?out, "translate_key");
        match out {
            Translation::Pending => self.typed.push_str(&key.to_string()),
            _ => self.reset(),
        }
        out
    }

    fn total_count(&self) -> Option<usize> {
        let post = self.operator.and_then(|o| o.count);
        match (self.count, post) {
            (None, None) => None,
            (a, b) => Some(
                a.unwrap_or(1)
                    .saturating_mul(b.unwrap_or(1))
                    .min(self.max_count),
            ),
        }
    }

    fn count_or_one(&self) -> usize {
        self.total_count().unwrap_or(1)
    }

    fn counting(&self) -> bool {
        match self.operator {
            Some(op) => op.count.is_some(),
            None => self.count.is_some(),
        }
    }

    fn push_digit(&mut self, digit: usize) {
        let max = self.max_count;
        let slot = match &mut self.operator {
            Some(op) => &mut op.count,
            None => &mut self.count,
        };
        let next = slot.unwrap_or(0).saturating_mul(10).saturating_add(digit).min(max);
        *slot = Some(next);
    }

    /// Complete a motion: apply the pending operator when there is one.
    fn finish_motion(&self, motion: MotionKind) -> Translation {
        let count = self.total_count();
        match self.operator {
            Some(p) => Translation::Ready(Action::Operator {
                op: p.op,
                target: OperatorTarget::Motion(motion),
                count,
                register: self.register,
            }),
            None => Translation::Ready(Action::Motion { motion, count }),
        }
    }

    fn operator_key(&mut self, op: OperatorKind, visual: bool) -> Translation {
        if visual {
            return self.visual(VisualAction::Operator {
                op,
                register: self.register,
            });
        }
        match self.operator {
            Some(p) if p.op == op => self.lines(op),
            Some(_) => Translation::Invalid,
            None => {
                self.operator = Some(PendingOperator { op, count: None });
                Translation::Pending
            }
        }
    }

    fn lines(&self, op: OperatorKind) -> Translation {
        Translation::Ready(Action::Operator {
            op,
            target: OperatorTarget::Lines,
            count: self.total_count(),
            register: self.register,
        })
    }

    fn normal_op(&self, op: OperatorKind, target: OperatorTarget) -> Translation {
        Translation::Ready(Action::Operator {
            op,
            target,
            count: self.total_count(),
            register: self.register,
        })
    }

    fn visual(&self, action: VisualAction) -> Translation {
        Translation::Ready(Action::Visual {
            action,
            count: self.total_count(),
        })
    }

    fn translate_command(&mut self, key: &KeyEvent, visual: bool, recording: bool) -> Translation {
        if self.pending != PendingKey::None {
            let pending = std::mem::take(&mut self.pending);
            return self.resolve_pending(pending, key, visual);
        }
        if key.code == KeyCode::Esc {
            return if self.is_idle() && visual {
                Translation::Ready(Action::ExitVisual)
            } else {
                Translation::Cancelled
            };
        }
        if key.mods.contains(KeyModifiers::CTRL) {
            return match key.code {
                KeyCode::Char('r') if self.operator.is_none() && !visual => {
                    Translation::Ready(Action::Redo {
                        count: self.count_or_one(),
                    })
                }
                _ => Translation::Invalid,
            };
        }
        let c = match key.code {
            KeyCode::Char(c) => c,
            KeyCode::Left | KeyCode::Backspace => return self.finish_motion(Left),
            KeyCode::Right => return self.finish_motion(Right),
            KeyCode::Up => return self.finish_motion(Up),
            KeyCode::Down => return self.finish_motion(Down),
            KeyCode::Enter => return self.finish_motion(NextLineStart),
            KeyCode::Delete if self.operator.is_none() => 'x',
            _ => return Translation::Invalid,
        };

        if c.is_ascii_digit() && (c != '0' || self.counting()) {
            self.push_digit((c as u8 - b'0') as usize);
            return Translation::Pending;
        }
        if let Some(motion) = simple_motion(c) {
            return self.finish_motion(motion);
        }
        match c {
            'f' | 't' | 'F' | 'T' => {
                self.pending = PendingKey::Find {
                    forward: c.is_ascii_lowercase(),
                    till: c.eq_ignore_ascii_case(&'t'),
                };
                return Translation::Pending;
            }
            '\'' | '`' => {
                self.pending = PendingKey::MarkJump {
                    linewise: c == '\'',
                };
                return Translation::Pending;
            }
            'g' => {
                self.pending = PendingKey::G;
                return Translation::Pending;
            }
            'd' => return self.operator_key(OperatorKind::Delete, visual),
            'y' => return self.operator_key(OperatorKind::Yank, visual),
            'c' => return self.operator_key(OperatorKind::Change, visual),
            '>' => return self.operator_key(OperatorKind::IndentRight, visual),
            '<' => return self.operator_key(OperatorKind::IndentLeft, visual),
            _ => {}
        }

        if let Some(p) = self.operator {
            return match c {
                '~' | 'u' | 'U' if p.op.doubled_key() == c => self.lines(p.op),
                'i' | 'a' => {
                    self.pending = PendingKey::TextObject(scope_for(c));
                    Translation::Pending
                }
                _ => Translation::Invalid,
            };
        }

        if visual {
            return self.translate_visual(c);
        }
        self.translate_normal(c, recording)
    }

    fn translate_normal(&mut self, c: char, recording: bool) -> Translation {
        let n = self.count_or_one();
        let action = match c {
            '"' => {
                self.pending = PendingKey::Register;
                return Translation::Pending;
            }
            'r' => {
                self.pending = PendingKey::Replace;
                return Translation::Pending;
            }
            'm' => {
                self.pending = PendingKey::MarkSet;
                return Translation::Pending;
            }
            '@' => {
                self.pending = PendingKey::MacroPlay;
                return Translation::Pending;
            }
            'q' if recording => Action::StopRecording,
            'q' => {
                self.pending = PendingKey::MacroRecord;
                return Translation::Pending;
            }
            'i' => Action::Insert {
                entry: InsertEntry::Insert,
                count: n,
            },
            'a' => Action::Insert {
                entry: InsertEntry::Append,
                count: n,
            },
            'I' => Action::Insert {
                entry: InsertEntry::InsertLineStart,
                count: n,
            },
            'A' => Action::Insert {
                entry: InsertEntry::AppendLineEnd,
                count: n,
            },
            'o' => Action::Insert {
                entry: InsertEntry::OpenBelow,
                count: n,
            },
            'O' => Action::Insert {
                entry: InsertEntry::OpenAbove,
                count: n,
            },
            'x' => return self.normal_op(OperatorKind::Delete, OperatorTarget::Motion(Right)),
            'X' => return self.normal_op(OperatorKind::Delete, OperatorTarget::Motion(Left)),
            'D' => return self.normal_op(OperatorKind::Delete, OperatorTarget::Motion(LineEnd)),
            'C' => return self.normal_op(OperatorKind::Change, OperatorTarget::Motion(LineEnd)),
            's' => return self.normal_op(OperatorKind::Change, OperatorTarget::Motion(Right)),
            'S' => return self.lines(OperatorKind::Change),
            'Y' => return self.lines(OperatorKind::Yank),
            '~' => Action::ToggleCaseChar { count: n },
            'J' => Action::Join {
                count: n,
                spaces: true,
            },
            'p' | 'P' => Action::Paste {
                before: c == 'P',
                count: n,
                register: self.register,
            },
            'u' => Action::Undo { count: n },
            '.' => Action::Repeat {
                count: self.total_count(),
            },
            'v' | 'V' => Action::EnterVisual { linewise: c == 'V' },
            ':' => Action::CommandLineStart,
            _ => return Translation::Invalid,
        };
        Translation::Ready(action)
    }

    fn translate_visual(&mut self, c: char) -> Translation {
        let reg = self.register;
        let line_op = |op| VisualAction::LineOperator { op, register: reg };
        let action = match c {
            '"' => {
                self.pending = PendingKey::Register;
                return Translation::Pending;
            }
            'r' => {
                self.pending = PendingKey::Replace;
                return Translation::Pending;
            }
            'i' | 'a' => {
                self.pending = PendingKey::TextObject(scope_for(c));
                return Translation::Pending;
            }
            'x' => VisualAction::Operator {
                op: OperatorKind::Delete,
                register: reg,
            },
            's' => VisualAction::Operator {
                op: OperatorKind::Change,
                register: reg,
            },
            '~' => VisualAction::Operator {
                op: OperatorKind::ToggleCase,
                register: reg,
            },
            'u' => VisualAction::Operator {
                op: OperatorKind::Lowercase,
                register: reg,
            },
            'U' => VisualAction::Operator {
                op: OperatorKind::Uppercase,
                register: reg,
            },
            'X' | 'D' => line_op(OperatorKind::Delete),
            'Y' => line_op(OperatorKind::Yank),
            'C' | 'S' | 'R' => line_op(OperatorKind::Change),
            'o' | 'O' => VisualAction::SwapEnds,
            'v' | 'V' => VisualAction::Switch { linewise: c == 'V' },
            'J' => VisualAction::Join { spaces: true },
            'p' | 'P' => VisualAction::Paste { register: reg },
            ':' => VisualAction::CommandLine,
            _ => return Translation::Invalid,
        };
        self.visual(action)
    }

    fn resolve_pending(&mut self, pending: PendingKey, key: &KeyEvent, visual: bool) -> Translation {
        if key.code == KeyCode::Esc {
            return Translation::Cancelled;
        }
        let ch = match key.code {
            KeyCode::Enter if pending == PendingKey::Replace => '\n',
            KeyCode::Tab => '\t',
            _ => match key.printable() {
                Some(c) => c,
                None => return Translation::Invalid,
            },
        };
        match pending {
            PendingKey::None => Translation::Invalid,
            PendingKey::G => self.resolve_g(ch, visual),
            PendingKey::Find { forward, till } => {
                self.finish_motion(Find(FindSpec { ch, forward, till }))
            }
            PendingKey::Replace if visual => self.visual(VisualAction::Replace(ch)),
            PendingKey::Replace => Translation::Ready(Action::Replace {
                ch,
                count: self.count_or_one(),
            }),
            PendingKey::Register => {
                if core_state::is_valid_register(ch) {
                    self.register = Some(ch);
                    Translation::Pending
                } else {
                    Translation::Invalid
                }
            }
            PendingKey::MarkSet => Translation::Ready(Action::SetMark(ch)),
            PendingKey::MarkJump { linewise } => self.finish_motion(Mark { name: ch, linewise }),
            PendingKey::MacroRecord => Translation::Ready(Action::StartRecording(ch)),
            PendingKey::MacroPlay => Translation::Ready(Action::PlayMacro {
                name: ch,
                count: self.count_or_one(),
            }),
            PendingKey::TextObject(scope) => {
                let Some(kind) = TextObjectKind::from_key(ch) else {
                    return Translation::Invalid;
                };
                match self.operator {
                    Some(p) => self.normal_op(p.op, OperatorTarget::Object(scope, kind)),
                    None if visual => self.visual(VisualAction::Object(scope, kind)),
                    None => Translation::Invalid,
                }
            }
        }
    }

    fn resolve_g(&mut self, ch: char, visual: bool) -> Translation {
        let case_op = match ch {
            'g' => return self.finish_motion(DocStart),
            'e' => return self.finish_motion(WordEndBackward),
            'E' => return self.finish_motion(BigWordEndBackward),
            'J' if self.operator.is_none() => {
                return if visual {
                    self.visual(VisualAction::Join { spaces: false })
                } else {
                    Translation::Ready(Action::Join {
                        count: self.count_or_one(),
                        spaces: false,
                    })
                };
            }
            '~' => OperatorKind::ToggleCase,
            'u' => OperatorKind::Lowercase,
            'U' => OperatorKind::Uppercase,
            _ => return Translation::Invalid,
        };
        self.operator_key(case_op, visual)
    }
}

fn scope_for(c: char) -> ObjectScope {
    if c == 'i' {
        ObjectScope::Inner
    } else {
        ObjectScope::Around
    }
}

/// Single-key motions shared by Normal, Visual and operator-pending states.
fn simple_motion(c: char) -> Option<MotionKind> {
    Some(match c {
        'h' => Left,
        'l' | ' ' => Right,
        'j' => Down,
        'k' => Up,
        '0' => LineStart,
        '^' => FirstNonBlank,
        '$' => LineEnd,
        'w' => WordForward,
        'b' => WordBackward,
        'e' => WordEnd,
        'W' => BigWordForward,
        'B' => BigWordBackward,
        'E' => BigWordEnd,
        '+' => NextLineStart,
        '-' => PrevLineStart,
        'G' => DocEnd,
        '}' => ParagraphForward,
        '{' => ParagraphBackward,
        '%' => MatchingBracket,
        ';' => RepeatFind,
        ',' => RepeatFindReverse,
        _ => return None,
    })
}

fn insert_key(key: &KeyEvent) -> Option<InsertKey> {
    if let Some(c) = key.printable() {
        return Some(InsertKey::Char(c));
    }
    Some(match key.code {
        KeyCode::Enter => InsertKey::Newline,
        KeyCode::Tab => InsertKey::Char('\t'),
        KeyCode::Backspace => InsertKey::Backspace,
        KeyCode::Delete => InsertKey::Delete,
        KeyCode::Left => InsertKey::Left,
        KeyCode::Right => InsertKey::Right,
        KeyCode::Up => InsertKey::Up,
        KeyCode::Down => InsertKey::Down,
        KeyCode::Esc => InsertKey::Exit,
        KeyCode::Char('c') if key.is_ctrl('c') => InsertKey::Exit,
        _ => return None,
    })
}

fn command_key(key: &KeyEvent) -> Option<CommandKey> {
    if let Some(c) = key.printable() {
        return Some(CommandKey::Char(c));
    }
    Some(match key.code {
        KeyCode::Enter => CommandKey::Submit,
        KeyCode::Backspace => CommandKey::Backspace,
        KeyCode::Esc => CommandKey::Cancel,
        KeyCode::Tab => CommandKey::Char('\t'),
        KeyCode::Char('c') if key.is_ctrl('c') => CommandKey::Cancel,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_events::parse_keys;
    use pretty_assertions::assert_eq;

    fn feed(tr: &mut KeyTranslator, mode: Mode, keys: &str) -> Vec<Translation> {
        parse_keys(keys)
            .iter()
            .map(|k| tr.translate(mode, false, k))
            .collect()
    }

    fn last(tr: &mut KeyTranslator, keys: &str) -> Translation {
        *feed(tr, Mode::Normal, keys).last().unwrap()
    }

    #[test]
    fn counts_multiply_across_operator() {
        let mut tr = KeyTranslator::default();
        assert_eq!(
            last(&mut tr, "2d3w"),
            Translation::Ready(Action::Operator {
                op: OperatorKind::Delete,
                target: OperatorTarget::Motion(WordForward),
                count: Some(6),
                register: None,
            })
        );
        assert!(tr.is_idle());
    }

    #[test]
    fn leading_zero_is_line_start() {
        let mut tr = KeyTranslator::default();
        assert_eq!(
            last(&mut tr, "0"),
            Translation::Ready(Action::Motion {
                motion: LineStart,
                count: None
            })
        );
        assert_eq!(
            last(&mut tr, "10l"),
            Translation::Ready(Action::Motion {
                motion: Right,
                count: Some(10)
            })
        );
        assert_eq!(
            last(&mut tr, "d0"),
            Translation::Ready(Action::Operator {
                op: OperatorKind::Delete,
                target: OperatorTarget::Motion(LineStart),
                count: None,
                register: None,
            })
        );
    }

    #[test]
    fn doubled_operator_is_linewise() {
        let mut tr = KeyTranslator::default();
        let expect = |op, count| {
            Translation::Ready(Action::Operator {
                op,
                target: OperatorTarget::Lines,
                count,
                register: None,
            })
        };
        assert_eq!(last(&mut tr, "3dd"), expect(OperatorKind::Delete, Some(3)));
        assert_eq!(last(&mut tr, ">>"), expect(OperatorKind::IndentRight, None));
        assert_eq!(last(&mut tr, "g~~"), expect(OperatorKind::ToggleCase, None));
        assert_eq!(last(&mut tr, "gUgU"), expect(OperatorKind::Uppercase, None));
        assert_eq!(last(&mut tr, "guu"), expect(OperatorKind::Lowercase, None));
    }

    #[test]
    fn register_prefix_is_single_use() {
        let mut tr = KeyTranslator::default();
        assert_eq!(
            last(&mut tr, "\"ayy"),
            Translation::Ready(Action::Operator {
                op: OperatorKind::Yank,
                target: OperatorTarget::Lines,
                count: None,
                register: Some('a'),
            })
        );
        assert_eq!(
            last(&mut tr, "p"),
            Translation::Ready(Action::Paste {
                before: false,
                count: 1,
                register: None
            })
        );
        assert_eq!(last(&mut tr, "\"#"), Translation::Invalid);
        assert!(tr.is_idle());
    }

    #[test]
    fn text_object_after_operator() {
        let mut tr = KeyTranslator::default();
        assert_eq!(
            last(&mut tr, "di("),
            Translation::Ready(Action::Operator {
                op: OperatorKind::Delete,
                target: OperatorTarget::Object(ObjectScope::Inner, TextObjectKind::Bracket('(', ')')),
                count: None,
                register: None,
            })
        );
        assert_eq!(last(&mut tr, "dq"), Translation::Invalid);
    }

    #[test]
    fn escape_cancels_pending_operator() {
        let mut tr = KeyTranslator::default();
        let out = feed(&mut tr, Mode::Normal, "3d<Esc>");
        assert_eq!(out.last(), Some(&Translation::Cancelled));
        assert!(tr.is_idle());
        assert_eq!(tr.pending_display(), "");
    }

    #[test]
    fn pending_display_tracks_typed_keys() {
        let mut tr = KeyTranslator::default();
        feed(&mut tr, Mode::Normal, "\"a2d");
        assert_eq!(tr.pending_display(), "\"a2d");
    }

    #[test]
    fn count_is_clamped() {
        let mut tr = KeyTranslator::new(50);
        assert_eq!(
            last(&mut tr, "99999j"),
            Translation::Ready(Action::Motion {
                motion: Down,
                count: Some(50)
            })
        );
    }

    #[test]
    fn find_and_replace_take_an_argument() {
        let mut tr = KeyTranslator::default();
        assert_eq!(
            last(&mut tr, "dt,"),
            Translation::Ready(Action::Operator {
                op: OperatorKind::Delete,
                target: OperatorTarget::Motion(Find(FindSpec {
                    ch: ',',
                    forward: true,
                    till: true
                })),
                count: None,
                register: None,
            })
        );
        assert_eq!(
            last(&mut tr, "3rx"),
            Translation::Ready(Action::Replace { ch: 'x', count: 3 })
        );
        assert_eq!(
            last(&mut tr, "r<CR>"),
            Translation::Ready(Action::Replace { ch: '\n', count: 1 })
        );
    }

    #[test]
    fn visual_operators_apply_immediately() {
        let mut tr = KeyTranslator::default();
        let out = feed(&mut tr, Mode::Visual, "\"bd");
        assert_eq!(
            out.last(),
            Some(&Translation::Ready(Action::Visual {
                action: VisualAction::Operator {
                    op: OperatorKind::Delete,
                    register: Some('b')
                },
                count: None
            }))
        );
        let out = feed(&mut tr, Mode::VisualLine, "iw");
        assert_eq!(
            out.last(),
            Some(&Translation::Ready(Action::Visual {
                action: VisualAction::Object(ObjectScope::Inner, TextObjectKind::Word),
                count: None
            }))
        );
        let out = feed(&mut tr, Mode::Visual, "<Esc>");
        assert_eq!(out, vec![Translation::Ready(Action::ExitVisual)]);
    }

    #[test]
    fn q_stops_only_while_recording() {
        let mut tr = KeyTranslator::default();
        let q = KeyEvent::char('q');
        assert_eq!(
            tr.translate(Mode::Normal, true, &q),
            Translation::Ready(Action::StopRecording)
        );
        assert_eq!(tr.translate(Mode::Normal, false, &q), Translation::Pending);
        assert_eq!(
            tr.translate(Mode::Normal, false, &KeyEvent::char('a')),
            Translation::Ready(Action::StartRecording('a'))
        );
    }

    #[test]
    fn insert_and_command_keys_bypass_state() {
        let mut tr = KeyTranslator::default();
        assert_eq!(
            feed(&mut tr, Mode::Insert, "d<CR><Esc>"),
            vec![
                Translation::Ready(Action::InsertKey(InsertKey::Char('d'))),
                Translation::Ready(Action::InsertKey(InsertKey::Newline)),
                Translation::Ready(Action::InsertKey(InsertKey::Exit)),
            ]
        );
        assert_eq!(
            feed(&mut tr, Mode::CommandLine, "w<BS><CR>"),
            vec![
                Translation::Ready(Action::CommandKey(CommandKey::Char('w'))),
                Translation::Ready(Action::CommandKey(CommandKey::Backspace)),
                Translation::Ready(Action::CommandKey(CommandKey::Submit)),
            ]
        );
    }
}
