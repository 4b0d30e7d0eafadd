//! Motion sub-dispatch (cursor movement and operator targets).
//!
//! A motion repeated `count` times runs its primitive on the offset left by the previous
//! iteration. The whole motion fails only when the first iteration cannot move; later
//! iterations stop quietly at the edge. Up/down keep a sticky display column across lines of
//! unequal length, including across the iterations of one counted motion.

use super::Editor;
use crate::{EditError, MotionClass, MotionKind};
use core_text::motion::{self, FindSpec};
use tracing::trace;

/// Apply `step` up to `n` times, stopping at the first step that cannot move.
fn repeat_step(origin: usize, n: usize, mut step: impl FnMut(usize) -> Option<usize>) -> Option<usize> {
    let mut at = step(origin)?;
    for _ in 1..n {
        match step(at) {
            Some(next) => at = next,
            None => break,
        }
    }
    Some(at)
}

/// [`repeat_step`] for primitives that report "no move" by returning their input.
fn repeat_moving(origin: usize, n: usize, mut step: impl FnMut(usize) -> usize) -> Option<usize> {
    repeat_step(origin, n, |at| {
        let next = step(at);
        (next != at).then_some(next)
    })
}

impl Editor {
    pub(super) fn move_cursor(
        &mut self,
        kind: MotionKind,
        count: Option<usize>,
    ) -> Result<(), EditError> {
        let from = self.state.buffer.cursor();
        let to = self.motion_target(kind, count, from, false)?;
        self.sticky_col = match kind {
            MotionKind::Up | MotionKind::Down => Some(
                self.sticky_col
                    .unwrap_or_else(|| motion::display_column(&self.state.buffer, from)),
            ),
            MotionKind::LineEnd => Some(usize::MAX),
            _ => None,
        };
        self.state.buffer.set_cursor(to);
        trace!(target: "actions.dispatch", motion = ?kind, from, to, "motion");
        Ok(())
    }

    /// Operator classification of `kind`. Repeat-find takes the direction of the search it
    /// repeats; `N%` is linewise.
    pub(super) fn motion_class(&self, kind: MotionKind, count: Option<usize>) -> MotionClass {
        match kind {
            MotionKind::RepeatFind | MotionKind::RepeatFindReverse => {
                let forward = self
                    .last_find
                    .is_none_or(|s| s.forward == (kind == MotionKind::RepeatFind));
                if forward {
                    MotionClass::INCLUSIVE
                } else {
                    MotionClass::EXCLUSIVE
                }
            }
            MotionKind::MatchingBracket if count.is_some() => MotionClass::LINEWISE,
            _ => kind.class(),
        }
    }

    /// Where `kind` lands from `origin`. `pending_op` allows `l` onto the end-of-line position.
    pub(super) fn motion_target(
        &mut self,
        kind: MotionKind,
        count: Option<usize>,
        origin: usize,
        pending_op: bool,
    ) -> Result<usize, EditError> {
        let n = count.unwrap_or(1).max(1);
        match kind {
            MotionKind::Find(spec) => {
                self.last_find = Some(spec);
                return self.find(origin, spec, n, false);
            }
            MotionKind::RepeatFind | MotionKind::RepeatFindReverse => {
                let spec = self.last_find.ok_or(EditError::NoPreviousFind)?;
                let spec = if kind == MotionKind::RepeatFindReverse {
                    FindSpec {
                        forward: !spec.forward,
                        ..spec
                    }
                } else {
                    spec
                };
                return self.find(origin, spec, n, true);
            }
            MotionKind::Mark { name, linewise } => return self.mark_target(name, linewise),
            _ => {}
        }

        let buf = &self.state.buffer;
        let want = self
            .sticky_col
            .unwrap_or_else(|| motion::display_column(buf, origin));
        let lines = isize::try_from(n).unwrap_or(isize::MAX);
        let line = buf.line_of(origin);
        let last = buf.last_line();
        let target = match kind {
            MotionKind::Left => repeat_step(origin, n, |at| motion::left(buf, at)),
            MotionKind::Right => repeat_step(origin, n, |at| motion::right(buf, at, pending_op)),
            MotionKind::Up => motion::vertical(buf, origin, -lines, want),
            MotionKind::Down => motion::vertical(buf, origin, lines, want),
            MotionKind::WordForward => {
                repeat_moving(origin, n, |at| motion::word_forward(buf, at, false))
            }
            MotionKind::BigWordForward => {
                repeat_moving(origin, n, |at| motion::word_forward(buf, at, true))
            }
            MotionKind::WordBackward => {
                repeat_moving(origin, n, |at| motion::word_backward(buf, at, false))
            }
            MotionKind::BigWordBackward => {
                repeat_moving(origin, n, |at| motion::word_backward(buf, at, true))
            }
            MotionKind::WordEnd => repeat_moving(origin, n, |at| motion::word_end(buf, at, false)),
            MotionKind::BigWordEnd => {
                repeat_moving(origin, n, |at| motion::word_end(buf, at, true))
            }
            MotionKind::WordEndBackward => {
                repeat_moving(origin, n, |at| motion::word_end_backward(buf, at, false))
            }
            MotionKind::BigWordEndBackward => {
                repeat_moving(origin, n, |at| motion::word_end_backward(buf, at, true))
            }
            MotionKind::LineStart => Some(buf.line_start(line)),
            MotionKind::FirstNonBlank => Some(buf.first_non_blank(line)),
            MotionKind::LineEnd => line
                .checked_add(n - 1)
                .filter(|&l| l <= last)
                .map(|l| buf.last_char_on_line(l)),
            MotionKind::NextLineStart => line
                .checked_add(n)
                .filter(|&l| l <= last)
                .map(|l| buf.first_non_blank(l)),
            MotionKind::PrevLineStart => line.checked_sub(n).map(|l| buf.first_non_blank(l)),
            MotionKind::DocStart => Some(motion::goto_line(buf, count.unwrap_or(1))),
            MotionKind::DocEnd => Some(match count {
                Some(target) => motion::goto_line(buf, target),
                None => buf.first_non_blank(last),
            }),
            MotionKind::ParagraphForward => {
                repeat_moving(origin, n, |at| motion::paragraph_forward(buf, at))
            }
            MotionKind::ParagraphBackward => {
                repeat_moving(origin, n, |at| motion::paragraph_backward(buf, at))
            }
            MotionKind::MatchingBracket => match count {
                Some(pct) if pct <= 100 => {
                    let target_line = (pct * buf.line_count()).div_ceil(100);
                    Some(motion::goto_line(buf, target_line))
                }
                Some(_) => None,
                None => {
                    return motion::matching_bracket(buf, origin)
                        .ok_or(EditError::NoMatchingBracket);
                }
            },
            MotionKind::Find(_)
            | MotionKind::RepeatFind
            | MotionKind::RepeatFindReverse
            | MotionKind::Mark { .. } => None,
        };
        target.ok_or(EditError::Blocked)
    }

    fn find(
        &self,
        origin: usize,
        spec: FindSpec,
        count: usize,
        repeat: bool,
    ) -> Result<usize, EditError> {
        motion::find_in_line(&self.state.buffer, origin, spec, count, repeat)
            .ok_or(EditError::CharNotFound(spec.ch))
    }

    /// Offset of mark `name`; `'<`/`'>` come from the last visual selection.
    fn mark_target(&self, name: char, linewise: bool) -> Result<usize, EditError> {
        let buf = &self.state.buffer;
        let len = buf.len_chars();
        let offset = match name {
            '<' => self.state.last_visual.map(|v| v.start.min(len)),
            '>' => self.state.last_visual.map(|v| v.end.min(len)),
            _ => self.state.marks.get(name, len),
        }
        .ok_or(EditError::MarkNotSet(name))?;
        Ok(if linewise {
            buf.first_non_blank(buf.line_of(offset))
        } else {
            offset
        })
    }
}
