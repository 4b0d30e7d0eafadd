//! Core event types shared by the engine and its hosts.
//!
//! The engine consumes exactly one kind of live input, a [`KeyEvent`]. Hosts that
//! drive the engine from an event loop (terminal front-ends, the headless runner)
//! funnel key presses and asynchronous collaborator completions (clipboard reads)
//! through [`Event`] so both arrive in the order the host observed them.

use std::fmt;

pub mod notation;

pub use notation::{format_keys, parse_keys};

// -------------------------------------------------------------------------------------------------
// Channel Policy
// -------------------------------------------------------------------------------------------------
// Hosts feeding the engine over a bounded mpsc channel should size it with `EVENT_CHANNEL_CAP`.
// Key processing is strictly sequential: the consumer fully dispatches one event before it
// receives the next, so the capacity only bounds how far producers can run ahead.
// -------------------------------------------------------------------------------------------------
pub const EVENT_CHANNEL_CAP: usize = 8192;

/// Top-level event enum consumed by a host event loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A live key press.
    Key(KeyEvent),
    /// Completion of an asynchronous clipboard read previously requested by the engine.
    ClipboardResolved {
        ticket: ClipboardTicket,
        text: String,
    },
    Shutdown,
}

/// Identifier attached to an asynchronous clipboard read. Tickets are issued in strictly
/// increasing order; only the most recent one is ever honored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClipboardTicket(pub u64);

impl ClipboardTicket {
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub mods: KeyModifiers,
}

impl KeyEvent {
    pub const fn new(code: KeyCode, mods: KeyModifiers) -> Self {
        Self { code, mods }
    }

    /// Plain printable key without modifiers.
    pub const fn char(c: char) -> Self {
        Self {
            code: KeyCode::Char(c),
            mods: KeyModifiers::empty(),
        }
    }

    /// Control chord (`<C-x>`).
    pub const fn ctrl(c: char) -> Self {
        Self {
            code: KeyCode::Char(c),
            mods: KeyModifiers::CTRL,
        }
    }

    pub const fn plain(code: KeyCode) -> Self {
        Self {
            code,
            mods: KeyModifiers::empty(),
        }
    }

    pub fn is_ctrl(&self, c: char) -> bool {
        self.mods.contains(KeyModifiers::CTRL) && self.code == KeyCode::Char(c)
    }

    /// Returns the printable character when the key carries no control/alt modifier.
    pub fn printable(&self) -> Option<char> {
        match self.code {
            KeyCode::Char(c)
                if !self
                    .mods
                    .intersects(KeyModifiers::CTRL | KeyModifiers::ALT) =>
            {
                Some(c)
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Normalized logical key representations consumed by the engine.
pub enum KeyCode {
    Char(char),
    Enter,
    Esc,
    Backspace,
    Delete,
    Tab,
    Up,
    Down,
    Left,
    Right,
}

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct KeyModifiers: u8 {
        const CTRL = 0b0000_0001;
        const ALT  = 0b0000_0010;
        const SHIFT= 0b0000_0100;
    }
}

impl fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_keys(std::slice::from_ref(self)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_event_display_uses_notation() {
        assert_eq!(KeyEvent::ctrl('r').to_string(), "<C-r>");
        assert_eq!(KeyEvent::char('x').to_string(), "x");
        assert_eq!(KeyEvent::plain(KeyCode::Esc).to_string(), "<Esc>");
    }

    #[test]
    fn printable_rejects_control_chords() {
        assert_eq!(KeyEvent::char('a').printable(), Some('a'));
        assert_eq!(KeyEvent::ctrl('a').printable(), None);
        assert_eq!(KeyEvent::plain(KeyCode::Enter).printable(), None);
    }

    #[test]
    fn tickets_increase() {
        let t = ClipboardTicket(7);
        assert!(t.next() > t);
    }
}
