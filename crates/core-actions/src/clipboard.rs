//! Clipboard collaborator interface.
//!
//! Writes are fire-and-forget. Reads are asynchronous: the engine hands out a
//! [`ClipboardTicket`] through [`Clipboard::request_read`] and the host answers later with
//! [`Editor::resolve_clipboard_read`](crate::Editor::resolve_clipboard_read). Only the most
//! recently issued ticket is honored.

use core_events::ClipboardTicket;

pub trait Clipboard: Send {
    /// Mirror register text to the system clipboard.
    fn write(&mut self, text: &str);
    /// Start reading the system clipboard; the answer must carry `ticket`.
    fn request_read(&mut self, ticket: ClipboardTicket);
}

/// A paste waiting for its clipboard read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PendingPaste {
    pub ticket: ClipboardTicket,
    pub register: char,
    pub before: bool,
    pub count: usize,
}
