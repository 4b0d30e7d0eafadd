//! Process-local clipboard answering reads on the runtime's clipboard channel.

use core_actions::Clipboard;
use core_events::{ClipboardTicket, Event};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tracing::{trace, warn};

#[derive(Debug, Clone)]
pub struct LocalClipboard {
    contents: Arc<Mutex<String>>,
    answers: mpsc::Sender<Event>,
}

impl LocalClipboard {
    pub fn new(answers: mpsc::Sender<Event>) -> Self {
        Self {
            contents: Arc::default(),
            answers,
        }
    }

    /// Shared handle on the stored text.
    pub fn contents(&self) -> Arc<Mutex<String>> {
        Arc::clone(&self.contents)
    }
}

impl Clipboard for LocalClipboard {
    fn write(&mut self, text: &str) {
        match self.contents.lock() {
            Ok(mut slot) => {
                slot.clear();
                slot.push_str(text);
            }
            Err(_) => warn!(target: "runtime.clipboard", "clipboard_lock_poisoned"),
        }
    }

    fn request_read(&mut self, ticket: ClipboardTicket) {
        let text = self
            .contents
            .lock()
            .map(|slot| slot.clone())
            .unwrap_or_default();
        trace!(target: "runtime.clipboard", ticket = ticket.0, chars = text.chars().count(), "read_requested");
        if let Err(e) = self
            .answers
            .try_send(Event::ClipboardResolved { ticket, text })
        {
            warn!(target: "runtime.clipboard", ticket = ticket.0, error = %e, "clipboard_answer_dropped");
        }
    }
}
