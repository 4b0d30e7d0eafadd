#![allow(dead_code)] // Shared across many integration tests; each test binary uses a subset of helpers.

use std::sync::{Arc, Mutex};

use core_actions::{Clipboard, Editor};
use core_events::ClipboardTicket;

/// Editor over `text` after replaying `keys`.
pub fn run(text: &str, keys: &str) -> Editor {
    let mut ed = Editor::from_text(text);
    ed.dispatch_keys(keys);
    ed
}

/// What a [`RecordingClipboard`] has seen.
#[derive(Debug, Default)]
pub struct ClipboardLog {
    pub writes: Vec<String>,
    pub requests: Vec<ClipboardTicket>,
}

/// Clipboard double that records writes and read requests without answering them.
#[derive(Debug, Clone, Default)]
pub struct RecordingClipboard {
    pub log: Arc<Mutex<ClipboardLog>>,
}

impl RecordingClipboard {
    pub fn new() -> (Self, Arc<Mutex<ClipboardLog>>) {
        let clip = Self::default();
        let log = Arc::clone(&clip.log);
        (clip, log)
    }
}

impl Clipboard for RecordingClipboard {
    fn write(&mut self, text: &str) {
        self.log.lock().unwrap().writes.push(text.to_string());
    }

    fn request_read(&mut self, ticket: ClipboardTicket) {
        self.log.lock().unwrap().requests.push(ticket);
    }
}

/// Editor with a [`RecordingClipboard`] attached.
pub fn with_clipboard(text: &str) -> (Editor, Arc<Mutex<ClipboardLog>>) {
    let mut ed = Editor::from_text(text);
    let (clip, log) = RecordingClipboard::new();
    ed.set_clipboard(Some(Box::new(clip)));
    (ed, log)
}
