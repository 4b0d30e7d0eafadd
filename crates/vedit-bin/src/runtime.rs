//! Event loop driving the editor from a key script.
//!
//! Keys arrive on the main event channel from a producer task; clipboard answers arrive on a
//! second channel that is always drained first, so a paste issued by one key resolves before
//! the next scripted key is dispatched.

use crate::clipboard::LocalClipboard;
use crate::file_io::{self, LineEnding};
use anyhow::{Result, anyhow};
use core_actions::{Editor, HostRequest};
use core_events::{EVENT_CHANNEL_CAP, Event, KeyEvent};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

const NOT_SAVED: &str = "E37: No write since last change (add ! to override)";
const NO_FILE_NAME: &str = "E32: No file name";

/// The file behind the buffer.
#[derive(Debug, Clone, Default)]
pub struct Document {
    pub path: Option<PathBuf>,
    pub ending: LineEnding,
    /// Buffer text as of the last read or write.
    pub saved: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    ScriptEnd,
    Quit,
    ChannelClosed,
}

impl ShutdownReason {
    fn as_str(self) -> &'static str {
        match self {
            ShutdownReason::ScriptEnd => "script_end",
            ShutdownReason::Quit => "quit",
            ShutdownReason::ChannelClosed => "channel_closed",
        }
    }
}

enum LoopControl {
    Continue,
    Break(ShutdownReason),
}

pub struct EditorRuntime {
    editor: Editor,
    doc: Document,
    rx: mpsc::Receiver<Event>,
    clipboard_rx: mpsc::Receiver<Event>,
}

/// Send every scripted key, then `Shutdown`. Stops early once the loop closes its receiver.
pub fn spawn_key_script(keys: Vec<KeyEvent>, tx: mpsc::Sender<Event>) -> JoinHandle<()> {
    tokio::spawn(async move {
        for key in keys {
            if tx.send(Event::Key(key)).await.is_err() {
                trace!(target: "runtime", "key_script_receiver_closed");
                return;
            }
        }
        let _ = tx.send(Event::Shutdown).await;
    })
}

impl EditorRuntime {
    /// Build the runtime and return the sender producers feed events into.
    pub fn new(mut editor: Editor, doc: Document, clipboard: bool) -> (Self, mpsc::Sender<Event>) {
        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAP);
        let (clip_tx, clipboard_rx) = mpsc::channel(EVENT_CHANNEL_CAP);
        if clipboard {
            editor.set_clipboard(Some(Box::new(LocalClipboard::new(clip_tx))));
        }
        let runtime = Self {
            editor,
            doc,
            rx,
            clipboard_rx,
        };
        (runtime, tx)
    }

    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn is_modified(&self) -> bool {
        self.editor.buffer_text() != self.doc.saved
    }

    pub async fn run(&mut self) -> Result<ShutdownReason> {
        let span = tracing::debug_span!(target: "runtime", "event_loop");
        let _enter = span.enter();

        let mut reason = ShutdownReason::ChannelClosed;
        loop {
            let event = tokio::select! {
                biased;
                Some(ev) = self.clipboard_rx.recv() => ev,
                Some(ev) = self.rx.recv() => ev,
                else => break,
            };
            match self.handle_event(event) {
                LoopControl::Continue => {}
                LoopControl::Break(r) => {
                    reason = r;
                    break;
                }
            }
        }
        self.rx.close();
        info!(target: "runtime", reason = reason.as_str(), "event_loop_finished");
        Ok(reason)
    }

    fn handle_event(&mut self, event: Event) -> LoopControl {
        match event {
            Event::Key(key) => {
                let result = self.editor.dispatch_key(key);
                if result.failed {
                    debug!(target: "runtime", key = %key, status = ?self.editor.status(), "key_failed");
                }
                match result.host {
                    Some(request) => self.handle_host(request),
                    None => LoopControl::Continue,
                }
            }
            Event::ClipboardResolved { ticket, text } => {
                self.editor.resolve_clipboard_read(ticket, text);
                LoopControl::Continue
            }
            Event::Shutdown => LoopControl::Break(ShutdownReason::ScriptEnd),
        }
    }

    fn handle_host(&mut self, request: HostRequest) -> LoopControl {
        debug!(target: "runtime", ?request, "host_request");
        match request {
            HostRequest::Write { path } => {
                self.write_reporting(path.as_deref());
                LoopControl::Continue
            }
            HostRequest::WriteQuit { path } => {
                if self.write_reporting(path.as_deref()) {
                    LoopControl::Break(ShutdownReason::Quit)
                } else {
                    LoopControl::Continue
                }
            }
            HostRequest::Quit { force } => {
                if !force && self.is_modified() {
                    self.editor.set_status(NOT_SAVED);
                    LoopControl::Continue
                } else {
                    LoopControl::Break(ShutdownReason::Quit)
                }
            }
            HostRequest::Edit { path, force } => {
                if !force && self.is_modified() {
                    self.editor.set_status(NOT_SAVED);
                } else {
                    self.open(&path);
                }
                LoopControl::Continue
            }
        }
    }

    /// Write to `path` (or the document's own path) and report on the status line.
    fn write_reporting(&mut self, path: Option<&Path>) -> bool {
        match self.write(path) {
            Ok(msg) => {
                self.editor.set_status(msg);
                true
            }
            Err(e) => {
                warn!(target: "io", error = %e, "file_write_error");
                self.editor.set_status(e.to_string());
                false
            }
        }
    }

    /// Write the buffer. The first path given becomes the document's path.
    pub fn write(&mut self, path: Option<&Path>) -> Result<String> {
        let target = match (path, self.doc.path.as_ref()) {
            (Some(p), _) => p.to_path_buf(),
            (None, Some(p)) => p.clone(),
            (None, None) => return Err(anyhow!(NO_FILE_NAME)),
        };
        let text = self.editor.buffer_text();
        let bytes = file_io::write_document(&target, &text, self.doc.ending)?;
        let lines = text.lines().count();
        if self.doc.path.is_none() || path.is_none() {
            self.doc.saved = text;
        }
        if self.doc.path.is_none() {
            self.doc.path = Some(target.clone());
        }
        Ok(format!("\"{}\" {lines}L, {bytes}B written", target.display()))
    }

    fn open(&mut self, path: &Path) {
        match file_io::read_document(path) {
            Ok(norm) => {
                self.editor.replace_entire_buffer(&norm.text);
                let lines = norm.text.lines().count();
                self.doc = Document {
                    path: Some(path.to_path_buf()),
                    ending: norm.original,
                    saved: norm.text,
                };
                self.editor
                    .set_status(format!("\"{}\" {lines}L", path.display()));
            }
            Err(e) => {
                warn!(target: "io", error = %e, "file_open_error");
                self.editor
                    .set_status(format!("E484: Can't open file {}", path.display()));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_events::parse_keys;
    use pretty_assertions::assert_eq;

    async fn run_script(
        text: &str,
        doc: Document,
        keys: &str,
    ) -> (EditorRuntime, ShutdownReason) {
        let editor = Editor::from_text(text);
        let (mut rt, tx) = EditorRuntime::new(editor, doc, true);
        let feeder = spawn_key_script(parse_keys(keys), tx);
        let reason = rt.run().await.unwrap();
        feeder.await.unwrap();
        (rt, reason)
    }

    fn doc_at(path: &Path, text: &str) -> Document {
        Document {
            path: Some(path.to_path_buf()),
            ending: LineEnding::Lf,
            saved: text.to_string(),
        }
    }

    fn unnamed(text: &str) -> Document {
        Document {
            saved: text.to_string(),
            ..Document::default()
        }
    }

    #[tokio::test]
    async fn edit_refuses_unsaved_changes() {
        let (rt, _) = run_script("abc\n", Document::default(), ":e other.txt<CR>").await;
        assert_eq!(rt.editor().buffer_text(), "abc\n");
        assert_eq!(rt.editor().status(), Some(NOT_SAVED));
    }

    #[tokio::test]
    async fn script_runs_to_completion() {
        let (rt, reason) = run_script("hello world\n", Document::default(), "dwx").await;
        assert_eq!(reason, ShutdownReason::ScriptEnd);
        assert_eq!(rt.editor().buffer_text(), "orld\n");
    }

    #[tokio::test]
    async fn clipboard_paste_resolves_before_next_key() {
        let (rt, _) = run_script("ab\n", Document::default(), "\"+yl\"+px").await;
        assert_eq!(rt.editor().buffer_text(), "ab\n");
        let (rt, _) = run_script("ab\n", Document::default(), "\"+yl\"+p").await;
        assert_eq!(rt.editor().buffer_text(), "aab\n");
    }

    #[tokio::test]
    async fn write_quit_saves_and_stops_reading_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f.txt");
        std::fs::write(&path, "one\n").unwrap();
        let (rt, reason) = run_script("one\n", doc_at(&path, "one\n"), "xx:wq<CR>ddd").await;
        assert_eq!(reason, ShutdownReason::Quit);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "e\n");
        assert_eq!(rt.editor().buffer_text(), "e\n");
        assert!(!rt.is_modified());
    }

    #[tokio::test]
    async fn quit_refuses_unsaved_changes() {
        let (rt, reason) = run_script("abc\n", Document::default(), "x:q<CR>").await;
        assert_eq!(reason, ShutdownReason::ScriptEnd);
        assert_eq!(rt.editor().status(), Some(NOT_SAVED));
        let (_, reason) = run_script("abc\n", Document::default(), "x:q!<CR>x").await;
        assert_eq!(reason, ShutdownReason::Quit);
    }

    #[tokio::test]
    async fn write_without_name_fails_softly() {
        let (rt, _) = run_script("abc\n", Document::default(), ":w<CR>").await;
        assert_eq!(rt.editor().status(), Some(NO_FILE_NAME));
    }

    #[tokio::test]
    async fn edit_replaces_buffer_and_document() {
        let dir = tempfile::tempdir().unwrap();
        let other = dir.path().join("other.txt");
        std::fs::write(&other, "x\r\ny\r\n").unwrap();
        let keys = format!(":e {}<CR>dd", other.display());
        let (rt, _) = run_script("abc\n", unnamed("abc\n"), &keys).await;
        assert_eq!(rt.editor().buffer_text(), "y\n");
        assert_eq!(rt.document().ending, LineEnding::Crlf);
        assert_eq!(rt.document().path.as_deref(), Some(other.as_path()));
    }

    #[tokio::test]
    async fn edit_missing_file_keeps_buffer() {
        let (rt, _) = run_script("abc\n", unnamed("abc\n"), ":e __no_such_file__<CR>").await;
        assert_eq!(rt.editor().buffer_text(), "abc\n");
        assert_eq!(
            rt.editor().status(),
            Some("E484: Can't open file __no_such_file__")
        );
    }
}
