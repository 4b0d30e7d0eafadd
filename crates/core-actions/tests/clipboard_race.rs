mod common;
use common::*;

use std::time::Duration;

use core_actions::{Clipboard, Editor};
use core_events::{ClipboardTicket, Event, KeyEvent};
use core_state::Mode;
use pretty_assertions::assert_eq;
use tokio::sync::mpsc;

/// System clipboard stand-in: every read is answered on the event channel after a delay that
/// shrinks with each request, so later reads overtake earlier ones.
struct SlowClipboard {
    requests: mpsc::UnboundedSender<ClipboardTicket>,
}

impl Clipboard for SlowClipboard {
    fn write(&mut self, _text: &str) {}

    fn request_read(&mut self, ticket: ClipboardTicket) {
        let _ = self.requests.send(ticket);
    }
}

fn spawn_clipboard_service(
    mut requests: mpsc::UnboundedReceiver<ClipboardTicket>,
    events: mpsc::Sender<Event>,
) {
    tokio::spawn(async move {
        let mut delay = 40;
        while let Some(ticket) = requests.recv().await {
            let events = events.clone();
            let wait = Duration::from_millis(delay);
            delay = delay.saturating_sub(30);
            tokio::spawn(async move {
                tokio::time::sleep(wait).await;
                let text = format!("clip{}", ticket.0);
                let _ = events.send(Event::ClipboardResolved { ticket, text }).await;
            });
        }
    });
}

#[tokio::test]
async fn second_paste_wins_over_stale_resolution() {
    let (req_tx, req_rx) = mpsc::unbounded_channel();
    let (ev_tx, mut ev_rx) = mpsc::channel::<Event>(16);
    spawn_clipboard_service(req_rx, ev_tx.clone());

    let mut ed = Editor::from_text("x\n");
    ed.set_clipboard(Some(Box::new(SlowClipboard { requests: req_tx })));

    for key in core_events::parse_keys("\"*p\"*p") {
        ev_tx.send(Event::Key(key)).await.unwrap();
    }

    let mut resolutions = 0;
    while resolutions < 2 {
        let ev = tokio::time::timeout(Duration::from_secs(2), ev_rx.recv())
            .await
            .expect("clipboard answers arrive")
            .expect("channel open");
        match ev {
            Event::Key(key) => {
                ed.dispatch_key(key);
            }
            Event::ClipboardResolved { ticket, text } => {
                ed.resolve_clipboard_read(ticket, text);
                resolutions += 1;
            }
            Event::Shutdown => break,
        }
    }

    assert_eq!(ed.buffer_text(), "xclip2\n");
    assert_eq!(ed.registers().get('*'), Some("clip2"));
    assert_eq!(ed.undo_depth(), 1);
}

#[test]
fn stale_ticket_is_discarded_even_when_it_arrives_last() {
    let (mut ed, log) = with_clipboard("x\n");
    ed.dispatch_keys("\"+p\"+P");
    let requests = log.lock().unwrap().requests.clone();
    assert_eq!(requests, vec![ClipboardTicket(1), ClipboardTicket(2)]);

    let r = ed.resolve_clipboard_read(ClipboardTicket(2), "new".into());
    assert!(r.dirty);
    assert_eq!(ed.buffer_text(), "newx\n");
    let r = ed.resolve_clipboard_read(ClipboardTicket(1), "old".into());
    assert!(!r.dirty);
    assert_eq!(ed.buffer_text(), "newx\n");
    assert_eq!(ed.registers().get('+'), Some("new"));
}

#[test]
fn yank_to_clipboard_register_mirrors_text() {
    let (mut ed, log) = with_clipboard("hello world\n");
    ed.dispatch_keys("\"*yiw");
    assert_eq!(log.lock().unwrap().writes, vec!["hello".to_string()]);
    assert_eq!(ed.registers().get('*'), Some("hello"));
    ed.dispatch_keys("\"ayiw");
    assert_eq!(log.lock().unwrap().writes.len(), 1);
}

#[test]
fn without_clipboard_star_is_an_ordinary_register() {
    let mut ed = Editor::from_text("ab\n");
    ed.dispatch_keys("\"*yl\"*p");
    assert_eq!(ed.buffer_text(), "aab\n");
}

#[test]
fn empty_clipboard_answer_fails_softly() {
    let (mut ed, _log) = with_clipboard("ab\n");
    ed.dispatch_keys("\"*p");
    let r = ed.resolve_clipboard_read(ClipboardTicket(1), String::new());
    assert!(r.failed);
    assert_eq!(ed.buffer_text(), "ab\n");
    assert_eq!(ed.status(), Some("E353: Nothing in register *"));
}

#[test]
fn keys_keep_flowing_while_a_read_is_pending() {
    let (mut ed, _log) = with_clipboard("abc\n");
    ed.dispatch_keys("\"*p");
    ed.dispatch_key(KeyEvent::char('x'));
    assert_eq!(ed.buffer_text(), "bc\n");
    ed.resolve_clipboard_read(ClipboardTicket(1), "Z".into());
    assert_eq!(ed.buffer_text(), "bZc\n");
}

#[test]
fn answer_during_insert_keeps_the_session_whole() {
    let (mut ed, _log) = with_clipboard("abc\n");
    ed.dispatch_keys("\"*pAxy");
    let r = ed.resolve_clipboard_read(ClipboardTicket(1), "CLIP".into());
    assert!(!r.dirty);
    assert_eq!(ed.mode(), Mode::Insert);
    assert_eq!(ed.registers().get('*'), Some("CLIP"));
    ed.dispatch_keys("z<Esc>");
    assert_eq!(ed.buffer_text(), "abcxyz\n");
    assert_eq!(ed.undo_depth(), 1);
    ed.dispatch_keys(".");
    assert_eq!(ed.buffer_text(), "abcxyzxyz\n");
    ed.dispatch_keys("uu");
    assert_eq!(ed.buffer_text(), "abc\n");
}

#[test]
fn answer_during_visual_or_command_line_only_fills_register() {
    let (mut ed, _log) = with_clipboard("abc\n");
    ed.dispatch_keys("\"*pvl");
    ed.resolve_clipboard_read(ClipboardTicket(1), "Q".into());
    assert_eq!(ed.mode(), Mode::Visual);
    assert_eq!(ed.buffer_text(), "abc\n");
    assert_eq!(ed.registers().get('*'), Some("Q"));
    ed.dispatch_keys("<Esc>\"+p:");
    ed.resolve_clipboard_read(ClipboardTicket(2), "R".into());
    assert_eq!(ed.mode(), Mode::CommandLine);
    assert_eq!(ed.command_line(), ":");
    assert_eq!(ed.buffer_text(), "abc\n");
    assert_eq!(ed.undo_depth(), 0);
}

#[test]
fn late_answer_after_mode_change_is_not_replayed_later() {
    let (mut ed, _log) = with_clipboard("abc\n");
    ed.dispatch_keys("\"*pi");
    ed.resolve_clipboard_read(ClipboardTicket(1), "L".into());
    ed.dispatch_keys("q<Esc>");
    let r = ed.resolve_clipboard_read(ClipboardTicket(1), "L".into());
    assert!(!r.dirty);
    assert_eq!(ed.buffer_text(), "qabc\n");
    assert_eq!(ed.undo_depth(), 1);
}

#[test]
fn resolved_paste_is_one_undo_step() {
    let (mut ed, _log) = with_clipboard("abc\n");
    ed.dispatch_keys("\"*p");
    ed.resolve_clipboard_read(ClipboardTicket(1), "Z".into());
    assert_eq!(ed.buffer_text(), "aZbc\n");
    assert_eq!(ed.undo_depth(), 1);
    ed.dispatch_keys("u");
    assert_eq!(ed.buffer_text(), "abc\n");
    assert_eq!(ed.cursor(), 0);
    ed.dispatch_keys("<C-r>");
    assert_eq!(ed.buffer_text(), "aZbc\n");
}

#[test]
fn macro_playback_issues_a_fresh_ticket() {
    let (mut ed, log) = with_clipboard("abc\n");
    ed.dispatch_keys("qa\"*pq@a");
    let requests = log.lock().unwrap().requests.clone();
    assert_eq!(requests, vec![ClipboardTicket(1), ClipboardTicket(2)]);
    let stale = ed.resolve_clipboard_read(ClipboardTicket(1), "old".into());
    assert!(!stale.dirty);
    assert_eq!(ed.buffer_text(), "abc\n");
    ed.resolve_clipboard_read(ClipboardTicket(2), "M".into());
    assert_eq!(ed.buffer_text(), "aMbc\n");
    assert_eq!(ed.undo_depth(), 1);
}
