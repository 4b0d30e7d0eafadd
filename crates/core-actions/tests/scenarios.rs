mod common;
use common::*;

use core_actions::Editor;
use core_state::Mode;
use pretty_assertions::assert_eq;

#[test]
fn dw_deletes_word_plus_space() {
    let ed = run("hello world\n", "dw");
    assert_eq!(ed.buffer_text(), "world\n");
    assert_eq!(ed.registers().get('"'), Some("hello "));
    assert_eq!(ed.cursor(), 0);
    assert_eq!(ed.mode(), Mode::Normal);
}

#[test]
fn di_paren_deletes_closest_enclosing_pair() {
    let mut ed = Editor::from_text("(foo (bar) baz)");
    ed.dispatch_keys("fb");
    assert_eq!(ed.cursor(), 6);
    ed.dispatch_keys("di(");
    assert_eq!(ed.buffer_text(), "(foo () baz)");
    assert_eq!(ed.registers().get('"'), Some("bar"));
}

#[test]
fn three_dd_deletes_three_lines_as_one_unit() {
    let mut ed = Editor::from_text("l1\nl2\nl3\nl4\nl5\n");
    ed.dispatch_keys("3dd");
    assert_eq!(ed.buffer_text(), "l4\nl5\n");
    assert_eq!(ed.registers().get('"'), Some("l1\nl2\nl3\n"));
    assert_eq!(ed.undo_depth(), 1);
    ed.dispatch_keys("P");
    assert_eq!(ed.buffer_text(), "l1\nl2\nl3\nl4\nl5\n");
}

#[test]
fn uppercase_register_appends_yanks_in_order() {
    let ed = run("alpha beta\n", "\"ayiww\"Ayiw");
    assert_eq!(ed.registers().get('a'), Some("alphabeta"));
    let ed = run("one\ntwo\n", "\"ayyj\"Ayy");
    assert_eq!(ed.registers().get('a'), Some("one\ntwo\n"));
}

#[test]
fn counted_insert_and_dot_repeat_are_byte_identical() {
    let mut ed = Editor::from_text("\n");
    ed.dispatch_keys("3iab<Esc>");
    assert_eq!(ed.buffer_text(), "ababab\n");
    ed.dispatch_keys(".");
    assert_eq!(ed.buffer_text(), "abababababab\n");
    ed.dispatch_keys("2.");
    assert_eq!(ed.buffer_text(), "abababababababab\n");
}

#[test]
fn operators_compose_with_counts() {
    assert_eq!(run("a b c d e f\n", "2d3w").buffer_text(), "\n");
    assert_eq!(run("a b c d e f\n", "2d2w").buffer_text(), "e f\n");
    assert_eq!(run("x\n", "5x").buffer_text(), "\n");
}

#[test]
fn change_then_repeat_across_lines() {
    let mut ed = Editor::from_text("foo = 1\nfoo = 2\n");
    ed.dispatch_keys("ciwbar<Esc>j0.");
    assert_eq!(ed.buffer_text(), "bar = 1\nbar = 2\n");
    ed.dispatch_keys("uu");
    assert_eq!(ed.buffer_text(), "foo = 1\nfoo = 2\n");
}

#[test]
fn failed_keys_leave_no_pending_state() {
    let mut ed = Editor::from_text("abc\n");
    let r = ed.dispatch_keys("dfz");
    assert!(r.failed);
    assert_eq!(ed.pending_display(), "");
    assert_eq!(ed.buffer_text(), "abc\n");
    ed.dispatch_keys("x");
    assert_eq!(ed.buffer_text(), "bc\n");
}

#[test]
fn cjk_runs_are_single_words() {
    let ed = run("漢字かな abc\n", "dw");
    assert_eq!(ed.buffer_text(), "abc\n");
    let ed = run("漢字,abc\n", "dw");
    assert_eq!(ed.buffer_text(), ",abc\n");
}
