use line_editor_core::{
    EditorSession, LineEnding, LineType, MonospaceOracle, StateChangeType, TextPoint,
    load_document,
};
use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::sync::{Arc, Mutex};

fn texts(session: &EditorSession) -> Vec<String> {
    session
        .document()
        .lines()
        .iter()
        .map(|line| line.text().to_string())
        .collect()
}

fn indents(session: &EditorSession) -> Vec<usize> {
    session.document().lines().iter().map(|l| l.indent()).collect()
}

#[test]
fn test_new_list_item_under_heading() {
    let mut s = EditorSession::new("# Title\nsome text", MonospaceOracle::new(80)).unwrap();
    let doc = s.document();
    assert_eq!(doc.lines()[0].indent(), 0);
    assert_eq!(doc.lines()[0].section_level(), Some(1));
    assert_eq!(doc.lines()[1].indent(), 2);

    s.set_caret(TextPoint::new(1, usize::MAX));
    s.insert_new_line().unwrap();
    s.insert_text("- x").unwrap();

    let item = &s.document().lines()[2];
    assert_eq!(item.line_type(), LineType::List);
    assert_eq!(item.list_level(), Some(1));
    assert_eq!(item.indent(), 2);
    assert_eq!(s.caret_point(), TextPoint::new(2, 5));
}

#[test]
fn test_typing_an_outline() {
    let mut s = EditorSession::new("", MonospaceOracle::new(80)).unwrap();
    s.insert_text("# Plan").unwrap();
    s.insert_new_line().unwrap();
    assert_eq!(s.caret_point(), TextPoint::new(1, 2));

    s.insert_text("- step").unwrap();
    s.insert_new_line().unwrap();
    s.insert_text("-- sub").unwrap();
    s.insert_new_line().unwrap();
    s.insert_text("5. x").unwrap();

    assert_eq!(texts(&s), vec!["# Plan", "- step", "-- sub", "1. x"]);
    assert_eq!(indents(&s), vec![0, 2, 4, 2]);
    assert_eq!(s.caret_point(), TextPoint::new(3, 6));
}

const PIECES: &[&str] = &[
    "# Heading",
    "  ## Sub heading",
    "\t### Deep",
    "- bullet",
    "-- nested bullet",
    "--- deeper",
    "* star",
    "7. ordered",
    "-3. nested ordered",
    "#+title: Notes",
    "  #+tags: a b",
    "",
    "   ",
    "plain text",
    "    indented text with [a link](https://x.y)",
    "see https://example.com/page.",
    "#not a heading",
];

#[test]
fn test_load_round_trip_is_stable() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..200 {
        let count = rng.gen_range(1..25);
        let raw: Vec<&str> = (0..count)
            .map(|_| *PIECES.choose(&mut rng).unwrap_or(&""))
            .collect();
        let raw = raw.join("\n");

        let first = load_document(&raw).unwrap();
        let portable = first.to_portable_text();
        let second = load_document(&portable).unwrap();

        assert_eq!(second.to_portable_text(), portable, "raw {raw:?}");
        assert_eq!(second.len(), raw.split('\n').count());
        for (a, b) in first.lines().iter().zip(second.lines()) {
            assert_eq!(a.kind(), b.kind());
            assert_eq!(a.indent(), b.indent());
        }
    }
}

#[test]
fn test_crlf_document_exports_crlf() {
    let mut s = EditorSession::new("# A\r\nbody\r\n", MonospaceOracle::new(80)).unwrap();
    assert_eq!(s.line_ending(), LineEnding::Crlf);
    assert_eq!(s.portable_text(), "# A\nbody\n");

    s.set_caret(TextPoint::new(1, usize::MAX));
    s.insert_text("!").unwrap();
    assert_eq!(s.export_text(), "# A\r\nbody!\r\n");

    s.set_line_ending(LineEnding::Lf);
    assert_eq!(s.export_text(), "# A\nbody!\n");
}

#[test]
fn test_dirty_tracking_and_reload() {
    let mut s = EditorSession::new("draft", MonospaceOracle::new(80)).unwrap();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    s.subscribe(move |change| sink.lock().unwrap().push((change.change_type, change.is_dirty)));

    assert!(!s.is_dirty());
    s.set_caret(TextPoint::new(0, 5));
    s.insert_text("s").unwrap();
    assert!(s.is_dirty());

    s.mark_clean();
    assert!(!s.get_document_state().is_dirty);

    s.load_document("# Other\ntext").unwrap();
    assert!(!s.is_dirty());
    assert_eq!(s.caret_point(), TextPoint::new(0, 0));
    assert_eq!(s.document().lines()[1].indent(), 2);

    assert_eq!(
        *seen.lock().unwrap(),
        vec![
            (StateChangeType::CursorMoved, false),
            (StateChangeType::DocumentModified, true),
            (StateChangeType::DocumentLoaded, false),
        ]
    );
}

#[test]
fn test_sessions_are_independent() {
    let mut a = EditorSession::new("shared", MonospaceOracle::new(80)).unwrap();
    let mut b = EditorSession::new("shared", MonospaceOracle::new(20)).unwrap();

    a.set_caret(TextPoint::new(0, 6));
    a.insert_text(" a").unwrap();
    b.select_all();
    b.delete_selection().unwrap();

    assert_eq!(a.portable_text(), "shared a");
    assert_eq!(b.portable_text(), "");
    assert_eq!((a.measure(), b.measure()), (80, 20));
    assert!(a.undo().unwrap());
    assert_eq!(a.portable_text(), "shared");
    assert_eq!(b.portable_text(), "");
}

#[test]
fn test_resize_rewraps_caret() {
    let text = format!("# H\n{}", "word ".repeat(12).trim_end());
    let mut s = EditorSession::new(&text, MonospaceOracle::new(80)).unwrap();
    s.set_caret(TextPoint::new(1, 30));
    assert_eq!(s.caret_visual().row, 0);

    // 20 columns, indent 2 -> 18 characters of text per row.
    s.set_oracle(MonospaceOracle::new(20));
    assert_eq!(s.caret_point(), TextPoint::new(1, 30));
    assert_eq!(s.caret_visual().row, 1);
    assert_eq!(s.caret_visual().column, 12);
}
