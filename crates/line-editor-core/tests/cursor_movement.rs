use line_editor_core::{CursorState, EditorSession, MonospaceOracle, Movement, TextPoint};
use pretty_assertions::assert_eq;

fn session(text: &str, columns: usize) -> EditorSession {
    EditorSession::new(text, MonospaceOracle::new(columns)).unwrap()
}

#[test]
fn test_left_right_skip_indent_and_cross_lines() {
    let mut s = session("# H\nab", 80);
    s.set_caret(TextPoint::new(1, 2));

    s.move_caret(Movement::Left);
    assert_eq!(s.caret_point(), TextPoint::new(0, 3));

    s.move_caret(Movement::Right);
    assert_eq!(s.caret_point(), TextPoint::new(1, 2));

    s.move_caret(Movement::Right);
    s.move_caret(Movement::Right);
    assert_eq!(s.caret_point(), TextPoint::new(1, 4));

    // End of document: stays put.
    s.move_caret(Movement::Right);
    assert_eq!(s.caret_point(), TextPoint::new(1, 4));
}

#[test]
fn test_caret_inside_indent_moves_to_text_start() {
    let mut s = session("# H\nab", 80);
    s.set_caret(TextPoint::new(1, 0));
    s.move_caret(Movement::Right);
    assert_eq!(s.caret_point(), TextPoint::new(1, 2));
}

#[test]
fn test_vertical_movement_keeps_ideal_column() {
    let mut s = session("abcdef\nab\nabcdef", 80);
    s.set_caret(TextPoint::new(0, 5));

    s.move_caret(Movement::Down);
    assert_eq!(s.caret_point(), TextPoint::new(1, 2));
    assert_eq!(s.cursor().ideal_column(), Some(5));

    s.move_caret(Movement::Down);
    assert_eq!(s.caret_point(), TextPoint::new(2, 5));

    s.move_caret(Movement::Up);
    s.move_caret(Movement::Up);
    assert_eq!(s.caret_point(), TextPoint::new(0, 5));
}

#[test]
fn test_horizontal_movement_resets_ideal_column() {
    let mut s = session("abcdef\nab\nabcdef", 80);
    s.set_caret(TextPoint::new(0, 5));
    s.move_caret(Movement::Down);
    s.move_caret(Movement::Left);
    assert_eq!(s.cursor().ideal_column(), Some(1));
    s.move_caret(Movement::Down);
    assert_eq!(s.caret_point(), TextPoint::new(2, 1));
}

#[test]
fn test_vertical_movement_through_wrapped_rows() {
    // Paragraph indent 2, 10 columns -> 8 chars per row, 20 chars -> 3 rows.
    let mut s = session("# H\nabcdefghijklmnopqrst", 10);
    s.set_caret(TextPoint::new(1, 4));

    s.move_caret(Movement::Down);
    assert_eq!(s.caret_point(), TextPoint::new(1, 12));
    s.move_caret(Movement::Down);
    assert_eq!(s.caret_point(), TextPoint::new(1, 20));
    // Last row of the last line: go to the line end.
    s.move_caret(Movement::Down);
    assert_eq!(s.caret_point(), TextPoint::new(1, 22));

    s.move_caret(Movement::Up);
    assert_eq!(s.caret_point(), TextPoint::new(1, 12));
    s.move_caret(Movement::Up);
    s.move_caret(Movement::Up);
    // Into the last row of the heading line, clamped to its length.
    assert_eq!(s.caret_point(), TextPoint::new(0, 3));
}

#[test]
fn test_home_end_act_on_visual_row() {
    let mut s = session("# H\nabcdefghijklmnopqrst", 10);
    s.set_caret(TextPoint::new(1, 12));

    s.move_caret(Movement::Home);
    assert_eq!(s.caret_point(), TextPoint::new(1, 10));
    s.move_caret(Movement::End);
    assert_eq!(s.caret_point(), TextPoint::new(1, 17));
    assert_eq!(s.caret_visual().row, 1);

    s.set_caret(TextPoint::new(1, 5));
    s.move_caret(Movement::Home);
    assert_eq!(s.caret_point(), TextPoint::new(1, 2));
}

#[test]
fn test_end_stays_on_wrapped_row() {
    // Rows of the paragraph: offsets 2..10, 10..18, 18..=22.
    let mut s = session("# H\nabcdefghijklmnopqrst", 10);
    s.set_caret(TextPoint::new(1, 12));

    s.move_caret(Movement::End);
    assert_eq!(s.caret_point(), TextPoint::new(1, 17));
    s.move_caret(Movement::End);
    assert_eq!(s.caret_point(), TextPoint::new(1, 17));
    assert_eq!(s.cursor().ideal_column(), Some(9));

    s.move_caret(Movement::Home);
    assert_eq!(s.caret_point(), TextPoint::new(1, 10));

    s.move_caret(Movement::End);
    s.move_caret(Movement::Up);
    assert_eq!(s.caret_point(), TextPoint::new(1, 9));

    // The last row ends at the line end.
    s.set_caret(TextPoint::new(1, 19));
    s.move_caret(Movement::End);
    assert_eq!(s.caret_point(), TextPoint::new(1, 22));
}

#[test]
fn test_left_inside_first_line_indent_stays_put() {
    let mut s = session("## H", 80);
    assert_eq!(s.document().lines()[0].indent(), 2);
    s.set_caret(TextPoint::new(0, 0));
    s.move_caret(Movement::Left);
    assert_eq!(s.caret_point(), TextPoint::new(0, 0));

    s.set_caret(TextPoint::new(0, 2));
    s.move_caret(Movement::Left);
    assert_eq!(s.caret_point(), TextPoint::new(0, 2));
}

#[test]
fn test_word_movement_crosses_lines() {
    let mut s = session("alpha beta\ngamma", 80);
    s.set_caret(TextPoint::new(0, 0));

    let mut stops = Vec::new();
    for _ in 0..4 {
        s.move_caret(Movement::WordEnd);
        stops.push(s.caret_point());
    }
    assert_eq!(
        stops,
        vec![
            TextPoint::new(0, 5),
            TextPoint::new(0, 10),
            TextPoint::new(1, 0),
            TextPoint::new(1, 5),
        ]
    );

    let mut stops = Vec::new();
    for _ in 0..3 {
        s.move_caret(Movement::WordStart);
        stops.push(s.caret_point());
    }
    assert_eq!(
        stops,
        vec![
            TextPoint::new(1, 0),
            TextPoint::new(0, 10),
            TextPoint::new(0, 6),
        ]
    );
}

#[test]
fn test_block_movement() {
    let mut s = session("a\nb\n\nc\nd", 80);
    s.set_caret(TextPoint::new(0, 0));

    s.move_caret(Movement::BlockEnd);
    assert_eq!(s.caret_point(), TextPoint::new(1, 1));
    s.move_caret(Movement::BlockEnd);
    assert_eq!(s.caret_point(), TextPoint::new(4, 1));

    s.move_caret(Movement::BlockStart);
    assert_eq!(s.caret_point(), TextPoint::new(3, 0));
    s.move_caret(Movement::BlockStart);
    assert_eq!(s.caret_point(), TextPoint::new(0, 0));
}

#[test]
fn test_select_extends_focus_and_collapse_keeps_it() {
    let mut s = session("alpha beta", 80);
    s.set_caret(TextPoint::new(0, 0));
    for _ in 0..3 {
        s.select(Movement::Right);
    }
    assert_eq!(s.cursor().state(), CursorState::Range);
    assert_eq!(s.selected_text(), "alp");

    s.select(Movement::WordEnd);
    assert_eq!(s.selected_text(), "alpha");

    s.collapse_selection();
    assert_eq!(s.cursor().state(), CursorState::Collapsed);
    assert_eq!(s.caret_point(), TextPoint::new(0, 5));
}

#[test]
fn test_select_all_spans_document_without_indent() {
    let mut s = session("# Title\nbody\n- item", 80);
    s.select_all();
    assert_eq!(s.selected_text(), "# Title\nbody\n- item");
}

#[test]
fn test_set_caret_clamps_out_of_range() {
    let mut s = session("ab\ncd", 80);
    s.set_caret(TextPoint::new(42, 99));
    assert_eq!(s.caret_point(), TextPoint::new(1, 2));
}
