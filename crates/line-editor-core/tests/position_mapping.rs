use line_editor_core::{
    EditorSession, LineMetrics, MonospaceOracle, UNBOUNDED_MEASURE, VisualPosition, WidthOracle,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[test]
fn test_offset_visual_round_trip_random_lines() {
    let mut rng = StdRng::seed_from_u64(0x00c0_ffee);
    for _ in 0..400 {
        let indent = rng.gen_range(0..16);
        let wrappable = rng.gen_range(0..240);
        let measure = rng.gen_range(1..90);
        let metrics = LineMetrics::new(indent, wrappable, measure);

        for offset in 0..=metrics.selectable_length() {
            let visual = metrics.offset_to_visual(offset);
            assert_eq!(
                metrics.visual_to_offset(visual.row, visual.column),
                offset,
                "indent={indent} wrappable={wrappable} measure={measure} visual={visual:?}"
            );
            assert!(visual.row <= metrics.last_row_index() + 1);
        }
    }
}

#[test]
fn test_visual_to_offset_clamps_overflow() {
    // indent 4, 20 chars of text, 10 per row -> 6 chars of text per row.
    let metrics = LineMetrics::new(4, 20, 10);
    assert_eq!(metrics.last_row_index(), 3);

    // Overflowing column -> last valid column on that row.
    assert_eq!(metrics.visual_to_offset(0, 50), 10);
    assert_eq!(metrics.visual_to_offset(1, 50), 16);
    // Continuation rows cannot point into the indent.
    assert_eq!(metrics.visual_to_offset(1, 0), 10);
    // Overflowing row -> line end.
    assert_eq!(metrics.visual_to_offset(99, 5), metrics.selectable_length());
}

#[test]
fn test_offsets_inside_indent_stay_on_first_row() {
    let metrics = LineMetrics::new(6, 3, 20);
    for offset in 0..6 {
        assert_eq!(metrics.offset_to_visual(offset), VisualPosition::new(0, offset));
    }
    assert_eq!(metrics.visual_to_offset(0, 2), 2);
}

#[test]
fn test_selectable_length_identity_for_every_line() {
    let text = "# Heading\n- item one\n-- nested item\ncontinued paragraph\n\n#+tags: a b\n1. first\n";
    let session = EditorSession::new(text, MonospaceOracle::new(12)).unwrap();
    for (index, line) in session.document().lines().iter().enumerate() {
        assert_eq!(
            line.indent() + line.wrappable_length(),
            line.selectable_length(),
            "line {index}"
        );
        let metrics = session.line_metrics(index).unwrap();
        assert_eq!(metrics.is_wrapped(), line.selectable_length() > 12);
    }
}

#[test]
fn test_measure_follows_oracle() {
    let mut session = EditorSession::new("abc", MonospaceOracle::new(37)).unwrap();
    assert_eq!(session.measure(), 37);

    assert_eq!(session.set_oracle(MonospaceOracle::new(12)), 12);
    assert_eq!(session.measure(), 12);
}

struct DetachedOracle;

impl WidthOracle for DetachedOracle {
    fn measure_row_count(&mut self, _probe: &str) -> Option<usize> {
        None
    }
}

#[test]
fn test_unavailable_oracle_disables_wrapping() {
    let long = "x".repeat(500);
    let session = EditorSession::new(&long, DetachedOracle).unwrap();
    assert_eq!(session.measure(), UNBOUNDED_MEASURE);

    let metrics = session.line_metrics(0).unwrap();
    assert!(!metrics.is_wrapped());
    assert_eq!(metrics.last_row_index(), 0);
    assert_eq!(metrics.offset_to_visual(500), VisualPosition::new(0, 500));
}

#[test]
fn test_caret_visual_on_wrapped_line() {
    // Heading indent for the paragraph is 2; 10 columns leave 8 chars per row.
    let text = format!("# H\n{}", "abcdefghijklmnopqrst");
    let mut session = EditorSession::new(&text, MonospaceOracle::new(10)).unwrap();
    session.set_caret_visual(1, 1, 5);
    assert_eq!(session.caret_point().offset, 13);
    assert_eq!(session.caret_visual(), VisualPosition::new(1, 5));
}
