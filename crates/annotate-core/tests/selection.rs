use tagmark_core::{
    BlockKey, BlockKind, BlockNode, Document, Point, Selection, SpanSelection, TextRun,
};

fn doc_with_utterances(utterances: &[&str]) -> Document {
    Document::forced_layout("Book a flight", utterances)
}

fn span_of(doc: &Document, anchor: Point, focus: Point) -> Option<SpanSelection> {
    SpanSelection::normalize(true, &Selection { anchor, focus }, doc)
}

#[test]
fn same_run_selection_normalizes_with_ordered_offsets() {
    let doc = doc_with_utterances(&["hello world"]);

    let span = span_of(&doc, Point::new(1, 0, 6), Point::new(1, 0, 11));
    assert_eq!(
        span,
        Some(SpanSelection {
            utterance: 1,
            block: 0,
            from: 6,
            to: 11,
        })
    );
}

#[test]
fn reversed_selection_orders_from_before_to() {
    let doc = doc_with_utterances(&["hello world"]);

    let span = span_of(&doc, Point::new(1, 0, 11), Point::new(1, 0, 6));
    let Some(span) = span else {
        panic!("expected a span for a reversed same-run selection");
    };
    assert_eq!((span.from, span.to), (6, 11));
}

#[test]
fn blurred_editor_has_no_span() {
    let doc = doc_with_utterances(&["hello"]);
    let selection = Selection {
        anchor: Point::new(1, 0, 0),
        focus: Point::new(1, 0, 3),
    };

    assert_eq!(SpanSelection::normalize(false, &selection, &doc), None);
}

#[test]
fn cross_utterance_selection_is_rejected() {
    let doc = doc_with_utterances(&["first line", "second line"]);

    let span = span_of(&doc, Point::new(1, 0, 2), Point::new(2, 0, 4));
    assert_eq!(span, None);
}

#[test]
fn cross_run_selection_is_rejected() {
    let doc = Document {
        blocks: vec![
            BlockNode::title("T"),
            BlockNode {
                key: BlockKey::default(),
                kind: BlockKind::Paragraph,
                runs: vec![TextRun::plain("ab"), TextRun::plain("cd")],
            },
        ],
    };

    let span = span_of(&doc, Point::new(1, 0, 1), Point::new(1, 1, 1));
    assert_eq!(span, None);
}

#[test]
fn stale_coordinates_are_rejected() {
    let doc = doc_with_utterances(&["hello"]);

    let span = span_of(&doc, Point::new(5, 0, 0), Point::new(5, 0, 2));
    assert_eq!(span, None);
}

#[test]
fn offsets_clamp_to_char_boundaries() {
    let doc = doc_with_utterances(&["héllo"]);

    // Offset 2 falls inside the two-byte é and clamps down to 1.
    let span = span_of(&doc, Point::new(1, 0, 2), Point::new(1, 0, 6));
    let Some(span) = span else {
        panic!("expected a span");
    };
    assert_eq!((span.from, span.to), (1, 6));
}

#[test]
fn zero_length_span_is_valid_but_not_taggable() {
    let doc = doc_with_utterances(&["hello"]);
    let selection = Selection::collapsed(Point::new(1, 0, 3));
    assert!(selection.is_collapsed());

    let span = SpanSelection::normalize(true, &selection, &doc);
    let Some(span) = span else {
        panic!("expected a collapsed span");
    };
    assert_eq!((span.from, span.to), (3, 3));
    assert!(!span.is_taggable());
}
