use tagmark_core::{block_classes, mark_class, Document, Mark, Marks, Slot};

#[test]
fn title_block_carries_the_title_class() {
    let doc = Document::forced_layout("Book a flight", &["hello"]);

    let classes = block_classes(&doc, 0, None);
    assert!(classes.title);
    assert!(!classes.active);
    assert!(!classes.empty);
    assert_eq!(classes.class_string(), "utterance title");
}

#[test]
fn focused_empty_utterance_is_active_and_empty() {
    let doc = Document::forced_layout("T", &["  "]);

    let classes = block_classes(&doc, 1, Some(1));
    assert!(!classes.title);
    assert!(classes.active);
    assert!(classes.empty);
    assert_eq!(classes.class_string(), "utterance active empty");
}

#[test]
fn slot_mark_maps_to_its_palette_class() {
    let mut marks = Marks::default();
    marks.apply(&Mark::Slot(Slot::new("destination", 3)));

    assert_eq!(mark_class(&marks).as_deref(), Some("slot color-3"));
}

#[test]
fn palette_index_wraps_at_the_palette_size() {
    let mut marks = Marks::default();
    marks.apply(&Mark::Slot(Slot::new("late", 9)));

    assert_eq!(mark_class(&marks).as_deref(), Some("slot color-1"));
}

#[test]
fn plain_marks_have_no_slot_class() {
    assert_eq!(mark_class(&Marks::default()), None);

    let mut bold = Marks::default();
    bold.apply(&Mark::Bold {
        color: "blue".to_string(),
    });
    assert_eq!(mark_class(&bold), None);
}
