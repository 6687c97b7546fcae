use tagmark_core::{Slot, SpanSelection};
use tagmark_panel::{PanelMode, PanelModel};

fn slots() -> Vec<Slot> {
    vec![Slot::new("destination", 0), Slot::new("date", 3)]
}

fn span(from: usize, to: usize) -> SpanSelection {
    SpanSelection {
        utterance: 1,
        block: 0,
        from,
        to,
    }
}

#[test]
fn taggable_span_switches_to_tagging_mode() {
    let span = span(2, 7);
    let model = PanelModel::build(&slots(), Some(&span));

    assert_eq!(model.mode, PanelMode::Tagging);
    assert!(!model.empty);

    assert_eq!(model.rows[0].name, "destination");
    assert_eq!(model.rows[0].class, "slot color-0 tag color-bg");
    assert_eq!(model.rows[0].shortcut.as_deref(), Some("1"));

    assert_eq!(model.rows[1].class, "slot color-3 tag color-bg");
    assert_eq!(model.rows[1].shortcut.as_deref(), Some("2"));
}

#[test]
fn no_selection_lists_the_slots() {
    let model = PanelModel::build(&slots(), None);

    assert_eq!(model.mode, PanelMode::Listing);
    assert_eq!(model.rows[0].class, "slot color-0 color-fg");
    assert_eq!(model.rows[0].shortcut, None);
    assert_eq!(model.rows[1].shortcut, None);
}

#[test]
fn zero_length_span_lists_the_slots() {
    let span = span(4, 4);
    let model = PanelModel::build(&slots(), Some(&span));

    assert_eq!(model.mode, PanelMode::Listing);
}

#[test]
fn empty_slot_list_sets_the_notice_flag() {
    let model = PanelModel::build(&[], None);

    assert!(model.empty);
    assert!(model.rows.is_empty());
}

#[test]
fn panel_model_serializes_for_the_renderer() {
    let span = span(2, 7);
    let model = PanelModel::build(&slots(), Some(&span));

    let json = serde_json::to_value(&model).unwrap();
    assert_eq!(json["mode"], "tagging");
    assert_eq!(json["rows"][0]["name"], "destination");
    assert_eq!(json["rows"][0]["shortcut"], "1");
    assert_eq!(json["empty"], false);
}

#[test]
fn palette_index_wraps_in_row_classes() {
    let slots = vec![Slot::new("late", 9)];
    let span = span(0, 3);
    let model = PanelModel::build(&slots, Some(&span));

    assert_eq!(model.rows[0].class, "slot color-1 tag color-bg");
}
