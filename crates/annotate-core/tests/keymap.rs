use tagmark_core::{
    AnnotateValue, BlockKind, Document, Key, KeyEvent, Keymap, KeyOutcome, Point, Selection,
    Session, ShortcutTable, Slot, SpanSelection,
};

const UTTERANCE: &str = "I want to fly to Paris tomorrow";

fn session_with(slots: Vec<Slot>) -> Session {
    let doc = Document::forced_layout("Book a flight", &[UTTERANCE]);
    Session::new(AnnotateValue::from_document(doc), slots)
}

fn default_slots() -> Vec<Slot> {
    vec![
        Slot::new("destination", 0),
        Slot::new("date", 1),
        Slot::new("airline", 2),
    ]
}

fn select(session: &mut Session, block: usize, run: usize, from: usize, to: usize) {
    session.set_raw_selection(Selection {
        anchor: Point::new(block, run, from),
        focus: Point::new(block, run, to),
    });
}

fn select_paris(session: &mut Session) -> (usize, usize) {
    let from = UTTERANCE.find("Paris").unwrap();
    let to = from + "Paris".len();
    select(session, 1, 0, from, to);
    (from, to)
}

fn tag_paris(session: &mut Session) {
    select_paris(session);
    session.click_slot(0).unwrap();
}

#[test]
fn number_shortcut_tags_the_selection() {
    let mut session = session_with(default_slots());
    select_paris(&mut session);

    let outcome = session.handle_key(KeyEvent::plain(Key::Char('1')));
    assert_eq!(
        outcome,
        KeyOutcome::Handled {
            rule: "shortcut_tags_selection"
        }
    );

    let block = &session.editor().doc().blocks[1];
    let Some(slot) = &block.runs[1].marks.slot else {
        panic!("expected the shortcut to tag the selection");
    };
    assert_eq!(slot.name, "destination");
}

#[test]
fn shortcut_past_the_slot_list_passes_through() {
    let mut session = session_with(default_slots());
    select_paris(&mut session);

    // '6' resolves to slot index 5 but only three slots exist.
    let outcome = session.handle_key(KeyEvent::plain(Key::Char('6')));
    assert_eq!(outcome, KeyOutcome::PassThrough);
    assert_eq!(session.editor().doc().blocks[1].runs.len(), 1);
}

#[test]
fn unmapped_symbol_passes_through() {
    let mut session = session_with(default_slots());
    select_paris(&mut session);

    assert_eq!(
        session.handle_key(KeyEvent::plain(Key::Char('x'))),
        KeyOutcome::PassThrough
    );
}

#[test]
fn shortcut_without_a_taggable_selection_passes_through() {
    let mut session = session_with(default_slots());
    session.set_raw_selection(Selection::collapsed(Point::new(1, 0, 3)));

    assert_eq!(
        session.handle_key(KeyEvent::plain(Key::Char('1'))),
        KeyOutcome::PassThrough
    );
}

#[test]
fn modified_shortcut_symbol_is_ignored() {
    let mut session = session_with(default_slots());
    select_paris(&mut session);

    assert_eq!(
        session.handle_key(KeyEvent::ctrl(Key::Char('1'))),
        KeyOutcome::PassThrough
    );
}

#[test]
fn custom_shortcut_table_resolves_symbols() {
    let mut session =
        session_with(default_slots()).with_shortcuts(ShortcutTable::new(vec![('d', 1)]));
    select_paris(&mut session);

    let outcome = session.handle_key(KeyEvent::plain(Key::Char('d')));
    assert_eq!(
        outcome,
        KeyOutcome::Handled {
            rule: "shortcut_tags_selection"
        }
    );

    let Some(slot) = &session.editor().doc().blocks[1].runs[1].marks.slot else {
        panic!("expected the custom shortcut to tag the selection");
    };
    assert_eq!(slot.name, "date");
}

#[test]
fn default_shortcut_table_maps_digits_in_order() {
    let shortcuts = ShortcutTable::default();
    assert_eq!(shortcuts.resolve('1'), Some(0));
    assert_eq!(shortcuts.resolve('9'), Some(8));
    assert_eq!(shortcuts.resolve('0'), None);
    assert_eq!(shortcuts.symbol_for(2), Some('3'));
    assert_eq!(shortcuts.entries().len(), 9);
    assert_eq!(shortcuts.entries()[0], ('1', 0));
}

#[test]
fn dispatch_rules_keep_their_precedence_order() {
    let keymap = Keymap::standard();
    let ids: Vec<_> = keymap.rules().iter().map(|rule| rule.id).collect();

    assert_eq!(
        ids,
        vec![
            "enter_appends_utterance",
            "backspace_clears_tagged_run",
            "shortcut_tags_selection",
            "toggle_bold",
        ]
    );
}

#[test]
fn enter_in_a_tagged_run_appends_a_paragraph() {
    let mut session = session_with(default_slots());
    tag_paris(&mut session);
    session.set_raw_selection(Selection::collapsed(Point::new(1, 1, 2)));

    let outcome = session.handle_key(KeyEvent::plain(Key::Enter));
    assert_eq!(
        outcome,
        KeyOutcome::Handled {
            rule: "enter_appends_utterance"
        }
    );

    let blocks = &session.editor().doc().blocks;
    assert_eq!(blocks.len(), 3);
    assert_eq!(blocks[2].kind, BlockKind::Paragraph);
    assert_eq!(blocks[2].text(), "");
    assert_eq!(session.editor().selection().focus, Point::new(2, 0, 0));
}

#[test]
fn enter_in_plain_text_passes_through() {
    let mut session = session_with(default_slots());
    session.set_raw_selection(Selection::collapsed(Point::new(1, 0, 3)));

    assert_eq!(
        session.handle_key(KeyEvent::plain(Key::Enter)),
        KeyOutcome::PassThrough
    );
    assert_eq!(session.editor().doc().blocks.len(), 2);
}

#[test]
fn backspace_in_a_tagged_run_clears_its_marks() {
    let mut session = session_with(default_slots());
    tag_paris(&mut session);
    session.set_raw_selection(Selection::collapsed(Point::new(1, 1, 2)));

    let outcome = session.handle_key(KeyEvent::plain(Key::Backspace));
    assert_eq!(
        outcome,
        KeyOutcome::Handled {
            rule: "backspace_clears_tagged_run"
        }
    );

    let block = &session.editor().doc().blocks[1];
    assert_eq!(block.runs.len(), 1);
    assert_eq!(block.runs[0].text, UTTERANCE);
    assert!(block.runs[0].marks.slot.is_none());
}

#[test]
fn backspace_in_plain_text_passes_through() {
    let mut session = session_with(default_slots());
    session.set_raw_selection(Selection::collapsed(Point::new(1, 0, 3)));

    assert_eq!(
        session.handle_key(KeyEvent::plain(Key::Backspace)),
        KeyOutcome::PassThrough
    );
}

#[test]
fn primary_b_toggles_bold_over_the_selection() {
    let mut session = session_with(default_slots());
    let from = UTTERANCE.find("fly").unwrap();
    select(&mut session, 1, 0, from, from + 3);

    let outcome = session.handle_key(KeyEvent::ctrl(Key::Char('b')));
    assert_eq!(outcome, KeyOutcome::Handled { rule: "toggle_bold" });

    let block = &session.editor().doc().blocks[1];
    assert_eq!(block.runs.len(), 3);
    assert_eq!(block.runs[1].text, "fly");
    assert!(block.runs[1].marks.bold);
    assert_eq!(block.runs[1].marks.bold_color.as_deref(), Some("blue"));

    // The selection still covers the bold run, so the same chord toggles off.
    let outcome = session.handle_key(KeyEvent::ctrl(Key::Char('b')));
    assert_eq!(outcome, KeyOutcome::Handled { rule: "toggle_bold" });

    let block = &session.editor().doc().blocks[1];
    assert_eq!(block.runs.len(), 1);
    assert_eq!(block.runs[0].text, UTTERANCE);
    assert!(!block.runs[0].marks.bold);

    // The span follows the text through the run merge.
    assert_eq!(
        session.span_selection(),
        Some(SpanSelection {
            utterance: 1,
            block: 0,
            from,
            to: from + 3,
        })
    );
}

#[test]
fn primary_b_without_a_selection_passes_through() {
    let mut session = session_with(default_slots());
    session.set_raw_selection(Selection::collapsed(Point::new(1, 0, 3)));

    assert_eq!(
        session.handle_key(KeyEvent::ctrl(Key::Char('b'))),
        KeyOutcome::PassThrough
    );
}
