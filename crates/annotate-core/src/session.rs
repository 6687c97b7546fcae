use crate::adapter::DocumentModel;
use crate::core::{Editor, Point, Selection};
use crate::engine::{self, TagError, TaggedRange};
use crate::keymap::{KeyContext, KeyEvent, KeyOutcome, Keymap};
use crate::ops::Op;
use crate::schema::Normalizer;
use crate::selection::SpanSelection;
use crate::slots::{ShortcutTable, Slot};
use crate::value::AnnotateValue;

/// What one interaction did to the session: the structural ops applied (the
/// normalizer's fixes included) and the canonical selection derived after
/// them. Consumers use it to tell selection-only updates apart from content
/// changes before re-rendering or persisting.
#[derive(Debug, Clone, PartialEq)]
pub struct Change {
    pub ops: Vec<Op>,
    pub selection: Option<SpanSelection>,
}

impl Change {
    pub fn is_selection_only(&self) -> bool {
        self.ops.is_empty()
    }
}

/// The single-threaded editing session: one editor, a read-only slot list
/// and the shortcut table. Every public operation mutates synchronously and
/// recomputes the canonical selection strictly after the mutation, so the
/// published span never reflects a stale document.
pub struct Session {
    editor: Editor,
    slots: Vec<Slot>,
    shortcuts: ShortcutTable,
    keymap: Keymap,
    span: Option<SpanSelection>,
}

impl Session {
    pub fn new(value: AnnotateValue, slots: Vec<Slot>) -> Self {
        let editor = Editor::new(
            value.into_document(),
            Selection::collapsed(Point::new(0, 0, 0)),
            Normalizer::forced_layout(),
        );
        let mut session = Self {
            editor,
            slots,
            shortcuts: ShortcutTable::default(),
            keymap: Keymap::standard(),
            span: None,
        };
        session.refresh_selection();
        session
    }

    pub fn with_shortcuts(mut self, shortcuts: ShortcutTable) -> Self {
        self.shortcuts = shortcuts;
        self
    }

    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn shortcuts(&self) -> &ShortcutTable {
        &self.shortcuts
    }

    pub fn span_selection(&self) -> Option<SpanSelection> {
        self.span
    }

    /// Current snapshot for the persistence collaborator.
    pub fn value(&self) -> AnnotateValue {
        AnnotateValue::from_document(self.editor.doc().clone())
    }

    pub fn change(&self) -> Change {
        Change {
            ops: self.editor.last_ops().to_vec(),
            selection: self.span,
        }
    }

    pub fn handle_key(&mut self, event: KeyEvent) -> KeyOutcome {
        let ctx = KeyContext {
            slots: &self.slots,
            shortcuts: &self.shortcuts,
        };
        let outcome = self.keymap.dispatch(&mut self.editor, &ctx, &event);
        self.refresh_selection();
        outcome
    }

    /// A click on a slot in the panel.
    pub fn click_slot(&mut self, slot_index: usize) -> Result<TaggedRange, TagError> {
        let span = self.span;
        let result = engine::tag(&mut self.editor, &self.slots, slot_index, span);
        self.refresh_selection();
        result
    }

    /// A click on a rendered tagged span.
    pub fn remove_tag(&mut self, utterance: usize, block: usize) -> Result<(), TagError> {
        let result = engine::remove_slot(&mut self.editor, utterance, block);
        self.refresh_selection();
        result
    }

    pub fn set_raw_selection(&mut self, selection: Selection) -> Change {
        self.editor.set_selection(selection);
        self.refresh_selection();
        self.change()
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.editor.set_focused(focused);
        self.refresh_selection();
    }

    pub fn undo(&mut self) -> bool {
        let undone = self.editor.undo();
        self.refresh_selection();
        undone
    }

    pub fn redo(&mut self) -> bool {
        let redone = self.editor.redo();
        self.refresh_selection();
        redone
    }

    fn refresh_selection(&mut self) {
        self.span = self.editor.span_selection();
    }
}
