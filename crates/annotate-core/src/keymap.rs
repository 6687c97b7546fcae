use crate::adapter::DocumentModel;
use crate::core::{BlockKind, Marks, Point, Selection};
use crate::engine::{self, TagError, TaggedRange};
use crate::slots::{ShortcutTable, Slot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Backspace,
    Char(char),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub ctrl: bool,
    pub meta: bool,
}

impl KeyEvent {
    pub fn plain(key: Key) -> Self {
        Self {
            key,
            ctrl: false,
            meta: false,
        }
    }

    pub fn ctrl(key: Key) -> Self {
        Self {
            key,
            ctrl: true,
            meta: false,
        }
    }

    /// Ctrl on most platforms, Cmd on macOS; either counts.
    pub fn primary(&self) -> bool {
        self.ctrl || self.meta
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// The event was consumed; `rule` names the table row that fired.
    Handled { rule: &'static str },
    /// Hand the event to the engine's default key handling.
    PassThrough,
}

pub struct KeyContext<'a> {
    pub slots: &'a [Slot],
    pub shortcuts: &'a ShortcutTable,
}

/// One row of the dispatch table. The predicate carries the entire gating
/// condition so precedence stays in the rule order, not inside actions.
pub struct KeyRule {
    pub id: &'static str,
    matches: fn(&dyn DocumentModel, &KeyContext, &KeyEvent) -> bool,
    apply: fn(&mut dyn DocumentModel, &KeyContext, &KeyEvent) -> Result<(), TagError>,
}

/// The ordered dispatch table: rules are evaluated top to bottom and the
/// first whose predicate holds consumes the event.
pub struct Keymap {
    rules: Vec<KeyRule>,
}

impl Keymap {
    pub fn standard() -> Self {
        Self {
            rules: vec![
                KeyRule {
                    id: "enter_appends_utterance",
                    matches: |model, _ctx, event| {
                        event.key == Key::Enter && caret_marks(model).any_active()
                    },
                    apply: enter_appends_utterance,
                },
                KeyRule {
                    id: "backspace_clears_tagged_run",
                    matches: |model, _ctx, event| {
                        event.key == Key::Backspace && caret_marks(model).any_active()
                    },
                    apply: backspace_clears_tagged_run,
                },
                KeyRule {
                    id: "shortcut_tags_selection",
                    matches: |model, ctx, event| {
                        let Key::Char(symbol) = event.key else {
                            return false;
                        };
                        if event.primary() {
                            return false;
                        }
                        let Some(index) = ctx.shortcuts.resolve(symbol) else {
                            return false;
                        };
                        index < ctx.slots.len()
                            && model
                                .span_selection()
                                .is_some_and(|span| span.is_taggable())
                    },
                    apply: shortcut_tags_selection,
                },
                KeyRule {
                    id: "toggle_bold",
                    matches: |model, _ctx, event| {
                        event.primary()
                            && event.key == Key::Char('b')
                            && model
                                .span_selection()
                                .is_some_and(|span| span.is_taggable())
                    },
                    apply: |model, _ctx, _event| {
                        let span = model.span_selection();
                        engine::toggle_bold(model, span)
                    },
                },
            ],
        }
    }

    pub fn rules(&self) -> &[KeyRule] {
        &self.rules
    }

    /// First match wins. A rule whose action fails leaves the event
    /// unhandled, like the out-of-range shortcut case.
    pub fn dispatch(
        &self,
        model: &mut dyn DocumentModel,
        ctx: &KeyContext,
        event: &KeyEvent,
    ) -> KeyOutcome {
        for rule in &self.rules {
            if (rule.matches)(model, ctx, event) {
                return match (rule.apply)(model, ctx, event) {
                    Ok(()) => KeyOutcome::Handled { rule: rule.id },
                    Err(_) => KeyOutcome::PassThrough,
                };
            }
        }
        KeyOutcome::PassThrough
    }
}

fn caret_marks(model: &dyn DocumentModel) -> Marks {
    let focus = model.selection().focus;
    model.active_marks(TaggedRange::new(
        focus.block,
        focus.run,
        focus.offset,
        focus.offset,
    ))
}

/// Suppresses the newline inside a tagged utterance: the caret moves to the
/// end of the current text and a fresh paragraph opens right below.
fn enter_appends_utterance(
    model: &mut dyn DocumentModel,
    _ctx: &KeyContext,
    _event: &KeyEvent,
) -> Result<(), TagError> {
    let utterance = model.selection().focus.block;
    let last_run = model.run_count(utterance).saturating_sub(1);
    let end = model
        .run_text(utterance, last_run)
        .map_or(0, |text| text.len());
    model
        .move_selection(Selection::collapsed(Point::new(utterance, last_run, end)))
        .map_err(TagError::Apply)?;
    model
        .insert_block(utterance + 1, BlockKind::Paragraph)
        .map_err(TagError::Apply)?;
    model
        .move_selection(Selection::collapsed(Point::new(utterance + 1, 0, 0)))
        .map_err(TagError::Apply)
}

/// The tagged-span "undo by clearing" shortcut: instead of deleting text,
/// select the whole run and strip every mark from it.
fn backspace_clears_tagged_run(
    model: &mut dyn DocumentModel,
    _ctx: &KeyContext,
    _event: &KeyEvent,
) -> Result<(), TagError> {
    let focus = model.selection().focus;
    let len = model
        .run_text(focus.block, focus.run)
        .map_or(0, |text| text.len());
    model
        .move_selection(Selection {
            anchor: Point::new(focus.block, focus.run, 0),
            focus: Point::new(focus.block, focus.run, len),
        })
        .map_err(TagError::Apply)?;
    model
        .clear_marks(focus.block, focus.run)
        .map_err(TagError::Apply)
}

fn shortcut_tags_selection(
    model: &mut dyn DocumentModel,
    ctx: &KeyContext,
    event: &KeyEvent,
) -> Result<(), TagError> {
    let Key::Char(symbol) = event.key else {
        return Err(TagError::NoSelection);
    };
    let index = ctx.shortcuts.resolve(symbol).ok_or(TagError::NoSelection)?;
    let span = model.span_selection();
    engine::tag(model, ctx.slots, index, span).map(|_| ())
}
