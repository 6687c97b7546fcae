use crate::adapter::DocumentModel;
use crate::core::{clamp_to_char_boundary, Mark};
use crate::selection::SpanSelection;
use crate::slots::Slot;

/// Color the fixed bold shortcut applies.
pub const BOLD_COLOR: &str = "blue";

/// All tagging failures are locally recoverable; callers treat them as a
/// no-op and the document is guaranteed untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagError {
    /// No taggable selection (sentinel, zero-length, or stale coordinates).
    NoSelection,
    /// Trimming consumed the whole requested range.
    EmptySelection,
    /// Shortcut resolved past the end of the slot list.
    SlotIndexOutOfRange { index: usize, len: usize },
    /// The underlying engine rejected the mutation.
    Apply(String),
}

/// The range a tag landed on, after whitespace trimming. Field names follow
/// the annotation coordinate: `utterance` is the top-level block, `block`
/// the inline run, `from..to` byte offsets into the run (`to` exclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaggedRange {
    pub utterance: usize,
    pub block: usize,
    pub from: usize,
    pub to: usize,
}

impl TaggedRange {
    pub fn new(utterance: usize, block: usize, from: usize, to: usize) -> Self {
        Self {
            utterance,
            block,
            from,
            to,
        }
    }

    pub(crate) fn collapsed(utterance: usize, block: usize) -> Self {
        Self::new(utterance, block, 0, 0)
    }
}

/// Shrinks `[from, to)` past leading and trailing whitespace, staying on
/// char boundaries. `None` when nothing but whitespace was selected.
pub fn trim_span(text: &str, from: usize, to: usize) -> Option<(usize, usize)> {
    let mut from = clamp_to_char_boundary(text, from);
    let mut to = clamp_to_char_boundary(text, to);

    while from < to {
        let Some(ch) = text[from..].chars().next() else {
            break;
        };
        if !ch.is_whitespace() {
            break;
        }
        from += ch.len_utf8();
    }
    while to > from {
        let Some(ch) = text[..to].chars().next_back() else {
            break;
        };
        if !ch.is_whitespace() {
            break;
        }
        to -= ch.len_utf8();
    }

    (from < to).then_some((from, to))
}

/// Tags the canonical selection with `slots[slot_index]`: trims the range,
/// then either adds the slot mark fresh or, when the range already sits on a
/// slot mark, replaces that mark one-for-one so tags never nest or stack.
/// Returns the applied (possibly trimmed) range.
pub fn tag<M: DocumentModel + ?Sized>(
    model: &mut M,
    slots: &[Slot],
    slot_index: usize,
    span: Option<SpanSelection>,
) -> Result<TaggedRange, TagError> {
    let slot = slots.get(slot_index).ok_or(TagError::SlotIndexOutOfRange {
        index: slot_index,
        len: slots.len(),
    })?;
    let Some(span) = span.filter(|span| span.is_taggable()) else {
        return Err(TagError::NoSelection);
    };

    let text = model
        .run_text(span.utterance, span.block)
        .ok_or(TagError::NoSelection)?;
    let (from, to) = trim_span(&text, span.from, span.to.min(text.len()))
        .ok_or(TagError::EmptySelection)?;

    let range = TaggedRange::new(span.utterance, span.block, from, to);
    let mark = Mark::Slot(slot.clone());

    if model.active_marks(range).slot.is_some() {
        model.replace_mark(range, mark).map_err(TagError::Apply)?;
    } else {
        model.add_mark(range, mark).map_err(TagError::Apply)?;
    }

    Ok(range)
}

/// Removes the slot mark from the tagged span the user clicked. The exact
/// run is already known from the rendered mark, so there is nothing to trim
/// or recompute.
pub fn remove_slot<M: DocumentModel + ?Sized>(
    model: &mut M,
    utterance: usize,
    block: usize,
) -> Result<(), TagError> {
    let marks = model.active_marks(TaggedRange::collapsed(utterance, block));
    let Some(slot) = marks.slot else {
        return Err(TagError::NoSelection);
    };
    model
        .remove_mark(utterance, block, &Mark::Slot(slot))
        .map_err(TagError::Apply)
}

/// Toggles the fixed-color bold mark over the canonical selection.
pub fn toggle_bold<M: DocumentModel + ?Sized>(
    model: &mut M,
    span: Option<SpanSelection>,
) -> Result<(), TagError> {
    let Some(span) = span.filter(|span| span.is_taggable()) else {
        return Err(TagError::NoSelection);
    };
    let text = model
        .run_text(span.utterance, span.block)
        .ok_or(TagError::NoSelection)?;
    let range = TaggedRange::new(span.utterance, span.block, span.from, span.to.min(text.len()));
    model
        .toggle_mark(
            range,
            Mark::Bold {
                color: BOLD_COLOR.to_string(),
            },
        )
        .map_err(TagError::Apply)
}
