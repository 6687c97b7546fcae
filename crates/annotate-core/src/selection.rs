use serde::{Deserialize, Serialize};

use crate::core::{clamp_to_char_boundary, Document, Selection};

/// The canonical annotation coordinate derived from the raw editor selection:
/// `utterance` is the top-level block index, `block` the inline run index
/// inside it (the leaf the selection sits on), `from..to` a byte range into
/// that run's text with `from <= to`.
///
/// Recomputed on every selection or document change and never persisted.
/// `None` stands for "no taggable selection": the editor is blurred, or the
/// selection crosses utterances, or it crosses run boundaries (which would
/// wrap one entity tag inside another).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanSelection {
    pub utterance: usize,
    pub block: usize,
    pub from: usize,
    pub to: usize,
}

impl SpanSelection {
    /// Pure function of the raw selection state; no side effects.
    pub fn normalize(focused: bool, selection: &Selection, doc: &Document) -> Option<SpanSelection> {
        if !focused {
            return None;
        }
        let anchor = selection.anchor;
        let focus = selection.focus;
        if anchor.block != focus.block || anchor.run != focus.run {
            return None;
        }

        let text = doc.run_text(anchor.block, anchor.run)?;
        let from = clamp_to_char_boundary(text, anchor.offset.min(focus.offset));
        let to = clamp_to_char_boundary(text, anchor.offset.max(focus.offset));

        Some(SpanSelection {
            utterance: anchor.block,
            block: anchor.run,
            from,
            to,
        })
    }

    /// A zero-length span is a valid selection but nothing can be tagged on
    /// it; the panel shows the plain slot list instead of the tagging UI.
    pub fn is_taggable(&self) -> bool {
        self.from < self.to
    }
}
