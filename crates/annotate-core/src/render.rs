use serde::Serialize;

use crate::core::{Document, Marks};

/// Display classes for one utterance block. This is the whole styling
/// surface the core exposes; everything visual beyond class names belongs to
/// the rendering collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BlockClasses {
    pub title: bool,
    pub active: bool,
    /// Text is empty or whitespace, the placeholder case.
    pub empty: bool,
}

impl BlockClasses {
    pub fn class_string(&self) -> String {
        let mut out = String::from("utterance");
        if self.title {
            out.push_str(" title");
        }
        if self.active {
            out.push_str(" active");
        }
        if self.empty {
            out.push_str(" empty");
        }
        out
    }
}

pub fn block_classes(doc: &Document, index: usize, focused_block: Option<usize>) -> BlockClasses {
    let block = doc.blocks.get(index);
    BlockClasses {
        title: block.is_some_and(|b| b.kind == crate::core::BlockKind::Title),
        active: focused_block == Some(index),
        empty: block.is_none_or(|b| b.text().trim().is_empty()),
    }
}

/// Class for a tagged span, derived from the denormalized slot's palette
/// index. Bold contributes inline styling, not a slot class.
pub fn mark_class(marks: &Marks) -> Option<String> {
    marks
        .slot
        .as_ref()
        .map(|slot| format!("slot {}", slot.color_class()))
}
