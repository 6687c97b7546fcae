use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::core::{BlockKind, BlockNode, Marks, Selection, TextRun};

/// A single mutation of the document tree. Addresses are positional:
/// `block` is the utterance index, `run`/`index` the inline run index.
/// Applying an op yields its inverse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Op {
    InsertText {
        block: usize,
        run: usize,
        offset: usize,
        text: String,
    },
    RemoveText {
        block: usize,
        run: usize,
        range: Range<usize>,
    },
    InsertRun {
        block: usize,
        index: usize,
        node: TextRun,
    },
    RemoveRun {
        block: usize,
        index: usize,
    },
    InsertBlock {
        index: usize,
        node: BlockNode,
    },
    RemoveBlock {
        index: usize,
    },
    SetBlockKind {
        index: usize,
        kind: BlockKind,
    },
    SetRunMarks {
        block: usize,
        run: usize,
        marks: Marks,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(default)]
    pub ops: Vec<Op>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selection_after: Option<Selection>,
    #[serde(default)]
    pub meta: TransactionMeta,
}

impl Transaction {
    pub fn new(ops: Vec<Op>) -> Self {
        Self {
            ops,
            selection_after: None,
            meta: TransactionMeta::default(),
        }
    }

    pub fn selection_after(mut self, selection_after: Selection) -> Self {
        self.selection_after = Some(selection_after);
        self
    }

    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.meta.source = Some(source.into());
        self
    }
}
