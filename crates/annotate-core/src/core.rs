use serde::{Deserialize, Serialize};

use crate::ops::{Op, Transaction};
use crate::schema::Normalizer;
use crate::slots::Slot;

/// Stable opaque identity of a block. Handed out by the editor at session
/// start and on block insertion; positional indices are always derived from
/// the live ordering, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct BlockKey(pub u64);

#[derive(Debug, Default)]
pub struct BlockKeys {
    next: u64,
}

impl BlockKeys {
    pub fn claim(&mut self) -> BlockKey {
        let key = BlockKey(self.next);
        self.next += 1;
        key
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    Title,
    Paragraph,
}

impl BlockKind {
    /// The kind the forced layout expects at a given position.
    pub fn expected_at(index: usize) -> Self {
        if index == 0 {
            BlockKind::Title
        } else {
            BlockKind::Paragraph
        }
    }
}

/// The inline mark descriptor: a (type, data) pair applied over a character
/// range. Slot marks carry the full denormalized slot record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum Mark {
    Bold { color: String },
    Slot(Slot),
}

/// Marks carried by a single text run. `slot` being an `Option` is what makes
/// "at most one slot mark per sub-range" structural: writing a new slot mark
/// replaces the old one, it cannot stack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Marks {
    #[serde(default)]
    pub bold: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bold_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot: Option<Slot>,
}

impl Marks {
    pub fn any_active(&self) -> bool {
        *self != Marks::default()
    }

    pub fn has(&self, mark: &Mark) -> bool {
        match mark {
            Mark::Bold { .. } => self.bold,
            Mark::Slot(_) => self.slot.is_some(),
        }
    }

    pub fn apply(&mut self, mark: &Mark) {
        match mark {
            Mark::Bold { color } => {
                self.bold = true;
                self.bold_color = Some(color.clone());
            }
            Mark::Slot(slot) => self.slot = Some(slot.clone()),
        }
    }

    /// Removes the mark of the same type, whatever its data.
    pub fn clear(&mut self, mark: &Mark) {
        match mark {
            Mark::Bold { .. } => {
                self.bold = false;
                self.bold_color = None;
            }
            Mark::Slot(_) => self.slot = None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRun {
    pub text: String,
    #[serde(default)]
    pub marks: Marks,
}

impl TextRun {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            marks: Marks::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockNode {
    #[serde(default)]
    pub key: BlockKey,
    pub kind: BlockKind,
    #[serde(default)]
    pub runs: Vec<TextRun>,
}

impl BlockNode {
    pub fn with_text(key: BlockKey, kind: BlockKind, text: impl Into<String>) -> Self {
        Self {
            key,
            kind,
            runs: vec![TextRun::plain(text)],
        }
    }

    pub fn title(text: impl Into<String>) -> Self {
        Self::with_text(BlockKey::default(), BlockKind::Title, text)
    }

    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::with_text(BlockKey::default(), BlockKind::Paragraph, text)
    }

    pub fn text(&self) -> String {
        let mut out = String::new();
        for run in &self.runs {
            out.push_str(&run.text);
        }
        out
    }

    pub fn text_len(&self) -> usize {
        self.runs.iter().map(|run| run.text.len()).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Document {
    #[serde(default)]
    pub blocks: Vec<BlockNode>,
}

impl Document {
    /// Title at index 0, one paragraph per utterance after it. Keys are
    /// placeholders until an editor adopts the document.
    pub fn forced_layout(title: impl Into<String>, utterances: &[&str]) -> Self {
        let mut blocks = vec![BlockNode::title(title)];
        blocks.extend(utterances.iter().map(|text| BlockNode::paragraph(*text)));
        Self { blocks }
    }

    /// O(blocks) by design; indices are derived on demand, never cached.
    pub fn index_of_key(&self, key: BlockKey) -> Option<usize> {
        self.blocks.iter().position(|block| block.key == key)
    }

    pub fn run_text(&self, block: usize, run: usize) -> Option<&str> {
        self.blocks
            .get(block)
            .and_then(|b| b.runs.get(run))
            .map(|r| r.text.as_str())
    }
}

/// A position inside the document: utterance block, inline run, byte offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Point {
    pub block: usize,
    pub run: usize,
    pub offset: usize,
}

impl Point {
    pub fn new(block: usize, run: usize, offset: usize) -> Self {
        Self { block, run, offset }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Selection {
    pub anchor: Point,
    pub focus: Point,
}

impl Selection {
    pub fn collapsed(point: Point) -> Self {
        Self {
            anchor: point,
            focus: point,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }
}

#[derive(Debug, Clone)]
pub struct UndoRecord {
    pub inverse_ops: Vec<Op>,
    pub selection_before: Selection,
    pub selection_after: Selection,
}

#[derive(Debug, Default)]
pub struct EditorConfig {
    pub max_undo: usize,
    pub max_normalize_iterations: usize,
}

impl EditorConfig {
    fn with_defaults(mut self) -> Self {
        if self.max_undo == 0 {
            self.max_undo = 200;
        }
        if self.max_normalize_iterations == 0 {
            self.max_normalize_iterations = 100;
        }
        self
    }
}

/// Owns the document, the raw selection and the structural normalizer; every
/// mutation goes through [`Editor::apply`], which runs the normalizer to a
/// fixed point before anything derived from the document is recomputed.
pub struct Editor {
    doc: Document,
    selection: Selection,
    focused: bool,
    normalizer: Normalizer,
    config: EditorConfig,
    keys: BlockKeys,
    last_ops: Vec<Op>,
    undo_stack: Vec<UndoRecord>,
    redo_stack: Vec<UndoRecord>,
}

impl Editor {
    pub fn new(doc: Document, selection: Selection, normalizer: Normalizer) -> Self {
        let config = EditorConfig::default().with_defaults();
        let mut editor = Self {
            doc,
            selection,
            focused: true,
            normalizer,
            config,
            keys: BlockKeys::default(),
            last_ops: Vec::new(),
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
        };
        for block in &mut editor.doc.blocks {
            block.key = editor.keys.claim();
        }
        editor.normalize_in_place();
        editor.last_ops.clear();
        editor
    }

    pub fn forced_layout() -> Self {
        Self::new(
            Document::default(),
            Selection::collapsed(Point::new(0, 0, 0)),
            Normalizer::forced_layout(),
        )
    }

    pub fn doc(&self) -> &Document {
        &self.doc
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn set_selection(&mut self, selection: Selection) {
        self.selection = selection;
        self.normalize_selection_in_place();
        // A pure selection move applies no ops; observers use that to tell
        // selection-only changes from content changes.
        self.last_ops.clear();
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    /// The block under the caret while the editor is focused.
    pub fn focused_block(&self) -> Option<usize> {
        self.focused.then_some(self.selection.focus.block)
    }

    /// Ops applied by the most recent content mutation, normalizer fixes
    /// included. Empty after a selection-only change.
    pub fn last_ops(&self) -> &[Op] {
        &self.last_ops
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo(&mut self) -> bool {
        let Some(record) = self.undo_stack.pop() else {
            return false;
        };

        let UndoRecord {
            inverse_ops,
            selection_before,
            selection_after,
        } = record;

        let mut applied: Vec<Op> = Vec::new();
        let mut redo_ops: Vec<Op> = Vec::new();
        for op in inverse_ops.iter().cloned() {
            if let Ok(inv) = self.apply_op(op.clone()) {
                applied.push(op);
                redo_ops.push(inv);
            } else {
                break;
            }
        }
        redo_ops.reverse();

        self.selection = selection_before;
        self.normalize_in_place();
        self.last_ops = applied;

        self.redo_stack.push(UndoRecord {
            selection_before,
            selection_after,
            inverse_ops: redo_ops,
        });
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(record) = self.redo_stack.pop() else {
            return false;
        };

        let UndoRecord {
            inverse_ops,
            selection_before,
            selection_after,
        } = record;

        let mut applied: Vec<Op> = Vec::new();
        let mut undo_ops: Vec<Op> = Vec::new();
        for op in inverse_ops.iter().cloned() {
            if let Ok(inv) = self.apply_op(op.clone()) {
                applied.push(op);
                undo_ops.push(inv);
            } else {
                break;
            }
        }
        undo_ops.reverse();

        self.selection = selection_after;
        self.normalize_in_place();
        self.last_ops = applied;

        self.undo_stack.push(UndoRecord {
            selection_before,
            selection_after,
            inverse_ops: undo_ops,
        });
        true
    }

    pub fn apply(&mut self, tx: Transaction) -> Result<(), ApplyError> {
        let selection_before = self.selection;
        let mut applied: Vec<Op> = tx.ops.clone();

        let mut inverse_ops: Vec<Op> = Vec::new();
        for op in tx.ops.into_iter() {
            match self.apply_op(op) {
                Ok(inv) => inverse_ops.push(inv),
                Err(err) => {
                    // Roll the applied prefix back so a rejected transaction
                    // leaves no partial state behind.
                    for inv in inverse_ops.into_iter().rev() {
                        let _ = self.apply_op(inv);
                    }
                    self.selection = selection_before;
                    return Err(err);
                }
            }
        }

        if let Some(sel) = tx.selection_after {
            self.selection = sel;
        }

        let (normalize_ops, mut inverse_normalize) = self.normalize_with_inverse_ops()?;
        applied.extend(normalize_ops);
        inverse_ops.append(&mut inverse_normalize);
        inverse_ops.reverse();

        self.normalize_selection_in_place();
        self.last_ops = applied;

        let selection_after = self.selection;

        self.undo_stack.push(UndoRecord {
            inverse_ops,
            selection_before,
            selection_after,
        });
        self.redo_stack.clear();
        if self.undo_stack.len() > self.config.max_undo {
            self.undo_stack.remove(0);
        }

        Ok(())
    }

    pub(crate) fn claim_key(&mut self) -> BlockKey {
        self.keys.claim()
    }

    fn normalize_in_place(&mut self) {
        let _ = self.normalize_with_inverse_ops();
        self.normalize_selection_in_place();
    }

    fn normalize_selection_in_place(&mut self) {
        self.selection = Selection {
            anchor: clamp_point(&self.doc, &self.selection.anchor),
            focus: clamp_point(&self.doc, &self.selection.focus),
        };
    }

    fn normalize_with_inverse_ops(&mut self) -> Result<(Vec<Op>, Vec<Op>), ApplyError> {
        let mut applied: Vec<Op> = Vec::new();
        let mut inverse_ops: Vec<Op> = Vec::new();
        for _ in 0..self.config.max_normalize_iterations {
            let ops = self.normalizer.run(&self.doc, &mut self.keys);
            if ops.is_empty() {
                return Ok((applied, inverse_ops));
            }
            for op in ops {
                let inv = self.apply_op(op.clone())?;
                applied.push(op);
                inverse_ops.push(inv);
            }
        }
        Err(ApplyError::NormalizeDidNotConverge)
    }

    fn apply_op(&mut self, op: Op) -> Result<Op, ApplyError> {
        apply_op_to(&mut self.doc, &mut self.selection, op)
    }
}

fn apply_op_to(doc: &mut Document, selection: &mut Selection, op: Op) -> Result<Op, ApplyError> {
    match op {
        Op::InsertText {
            block,
            run,
            offset,
            text,
        } => {
            let node = run_mut(doc, block, run)?;
            let offset = clamp_to_char_boundary(&node.text, offset);
            node.text.insert_str(offset, &text);
            transform_selection_insert_text(selection, block, run, offset, text.len());
            Ok(Op::RemoveText {
                block,
                run,
                range: offset..offset + text.len(),
            })
        }
        Op::RemoveText { block, run, range } => {
            let node = run_mut(doc, block, run)?;
            let start = clamp_to_char_boundary(&node.text, range.start.min(node.text.len()));
            let end = clamp_to_char_boundary(&node.text, range.end.min(node.text.len()));
            if start >= end {
                return Ok(Op::InsertText {
                    block,
                    run,
                    offset: start,
                    text: String::new(),
                });
            }
            let removed = node.text[start..end].to_string();
            node.text.replace_range(start..end, "");
            transform_selection_remove_text(selection, block, run, start..end);
            Ok(Op::InsertText {
                block,
                run,
                offset: start,
                text: removed,
            })
        }
        Op::InsertRun { block, index, node } => {
            let runs = &mut block_mut(doc, block)?.runs;
            if index > runs.len() {
                return Err(ApplyError::OutOfBounds(format!(
                    "run insert index out of bounds: {index} > {}",
                    runs.len()
                )));
            }
            runs.insert(index, node);
            transform_selection_insert_run(selection, block, index);
            Ok(Op::RemoveRun { block, index })
        }
        Op::RemoveRun { block, index } => {
            let runs = &mut block_mut(doc, block)?.runs;
            if index >= runs.len() {
                return Err(ApplyError::OutOfBounds(format!(
                    "run remove index out of bounds: {index} >= {}",
                    runs.len()
                )));
            }
            let removed = runs.remove(index);
            transform_selection_remove_run(selection, block, index, &removed, doc);
            Ok(Op::InsertRun {
                block,
                index,
                node: removed,
            })
        }
        Op::InsertBlock { index, node } => {
            if index > doc.blocks.len() {
                return Err(ApplyError::OutOfBounds(format!(
                    "block insert index out of bounds: {index} > {}",
                    doc.blocks.len()
                )));
            }
            doc.blocks.insert(index, node);
            transform_selection_insert_block(selection, index);
            Ok(Op::RemoveBlock { index })
        }
        Op::RemoveBlock { index } => {
            if index >= doc.blocks.len() {
                return Err(ApplyError::OutOfBounds(format!(
                    "block remove index out of bounds: {index} >= {}",
                    doc.blocks.len()
                )));
            }
            let removed = doc.blocks.remove(index);
            transform_selection_remove_block(selection, index);
            Ok(Op::InsertBlock {
                index,
                node: removed,
            })
        }
        Op::SetBlockKind { index, kind } => {
            let node = block_mut(doc, index)?;
            let old = std::mem::replace(&mut node.kind, kind);
            Ok(Op::SetBlockKind { index, kind: old })
        }
        Op::SetRunMarks { block, run, marks } => {
            let node = run_mut(doc, block, run)?;
            let old = std::mem::replace(&mut node.marks, marks);
            Ok(Op::SetRunMarks {
                block,
                run,
                marks: old,
            })
        }
    }
}

#[derive(Debug)]
pub enum ApplyError {
    OutOfBounds(String),
    NormalizeDidNotConverge,
}

pub(crate) fn clamp_to_char_boundary(s: &str, mut ix: usize) -> usize {
    ix = ix.min(s.len());
    while ix > 0 && !s.is_char_boundary(ix) {
        ix -= 1;
    }
    ix
}

pub(crate) fn clamp_point(doc: &Document, point: &Point) -> Point {
    if doc.blocks.is_empty() {
        return Point::new(0, 0, 0);
    }
    let block = point.block.min(doc.blocks.len() - 1);
    let runs = &doc.blocks[block].runs;
    if runs.is_empty() {
        return Point::new(block, 0, 0);
    }
    let run = point.run.min(runs.len() - 1);
    let offset = clamp_to_char_boundary(&runs[run].text, point.offset);
    Point::new(block, run, offset)
}

fn block_mut(doc: &mut Document, index: usize) -> Result<&mut BlockNode, ApplyError> {
    let len = doc.blocks.len();
    doc.blocks
        .get_mut(index)
        .ok_or_else(|| ApplyError::OutOfBounds(format!("block index out of bounds: {index} >= {len}")))
}

fn run_mut(doc: &mut Document, block: usize, run: usize) -> Result<&mut TextRun, ApplyError> {
    let node = block_mut(doc, block)?;
    let len = node.runs.len();
    node.runs
        .get_mut(run)
        .ok_or_else(|| ApplyError::OutOfBounds(format!("run index out of bounds: {run} >= {len}")))
}

fn transform_selection_insert_text(
    selection: &mut Selection,
    block: usize,
    run: usize,
    offset: usize,
    len: usize,
) {
    // A point exactly at the offset stays put: the run-merge pass appends at
    // the left run's end, and a point on that boundary belongs before the
    // appended text. Transactions that need forward motion carry an explicit
    // selection_after.
    for point in [&mut selection.anchor, &mut selection.focus] {
        if point.block == block && point.run == run && point.offset > offset {
            point.offset = point.offset.saturating_add(len);
        }
    }
}

fn transform_selection_remove_text(
    selection: &mut Selection,
    block: usize,
    run: usize,
    range: std::ops::Range<usize>,
) {
    let removed_len = range.end.saturating_sub(range.start);
    for point in [&mut selection.anchor, &mut selection.focus] {
        if point.block != block || point.run != run {
            continue;
        }
        if point.offset <= range.start {
            continue;
        }
        if point.offset >= range.end {
            point.offset = point.offset.saturating_sub(removed_len);
        } else {
            point.offset = range.start;
        }
    }
}

fn transform_selection_insert_run(selection: &mut Selection, block: usize, index: usize) {
    for point in [&mut selection.anchor, &mut selection.focus] {
        if point.block == block && point.run >= index {
            point.run += 1;
        }
    }
}

fn transform_selection_remove_run(
    selection: &mut Selection,
    block: usize,
    index: usize,
    removed: &TextRun,
    doc_after_remove: &Document,
) {
    // When the removed run merged into its left neighbor, map points into it.
    let merge_prefix_len = index.checked_sub(1).and_then(|left_index| {
        let left = doc_after_remove.blocks.get(block)?.runs.get(left_index)?;
        (left.marks == removed.marks && left.text.ends_with(&removed.text))
            .then(|| left.text.len().saturating_sub(removed.text.len()))
    });

    for point in [&mut selection.anchor, &mut selection.focus] {
        if point.block != block {
            continue;
        }
        if point.run > index {
            point.run -= 1;
            continue;
        }
        if point.run < index {
            continue;
        }

        if let Some(prefix) = merge_prefix_len {
            point.run = index - 1;
            point.offset = (prefix + point.offset).min(prefix + removed.text.len());
        } else {
            point.run = index.saturating_sub(1);
            point.offset = 0;
        }
    }
}

fn transform_selection_insert_block(selection: &mut Selection, index: usize) {
    for point in [&mut selection.anchor, &mut selection.focus] {
        if point.block >= index {
            point.block += 1;
        }
    }
}

fn transform_selection_remove_block(selection: &mut Selection, index: usize) {
    for point in [&mut selection.anchor, &mut selection.focus] {
        if point.block > index {
            point.block -= 1;
        } else if point.block == index {
            point.block = index.saturating_sub(1);
            point.run = 0;
            point.offset = 0;
        }
    }
}
