use crate::core::{
    clamp_to_char_boundary, BlockKey, BlockKind, BlockNode, Editor, Mark, Marks, Point, Selection,
    TextRun,
};
use crate::engine::TaggedRange;
use crate::ops::{Op, Transaction};
use crate::selection::SpanSelection;

/// The operation surface of the underlying tree-text engine, as consumed by
/// the tagging engine and the keyboard dispatch. Anything implementing this
/// can be substituted for the built-in [`Editor`] without touching either.
///
/// Ranges address a sub-range of a single run; marks are uniform over a run,
/// so `active_marks` reports the marks of the run the range sits on (a
/// zero-length range included).
pub trait DocumentModel {
    fn selection(&self) -> Selection;
    fn is_focused(&self) -> bool;
    fn span_selection(&self) -> Option<SpanSelection>;

    fn block_count(&self) -> usize;
    fn run_count(&self, utterance: usize) -> usize;
    fn run_text(&self, utterance: usize, run: usize) -> Option<String>;
    fn block_key(&self, index: usize) -> Option<BlockKey>;
    fn block_index(&self, key: BlockKey) -> Option<usize>;
    fn active_marks(&self, range: TaggedRange) -> Marks;

    fn set_block_kind(&mut self, key: BlockKey, kind: BlockKind) -> Result<(), String>;
    fn insert_block(&mut self, index: usize, kind: BlockKind) -> Result<(), String>;
    fn add_mark(&mut self, range: TaggedRange, mark: Mark) -> Result<(), String>;
    /// Swaps the mark of the same type already covering the range for the new
    /// one, whole instance at a time; the old mark's data is implicit in the
    /// range since marks are uniform per run.
    fn replace_mark(&mut self, range: TaggedRange, mark: Mark) -> Result<(), String>;
    fn toggle_mark(&mut self, range: TaggedRange, mark: Mark) -> Result<(), String>;
    /// Removes one mark instance: the mark of `mark`'s type on that exact run.
    fn remove_mark(&mut self, utterance: usize, run: usize, mark: &Mark) -> Result<(), String>;
    fn clear_marks(&mut self, utterance: usize, run: usize) -> Result<(), String>;
    fn move_selection(&mut self, selection: Selection) -> Result<(), String>;
}

impl DocumentModel for Editor {
    fn selection(&self) -> Selection {
        *Editor::selection(self)
    }

    fn is_focused(&self) -> bool {
        Editor::is_focused(self)
    }

    fn span_selection(&self) -> Option<SpanSelection> {
        SpanSelection::normalize(self.is_focused(), Editor::selection(self), self.doc())
    }

    fn block_count(&self) -> usize {
        self.doc().blocks.len()
    }

    fn run_count(&self, utterance: usize) -> usize {
        self.doc()
            .blocks
            .get(utterance)
            .map_or(0, |block| block.runs.len())
    }

    fn run_text(&self, utterance: usize, run: usize) -> Option<String> {
        self.doc().run_text(utterance, run).map(str::to_string)
    }

    fn block_key(&self, index: usize) -> Option<BlockKey> {
        self.doc().blocks.get(index).map(|block| block.key)
    }

    fn block_index(&self, key: BlockKey) -> Option<usize> {
        self.doc().index_of_key(key)
    }

    fn active_marks(&self, range: TaggedRange) -> Marks {
        self.doc()
            .blocks
            .get(range.utterance)
            .and_then(|block| block.runs.get(range.block))
            .map(|run| run.marks.clone())
            .unwrap_or_default()
    }

    fn set_block_kind(&mut self, key: BlockKey, kind: BlockKind) -> Result<(), String> {
        let index = self
            .doc()
            .index_of_key(key)
            .ok_or_else(|| format!("unknown block key: {key:?}"))?;
        self.apply(
            Transaction::new(vec![Op::SetBlockKind { index, kind }])
                .source("adapter:set_block_kind"),
        )
        .map_err(|e| format!("{e:?}"))
    }

    fn insert_block(&mut self, index: usize, kind: BlockKind) -> Result<(), String> {
        let index = index.min(self.doc().blocks.len());
        let key = self.claim_key();
        self.apply(
            Transaction::new(vec![Op::InsertBlock {
                index,
                node: BlockNode::with_text(key, kind, ""),
            }])
            .source("adapter:insert_block"),
        )
        .map_err(|e| format!("{e:?}"))
    }

    fn add_mark(&mut self, range: TaggedRange, mark: Mark) -> Result<(), String> {
        rewrite_marks(self, range, &|mut marks| {
            marks.apply(&mark);
            marks
        })
    }

    fn replace_mark(&mut self, range: TaggedRange, mark: Mark) -> Result<(), String> {
        let mut marks = self.active_marks(range);
        marks.apply(&mark);
        self.apply(
            Transaction::new(vec![Op::SetRunMarks {
                block: range.utterance,
                run: range.block,
                marks,
            }])
            .source("adapter:replace_mark"),
        )
        .map_err(|e| format!("{e:?}"))
    }

    fn toggle_mark(&mut self, range: TaggedRange, mark: Mark) -> Result<(), String> {
        if self.active_marks(range).has(&mark) {
            rewrite_marks(self, range, &|mut marks| {
                marks.clear(&mark);
                marks
            })
        } else {
            rewrite_marks(self, range, &|mut marks| {
                marks.apply(&mark);
                marks
            })
        }
    }

    fn remove_mark(&mut self, utterance: usize, run: usize, mark: &Mark) -> Result<(), String> {
        let mut marks = self.active_marks(TaggedRange::collapsed(utterance, run));
        marks.clear(mark);
        self.apply(
            Transaction::new(vec![Op::SetRunMarks {
                block: utterance,
                run,
                marks,
            }])
            .source("adapter:remove_mark"),
        )
        .map_err(|e| format!("{e:?}"))
    }

    fn clear_marks(&mut self, utterance: usize, run: usize) -> Result<(), String> {
        self.apply(
            Transaction::new(vec![Op::SetRunMarks {
                block: utterance,
                run,
                marks: Marks::default(),
            }])
            .source("adapter:clear_marks"),
        )
        .map_err(|e| format!("{e:?}"))
    }

    fn move_selection(&mut self, selection: Selection) -> Result<(), String> {
        self.set_selection(selection);
        Ok(())
    }
}

/// Rewrites the marks over `range` by splitting the target run at the range
/// boundaries and rebuilding the block's run list in one transaction, with
/// the selection re-derived through block-global offsets.
fn rewrite_marks(
    editor: &mut Editor,
    range: TaggedRange,
    apply: &dyn Fn(Marks) -> Marks,
) -> Result<(), String> {
    let Some(block) = editor.doc().blocks.get(range.utterance) else {
        return Err(format!("utterance index out of bounds: {}", range.utterance));
    };
    if range.block >= block.runs.len() {
        return Err(format!("run index out of bounds: {}", range.block));
    }
    let runs = block.runs.clone();

    let start_global = run_global_offset(&runs, range.block, range.from);
    let end_global = run_global_offset(&runs, range.block, range.to);
    if start_global >= end_global {
        return Ok(());
    }

    let new_runs = apply_marks_in_runs(&runs, start_global, end_global, apply);

    let sel = DocumentModel::selection(editor);
    let map_point = |point: Point| {
        if point.block != range.utterance {
            return point;
        }
        let global = run_global_offset(&runs, point.run, point.offset);
        // A point on the range's end boundary sticks to the rewritten run,
        // so a selection covering the range still covers it afterwards.
        point_for_global_offset(range.utterance, &new_runs, global, global == end_global)
    };
    let selection_after = Selection {
        anchor: map_point(sel.anchor),
        focus: map_point(sel.focus),
    };

    let mut ops: Vec<Op> = Vec::new();
    for index in (0..runs.len()).rev() {
        ops.push(Op::RemoveRun {
            block: range.utterance,
            index,
        });
    }
    for (index, node) in new_runs.into_iter().enumerate() {
        ops.push(Op::InsertRun {
            block: range.utterance,
            index,
            node,
        });
    }

    editor
        .apply(
            Transaction::new(ops)
                .selection_after(selection_after)
                .source("adapter:rewrite_marks"),
        )
        .map_err(|e| format!("{e:?}"))
}

pub(crate) fn run_global_offset(runs: &[TextRun], run_ix: usize, offset: usize) -> usize {
    let mut global = 0usize;
    for (ix, run) in runs.iter().enumerate() {
        if ix < run_ix {
            global += run.text.len();
            continue;
        }
        if ix == run_ix {
            global += clamp_to_char_boundary(&run.text, offset);
        }
        break;
    }
    global
}

pub(crate) fn point_for_global_offset(
    block: usize,
    runs: &[TextRun],
    global: usize,
    prefer_end: bool,
) -> Point {
    let mut remaining = global;
    for (run_ix, run) in runs.iter().enumerate() {
        if remaining < run.text.len() {
            return Point::new(block, run_ix, clamp_to_char_boundary(&run.text, remaining));
        }
        if remaining == run.text.len() {
            if !prefer_end && runs.get(run_ix + 1).is_some() {
                return Point::new(block, run_ix + 1, 0);
            }
            return Point::new(block, run_ix, run.text.len());
        }
        remaining -= run.text.len();
    }

    match runs.last() {
        Some(last) => Point::new(block, runs.len() - 1, last.text.len()),
        None => Point::new(block, 0, 0),
    }
}

pub(crate) fn apply_marks_in_runs(
    runs: &[TextRun],
    start_global: usize,
    end_global: usize,
    apply: &dyn Fn(Marks) -> Marks,
) -> Vec<TextRun> {
    if start_global >= end_global {
        return runs.to_vec();
    }

    let mut out: Vec<TextRun> = Vec::new();
    let mut cursor = 0usize;

    for run in runs {
        let run_start = cursor;
        let run_end = cursor + run.text.len();
        cursor = run_end;

        if end_global <= run_start || start_global >= run_end {
            out.push(run.clone());
            continue;
        }

        let lo = clamp_to_char_boundary(&run.text, start_global.max(run_start) - run_start);
        let hi = clamp_to_char_boundary(&run.text, end_global.min(run_end) - run_start);

        if lo > 0 {
            out.push(TextRun {
                text: run.text[..lo].to_string(),
                marks: run.marks.clone(),
            });
        }
        if hi > lo {
            out.push(TextRun {
                text: run.text[lo..hi].to_string(),
                marks: apply(run.marks.clone()),
            });
        }
        if hi < run.text.len() {
            out.push(TextRun {
                text: run.text[hi..].to_string(),
                marks: run.marks.clone(),
            });
        }
    }

    out
}
