use crate::core::{BlockKeys, BlockKind, BlockNode, Document, TextRun};
use crate::ops::Op;

/// One structural rule over the document. A pass inspects the document and
/// returns the ops for a single corrective fix (or one conflict-free batch);
/// the editor re-runs the whole set to a fixed point after every mutation.
/// Every pass must be a no-op on a document it has already fixed.
pub trait NormalizePass: Send + Sync {
    fn id(&self) -> &'static str;
    fn run(&self, doc: &Document, keys: &mut BlockKeys) -> Vec<Op>;
}

pub struct Normalizer {
    passes: Vec<Box<dyn NormalizePass>>,
}

impl Normalizer {
    pub fn new(passes: Vec<Box<dyn NormalizePass>>) -> Self {
        Self { passes }
    }

    /// The forced-layout schema: one title block first, at least one
    /// paragraph after it, every block carrying canonical text runs.
    ///
    /// A missing title is repaired by insertion before any retyping runs, so
    /// a document that lost its title keeps its text out of the title line;
    /// the paragraph minimum is checked after retyping, so a stray extra
    /// title becomes a paragraph instead of forcing an empty insert.
    pub fn forced_layout() -> Self {
        Self::new(vec![
            Box::new(EnsureTitleBlock),
            Box::new(EnforceBlockKinds),
            Box::new(EnsureParagraphBlock),
            Box::new(EnsureRunExists),
            Box::new(CanonicalizeRuns),
        ])
    }

    /// Ops for the first violation found, in pass order. Empty when the
    /// document is structurally valid.
    pub fn run(&self, doc: &Document, keys: &mut BlockKeys) -> Vec<Op> {
        for pass in &self.passes {
            let ops = pass.run(doc, keys);
            if !ops.is_empty() {
                return ops;
            }
        }
        Vec::new()
    }

    pub fn passes(&self) -> &[Box<dyn NormalizePass>] {
        &self.passes
    }
}

/// Minimum-count rule for the title: a document with no title block at all
/// gets an empty one inserted at index 0.
struct EnsureTitleBlock;

impl NormalizePass for EnsureTitleBlock {
    fn id(&self) -> &'static str {
        "schema.ensure_title_block"
    }

    fn run(&self, doc: &Document, keys: &mut BlockKeys) -> Vec<Op> {
        if doc.blocks.iter().any(|b| b.kind == BlockKind::Title) {
            return Vec::new();
        }
        vec![Op::InsertBlock {
            index: 0,
            node: BlockNode::with_text(keys.claim(), BlockKind::Title, ""),
        }]
    }
}

/// Minimum-count rule for paragraphs: at least one utterance line below the
/// title.
struct EnsureParagraphBlock;

impl NormalizePass for EnsureParagraphBlock {
    fn id(&self) -> &'static str {
        "schema.ensure_paragraph_block"
    }

    fn run(&self, doc: &Document, keys: &mut BlockKeys) -> Vec<Op> {
        if doc.blocks.iter().any(|b| b.kind == BlockKind::Paragraph) {
            return Vec::new();
        }
        vec![Op::InsertBlock {
            index: 1.min(doc.blocks.len()),
            node: BlockNode::with_text(keys.claim(), BlockKind::Paragraph, ""),
        }]
    }
}

/// Position rule: block 0 is a title, everything after it a paragraph.
/// Violations are retyped in place, keys untouched.
struct EnforceBlockKinds;

impl NormalizePass for EnforceBlockKinds {
    fn id(&self) -> &'static str {
        "schema.enforce_block_kinds"
    }

    fn run(&self, doc: &Document, _keys: &mut BlockKeys) -> Vec<Op> {
        let mut ops = Vec::new();
        for (index, block) in doc.blocks.iter().enumerate() {
            let expected = BlockKind::expected_at(index);
            if block.kind != expected {
                ops.push(Op::SetBlockKind {
                    index,
                    kind: expected,
                });
            }
        }
        ops
    }
}

/// Every block keeps at least one (possibly empty) text run so it stays
/// addressable by selections.
struct EnsureRunExists;

impl NormalizePass for EnsureRunExists {
    fn id(&self) -> &'static str {
        "schema.ensure_run_exists"
    }

    fn run(&self, doc: &Document, _keys: &mut BlockKeys) -> Vec<Op> {
        let mut ops = Vec::new();
        for (index, block) in doc.blocks.iter().enumerate() {
            if block.runs.is_empty() {
                ops.push(Op::InsertRun {
                    block: index,
                    index: 0,
                    node: TextRun::plain(""),
                });
            }
        }
        ops
    }
}

/// Canonical run form: no empty run next to a non-empty one, and adjacent
/// runs with identical marks are merged into one. Exactly one pair merges
/// per iteration: the removed run's text must be the left run's suffix for
/// the remove-run selection mapping to carry points into the merged run, and
/// that only holds pairwise. The fixed-point loop picks up longer chains.
struct CanonicalizeRuns;

impl NormalizePass for CanonicalizeRuns {
    fn id(&self) -> &'static str {
        "schema.canonicalize_runs"
    }

    fn run(&self, doc: &Document, _keys: &mut BlockKeys) -> Vec<Op> {
        for (block_ix, block) in doc.blocks.iter().enumerate() {
            if block.runs.len() < 2 {
                continue;
            }

            if let Some(empty_ix) = block.runs.iter().position(|run| run.text.is_empty()) {
                return vec![Op::RemoveRun {
                    block: block_ix,
                    index: empty_ix,
                }];
            }

            for ix in 0..block.runs.len() - 1 {
                if block.runs[ix + 1].marks != block.runs[ix].marks {
                    continue;
                }
                return vec![
                    Op::InsertText {
                        block: block_ix,
                        run: ix,
                        offset: block.runs[ix].text.len(),
                        text: block.runs[ix + 1].text.clone(),
                    },
                    Op::RemoveRun {
                        block: block_ix,
                        index: ix + 1,
                    },
                ];
            }
        }
        Vec::new()
    }
}
