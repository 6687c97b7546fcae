use serde::Serialize;

use tagmark_core::{Slot, SpanSelection};

/// Which face the sidebar shows. A taggable span switches it into tagging
/// mode; otherwise it lists the defined slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelMode {
    Tagging,
    Listing,
}

/// One slot entry as the renderer should draw it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotRow {
    pub name: String,
    pub class: String,
    /// 1-based shortcut suffix, shown in tagging mode only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shortcut: Option<String>,
}

/// The slot panel's entire display model. Pure function of the slot list
/// and the canonical selection; the panel itself never mutates anything and
/// forwards tag requests by slot index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PanelModel {
    pub mode: PanelMode,
    pub rows: Vec<SlotRow>,
    /// No slots defined; the renderer shows the "create one first" notice.
    pub empty: bool,
}

impl PanelModel {
    pub fn build(slots: &[Slot], span: Option<&SpanSelection>) -> Self {
        let tagging = span.is_some_and(|span| span.is_taggable());
        let mode = if tagging {
            PanelMode::Tagging
        } else {
            PanelMode::Listing
        };

        let rows = slots
            .iter()
            .enumerate()
            .map(|(ix, slot)| SlotRow {
                name: slot.name.clone(),
                class: row_class(slot, tagging),
                shortcut: tagging.then(|| (ix + 1).to_string()),
            })
            .collect();

        Self {
            mode,
            rows,
            empty: slots.is_empty(),
        }
    }
}

fn row_class(slot: &Slot, tagging: bool) -> String {
    if tagging {
        format!("slot {} tag color-bg", slot.color_class())
    } else {
        format!("slot {} color-fg", slot.color_class())
    }
}
