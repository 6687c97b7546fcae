use serde::{Deserialize, Serialize};

/// Number of colors in the fixed slot palette. Slot colors index into it;
/// the stylesheet side defines one `color-{n}` class per entry.
pub const PALETTE_SIZE: usize = 8;

/// A user-defined tag. Created by the external slot-management surface and
/// observed read-only here; the full record is denormalized into each slot
/// mark so rendering and removal need no lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub name: String,
    pub color: usize,
    #[serde(default)]
    pub entity_types: Vec<String>,
}

impl Slot {
    pub fn new(name: impl Into<String>, color: usize) -> Self {
        Self {
            name: name.into(),
            color,
            entity_types: Vec::new(),
        }
    }

    pub fn entity_types<I, S>(mut self, entity_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entity_types = entity_types.into_iter().map(Into::into).collect();
        self
    }

    pub fn color_class(&self) -> String {
        format!("color-{}", self.color % PALETTE_SIZE)
    }
}

/// Ordered mapping from keyboard symbols to slot indices. Pure lookup,
/// never mutated by the core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortcutTable {
    entries: Vec<(char, usize)>,
}

impl Default for ShortcutTable {
    fn default() -> Self {
        Self {
            entries: ('1'..='9').zip(0..).collect(),
        }
    }
}

impl ShortcutTable {
    pub fn new(entries: Vec<(char, usize)>) -> Self {
        Self { entries }
    }

    /// First entry wins when a symbol appears more than once.
    pub fn resolve(&self, symbol: char) -> Option<usize> {
        self.entries
            .iter()
            .find(|(sym, _)| *sym == symbol)
            .map(|(_, ix)| *ix)
    }

    pub fn symbol_for(&self, slot_index: usize) -> Option<char> {
        self.entries
            .iter()
            .find(|(_, ix)| *ix == slot_index)
            .map(|(sym, _)| *sym)
    }

    pub fn entries(&self) -> &[(char, usize)] {
        &self.entries
    }
}
