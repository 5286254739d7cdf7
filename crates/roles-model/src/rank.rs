use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Category produced for an empty location value.
pub const NON_CATEGORY: &str = "Non";
/// Category produced for a location that is not in the directory.
pub const UNKNOWN_CATEGORY: &str = "Unknown";

/// Label to proximity rank lookup, built from one configuration table.
///
/// Lower rank is closer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankTable {
    name: String,
    ranks: BTreeMap<String, u32>,
}

impl RankTable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ranks: BTreeMap::new(),
        }
    }

    /// Register a label; a repeated label takes the later rank.
    pub fn insert(&mut self, label: impl Into<String>, rank: u32) {
        self.ranks.insert(label.into(), rank);
    }

    pub fn with_entry(mut self, label: impl Into<String>, rank: u32) -> Self {
        self.insert(label, rank);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rank(&self, label: &str) -> Option<u32> {
        self.ranks.get(label).copied()
    }

    pub fn max_rank(&self) -> u32 {
        self.ranks.values().copied().max().unwrap_or(0)
    }

    /// Rank used for labels missing from the table: one past the farthest.
    pub fn unranked(&self) -> u32 {
        self.max_rank().saturating_add(1)
    }

    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }
}
