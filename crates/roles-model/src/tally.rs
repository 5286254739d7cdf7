use serde::{Deserialize, Serialize};

use crate::rule::RuleDefinition;

/// Drops attributed to one rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleDropCount {
    pub rule: String,
    pub column: String,
    pub dropped: usize,
}

/// Counters accumulated over one filter pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunTally {
    /// Rows with a request id that were evaluated.
    pub rows: usize,
    pub matched: usize,
    pub not_matched: usize,
    pub dropped: usize,
    /// Kept rows with no filter tag.
    pub no_filter: usize,
    pub coercion_warnings: usize,
    /// One entry per configured rule, in declared order.
    pub drops_by_rule: Vec<RuleDropCount>,
}

impl RunTally {
    pub fn for_rules(rules: &[RuleDefinition]) -> Self {
        Self {
            drops_by_rule: rules
                .iter()
                .map(|rule| RuleDropCount {
                    rule: rule.name.clone(),
                    column: rule.target_column.clone(),
                    dropped: 0,
                })
                .collect(),
            ..Self::default()
        }
    }

    pub fn record_drop(&mut self, rule: &str) {
        self.dropped += 1;
        if let Some(entry) = self.drops_by_rule.iter_mut().find(|entry| entry.rule == rule) {
            entry.dropped += 1;
        }
    }

    pub fn drops_for(&self, rule: &str) -> usize {
        self.drops_by_rule
            .iter()
            .find(|entry| entry.rule == rule)
            .map_or(0, |entry| entry.dropped)
    }

    /// Rows that survived filtering.
    pub fn output_rows(&self) -> usize {
        self.matched + self.not_matched
    }
}
