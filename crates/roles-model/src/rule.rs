//! Row filtering rule definitions.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The closed set of rule kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RuleKind {
    /// Drop when the cell equals one of the operands.
    Drop,
    /// As `Drop`, and also drop a blank cell.
    DropIfBlank,
    /// Drop when the cell contains an operand (case-insensitive).
    DropIncludes,
    /// Drop unless the cell equals one of the operands.
    Keep,
    /// As `Keep`, but a blank cell is kept.
    KeepIfBlank,
    /// Keep only dates strictly before the threshold.
    Before,
    /// Compare the co-location requirement against My Location.
    Location,
    /// Tag the row with the first operand found in the cell.
    Filter,
    /// Drop when no filter tag has been set.
    NoFilter,
}

impl RuleKind {
    pub const ALL: [RuleKind; 9] = [
        RuleKind::Drop,
        RuleKind::DropIfBlank,
        RuleKind::DropIncludes,
        RuleKind::Keep,
        RuleKind::KeepIfBlank,
        RuleKind::Before,
        RuleKind::Location,
        RuleKind::Filter,
        RuleKind::NoFilter,
    ];

    /// Configuration token for this kind.
    pub fn token(self) -> &'static str {
        match self {
            Self::Drop => "drop",
            Self::DropIfBlank => "dropbl",
            Self::DropIncludes => "dropincl",
            Self::Keep => "keep",
            Self::KeepIfBlank => "keepbl",
            Self::Before => "before",
            Self::Location => "location",
            Self::Filter => "filter",
            Self::NoFilter => "nofilter",
        }
    }

    /// Allowed operand count as `(min, max)`; `None` means unbounded.
    pub fn arity(self) -> (usize, Option<usize>) {
        match self {
            Self::Drop | Self::DropIncludes | Self::Keep | Self::Filter => (1, None),
            Self::DropIfBlank | Self::KeepIfBlank => (0, None),
            Self::Before => (1, Some(1)),
            Self::Location => (2, Some(2)),
            Self::NoFilter => (0, Some(0)),
        }
    }

    pub(crate) fn arity_label(self) -> &'static str {
        match self.arity() {
            (0, None) => "any number of",
            (1, None) => "at least 1",
            (0, Some(0)) => "no",
            (1, Some(1)) => "exactly 1",
            (2, Some(2)) => "exactly 2",
            _ => "a different number of",
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for RuleKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.token() == value)
            .ok_or_else(|| value.to_string())
    }
}

/// One named filtering condition.
///
/// Built only through `RunConfig`, so operand arity always matches the kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleDefinition {
    pub name: String,
    pub kind: RuleKind,
    /// Logical column (header text) the rule reads.
    pub target_column: String,
    pub operands: Vec<String>,
    /// Parsed `Before` threshold.
    pub threshold: Option<NaiveDate>,
}

impl RuleDefinition {
    /// Co-location and my-location rank table keys of a `Location` rule.
    pub fn location_tables(&self) -> Option<(&str, &str)> {
        match (self.kind, self.operands.as_slice()) {
            (RuleKind::Location, [co_location, my_location]) => {
                Some((co_location.as_str(), my_location.as_str()))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_round_trip() {
        for kind in RuleKind::ALL {
            assert_eq!(kind.token().parse::<RuleKind>(), Ok(kind));
        }
        assert!("Drop".parse::<RuleKind>().is_err());
    }
}
