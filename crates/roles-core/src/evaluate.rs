//! Per-rule predicates.

use roles_model::{CellValue, RuleDefinition, RuleKind};

use crate::columns::ColumnIndex;

static EMPTY_CELL: CellValue = CellValue::Empty;

/// Result of evaluating one rule against one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleOutcome {
    Drop,
    Keep,
    /// The caller must run the proximity check for this row.
    DeferToLocationCheck,
    NoOp,
}

/// Evaluation state of a single row. Created per row, never reused.
#[derive(Debug)]
pub struct RowContext<'r> {
    row: &'r [CellValue],
    columns: &'r ColumnIndex,
    pub filter_tag: String,
    pub filter_found: bool,
    pub co_location_pending: bool,
}

impl<'r> RowContext<'r> {
    pub fn new(row: &'r [CellValue], columns: &'r ColumnIndex) -> Self {
        Self {
            row,
            columns,
            filter_tag: String::new(),
            filter_found: false,
            co_location_pending: false,
        }
    }

    /// Cell under the named header; unknown columns and short rows read as empty.
    pub fn cell(&self, column: &str) -> &'r CellValue {
        self.columns
            .position(column)
            .and_then(|position| self.row.get(position))
            .unwrap_or(&EMPTY_CELL)
    }
}

/// Evaluate `rule` against `cell`.
///
/// Only `Filter` and `Location` touch `ctx`; nothing here writes to the table.
pub fn evaluate(rule: &RuleDefinition, cell: &CellValue, ctx: &mut RowContext<'_>) -> RuleOutcome {
    match rule.kind {
        RuleKind::Drop => drop_on_match(equals_any(cell, &rule.operands)),
        RuleKind::DropIfBlank => {
            drop_on_match(cell.is_blank() || equals_any(cell, &rule.operands))
        }
        RuleKind::DropIncludes => {
            drop_on_match(!cell.is_blank() && find_included(cell, &rule.operands).is_some())
        }
        RuleKind::Keep => keep_on_match(!cell.is_blank() && equals_any(cell, &rule.operands)),
        RuleKind::KeepIfBlank => {
            keep_on_match(cell.is_blank() || equals_any(cell, &rule.operands))
        }
        RuleKind::Before => match (cell.as_date(), rule.threshold) {
            (Some(date), Some(threshold)) => keep_on_match(date < threshold),
            _ => RuleOutcome::NoOp,
        },
        RuleKind::Location => {
            ctx.co_location_pending = true;
            RuleOutcome::DeferToLocationCheck
        }
        RuleKind::Filter => {
            if !ctx.filter_found
                && let Some(tag) = find_included(cell, &rule.operands)
            {
                ctx.filter_tag = tag.to_string();
                ctx.filter_found = true;
            }
            RuleOutcome::NoOp
        }
        RuleKind::NoFilter => drop_on_match(!ctx.filter_found),
    }
}

fn drop_on_match(matched: bool) -> RuleOutcome {
    if matched {
        RuleOutcome::Drop
    } else {
        RuleOutcome::NoOp
    }
}

fn keep_on_match(matched: bool) -> RuleOutcome {
    if matched {
        RuleOutcome::Keep
    } else {
        RuleOutcome::Drop
    }
}

fn equals_any(cell: &CellValue, operands: &[String]) -> bool {
    cell.as_text()
        .is_some_and(|text| operands.iter().any(|operand| operand == text.as_ref()))
}

/// First operand contained in the cell text, ignoring case.
fn find_included<'o>(cell: &CellValue, operands: &'o [String]) -> Option<&'o str> {
    let text = cell.as_text()?.to_lowercase();
    operands
        .iter()
        .find(|operand| text.contains(&operand.to_lowercase()))
        .map(String::as_str)
}
