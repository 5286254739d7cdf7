//! Ledger backfill: copy "My Action" labels from a filtered Roles sheet into
//! the Action ledger.
//!
//! This is the inverse of the action merge done by the filter pass. Requests
//! the ledger already holds are left alone; every other request becomes a new
//! ledger row.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{info, info_span};

use roles_model::config::{
    OPT_COL_ACTION, OPT_COL_ACTION_DATE, OPT_COL_ACTION_REQUEST, OPT_COL_MY_ACTION,
    OPT_COL_REQUEST,
};
use roles_model::{
    BackfillConfig, CellValue, RequestId, Result, TabularStore, TypeCoercionWarning,
};

use crate::columns::ColumnIndex;
use crate::ledger::ActionEntry;
use crate::run_context::RunContext;

/// Unreadable request ids tolerated before the pass stops reading.
pub const KEY_ERROR_LIMIT: usize = 11;

const LABEL_DATE_FORMAT: &str = "%m/%d/%Y";

/// Action and date for rows whose label is blank or has no trailing date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackfillDefaults {
    pub action: String,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BackfillSummary {
    /// Source rows with a request id.
    pub rows: usize,
    /// Requests already in the ledger.
    pub matched: usize,
    pub added: usize,
    pub key_errors: usize,
    /// Set when more than [`KEY_ERROR_LIMIT`] request ids could not be read.
    pub stopped_early: bool,
}

/// Split a `"<action> MM/DD/YYYY"` label into a ledger entry.
///
/// A blank label takes both defaults. A label without a readable trailing
/// date keeps its whole text as the action, takes the default date, and
/// comes back with a warning.
pub fn split_action_label(
    label: &str,
    defaults: &BackfillDefaults,
) -> (ActionEntry, Option<TypeCoercionWarning>) {
    let label = label.trim();
    if label.is_empty() {
        return (ActionEntry::new(defaults.action.as_str(), defaults.date), None);
    }
    let parsed = label
        .rsplit_once(char::is_whitespace)
        .and_then(|(action, date)| {
            NaiveDate::parse_from_str(date, LABEL_DATE_FORMAT)
                .ok()
                .map(|date| ActionEntry::new(action.trim(), date))
        });
    match parsed {
        Some(entry) => (entry, None),
        None => (
            ActionEntry::new(label, defaults.date),
            Some(TypeCoercionWarning::new("an action and MM/DD/YYYY date", label)),
        ),
    }
}

/// Append every request of `source` that `ledger` does not hold yet.
///
/// A request listed twice in `source` is added once; the repeat counts as
/// matched. The caller saves the ledger.
pub fn run_backfill(
    config: &BackfillConfig,
    source: &dyn TabularStore,
    ledger: &mut dyn TabularStore,
    defaults: &BackfillDefaults,
    run: &mut RunContext<'_>,
) -> Result<BackfillSummary> {
    let _span = info_span!("backfill").entered();
    for notice in &config.notices {
        run.report(notice);
    }

    let ledger_columns = ColumnIndex::from_header(ledger.row(0).unwrap_or_default(), 0);
    let ledger_request_ix =
        ledger_columns.require(&config.ledger.request, OPT_COL_ACTION_REQUEST)?;
    let ledger_action_ix = ledger_columns.require(&config.ledger.action, OPT_COL_ACTION)?;
    let ledger_date_ix = ledger_columns.require(&config.ledger.date, OPT_COL_ACTION_DATE)?;
    let columns = ColumnIndex::resolve(source, config.header_marker.as_ref())?;
    let request_ix = columns.require(&config.request_column, OPT_COL_REQUEST)?;
    let label_ix = columns.require(&config.action_column, OPT_COL_MY_ACTION)?;

    let mut known: BTreeSet<RequestId> = (ledger_columns.first_data_row()..ledger.row_count())
        .filter_map(|row| ledger.cell(row, ledger_request_ix))
        .filter_map(|cell| RequestId::from_cell(cell).ok())
        .collect();
    let width = ledger_request_ix.max(ledger_action_ix).max(ledger_date_ix) + 1;
    let data_rows = source.row_count().saturating_sub(columns.first_data_row());

    let mut summary = BackfillSummary::default();
    for index in columns.first_data_row()..source.row_count() {
        let Some(request) = source.cell(index, request_ix).filter(|cell| !cell.is_blank()) else {
            continue;
        };
        summary.rows += 1;
        let location = format!("row {}", index + 1);
        let id = match RequestId::from_cell(request) {
            Ok(id) => id,
            Err(warning) => {
                run.coercion_warning(&location, &warning);
                summary.key_errors += 1;
                if summary.key_errors > KEY_ERROR_LIMIT {
                    run.report(format!(
                        "Ending process b/c key errors. Worksheet size is {data_rows}."
                    ));
                    summary.stopped_early = true;
                    break;
                }
                continue;
            }
        };
        if !known.insert(id) {
            summary.matched += 1;
            continue;
        }

        let label = source
            .cell(index, label_ix)
            .map(ToString::to_string)
            .unwrap_or_default();
        let (entry, warning) = split_action_label(&label, defaults);
        if let Some(warning) = warning {
            run.coercion_warning(&location, &warning);
        }
        let mut cells = vec![CellValue::Empty; width];
        cells[ledger_request_ix] = request.clone();
        cells[ledger_action_ix] = CellValue::text(entry.action);
        let date = entry.date.format(LABEL_DATE_FORMAT).to_string();
        cells[ledger_date_ix] = CellValue::text(date);
        ledger.append_row(cells);
        summary.added += 1;
    }

    run.report(format!("{} Requests read.", summary.rows));
    run.report(format!(
        "{} Requests added to the Action ledger. {} matching - already listed.",
        summary.added, summary.matched
    ));
    info!(
        rows = summary.rows,
        added = summary.added,
        matched = summary.matched,
        key_errors = summary.key_errors,
        "backfill complete"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> BackfillDefaults {
        BackfillDefaults {
            action: "Reviewed".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 6, 1).expect("date"),
        }
    }

    #[test]
    fn labels_split_on_the_trailing_date() {
        let (entry, warning) = split_action_label(" Phone screen  03/15/2024 ", &defaults());
        assert_eq!(entry.action, "Phone screen");
        assert_eq!(entry.date, NaiveDate::from_ymd_opt(2024, 3, 15).expect("date"));
        assert!(warning.is_none());
    }

    #[test]
    fn blank_and_dateless_labels_use_defaults() {
        let (entry, warning) = split_action_label("  ", &defaults());
        assert_eq!(entry, ActionEntry::new("Reviewed", defaults().date));
        assert!(warning.is_none());

        let (entry, warning) = split_action_label("Applied", &defaults());
        assert_eq!(entry, ActionEntry::new("Applied", defaults().date));
        assert!(warning.is_some());

        let (entry, warning) = split_action_label("Applied soon", &defaults());
        assert_eq!(entry.action, "Applied soon");
        assert!(warning.is_some());
    }
}
