//! The filter pass over a Roles sheet.

use std::time::Instant;

use serde::Serialize;
use tracing::{info, info_span};

use roles_model::config::{OPT_COL_MY_ACTION, OPT_COL_MY_INSERT, OPT_COL_REQUEST};
use roles_model::{CellValue, DropMode, Result, RunConfig, RunTally, SiftError, TabularStore};

use crate::columns::{ColumnIndex, ensure_column};
use crate::decision::{RowDecisionEngine, RowVerdict};
use crate::evaluate::RowContext;
use crate::ledger::ActionLedger;
use crate::run_context::RunContext;

/// Filter tag written to dropped rows when they are marked instead of deleted.
pub const DELETE_TAG: &str = "DELETE";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterSummary {
    pub mode: DropMode,
    pub header_row: usize,
    pub inserted_columns: Vec<String>,
    pub deleted_rows: usize,
    pub marked_rows: usize,
    pub tally: RunTally,
}

/// Where a row's outcome gets written once the row borrow is released.
struct RowUpdate {
    row: usize,
    action: Option<String>,
    tag: Option<String>,
}

/// Apply the configured rules to every data row of `store`.
///
/// Column problems fail before any row is touched. In `Test` mode the pass
/// stops after column resolution. The caller saves the store.
pub fn run_filter(
    config: &RunConfig,
    store: &mut dyn TabularStore,
    ledger: &ActionLedger,
    run: &mut RunContext<'_>,
) -> Result<FilterSummary> {
    let _span = info_span!("filter", rules = config.rules().len()).entered();
    let started = Instant::now();
    for notice in config.notices() {
        run.report(notice);
    }
    if run.tally.drops_by_rule.is_empty() {
        run.tally.drops_by_rule = RunTally::for_rules(config.rules()).drops_by_rule;
    }

    let mut columns = ColumnIndex::resolve(store, config.header_marker())?;
    columns.require_all(&config.required_columns())?;

    let output = config.output_columns();
    let mut inserted_columns = Vec::new();
    let action_ix = match columns.position(&output.action) {
        Some(position) => position,
        None => {
            let anchor = output
                .insert_after
                .as_deref()
                .ok_or_else(|| SiftError::MissingColumn {
                    column: output.action.clone(),
                    option: OPT_COL_MY_ACTION.to_string(),
                })?;
            let anchor_ix = columns.require(anchor, OPT_COL_MY_INSERT)?;
            inserted_columns.push(output.action.clone());
            ensure_column(store, &mut columns, &output.action, anchor_ix, run)
        }
    };
    if columns.position(&output.filter).is_none() {
        inserted_columns.push(output.filter.clone());
    }
    let filter_ix = ensure_column(store, &mut columns, &output.filter, action_ix, run);
    let request_ix = columns.require(config.request_column(), OPT_COL_REQUEST)?;

    let mut summary = FilterSummary {
        mode: config.drop_mode(),
        header_row: columns.header_row(),
        inserted_columns,
        deleted_rows: 0,
        marked_rows: 0,
        tally: RunTally::default(),
    };
    if config.drop_mode() == DropMode::Test {
        run.report("Test mode: configuration and columns checked, no rows processed.");
        summary.tally = run.tally.clone();
        return Ok(summary);
    }

    let engine = RowDecisionEngine::new(config);
    let mut updates = Vec::new();
    let mut doomed = Vec::new();
    for index in columns.first_data_row()..store.row_count() {
        let Some(cells) = store.row(index) else {
            continue;
        };
        let request = cells.get(request_ix).cloned().unwrap_or_default();
        if request.is_blank() {
            continue;
        }
        run.tally.rows += 1;

        let mut ctx = RowContext::new(cells, &columns);
        let verdict = engine.decide(&mut ctx, run)?;
        let mut tag = ctx.filter_found.then_some(ctx.filter_tag);
        let mut action = None;
        match verdict {
            RowVerdict::Drop { .. } => match config.drop_mode() {
                DropMode::Delete => {
                    doomed.push(index);
                    continue;
                }
                _ => tag = Some(DELETE_TAG.to_string()),
            },
            RowVerdict::Keep => {
                action =
                    engine.merge_action(ledger, &request, &format!("row {}", index + 1), run);
                if tag.is_none() {
                    run.tally.no_filter += 1;
                }
            }
        }
        updates.push(RowUpdate {
            row: index,
            action,
            tag,
        });
    }

    for update in updates {
        if let Some(action) = update.action {
            store.set_cell(update.row, action_ix, CellValue::text(action));
        }
        if let Some(tag) = update.tag {
            store.set_cell(update.row, filter_ix, CellValue::text(tag));
        }
    }

    let dropped = run.tally.dropped;
    match config.drop_mode() {
        DropMode::Delete => {
            run.report(format!("Dropping {dropped} rows."));
            for index in doomed.iter().rev() {
                store.delete_row(*index);
            }
            summary.deleted_rows = doomed.len();
        }
        _ => {
            run.report(format!(
                "No rows actually deleted during this run. {dropped} rows marked with \"{DELETE_TAG}\" in \"{}\" column.",
                output.filter
            ));
            summary.marked_rows = dropped;
        }
    }

    report_totals(run, &output.filter);
    info!(
        rows = run.tally.rows,
        dropped,
        matched = run.tally.matched,
        duration_ms = started.elapsed().as_millis(),
        "filter complete"
    );
    summary.tally = run.tally.clone();
    Ok(summary)
}

fn report_totals(run: &mut RunContext<'_>, filter_column: &str) {
    let lines: Vec<String> = run
        .tally
        .drops_by_rule
        .iter()
        .filter(|entry| entry.dropped > 0)
        .map(|entry| format!("Dropped {} rows b/c \"{}\" value.", entry.dropped, entry.column))
        .collect();
    for line in lines {
        run.report(line);
    }
    let tally = &run.tally;
    let totals = format!(
        "{} rows matched, {} rows not matched, from {} output rows",
        tally.matched,
        tally.not_matched,
        tally.output_rows()
    );
    let blanks = format!(
        "{} output rows with blank in \"{filter_column}\" column.",
        tally.no_filter
    );
    run.report(totals);
    run.report(blanks);
}
