//! The locate pass: fill My Location from the project location.

use serde::Serialize;
use tracing::{info, info_span};

use roles_model::config::{OPT_COL_PROJECT_LOCATION, OPT_COL_REQUEST};
use roles_model::{CellValue, LocateConfig, Result, TabularStore};

use crate::columns::{ColumnIndex, ensure_column};
use crate::location::{CategoryResolver, LocationDirectory};
use crate::run_context::RunContext;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LocateSummary {
    /// Rows with a request id.
    pub rows: usize,
    pub matched: usize,
    /// Values beyond the first in multi-valued cells.
    pub multi: usize,
    pub inserted_column: bool,
    /// Unique unresolved locations, in first-seen order.
    pub unresolved: Vec<String>,
}

pub fn run_locate(
    config: &LocateConfig,
    store: &mut dyn TabularStore,
    directory: &LocationDirectory,
    run: &mut RunContext<'_>,
) -> Result<LocateSummary> {
    let _span = info_span!("locate", directory = directory.len()).entered();
    for notice in &config.notices {
        run.report(notice);
    }
    run.report(format!("Read {} locations.", directory.len()));

    let mut columns = ColumnIndex::resolve(store, config.header_marker.as_ref())?;
    columns.require(&config.request_column, OPT_COL_REQUEST)?;
    let project_ix = columns.require(&config.project_location_column, OPT_COL_PROJECT_LOCATION)?;
    let inserted_column = columns.position(&config.my_location_column).is_none();
    let my_location_ix =
        ensure_column(store, &mut columns, &config.my_location_column, project_ix, run);
    let request_ix = columns.require(&config.request_column, OPT_COL_REQUEST)?;
    let office_ix = config
        .office
        .as_ref()
        .and_then(|(column, alias)| columns.position(column).map(|ix| (ix, alias.as_str())));

    let mut resolver = CategoryResolver::new(directory, &config.compare);
    let mut rows = 0;
    let mut updates = Vec::new();
    for index in columns.first_data_row()..store.row_count() {
        let cell = |column: usize| store.cell(index, column).cloned().unwrap_or_default();
        if cell(request_ix).is_blank() {
            continue;
        }
        rows += 1;
        let mut project = cell(project_ix);
        if let Some((office, alias)) = office_ix
            && project.to_string().trim() == alias
        {
            project = cell(office);
        }
        updates.push((index, resolver.resolve_cell(&project)));
    }
    for (index, category) in updates {
        store.set_cell(index, my_location_ix, CellValue::text(category));
    }

    let summary = LocateSummary {
        rows,
        matched: resolver.matched,
        multi: resolver.multi,
        inserted_column,
        unresolved: resolver.into_unresolved(),
    };
    let multi = if summary.multi > 0 {
        format!(
            " + {} additional (multi) values = {}.",
            summary.multi,
            summary.rows + summary.multi
        )
    } else {
        ".".to_string()
    };
    run.report(format!(
        "Matched Project Location for {} out of {} rows{multi}",
        summary.matched, summary.rows
    ));
    run.report(format!(
        "{} unique Project Locations still not identified.",
        summary.unresolved.len()
    ));
    for location in &summary.unresolved {
        run.report(format!("  {location}"));
    }
    info!(
        rows = summary.rows,
        matched = summary.matched,
        unresolved = summary.unresolved.len(),
        "locate complete"
    );
    Ok(summary)
}
