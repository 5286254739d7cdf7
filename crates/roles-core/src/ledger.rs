//! Prior apply/pass decisions keyed by request id.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::info;

use roles_model::config::{OPT_COL_ACTION, OPT_COL_ACTION_DATE, OPT_COL_ACTION_REQUEST};
use roles_model::{LedgerColumns, RequestId, Result, TabularStore, TypeCoercionWarning};

use crate::columns::ColumnIndex;
use crate::run_context::RunContext;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionEntry {
    pub action: String,
    pub date: NaiveDate,
}

impl ActionEntry {
    pub fn new(action: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            action: action.into(),
            date,
        }
    }

    /// `"<action> MM/DD/YYYY"`, as written to the action column.
    pub fn label(&self) -> String {
        format!("{} {}", self.action, self.date.format("%m/%d/%Y"))
    }
}

/// Read-only during the row pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionLedger {
    entries: BTreeMap<RequestId, ActionEntry>,
}

impl ActionLedger {
    /// Load the ledger table. Its header is the first row.
    ///
    /// Rows with a blank request cell are skipped silently; rows whose request
    /// or date cannot be read are reported and skipped. A later row for the
    /// same request replaces an earlier one.
    pub fn from_store(
        store: &dyn TabularStore,
        columns: &LedgerColumns,
        run: &mut RunContext<'_>,
    ) -> Result<Self> {
        let header = ColumnIndex::from_header(store.row(0).unwrap_or_default(), 0);
        let request_ix = header.require(&columns.request, OPT_COL_ACTION_REQUEST)?;
        let action_ix = header.require(&columns.action, OPT_COL_ACTION)?;
        let date_ix = header.require(&columns.date, OPT_COL_ACTION_DATE)?;

        let mut ledger = Self::default();
        for row in header.first_data_row()..store.row_count() {
            let Some(request) = store.cell(row, request_ix).filter(|cell| !cell.is_blank()) else {
                continue;
            };
            let location = format!("ledger row {}", row + 1);
            let request = match RequestId::from_cell(request) {
                Ok(request) => request,
                Err(warning) => {
                    run.coercion_warning(&location, &warning);
                    continue;
                }
            };
            let date_cell = store.cell(row, date_ix).cloned().unwrap_or_default();
            let Some(date) = date_cell.as_date() else {
                let warning = TypeCoercionWarning::new("a date", date_cell.to_string());
                run.coercion_warning(&location, &warning);
                continue;
            };
            let action = store
                .cell(row, action_ix)
                .map(ToString::to_string)
                .unwrap_or_default();
            ledger.insert(request, ActionEntry::new(action.trim(), date));
        }
        info!(entries = ledger.len(), "action ledger loaded");
        run.report(format!("Read {} actions.", ledger.len()));
        Ok(ledger)
    }

    pub fn insert(&mut self, request: RequestId, entry: ActionEntry) {
        self.entries.insert(request, entry);
    }

    pub fn get(&self, request: RequestId) -> Option<&ActionEntry> {
        self.entries.get(&request)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(RequestId, ActionEntry)> for ActionLedger {
    fn from_iter<I: IntoIterator<Item = (RequestId, ActionEntry)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
