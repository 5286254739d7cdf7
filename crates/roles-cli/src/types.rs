use std::path::PathBuf;

use roles_core::{BackfillSummary, FilterSummary, LocateSummary};

#[derive(Debug)]
pub struct FilterResult {
    pub summary: FilterSummary,
    /// Where the sheet was written; `None` in test mode.
    pub output: Option<PathBuf>,
}

#[derive(Debug)]
pub struct LocateResult {
    pub summary: LocateSummary,
    pub output: PathBuf,
}

#[derive(Debug)]
pub struct LedgerResult {
    pub summary: BackfillSummary,
    /// Where the ledger was written; `None` when nothing was added.
    pub output: Option<PathBuf>,
}
