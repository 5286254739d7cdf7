pub mod backfill;
pub mod columns;
pub mod decision;
pub mod evaluate;
pub mod filter;
pub mod ledger;
pub mod locate;
pub mod location;
pub mod run_context;

pub use backfill::{
    BackfillDefaults, BackfillSummary, KEY_ERROR_LIMIT, run_backfill, split_action_label,
};
pub use columns::{ColumnIndex, HEADER_SCAN_LIMIT, ensure_column};
pub use decision::{RowDecisionEngine, RowVerdict};
pub use evaluate::{RowContext, RuleOutcome, evaluate};
pub use filter::{DELETE_TAG, FilterSummary, run_filter};
pub use ledger::{ActionEntry, ActionLedger};
pub use locate::{LocateSummary, run_locate};
pub use location::{
    CategoryResolver, LocationDirectory, MULTI_VALUE_SEPARATOR, ProximityComparator,
    UNRESOLVED_LOCATION_LIMIT,
};
pub use run_context::RunContext;
