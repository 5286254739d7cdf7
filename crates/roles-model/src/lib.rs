pub mod cell;
pub mod config;
pub mod error;
pub mod rank;
pub mod report;
pub mod rule;
pub mod table;
pub mod tally;

pub use cell::{CellValue, RequestId};
pub use config::{
    BackfillConfig, ColumnRequirement, DropMode, HeaderMarker, LedgerColumns, LocateConfig,
    OutputColumns, RawConfig, RunConfig,
};
pub use error::{ConfigError, Result, SiftError, TypeCoercionWarning};
pub use rank::{NON_CATEGORY, RankTable, UNKNOWN_CATEGORY};
pub use report::{MemoryReporter, Reporter};
pub use rule::{RuleDefinition, RuleKind};
pub use table::{MemoryTable, TabularStore};
pub use tally::{RuleDropCount, RunTally};
