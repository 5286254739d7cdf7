use thiserror::Error;

/// Problems found while validating the raw option mapping.
///
/// Every variant is fatal and is raised before any row is read.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("\"{option}\" option is missing from the configuration")]
    MissingOption { option: String },
    #[error("rule \"{rule}\" is listed in \"droprows\" but has no definition")]
    MissingRule { rule: String },
    #[error("rule \"{rule}\" needs at least a column header and a kind")]
    IncompleteRule { rule: String },
    #[error("rule \"{rule}\" has unrecognized kind \"{kind}\"")]
    UnknownRuleKind { rule: String, kind: String },
    #[error("rule \"{rule}\" ({kind}) expects {expected} operand(s), found {found}")]
    Arity {
        rule: String,
        kind: &'static str,
        expected: &'static str,
        found: usize,
    },
    #[error("rule \"{rule}\" has invalid date \"{value}\" (expected YYYYMMDD)")]
    InvalidDate { rule: String, value: String },
    #[error("\"{table}\" table referenced by \"{referenced_by}\" is not in the configuration")]
    MissingTable { table: String, referenced_by: String },
    #[error("entry \"{entry}\" has rank \"{value}\", expected a non-negative integer")]
    InvalidRank { entry: String, value: String },
    #[error("\"{option}\" has invalid value \"{value}\"")]
    InvalidOption { option: String, value: String },
}

/// Errors that abort a run.
#[derive(Debug, Error)]
pub enum SiftError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("did not find \"{column}\" column header (from \"{option}\")")]
    MissingColumn { column: String, option: String },
    #[error(
        "unable to locate the header row: searched first {scanned} rows for \"{marker}\" in column {position}"
    )]
    HeaderNotFound {
        marker: String,
        position: usize,
        scanned: usize,
    },
    #[error("too many unresolved My Location values ({count} > {limit})")]
    UnresolvedLocation { count: usize, limit: usize },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("store error: {0}")]
    Store(String),
}

pub type Result<T> = std::result::Result<T, SiftError>;

/// A cell that could not be read as the type a column requires.
///
/// Never fatal on its own: callers report it and skip or default the field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unable to read \"{found}\" as {expected}")]
pub struct TypeCoercionWarning {
    pub expected: &'static str,
    pub found: String,
}

impl TypeCoercionWarning {
    pub fn new(expected: &'static str, found: impl Into<String>) -> Self {
        Self {
            expected,
            found: found.into(),
        }
    }
}
