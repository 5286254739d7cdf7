//! Validated run configuration.
//!
//! The configuration provider hands over a plain mapping from option name to
//! its ordered string arguments. [`RunConfig`] and [`LocateConfig`] check that
//! mapping once, up front, and expose typed views of it. Nothing here touches
//! a table.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::rank::RankTable;
use crate::rule::{RuleDefinition, RuleKind};

/// Option name to ordered argument list, as produced by the provider.
pub type RawConfig = BTreeMap<String, Vec<String>>;

pub const OPT_DROP_ROWS: &str = "droprows";
pub const OPT_DROP_ACTUAL: &str = "dropactual";
pub const OPT_SKIP_TO_HEADER: &str = "skip_to_header";
pub const OPT_COL_REQUEST: &str = "col_request";
pub const OPT_COL_MY_ACTION: &str = "col_my_act";
pub const OPT_COL_MY_FILTER: &str = "col_my_filter";
pub const OPT_COL_MY_INSERT: &str = "col_my_insert";
pub const OPT_COL_CO_LOCATION: &str = "col_colocation";
pub const OPT_COL_MY_LOCATION: &str = "col_mylocation";
pub const OPT_COL_ACTION_REQUEST: &str = "col_act_rqust";
pub const OPT_COL_ACTION: &str = "col_action";
pub const OPT_COL_ACTION_DATE: &str = "col_action_dt";
pub const OPT_COL_PROJECT_LOCATION: &str = "col_projlocat";
pub const OPT_COL_LOCATION: &str = "col_location";
pub const OPT_COL_REQUEST_OFFICE: &str = "col_reqoffice";
pub const OPT_REQUEST_OFFICE_ALIAS: &str = "reqoffice_alias";
pub const OPT_LOCATION_COMPARE: &str = "locompare";

/// Date format of a `before` threshold operand.
const THRESHOLD_FORMAT: &str = "%Y%m%d";

/// What happens to a row once a rule drops it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DropMode {
    /// Physically delete dropped rows.
    Delete,
    /// Keep dropped rows and tag them `DELETE`.
    #[default]
    Mark,
    /// Validate configuration and inputs, then stop before touching rows.
    Test,
}

/// Literal header text expected at a fixed position of the header row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderMarker {
    pub marker: String,
    pub position: usize,
}

/// A logical column the table must provide, and the option or rule asking for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRequirement {
    pub column: String,
    pub source: String,
}

/// Output columns written by the filter pass, and the anchor used to insert them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputColumns {
    pub action: String,
    pub filter: String,
    pub insert_after: Option<String>,
}

/// Column headers of the Action ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerColumns {
    pub request: String,
    pub action: String,
    pub date: String,
}

/// Configuration of the filter pass.
#[derive(Debug, Clone)]
pub struct RunConfig {
    rules: Vec<RuleDefinition>,
    request_column: String,
    co_location_column: Option<String>,
    my_location_column: Option<String>,
    output: OutputColumns,
    ledger: LedgerColumns,
    header_marker: Option<HeaderMarker>,
    drop_mode: DropMode,
    rank_tables: BTreeMap<String, RankTable>,
    notices: Vec<String>,
}

impl RunConfig {
    pub fn from_raw(raw: &RawConfig) -> Result<Self, ConfigError> {
        let mut notices = Vec::new();

        let rule_names = raw
            .get(OPT_DROP_ROWS)
            .filter(|names| !names.is_empty())
            .ok_or_else(|| missing(OPT_DROP_ROWS))?;
        let mut rules = Vec::with_capacity(rule_names.len());
        let mut rank_tables = BTreeMap::new();
        for name in rule_names {
            let rule = parse_rule(raw, name)?;
            if let Some((co_location, my_location)) = rule.location_tables() {
                for table in [co_location, my_location] {
                    if !rank_tables.contains_key(table) {
                        let parsed = parse_rank_table(raw, table, name)?;
                        rank_tables.insert(table.to_string(), parsed);
                    }
                }
            }
            rules.push(rule);
        }

        let has_location = rules.iter().any(|rule| rule.kind == RuleKind::Location);
        let (co_location_column, my_location_column) = if has_location {
            (
                Some(required_value(raw, OPT_COL_CO_LOCATION)?),
                Some(required_value(raw, OPT_COL_MY_LOCATION)?),
            )
        } else {
            (
                optional_value(raw, OPT_COL_CO_LOCATION),
                optional_value(raw, OPT_COL_MY_LOCATION),
            )
        };

        let drop_mode = match raw.get(OPT_DROP_ACTUAL).and_then(|values| values.first()) {
            None => {
                notices.push(format!(
                    "Did not locate \"{OPT_DROP_ACTUAL}\" option. Default to \"False\"."
                ));
                DropMode::Mark
            }
            Some(value) => match value.as_str() {
                "True" => DropMode::Delete,
                "False" => DropMode::Mark,
                "Test" => DropMode::Test,
                other => {
                    return Err(ConfigError::InvalidOption {
                        option: OPT_DROP_ACTUAL.to_string(),
                        value: other.to_string(),
                    });
                }
            },
        };

        Ok(Self {
            rules,
            request_column: required_value(raw, OPT_COL_REQUEST)?,
            co_location_column,
            my_location_column,
            output: OutputColumns {
                action: required_value(raw, OPT_COL_MY_ACTION)?,
                filter: required_value(raw, OPT_COL_MY_FILTER)?,
                insert_after: optional_value(raw, OPT_COL_MY_INSERT),
            },
            ledger: LedgerColumns {
                request: required_value(raw, OPT_COL_ACTION_REQUEST)?,
                action: required_value(raw, OPT_COL_ACTION)?,
                date: required_value(raw, OPT_COL_ACTION_DATE)?,
            },
            header_marker: parse_header_marker(raw, &mut notices),
            drop_mode,
            rank_tables,
            notices,
        })
    }

    /// Rules in declared order.
    pub fn rules(&self) -> &[RuleDefinition] {
        &self.rules
    }

    /// Columns that must already exist in the table header.
    ///
    /// Output columns are not listed: the resolver inserts them when absent.
    pub fn required_columns(&self) -> Vec<ColumnRequirement> {
        let mut required = vec![ColumnRequirement {
            column: self.request_column.clone(),
            source: OPT_COL_REQUEST.to_string(),
        }];
        if self.rules.iter().any(|rule| rule.kind == RuleKind::Location) {
            if let Some(column) = &self.co_location_column {
                required.push(ColumnRequirement {
                    column: column.clone(),
                    source: OPT_COL_CO_LOCATION.to_string(),
                });
            }
            if let Some(column) = &self.my_location_column {
                required.push(ColumnRequirement {
                    column: column.clone(),
                    source: OPT_COL_MY_LOCATION.to_string(),
                });
            }
        }
        for rule in &self.rules {
            if !required.iter().any(|req| req.column == rule.target_column) {
                required.push(ColumnRequirement {
                    column: rule.target_column.clone(),
                    source: rule.name.clone(),
                });
            }
        }
        required
    }

    pub fn request_column(&self) -> &str {
        &self.request_column
    }

    pub fn co_location_column(&self) -> Option<&str> {
        self.co_location_column.as_deref()
    }

    pub fn my_location_column(&self) -> Option<&str> {
        self.my_location_column.as_deref()
    }

    pub fn output_columns(&self) -> &OutputColumns {
        &self.output
    }

    pub fn ledger_columns(&self) -> &LedgerColumns {
        &self.ledger
    }

    pub fn header_marker(&self) -> Option<&HeaderMarker> {
        self.header_marker.as_ref()
    }

    pub fn drop_mode(&self) -> DropMode {
        self.drop_mode
    }

    pub fn rank_table(&self, key: &str) -> Option<&RankTable> {
        self.rank_tables.get(key)
    }

    /// Non-fatal findings to report before the run starts.
    pub fn notices(&self) -> &[String] {
        &self.notices
    }
}

/// Configuration of the locate pass, which fills in My Location.
#[derive(Debug, Clone)]
pub struct LocateConfig {
    pub request_column: String,
    pub project_location_column: String,
    pub my_location_column: String,
    /// Office column substituted when the project location equals the alias.
    pub office: Option<(String, String)>,
    pub compare: RankTable,
    pub header_marker: Option<HeaderMarker>,
    pub notices: Vec<String>,
}

impl LocateConfig {
    pub fn from_raw(raw: &RawConfig) -> Result<Self, ConfigError> {
        let mut notices = Vec::new();
        let office = match (
            optional_value(raw, OPT_COL_REQUEST_OFFICE),
            optional_value(raw, OPT_REQUEST_OFFICE_ALIAS),
        ) {
            (Some(column), Some(alias)) => Some((column, alias)),
            (Some(_), None) => {
                notices.push(format!(
                    "\"{OPT_COL_REQUEST_OFFICE}\" is set without \"{OPT_REQUEST_OFFICE_ALIAS}\"; ignoring it."
                ));
                None
            }
            _ => None,
        };
        Ok(Self {
            request_column: required_value(raw, OPT_COL_REQUEST)?,
            project_location_column: required_value(raw, OPT_COL_PROJECT_LOCATION)?,
            my_location_column: required_value(raw, OPT_COL_LOCATION)?,
            office,
            compare: parse_rank_table(raw, OPT_LOCATION_COMPARE, OPT_LOCATION_COMPARE)?,
            header_marker: parse_header_marker(raw, &mut notices),
            notices,
        })
    }
}

/// Configuration of the ledger backfill pass, which copies "My Action"
/// labels from a filtered Roles sheet into the Action ledger.
#[derive(Debug, Clone)]
pub struct BackfillConfig {
    pub request_column: String,
    pub action_column: String,
    pub ledger: LedgerColumns,
    pub header_marker: Option<HeaderMarker>,
    pub notices: Vec<String>,
}

impl BackfillConfig {
    pub fn from_raw(raw: &RawConfig) -> Result<Self, ConfigError> {
        let mut notices = Vec::new();
        Ok(Self {
            request_column: required_value(raw, OPT_COL_REQUEST)?,
            action_column: required_value(raw, OPT_COL_MY_ACTION)?,
            ledger: LedgerColumns {
                request: required_value(raw, OPT_COL_ACTION_REQUEST)?,
                action: required_value(raw, OPT_COL_ACTION)?,
                date: required_value(raw, OPT_COL_ACTION_DATE)?,
            },
            header_marker: parse_header_marker(raw, &mut notices),
            notices,
        })
    }
}

fn missing(option: &str) -> ConfigError {
    ConfigError::MissingOption {
        option: option.to_string(),
    }
}

fn optional_value(raw: &RawConfig, option: &str) -> Option<String> {
    raw.get(option)
        .and_then(|values| values.first())
        .filter(|value| !value.trim().is_empty())
        .cloned()
}

fn required_value(raw: &RawConfig, option: &str) -> Result<String, ConfigError> {
    optional_value(raw, option).ok_or_else(|| missing(option))
}

fn parse_rule(raw: &RawConfig, name: &str) -> Result<RuleDefinition, ConfigError> {
    let values = raw.get(name).ok_or_else(|| ConfigError::MissingRule {
        rule: name.to_string(),
    })?;
    let [target_column, kind_token, operands @ ..] = values.as_slice() else {
        return Err(ConfigError::IncompleteRule {
            rule: name.to_string(),
        });
    };
    let kind: RuleKind = kind_token
        .parse()
        .map_err(|kind| ConfigError::UnknownRuleKind {
            rule: name.to_string(),
            kind,
        })?;

    let (min, max) = kind.arity();
    if operands.len() < min || max.is_some_and(|max| operands.len() > max) {
        return Err(ConfigError::Arity {
            rule: name.to_string(),
            kind: kind.token(),
            expected: kind.arity_label(),
            found: operands.len(),
        });
    }

    let threshold = if kind == RuleKind::Before {
        let value = &operands[0];
        let date = NaiveDate::parse_from_str(value.trim(), THRESHOLD_FORMAT).map_err(|_| {
            ConfigError::InvalidDate {
                rule: name.to_string(),
                value: value.clone(),
            }
        })?;
        Some(date)
    } else {
        None
    };

    Ok(RuleDefinition {
        name: name.to_string(),
        kind,
        target_column: target_column.clone(),
        operands: operands.to_vec(),
        threshold,
    })
}

/// Read `key -> [entry…]`, each `entry -> [rank, label…]`.
fn parse_rank_table(
    raw: &RawConfig,
    key: &str,
    referenced_by: &str,
) -> Result<RankTable, ConfigError> {
    let entries = raw.get(key).ok_or_else(|| ConfigError::MissingTable {
        table: key.to_string(),
        referenced_by: referenced_by.to_string(),
    })?;
    let mut table = RankTable::new(key);
    for entry in entries {
        let values = raw.get(entry).ok_or_else(|| ConfigError::MissingTable {
            table: entry.clone(),
            referenced_by: key.to_string(),
        })?;
        let (rank_text, labels) = values.split_first().ok_or_else(|| ConfigError::InvalidRank {
            entry: entry.clone(),
            value: String::new(),
        })?;
        let rank = rank_text
            .trim()
            .parse::<u32>()
            .map_err(|_| ConfigError::InvalidRank {
                entry: entry.clone(),
                value: rank_text.clone(),
            })?;
        for label in labels {
            table.insert(label.clone(), rank);
        }
    }
    Ok(table)
}

fn parse_header_marker(raw: &RawConfig, notices: &mut Vec<String>) -> Option<HeaderMarker> {
    let values = raw.get(OPT_SKIP_TO_HEADER)?;
    let marker = values.first()?.clone();
    let position = match values.get(1) {
        None => 0,
        Some(text) => match text.trim().parse::<i64>() {
            Ok(value) if value >= 0 => usize::try_from(value).unwrap_or(0),
            _ => {
                notices.push(format!(
                    "Expected a positive number in the second argument of \"{OPT_SKIP_TO_HEADER}\", but found \"{text}\". Defaulting to zero."
                ));
                0
            }
        },
    };
    Some(HeaderMarker { marker, position })
}
