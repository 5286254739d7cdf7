//! Row verdicts: rules in declared order, first drop wins.

use tracing::debug;

use roles_model::config::{OPT_COL_CO_LOCATION, OPT_COL_MY_LOCATION};
use roles_model::{
    CellValue, ConfigError, RankTable, RequestId, Result, RuleDefinition, RunConfig, SiftError,
};

use crate::evaluate::{RowContext, RuleOutcome, evaluate};
use crate::ledger::ActionLedger;
use crate::run_context::RunContext;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowVerdict {
    Keep,
    /// Dropped by the named rule.
    Drop { rule: String },
}

impl RowVerdict {
    pub fn is_drop(&self) -> bool {
        matches!(self, Self::Drop { .. })
    }
}

/// Applies a configuration's rules to rows.
#[derive(Debug, Clone, Copy)]
pub struct RowDecisionEngine<'c> {
    config: &'c RunConfig,
}

impl<'c> RowDecisionEngine<'c> {
    pub fn new(config: &'c RunConfig) -> Self {
        Self { config }
    }

    /// Evaluate every rule in order until one drops the row.
    ///
    /// The dropping rule's tally is incremented once; later rules are not
    /// evaluated and leave `ctx` and the tally untouched. The only error is
    /// the unresolved My Location ceiling.
    pub fn decide(
        &self,
        ctx: &mut RowContext<'_>,
        run: &mut RunContext<'_>,
    ) -> Result<RowVerdict> {
        for rule in self.config.rules() {
            let cell = ctx.cell(&rule.target_column);
            let dropped = match evaluate(rule, cell, ctx) {
                RuleOutcome::Drop => true,
                RuleOutcome::DeferToLocationCheck => self.location_too_far(rule, ctx, run)?,
                RuleOutcome::Keep | RuleOutcome::NoOp => false,
            };
            if dropped {
                debug!(rule = %rule.name, column = %rule.target_column, "row dropped");
                run.tally.record_drop(&rule.name);
                return Ok(RowVerdict::Drop {
                    rule: rule.name.clone(),
                });
            }
        }
        Ok(RowVerdict::Keep)
    }

    /// Ledger label for a kept row's request, counting it as matched or not.
    ///
    /// A request cell that is not an id is reported and counts as not matched.
    pub fn merge_action(
        &self,
        ledger: &ActionLedger,
        request: &CellValue,
        location: &str,
        run: &mut RunContext<'_>,
    ) -> Option<String> {
        let entry = match RequestId::from_cell(request) {
            Ok(id) => ledger.get(id),
            Err(warning) => {
                run.coercion_warning(location, &warning);
                None
            }
        };
        match entry {
            Some(entry) => {
                run.tally.matched += 1;
                Some(entry.label())
            }
            None => {
                run.tally.not_matched += 1;
                None
            }
        }
    }

    fn location_too_far(
        &self,
        rule: &RuleDefinition,
        ctx: &mut RowContext<'_>,
        run: &mut RunContext<'_>,
    ) -> Result<bool> {
        ctx.co_location_pending = false;
        let (co_key, my_key) = rule.location_tables().ok_or_else(|| ConfigError::Arity {
            rule: rule.name.clone(),
            kind: rule.kind.token(),
            expected: "exactly 2",
            found: rule.operands.len(),
        })?;
        let co_table = self.table(co_key, rule)?;
        let my_table = self.table(my_key, rule)?;
        let co_column = location_column(self.config.co_location_column(), OPT_COL_CO_LOCATION)?;
        let my_column = location_column(self.config.my_location_column(), OPT_COL_MY_LOCATION)?;
        let co_location = ctx.cell(co_column);
        let my_location = ctx.cell(my_column);
        let (proximity, reporter) = run.proximity_parts();
        proximity.too_far(co_table, my_table, co_location, my_location, reporter)
    }

    fn table(&self, key: &str, rule: &RuleDefinition) -> Result<&'c RankTable> {
        self.config.rank_table(key).ok_or_else(|| {
            SiftError::from(ConfigError::MissingTable {
                table: key.to_string(),
                referenced_by: rule.name.clone(),
            })
        })
    }
}

fn location_column<'a>(column: Option<&'a str>, option: &str) -> Result<&'a str> {
    column.ok_or_else(|| {
        SiftError::from(ConfigError::MissingOption {
            option: option.to_string(),
        })
    })
}
