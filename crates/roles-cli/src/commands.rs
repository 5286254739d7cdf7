use anyhow::{Context, Result};
use tracing::{info, info_span};

use roles_core::{
    ActionLedger, BackfillDefaults, LocationDirectory, RunContext, run_backfill, run_filter,
    run_locate,
};
use roles_ingest::{CsvStore, default_output_path, load_raw_config};
use roles_model::{
    BackfillConfig, DropMode, LocateConfig, Reporter, RunConfig, RunTally, TabularStore,
};

use crate::cli::{FilterArgs, LedgerArgs, LocateArgs};
use crate::types::{FilterResult, LedgerResult, LocateResult};

pub fn run_filter_command(args: &FilterArgs, reporter: &mut dyn Reporter) -> Result<FilterResult> {
    let span = info_span!("filter_command", roles = %args.roles.display());
    let _guard = span.enter();

    let raw = load_raw_config(&args.config)?;
    let config = RunConfig::from_raw(&raw)
        .with_context(|| format!("validate config: {}", args.config.display()))?;
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&args.roles));
    let mut roles = CsvStore::open(&args.roles)?.with_output(&output);

    let mut run = RunContext::new(reporter).with_tally(RunTally::for_rules(config.rules()));
    run.report(format!("Processing {}.", args.roles.display()));
    // Test mode stops before rows are read, so the ledger is never needed.
    let ledger = if config.drop_mode() == DropMode::Test {
        ActionLedger::default()
    } else {
        let actions = CsvStore::open(&args.actions)?;
        ActionLedger::from_store(&actions, config.ledger_columns(), &mut run)
            .with_context(|| format!("read action ledger: {}", args.actions.display()))?
    };
    let summary = run_filter(&config, &mut roles, &ledger, &mut run)
        .with_context(|| format!("filter roles: {}", args.roles.display()))?;

    if summary.mode == DropMode::Test {
        return Ok(FilterResult {
            summary,
            output: None,
        });
    }
    roles
        .save()
        .with_context(|| format!("write roles: {}", output.display()))?;
    run.report(format!("Worksheet saved to {}.", output.display()));
    info!(output = %output.display(), rows = roles.row_count(), "roles written");
    Ok(FilterResult {
        summary,
        output: Some(output),
    })
}

pub fn run_locate_command(args: &LocateArgs, reporter: &mut dyn Reporter) -> Result<LocateResult> {
    let span = info_span!("locate_command", roles = %args.roles.display());
    let _guard = span.enter();

    let raw = load_raw_config(&args.config)?;
    let config = LocateConfig::from_raw(&raw)
        .with_context(|| format!("validate config: {}", args.config.display()))?;
    let output = args.output.clone().unwrap_or_else(|| args.roles.clone());
    let mut roles = CsvStore::open(&args.roles)?.with_output(&output);
    let directory = LocationDirectory::from_store(&CsvStore::open(&args.locations)?);

    let mut run = RunContext::new(reporter);
    let summary = run_locate(&config, &mut roles, &directory, &mut run)
        .with_context(|| format!("locate roles: {}", args.roles.display()))?;
    roles
        .save()
        .with_context(|| format!("write roles: {}", output.display()))?;
    run.report(format!("Worksheet saved to {}.", output.display()));
    Ok(LocateResult { summary, output })
}

pub fn run_ledger_command(args: &LedgerArgs, reporter: &mut dyn Reporter) -> Result<LedgerResult> {
    let span = info_span!("ledger_command", roles = %args.roles.display());
    let _guard = span.enter();

    let raw = load_raw_config(&args.config)?;
    let config = BackfillConfig::from_raw(&raw)
        .with_context(|| format!("validate config: {}", args.config.display()))?;
    let output = args.output.clone().unwrap_or_else(|| args.actions.clone());
    let roles = CsvStore::open(&args.roles)?;
    let mut actions = CsvStore::open(&args.actions)?.with_output(&output);
    let defaults = BackfillDefaults {
        action: args.default_action.clone(),
        date: args.default_date,
    };

    let mut run = RunContext::new(reporter);
    run.report(format!("Processing {}.", args.roles.display()));
    let summary = run_backfill(&config, &roles, &mut actions, &defaults, &mut run)
        .with_context(|| format!("backfill ledger: {}", args.actions.display()))?;
    if summary.added == 0 {
        return Ok(LedgerResult {
            summary,
            output: None,
        });
    }
    actions
        .save()
        .with_context(|| format!("write ledger: {}", output.display()))?;
    run.report(format!("Action ledger saved to {}.", output.display()));
    info!(output = %output.display(), added = summary.added, "ledger written");
    Ok(LedgerResult {
        summary,
        output: Some(output),
    })
}
