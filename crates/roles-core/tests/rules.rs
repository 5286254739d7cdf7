//! Rule evaluation and row decisions.

use chrono::NaiveDate;

use roles_core::{
    ActionEntry, ActionLedger, ColumnIndex, RowContext, RowDecisionEngine, RowVerdict,
    RuleOutcome, RunContext, evaluate,
};
use roles_model::{
    CellValue, MemoryReporter, RawConfig, RequestId, RuleDefinition, RuleKind, RunConfig, RunTally,
};

fn raw(entries: &[(&str, &[&str])]) -> RawConfig {
    entries
        .iter()
        .map(|(key, values)| {
            (
                (*key).to_string(),
                values.iter().map(|value| (*value).to_string()).collect(),
            )
        })
        .collect()
}

fn config(rules: &[(&str, &[&str])]) -> RunConfig {
    let mut options = raw(&[
        ("col_request", &["Request #"]),
        ("col_my_act", &["My Action"]),
        ("col_my_filter", &["My Filter"]),
        ("col_act_rqust", &["Request"]),
        ("col_action", &["Action"]),
        ("col_action_dt", &["Date"]),
        ("dropactual", &["False"]),
        ("col_colocation", &["Onsite Flexibility"]),
        ("col_mylocation", &["My Location"]),
        ("coloc_table", &["co_onsite", "co_remote"]),
        ("co_onsite", &["0", "Onsite"]),
        ("co_remote", &["2", "Remote"]),
        ("myloc_table", &["my_near", "my_remote"]),
        ("my_near", &["0", "NY"]),
        ("my_remote", &["2", "Remote-worker"]),
    ]);
    let names: Vec<String> = rules.iter().map(|(name, _)| (*name).to_string()).collect();
    options.insert("droprows".to_string(), names);
    options.extend(raw(rules));
    RunConfig::from_raw(&options).expect("valid config")
}

fn rule(kind: RuleKind, operands: &[&str]) -> RuleDefinition {
    RuleDefinition {
        name: kind.token().to_string(),
        kind,
        target_column: "Column".to_string(),
        operands: operands.iter().map(|value| (*value).to_string()).collect(),
        threshold: (kind == RuleKind::Before).then(|| {
            NaiveDate::parse_from_str(operands[0], "%Y%m%d").expect("threshold date")
        }),
    }
}

fn outcome(rule: &RuleDefinition, cell: CellValue) -> RuleOutcome {
    let columns = ColumnIndex::default();
    let mut ctx = RowContext::new(&[], &columns);
    evaluate(rule, &cell, &mut ctx)
}

fn header(names: &[&str]) -> ColumnIndex {
    let cells: Vec<CellValue> = names.iter().map(|name| CellValue::text(*name)).collect();
    ColumnIndex::from_header(&cells, 0)
}

fn cells(values: &[&str]) -> Vec<CellValue> {
    values.iter().map(|value| CellValue::from_raw(value)).collect()
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

#[test]
fn drop_matches_exact_values_only() {
    let drop = rule(RuleKind::Drop, &["Contract", "5"]);
    assert_eq!(outcome(&drop, CellValue::text("Contract")), RuleOutcome::Drop);
    assert_eq!(outcome(&drop, CellValue::Integer(5)), RuleOutcome::Drop);
    assert_eq!(
        outcome(&drop, CellValue::text("Contract-to-hire")),
        RuleOutcome::NoOp
    );
    assert_eq!(outcome(&drop, CellValue::Empty), RuleOutcome::NoOp);
}

#[test]
fn drop_if_blank_also_drops_blank_cells() {
    let drop = rule(RuleKind::DropIfBlank, &["N/A"]);
    assert_eq!(outcome(&drop, CellValue::Empty), RuleOutcome::Drop);
    assert_eq!(outcome(&drop, CellValue::text("   ")), RuleOutcome::Drop);
    assert_eq!(outcome(&drop, CellValue::text("N/A")), RuleOutcome::Drop);
    assert_eq!(outcome(&drop, CellValue::text("Full-time")), RuleOutcome::NoOp);
    assert_eq!(
        outcome(&rule(RuleKind::DropIfBlank, &[]), CellValue::Empty),
        RuleOutcome::Drop
    );
}

#[test]
fn drop_includes_is_case_insensitive_substring() {
    let drop = rule(RuleKind::DropIncludes, &["Contract"]);
    assert_eq!(
        outcome(&drop, CellValue::text("Contract-to-hire")),
        RuleOutcome::Drop
    );
    assert_eq!(
        outcome(&drop, CellValue::text("short CONTRACT role")),
        RuleOutcome::Drop
    );
    assert_eq!(outcome(&drop, CellValue::text("Permanent")), RuleOutcome::NoOp);
    assert_eq!(outcome(&drop, CellValue::Empty), RuleOutcome::NoOp);
}

#[test]
fn keep_drops_anything_not_listed() {
    let keep = rule(RuleKind::Keep, &["Senior", "Lead"]);
    assert_eq!(outcome(&keep, CellValue::text("Lead")), RuleOutcome::Keep);
    assert_eq!(outcome(&keep, CellValue::text("Junior")), RuleOutcome::Drop);
    assert_eq!(outcome(&keep, CellValue::Empty), RuleOutcome::Drop);

    let keep_blank = rule(RuleKind::KeepIfBlank, &["Senior"]);
    assert_eq!(outcome(&keep_blank, CellValue::Empty), RuleOutcome::Keep);
    assert_eq!(outcome(&keep_blank, CellValue::text("Senior")), RuleOutcome::Keep);
    assert_eq!(outcome(&keep_blank, CellValue::text("Junior")), RuleOutcome::Drop);
}

#[test]
fn before_keeps_strictly_earlier_dates() {
    let before = rule(RuleKind::Before, &["20240301"]);
    assert_eq!(
        outcome(&before, CellValue::Date(date(2024, 2, 29))),
        RuleOutcome::Keep
    );
    assert_eq!(
        outcome(&before, CellValue::Date(date(2024, 3, 1))),
        RuleOutcome::Drop
    );
    assert_eq!(
        outcome(&before, CellValue::text("02/01/2024")),
        RuleOutcome::Keep
    );
    assert_eq!(outcome(&before, CellValue::text("ASAP")), RuleOutcome::NoOp);
    assert_eq!(outcome(&before, CellValue::Empty), RuleOutcome::NoOp);
}

#[test]
fn date_cells_never_equal_operands() {
    let drop = rule(RuleKind::Drop, &["2024-01-02"]);
    assert_eq!(
        outcome(&drop, CellValue::Date(date(2024, 1, 2))),
        RuleOutcome::NoOp
    );
}

#[test]
fn sheet_cells_match_their_written_text() {
    let drop = rule(RuleKind::Drop, &["07"]);
    assert_eq!(outcome(&drop, CellValue::from_raw("07")), RuleOutcome::Drop);
    assert_eq!(outcome(&drop, CellValue::from_raw("7")), RuleOutcome::NoOp);

    let keep = rule(RuleKind::Keep, &["07", "1.50"]);
    assert_eq!(outcome(&keep, CellValue::from_raw("07")), RuleOutcome::Keep);
    assert_eq!(outcome(&keep, CellValue::from_raw("1.50")), RuleOutcome::Keep);
    assert_eq!(outcome(&keep, CellValue::from_raw("1.5")), RuleOutcome::Drop);

    let keep_date = rule(RuleKind::Keep, &["01/02/2024"]);
    assert_eq!(
        outcome(&keep_date, CellValue::from_raw("01/02/2024")),
        RuleOutcome::Keep
    );

    let before = rule(RuleKind::Before, &["20240301"]);
    assert_eq!(
        outcome(&before, CellValue::from_raw("01/02/2024")),
        RuleOutcome::Keep
    );
}

#[test]
fn filter_tags_once_and_never_drops() {
    let columns = ColumnIndex::default();
    let mut ctx = RowContext::new(&[], &columns);
    let java = rule(RuleKind::Filter, &["Java", "Kotlin"]);
    let python = rule(RuleKind::Filter, &["Python"]);

    let cell = CellValue::text("Senior Python and java Engineer");
    assert_eq!(evaluate(&java, &cell, &mut ctx), RuleOutcome::NoOp);
    assert_eq!(ctx.filter_tag, "Java");
    assert!(ctx.filter_found);

    assert_eq!(evaluate(&python, &cell, &mut ctx), RuleOutcome::NoOp);
    assert_eq!(ctx.filter_tag, "Java");

    let no_filter = rule(RuleKind::NoFilter, &[]);
    assert_eq!(evaluate(&no_filter, &cell, &mut ctx), RuleOutcome::NoOp);
}

#[test]
fn no_filter_drops_untagged_rows() {
    let no_filter = rule(RuleKind::NoFilter, &[]);
    assert_eq!(outcome(&no_filter, CellValue::text("x")), RuleOutcome::Drop);
}

#[test]
fn location_defers_to_proximity_check() {
    let columns = ColumnIndex::default();
    let mut ctx = RowContext::new(&[], &columns);
    let location = rule(RuleKind::Location, &["coloc_table", "myloc_table"]);
    assert_eq!(
        evaluate(&location, &CellValue::text("Onsite"), &mut ctx),
        RuleOutcome::DeferToLocationCheck
    );
    assert!(ctx.co_location_pending);
}

#[test]
fn first_drop_wins_and_later_rules_are_skipped() {
    let config = config(&[
        ("grade", &["Grade", "keep", "Senior"]),
        ("skills", &["Skills", "filter", "Rust"]),
        ("tagged", &["Skills", "nofilter"]),
    ]);
    let columns = header(&["Request #", "Grade", "Skills"]);
    let row = cells(&["100001", "Junior", "Rust"]);
    let mut reporter = MemoryReporter::new();
    let mut run = RunContext::new(&mut reporter).with_tally(RunTally::for_rules(config.rules()));
    let engine = RowDecisionEngine::new(&config);

    let mut ctx = RowContext::new(&row, &columns);
    let verdict = engine.decide(&mut ctx, &mut run).expect("decide");

    assert_eq!(
        verdict,
        RowVerdict::Drop {
            rule: "grade".to_string()
        }
    );
    assert!(!ctx.filter_found);
    assert!(ctx.filter_tag.is_empty());
    assert_eq!(run.tally.dropped, 1);
    assert_eq!(run.tally.drops_for("grade"), 1);
    assert_eq!(run.tally.drops_for("skills"), 0);
    assert_eq!(run.tally.drops_for("tagged"), 0);
}

#[test]
fn only_first_matching_filter_sets_the_tag() {
    let config = config(&[
        ("java", &["Skills", "filter", "Java"]),
        ("python", &["Title", "filter", "Python"]),
    ]);
    let columns = header(&["Request #", "Title", "Skills"]);
    let engine = RowDecisionEngine::new(&config);
    let mut reporter = MemoryReporter::new();
    let mut run = RunContext::new(&mut reporter);

    let both = cells(&["1", "Senior Python Engineer", "Java, SQL"]);
    let mut ctx = RowContext::new(&both, &columns);
    assert_eq!(engine.decide(&mut ctx, &mut run).expect("decide"), RowVerdict::Keep);
    assert_eq!(ctx.filter_tag, "Java");

    let second = cells(&["2", "Senior Python Engineer", "Go"]);
    let mut ctx = RowContext::new(&second, &columns);
    assert_eq!(engine.decide(&mut ctx, &mut run).expect("decide"), RowVerdict::Keep);
    assert_eq!(ctx.filter_tag, "Python");
}

#[test]
fn location_rule_drops_rows_that_are_too_far() {
    let config = config(&[(
        "loc1",
        &["Onsite Flexibility", "location", "coloc_table", "myloc_table"],
    )]);
    let columns = header(&["Request #", "Onsite Flexibility", "My Location"]);
    let engine = RowDecisionEngine::new(&config);
    let mut reporter = MemoryReporter::new();
    let mut run = RunContext::new(&mut reporter).with_tally(RunTally::for_rules(config.rules()));

    let far = cells(&["1", "Onsite", "Remote-worker"]);
    let mut ctx = RowContext::new(&far, &columns);
    assert!(engine.decide(&mut ctx, &mut run).expect("decide").is_drop());
    assert!(!ctx.co_location_pending);

    let near = cells(&["2", "Remote", "NY"]);
    let mut ctx = RowContext::new(&near, &columns);
    assert_eq!(engine.decide(&mut ctx, &mut run).expect("decide"), RowVerdict::Keep);
    assert_eq!(run.tally.drops_for("loc1"), 1);
}

#[test]
fn kept_rows_merge_ledger_actions() {
    let config = config(&[("grade", &["Grade", "keepbl", "Senior"])]);
    let engine = RowDecisionEngine::new(&config);
    let ledger: ActionLedger = [(
        RequestId::new(123_456),
        ActionEntry::new("Applied", date(2024, 1, 2)),
    )]
    .into_iter()
    .collect();
    let mut reporter = MemoryReporter::new();
    let mut run = RunContext::new(&mut reporter);

    let label = engine.merge_action(&ledger, &CellValue::text("REQ-123456"), "row 2", &mut run);
    assert_eq!(label.as_deref(), Some("Applied 01/02/2024"));
    assert_eq!(run.tally.matched, 1);

    let label = engine.merge_action(&ledger, &CellValue::Integer(9_123_456), "row 3", &mut run);
    assert_eq!(label.as_deref(), Some("Applied 01/02/2024"));

    let label = engine.merge_action(&ledger, &CellValue::Integer(42), "row 4", &mut run);
    assert_eq!(label, None);
    assert_eq!(run.tally.not_matched, 1);

    let label = engine.merge_action(&ledger, &CellValue::text("pending"), "row 5", &mut run);
    assert_eq!(label, None);
    assert_eq!(run.tally.not_matched, 2);
    assert_eq!(run.tally.coercion_warnings, 1);
    drop(run);
    assert!(reporter.contains("Unable to read \"pending\" as a request id at row 5"));
}
