//! End-to-end runs of the filter and locate commands over CSV files.

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use roles_cli::cli::{FilterArgs, LedgerArgs, LocateArgs};
use roles_cli::commands::{run_filter_command, run_ledger_command, run_locate_command};
use roles_model::MemoryReporter;

const CONFIG: &str = r#"{
    "droprows": ["grade", "type", "skills", "tagged"],
    "grade": ["Grade", "keepbl", "Senior", "Lead"],
    "type": ["Type", "dropincl", "Contract"],
    "skills": ["Skills", "filter", "Rust", "Go"],
    "tagged": ["Skills", "nofilter"],
    "dropactual": "False",
    "col_request": "Request #",
    "col_my_act": "My Action",
    "col_my_filter": "My Filter",
    "col_my_insert": "Request #",
    "col_act_rqust": "Request",
    "col_action": "Action",
    "col_action_dt": "Date",
    "col_projlocat": "Project Location",
    "col_location": "My Location",
    "locompare": ["near", "far"],
    "near": [0, "Onsite"],
    "far": [2, "Remote"]
}"#;

fn write(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write fixture");
    path
}

#[test]
fn filter_writes_tagged_sheet_next_to_input() {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = write(dir.path(), "config.json", CONFIG);
    let roles = write(
        dir.path(),
        "roles.csv",
        "Request #,Grade,Type,Skills\n\
         REQ-100001,Senior,Full-time,Rust\n\
         REQ-100002,Junior,Full-time,Rust\n\
         100003,Lead,Full-time,Go\n",
    );
    let actions = write(
        dir.path(),
        "actions.csv",
        "Request,Action,Date\n100001,Applied,01/02/2024\n",
    );
    let args = FilterArgs {
        config,
        roles,
        actions,
        output: None,
    };
    let mut reporter = MemoryReporter::new();

    let result = run_filter_command(&args, &mut reporter).expect("filter");

    let output = dir.path().join("roles_out.csv");
    assert_eq!(result.output.as_deref(), Some(output.as_path()));
    let written = fs::read_to_string(&output).expect("read output");
    assert_eq!(
        written,
        "Request #,My Action,My Filter,Grade,Type,Skills\n\
         REQ-100001,Applied 01/02/2024,Rust,Senior,Full-time,Rust\n\
         REQ-100002,,DELETE,Junior,Full-time,Rust\n\
         100003,,Go,Lead,Full-time,Go\n"
    );
    assert_eq!(result.summary.tally.matched, 1);
    assert_eq!(result.summary.tally.not_matched, 1);
    assert!(reporter.contains("Read 1 actions."));
    assert!(reporter.contains("Worksheet saved to"));
    assert!(reporter.flushed);
}

#[test]
fn filter_reports_config_errors() {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = write(
        dir.path(),
        "config.json",
        r#"{"droprows": ["grade"], "grade": ["Grade", "sometimes", "x"]}"#,
    );
    let roles = write(dir.path(), "roles.csv", "Request #,Grade\n1,Senior\n");
    let actions = write(dir.path(), "actions.csv", "Request,Action,Date\n");
    let args = FilterArgs {
        config,
        roles,
        actions,
        output: None,
    };
    let mut reporter = MemoryReporter::new();

    let error = run_filter_command(&args, &mut reporter).unwrap_err();
    assert!(format!("{error:#}").contains("unrecognized kind \"sometimes\""));
    assert!(!dir.path().join("roles_out.csv").exists());
}

#[test]
fn locate_updates_sheet_in_place() {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = write(dir.path(), "config.json", CONFIG);
    let roles = write(
        dir.path(),
        "roles.csv",
        "Request #,Project Location\n1,Austin TX|New York NY\n2,Lisbon\n",
    );
    let locations = write(
        dir.path(),
        "locations.csv",
        "Location,My Location\nNew York NY,Onsite\nAustin TX,Remote\n",
    );
    let args = LocateArgs {
        config,
        roles: roles.clone(),
        locations,
        output: None,
    };
    let mut reporter = MemoryReporter::new();

    let result = run_locate_command(&args, &mut reporter).expect("locate");

    assert_eq!(result.output, roles);
    assert_eq!(result.summary.unresolved, vec!["Lisbon"]);
    let written = fs::read_to_string(&roles).expect("read roles");
    assert_eq!(
        written,
        "Request #,Project Location,My Location\n\
         1,Austin TX|New York NY,Onsite\n\
         2,Lisbon,Unknown\n"
    );
}

#[test]
fn test_mode_never_reads_the_ledger() {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = write(
        dir.path(),
        "config.json",
        &CONFIG.replace(r#""dropactual": "False""#, r#""dropactual": "Test""#),
    );
    let roles = write(
        dir.path(),
        "roles.csv",
        "Request #,Grade,Type,Skills\nREQ-100001,Senior,Full-time,Rust\n",
    );
    let args = FilterArgs {
        config,
        roles,
        actions: dir.path().join("missing.csv"),
        output: None,
    };
    let mut reporter = MemoryReporter::new();

    let result = run_filter_command(&args, &mut reporter).expect("test run");

    assert_eq!(result.output, None);
    assert_eq!(result.summary.tally.rows, 0);
    assert!(!reporter.contains("actions."));
    assert!(!dir.path().join("roles_out.csv").exists());
}

#[test]
fn ledger_appends_new_actions_from_filtered_sheet() {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = write(dir.path(), "config.json", CONFIG);
    let roles = write(
        dir.path(),
        "roles_out.csv",
        "Request #,My Action,My Filter\n\
         REQ-100001,Applied 01/02/2024,Rust\n\
         REQ-100002,Phone screen 03/15/2024,Go\n\
         REQ-100003,,DELETE\n",
    );
    let actions = write(
        dir.path(),
        "actions.csv",
        "Request,Action,Date\n100001,Applied,01/02/2024\n",
    );
    let args = LedgerArgs {
        config,
        roles,
        actions: actions.clone(),
        default_action: "Reviewed".to_string(),
        default_date: NaiveDate::from_ymd_opt(2024, 6, 1).expect("date"),
        output: None,
    };
    let mut reporter = MemoryReporter::new();

    let result = run_ledger_command(&args, &mut reporter).expect("ledger");

    assert_eq!(result.output.as_deref(), Some(actions.as_path()));
    assert_eq!(result.summary.added, 2);
    assert_eq!(result.summary.matched, 1);
    assert_eq!(
        fs::read_to_string(&actions).expect("read ledger"),
        "Request,Action,Date\n\
         100001,Applied,01/02/2024\n\
         REQ-100002,Phone screen,03/15/2024\n\
         REQ-100003,Reviewed,06/01/2024\n"
    );
    assert!(reporter.contains("Action ledger saved to"));
}
