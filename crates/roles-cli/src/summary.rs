use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use roles_core::{BackfillSummary, FilterSummary, LocateSummary};
use roles_model::DropMode;

use crate::types::{FilterResult, LedgerResult, LocateResult};

pub fn print_filter_summary(result: &FilterResult) {
    if let Some(path) = &result.output {
        println!("Output: {}", path.display());
    }
    let mut table = Table::new();
    table.set_header(vec![header_cell("Rule"), header_cell("Column"), header_cell("Dropped")]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    for entry in &result.summary.tally.drops_by_rule {
        table.add_row(vec![
            Cell::new(&entry.rule),
            Cell::new(&entry.column),
            count_cell(entry.dropped, Color::Yellow),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        dim_cell("-"),
        Cell::new(result.summary.tally.dropped).add_attribute(Attribute::Bold),
    ]);
    println!("{table}");
    println!("{}", totals_table(&filter_totals(&result.summary)));
}

pub fn print_locate_summary(result: &LocateResult) {
    println!("Output: {}", result.output.display());
    println!("{}", totals_table(&locate_totals(&result.summary)));
    if !result.summary.unresolved.is_empty() {
        let mut table = Table::new();
        table.set_header(vec![header_cell("Unresolved location")]);
        apply_table_style(&mut table);
        for location in &result.summary.unresolved {
            table.add_row(vec![Cell::new(location).fg(Color::Yellow)]);
        }
        println!("{table}");
    }
}

pub fn print_ledger_summary(result: &LedgerResult) {
    match &result.output {
        Some(path) => println!("Output: {}", path.display()),
        None => println!("Output: unchanged"),
    }
    println!("{}", totals_table(&ledger_totals(&result.summary)));
}

/// Label and value lines of the filter totals.
pub fn filter_totals(summary: &FilterSummary) -> Vec<(&'static str, String)> {
    let tally = &summary.tally;
    let mode = match summary.mode {
        DropMode::Delete => "delete",
        DropMode::Mark => "mark",
        DropMode::Test => "test",
    };
    vec![
        ("Mode", mode.to_string()),
        ("Header row", (summary.header_row + 1).to_string()),
        ("Inserted columns", join_or_dash(&summary.inserted_columns)),
        ("Rows evaluated", tally.rows.to_string()),
        ("Dropped", tally.dropped.to_string()),
        ("Deleted", summary.deleted_rows.to_string()),
        ("Marked DELETE", summary.marked_rows.to_string()),
        ("Matched", tally.matched.to_string()),
        ("Not matched", tally.not_matched.to_string()),
        ("Blank filter", tally.no_filter.to_string()),
        ("Unreadable cells", tally.coercion_warnings.to_string()),
    ]
}

/// Label and value lines of the locate totals.
pub fn locate_totals(summary: &LocateSummary) -> Vec<(&'static str, String)> {
    vec![
        ("Rows", summary.rows.to_string()),
        ("Matched", summary.matched.to_string()),
        ("Additional (multi) values", summary.multi.to_string()),
        (
            "Inserted column",
            if summary.inserted_column { "yes" } else { "no" }.to_string(),
        ),
        ("Unresolved", summary.unresolved.len().to_string()),
    ]
}

/// Label and value lines of the ledger backfill totals.
pub fn ledger_totals(summary: &BackfillSummary) -> Vec<(&'static str, String)> {
    vec![
        ("Requests read", summary.rows.to_string()),
        ("Added", summary.added.to_string()),
        ("Already listed", summary.matched.to_string()),
        ("Unreadable requests", summary.key_errors.to_string()),
        (
            "Stopped early",
            if summary.stopped_early { "yes" } else { "no" }.to_string(),
        ),
    ]
}

fn totals_table(lines: &[(&'static str, String)]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Summary"), header_cell("")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for (label, value) in lines {
        table.add_row(vec![Cell::new(label), Cell::new(value)]);
    }
    table
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(100);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}

fn join_or_dash(values: &[String]) -> String {
    if values.is_empty() {
        "-".to_string()
    } else {
        values.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roles_model::{RuleDropCount, RunTally};

    fn render(lines: &[(&'static str, String)]) -> String {
        lines
            .iter()
            .map(|(label, value)| format!("{label}: {value}"))
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn filter_totals_lines() {
        let summary = FilterSummary {
            mode: DropMode::Mark,
            header_row: 2,
            inserted_columns: vec!["My Action".to_string(), "My Filter".to_string()],
            deleted_rows: 0,
            marked_rows: 3,
            tally: RunTally {
                rows: 5,
                matched: 1,
                not_matched: 1,
                dropped: 3,
                no_filter: 0,
                coercion_warnings: 2,
                drops_by_rule: vec![RuleDropCount {
                    rule: "grade".to_string(),
                    column: "Grade".to_string(),
                    dropped: 3,
                }],
            },
        };
        insta::assert_snapshot!(render(&filter_totals(&summary)), @r"
        Mode: mark
        Header row: 3
        Inserted columns: My Action, My Filter
        Rows evaluated: 5
        Dropped: 3
        Deleted: 0
        Marked DELETE: 3
        Matched: 1
        Not matched: 1
        Blank filter: 0
        Unreadable cells: 2
        ");
    }

    #[test]
    fn locate_totals_lines() {
        let summary = LocateSummary {
            rows: 4,
            matched: 4,
            multi: 1,
            inserted_column: true,
            unresolved: vec!["Lisbon".to_string()],
        };
        insta::assert_snapshot!(render(&locate_totals(&summary)), @r"
        Rows: 4
        Matched: 4
        Additional (multi) values: 1
        Inserted column: yes
        Unresolved: 1
        ");
    }

    #[test]
    fn ledger_totals_lines() {
        let summary = BackfillSummary {
            rows: 6,
            matched: 2,
            added: 3,
            key_errors: 1,
            stopped_early: false,
        };
        insta::assert_snapshot!(render(&ledger_totals(&summary)), @r"
        Requests read: 6
        Added: 3
        Already listed: 2
        Unreadable requests: 1
        Stopped early: no
        ");
    }
}
