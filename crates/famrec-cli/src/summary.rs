use std::path::Path;

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use famrec_core::ImportSummary;
use famrec_ingest::Dataset;
use famrec_model::OutcomeKind;

const OUTCOME_ORDER: [OutcomeKind; 5] = [
    OutcomeKind::Accepted,
    OutcomeKind::RejectedOverage,
    OutcomeKind::RejectedNoMatch,
    OutcomeKind::RejectedWrongGuardian,
    OutcomeKind::RejectedDuplicateLoser,
];

pub fn print_summary(summary: &ImportSummary, out_dir: &Path, dry_run: bool) {
    println!("Tenant: {}", summary.tenant);
    println!("Output: {}", out_dir.display());
    if dry_run {
        println!("Dry run: grants were not written");
    }

    let mut table = Table::new();
    table.set_header(vec![header_cell("Input"), header_cell("Benefits"), header_cell("Enrollment")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    table.add_row(vec![
        Cell::new("Rows read"),
        Cell::new(summary.benefit_rows),
        Cell::new(summary.enrollment_rows),
    ]);
    table.add_row(vec![
        Cell::new("Exact duplicates dropped"),
        count_cell(summary.benefit_duplicates_dropped, Color::Yellow),
        count_cell(summary.enrollment_duplicates_dropped, Color::Yellow),
    ]);
    table.add_row(vec![
        Cell::new("Rejected during conversion"),
        count_cell(summary.conversion_rejections, Color::Red),
        dim_cell("-"),
    ]);
    table.add_row(vec![
        Cell::new("Split dependents"),
        count_cell(summary.split_groups, Color::Yellow),
        dim_cell("-"),
    ]);
    println!("{table}");

    let mut outcomes = Table::new();
    outcomes.set_header(vec![header_cell("Outcome"), header_cell("Candidates")]);
    apply_table_style(&mut outcomes);
    align_column(&mut outcomes, 1, CellAlignment::Right);
    for kind in OUTCOME_ORDER {
        let color = if kind == OutcomeKind::Accepted {
            Color::Green
        } else {
            Color::Red
        };
        outcomes.add_row(vec![
            Cell::new(kind.to_string()),
            count_cell(summary.count(kind), color),
        ]);
    }
    outcomes.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(summary.candidates).add_attribute(Attribute::Bold),
    ]);
    println!("{outcomes}");
    println!(
        "Grants: {} ({} dependents), rejections audited: {}",
        summary.grants_written,
        summary.dependents_granted,
        summary.audit_records()
    );
}

/// Lists the required and optional columns of each input file.
pub fn print_columns(datasets: &[Dataset]) {
    let mut table = Table::new();
    table.set_header(vec![header_cell("File"), header_cell("Column"), header_cell("Required")]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Center);
    for dataset in datasets.iter().copied() {
        for column in dataset.columns() {
            table.add_row(vec![
                Cell::new(dataset),
                Cell::new(column),
                required_cell(dataset.is_required(column)),
            ]);
        }
    }
    println!("{table}");
}

fn required_cell(required: bool) -> Cell {
    if required {
        Cell::new("✓").fg(Color::Green).add_attribute(Attribute::Bold)
    } else {
        dim_cell("-")
    }
}

pub fn apply_table_style(table: &mut Table) {
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
