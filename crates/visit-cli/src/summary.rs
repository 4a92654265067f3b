use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use visit_model::{InstrumentSchedule, ObservedCount, ParticipantSummary};
use visit_report::{CollectionReport, MissingDisplay};

use crate::commands::MissingRun;

pub fn print_missing(run: &MissingRun) {
    let report = &run.report;
    println!("Study: {}", run.study_id);
    if report.display == MissingDisplay::ClampedAtZero {
        println!("Over-collected instruments shown as 0");
    }
    let mut table = Table::new();
    let mut header = vec![header_cell("Subject")];
    header.extend(report.columns.iter().map(|name| header_cell(name)));
    header.push(header_cell("Month"));
    table.set_header(header);
    apply_report_table_style(&mut table);
    for index in 1..=report.columns.len() + 1 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    for row in &report.rows {
        let mut cells = vec![subject_cell(&row.subject_id)];
        cells.extend(row.cells.iter().map(|value| missing_cell(*value)));
        cells.push(Cell::new(row.elapsed_months).add_attribute(Attribute::Bold));
        table.add_row(cells);
    }
    println!("{table}");
    println!("{}", run.completeness);
    if let Some(path) = &run.output {
        println!("CSV: {}", path.display());
    }
}

pub fn print_participants(summary: &ParticipantSummary) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Group"),
        header_cell("All"),
        header_cell("Male"),
        header_cell("Female"),
    ]);
    apply_table_style(&mut table);
    for index in 1..=3 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    for counts in &summary.groups {
        table.add_row(vec![
            Cell::new(&counts.group),
            Cell::new(counts.all),
            count_cell(counts.male),
            count_cell(counts.female),
        ]);
    }
    let total = summary.total();
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(total.all).add_attribute(Attribute::Bold),
        count_cell(total.male).add_attribute(Attribute::Bold),
        count_cell(total.female).add_attribute(Attribute::Bold),
    ]);
    println!("Participants [Total={}]", total.all);
    println!("{table}");
}

pub fn print_collection(report: &CollectionReport) {
    let mut table = Table::new();
    let mut header = vec![header_cell("Group"), header_cell("Subject")];
    header.extend(report.columns.iter().map(|name| header_cell(name)));
    header.push(header_cell("Month"));
    table.set_header(header);
    apply_report_table_style(&mut table);
    for index in 2..=report.columns.len() + 2 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    for row in &report.rows {
        let mut cells = vec![Cell::new(&row.group), subject_cell(&row.subject_id)];
        cells.extend(row.counts.iter().map(observed_cell));
        cells.push(Cell::new(row.elapsed_months).add_attribute(Attribute::Bold));
        table.add_row(cells);
    }
    println!("{table}");
}

pub fn print_instruments(schedule: &InstrumentSchedule) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Instrument"),
        header_cell("Every (months)"),
        header_cell("Datatype"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for instrument in schedule.instruments() {
        table.add_row(vec![
            Cell::new(&instrument.name)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(instrument.cadence_months),
            dim_cell(&instrument.source_type),
        ]);
    }
    println!("{table}");
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_report_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn missing_cell(value: Option<i64>) -> Cell {
    match value {
        Some(value) if value > 0 => Cell::new(value)
            .fg(Color::Red)
            .add_attribute(Attribute::Bold),
        Some(value) if value < 0 => Cell::new(value).fg(Color::Yellow),
        Some(value) => dim_cell(value),
        None => Cell::new("?").fg(Color::Magenta),
    }
}

fn observed_cell(observed: &ObservedCount) -> Cell {
    match observed {
        ObservedCount::Count(0) => dim_cell(0),
        ObservedCount::Count(value) => Cell::new(value),
        ObservedCount::Malformed(raw) => Cell::new(raw).fg(Color::Magenta),
    }
}

fn count_cell(count: usize) -> Cell {
    if count > 0 {
        Cell::new(count)
    } else {
        dim_cell(count)
    }
}

fn subject_cell(subject_id: &str) -> Cell {
    Cell::new(subject_id).add_attribute(Attribute::Bold)
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
