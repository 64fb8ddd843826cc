use std::time::Duration;

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use cfx_cli::pipeline::{RunReport, StageReport};

use crate::commands::Inspection;

pub fn print_summary(report: &RunReport) {
    print_stage_table(&report.stages);

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Layer"),
        header_cell("Rows"),
        header_cell("Columns"),
        header_cell("Files"),
        header_cell("Partitions"),
    ]);
    apply_summary_table_style(&mut table);
    for column in 1..=4 {
        align_column(&mut table, column, CellAlignment::Right);
    }
    for layer in &report.layers {
        table.add_row(vec![
            Cell::new(layer.destination.display()),
            Cell::new(layer.rows),
            Cell::new(layer.columns),
            Cell::new(layer.files),
            count_cell(layer.partitions.len()),
        ]);
    }
    println!("{table}");

    let dropped = report.countries.dropped_count()
        + report.rates.as_ref().map_or(0, |rates| rates.dropped_count());
    if dropped > 0 {
        println!("Dropped rows: {dropped}");
    }
    if report.gold_unmatched > 0 {
        println!("Countries without rates: {}", report.gold_unmatched);
    }
    println!("Completed in {}", format_duration(report.total_duration()));
}

/// Stage table; also printed for the stages that finished before a failure.
pub fn print_stage_table(stages: &[StageReport]) {
    if stages.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Stage"),
        header_cell("Rows"),
        header_cell("Columns"),
        header_cell("Datasets"),
        header_cell("Duration"),
    ]);
    apply_summary_table_style(&mut table);
    for column in 1..=4 {
        align_column(&mut table, column, CellAlignment::Right);
    }
    let mut total = Duration::ZERO;
    for stage in stages {
        total += stage.duration;
        table.add_row(vec![
            Cell::new(stage.stage.as_str()),
            Cell::new(stage.rows),
            Cell::new(stage.columns),
            Cell::new(stage.datasets),
            dim_cell(format_duration(stage.duration)),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        dim_cell("-"),
        dim_cell("-"),
        dim_cell("-"),
        Cell::new(format_duration(total)).add_attribute(Attribute::Bold),
    ]);
    println!("{table}");
}

pub fn print_inspection(inspection: &Inspection) {
    let manifest = &inspection.manifest;
    println!("Dataset: {}", manifest.dataset);
    println!("Compression: {}", manifest.compression);
    if !manifest.partition_cols.is_empty() {
        println!("Partitioned by: {}", manifest.partition_cols.join(", "));
    }

    let mut table = Table::new();
    table.set_header(vec![header_cell("File"), header_cell("Rows")]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for file in &manifest.files {
        table.add_row(vec![Cell::new(&file.path), Cell::new(file.rows)]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(inspection.rows).add_attribute(Attribute::Bold),
    ]);
    println!("{table}");
    println!(
        "Columns ({}): {}",
        inspection.columns.len(),
        inspection.columns.join(", ")
    );
    if inspection.rows != manifest.rows {
        eprintln!(
            "warning: manifest lists {} rows, files hold {}",
            manifest.rows, inspection.rows
        );
    }
}

fn format_duration(duration: Duration) -> String {
    format!("{} ms", duration.as_millis())
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn count_cell(count: usize) -> Cell {
    if count > 0 {
        Cell::new(count)
    } else {
        dim_cell("-")
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
