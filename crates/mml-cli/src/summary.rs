use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use mml_cli::pipeline::ExtractReport;

pub fn print_summary(report: &ExtractReport) {
    println!("Note table: {}", report.note_outfile.display());
    println!("Concept table: {}", report.mml_outfile.display());
    println!("Pivot table: {}", report.pivot_outfile.display());
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Notes found"),
        header_cell("Processed"),
        header_cell("Missing output"),
        header_cell("Concept rows"),
        header_cell("Distinct CUIs"),
    ]);
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    for index in 0..5 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    let missing = report.notes_found - report.notes_processed;
    table.add_row(vec![
        Cell::new(report.notes_found),
        Cell::new(report.notes_processed),
        count_cell(missing, Color::Yellow),
        Cell::new(report.records_written),
        Cell::new(report.distinct_cuis),
    ]);
    println!("{table}");
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        Cell::new(count).fg(Color::DarkGrey)
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}
