//! Output formatting utilities for CLI commands
//!
//! Provides consistent formatting for:
//! - Tables with column alignment
//! - Colors for issue severities

use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, Color, ContentArrangement, Table};
use meridian_schema::Severity;

fn new_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic);

    let header_cells: Vec<Cell> = headers
        .iter()
        .map(|h| Cell::new(h).fg(Color::Cyan))
        .collect();
    table.set_header(header_cells);
    table
}

/// Print a table with headers and rows
pub fn print_table(headers: &[&str], rows: Vec<Vec<String>>) {
    let mut table = new_table(headers);
    for row in rows {
        table.add_row(row);
    }
    println!("{}", table);
}

/// Print a table with custom column colors
pub fn print_table_colored(headers: &[&str], rows: Vec<Vec<(String, Option<Color>)>>) {
    let mut table = new_table(headers);
    for row in rows {
        let cells: Vec<Cell> = row
            .into_iter()
            .map(|(text, color)| {
                let cell = Cell::new(text);
                if let Some(c) = color {
                    cell.fg(c)
                } else {
                    cell
                }
            })
            .collect();
        table.add_row(cells);
    }
    println!("{}", table);
}

/// Color for an issue severity
pub fn color_for_severity(severity: Severity) -> Color {
    match severity {
        Severity::Error => Color::Red,
        Severity::Advisory => Color::Yellow,
    }
}

/// First line of a docstring, or "-"
pub fn summary_line(docstring: Option<&str>) -> String {
    docstring
        .and_then(|doc| doc.lines().next())
        .map(str::to_string)
        .unwrap_or_else(|| "-".to_string())
}

/// Dimension orderings as `(a, b) | (a)`
pub fn format_orderings(orderings: &[Vec<String>]) -> String {
    orderings
        .iter()
        .map(|ordering| format!("({})", ordering.join(", ")))
        .collect::<Vec<_>>()
        .join(" | ")
}
