//! Rendering of a single record against the column descriptors.

use ratatui::text::Line;

use super::{CellValue, Column};

pub fn render_row<R>(columns: &[Column<R>], record: &R) -> Vec<Line<'static>> {
    columns.iter().map(|c| render_cell(c, record)).collect()
}

/// Custom renderer output verbatim, otherwise the plain value.
pub fn render_cell<R>(column: &Column<R>, record: &R) -> Line<'static> {
    match column.renderer() {
        Some(render) => render(record),
        None => Line::from(display_value(&column.value(record))),
    }
}

/// Plain text for a value. Line breaks are folded so a cell stays one row.
pub fn display_value(value: &CellValue) -> String {
    match value {
        CellValue::Text(s) => s.replace("\r\n", " ↵ ").replace('\n', " ↵ "),
        other => other.to_string(),
    }
}

/// One record as a CSV line of plain values, custom renderers are ignored.
pub fn csv_row<R>(columns: &[Column<R>], record: &R) -> String {
    columns
        .iter()
        .map(|c| wrap_cell_content(&c.value(record).to_string()))
        .collect::<Vec<String>>()
        .join(",")
}

fn wrap_cell_content(c: &str) -> String {
    let needs_escaping = c.contains('"');
    let needs_wrapping = c.chars().any(|c| c == ' ' || c == '\t' || c == ',');
    let mut out = String::from(c);

    if needs_escaping {
        out = out.replace('"', "\"\"");
    }
    if needs_wrapping || needs_escaping {
        out = format!("\"{out}\"");
    }
    out
}
