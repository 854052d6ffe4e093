//! Text rendering of a view: error banner, loading indicator, item table

use crate::controller::ViewSnapshot;
use colored::Colorize;
use tabled::builder::Builder;
use tabled::settings::Style;

/// Render `snapshot` as terminal text
pub fn render(snapshot: &ViewSnapshot, color: bool) -> String {
    let mut out = String::new();

    let heading = format!("=== {} ===", snapshot.title.to_uppercase());
    out.push_str(&paint(&heading, color, |s| s.bold().cyan().to_string()));
    out.push('\n');

    if let Some(error) = &snapshot.error {
        out.push_str(&paint(error, color, |s| s.red().to_string()));
        out.push('\n');
    }
    if snapshot.loading {
        out.push_str(&paint("Loading...", color, |s| s.green().to_string()));
        out.push('\n');
    }

    if snapshot.rows.is_empty() {
        out.push_str("(no items)\n");
        return out;
    }

    let mut builder = Builder::default();
    builder.push_record(snapshot.columns.iter().map(|c| c.to_string()));
    let mut any_local = false;
    for row in &snapshot.rows {
        let mut cells = row.cells.clone();
        if row.id.is_local() {
            any_local = true;
            if let Some(id_cell) = cells.first_mut() {
                id_cell.push('*');
            }
        }
        builder.push_record(cells);
    }
    let mut table = builder.build();
    table.with(Style::rounded());
    out.push_str(&table.to_string());
    out.push('\n');

    if any_local {
        out.push_str(&paint(
            "* local only, not synced with the API",
            color,
            |s| s.dimmed().to_string(),
        ));
        out.push('\n');
    }
    out
}

fn paint(text: &str, color: bool, style: impl FnOnce(&str) -> String) -> String {
    if color {
        style(text)
    } else {
        text.to_string()
    }
}
