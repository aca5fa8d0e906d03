//! Tab-separated output: a `==== title ====` line, then header and rows.

use numbench_core::{Cell, ReportTable, Reporter};

/// Plain tab-separated renderer
#[derive(Debug, Clone, Copy, Default)]
pub struct TsvReporter;

fn cell_text(cell: Option<&Cell>) -> String {
    match cell {
        Some(Cell::Text(s)) => s.clone(),
        Some(Cell::Number(v)) if v.is_nan() => "nan".to_string(),
        Some(Cell::Number(v)) => v.to_string(),
        None => String::new(),
    }
}

impl Reporter for TsvReporter {
    fn render(&self, table: &ReportTable) -> String {
        let mut lines = Vec::with_capacity(table.rows.len() + 2);
        lines.push(format!("\n==== {} ====", table.title));
        lines.push(table.headers.join("\t"));
        for row in &table.rows {
            let fields: Vec<String> = table
                .headers
                .iter()
                .map(|h| cell_text(row.get(h)))
                .collect();
            lines.push(fields.join("\t"));
        }
        lines.join("\n")
    }
}
