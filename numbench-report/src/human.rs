//! Human-Readable Output
//!
//! Aligned columns for terminal display, followed by each implementation's
//! speedup over the reference at the largest input where both were timed.

use numbench_core::{
    Cell, FormatOptions, InputOutputs, REFERENCE_LABEL, ReportTable, Reporter, time_column,
};

/// Inputs up to this size get their outputs printed
pub const SAMPLE_MAX_INPUT: u64 = 20;

/// Printed outputs are cut to this many characters
pub const SAMPLE_WIDTH: usize = 80;

/// Aligned-table renderer
#[derive(Debug, Clone, Default)]
pub struct HumanReporter {
    options: FormatOptions,
}

impl HumanReporter {
    /// Create a renderer using `options` for timing precision
    pub fn new(options: FormatOptions) -> Self {
        Self { options }
    }

    fn cell_text(&self, cell: Option<&Cell>) -> String {
        match cell {
            None => "-".to_string(),
            Some(cell) if cell.is_missing() => "-".to_string(),
            Some(Cell::Text(s)) => s.clone(),
            Some(Cell::Number(v)) => format!("{:.*}", self.options.time_decimals, v),
        }
    }

    fn speedups(&self, table: &ReportTable) -> Option<String> {
        let reference_column = time_column(REFERENCE_LABEL);
        if !table.headers.contains(&reference_column) {
            return None;
        }

        let first_header = table.headers.first()?;
        let mut lines = Vec::new();
        let candidates: Vec<&str> = table
            .implementation_labels()
            .into_iter()
            .filter(|label| *label != REFERENCE_LABEL)
            .collect();
        let width = candidates.iter().map(|l| l.len()).max().unwrap_or(0);

        for label in candidates {
            let column = time_column(label);
            let timed = table.rows.iter().rev().find_map(|row| {
                let reference = row.get(&reference_column)?.as_number()?;
                let candidate = row.get(&column)?.as_number()?;
                (reference.is_finite() && candidate.is_finite() && candidate > 0.0)
                    .then(|| (row.get(first_header), reference / candidate))
            });

            let line = match timed {
                Some((input, speedup)) => format!(
                    "  {:<width$}  {:>8.2}x  ({} = {})",
                    label,
                    speedup,
                    first_header,
                    self.cell_text(input),
                    width = width
                ),
                None => format!("  {:<width$}  {:>9}", label, "-", width = width),
            };
            lines.push(line);
        }

        if lines.is_empty() {
            return None;
        }
        Some(format!("\nSpeedup vs {}\n{}", REFERENCE_LABEL, lines.join("\n")))
    }
}

impl Reporter for HumanReporter {
    fn render(&self, table: &ReportTable) -> String {
        let body: Vec<Vec<String>> = table
            .rows
            .iter()
            .map(|row| {
                table
                    .headers
                    .iter()
                    .map(|h| self.cell_text(row.get(h)))
                    .collect()
            })
            .collect();

        let widths: Vec<usize> = table
            .headers
            .iter()
            .enumerate()
            .map(|(i, h)| {
                body.iter()
                    .map(|cells| cells[i].chars().count())
                    .chain(std::iter::once(h.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let format_line = |cells: &[String]| -> String {
            cells
                .iter()
                .zip(&widths)
                .enumerate()
                .map(|(i, (cell, &w))| {
                    if i == 0 {
                        format!("{:<w$}", cell)
                    } else {
                        format!("{:>w$}", cell)
                    }
                })
                .collect::<Vec<_>>()
                .join("  ")
        };

        let header_line = format_line(&table.headers);
        let rule_width = header_line.chars().count().max(table.title.len());

        let mut output = String::new();
        output.push('\n');
        output.push_str(&table.title);
        output.push('\n');
        output.push_str(&"=".repeat(rule_width));
        output.push('\n');
        output.push_str(&header_line);
        output.push('\n');
        output.push_str(&"-".repeat(rule_width));

        if body.is_empty() {
            output.push_str("\n(no results)");
        }
        for cells in &body {
            output.push('\n');
            output.push_str(&format_line(cells));
        }

        if let Some(speedups) = self.speedups(table) {
            output.push('\n');
            output.push_str(&speedups);
        }

        output
    }
}

/// "Sample outputs" section for the small inputs of one benchmark
///
/// Returns `None` when no recorded input is at most [`SAMPLE_MAX_INPUT`].
pub fn format_sample_outputs<'a>(
    outputs: impl IntoIterator<Item = &'a InputOutputs>,
) -> Option<String> {
    let mut lines = Vec::new();
    for entry in outputs {
        if entry.input > SAMPLE_MAX_INPUT {
            continue;
        }
        lines.push(format!("n={}:", entry.input));
        for (label, value) in &entry.outputs {
            let text: String = value.to_string().chars().take(SAMPLE_WIDTH).collect();
            lines.push(format!("  {label}: {text}"));
        }
    }

    if lines.is_empty() {
        None
    } else {
        Some(format!("\nSample Outputs:\n{}", lines.join("\n")))
    }
}
