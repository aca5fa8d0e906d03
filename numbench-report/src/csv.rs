//! CSV Output

use numbench_core::{Cell, ReportTable, Reporter};

/// CSV renderer; the first column carries the benchmark title
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvReporter;

fn write_table(table: &ReportTable) -> Result<Vec<u8>, ::csv::Error> {
    let mut writer = ::csv::Writer::from_writer(Vec::new());

    writer.write_record(
        std::iter::once("benchmark").chain(table.headers.iter().map(String::as_str)),
    )?;

    for row in &table.rows {
        let mut record = Vec::with_capacity(table.headers.len() + 1);
        record.push(table.title.clone());
        for header in &table.headers {
            record.push(match row.get(header) {
                None => String::new(),
                Some(cell) if cell.is_missing() => String::new(),
                Some(Cell::Text(s)) => s.clone(),
                Some(Cell::Number(v)) => v.to_string(),
            });
        }
        writer.write_record(&record)?;
    }

    writer.into_inner().map_err(|e| e.into_error().into())
}

impl Reporter for CsvReporter {
    fn render(&self, table: &ReportTable) -> String {
        match write_table(table) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(e) => {
                tracing::error!(benchmark = %table.title, error = %e, "Failed to write CSV");
                String::new()
            }
        }
    }
}
