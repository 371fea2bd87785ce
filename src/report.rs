/// CSV rendering of reconciliation rows
use crate::errors::TrackerError;
use crate::reconcile::{format_decimal, format_percent, Reconciliation, ReportRow};
use csv::WriterBuilder;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Column naming for one report
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportLayout {
    /// Token symbol appended to amount columns, e.g. `received_total_YB`
    pub symbol: Option<String>,
}

impl ReportLayout {
    pub fn new(symbol: Option<String>) -> Self {
        let symbol = symbol
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        Self { symbol }
    }

    fn amount_column(&self, name: &str) -> String {
        match &self.symbol {
            Some(symbol) => format!("{}_{}", name, symbol),
            None => name.to_string(),
        }
    }

    pub fn header(&self, categories: &[String]) -> Vec<String> {
        let mut header = vec![
            "address".to_string(),
            self.amount_column("received_total"),
            self.amount_column("current_balance"),
            self.amount_column("delta"),
            "percent_remaining".to_string(),
        ];
        header.extend(
            categories
                .iter()
                .map(|category| self.amount_column(&format!("{}_value", category))),
        );
        header
    }
}

fn render_row(row: &ReportRow) -> Vec<String> {
    let mut record = vec![
        row.address.to_string(),
        format_decimal(&row.received),
        format_decimal(&row.current),
        format_decimal(&row.delta),
        format_percent(&row.percent_remaining),
    ];
    record.extend(row.category_values.iter().map(format_decimal));
    record
}

fn write_records<W: Write>(
    writer: W,
    reconciliation: &Reconciliation,
    layout: &ReportLayout,
) -> Result<(), TrackerError> {
    let mut w = WriterBuilder::new().has_headers(false).from_writer(writer);
    w.write_record(layout.header(&reconciliation.categories))?;
    for row in &reconciliation.rows {
        w.write_record(render_row(row))?;
    }
    w.flush()?;
    Ok(())
}

/// Write the report to `path`, replacing any existing file
pub fn write_report(
    path: &Path,
    reconciliation: &Reconciliation,
    layout: &ReportLayout,
) -> Result<(), TrackerError> {
    let file = File::create(path).map_err(|e| {
        TrackerError::Report(format!("Cannot create {}: {}", path.display(), e))
    })?;
    write_records(file, reconciliation, layout)
}

/// Write the report to a fresh `airdrop_*.csv` in `dir` and return its path
///
/// Concurrent runs writing into one directory never collide.
pub fn write_report_unique(
    dir: &Path,
    reconciliation: &Reconciliation,
    layout: &ReportLayout,
) -> Result<PathBuf, TrackerError> {
    let file = tempfile::Builder::new()
        .prefix("airdrop_")
        .suffix(".csv")
        .tempfile_in(dir)
        .map_err(|e| TrackerError::Report(format!("Cannot create report in {}: {}", dir.display(), e)))?;

    write_records(file.as_file(), reconciliation, layout)?;

    let (_, path) = file
        .keep()
        .map_err(|e| TrackerError::Report(format!("Cannot keep report file: {}", e)))?;
    Ok(path)
}
