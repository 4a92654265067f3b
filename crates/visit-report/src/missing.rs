//! Missing-data table.

use std::collections::BTreeSet;
use std::path::Path;

use tracing::{debug, info};

use visit_model::Reconciliation;

use crate::error::Result;
use crate::table::{TabularReport, write_csv};

pub const SUBJECT_HEADER: &str = "Subject";
pub const MONTH_HEADER: &str = "MONTH";

/// How missing counts are shown. The reconciliation itself stays signed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MissingDisplay {
    /// Negative values show over-collection.
    #[default]
    Signed,
    ClampedAtZero,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MissingReportOptions {
    pub display: MissingDisplay,
    /// Instrument columns left out of the table.
    pub omit: BTreeSet<String>,
}

impl MissingReportOptions {
    #[must_use]
    pub fn clamped(mut self) -> Self {
        self.display = MissingDisplay::ClampedAtZero;
        self
    }

    #[must_use]
    pub fn omit<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.omit.extend(names.into_iter().map(Into::into));
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingReportRow {
    pub subject_id: String,
    /// One cell per report column; `None` where the count was unreadable.
    pub cells: Vec<Option<i64>>,
    pub elapsed_months: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingReport {
    /// Instrument columns in schedule order.
    pub columns: Vec<String>,
    pub rows: Vec<MissingReportRow>,
    pub display: MissingDisplay,
}

impl MissingReport {
    pub fn row(&self, subject_id: &str) -> Option<&MissingReportRow> {
        self.rows.iter().find(|row| row.subject_id == subject_id)
    }

    pub fn value(&self, subject_id: &str, instrument: &str) -> Option<i64> {
        let column = self.columns.iter().position(|name| name == instrument)?;
        self.row(subject_id)?.cells.get(column).copied().flatten()
    }
}

/// Lay a reconciliation out as a table: participants by instruments, plus
/// each participant's elapsed month.
pub fn assemble_missing_report(
    reconciliation: &Reconciliation,
    options: &MissingReportOptions,
) -> MissingReport {
    for name in &options.omit {
        if !reconciliation.instruments.contains(name) {
            debug!(instrument = %name, "omitted column is not in the schedule");
        }
    }
    let kept: Vec<usize> = reconciliation
        .instruments
        .iter()
        .enumerate()
        .filter(|(_, name)| !options.omit.contains(*name))
        .map(|(index, _)| index)
        .collect();
    let columns = kept
        .iter()
        .map(|&index| reconciliation.instruments[index].clone())
        .collect();

    let rows = reconciliation
        .rows
        .iter()
        .map(|row| MissingReportRow {
            subject_id: row.subject_id.clone(),
            cells: kept
                .iter()
                .map(|&index| {
                    let value = row.missing.get(index).and_then(|cell| cell.missing);
                    match options.display {
                        MissingDisplay::Signed => value,
                        MissingDisplay::ClampedAtZero => value.map(|value| value.max(0)),
                    }
                })
                .collect(),
            elapsed_months: row.elapsed_months,
        })
        .collect();

    MissingReport {
        columns,
        rows,
        display: options.display,
    }
}

impl TabularReport for MissingReport {
    fn header(&self) -> Vec<String> {
        let mut header = Vec::with_capacity(self.columns.len() + 2);
        header.push(SUBJECT_HEADER.to_string());
        header.extend(self.columns.iter().cloned());
        header.push(MONTH_HEADER.to_string());
        header
    }

    fn records(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| {
                let mut record = Vec::with_capacity(row.cells.len() + 2);
                record.push(row.subject_id.clone());
                record.extend(
                    row.cells
                        .iter()
                        .map(|cell| cell.map(|value| value.to_string()).unwrap_or_default()),
                );
                record.push(row.elapsed_months.to_string());
                record
            })
            .collect()
    }
}

/// Export the missing-data table. Unreadable cells are written empty.
pub fn write_missing_report_csv(report: &MissingReport, path: &Path) -> Result<()> {
    write_csv(report, path)?;
    info!(path = %path.display(), rows = report.rows.len(), "wrote missing-data report");
    Ok(())
}
