use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::roster::MonthBasis;

/// Missing count for one instrument of one participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstrumentMissing {
    pub instrument: String,
    /// Expected minus observed. Negative when over-collected; `None` when the
    /// observed cell was malformed.
    pub missing: Option<i64>,
}

/// Per-participant output of the reconciler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationRow {
    pub subject_id: String,
    pub elapsed_months: u32,
    /// One entry per schedule instrument, in schedule order.
    pub missing: Vec<InstrumentMissing>,
}

impl ReconciliationRow {
    pub fn cell(&self, instrument: &str) -> Option<&InstrumentMissing> {
        self.missing.iter().find(|cell| cell.instrument == instrument)
    }

    /// Missing value for `instrument`; `None` if unavailable or not scheduled.
    pub fn missing_for(&self, instrument: &str) -> Option<i64> {
        self.cell(instrument).and_then(|cell| cell.missing)
    }

    pub fn is_up_to_date(&self) -> bool {
        self.missing
            .iter()
            .all(|cell| cell.missing.is_none_or(|value| value <= 0))
    }
}

/// A cell the reconciler could not evaluate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellIssue {
    pub subject_id: String,
    pub instrument: String,
    pub raw: String,
}

/// What the reconciler skipped or defaulted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileIssues {
    pub withdrawn_excluded: usize,
    pub malformed_cells: Vec<CellIssue>,
    /// Count columns that name no scheduled instrument.
    pub unknown_instruments: BTreeSet<String>,
}

impl ReconcileIssues {
    pub fn is_empty(&self) -> bool {
        self.malformed_cells.is_empty() && self.unknown_instruments.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reconciliation {
    /// Schedule instrument names, i.e. the column order of every row.
    pub instruments: Vec<String>,
    /// Sorted by elapsed months descending, then subject ascending.
    pub rows: Vec<ReconciliationRow>,
    pub basis: MonthBasis,
    pub issues: ReconcileIssues,
}

impl Reconciliation {
    pub fn row(&self, subject_id: &str) -> Option<&ReconciliationRow> {
        self.rows.iter().find(|row| row.subject_id == subject_id)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
