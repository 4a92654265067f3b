//! Observed collection counts per participant.

use chrono::NaiveDate;

use visit_core::resolve_elapsed_months;
use visit_model::{InstrumentSchedule, ObservedCount, Roster};

use crate::missing::{MONTH_HEADER, SUBJECT_HEADER};
use crate::table::TabularReport;

pub const GROUP_HEADER: &str = "Group";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionRow {
    pub subject_id: String,
    pub group: String,
    pub elapsed_months: u32,
    /// One count per schedule instrument; unrecorded instruments are zero.
    pub counts: Vec<ObservedCount>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionReport {
    pub columns: Vec<String>,
    /// Least advanced participants first.
    pub rows: Vec<CollectionRow>,
}

/// Observed counts for every active participant, in schedule column order.
pub fn assemble_collection_report(
    roster: &Roster,
    schedule: &InstrumentSchedule,
    as_of: NaiveDate,
) -> CollectionReport {
    let mut rows: Vec<CollectionRow> = roster
        .records
        .iter()
        .filter(|record| !record.is_withdrawn())
        .map(|record| CollectionRow {
            subject_id: record.subject_id.clone(),
            group: record.group.clone(),
            elapsed_months: resolve_elapsed_months(record, roster.basis, as_of),
            counts: schedule
                .names()
                .map(|name| record.observed(name).cloned().unwrap_or_default())
                .collect(),
        })
        .collect();
    rows.sort_by(|left, right| {
        left.elapsed_months
            .cmp(&right.elapsed_months)
            .then_with(|| left.subject_id.cmp(&right.subject_id))
    });
    CollectionReport {
        columns: schedule.names().map(str::to_string).collect(),
        rows,
    }
}

impl TabularReport for CollectionReport {
    fn header(&self) -> Vec<String> {
        [GROUP_HEADER, SUBJECT_HEADER]
            .into_iter()
            .map(str::to_string)
            .chain(self.columns.iter().cloned())
            .chain(std::iter::once(MONTH_HEADER.to_string()))
            .collect()
    }

    fn records(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| {
                [row.group.clone(), row.subject_id.clone()]
                    .into_iter()
                    .chain(row.counts.iter().map(ToString::to_string))
                    .chain(std::iter::once(row.elapsed_months.to_string()))
                    .collect()
            })
            .collect()
    }
}
