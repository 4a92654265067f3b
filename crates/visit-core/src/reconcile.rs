//! Expected-versus-observed reconciliation.

use chrono::NaiveDate;
use tracing::{debug, info, info_span, warn};

use visit_model::{
    CellIssue, InstrumentMissing, InstrumentSchedule, MonthBasis, ObservedCount,
    ParticipantRecord, ReconcileIssues, Reconciliation, ReconciliationRow, Roster, ScheduleError,
};

use crate::elapsed::{resolve_elapsed_months, today};
use crate::error::Result;
use crate::expected::expected_count;

/// What to do with counts for instruments the schedule does not know.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnknownInstrumentPolicy {
    /// Log once per instrument and leave the counts out of the report.
    #[default]
    Skip,
    /// Abort the run with [`ScheduleError::UnknownInstrument`].
    Fail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileOptions {
    /// Report horizon; elapsed months are measured up to this date.
    pub as_of: NaiveDate,
    pub unknown_instruments: UnknownInstrumentPolicy,
}

impl ReconcileOptions {
    pub fn new(as_of: NaiveDate) -> Self {
        Self {
            as_of,
            unknown_instruments: UnknownInstrumentPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_unknown_instruments(mut self, policy: UnknownInstrumentPolicy) -> Self {
        self.unknown_instruments = policy;
        self
    }

    #[must_use]
    pub fn strict(self) -> Self {
        self.with_unknown_instruments(UnknownInstrumentPolicy::Fail)
    }
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self::new(today())
    }
}

/// Reconcile a loaded roster against the schedule.
pub fn reconcile(
    roster: &Roster,
    schedule: &InstrumentSchedule,
    options: &ReconcileOptions,
) -> Result<Reconciliation> {
    let span = info_span!("reconcile", study_id = %roster.study_id, basis = %roster.basis);
    let _guard = span.enter();
    reconcile_records(&roster.records, roster.basis, schedule, options)
}

/// Reconcile participant records directly.
///
/// Withdrawn participants are dropped, every other participant yields one row
/// with a signed missing count per scheduled instrument. Rows are ordered by
/// elapsed months descending, then subject id ascending.
pub fn reconcile_records(
    records: &[ParticipantRecord],
    basis: MonthBasis,
    schedule: &InstrumentSchedule,
    options: &ReconcileOptions,
) -> Result<Reconciliation> {
    let mut issues = ReconcileIssues::default();
    let mut rows = Vec::with_capacity(records.len());

    for record in records {
        if record.is_withdrawn() {
            issues.withdrawn_excluded += 1;
            debug!(subject_id = %record.subject_id, "excluding withdrawn participant");
            continue;
        }
        check_unknown_instruments(record, schedule, options.unknown_instruments, &mut issues)?;

        let elapsed_months = resolve_elapsed_months(record, basis, options.as_of);
        let mut missing = Vec::with_capacity(schedule.len());
        for instrument in schedule.instruments() {
            let expected = i64::from(expected_count(elapsed_months, instrument.cadence_months));
            let value = match record.observed(&instrument.name) {
                None => Some(expected),
                Some(ObservedCount::Count(observed)) => Some(expected - i64::from(*observed)),
                Some(ObservedCount::Malformed(raw)) => {
                    warn!(
                        subject_id = %record.subject_id,
                        instrument = %instrument.name,
                        value = %raw,
                        "malformed observed count, missing value unavailable"
                    );
                    issues.malformed_cells.push(CellIssue {
                        subject_id: record.subject_id.clone(),
                        instrument: instrument.name.clone(),
                        raw: raw.clone(),
                    });
                    None
                }
            };
            missing.push(InstrumentMissing {
                instrument: instrument.name.clone(),
                missing: value,
            });
        }
        rows.push(ReconciliationRow {
            subject_id: record.subject_id.clone(),
            elapsed_months,
            missing,
        });
    }

    rows.sort_by(|left, right| {
        right
            .elapsed_months
            .cmp(&left.elapsed_months)
            .then_with(|| left.subject_id.cmp(&right.subject_id))
    });

    info!(
        participants = rows.len(),
        withdrawn_excluded = issues.withdrawn_excluded,
        malformed_cells = issues.malformed_cells.len(),
        unknown_instruments = issues.unknown_instruments.len(),
        "reconciliation complete"
    );

    Ok(Reconciliation {
        instruments: schedule.names().map(str::to_string).collect(),
        rows,
        basis,
        issues,
    })
}

fn check_unknown_instruments(
    record: &ParticipantRecord,
    schedule: &InstrumentSchedule,
    policy: UnknownInstrumentPolicy,
    issues: &mut ReconcileIssues,
) -> Result<()> {
    for name in record.counts.keys() {
        if schedule.contains(name) {
            continue;
        }
        match policy {
            UnknownInstrumentPolicy::Fail => {
                return Err(ScheduleError::UnknownInstrument { name: name.clone() }.into());
            }
            UnknownInstrumentPolicy::Skip => {
                if issues.unknown_instruments.insert(name.clone()) {
                    warn!(instrument = %name, "skipping counts for instrument not in schedule");
                }
            }
        }
    }
    Ok(())
}
