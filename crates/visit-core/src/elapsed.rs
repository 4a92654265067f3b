//! Elapsed trial months.
//!
//! A trial month is a fixed 30-day period counted from the participant's
//! first recorded visit. Calendar months are never used, so a participant's
//! month only depends on the day count.

use chrono::{Local, NaiveDate};

use visit_model::{MonthBasis, ParticipantRecord};

pub const DAYS_PER_MONTH: i64 = 30;

/// Today's date in local time, the default report horizon.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Whole 30-day months between `first_visit` and `as_of`.
///
/// An unknown first visit counts as just enrolled, and a first visit after
/// `as_of` is clamped to zero.
pub fn elapsed_months(first_visit: Option<NaiveDate>, as_of: NaiveDate) -> u32 {
    let Some(first_visit) = first_visit else {
        return 0;
    };
    let days = (as_of - first_visit).num_days();
    if days <= 0 {
        return 0;
    }
    u32::try_from(days / DAYS_PER_MONTH).unwrap_or(u32::MAX)
}

/// Elapsed months for a record under the roster's month basis.
pub fn resolve_elapsed_months(
    record: &ParticipantRecord,
    basis: MonthBasis,
    as_of: NaiveDate,
) -> u32 {
    match basis {
        MonthBasis::FirstVisitDate => elapsed_months(record.first_visit_date, as_of),
        MonthBasis::RecordedMonth => record.recorded_month.unwrap_or(0),
        MonthBasis::MaxObservedCount => record.max_observed_count(),
    }
}
