pub mod error;
pub mod participant;
pub mod reconciliation;
pub mod roster;
pub mod schedule;
pub mod summary;

pub use error::{Result, ScheduleError};
pub use participant::{ObservedCount, ParticipantRecord, Sex, WITHDRAWN_GROUP};
pub use reconciliation::{
    CellIssue, InstrumentMissing, ReconcileIssues, Reconciliation, ReconciliationRow,
};
pub use roster::{LoadFailure, LoadOutcome, MonthBasis, Roster, RosterProvider};
pub use schedule::{Instrument, InstrumentSchedule};
pub use summary::{GroupCounts, ParticipantSummary};
