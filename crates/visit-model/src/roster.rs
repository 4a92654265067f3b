use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::participant::ParticipantRecord;

/// How elapsed trial months are derived for a roster.
///
/// Decided once when the roster is loaded, from the columns the source
/// actually provides.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonthBasis {
    /// Whole 30-day periods since the first visit date.
    #[default]
    FirstVisitDate,
    /// A month value stored alongside the counts by an older cache.
    RecordedMonth,
    /// Largest observed count across instruments, used when no dates exist.
    MaxObservedCount,
}

impl MonthBasis {
    pub fn as_str(&self) -> &'static str {
        match self {
            MonthBasis::FirstVisitDate => "first visit date",
            MonthBasis::RecordedMonth => "recorded month",
            MonthBasis::MaxObservedCount => "max observed count",
        }
    }
}

impl fmt::Display for MonthBasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which provider produced a roster.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RosterProvider {
    Live,
    Cache,
    #[default]
    InMemory,
}

impl fmt::Display for RosterProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RosterProvider::Live => "live",
            RosterProvider::Cache => "cache",
            RosterProvider::InMemory => "in-memory",
        };
        f.write_str(label)
    }
}

/// A participant whose data could not be fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadFailure {
    pub subject_id: String,
    pub reason: String,
}

/// Bookkeeping about how a roster load went.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadOutcome {
    pub provider: RosterProvider,
    pub failures: Vec<LoadFailure>,
    /// Participants skipped because the fetch was cancelled.
    pub cancelled: usize,
    /// Cache file refreshed by this load, if any.
    pub cache_written: Option<PathBuf>,
}

impl LoadOutcome {
    pub fn for_provider(provider: RosterProvider) -> Self {
        Self {
            provider,
            ..Self::default()
        }
    }

    /// Participants listed by the source but missing from the roster.
    pub fn not_loaded(&self) -> usize {
        self.failures.len() + self.cancelled
    }

    pub fn is_partial(&self) -> bool {
        self.not_loaded() > 0
    }
}

/// All participant records for one study.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roster {
    pub study_id: String,
    pub records: Vec<ParticipantRecord>,
    pub basis: MonthBasis,
    pub outcome: LoadOutcome,
}

impl Roster {
    pub fn new(study_id: impl Into<String>, records: Vec<ParticipantRecord>) -> Self {
        Self {
            study_id: study_id.into(),
            records,
            basis: MonthBasis::default(),
            outcome: LoadOutcome::default(),
        }
    }

    #[must_use]
    pub fn with_basis(mut self, basis: MonthBasis) -> Self {
        self.basis = basis;
        self
    }

    #[must_use]
    pub fn with_outcome(mut self, outcome: LoadOutcome) -> Self {
        self.outcome = outcome;
        self
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
