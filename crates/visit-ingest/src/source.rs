//! The seam to the imaging database.
//!
//! The database client itself lives outside this workspace. Anything that can
//! list a study's subjects and count their experiments per datatype can feed
//! the live roster loader.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::error::SourceError;

/// Subject-level attributes as stored in the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectInfo {
    pub subject_id: String,
    pub group: String,
    pub sex: String,
}

impl SubjectInfo {
    pub fn new(
        subject_id: impl Into<String>,
        group: impl Into<String>,
        sex: impl Into<String>,
    ) -> Self {
        Self {
            subject_id: subject_id.into(),
            group: group.into(),
            sex: sex.into(),
        }
    }
}

/// Experiments of one datatype for one subject.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TypeCount {
    pub count: u32,
    pub earliest: Option<NaiveDate>,
}

/// Experiment counts for one subject, keyed by datatype (source type id).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubjectCounts {
    pub by_source_type: BTreeMap<String, TypeCount>,
}

impl SubjectCounts {
    /// Count one experiment of `source_type`, dated `date` when known.
    pub fn record(&mut self, source_type: &str, date: Option<NaiveDate>) {
        let entry = self
            .by_source_type
            .entry(source_type.to_string())
            .or_default();
        entry.count += 1;
        entry.earliest = match (entry.earliest, date) {
            (Some(current), Some(date)) => Some(current.min(date)),
            (current, date) => current.or(date),
        };
    }

    /// Earliest visit across every datatype.
    pub fn first_visit(&self) -> Option<NaiveDate> {
        self.by_source_type
            .values()
            .filter_map(|count| count.earliest)
            .min()
    }
}

/// A live source of subjects and their experiment counts.
///
/// Implementations are called concurrently, one call per subject.
pub trait RecordSource: Sync {
    fn subjects(&self, study_id: &str) -> Result<Vec<SubjectInfo>, SourceError>;

    fn experiment_counts(
        &self,
        study_id: &str,
        subject: &SubjectInfo,
    ) -> Result<SubjectCounts, SourceError>;
}

impl<T: RecordSource + ?Sized> RecordSource for &T {
    fn subjects(&self, study_id: &str) -> Result<Vec<SubjectInfo>, SourceError> {
        (**self).subjects(study_id)
    }

    fn experiment_counts(
        &self,
        study_id: &str,
        subject: &SubjectInfo,
    ) -> Result<SubjectCounts, SourceError> {
        (**self).experiment_counts(study_id, subject)
    }
}
