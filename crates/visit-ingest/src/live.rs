//! Live roster loading with a bounded fan-out over subjects.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::NaiveDate;
use rayon::ThreadPoolBuilder;
use rayon::prelude::*;
use tracing::{debug, info, info_span, warn};

use visit_core::today;
use visit_model::{
    InstrumentSchedule, LoadFailure, LoadOutcome, MonthBasis, ParticipantRecord, Roster,
    RosterProvider,
};

use crate::cache::write_roster_cache;
use crate::error::RosterError;
use crate::source::{RecordSource, SubjectCounts, SubjectInfo};

pub const DEFAULT_CONCURRENCY: usize = 4;

/// Shared flag that stops a running fetch before its next subject.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

enum Fetch {
    Loaded(SubjectCounts),
    Failed(String),
    Cancelled,
}

/// Loads a roster from a [`RecordSource`] and refreshes the cache on success.
#[derive(Debug, Clone)]
pub struct LiveRoster<S> {
    source: S,
    schedule: InstrumentSchedule,
    cache_path: Option<PathBuf>,
    concurrency: usize,
    as_of: NaiveDate,
    cancel: CancelToken,
}

impl<S: RecordSource> LiveRoster<S> {
    pub fn new(source: S, schedule: InstrumentSchedule) -> Self {
        Self {
            source,
            schedule,
            cache_path: None,
            concurrency: DEFAULT_CONCURRENCY,
            as_of: today(),
            cancel: CancelToken::new(),
        }
    }

    /// Cache file rewritten after every complete fetch.
    #[must_use]
    pub fn with_cache_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache_path = Some(path.into());
        self
    }

    /// Upper bound on concurrent per-subject requests. Zero is treated as one.
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Horizon used for the cache's `MONTH` column.
    #[must_use]
    pub fn with_as_of(mut self, as_of: NaiveDate) -> Self {
        self.as_of = as_of;
        self
    }

    #[must_use]
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Fetch every subject of `study_id`.
    ///
    /// Per-subject failures and cancellation leave those subjects out and are
    /// reported in the roster's [`LoadOutcome`]. Only a complete fetch
    /// overwrites the cache. Failing to list subjects, or a listing with no
    /// subjects at all, is [`RosterError::Unavailable`] and leaves the cache
    /// untouched.
    pub fn fetch(&self, study_id: &str) -> Result<Roster, RosterError> {
        let span = info_span!("live_fetch", study_id, concurrency = self.concurrency);
        let _guard = span.enter();

        let subjects = self
            .source
            .subjects(study_id)
            .map_err(|error| RosterError::unavailable(study_id, error.to_string()))?;
        if subjects.is_empty() {
            return Err(RosterError::unavailable(
                study_id,
                "record source lists no subjects for this study",
            ));
        }
        info!(subjects = subjects.len(), "fetching experiment counts");

        let pool = ThreadPoolBuilder::new()
            .num_threads(self.concurrency)
            .thread_name(|index| format!("roster-fetch-{index}"))
            .build()?;
        let fetched: Vec<(&SubjectInfo, Fetch)> = pool.install(|| {
            subjects
                .par_iter()
                .map(|subject| (subject, self.fetch_subject(study_id, subject)))
                .collect()
        });

        let mut records = Vec::with_capacity(fetched.len());
        let mut outcome = LoadOutcome::for_provider(RosterProvider::Live);
        for (subject, fetch) in fetched {
            match fetch {
                Fetch::Loaded(counts) => records.push(self.to_record(subject, &counts)),
                Fetch::Failed(reason) => {
                    warn!(
                        subject_id = %subject.subject_id,
                        reason = reason.as_str(),
                        "failed to fetch subject"
                    );
                    outcome.failures.push(LoadFailure {
                        subject_id: subject.subject_id.clone(),
                        reason,
                    });
                }
                Fetch::Cancelled => outcome.cancelled += 1,
            }
        }
        if outcome.cancelled > 0 {
            warn!(skipped = outcome.cancelled, "fetch cancelled");
        }

        let mut roster = Roster::new(study_id, records).with_basis(MonthBasis::FirstVisitDate);
        if let Some(path) = &self.cache_path {
            if outcome.is_partial() {
                warn!(
                    path = %path.display(),
                    not_loaded = outcome.not_loaded(),
                    "partial fetch, roster cache left unchanged"
                );
            } else {
                match write_roster_cache(path, &roster, &self.schedule, self.as_of) {
                    Ok(()) => outcome.cache_written = Some(path.clone()),
                    Err(error) => warn!(%error, "failed to refresh roster cache"),
                }
            }
        }
        info!(
            participants = roster.len(),
            failures = outcome.failures.len(),
            cancelled = outcome.cancelled,
            "live fetch complete"
        );
        roster.outcome = outcome;
        Ok(roster)
    }

    fn fetch_subject(&self, study_id: &str, subject: &SubjectInfo) -> Fetch {
        if self.cancel.is_cancelled() {
            return Fetch::Cancelled;
        }
        match self.source.experiment_counts(study_id, subject) {
            Ok(counts) => Fetch::Loaded(counts),
            Err(error) => Fetch::Failed(error.to_string()),
        }
    }

    fn to_record(&self, subject: &SubjectInfo, counts: &SubjectCounts) -> ParticipantRecord {
        let mut record = ParticipantRecord::new(
            subject.subject_id.as_str(),
            subject.group.as_str(),
            subject.sex.as_str(),
        )
        .with_first_visit(counts.first_visit());
        for (source_type, count) in &counts.by_source_type {
            match self.schedule.by_source_type(source_type) {
                Some(instrument) => {
                    record = record.with_count(instrument.name.as_str(), count.count);
                }
                None => debug!(
                    subject_id = %subject.subject_id,
                    source_type = %source_type,
                    "ignoring experiments of unscheduled datatype"
                ),
            }
        }
        record
    }
}
