//! CSV roster cache.
//!
//! Every complete live load overwrites the cache so a later run can report
//! without the database. Column contract:
//!
//! `Study, Subject, Group, M/F, First Visit, MONTH, <instrument>...`
//!
//! `Subject`, `Group` and `M/F` are required. `First Visit` and `MONTH` are
//! optional and decide the roster's [`MonthBasis`] once, at load time:
//! a `First Visit` column means dates, `MONTH` alone means recorded months,
//! neither means the largest observed count stands in for elapsed months.
//! `Study` names the study the snapshot was taken for; loading it for any
//! other study is refused. Caches written without it are trusted as-is.
//! Every other column is an instrument count, matched to the schedule's
//! names ignoring case.

use std::collections::BTreeSet;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use csv::{ReaderBuilder, Trim, WriterBuilder};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use visit_core::resolve_elapsed_months;
use visit_model::{
    InstrumentSchedule, LoadOutcome, MonthBasis, ObservedCount, ParticipantRecord, Roster,
    RosterProvider,
};

use crate::dates::{find_column, normalize_header, parse_visit_date};
use crate::error::{CacheError, RosterError};

pub const STUDY_COLUMN: &str = "Study";
pub const SUBJECT_COLUMN: &str = "Subject";
pub const GROUP_COLUMN: &str = "Group";
pub const SEX_COLUMN: &str = "M/F";
pub const FIRST_VISIT_COLUMN: &str = "First Visit";
pub const MONTH_COLUMN: &str = "MONTH";

const FIXED_COLUMNS: [&str; 6] = [
    STUDY_COLUMN,
    SUBJECT_COLUMN,
    GROUP_COLUMN,
    SEX_COLUMN,
    FIRST_VISIT_COLUMN,
    MONTH_COLUMN,
];

/// Records read back from a cache file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedRoster {
    pub records: Vec<ParticipantRecord>,
    pub basis: MonthBasis,
    /// Values of the `Study` column. Empty when the cache has none.
    pub studies: BTreeSet<String>,
}

#[derive(Debug)]
struct CacheLayout {
    study: Option<usize>,
    subject: usize,
    group: usize,
    sex: usize,
    first_visit: Option<usize>,
    month: Option<usize>,
    counts: Vec<(usize, String)>,
}

impl CacheLayout {
    fn from_headers(
        path: &Path,
        headers: &[String],
        schedule: &InstrumentSchedule,
    ) -> Result<Self, CacheError> {
        let required = |column: &'static str| {
            find_column(headers, &[column]).ok_or_else(|| CacheError::MissingColumn {
                path: path.to_path_buf(),
                column,
            })
        };
        let study = find_column(headers, &[STUDY_COLUMN]);
        let subject = required(SUBJECT_COLUMN)?;
        let group = required(GROUP_COLUMN)?;
        let sex = required(SEX_COLUMN)?;
        let first_visit = find_column(headers, &[FIRST_VISIT_COLUMN]);
        let month = find_column(headers, &[MONTH_COLUMN]);
        let counts = headers
            .iter()
            .enumerate()
            .filter(|(_, header)| {
                !header.is_empty()
                    && !FIXED_COLUMNS
                        .iter()
                        .any(|fixed| header.eq_ignore_ascii_case(fixed))
            })
            .map(|(index, header)| {
                let name = schedule
                    .names()
                    .find(|name| name.eq_ignore_ascii_case(header))
                    .map_or_else(|| header.clone(), str::to_string);
                (index, name)
            })
            .collect();
        Ok(Self {
            study,
            subject,
            group,
            sex,
            first_visit,
            month,
            counts,
        })
    }

    fn basis(&self) -> MonthBasis {
        if self.first_visit.is_some() {
            MonthBasis::FirstVisitDate
        } else if self.month.is_some() {
            MonthBasis::RecordedMonth
        } else {
            MonthBasis::MaxObservedCount
        }
    }
}

/// Read a roster cache file. Count columns spelled like a `schedule`
/// instrument in another case are stored under the schedule's name.
pub fn read_roster_cache(
    path: &Path,
    schedule: &InstrumentSchedule,
) -> Result<CachedRoster, CacheError> {
    let file = File::open(path).map_err(|error| CacheError::io(path, error))?;
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(file);
    let headers: Vec<String> = reader
        .headers()
        .map_err(|error| CacheError::csv(path, error))?
        .iter()
        .map(normalize_header)
        .collect();
    let layout = CacheLayout::from_headers(path, &headers, schedule)?;
    let basis = layout.basis();

    let mut records = Vec::new();
    let mut seen = BTreeSet::new();
    let mut studies = BTreeSet::new();
    for (line, row) in reader.records().enumerate() {
        let row = row.map_err(|error| CacheError::csv(path, error))?;
        let cell = |index: usize| row.get(index).unwrap_or("");
        let subject_id = cell(layout.subject);
        if subject_id.is_empty() {
            warn!(path = %path.display(), row = line + 1, "skipping cache row without subject");
            continue;
        }
        if !seen.insert(subject_id.to_string()) {
            warn!(path = %path.display(), subject_id, "duplicate subject in cache, keeping first row");
            continue;
        }
        if let Some(index) = layout.study
            && !cell(index).is_empty()
        {
            studies.insert(cell(index).to_string());
        }
        let mut record = ParticipantRecord::new(subject_id, cell(layout.group), cell(layout.sex));
        if let Some(index) = layout.first_visit {
            record.first_visit_date = match parse_visit_date(cell(index)) {
                Ok(date) => date,
                Err(()) => {
                    warn!(
                        subject_id,
                        value = cell(index),
                        "unreadable first visit date, treating as unknown"
                    );
                    None
                }
            };
        }
        if let Some(index) = layout.month {
            record.recorded_month = match ObservedCount::parse(cell(index)) {
                ObservedCount::Count(month) => Some(month),
                ObservedCount::Malformed(raw) => {
                    warn!(subject_id, value = %raw, "unreadable MONTH value, treating as unknown");
                    None
                }
            };
        }
        for (index, instrument) in &layout.counts {
            record
                .counts
                .insert(instrument.clone(), ObservedCount::parse(cell(*index)));
        }
        records.push(record);
    }

    debug!(
        path = %path.display(),
        participants = records.len(),
        basis = %basis,
        "read roster cache"
    );
    Ok(CachedRoster {
        records,
        basis,
        studies,
    })
}

/// Write `roster` to `path`, replacing any previous cache atomically.
///
/// Instrument columns are exactly the schedule's names in schedule order.
/// Rosters dated by first visit keep a `First Visit` column; other bases are
/// written as a `MONTH` column so reloading resolves the same months.
pub fn write_roster_cache(
    path: &Path,
    roster: &Roster,
    schedule: &InstrumentSchedule,
    as_of: NaiveDate,
) -> Result<(), CacheError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir).map_err(|error| CacheError::io(&dir, error))?;
    let with_dates = roster.basis == MonthBasis::FirstVisitDate;

    let mut headers = vec![STUDY_COLUMN, SUBJECT_COLUMN, GROUP_COLUMN, SEX_COLUMN];
    if with_dates {
        headers.push(FIRST_VISIT_COLUMN);
    }
    headers.push(MONTH_COLUMN);
    headers.extend(schedule.names());

    let mut temp = NamedTempFile::new_in(&dir).map_err(|error| CacheError::io(&dir, error))?;
    {
        let mut writer = WriterBuilder::new().from_writer(&mut temp);
        writer
            .write_record(&headers)
            .map_err(|error| CacheError::csv(path, error))?;
        for record in &roster.records {
            let mut row = vec![
                roster.study_id.clone(),
                record.subject_id.clone(),
                record.group.clone(),
                record.sex.clone(),
            ];
            if with_dates {
                row.push(
                    record
                        .first_visit_date
                        .map(|date| date.format("%Y-%m-%d").to_string())
                        .unwrap_or_default(),
                );
            }
            row.push(resolve_elapsed_months(record, roster.basis, as_of).to_string());
            for name in schedule.names() {
                row.push(record.observed(name).cloned().unwrap_or_default().to_string());
            }
            writer
                .write_record(&row)
                .map_err(|error| CacheError::csv(path, error))?;
        }
        writer.flush().map_err(|error| CacheError::io(path, error))?;
    }
    temp.persist(path).map_err(|source| CacheError::Persist {
        path: path.to_path_buf(),
        source,
    })?;

    let dropped: BTreeSet<&str> = roster
        .records
        .iter()
        .flat_map(|record| record.counts.keys())
        .map(String::as_str)
        .filter(|name| !schedule.contains(name))
        .collect();
    if !dropped.is_empty() {
        warn!(
            instruments = ?dropped,
            "counts for instruments outside the schedule were not cached"
        );
    }
    info!(
        path = %path.display(),
        participants = roster.records.len(),
        "wrote roster cache"
    );
    Ok(())
}

/// Roster provider backed by a cache file.
#[derive(Debug, Clone)]
pub struct CsvRosterCache {
    path: PathBuf,
    schedule: InstrumentSchedule,
}

impl CsvRosterCache {
    /// Cache at `path`, read against the reference schedule.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            schedule: InstrumentSchedule::reference(),
        }
    }

    /// Schedule whose instrument names count columns are matched against.
    #[must_use]
    pub fn with_schedule(mut self, schedule: InstrumentSchedule) -> Self {
        self.schedule = schedule;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self, study_id: &str) -> Result<Roster, RosterError> {
        if !self.path.is_file() {
            return Err(RosterError::unavailable(
                study_id,
                format!("roster cache {} not found", self.path.display()),
            ));
        }
        let CachedRoster {
            records,
            basis,
            studies,
        } = read_roster_cache(&self.path, &self.schedule)?;
        if studies.is_empty() {
            debug!(path = %self.path.display(), "roster cache names no study");
        } else if studies.len() > 1 || !studies.contains(study_id) {
            let found: Vec<&str> = studies.iter().map(String::as_str).collect();
            return Err(RosterError::unavailable(
                study_id,
                format!(
                    "roster cache {} holds study {}",
                    self.path.display(),
                    found.join(", ")
                ),
            ));
        }
        info!(
            study_id,
            path = %self.path.display(),
            participants = records.len(),
            basis = %basis,
            "loaded roster from cache"
        );
        Ok(Roster::new(study_id, records)
            .with_basis(basis)
            .with_outcome(LoadOutcome::for_provider(RosterProvider::Cache)))
    }
}
