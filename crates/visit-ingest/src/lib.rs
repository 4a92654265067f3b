//! Roster ingestion.
//!
//! Participant rosters come from a live [`RecordSource`] fanned out over a
//! bounded worker pool, or from the CSV cache that every complete live fetch
//! refreshes. [`FallbackRoster`] chains the two.

pub mod cache;
mod dates;
pub mod error;
pub mod export;
pub mod live;
pub mod roster;
pub mod source;

pub use cache::{CachedRoster, CsvRosterCache, read_roster_cache, write_roster_cache};
pub use error::{CacheError, RosterError, SourceError};
pub use export::{ExportDirectory, SUBJECTS_FILE};
pub use live::{CancelToken, DEFAULT_CONCURRENCY, LiveRoster};
pub use roster::{FallbackRoster, RosterLoader};
pub use source::{RecordSource, SubjectCounts, SubjectInfo, TypeCount};
