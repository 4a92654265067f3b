use tracing::{info, warn};

use visit_model::Roster;

use crate::cache::CsvRosterCache;
use crate::error::RosterError;
use crate::live::LiveRoster;
use crate::source::RecordSource;

/// Anything that can produce a study roster.
pub trait RosterLoader {
    fn load_roster(&self, study_id: &str) -> Result<Roster, RosterError>;
}

impl<S: RecordSource> RosterLoader for LiveRoster<S> {
    fn load_roster(&self, study_id: &str) -> Result<Roster, RosterError> {
        self.fetch(study_id)
    }
}

impl RosterLoader for CsvRosterCache {
    fn load_roster(&self, study_id: &str) -> Result<Roster, RosterError> {
        self.load(study_id)
    }
}

impl<T: RosterLoader + ?Sized> RosterLoader for Box<T> {
    fn load_roster(&self, study_id: &str) -> Result<Roster, RosterError> {
        (**self).load_roster(study_id)
    }
}

impl<T: RosterLoader + ?Sized> RosterLoader for &T {
    fn load_roster(&self, study_id: &str) -> Result<Roster, RosterError> {
        (**self).load_roster(study_id)
    }
}

/// Tries `primary`, then `fallback` if the primary fails for any reason.
#[derive(Debug, Clone)]
pub struct FallbackRoster<P, F> {
    primary: P,
    fallback: F,
}

impl<P, F> FallbackRoster<P, F> {
    pub fn new(primary: P, fallback: F) -> Self {
        Self { primary, fallback }
    }
}

impl<P: RosterLoader, F: RosterLoader> RosterLoader for FallbackRoster<P, F> {
    fn load_roster(&self, study_id: &str) -> Result<Roster, RosterError> {
        let primary_error = match self.primary.load_roster(study_id) {
            Ok(roster) => return Ok(roster),
            Err(error) => error,
        };
        warn!(study_id, error = %primary_error, "primary roster source failed, trying fallback");

        match self.fallback.load_roster(study_id) {
            Ok(roster) => {
                info!(study_id, participants = roster.len(), "roster loaded from fallback");
                Ok(roster)
            }
            Err(fallback_error) => Err(RosterError::Unavailable {
                study_id: study_id.to_string(),
                reasons: vec![primary_error.to_string(), fallback_error.to_string()],
            }),
        }
    }
}
