use std::fmt;

use visit_model::{MonthBasis, Reconciliation, Roster, RosterProvider};

/// What a report run skipped or defaulted, stated alongside every report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportCompleteness {
    pub provider: RosterProvider,
    pub basis: MonthBasis,
    pub loaded: usize,
    pub failed: usize,
    pub cancelled: usize,
    pub withdrawn_excluded: usize,
    pub reported: usize,
    pub malformed_cells: usize,
    pub unknown_instruments: Vec<String>,
}

impl ReportCompleteness {
    pub fn new(roster: &Roster, reconciliation: &Reconciliation) -> Self {
        Self {
            provider: roster.outcome.provider,
            basis: reconciliation.basis,
            loaded: roster.len(),
            failed: roster.outcome.failures.len(),
            cancelled: roster.outcome.cancelled,
            withdrawn_excluded: reconciliation.issues.withdrawn_excluded,
            reported: reconciliation.rows.len(),
            malformed_cells: reconciliation.issues.malformed_cells.len(),
            unknown_instruments: reconciliation
                .issues
                .unknown_instruments
                .iter()
                .cloned()
                .collect(),
        }
    }

    /// True when nothing was skipped apart from withdrawn participants.
    pub fn is_complete(&self) -> bool {
        self.failed == 0
            && self.cancelled == 0
            && self.malformed_cells == 0
            && self.unknown_instruments.is_empty()
    }
}

impl fmt::Display for ReportCompleteness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} participants reported from {} ({} loaded, {} withdrawn excluded",
            self.reported, self.provider, self.loaded, self.withdrawn_excluded
        )?;
        if self.failed > 0 {
            write!(f, ", {} failed to load", self.failed)?;
        }
        if self.cancelled > 0 {
            write!(f, ", {} cancelled", self.cancelled)?;
        }
        write!(f, "); months by {}", self.basis)?;
        if self.malformed_cells > 0 {
            write!(f, "; {} unreadable cells", self.malformed_cells)?;
        }
        if !self.unknown_instruments.is_empty() {
            write!(
                f,
                "; skipped unknown instruments: {}",
                self.unknown_instruments.join(", ")
            )?;
        }
        Ok(())
    }
}
