use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Group label that removes a participant from missing-data accounting.
pub const WITHDRAWN_GROUP: &str = "withdrawn";

/// One observed-count cell as it arrived from a roster source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObservedCount {
    Count(u32),
    /// The raw value could not be read as a non-negative whole number.
    Malformed(String),
}

impl ObservedCount {
    /// Parse a spreadsheet cell.
    ///
    /// Empty cells are zero. Whole-number floats (`"2.0"`) are accepted since
    /// spreadsheet exports write counts that way once a column has gaps.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Self::Count(0);
        }
        if let Ok(value) = trimmed.parse::<u32>() {
            return Self::Count(value);
        }
        match trimmed.parse::<f64>() {
            Ok(value)
                if value.is_finite()
                    && value.fract() == 0.0
                    && value >= 0.0
                    && value <= f64::from(u32::MAX) =>
            {
                Self::Count(value as u32)
            }
            _ => Self::Malformed(trimmed.to_string()),
        }
    }

    pub fn count(&self) -> Option<u32> {
        match self {
            Self::Count(value) => Some(*value),
            Self::Malformed(_) => None,
        }
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Malformed(_))
    }
}

impl Default for ObservedCount {
    fn default() -> Self {
        Self::Count(0)
    }
}

impl From<u32> for ObservedCount {
    fn from(value: u32) -> Self {
        Self::Count(value)
    }
}

impl fmt::Display for ObservedCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Count(value) => write!(f, "{value}"),
            Self::Malformed(raw) => write!(f, "{raw}"),
        }
    }
}

/// Sex category used by the participant summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Sex {
    Male,
    Female,
    Other,
}

impl Sex {
    /// Accepts `male`/`m` and `female`/`f` in any case.
    pub fn from_label(label: &str) -> Self {
        let normalized = label.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "male" | "m" => Sex::Male,
            "female" | "f" => Sex::Female,
            _ => Sex::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Sex::Male => "Male",
            Sex::Female => "Female",
            Sex::Other => "Other",
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One trial participant, as loaded for a single report run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantRecord {
    pub subject_id: String,
    pub group: String,
    pub sex: String,
    /// Earliest recorded visit across all instruments.
    pub first_visit_date: Option<NaiveDate>,
    /// Trial month carried by legacy caches that never stored a visit date.
    pub recorded_month: Option<u32>,
    /// Observed counts keyed by instrument name. Absent means zero.
    pub counts: BTreeMap<String, ObservedCount>,
}

impl ParticipantRecord {
    pub fn new(
        subject_id: impl Into<String>,
        group: impl Into<String>,
        sex: impl Into<String>,
    ) -> Self {
        Self {
            subject_id: subject_id.into(),
            group: group.into(),
            sex: sex.into(),
            first_visit_date: None,
            recorded_month: None,
            counts: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_first_visit(mut self, date: Option<NaiveDate>) -> Self {
        self.first_visit_date = date;
        self
    }

    #[must_use]
    pub fn with_recorded_month(mut self, month: Option<u32>) -> Self {
        self.recorded_month = month;
        self
    }

    #[must_use]
    pub fn with_count(self, instrument: impl Into<String>, count: u32) -> Self {
        self.with_observed(instrument, ObservedCount::Count(count))
    }

    #[must_use]
    pub fn with_observed(mut self, instrument: impl Into<String>, observed: ObservedCount) -> Self {
        self.counts.insert(instrument.into(), observed);
        self
    }

    pub fn observed(&self, instrument: &str) -> Option<&ObservedCount> {
        self.counts.get(instrument)
    }

    pub fn is_withdrawn(&self) -> bool {
        self.group == WITHDRAWN_GROUP
    }

    pub fn sex_category(&self) -> Sex {
        Sex::from_label(&self.sex)
    }

    /// Largest valid observed count; malformed cells are ignored.
    pub fn max_observed_count(&self) -> u32 {
        self.counts
            .values()
            .filter_map(ObservedCount::count)
            .max()
            .unwrap_or(0)
    }
}
