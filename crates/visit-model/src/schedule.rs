//! Instrument collection schedule.
//!
//! The schedule is an ordered list of instruments. Order matters: it fixes the
//! column order of every report and of the roster cache.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScheduleError};

/// Reference OPEX schedule: (instrument, cadence in months, source type).
const REFERENCE_INSTRUMENTS: &[(&str, u32, &str)] = &[
    ("Health", 3, "opex:health"),
    ("ACER", 6, "opex:acer"),
    ("CANTAB DMS", 1, "opex:cantabDMS"),
    ("CANTAB ERT", 1, "opex:cantabERT"),
    ("CANTAB MOT", 1, "opex:cantabMOT"),
    ("CANTAB PAL", 1, "opex:cantabPAL"),
    ("CANTAB SWM", 1, "opex:cantabSWM"),
    ("VWM", 3, "opex:amunet"),
    ("PSQI", 3, "opex:psqi"),
    ("DASS", 3, "opex:dass"),
    ("IPAQ", 3, "opex:ipaq"),
    ("Insomnia", 3, "opex:insomnia"),
    ("Godin", 3, "opex:godin"),
    ("COBAS", 1, "opex:bloodCobasData"),
    ("ELISAS", 1, "opex:bloodElisasData"),
    ("MULTIPLEX", 1, "opex:bloodMultiplexData"),
    ("MR Sessions", 6, "xnat:mrSessionData"),
    ("MRI ASHS", 6, "opex:mriashs"),
    ("MRI FS", 6, "opex:mrifs"),
    ("DEXA", 3, "opex:dexa"),
    ("COSMED", 3, "opex:cosmed"),
];

/// A schedule entry: how often an instrument is collected and which
/// database datatype its observations are stored under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instrument {
    pub name: String,
    pub cadence_months: u32,
    pub source_type: String,
}

impl Instrument {
    pub fn new(
        name: impl Into<String>,
        cadence_months: u32,
        source_type: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            cadence_months,
            source_type: source_type.into(),
        }
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (every {} month(s), {})",
            self.name, self.cadence_months, self.source_type
        )
    }
}

/// Immutable, ordered instrument schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstrumentSchedule {
    instruments: Vec<Instrument>,
}

impl InstrumentSchedule {
    /// Build a schedule, validating names, source types and cadences.
    pub fn new(instruments: Vec<Instrument>) -> Result<Self> {
        let mut names: BTreeSet<&str> = BTreeSet::new();
        let mut sources: BTreeMap<&str, &str> = BTreeMap::new();
        for instrument in &instruments {
            if instrument.name.trim().is_empty() {
                return Err(ScheduleError::EmptyName);
            }
            if !names.insert(instrument.name.as_str()) {
                return Err(ScheduleError::DuplicateInstrument {
                    name: instrument.name.clone(),
                });
            }
            if instrument.cadence_months == 0 {
                return Err(ScheduleError::InvalidCadence {
                    name: instrument.name.clone(),
                    months: instrument.cadence_months,
                });
            }
            if instrument.source_type.trim().is_empty() {
                return Err(ScheduleError::MissingSourceType {
                    name: instrument.name.clone(),
                });
            }
            if let Some(first) =
                sources.insert(instrument.source_type.as_str(), instrument.name.as_str())
            {
                return Err(ScheduleError::DuplicateSourceType {
                    source_type: instrument.source_type.clone(),
                    first: first.to_string(),
                    second: instrument.name.clone(),
                });
            }
        }
        Ok(Self { instruments })
    }

    /// The compiled-in reference schedule.
    pub fn reference() -> Self {
        Self {
            instruments: REFERENCE_INSTRUMENTS
                .iter()
                .map(|(name, cadence, source)| Instrument::new(*name, *cadence, *source))
                .collect(),
        }
    }

    /// Return a copy with the cadence of `name` replaced.
    pub fn with_cadence(mut self, name: &str, months: u32) -> Result<Self> {
        if months == 0 {
            return Err(ScheduleError::InvalidCadence {
                name: name.to_string(),
                months,
            });
        }
        let instrument = self
            .instruments
            .iter_mut()
            .find(|instrument| instrument.name == name)
            .ok_or_else(|| ScheduleError::unknown(name))?;
        instrument.cadence_months = months;
        Ok(self)
    }

    /// Instrument names in schedule order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.instruments
            .iter()
            .map(|instrument| instrument.name.as_str())
    }

    pub fn instruments(&self) -> &[Instrument] {
        &self.instruments
    }

    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&Instrument> {
        self.instruments
            .iter()
            .find(|instrument| instrument.name == name)
    }

    pub fn instrument(&self, name: &str) -> Result<&Instrument> {
        self.get(name).ok_or_else(|| ScheduleError::unknown(name))
    }

    pub fn cadence_months(&self, name: &str) -> Result<u32> {
        self.instrument(name)
            .map(|instrument| instrument.cadence_months)
    }

    pub fn source_type(&self, name: &str) -> Result<&str> {
        self.instrument(name)
            .map(|instrument| instrument.source_type.as_str())
    }

    /// Reverse lookup from a database datatype to its instrument.
    pub fn by_source_type(&self, source_type: &str) -> Option<&Instrument> {
        self.instruments
            .iter()
            .find(|instrument| instrument.source_type == source_type)
    }
}

impl Default for InstrumentSchedule {
    fn default() -> Self {
        Self::reference()
    }
}
