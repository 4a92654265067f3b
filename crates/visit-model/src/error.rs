use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("unknown instrument: {name}")]
    UnknownInstrument { name: String },

    #[error("instrument name must not be empty")]
    EmptyName,

    #[error("duplicate instrument in schedule: {name}")]
    DuplicateInstrument { name: String },

    #[error("instrument {name} has no source type")]
    MissingSourceType { name: String },

    #[error("source type {source_type} is used by both {first} and {second}")]
    DuplicateSourceType {
        source_type: String,
        first: String,
        second: String,
    },

    #[error("instrument {name} has invalid cadence {months}; must be at least 1 month")]
    InvalidCadence { name: String, months: u32 },
}

impl ScheduleError {
    pub(crate) fn unknown(name: impl Into<String>) -> Self {
        Self::UnknownInstrument { name: name.into() }
    }
}

pub type Result<T> = std::result::Result<T, ScheduleError>;
