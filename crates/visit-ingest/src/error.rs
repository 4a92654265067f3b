use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("failed to access roster cache {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse roster cache {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("roster cache {path} is missing required column {column:?}")]
    MissingColumn { path: PathBuf, column: &'static str },

    #[error("failed to replace roster cache {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: tempfile::PersistError,
    },
}

impl CacheError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Self::Csv {
            path: path.into(),
            source,
        }
    }
}

/// Failures reported by a [`RecordSource`](crate::source::RecordSource).
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("record source unreachable: {0}")]
    Unreachable(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{path} is missing required column {column:?}")]
    MissingColumn { path: PathBuf, column: &'static str },

    #[error("{0}")]
    Message(String),
}

impl SourceError {
    pub(crate) fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Self::Csv {
            path: path.into(),
            source,
        }
    }
}

#[derive(Debug, Error)]
pub enum RosterError {
    /// No provider could supply a roster. Nothing can be reported.
    #[error("roster unavailable for study {study_id}: {}", .reasons.join("; "))]
    Unavailable {
        study_id: String,
        reasons: Vec<String>,
    },

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error("failed to build roster worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

impl RosterError {
    pub fn unavailable(study_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Unavailable {
            study_id: study_id.into(),
            reasons: vec![reason.into()],
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }
}
