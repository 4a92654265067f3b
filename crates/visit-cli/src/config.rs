//! TOML configuration file.
//!
//! ```toml
//! [roster]
//! study = "OPEX"
//! cache = "/data/opex/OPEX.csv"
//! exports = "/data/opex/exports"
//! concurrency = 8
//!
//! [schedule.cadence]
//! ACER = 12
//!
//! [report]
//! clamp = true
//! omit = ["CANTAB ERT", "CANTAB MOT"]
//! ```
//!
//! Command-line flags take precedence over file values.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use visit_ingest::DEFAULT_CONCURRENCY;
use visit_model::{InstrumentSchedule, ScheduleError};

const APP_QUALIFIER: &str = "org";
const APP_ORG: &str = "qbi";
const APP_NAME: &str = "visit-tracker";
const CONFIG_FILENAME: &str = "config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid schedule in config: {0}")]
    Schedule(#[from] ScheduleError),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub roster: RosterConfig,
    pub schedule: ScheduleConfig,
    pub report: ReportConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RosterConfig {
    pub study: Option<String>,
    pub cache: Option<PathBuf>,
    pub exports: Option<PathBuf>,
    pub concurrency: usize,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            study: None,
            cache: None,
            exports: None,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScheduleConfig {
    /// Cadence overrides in months, keyed by instrument name.
    pub cadence: BTreeMap<String, u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportConfig {
    pub clamp: bool,
    pub omit: Vec<String>,
}

impl AppConfig {
    /// Load the config at `path`, or the default location when `None`.
    ///
    /// An explicit path must exist. A missing default file means defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load_from(path),
            None => match default_config_path() {
                Some(path) if path.is_file() => Self::load_from(&path),
                Some(path) => {
                    debug!(path = %path.display(), "no config file, using defaults");
                    Ok(Self::default())
                }
                None => Ok(Self::default()),
            },
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Reference schedule with the configured cadence overrides applied.
    pub fn schedule(&self) -> Result<InstrumentSchedule, ConfigError> {
        let mut schedule = InstrumentSchedule::reference();
        for (name, months) in &self.schedule.cadence {
            schedule = schedule.with_cadence(name, *months)?;
            debug!(instrument = %name, months, "cadence override");
        }
        Ok(schedule)
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_NAME)
}

pub fn default_config_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILENAME))
}

/// Cache location used when neither flags nor config name one: one file per
/// study, so snapshots of different studies never replace each other.
pub fn default_cache_path(study_id: &str) -> PathBuf {
    let file_name = format!("{}.csv", cache_file_stem(study_id));
    project_dirs()
        .map(|dirs| dirs.cache_dir().join(&file_name))
        .unwrap_or_else(|| PathBuf::from(file_name))
}

fn cache_file_stem(study_id: &str) -> String {
    study_id
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
