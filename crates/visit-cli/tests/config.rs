//! Config file parsing tests.

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;
use visit_cli::config::{AppConfig, ConfigError};
use visit_model::ScheduleError;

#[test]
fn parses_every_section() {
    let config: AppConfig = toml::from_str(
        r#"
        [roster]
        study = "OPEX"
        cache = "/data/roster.csv"
        concurrency = 8

        [schedule.cadence]
        ACER = 12

        [report]
        clamp = true
        omit = ["CANTAB ERT"]
        "#,
    )
    .unwrap();

    assert_eq!(config.roster.study.as_deref(), Some("OPEX"));
    assert_eq!(config.roster.cache, Some(PathBuf::from("/data/roster.csv")));
    assert_eq!(config.roster.exports, None);
    assert_eq!(config.roster.concurrency, 8);
    assert!(config.report.clamp);
    assert_eq!(config.report.omit, ["CANTAB ERT"]);
    assert_eq!(config.schedule().unwrap().cadence_months("ACER"), Ok(12));
}

#[test]
fn empty_file_means_defaults() {
    let config: AppConfig = toml::from_str("").unwrap();

    assert_eq!(config, AppConfig::default());
    assert_eq!(config.roster.concurrency, 4);
    assert_eq!(config.schedule().unwrap().cadence_months("ACER"), Ok(6));
}

#[test]
fn unknown_cadence_override_is_rejected() {
    let config: AppConfig = toml::from_str("[schedule.cadence]\nMMSE = 3\n").unwrap();

    let error = config.schedule().unwrap_err();

    assert!(matches!(
        error,
        ConfigError::Schedule(ScheduleError::UnknownInstrument { .. })
    ));
}

#[test]
fn unknown_keys_are_rejected() {
    assert!(toml::from_str::<AppConfig>("[roster]\nstudies = \"x\"\n").is_err());
}

#[test]
fn explicit_path_must_exist() {
    let dir = TempDir::new().unwrap();

    let error = AppConfig::load(Some(&dir.path().join("absent.toml"))).unwrap_err();

    assert!(matches!(error, ConfigError::Read { .. }));
}

#[test]
fn loads_from_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "[roster]\nstudy = \"P1\"\n").unwrap();

    let config = AppConfig::load(Some(&path)).unwrap();

    assert_eq!(config.roster.study.as_deref(), Some("P1"));
}

#[test]
fn malformed_file_is_a_parse_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "[roster\n").unwrap();

    let error = AppConfig::load_from(&path).unwrap_err();

    assert!(matches!(error, ConfigError::Parse { .. }));
}
