//! Interrupted live loads. Kept in its own test binary because the interrupt
//! token is process-wide.

use std::fs;

use chrono::NaiveDate;
use tempfile::TempDir;
use visit_cli::cli::{MissingArgs, RosterArgs};
use visit_cli::commands::{interrupt_token, run_missing};
use visit_cli::config::AppConfig;
use visit_model::RosterProvider;

#[test]
fn interrupted_fetch_still_reports() {
    let dir = TempDir::new().unwrap();
    let exports = dir.path().join("exports");
    fs::create_dir_all(&exports).unwrap();
    fs::write(
        exports.join("subjects.csv"),
        "subject_label,sub_group,gender_text\n0001,AIT,male\n0002,LIT,female\n",
    )
    .unwrap();
    let cache = dir.path().join("OPEX.csv");
    let args = MissingArgs {
        roster: RosterArgs {
            study: Some("OPEX".to_string()),
            exports: Some(exports),
            cache: Some(cache.clone()),
            as_of: NaiveDate::from_ymd_opt(2024, 6, 30),
            ..RosterArgs::default()
        },
        ..MissingArgs::default()
    };

    interrupt_token().cancel();
    let run = run_missing(&args, &AppConfig::default()).unwrap();

    assert_eq!(run.completeness.provider, RosterProvider::Live);
    assert_eq!(run.completeness.cancelled, 2);
    assert_eq!(run.completeness.reported, 0);
    assert!(!run.completeness.is_complete());
    assert!(!cache.exists());
}
