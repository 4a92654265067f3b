//! Export directory record source tests.

use std::fs;

use chrono::NaiveDate;
use tempfile::TempDir;
use visit_ingest::{
    CsvRosterCache, ExportDirectory, FallbackRoster, LiveRoster, RecordSource, RosterLoader,
    SourceError, SubjectInfo,
};
use visit_model::{InstrumentSchedule, MonthBasis, ObservedCount, RosterProvider};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn export_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    let write = |name: &str, contents: &str| fs::write(dir.path().join(name), contents).unwrap();
    write(
        "subjects.csv",
        "subject_label,sub_group,gender_text,project\n\
         0001,AIT,male,OPEX\n\
         0002,withdrawn,female,OPEX\n\
         0003,LIT,female,OTHER\n\
         0004,AIT,female,OPEX\n",
    );
    write(
        "opex_cantabDMS.csv",
        "subject_label,date\n\
         0001,2024-02-10\n\
         0001,2024-01-05 09:30:00\n\
         0002,2023-12-01\n\
         0003,2024-03-01\n",
    );
    write(
        "xnat_mrSessionData.csv",
        "subject_label,date\n0001,2024-01-20\n",
    );
    write("opex_unscheduled.csv", "subject_label,date\n0001,2023-06-01\n");
    write("notes.txt", "ignored");
    dir
}

#[test]
fn lists_subjects_of_the_requested_project() {
    let dir = export_dir();
    let source = ExportDirectory::open(dir.path()).unwrap();

    let subjects = source.subjects("OPEX").unwrap();

    let ids: Vec<&str> = subjects.iter().map(|s| s.subject_id.as_str()).collect();
    assert_eq!(ids, ["0001", "0002", "0004"]);
    assert_eq!(subjects[1], SubjectInfo::new("0002", "withdrawn", "female"));
}

#[test]
fn counts_rows_per_datatype_with_earliest_date() {
    let dir = export_dir();
    let source = ExportDirectory::open(dir.path()).unwrap();
    let subject = SubjectInfo::new("0001", "AIT", "male");

    let counts = source.experiment_counts("OPEX", &subject).unwrap();

    let dms = counts.by_source_type["opex:cantabDMS"];
    assert_eq!(dms.count, 2);
    assert_eq!(dms.earliest, Some(date(2024, 1, 5)));
    assert_eq!(counts.by_source_type["xnat:mrSessionData"].count, 1);
    assert_eq!(counts.first_visit(), Some(date(2023, 6, 1)));
}

#[test]
fn subjects_without_experiments_have_no_counts() {
    let dir = export_dir();
    let source = ExportDirectory::open(dir.path()).unwrap();
    let subject = SubjectInfo::new("0004", "AIT", "female");

    let counts = source.experiment_counts("OPEX", &subject).unwrap();

    assert!(counts.by_source_type.is_empty());
    assert_eq!(counts.first_visit(), None);
}

#[test]
fn live_roster_maps_datatypes_to_instruments() {
    let dir = export_dir();
    let source = ExportDirectory::open(dir.path()).unwrap();
    let live = LiveRoster::new(source, InstrumentSchedule::reference()).with_concurrency(2);

    let roster = live.fetch("OPEX").unwrap();

    assert_eq!(roster.basis, MonthBasis::FirstVisitDate);
    assert_eq!(roster.len(), 3);
    let first = roster
        .records
        .iter()
        .find(|record| record.subject_id == "0001")
        .unwrap();
    assert_eq!(first.observed("CANTAB DMS"), Some(&ObservedCount::Count(2)));
    assert_eq!(first.observed("MR Sessions"), Some(&ObservedCount::Count(1)));
    assert_eq!(first.counts.len(), 2);
    assert_eq!(first.first_visit_date, Some(date(2023, 6, 1)));
}

#[test]
fn mistyped_study_serves_the_existing_cache() {
    let dir = export_dir();
    let cache = dir.path().join("cache").join("OPEX.csv");
    let live = |dir: &TempDir| {
        LiveRoster::new(
            ExportDirectory::open(dir.path()).unwrap(),
            InstrumentSchedule::reference(),
        )
        .with_cache_path(&cache)
        .with_as_of(date(2024, 6, 30))
    };
    assert_eq!(live(&dir).fetch("OPEX").unwrap().len(), 3);

    assert!(live(&dir).fetch("OPEXX").unwrap_err().is_unavailable());

    let roster = CsvRosterCache::new(&cache).load("OPEX").unwrap();
    assert_eq!(roster.len(), 3);
    let loader = FallbackRoster::new(live(&dir), CsvRosterCache::new(&cache));
    let error = loader.load_roster("OPEXX").unwrap_err();
    assert!(error.to_string().contains("holds study OPEX"));
    assert_eq!(
        loader.load_roster("OPEX").unwrap().outcome.provider,
        RosterProvider::Live
    );
}

#[test]
fn missing_directory_is_unreachable() {
    let dir = TempDir::new().unwrap();

    let error = ExportDirectory::open(dir.path().join("absent")).unwrap_err();

    assert!(matches!(error, SourceError::Unreachable(_)));
}

#[test]
fn subject_listing_requires_subject_column() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("subjects.csv"), "label,group\n0001,AIT\n").unwrap();

    let error = ExportDirectory::open(dir.path()).unwrap_err();

    assert!(matches!(
        error,
        SourceError::MissingColumn {
            column: "subject_label",
            ..
        }
    ));
}
