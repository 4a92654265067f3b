//! Tests for visit completeness reconciliation.

use chrono::{Duration, NaiveDate};
use visit_core::{ReconcileError, ReconcileOptions, reconcile, reconcile_records};
use visit_model::{
    InstrumentSchedule, MonthBasis, ObservedCount, ParticipantRecord, Roster, ScheduleError,
};

fn as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
}

fn days_ago(days: i64) -> Option<NaiveDate> {
    Some(as_of() - Duration::days(days))
}

fn options() -> ReconcileOptions {
    ReconcileOptions::new(as_of())
}

fn run(records: Vec<ParticipantRecord>) -> visit_model::Reconciliation {
    reconcile(
        &Roster::new("P1", records),
        &InstrumentSchedule::reference(),
        &options(),
    )
    .expect("reconcile")
}

#[test]
fn counts_missing_cantab_sessions() {
    let record = ParticipantRecord::new("S1", "active", "M")
        .with_first_visit(days_ago(95))
        .with_count("CANTAB DMS", 2);
    let result = run(vec![record]);

    let row = result.row("S1").expect("S1 reported");
    assert_eq!(row.elapsed_months, 3);
    assert_eq!(row.missing_for("CANTAB DMS"), Some(1));
    // Absent instruments are observed zero times.
    assert_eq!(row.missing_for("CANTAB ERT"), Some(3));
    assert_eq!(row.missing_for("Health"), Some(1));
}

#[test]
fn withdrawn_participants_are_excluded() {
    let withdrawn = ParticipantRecord::new("S2", "withdrawn", "F")
        .with_first_visit(days_ago(400))
        .with_count("CANTAB DMS", 1);
    let active = ParticipantRecord::new("S5", "AIT", "F").with_first_visit(days_ago(40));
    let result = run(vec![withdrawn, active]);

    assert!(result.row("S2").is_none());
    assert!(result.rows.iter().all(|row| row.subject_id != "S2"));
    assert_eq!(result.rows.len(), 1);
    assert_eq!(result.issues.withdrawn_excluded, 1);
}

#[test]
fn unknown_first_visit_expects_nothing() {
    let record = ParticipantRecord::new("S3", "AIT", "M").with_count("CANTAB DMS", 0);
    let result = run(vec![record]);

    let row = result.row("S3").expect("S3 reported");
    assert_eq!(row.elapsed_months, 0);
    assert_eq!(row.missing.len(), InstrumentSchedule::reference().len());
    assert!(row.missing.iter().all(|cell| cell.missing == Some(0)));
}

#[test]
fn exactly_on_cadence_is_complete() {
    let record = ParticipantRecord::new("S4", "AIT", "M")
        .with_first_visit(days_ago(180))
        .with_count("MR Sessions", 1);
    let result = run(vec![record]);

    let row = result.row("S4").expect("S4 reported");
    assert_eq!(row.elapsed_months, 6);
    assert_eq!(row.missing_for("MR Sessions"), Some(0));
}

#[test]
fn empty_roster_reconciles_to_nothing() {
    let result = run(Vec::new());
    assert!(result.is_empty());
    assert_eq!(result.instruments.len(), InstrumentSchedule::reference().len());
}

#[test]
fn over_collection_stays_negative() {
    let record = ParticipantRecord::new("S6", "AIT", "F")
        .with_first_visit(days_ago(35))
        .with_count("DEXA", 3);
    let result = run(vec![record]);

    let row = result.row("S6").expect("S6 reported");
    assert_eq!(row.elapsed_months, 1);
    assert_eq!(row.missing_for("DEXA"), Some(-2));
    assert!(!row.is_up_to_date());
}

#[test]
fn malformed_cell_only_blanks_that_instrument() {
    let record = ParticipantRecord::new("S7", "AIT", "F")
        .with_first_visit(days_ago(65))
        .with_observed("COBAS", ObservedCount::Malformed("n/a".to_string()))
        .with_count("ELISAS", 1);
    let result = run(vec![record]);

    let row = result.row("S7").expect("S7 reported");
    let cobas = row.cell("COBAS").expect("COBAS column");
    assert_eq!(cobas.missing, None);
    assert_eq!(row.missing_for("ELISAS"), Some(1));
    assert_eq!(result.issues.malformed_cells.len(), 1);
    assert_eq!(result.issues.malformed_cells[0].subject_id, "S7");
    assert_eq!(result.issues.malformed_cells[0].instrument, "COBAS");
    assert_eq!(result.issues.malformed_cells[0].raw, "n/a");
}

#[test]
fn rows_sorted_by_progress_then_subject() {
    let result = run(vec![
        ParticipantRecord::new("B", "AIT", "M").with_first_visit(days_ago(100)),
        ParticipantRecord::new("C", "AIT", "M").with_first_visit(days_ago(10)),
        ParticipantRecord::new("A", "AIT", "M").with_first_visit(days_ago(95)),
        ParticipantRecord::new("D", "AIT", "M").with_first_visit(days_ago(300)),
    ]);
    let order: Vec<&str> = result
        .rows
        .iter()
        .map(|row| row.subject_id.as_str())
        .collect();
    assert_eq!(order, vec!["D", "A", "B", "C"]);
}

#[test]
fn missing_cells_follow_schedule_order() {
    let result = run(vec![ParticipantRecord::new("S1", "AIT", "M")]);
    let columns: Vec<&str> = result.rows[0]
        .missing
        .iter()
        .map(|cell| cell.instrument.as_str())
        .collect();
    let schedule = InstrumentSchedule::reference();
    let expected: Vec<&str> = schedule.names().collect();
    assert_eq!(columns, expected);
}

#[test]
fn unknown_instruments_are_skipped_by_default() {
    let record = ParticipantRecord::new("S1", "AIT", "M")
        .with_first_visit(days_ago(31))
        .with_count("Retired Test", 2);
    let result = run(vec![record]);

    assert_eq!(result.rows.len(), 1);
    assert!(result.rows[0].cell("Retired Test").is_none());
    assert!(result.issues.unknown_instruments.contains("Retired Test"));
}

#[test]
fn strict_mode_fails_on_unknown_instruments() {
    let record = ParticipantRecord::new("S1", "AIT", "M").with_count("Retired Test", 2);
    let error = reconcile_records(
        &[record],
        MonthBasis::FirstVisitDate,
        &InstrumentSchedule::reference(),
        &options().strict(),
    )
    .expect_err("strict reconcile rejects unknown instrument");
    assert!(matches!(
        error,
        ReconcileError::Schedule(ScheduleError::UnknownInstrument { ref name }) if name == "Retired Test"
    ));
}

#[test]
fn max_count_basis_uses_largest_count() {
    let record = ParticipantRecord::new("S1", "AIT", "M")
        .with_count("CANTAB DMS", 4)
        .with_count("DEXA", 1);
    let result = reconcile_records(
        &[record],
        MonthBasis::MaxObservedCount,
        &InstrumentSchedule::reference(),
        &options(),
    )
    .expect("reconcile");

    let row = &result.rows[0];
    assert_eq!(result.basis, MonthBasis::MaxObservedCount);
    assert_eq!(row.elapsed_months, 4);
    assert_eq!(row.missing_for("CANTAB DMS"), Some(0));
    assert_eq!(row.missing_for("DEXA"), Some(1));
}

#[test]
fn acer_cadence_override_changes_expectation() {
    let record = ParticipantRecord::new("S1", "AIT", "M").with_first_visit(days_ago(120));
    let six = run(vec![record.clone()]);
    let three = reconcile(
        &Roster::new("P1", vec![record]),
        &InstrumentSchedule::reference()
            .with_cadence("ACER", 3)
            .unwrap(),
        &options(),
    )
    .unwrap();

    assert_eq!(six.rows[0].missing_for("ACER"), Some(1));
    assert_eq!(three.rows[0].missing_for("ACER"), Some(2));
}
