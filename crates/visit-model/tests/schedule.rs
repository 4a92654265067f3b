//! Tests for the instrument schedule.

use visit_model::{Instrument, InstrumentSchedule, ScheduleError};

#[test]
fn reference_schedule_preserves_order() {
    let schedule = InstrumentSchedule::reference();
    let names: Vec<&str> = schedule.names().collect();
    assert_eq!(names.len(), 21);
    assert_eq!(names[0], "Health");
    assert_eq!(names[1], "ACER");
    assert_eq!(names[2], "CANTAB DMS");
    assert_eq!(names[names.len() - 1], "COSMED");
}

#[test]
fn lookups_return_cadence_and_source() {
    let schedule = InstrumentSchedule::reference();
    assert_eq!(schedule.cadence_months("CANTAB DMS"), Ok(1));
    assert_eq!(schedule.cadence_months("MR Sessions"), Ok(6));
    assert_eq!(schedule.cadence_months("DEXA"), Ok(3));
    assert_eq!(schedule.source_type("VWM"), Ok("opex:amunet"));
    assert_eq!(
        schedule
            .by_source_type("xnat:mrSessionData")
            .map(|instrument| instrument.name.as_str()),
        Some("MR Sessions")
    );
}

#[test]
fn unknown_instrument_is_an_error() {
    let schedule = InstrumentSchedule::reference();
    assert_eq!(
        schedule.cadence_months("Bogus"),
        Err(ScheduleError::UnknownInstrument {
            name: "Bogus".to_string()
        })
    );
    assert!(schedule.source_type("Bogus").is_err());
    assert!(!schedule.contains("Bogus"));
}

#[test]
fn cadence_override_replaces_single_entry() {
    let schedule = InstrumentSchedule::reference()
        .with_cadence("ACER", 3)
        .expect("ACER is scheduled");
    assert_eq!(schedule.cadence_months("ACER"), Ok(3));
    assert_eq!(schedule.cadence_months("Health"), Ok(3));
    let names: Vec<&str> = schedule.names().collect();
    assert_eq!(names[1], "ACER");
}

#[test]
fn cadence_override_rejects_unknown_and_zero() {
    assert!(matches!(
        InstrumentSchedule::reference().with_cadence("Nope", 3),
        Err(ScheduleError::UnknownInstrument { .. })
    ));
    assert!(matches!(
        InstrumentSchedule::reference().with_cadence("ACER", 0),
        Err(ScheduleError::InvalidCadence { months: 0, .. })
    ));
}

#[test]
fn new_rejects_invalid_entries() {
    let duplicate = InstrumentSchedule::new(vec![
        Instrument::new("DEXA", 3, "opex:dexa"),
        Instrument::new("DEXA", 6, "opex:dexa2"),
    ]);
    assert!(matches!(
        duplicate,
        Err(ScheduleError::DuplicateInstrument { .. })
    ));

    let zero = InstrumentSchedule::new(vec![Instrument::new("DEXA", 0, "opex:dexa")]);
    assert!(matches!(zero, Err(ScheduleError::InvalidCadence { .. })));

    let no_source = InstrumentSchedule::new(vec![Instrument::new("DEXA", 3, " ")]);
    assert!(matches!(
        no_source,
        Err(ScheduleError::MissingSourceType { .. })
    ));

    let shared_source = InstrumentSchedule::new(vec![
        Instrument::new("DEXA", 3, "opex:dexa"),
        Instrument::new("DEXA 2", 3, "opex:dexa"),
    ]);
    assert!(matches!(
        shared_source,
        Err(ScheduleError::DuplicateSourceType { .. })
    ));

    let empty_name = InstrumentSchedule::new(vec![Instrument::new("", 3, "opex:dexa")]);
    assert_eq!(empty_name, Err(ScheduleError::EmptyName));
}
