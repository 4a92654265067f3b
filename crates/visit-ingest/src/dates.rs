use chrono::{NaiveDate, NaiveDateTime};

/// Parse a visit date as written by database exports or spreadsheets.
///
/// Returns `Ok(None)` for an empty cell and `Err(())` when the value is not a
/// recognisable date.
pub(crate) fn parse_visit_date(raw: &str) -> Result<Option<NaiveDate>, ()> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(Some(date));
    }
    if let Ok(datetime) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S") {
        return Ok(Some(datetime.date()));
    }
    if let Ok(datetime) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S") {
        return Ok(Some(datetime.date()));
    }
    Err(())
}

pub(crate) fn normalize_header(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('\u{feff}');
    trimmed.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub(crate) fn find_column(headers: &[String], aliases: &[&str]) -> Option<usize> {
    headers.iter().position(|header| {
        aliases
            .iter()
            .any(|alias| header.eq_ignore_ascii_case(alias))
    })
}
