//! Flexible date parsing for heterogeneous API data.
//!
//! Records arrive with dates in whatever shape the upstream source used:
//! `dd/mm/yyyy` (and `.`/`-` separated variants), ISO `YYYY-MM-DD`, or raw
//! spreadsheet serial numbers. Parsing is total: anything unrecognized or
//! calendar-invalid yields `None`, and callers treat `None` as "unknown
//! date" (excluded from range filtering, rendered as a placeholder).

use chrono::NaiveDate;

use datalib_model::FieldValue;

/// Day/month/year first; two-digit years are 2000-based.
const TWO_DIGIT_YEAR_BASE: i32 = 2000;

/// Spreadsheet serial day for the Unix epoch (1970-01-01), with serial day
/// zero at 1899-12-30.
const UNIX_EPOCH_SERIAL_DAY: f64 = 25569.0;

/// Serial for 9999-12-31; anything past it is treated as garbage rather
/// than a date.
const MAX_SERIAL_DAY: f64 = 2_958_465.0;

/// Parses a spreadsheet serial day number.
pub fn parse_serial(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 || serial > MAX_SERIAL_DAY {
        return None;
    }
    let seconds = ((serial - UNIX_EPOCH_SERIAL_DAY) * 86_400.0) as i64;
    chrono::DateTime::from_timestamp(seconds, 0).map(|dt| dt.date_naive())
}

/// Parses a date from a string in any supported shape.
pub fn parse_flexible(input: &str) -> Option<NaiveDate> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    // A 5-digit number is a serial day, not a year.
    if trimmed.len() == 5 && trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return parse_serial(f64::from(trimmed.parse::<u32>().ok()?));
    }
    if let Some(date) = parse_day_month_year(trimmed) {
        return Some(date);
    }
    parse_iso_prefix(trimmed)
}

/// Parses a date out of a record field.
///
/// Numbers are serial days; text goes through [`parse_flexible`]; other
/// shapes have no date reading.
pub fn parse_value(value: &FieldValue) -> Option<NaiveDate> {
    match value {
        FieldValue::Number(n) => parse_serial(*n),
        FieldValue::Text(s) => parse_flexible(s),
        _ => None,
    }
}

/// `D{1,2}[./-]M{1,2}[./-]Y{2,4}`, validated against the real calendar:
/// `from_ymd_opt` refuses rollover dates like 31/02.
fn parse_day_month_year(input: &str) -> Option<NaiveDate> {
    let separator = ['/', '.', '-']
        .into_iter()
        .find(|sep| input.contains(*sep))?;
    let mut parts = input.split(separator);
    let day = parts.next()?;
    let month = parts.next()?;
    let year = parts.next()?;
    if parts.next().is_some() {
        return None;
    }
    if day.len() > 2 || month.len() > 2 || !(2..=4).contains(&year.len()) || year.len() == 3 {
        return None;
    }
    if [day, month, year]
        .iter()
        .any(|part| part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()))
    {
        return None;
    }
    let day: u32 = day.parse().ok()?;
    let month: u32 = month.parse().ok()?;
    let mut year: i32 = year.parse().ok()?;
    if year < 100 {
        year += TWO_DIGIT_YEAR_BASE;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

/// `YYYY-MM-DD` with anything after the date ignored (timestamps etc).
fn parse_iso_prefix(input: &str) -> Option<NaiveDate> {
    if input.len() < 10 {
        return None;
    }
    let prefix = input.get(..10)?;
    let bytes = prefix.as_bytes();
    if bytes[4] != b'-' || bytes[7] != b'-' {
        return None;
    }
    NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_month_year_variants_parse() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 7).expect("date");
        assert_eq!(parse_flexible("7/3/2024"), Some(expected));
        assert_eq!(parse_flexible("07.03.2024"), Some(expected));
        assert_eq!(parse_flexible("07-03-24"), Some(expected));
    }

    #[test]
    fn rollover_dates_are_rejected() {
        assert_eq!(parse_flexible("31/02/2024"), None);
        assert_eq!(parse_flexible("32/01/2024"), None);
        assert_eq!(parse_flexible("01/13/2024"), None);
    }

    #[test]
    fn iso_prefix_parses_with_or_without_time() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 7).expect("date");
        assert_eq!(parse_flexible("2024-03-07"), Some(expected));
        assert_eq!(parse_flexible("2024-03-07T10:30:00Z"), Some(expected));
    }

    #[test]
    fn serial_numbers_map_from_the_1899_epoch() {
        // 25569 is 1970-01-01 by construction.
        assert_eq!(
            parse_serial(25569.0),
            NaiveDate::from_ymd_opt(1970, 1, 1)
        );
        // 45292 is 2024-01-01.
        assert_eq!(
            parse_flexible("45292"),
            NaiveDate::from_ymd_opt(2024, 1, 1)
        );
    }

    #[test]
    fn out_of_range_serials_yield_none() {
        assert_eq!(parse_serial(0.0), None);
        assert_eq!(parse_serial(-5.0), None);
        assert_eq!(parse_serial(f64::NAN), None);
        assert_eq!(parse_serial(3_000_000.0), None);
    }

    #[test]
    fn garbage_yields_none() {
        for input in ["", "  ", "not a date", "12/34", "1/2/3/4", "202-01-01"] {
            assert_eq!(parse_flexible(input), None, "input: {input:?}");
        }
    }

    #[test]
    fn field_values_parse_by_shape() {
        assert_eq!(
            parse_value(&FieldValue::Number(45292.0)),
            NaiveDate::from_ymd_opt(2024, 1, 1)
        );
        assert_eq!(
            parse_value(&FieldValue::Text("01/01/2024".to_string())),
            NaiveDate::from_ymd_opt(2024, 1, 1)
        );
        assert_eq!(parse_value(&FieldValue::Bool(true)), None);
        assert_eq!(parse_value(&FieldValue::Null), None);
    }
}
