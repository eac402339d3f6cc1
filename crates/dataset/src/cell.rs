//! Cell-level normalization shared by the CSV and spreadsheet readers.
//!
//! Both readers produce [`RawCell`]s; the typed conversion to dates and
//! numbers happens here so that a date means the same thing regardless of
//! which file format it arrived in.

use calamine::Data;
use chrono::{Duration, NaiveDate, NaiveDateTime};

/// A source cell before it is interpreted against the schema.
#[derive(Debug, Clone, PartialEq)]
pub enum RawCell {
    Empty,
    Text(String),
    Number(f64),
    /// A spreadsheet cell formatted as a date, as a serial day count.
    DateSerial(f64),
}

impl RawCell {
    /// Builds a cell from CSV text. Blank text is treated as missing.
    pub fn from_text(text: &str) -> Self {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            RawCell::Empty
        } else {
            RawCell::Text(trimmed.to_string())
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, RawCell::Empty)
    }

    /// Renders the cell for error messages.
    pub fn display(&self) -> String {
        match self {
            RawCell::Empty => String::new(),
            RawCell::Text(s) => s.clone(),
            RawCell::Number(n) | RawCell::DateSerial(n) => n.to_string(),
        }
    }

    /// Interprets the cell as a calendar date.
    pub fn to_date(&self) -> Result<NaiveDate, String> {
        match self {
            RawCell::Empty => Err("empty date".to_string()),
            RawCell::Text(s) => parse_date(s),
            RawCell::Number(n) | RawCell::DateSerial(n) => excel_serial_to_date(*n),
        }
    }

    /// Interprets the cell as a number; `Ok(None)` when the cell is blank.
    pub fn to_number(&self) -> Result<Option<f64>, String> {
        match self {
            RawCell::Empty => Ok(None),
            RawCell::Number(n) => Ok(Some(*n)),
            RawCell::DateSerial(_) => Err("expected a number, found a date".to_string()),
            RawCell::Text(s) => parse_number(s).map(Some),
        }
    }

    /// Interprets the cell as a label; `None` when blank.
    pub fn to_label(&self) -> Option<String> {
        match self {
            RawCell::Empty => None,
            RawCell::Text(s) => Some(s.clone()),
            RawCell::Number(n) if n.fract() == 0.0 => Some(format!("{}", *n as i64)),
            RawCell::Number(n) | RawCell::DateSerial(n) => Some(n.to_string()),
        }
    }
}

impl From<&Data> for RawCell {
    fn from(value: &Data) -> Self {
        match value {
            Data::Empty => RawCell::Empty,
            Data::String(s) => RawCell::from_text(s),
            Data::Float(f) => RawCell::Number(*f),
            Data::Int(i) => RawCell::Number(*i as f64),
            Data::Bool(b) => RawCell::Text(b.to_string()),
            Data::DateTime(dt) => RawCell::DateSerial(dt.as_f64()),
            Data::DateTimeIso(s) | Data::DurationIso(s) => RawCell::from_text(s),
            Data::Error(e) => RawCell::Text(format!("{e:?}")),
        }
    }
}

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d", "%d-%m-%Y"];
const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

/// Parses the textual date layouts seen in the source files.
///
/// Time-of-day components are discarded: the dashboard works at day
/// granularity and every join is on the calendar date.
pub fn parse_date(text: &str) -> Result<NaiveDate, String> {
    let text = text.trim();
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return Ok(date);
        }
    }
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(dt.date());
        }
    }
    Err("unrecognized date format".to_string())
}

/// Converts a spreadsheet serial day number (1900 date system) to a date.
pub fn excel_serial_to_date(serial: f64) -> Result<NaiveDate, String> {
    if !serial.is_finite() || serial < 1.0 {
        return Err(format!("{serial} is not a valid spreadsheet date"));
    }
    // Day 0 is 1899-12-30 once the 1900 leap-year bug is accounted for.
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30).ok_or("invalid epoch")?;
    epoch
        .checked_add_signed(Duration::days(serial.floor() as i64))
        .ok_or_else(|| format!("{serial} is out of the supported date range"))
}

/// Parses a number written with either a `.` or a `,` decimal separator.
///
/// When both separators appear, the last one is the decimal separator and the
/// other groups thousands, so `1.234,56` and `1,234.56` both read as 1234.56.
/// A lone separator is the decimal separator. Repeated decimal separators or
/// thousands groups that are not three digits wide are rejected.
pub fn parse_number(text: &str) -> Result<f64, String> {
    let text = text.trim();
    let (decimal, grouping) = match (text.rfind('.'), text.rfind(',')) {
        (Some(dot), Some(comma)) if comma > dot => (',', Some('.')),
        (Some(_), Some(_)) => ('.', Some(',')),
        (None, Some(_)) => (',', None),
        _ => ('.', None),
    };
    if text.matches(decimal).count() > 1 {
        return Err(format!("ambiguous number: repeated '{decimal}' separator"));
    }

    let (integer, fraction) = match text.split_once(decimal) {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (text, None),
    };
    let mut normalized = match grouping {
        Some(sep) => ungroup(integer, sep)?,
        None => integer.to_string(),
    };
    if let Some(fraction) = fraction {
        normalized.push('.');
        normalized.push_str(fraction);
    }

    let value: f64 = normalized
        .parse()
        .map_err(|_| "not a number".to_string())?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err("not a finite number".to_string())
    }
}

/// Strips thousands separators, requiring three-digit groups after the first.
fn ungroup(integer: &str, sep: char) -> Result<String, String> {
    let mut groups = integer.split(sep);
    let mut out = groups.next().unwrap_or_default().to_string();
    if !out.chars().any(|c| c.is_ascii_digit()) {
        return Err(format!("ambiguous number: misplaced '{sep}' separator"));
    }
    for group in groups {
        if group.len() != 3 || !group.chars().all(|c| c.is_ascii_digit()) {
            return Err(format!("ambiguous number: misplaced '{sep}' separator"));
        }
        out.push_str(group);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn textual_dates_normalize_to_the_same_day() {
        assert_eq!(parse_date("2024-03-05").unwrap(), date("2024-03-05"));
        assert_eq!(parse_date("05/03/2024").unwrap(), date("2024-03-05"));
        assert_eq!(parse_date("2024-03-05T14:30:00").unwrap(), date("2024-03-05"));
        assert_eq!(parse_date("2024-03-05 00:00:00").unwrap(), date("2024-03-05"));
        assert!(parse_date("March 5th").is_err());
    }

    #[test]
    fn spreadsheet_serials_match_textual_dates() {
        // 45356 is 2024-03-05 in the 1900 date system.
        assert_eq!(excel_serial_to_date(45356.0).unwrap(), date("2024-03-05"));
        assert_eq!(excel_serial_to_date(45356.75).unwrap(), date("2024-03-05"));
        assert!(excel_serial_to_date(-3.0).is_err());
        assert!(excel_serial_to_date(f64::NAN).is_err());
    }

    #[test]
    fn numbers_accept_decimal_commas() {
        assert_eq!(parse_number("5,25").unwrap(), 5.25);
        assert_eq!(parse_number("1,234.5").unwrap(), 1234.5);
        assert_eq!(parse_number("-12,5").unwrap(), -12.5);
        assert_eq!(parse_number(" 42 ").unwrap(), 42.0);
        assert!(parse_number("n/a").is_err());
        assert!(parse_number("inf").is_err());
    }

    #[test]
    fn thousands_separators_follow_the_decimal_separator() {
        assert_eq!(parse_number("1.234,56").unwrap(), 1234.56);
        assert_eq!(parse_number("1,234.56").unwrap(), 1234.56);
        assert_eq!(parse_number("12.345.678,9").unwrap(), 12345678.9);
        assert_eq!(parse_number("1,234,567.25").unwrap(), 1234567.25);
    }

    #[test]
    fn ambiguous_separators_are_rejected() {
        assert!(parse_number("1.234.567").is_err());
        assert!(parse_number("1,234,567").is_err());
        assert!(parse_number("1.23,4").is_err());
        assert!(parse_number(".234,5").is_err());
        assert!(parse_number("1,2.3,4").is_err());
    }

    #[test]
    fn calamine_cells_convert() {
        assert_eq!(RawCell::from(&Data::Int(3)), RawCell::Number(3.0));
        assert_eq!(RawCell::from(&Data::String("  ".into())), RawCell::Empty);
        assert_eq!(
            RawCell::from(&Data::DateTimeIso("2024-03-05T00:00:00".into()))
                .to_date()
                .unwrap(),
            date("2024-03-05")
        );
        assert_eq!(RawCell::Number(45356.0).to_date().unwrap(), date("2024-03-05"));
    }

    #[test]
    fn labels_drop_integral_fraction() {
        assert_eq!(RawCell::Number(1042.0).to_label().as_deref(), Some("1042"));
        assert_eq!(RawCell::Empty.to_label(), None);
        assert_eq!(RawCell::DateSerial(1.0).to_number(), Err("expected a number, found a date".to_string()));
    }
}
