//! String-to-value coercions. Every function here degrades to `None` on
//! unparsable input; a bad cell never fails a record.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Parse a numeric cell, tolerating thousands separators, currency symbols,
/// percent signs and surrounding whitespace. `" 1,234.5% "` → `1234.5`.
pub fn parse_number(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, ',' | '$' | '%'))
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok()
}

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Parse a timestamp cell. Tries RFC 3339 and common datetime/date layouts
/// first; failing those, splits on `/` or `-` and tries month-day-year, then
/// day-month-year.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date_to_utc(date);
    }

    let parts: Vec<&str> = s.split(['/', '-']).collect();
    if parts.len() != 3 {
        return None;
    }
    let nums: Option<Vec<i64>> = parts.iter().map(|p| p.trim().parse::<i64>().ok()).collect();
    let nums = nums?;

    // Month-day-year first, then day-month-year.
    from_parts(nums[0], nums[1], nums[2]).or_else(|| from_parts(nums[1], nums[0], nums[2]))
}

fn from_parts(month: i64, day: i64, year: i64) -> Option<DateTime<Utc>> {
    let year = match year {
        0..=99 => 2000 + year,
        _ => year,
    };
    let date = NaiveDate::from_ymd_opt(
        i32::try_from(year).ok()?,
        u32::try_from(month).ok()?,
        u32::try_from(day).ok()?,
    )?;
    date_to_utc(date)
}

fn date_to_utc(date: NaiveDate) -> Option<DateTime<Utc>> {
    Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn number_tolerates_separators_and_symbols() {
        assert_eq!(parse_number(" 1,234.5% "), Some(1234.5));
        assert_eq!(parse_number("$40"), Some(40.0));
        assert_eq!(parse_number("7"), Some(7.0));
    }

    #[test]
    fn number_degrades_to_none() {
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("   "), None);
        assert_eq!(parse_number("call us"), None);
    }

    #[test]
    fn timestamp_iso_date() {
        let dt = parse_timestamp("2024-03-05").unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2024, 3, 5));
    }

    #[test]
    fn timestamp_rfc3339() {
        let dt = parse_timestamp("2024-03-05T10:30:00Z").unwrap();
        assert_eq!(dt.hour(), 10);
    }

    #[test]
    fn timestamp_month_day_year_preferred() {
        let dt = parse_timestamp("3/5/2024").unwrap();
        assert_eq!((dt.month(), dt.day()), (3, 5));
    }

    #[test]
    fn timestamp_falls_back_to_day_month_year() {
        // 25 is not a valid month, so day-month-year order applies.
        let dt = parse_timestamp("25/12/2024").unwrap();
        assert_eq!((dt.month(), dt.day()), (12, 25));
    }

    #[test]
    fn timestamp_two_digit_year() {
        let dt = parse_timestamp("3/5/24").unwrap();
        assert_eq!(dt.year(), 2024);
    }

    #[test]
    fn timestamp_degrades_to_none() {
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("whenever"), None);
        assert_eq!(parse_timestamp("13/13/2024"), None);
    }
}
