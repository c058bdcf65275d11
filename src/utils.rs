use super::error::{Error, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";

/// Checks that `date` is a real calendar date written as `YYYY-MM-DD`.
pub fn validate_date(date: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(date, DATE_FORMAT).map_err(|_| Error::InvalidDate(date.to_string()))
}

/// [`validate_date`] for optional arguments.
pub(crate) fn validate_dates<'a, I>(dates: I) -> Result<()>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    dates
        .into_iter()
        .flatten()
        .try_for_each(|d| validate_date(d).map(|_| ()))
}

pub(crate) fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FORMAT).ok()
}

/// Parses the timestamps found in DONKI payloads: `2021-06-01T12:34Z`, with optional seconds
/// and milliseconds.
pub(crate) fn parse_donki_time(s: &str) -> Option<DateTime<Utc>> {
    const FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%MZ", "%Y-%m-%dT%H:%M:%SZ", "%Y-%m-%dT%H:%M:%S%.fZ"];

    FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Parses a naive timestamp with an explicit format, interpreting it as UTC.
pub(crate) fn parse_utc(s: &str, format: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(s, format)
        .ok()
        .map(|naive| Utc.from_utc_datetime(&naive))
}

pub(crate) fn from_epoch_millis(ms: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(ms).single()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn dates_must_be_iso() {
        assert_eq!(
            validate_date("2021-06-01").unwrap(),
            NaiveDate::from_ymd_opt(2021, 6, 1).unwrap()
        );
        assert!(matches!(validate_date("06/01/2021"), Err(Error::InvalidDate(_))));
        assert!(matches!(validate_date("2021-13-01"), Err(Error::InvalidDate(_))));
        assert!(matches!(validate_date(""), Err(Error::InvalidDate(_))));
    }

    #[test]
    fn optional_dates_skip_none() {
        assert!(validate_dates([None, Some("2020-01-01")]).is_ok());
        assert!(validate_dates([Some("2020-01-01"), Some("nope")]).is_err());
    }

    #[test]
    fn donki_times() {
        let t = parse_donki_time("2021-06-01T12:34Z").unwrap();
        assert_eq!((t.hour(), t.minute()), (12, 34));

        let t = parse_donki_time("2016-09-06T14:18:00.000Z").unwrap();
        assert_eq!((t.day(), t.hour(), t.minute()), (6, 14, 18));

        assert!(parse_donki_time("yesterday").is_none());
    }

    #[test]
    fn epoch_millis() {
        let t = from_epoch_millis(1622505600000).unwrap();
        assert_eq!(t.date_naive(), NaiveDate::from_ymd_opt(2021, 6, 1).unwrap());
    }
}
