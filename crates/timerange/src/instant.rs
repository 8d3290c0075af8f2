//! Single points in time.

use chrono::{DateTime, Utc};
use log::debug;

use crate::clock::{Anchor, Clock, SystemClock};
use crate::error::{Result, TimeRangeError};
use crate::grammar::complete_instant;

/// Parse an instant, reading the system clock for relative expressions.
///
/// Accepted forms:
///
/// | Form | Example |
/// |---|---|
/// | epoch seconds | `1700000000` |
/// | ISO 8601 UTC | `2023-11-14T22:13:20Z` |
/// | ISO 8601 offset | `2023-11-14T22:13:20+02:00` |
/// | relative | `3 hours ago`, `2 days ahead` |
///
/// The whole input must match; surrounding whitespace is ignored.
///
/// # Errors
///
/// - [`TimeRangeError::InvalidExpression`] if no form matches the whole input
/// - [`TimeRangeError::InvalidDatetime`] if an ISO date names an impossible day or offset
/// - [`TimeRangeError::OutOfRange`] if the result is not representable
///
/// # Examples
///
/// ```
/// use timerange::parse_datetime;
///
/// let dt = parse_datetime("1700000000").unwrap();
/// assert_eq!(dt.to_rfc3339(), "2023-11-14T22:13:20+00:00");
/// ```
pub fn parse_datetime(text: &str) -> Result<DateTime<Utc>> {
    parse_datetime_with_clock(text, SystemClock)
}

/// Parse an instant, taking "now" from `clock`.
///
/// See [`parse_datetime`] for the accepted forms.
pub fn parse_datetime_with_clock<C: Clock>(text: &str, clock: C) -> Result<DateTime<Utc>> {
    let anchor = Anchor::new(clock);
    complete_instant(text)
        .ok_or_else(|| {
            TimeRangeError::InvalidExpression(format!(
                "cannot parse datetime expression: '{}'",
                text.trim()
            ))
        })
        .and_then(|expr| expr.resolve(&anchor))
        .inspect(|dt| debug!("parsed datetime '{}' as {}", text, format_instant(dt)))
        .inspect_err(|e| debug!("rejected datetime '{}': {}", text, e))
}

/// Render an instant as `YYYY-MM-DDTHH:MM:SSZ`.
///
/// Sub-second precision is dropped. Every instant the parsers return lies in
/// the years 0001..=9999, so its rendering reads back through the ISO UTC
/// form; instants built elsewhere outside that span get a sign or a fifth
/// digit and do not.
pub fn format_instant(instant: &DateTime<Utc>) -> String {
    instant.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use chrono::TimeZone;

    fn clock() -> FixedClock {
        // Tuesday, November 14, 2023, 22:00:00 UTC
        FixedClock(Utc.with_ymd_and_hms(2023, 11, 14, 22, 0, 0).unwrap())
    }

    #[test]
    fn test_parse_epoch() {
        let dt = parse_datetime_with_clock("1700000000", clock()).unwrap();
        assert_eq!(dt.timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_parse_iso_utc() {
        let dt = parse_datetime_with_clock("2023-11-14T22:13:20Z", clock()).unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2023, 11, 14, 22, 13, 20).unwrap());
    }

    #[test]
    fn test_parse_iso_offset() {
        let dt = parse_datetime_with_clock("2023-11-14T22:13:20+02:00", clock()).unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2023, 11, 14, 20, 13, 20).unwrap());
        let dt = parse_datetime_with_clock("2023-11-14T22:13:20-05:30", clock()).unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2023, 11, 15, 3, 43, 20).unwrap());
    }

    #[test]
    fn test_parse_3_hours_ago() {
        let dt = parse_datetime_with_clock("3 hours ago", clock()).unwrap();
        assert_eq!(format_instant(&dt), "2023-11-14T19:00:00Z");
    }

    #[test]
    fn test_parse_3_hours_ahead() {
        let dt = parse_datetime_with_clock("3 hours ahead", clock()).unwrap();
        assert_eq!(format_instant(&dt), "2023-11-15T01:00:00Z");
    }

    #[test]
    fn test_parse_relative_case_insensitive() {
        let dt = parse_datetime_with_clock("1 DAY Ago", clock()).unwrap();
        assert_eq!(format_instant(&dt), "2023-11-13T22:00:00Z");
        let dt = parse_datetime_with_clock("90 Seconds AHEAD", clock()).unwrap();
        assert_eq!(format_instant(&dt), "2023-11-14T22:01:30Z");
    }

    #[test]
    fn test_parse_surrounding_whitespace() {
        let dt = parse_datetime_with_clock("  5   minutes   ago ", clock()).unwrap();
        assert_eq!(format_instant(&dt), "2023-11-14T21:55:00Z");
    }

    #[test]
    fn test_parse_rejects_zero_and_leading_zero() {
        for text in ["0", "01", "", "   ", "0 hours ago", "03 hours ago"] {
            let err = parse_datetime_with_clock(text, clock()).unwrap_err();
            assert!(
                matches!(err, TimeRangeError::InvalidExpression(_)),
                "{text:?} gave {err}"
            );
        }
    }

    #[test]
    fn test_parse_rejects_trailing_text() {
        let err = parse_datetime_with_clock("2023-11-14T00:00:00Zxyz", clock()).unwrap_err();
        assert!(err.to_string().contains("cannot parse datetime expression"));
        assert!(parse_datetime_with_clock("1700000000 seconds", clock()).is_err());
        assert!(parse_datetime_with_clock("3 hours agone", clock()).is_err());
    }

    #[test]
    fn test_parse_rejects_other_iso_shapes() {
        for text in [
            "2023-11-14",
            "2023-11-14T22:13:20",
            "2023-11-14 22:13:20Z",
            "2023-11-14T22:13:20.5Z",
            "2023-11-14T22:13:20+0200",
        ] {
            assert!(
                matches!(
                    parse_datetime_with_clock(text, clock()),
                    Err(TimeRangeError::InvalidExpression(_))
                ),
                "{text:?} should not parse"
            );
        }
    }

    #[test]
    fn test_parse_impossible_date() {
        let err = parse_datetime_with_clock("2023-02-30T00:00:00Z", clock()).unwrap_err();
        assert!(matches!(err, TimeRangeError::InvalidDatetime(_)), "got: {err}");
        assert!(err.is_parse_error());
    }

    #[test]
    fn test_parse_huge_relative_is_range_error() {
        let err = parse_datetime_with_clock("99999999999999 days ago", clock()).unwrap_err();
        assert!(matches!(err, TimeRangeError::OutOfRange(_)), "got: {err}");
        assert!(!err.is_parse_error());
    }

    #[test]
    fn test_parse_rejects_leap_second_field() {
        for text in ["2023-11-14T10:00:60Z", "2023-11-14T10:00:60+02:00"] {
            let err = parse_datetime_with_clock(text, clock()).unwrap_err();
            assert!(
                matches!(err, TimeRangeError::InvalidDatetime(_)),
                "{text:?} gave {err}"
            );
        }
        assert!(crate::parse_timewindow_with_clock(
            "2023-11-14T10:00:60Z..2023-11-14T10:01:00Z",
            clock()
        )
        .is_err());
    }

    #[test]
    fn test_parse_relative_before_year_1_is_range_error() {
        let err = parse_datetime_with_clock("1000000 days ago", clock()).unwrap_err();
        assert!(matches!(err, TimeRangeError::OutOfRange(_)), "got: {err}");
        let err = parse_datetime_with_clock("3000000 days ahead", clock()).unwrap_err();
        assert!(matches!(err, TimeRangeError::OutOfRange(_)), "got: {err}");
    }

    #[test]
    fn test_parsed_range_always_reparses() {
        let range = crate::parse_timerange_with_clock("700000 days ago..", clock()).unwrap();
        let text = range.to_string();
        assert!(text.starts_with("0107-"), "got: {text}");
        assert_eq!(text.parse::<crate::TimeRange>().unwrap(), range);
    }

    #[test]
    fn test_parse_huge_epoch_is_range_error() {
        let err = parse_datetime_with_clock("99999999999999999999", clock()).unwrap_err();
        assert!(matches!(err, TimeRangeError::OutOfRange(_)), "got: {err}");
    }

    #[test]
    fn test_absolute_forms_ignore_clock() {
        struct PanickingClock;
        impl Clock for PanickingClock {
            fn now(&self) -> DateTime<Utc> {
                panic!("clock must not be read for absolute instants")
            }
        }
        assert!(parse_datetime_with_clock("1700000000", PanickingClock).is_ok());
        assert!(parse_datetime_with_clock("2023-11-14T22:13:20Z", PanickingClock).is_ok());
    }

    #[test]
    fn test_format_instant_reparses() {
        let dt = parse_datetime_with_clock("2023-11-14T22:13:20+02:00", clock()).unwrap();
        let text = format_instant(&dt);
        assert_eq!(text, "2023-11-14T20:13:20Z");
        assert_eq!(parse_datetime_with_clock(&text, clock()).unwrap(), dt);
    }

    #[test]
    fn test_parse_datetime_system_clock() {
        let before = Utc::now();
        let dt = parse_datetime("1 second ahead").unwrap();
        assert!(dt > before);
    }
}
