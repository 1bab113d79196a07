use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Timelike, Weekday};

use crate::error::{ProcessingError, Result};

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

/// Calendar fields derived from one observation timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeFeatures {
    pub date: NaiveDate,
    pub hour: u32,
    pub month: u32,
    pub weekday: Weekday,
}

impl TimeFeatures {
    pub fn from_datetime(datetime: NaiveDateTime) -> Self {
        Self {
            date: datetime.date(),
            hour: datetime.hour(),
            month: datetime.month(),
            weekday: datetime.weekday(),
        }
    }

    /// Parses `value` and derives its features. `row` is only used for the error.
    pub fn derive(value: &str, row: usize) -> Result<Self> {
        parse_timestamp(value)
            .map(Self::from_datetime)
            .ok_or_else(|| ProcessingError::InvalidTimestamp {
                row,
                value: value.to_string(),
            })
    }

    pub fn day_of_week(&self) -> &'static str {
        weekday_name(self.weekday)
    }
}

/// Accepts the provider's naive timestamps, RFC 3339 (wall time kept) and bare dates.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();

    if let Ok(with_offset) = DateTime::parse_from_rfc3339(value) {
        return Some(with_offset.naive_local());
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

pub fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_minute_precision() {
        let features = TimeFeatures::derive("2024-03-01 00:00", 1).unwrap();
        assert_eq!(features.date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(features.hour, 0);
        assert_eq!(features.month, 3);
        assert_eq!(features.day_of_week(), "Friday");
    }

    #[test]
    fn test_derive_accepted_formats() {
        for value in [
            "2024-12-31 23:00:00",
            "2024-12-31T23:00:00",
            "2024-12-31T23:00",
            "2024-12-31T23:00:00+00:00",
            "2024-12-31T23:00:00Z",
        ] {
            let features = TimeFeatures::derive(value, 1).unwrap();
            assert_eq!(features.hour, 23, "{}", value);
            assert_eq!(features.month, 12, "{}", value);
            assert_eq!(features.day_of_week(), "Tuesday", "{}", value);
        }
    }

    #[test]
    fn test_offset_keeps_wall_time() {
        let features = TimeFeatures::derive("2024-06-15T08:00:00+02:00", 1).unwrap();
        assert_eq!(features.hour, 8);
        assert_eq!(features.day_of_week(), "Saturday");
    }

    #[test]
    fn test_bare_date_is_midnight() {
        let features = TimeFeatures::derive("2024-01-07", 1).unwrap();
        assert_eq!(features.hour, 0);
        assert_eq!(features.day_of_week(), "Sunday");
    }

    #[test]
    fn test_malformed_timestamp_is_an_error() {
        let err = TimeFeatures::derive("not-a-date", 42).unwrap_err();
        match err {
            ProcessingError::InvalidTimestamp { row, value } => {
                assert_eq!(row, 42);
                assert_eq!(value, "not-a-date");
            }
            other => panic!("unexpected error: {}", other),
        }
        assert!(TimeFeatures::derive("2024-02-30 10:00", 1).is_err());
    }
}
