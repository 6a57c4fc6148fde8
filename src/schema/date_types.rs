//! Date unit conversion
//!
//! Values are converted by going through epoch milliseconds: first into
//! milliseconds from the source unit, then out to the target unit. Integer
//! division truncates toward zero. `YYYYMMDD` values are interpreted in UTC.

use chrono::{Datelike, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::error::{SchemaError, SchemaResult};

const MILLIS_PER_SECOND: i64 = 1000;
const MILLIS_PER_MINUTE: i64 = 60 * MILLIS_PER_SECOND;
const MILLIS_PER_HOUR: i64 = 60 * MILLIS_PER_MINUTE;

/// Units a date column can be stored in
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DateType {
    MillisecondsSinceEpoch,
    SecondsSinceEpoch,
    MinutesSinceEpoch,
    HoursSinceEpoch,
    /// Calendar date as the integer `YYYYMMDD`
    Yyyymmdd,
}

impl DateType {
    /// Convert a value in this unit to epoch milliseconds
    pub fn to_millis(self, value: i64) -> SchemaResult<i64> {
        match self {
            Self::MillisecondsSinceEpoch => Ok(value),
            Self::SecondsSinceEpoch => scale_to_millis(value, MILLIS_PER_SECOND),
            Self::MinutesSinceEpoch => scale_to_millis(value, MILLIS_PER_MINUTE),
            Self::HoursSinceEpoch => scale_to_millis(value, MILLIS_PER_HOUR),
            Self::Yyyymmdd => {
                let date = NaiveDate::parse_from_str(&value.to_string(), "%Y%m%d")
                    .map_err(|e| SchemaError::InvalidDate(format!("{value}: {e}")))?;
                Ok(date_to_millis(date))
            }
        }
    }

    /// Convert epoch milliseconds into this unit
    pub fn convert_millis(self, millis: i64) -> SchemaResult<i64> {
        match self {
            Self::MillisecondsSinceEpoch => Ok(millis),
            Self::SecondsSinceEpoch => Ok(millis / MILLIS_PER_SECOND),
            Self::MinutesSinceEpoch => Ok(millis / MILLIS_PER_MINUTE),
            Self::HoursSinceEpoch => Ok(millis / MILLIS_PER_HOUR),
            Self::Yyyymmdd => match Utc.timestamp_millis_opt(millis) {
                chrono::LocalResult::Single(dt) => {
                    Ok(dt.year() as i64 * 10_000 + dt.month() as i64 * 100 + dt.day() as i64)
                }
                _ => Err(SchemaError::InvalidDate(format!(
                    "{millis} ms is out of range"
                ))),
            },
        }
    }

    /// Express a calendar date (UTC midnight) in this unit.
    ///
    /// Infallible: every `NaiveDate` is within about 8.3e15 ms of the epoch.
    pub fn date_value(self, date: NaiveDate) -> i64 {
        match self {
            Self::Yyyymmdd => {
                date.year() as i64 * 10_000 + date.month() as i64 * 100 + date.day() as i64
            }
            Self::MillisecondsSinceEpoch => date_to_millis(date),
            Self::SecondsSinceEpoch => date_to_millis(date) / MILLIS_PER_SECOND,
            Self::MinutesSinceEpoch => date_to_millis(date) / MILLIS_PER_MINUTE,
            Self::HoursSinceEpoch => date_to_millis(date) / MILLIS_PER_HOUR,
        }
    }
}

fn scale_to_millis(value: i64, millis_per_unit: i64) -> SchemaResult<i64> {
    value
        .checked_mul(millis_per_unit)
        .ok_or_else(|| SchemaError::InvalidDate(format!("{value} is out of range")))
}

fn date_to_millis(date: NaiveDate) -> i64 {
    let midnight = date.and_time(chrono::NaiveTime::default());
    Utc.from_utc_datetime(&midnight).timestamp_millis()
}

/// Convert `value` from one date unit to another
pub fn convert_date_to_type(value: i64, from: DateType, to: DateType) -> SchemaResult<i64> {
    to.convert_millis(from.to_millis(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS_SINCE_EPOCH_20200303: i64 = 1583193600000;
    const MINUTES_SINCE_EPOCH_20200303: i64 = 26386560;

    #[test]
    fn test_convert_from_millis() {
        use DateType::*;
        let ms = MS_SINCE_EPOCH_20200303;

        assert_eq!(convert_date_to_type(ms, MillisecondsSinceEpoch, MillisecondsSinceEpoch).unwrap(), ms);
        assert_eq!(convert_date_to_type(ms, MillisecondsSinceEpoch, SecondsSinceEpoch).unwrap(), ms / 1000);
        assert_eq!(
            convert_date_to_type(ms, MillisecondsSinceEpoch, MinutesSinceEpoch).unwrap(),
            MINUTES_SINCE_EPOCH_20200303
        );
        assert_eq!(
            convert_date_to_type(ms, MillisecondsSinceEpoch, HoursSinceEpoch).unwrap(),
            MINUTES_SINCE_EPOCH_20200303 / 60
        );
        assert_eq!(convert_date_to_type(ms, MillisecondsSinceEpoch, Yyyymmdd).unwrap(), 20200303);
    }

    #[test]
    fn test_convert_from_minutes() {
        use DateType::*;
        let minutes = MINUTES_SINCE_EPOCH_20200303;

        assert_eq!(convert_date_to_type(minutes, MinutesSinceEpoch, MinutesSinceEpoch).unwrap(), minutes);
        assert_eq!(convert_date_to_type(minutes, MinutesSinceEpoch, Yyyymmdd).unwrap(), 20200303);
    }

    #[test]
    fn test_convert_from_yyyymmdd() {
        assert_eq!(
            convert_date_to_type(20200303, DateType::Yyyymmdd, DateType::MillisecondsSinceEpoch).unwrap(),
            MS_SINCE_EPOCH_20200303
        );
    }

    #[test]
    fn test_invalid_yyyymmdd() {
        let result = convert_date_to_type(20201345, DateType::Yyyymmdd, DateType::SecondsSinceEpoch);
        assert!(matches!(result, Err(SchemaError::InvalidDate(_))));
    }

    #[test]
    fn test_overflowing_value_is_an_error() {
        let result = convert_date_to_type(
            i64::MAX / 1000,
            DateType::HoursSinceEpoch,
            DateType::MillisecondsSinceEpoch,
        );
        assert!(matches!(result, Err(SchemaError::InvalidDate(_))));

        let result = convert_date_to_type(i64::MIN, DateType::SecondsSinceEpoch, DateType::Yyyymmdd);
        assert!(matches!(result, Err(SchemaError::InvalidDate(_))));
    }

    #[test]
    fn test_date_value_at_calendar_limits() {
        assert!(DateType::MillisecondsSinceEpoch.date_value(NaiveDate::MIN) < 0);
        assert!(DateType::MillisecondsSinceEpoch.date_value(NaiveDate::MAX) > 0);
        assert!(DateType::HoursSinceEpoch.date_value(NaiveDate::MAX) > 0);
    }

    #[test]
    fn test_from_date() {
        let date = NaiveDate::from_ymd_opt(2020, 3, 3).unwrap();
        assert_eq!(DateType::Yyyymmdd.date_value(date), 20200303);
        assert_eq!(DateType::MillisecondsSinceEpoch.date_value(date), MS_SINCE_EPOCH_20200303);
        assert_eq!(DateType::MinutesSinceEpoch.date_value(date), MINUTES_SINCE_EPOCH_20200303);
    }
}
