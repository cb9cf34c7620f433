//! Temporal utilities
//!
//! Conversions between the platform's millisecond epoch timestamps, external
//! nanosecond-precision timestamps and naive UTC datetimes, plus the date
//! window arithmetic used by acquisition queries.

use chrono::{DateTime, Duration, NaiveDateTime, SubsecRound, Utc};

use crate::error::{Result, TerrariumError};
use crate::models::DateRange;

/// Convert a millisecond epoch timestamp into a naive UTC datetime
pub fn datetime_from_millis(millis: i64) -> Result<NaiveDateTime> {
    DateTime::from_timestamp_millis(millis).map(|dt| dt.naive_utc()).ok_or_else(|| {
        TerrariumError::InvalidArgument {
            operation: "convert timestamp".to_string(),
            reason: format!("{} ms is out of the representable range", millis),
        }
    })
}

/// Convert a naive UTC datetime into a millisecond epoch timestamp
pub fn millis_from_datetime(date: NaiveDateTime) -> i64 {
    date.and_utc().timestamp_millis()
}

/// Convert an external timestamp into a naive UTC datetime, truncated to microseconds
pub fn datetime_from_timestamp(timestamp: DateTime<Utc>) -> NaiveDateTime {
    timestamp.naive_utc().trunc_subsecs(6)
}

/// Convert a naive UTC datetime into an external UTC timestamp
pub fn timestamp_from_datetime(date: NaiveDateTime) -> DateTime<Utc> {
    date.and_utc()
}

/// Convert a millisecond epoch timestamp into an external timestamp with whole-second precision
pub fn timestamp_from_millis(millis: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp(millis / 1000, 0).ok_or_else(|| TerrariumError::InvalidArgument {
        operation: "convert timestamp".to_string(),
        reason: format!("{} ms is out of the representable range", millis),
    })
}

fn out_of_range(date: NaiveDateTime, shift: impl std::fmt::Display) -> TerrariumError {
    TerrariumError::InvalidArgument {
        operation: "shift date".to_string(),
        reason: format!("{} shifted by {} is out of the representable range", date, shift),
    }
}

/// Shift a date by a signed number of days
pub fn shift_date(date: NaiveDateTime, days: i64) -> Result<NaiveDateTime> {
    Duration::try_days(days)
        .and_then(|shift| date.checked_add_signed(shift))
        .ok_or_else(|| out_of_range(date, format!("{} days", days)))
}

/// Generate a date range ending at `date` and starting `width` days before it.
///
/// When `buffered` is set the range ends `width` days after `date` instead.
pub fn date_range(date: NaiveDateTime, width: u32, buffered: bool) -> Result<DateRange> {
    let width = i64::from(width);
    let start = shift_date(date, -width)?;
    let end = if buffered { shift_date(date, width)? } else { date };
    Ok(DateRange { start, end })
}

/// Generate a date range spanning `buffer` days on either side of `date`
pub fn date_buffer(date: NaiveDateTime, buffer: u32) -> Result<DateRange> {
    date_range(date, buffer, true)
}

/// Generate a date range spanning a fractional number of days on either side of `date`
pub fn fractional_date_buffer(date: NaiveDateTime, buffer_days: f64) -> Result<DateRange> {
    let millis = buffer_days * 86_400_000.0;
    if !millis.is_finite() || millis < 0.0 || millis > i64::MAX as f64 {
        return Err(out_of_range(date, format!("{} days", buffer_days)));
    }
    let half = Duration::try_milliseconds(millis.round() as i64)
        .ok_or_else(|| out_of_range(date, format!("{} days", buffer_days)))?;
    let start = date.checked_sub_signed(half);
    let end = date.checked_add_signed(half);
    match (start, end) {
        (Some(start), Some(end)) => Ok(DateRange { start, end }),
        _ => Err(out_of_range(date, format!("{} days", buffer_days))),
    }
}

/// Convert millisecond timestamps into chronologically sorted, de-duplicated datetimes
pub fn sorted_unique_dates(timestamps: &[i64]) -> Result<Vec<NaiveDateTime>> {
    let mut dates = timestamps
        .iter()
        .map(|millis| datetime_from_millis(*millis))
        .collect::<Result<Vec<_>>>()?;
    dates.sort();
    dates.dedup();
    Ok(dates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Timelike};

    fn pivot() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2021, 7, 14).unwrap().and_hms_milli_opt(5, 30, 12, 345).unwrap()
    }

    #[test]
    fn test_millis_roundtrip_is_exact() {
        let millis = millis_from_datetime(pivot());
        assert_eq!(millis % 1000, 345);
        assert_eq!(datetime_from_millis(millis).unwrap(), pivot());
    }

    #[test]
    fn test_nanosecond_timestamp_truncates_to_micros() {
        let ts = Utc.with_ymd_and_hms(2021, 7, 14, 5, 30, 12).unwrap()
            + Duration::nanoseconds(123_456_789);
        let naive = datetime_from_timestamp(ts);
        assert_eq!(naive.nanosecond(), 123_456_000);
        assert_eq!(timestamp_from_datetime(naive).timestamp(), ts.timestamp());
    }

    #[test]
    fn test_timestamp_from_millis_truncates_seconds() {
        let ts = timestamp_from_millis(1_626_240_612_999).unwrap();
        assert_eq!(ts.timestamp(), 1_626_240_612);
        assert_eq!(ts.nanosecond(), 0);
    }

    #[test]
    fn test_date_range_unbuffered() {
        let range = date_range(pivot(), 7, false).unwrap();
        assert_eq!(range.start, pivot() - Duration::days(7));
        assert_eq!(range.end, pivot());
    }

    #[test]
    fn test_date_range_buffered() {
        let range = date_range(pivot(), 3, true).unwrap();
        assert_eq!(range.start, pivot() - Duration::days(3));
        assert_eq!(range.end, pivot() + Duration::days(3));
    }

    #[test]
    fn test_fractional_buffer() {
        let range = fractional_date_buffer(pivot(), 0.5).unwrap();
        assert_eq!(range.duration(), Duration::days(1));
        assert_eq!(range.start, pivot() - Duration::hours(12));
    }

    #[test]
    fn test_shift_beyond_calendar_fails() {
        assert!(shift_date(pivot(), i64::MAX).is_err());
        assert!(matches!(
            date_range(pivot(), u32::MAX, true),
            Err(TerrariumError::InvalidArgument { .. })
        ));
        assert!(date_buffer(NaiveDateTime::MAX, 1).is_err());
        assert!(fractional_date_buffer(pivot(), f64::NAN).is_err());
        assert!(fractional_date_buffer(pivot(), 1e300).is_err());
        assert_eq!(shift_date(pivot(), -2).unwrap(), pivot() - Duration::days(2));
    }

    #[test]
    fn test_sorted_unique_dates() {
        let dates = sorted_unique_dates(&[3_000, 1_000, 3_000, 2_000]).unwrap();
        assert_eq!(dates.len(), 3);
        assert!(dates.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(millis_from_datetime(dates[0]), 1_000);
    }

    #[test]
    fn test_out_of_range_millis() {
        assert!(datetime_from_millis(i64::MAX).is_err());
    }
}
