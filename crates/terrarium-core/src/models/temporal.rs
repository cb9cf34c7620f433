use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TerrariumError};

/// An ordered pair of naive UTC datetimes with `start <= end`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl DateRange {
    /// Create a new date range, rejecting reversed bounds
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Result<Self> {
        if start > end {
            return Err(TerrariumError::InvalidArgument {
                operation: "generate daterange".to_string(),
                reason: format!("start {} is after end {}", start, end),
            });
        }
        Ok(Self { start, end })
    }

    /// Width of the range
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Whether the instant falls inside the half-open range `[start, end)`
    pub fn contains(&self, instant: NaiveDateTime) -> bool {
        instant >= self.start && instant < self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2021, 6, day).unwrap().and_hms_opt(0, 0, 0).unwrap()
    }

    #[test]
    fn test_reversed_range_rejected() {
        assert!(DateRange::new(at(10), at(3)).is_err());
    }

    #[test]
    fn test_duration_and_contains() {
        let range = DateRange::new(at(3), at(10)).unwrap();
        assert_eq!(range.duration(), Duration::days(7));
        assert!(range.contains(at(3)));
        assert!(!range.contains(at(10)));
    }
}
