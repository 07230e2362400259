//! Calendar-month arithmetic.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// A calendar month (`year`, `month` in 1..=12).
///
/// Ordering is chronological.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> DomainResult<Self> {
        if !(1..=12).contains(&month) {
            return Err(DomainError::InvalidMonth { year, month });
        }
        Ok(Self { year, month })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// First day of this month.
    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    /// Shift by `months` (negative moves backwards).
    pub fn offset(&self, months: i32) -> Self {
        let total = self.ordinal() + i64::from(months);
        Self::from_ordinal(total)
    }

    pub fn previous(&self) -> Self {
        self.offset(-1)
    }

    /// Signed number of months from `self` to `other` (`other - self`).
    pub fn months_until(&self, other: YearMonth) -> i64 {
        other.ordinal() - self.ordinal()
    }

    fn ordinal(&self) -> i64 {
        i64::from(self.year) * 12 + i64::from(self.month - 1)
    }

    fn from_ordinal(ordinal: i64) -> Self {
        let year = ordinal.div_euclid(12);
        let month = ordinal.rem_euclid(12) as u32 + 1;
        Self {
            year: year as i32,
            month,
        }
    }
}

impl core::fmt::Display for YearMonth {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ym(year: i32, month: u32) -> YearMonth {
        YearMonth::new(year, month).unwrap()
    }

    #[test]
    fn previous_wraps_across_year_boundary() {
        assert_eq!(ym(2024, 1).previous(), ym(2023, 12));
        assert_eq!(ym(2024, 7).previous(), ym(2024, 6));
    }

    #[test]
    fn offset_by_minus_23_spans_two_years() {
        assert_eq!(ym(2024, 6).offset(-23), ym(2022, 7));
    }

    #[test]
    fn months_until_is_signed() {
        assert_eq!(ym(2022, 7).months_until(ym(2024, 6)), 23);
        assert_eq!(ym(2024, 6).months_until(ym(2022, 7)), -23);
    }

    #[test]
    fn invalid_month_is_rejected() {
        assert!(YearMonth::new(2024, 0).is_err());
        assert!(YearMonth::new(2024, 13).is_err());
    }

    #[test]
    fn from_date_and_display() {
        let d = NaiveDate::from_ymd_opt(2024, 3, 17).unwrap();
        let m = YearMonth::from_date(d);
        assert_eq!(m.to_string(), "2024-03");
        assert_eq!(m.first_day(), NaiveDate::from_ymd_opt(2024, 3, 1));
    }

    proptest! {
        #[test]
        fn offset_round_trips(year in 1900i32..2200, month in 1u32..=12, delta in -600i32..600) {
            let start = ym(year, month);
            let moved = start.offset(delta);
            prop_assert_eq!(moved.offset(-delta), start);
            prop_assert_eq!(start.months_until(moved), i64::from(delta));
        }
    }
}
