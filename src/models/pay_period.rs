//! Pay period model.
//!
//! This module contains the [`PayPeriod`] type that bounds a salary slip.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{PayrollError, PayrollResult};

/// The date range covered by a salary slip.
///
/// Both bounds are inclusive. A period built through [`PayPeriod::new`] is
/// guaranteed to have `start_date <= end_date`.
///
/// # Example
///
/// ```
/// use payroll_engine::models::PayPeriod;
/// use chrono::NaiveDate;
///
/// let period = PayPeriod::new(
///     NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
///     NaiveDate::from_ymd_opt(2026, 3, 31).unwrap(),
/// )
/// .unwrap();
///
/// assert_eq!(period.month(), 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayPeriod {
    /// The start date of the pay period (inclusive).
    pub start_date: NaiveDate,
    /// The end date of the pay period (inclusive).
    pub end_date: NaiveDate,
}

impl PayPeriod {
    /// Creates a pay period, rejecting an end date that precedes the start date.
    ///
    /// # Errors
    ///
    /// Returns [`PayrollError::Validation`] when `end_date < start_date`.
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> PayrollResult<Self> {
        let period = Self {
            start_date,
            end_date,
        };
        period.validate()?;
        Ok(period)
    }

    /// Checks the period bounds.
    ///
    /// Periods deserialized from requests bypass [`PayPeriod::new`], so callers
    /// validate them explicitly before use.
    pub fn validate(&self) -> PayrollResult<()> {
        if self.end_date < self.start_date {
            return Err(PayrollError::validation(
                "period",
                format!(
                    "end date {} is before start date {}",
                    self.end_date, self.start_date
                ),
            ));
        }
        Ok(())
    }

    /// The calendar month (1-12) of the period start, used to look up
    /// percentage overrides.
    pub fn month(&self) -> u32 {
        self.start_date.month()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_new_accepts_ordered_bounds() {
        let period = PayPeriod::new(date(2026, 1, 1), date(2026, 1, 31)).unwrap();
        assert_eq!(period.start_date, date(2026, 1, 1));
        assert_eq!(period.end_date, date(2026, 1, 31));
    }

    #[test]
    fn test_new_accepts_single_day_period() {
        assert!(PayPeriod::new(date(2026, 1, 15), date(2026, 1, 15)).is_ok());
    }

    #[test]
    fn test_new_rejects_reversed_bounds() {
        let result = PayPeriod::new(date(2026, 2, 1), date(2026, 1, 31));
        match result {
            Err(PayrollError::Validation { field, message }) => {
                assert_eq!(field, "period");
                assert!(message.contains("2026-01-31"));
            }
            other => panic!("Expected Validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_month_uses_period_start() {
        let period = PayPeriod::new(date(2026, 1, 16), date(2026, 2, 15)).unwrap();
        assert_eq!(period.month(), 1);
    }

    #[test]
    fn test_deserialize_pay_period() {
        let json = r#"{ "start_date": "2026-03-01", "end_date": "2026-03-31" }"#;
        let period: PayPeriod = serde_json::from_str(json).unwrap();
        assert_eq!(period.start_date, date(2026, 3, 1));
        assert!(period.validate().is_ok());
    }
}
