//! The percentage adjustment store.
//!
//! [`PercentageAdjustmentStore`] is the single source of truth for "how much
//! should component X be scaled in month M". Operators submit a full
//! month → percentage mapping per component; the store parses it, drops
//! empty and invalid entries, and replaces the component's overrides
//! atomically through an [`OverrideRepository`].

use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;
use std::sync::Arc;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{PayrollError, PayrollResult};
use crate::models::PercentageOverride;

use super::repository::OverrideRepository;

/// Decimal places kept for stored percentages.
pub const PERCENTAGE_SCALE: u32 = 2;

/// Scales `value` by `percentage` percent: `value * (1 + percentage / 100)`.
///
/// # Errors
///
/// Returns [`PayrollError::Arithmetic`] if the result does not fit in a
/// [`Decimal`].
///
/// # Example
///
/// ```
/// use payroll_engine::adjustment::scale;
/// use rust_decimal::Decimal;
///
/// assert_eq!(scale(Decimal::new(1000, 0), Decimal::new(10, 0))?, Decimal::new(1100, 0));
/// assert_eq!(scale(Decimal::new(1000, 0), Decimal::new(-15, 0))?, Decimal::new(850, 0));
/// assert!(scale(Decimal::new(1000, 0), Decimal::MAX).is_err());
/// # Ok::<(), payroll_engine::error::PayrollError>(())
/// ```
pub fn scale(value: Decimal, percentage: Decimal) -> PayrollResult<Decimal> {
    percentage
        .checked_div(Decimal::ONE_HUNDRED)
        .and_then(|fraction| Decimal::ONE.checked_add(fraction))
        .and_then(|factor| value.checked_mul(factor))
        .ok_or_else(|| PayrollError::arithmetic(format!("scaling {} by {}%", value, percentage)))
}

/// Parses one raw percentage entry.
///
/// Returns `Ok(None)` for an empty (or whitespace-only) entry, meaning "no
/// adjustment", and `Ok(Some(0))` for `"0"`, meaning a stored 0% adjustment.
///
/// # Errors
///
/// Returns [`PayrollError::Validation`] if a non-empty entry is not a number.
pub fn parse_percentage(raw: &str) -> PayrollResult<Option<Decimal>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    Decimal::from_str(trimmed)
        .map(|p| Some(p.round_dp_with_strategy(PERCENTAGE_SCALE, RoundingStrategy::MidpointAwayFromZero)))
        .map_err(|_| PayrollError::validation("percentage", format!("'{}' is not a number", trimmed)))
}

/// A month entry dropped from a save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedEntry {
    /// The submitted month key.
    pub month: u32,
    /// The submitted raw value.
    pub raw: String,
    /// Why the entry was dropped.
    pub reason: String,
}

/// What a save persisted and what it dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveReport {
    /// The component that was saved.
    pub component: String,
    /// Number of overrides now stored for the component.
    pub saved: usize,
    /// Number of months submitted empty (no adjustment).
    pub empty: usize,
    /// Entries dropped because they failed validation.
    pub rejected: Vec<RejectedEntry>,
}

/// A snapshot of every override stored for one month.
///
/// Built once per generation run so applying overrides to many slip lines
/// does not hit the repository for each line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonthAdjustments {
    month: u32,
    percentages: HashMap<String, Decimal>,
}

impl MonthAdjustments {
    /// Creates a snapshot from (component, percentage) pairs.
    pub fn new(month: u32, percentages: impl IntoIterator<Item = (String, Decimal)>) -> Self {
        Self {
            month,
            percentages: percentages.into_iter().collect(),
        }
    }

    /// The month this snapshot covers.
    pub fn month(&self) -> u32 {
        self.month
    }

    /// The stored percentage for a component (exact, case-sensitive match).
    pub fn percentage(&self, component: &str) -> Option<Decimal> {
        self.percentages.get(component).copied()
    }

    /// Scales `value` by the component's override, or returns it unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`PayrollError::Arithmetic`] if the scaled value overflows.
    pub fn apply(&self, value: Decimal, component: &str) -> PayrollResult<Decimal> {
        match self.percentage(component) {
            Some(percentage) => scale(value, percentage),
            None => Ok(value),
        }
    }

    /// Returns true if no component has an override this month.
    pub fn is_empty(&self) -> bool {
        self.percentages.is_empty()
    }
}

/// Persists and applies month-and-component keyed percentage overrides.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use payroll_engine::adjustment::{InMemoryOverrideRepository, PercentageAdjustmentStore};
/// use rust_decimal::Decimal;
///
/// let store = PercentageAdjustmentStore::new(Arc::new(InMemoryOverrideRepository::new()));
/// store.save("Basic Salary", [(1, "10"), (2, "")])?;
///
/// assert_eq!(store.apply(Decimal::new(1000, 0), 1, "Basic Salary")?, Decimal::new(1100, 0));
/// assert_eq!(store.apply(Decimal::new(1000, 0), 2, "Basic Salary")?, Decimal::new(1000, 0));
/// # Ok::<(), payroll_engine::error::PayrollError>(())
/// ```
#[derive(Clone)]
pub struct PercentageAdjustmentStore {
    repository: Arc<dyn OverrideRepository>,
}

impl PercentageAdjustmentStore {
    /// Creates a store over the given repository.
    pub fn new(repository: Arc<dyn OverrideRepository>) -> Self {
        Self { repository }
    }

    /// Replaces all overrides of `component` with the submitted mapping.
    ///
    /// Empty entries are dropped (no override for that month). Entries that
    /// are not numeric, or whose month is outside 1-12, are dropped with a
    /// warning and listed in the report's `rejected`; they never abort the
    /// save. When a month appears more than once the last entry wins.
    ///
    /// # Errors
    ///
    /// Returns [`PayrollError::Validation`] for a blank component name and
    /// [`PayrollError::Storage`] if the repository write fails, in which case
    /// the previous overrides are left intact.
    pub fn save<I, S>(&self, component: &str, raw_percentages: I) -> PayrollResult<SaveReport>
    where
        I: IntoIterator<Item = (u32, S)>,
        S: AsRef<str>,
    {
        if component.trim().is_empty() {
            return Err(PayrollError::validation(
                "component",
                "component name must not be empty",
            ));
        }

        let mut report = SaveReport {
            component: component.to_string(),
            ..SaveReport::default()
        };
        let mut accepted: BTreeMap<u32, Decimal> = BTreeMap::new();

        for (month, raw) in raw_percentages {
            let raw = raw.as_ref();
            let parsed = if (1..=12).contains(&month) {
                parse_percentage(raw)
            } else {
                Err(PayrollError::validation(
                    "month",
                    format!("{} is not a calendar month", month),
                ))
            };

            match parsed {
                Ok(Some(percentage)) => {
                    accepted.insert(month, percentage);
                }
                Ok(None) => {
                    accepted.remove(&month);
                    report.empty += 1;
                }
                Err(err) => {
                    warn!(
                        component = %component,
                        month,
                        raw = %raw,
                        error = %err,
                        "Dropping invalid percentage entry"
                    );
                    report.rejected.push(RejectedEntry {
                        month,
                        raw: raw.to_string(),
                        reason: err.to_string(),
                    });
                }
            }
        }

        let overrides: Vec<PercentageOverride> = accepted
            .into_iter()
            .map(|(month, percentage)| PercentageOverride::new(month, component, percentage))
            .collect();
        report.saved = overrides.len();

        self.repository.replace_component(component, overrides)?;

        info!(
            component = %component,
            saved = report.saved,
            empty = report.empty,
            rejected = report.rejected.len(),
            "Saved percentage overrides"
        );
        Ok(report)
    }

    /// The stored overrides of a component as month → percentage.
    ///
    /// Months without an entry have no adjustment (not a 0% adjustment).
    pub fn get(&self, component: &str) -> PayrollResult<BTreeMap<u32, Decimal>> {
        Ok(self
            .repository
            .find_by_component(component)?
            .into_iter()
            .map(|o| (o.month, o.percentage))
            .collect())
    }

    /// The full stored override records of a component, ordered by month.
    pub fn overrides(&self, component: &str) -> PayrollResult<Vec<PercentageOverride>> {
        self.repository.find_by_component(component)
    }

    /// Returns true if at least one override exists for the component.
    pub fn has(&self, component: &str) -> PayrollResult<bool> {
        Ok(!self.repository.find_by_component(component)?.is_empty())
    }

    /// Scales `base_value` by the override for (month, component), if any.
    pub fn apply(&self, base_value: Decimal, month: u32, component: &str) -> PayrollResult<Decimal> {
        match self.repository.find(month, component)? {
            Some(over) => scale(base_value, over.percentage),
            None => Ok(base_value),
        }
    }

    /// Removes every override of a retired component.
    pub fn delete_all(&self, component: &str) -> PayrollResult<usize> {
        let deleted = self.repository.delete_component(component)?;
        info!(component = %component, deleted, "Deleted percentage overrides");
        Ok(deleted)
    }

    /// The components that currently carry overrides, sorted.
    pub fn components(&self) -> PayrollResult<Vec<String>> {
        self.repository.components()
    }

    /// Snapshots every override stored for `month`.
    pub fn for_month(&self, month: u32) -> PayrollResult<MonthAdjustments> {
        let overrides = self.repository.find_by_month(month)?;
        Ok(MonthAdjustments::new(
            month,
            overrides.into_iter().map(|o| (o.component, o.percentage)),
        ))
    }
}
