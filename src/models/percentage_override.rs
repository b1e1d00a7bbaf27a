//! Percentage override model.
//!
//! A [`PercentageOverride`] scales one salary component's amount for one
//! calendar month. At most one override exists per (month, component).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A stored percentage adjustment keyed by month and component.
///
/// # Example
///
/// ```
/// use payroll_engine::models::PercentageOverride;
/// use rust_decimal::Decimal;
///
/// let over = PercentageOverride::new(3, "Basic Salary", Decimal::new(1050, 2));
/// assert_eq!(over.month, 3);
/// assert_eq!(over.created_at, over.updated_at);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PercentageOverride {
    /// Calendar month, 1-12.
    pub month: u32,
    /// The salary component the override applies to.
    pub component: String,
    /// The adjustment in percent; `10` means +10%, `-15` means -15%.
    pub percentage: Decimal,
    /// When the override was first stored.
    pub created_at: DateTime<Utc>,
    /// When the override was last written.
    pub updated_at: DateTime<Utc>,
}

impl PercentageOverride {
    /// Creates an override stamped with the current time.
    pub fn new(month: u32, component: impl Into<String>, percentage: Decimal) -> Self {
        let now = Utc::now();
        Self {
            month,
            component: component.into(),
            percentage,
            created_at: now,
            updated_at: now,
        }
    }
}
