//! Salary slip models.
//!
//! This module contains the slip shapes exchanged with the payroll backend:
//! summaries used for existence checks and history ordering, full details
//! used to copy or average a prior slip, and the [`SalarySlipDraft`] the
//! engine submits for persistence.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::PayPeriod;

/// Lifecycle status of a slip in the payroll backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlipStatus {
    /// Not yet finalized; never used as history.
    Draft,
    /// Finalized and authoritative for history.
    Submitted,
    /// Cancelled after submission.
    Cancelled,
}

/// A short description of a slip, as returned by list queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlipSummary {
    /// Backend identifier of the slip.
    pub id: String,
    /// The employee the slip belongs to.
    pub employee_id: String,
    /// Start of the covered period (inclusive).
    pub period_start: NaiveDate,
    /// End of the covered period (inclusive).
    pub period_end: NaiveDate,
    /// Current status of the slip.
    pub status: SlipStatus,
}

impl SlipSummary {
    /// Returns true if the slip is finalized history.
    pub fn is_submitted(&self) -> bool {
        self.status == SlipStatus::Submitted
    }
}

/// A named line on a slip (an earning or a deduction).
///
/// # Example
///
/// ```
/// use payroll_engine::models::SlipComponent;
/// use rust_decimal::Decimal;
///
/// let line = SlipComponent::new("Housing Allowance", Decimal::new(450, 0));
/// assert_eq!(line.component, "Housing Allowance");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlipComponent {
    /// The salary component name, matched exactly against override keys.
    pub component: String,
    /// The line amount.
    pub amount: Decimal,
}

impl SlipComponent {
    /// Creates a slip line.
    pub fn new(component: impl Into<String>, amount: Decimal) -> Self {
        Self {
            component: component.into(),
            amount,
        }
    }
}

/// The full content of an existing slip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlipDetail {
    /// Backend identifier of the slip.
    pub id: String,
    /// The base amount of the slip.
    pub base: Decimal,
    /// Earning lines, in backend order.
    #[serde(default)]
    pub earnings: Vec<SlipComponent>,
    /// Deduction lines, in backend order.
    #[serde(default)]
    pub deductions: Vec<SlipComponent>,
}

/// An employee's baseline compensation template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureAssignment {
    /// Name of the assigned salary structure.
    pub structure_name: String,
    /// The base amount defined by the assignment.
    pub base: Decimal,
}

/// A slip composed by the engine and not yet persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalarySlipDraft {
    /// The employee the slip is for.
    pub employee_id: String,
    /// The company paying the employee.
    pub company: String,
    /// Start of the covered period (inclusive).
    pub period_start: NaiveDate,
    /// End of the covered period (inclusive).
    pub period_end: NaiveDate,
    /// The base amount.
    pub base: Decimal,
    /// Earning lines.
    pub earnings: Vec<SlipComponent>,
    /// Deduction lines.
    pub deductions: Vec<SlipComponent>,
}

impl SalarySlipDraft {
    /// The period covered by the draft.
    pub fn period(&self) -> PayPeriod {
        PayPeriod {
            start_date: self.period_start,
            end_date: self.period_end,
        }
    }
}

/// Backend acknowledgement of a persisted slip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedSlip {
    /// Identifier assigned by the backend.
    pub id: String,
}

/// A slip the backend refused to delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlipDeletionError {
    /// The slip that could not be deleted.
    pub slip_id: String,
    /// The reason reported by the backend.
    pub message: String,
}

/// Outcome of a bulk delete of the slips in a period.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletionOutcome {
    /// Slips that were actually deleted.
    pub deleted_ids: Vec<String>,
    /// Slips that failed to delete.
    pub errors: Vec<SlipDeletionError>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slip_status_serialization() {
        assert_eq!(
            serde_json::to_string(&SlipStatus::Submitted).unwrap(),
            "\"submitted\""
        );
        assert_eq!(
            serde_json::from_str::<SlipStatus>("\"cancelled\"").unwrap(),
            SlipStatus::Cancelled
        );
    }

    #[test]
    fn test_is_submitted() {
        let mut summary = SlipSummary {
            id: "SLIP-00001".to_string(),
            employee_id: "HR-EMP-0001".to_string(),
            period_start: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            period_end: NaiveDate::from_ymd_opt(2026, 1, 31).unwrap(),
            status: SlipStatus::Submitted,
        };
        assert!(summary.is_submitted());

        summary.status = SlipStatus::Draft;
        assert!(!summary.is_submitted());
    }

    #[test]
    fn test_deserialize_slip_detail_defaults_lines() {
        let json = r#"{ "id": "SLIP-00001", "base": "2800" }"#;
        let detail: SlipDetail = serde_json::from_str(json).unwrap();
        assert_eq!(detail.base, Decimal::new(2800, 0));
        assert!(detail.earnings.is_empty());
        assert!(detail.deductions.is_empty());
    }

    #[test]
    fn test_serialize_component_amount_as_string() {
        let line = SlipComponent::new("Income Tax", Decimal::new(31250, 2));
        let json = serde_json::to_string(&line).unwrap();
        assert!(json.contains("\"component\":\"Income Tax\""));
        assert!(json.contains("\"amount\":\"312.50\""));
    }

    #[test]
    fn test_draft_period() {
        let draft = SalarySlipDraft {
            employee_id: "HR-EMP-0001".to_string(),
            company: "Acme Ltd".to_string(),
            period_start: NaiveDate::from_ymd_opt(2026, 4, 1).unwrap(),
            period_end: NaiveDate::from_ymd_opt(2026, 4, 30).unwrap(),
            base: Decimal::new(3000, 0),
            earnings: vec![],
            deductions: vec![],
        };
        assert_eq!(draft.period().month(), 4);
    }
}
