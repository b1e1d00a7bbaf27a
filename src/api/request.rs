//! Request types for the generation API.
//!
//! This module defines the JSON request bodies for `/generate` and
//! `/percentages/:component`.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::PayrollError;
use crate::generation::GenerationRequest;
use crate::models::PayPeriod;

fn default_true() -> bool {
    true
}

/// Request body for `POST /generate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    /// First day of the target period (inclusive).
    pub start_date: NaiveDate,
    /// Last day of the target period (inclusive).
    pub end_date: NaiveDate,
    /// Delete and recreate existing slips in the period.
    #[serde(default)]
    pub overwrite: bool,
    /// Base applied to every employee instead of history.
    #[serde(default)]
    pub explicit_base: Option<Decimal>,
    /// Average prior slips instead of copying the most recent one.
    #[serde(default)]
    pub use_average_salary: bool,
    /// Fold stored percentage overrides into the slips.
    #[serde(default = "default_true")]
    pub apply_percentages: bool,
}

impl TryFrom<GenerateRequest> for GenerationRequest {
    type Error = PayrollError;

    fn try_from(req: GenerateRequest) -> Result<Self, Self::Error> {
        let request = GenerationRequest {
            period: PayPeriod::new(req.start_date, req.end_date)?,
            overwrite: req.overwrite,
            explicit_base: req.explicit_base,
            use_average_salary: req.use_average_salary,
            apply_percentages: req.apply_percentages,
        };
        request.validate()?;
        Ok(request)
    }
}

/// One raw percentage entry as submitted by a client.
///
/// Accepts a JSON number, a string (possibly empty) or `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawPercentage {
    /// A JSON number such as `10.5`.
    Number(serde_json::Number),
    /// Free text such as `"10.5"`, `""` or `"abc"`.
    Text(String),
    /// `null`, treated as an empty entry.
    Empty,
}

impl RawPercentage {
    /// The entry as text, ready for percentage parsing.
    pub fn as_text(&self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s.clone(),
            Self::Empty => String::new(),
        }
    }
}

/// Request body for `PUT /percentages/:component`.
///
/// Keys are calendar months (`"1"` to `"12"`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PercentagesRequest {
    /// Month → raw percentage.
    pub percentages: BTreeMap<u32, RawPercentage>,
}

impl PercentagesRequest {
    /// The entries as `(month, text)` pairs.
    pub fn entries(&self) -> Vec<(u32, String)> {
        self.percentages
            .iter()
            .map(|(month, raw)| (*month, raw.as_text()))
            .collect()
    }
}
