//! Salary base resolution.
//!
//! This module provides the [`SalaryBaseResolver`], which decides the base
//! amount and component breakdown of a new slip for one employee and one
//! target period.

use std::cmp::Ordering;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use crate::backend::PayrollBackend;
use crate::config::{AverageComponentMode, HistoryConfig};
use crate::error::{PayrollError, PayrollResult};
use crate::models::{PayPeriod, SlipComponent, SlipDetail, SlipSummary};

/// Where a resolved base came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BaseSource {
    /// Supplied by the caller for the whole run.
    Explicit,
    /// The employee's structure assignment; no submitted history exists.
    StructureAssignment {
        /// Name of the assigned structure.
        structure_name: String,
    },
    /// Copied from the most recent prior submitted slip.
    MostRecent {
        /// The slip copied.
        slip_id: String,
    },
    /// Averaged over the most recent prior submitted slips.
    Average {
        /// The slips averaged, most recent first.
        slip_ids: Vec<String>,
    },
}

/// The base amount and component breakdown for a new slip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedBase {
    /// The slip base.
    pub base: Decimal,
    /// Earning lines.
    pub earnings: Vec<SlipComponent>,
    /// Deduction lines.
    pub deductions: Vec<SlipComponent>,
    /// How the base was derived.
    pub source: BaseSource,
}

impl ResolvedBase {
    fn without_components(base: Decimal, source: BaseSource) -> Self {
        Self {
            base,
            earnings: Vec::new(),
            deductions: Vec::new(),
            source,
        }
    }
}

/// Sorts slips most recent first: by period start descending, then by slip
/// id descending so slips sharing a start date order deterministically.
///
/// Ids are compared with [`compare_slip_ids`], so `SLIP-10` ranks above
/// `SLIP-9` even when the backend does not zero-pad its ids.
pub fn order_most_recent_first(slips: &mut [SlipSummary]) {
    slips.sort_by(|a, b| {
        b.period_start
            .cmp(&a.period_start)
            .then_with(|| compare_slip_ids(&b.id, &a.id))
    });
}

/// Orders slip ids by their non-numeric prefix, then by the value of their
/// trailing digits, then as plain text.
///
/// # Example
///
/// ```
/// use std::cmp::Ordering;
/// use payroll_engine::generation::compare_slip_ids;
///
/// assert_eq!(compare_slip_ids("SLIP-10", "SLIP-9"), Ordering::Greater);
/// assert_eq!(compare_slip_ids("SLIP-00010", "SLIP-9"), Ordering::Greater);
/// assert_eq!(compare_slip_ids("A", "B"), Ordering::Less);
/// ```
pub fn compare_slip_ids(a: &str, b: &str) -> Ordering {
    let (prefix_a, number_a) = split_numeric_suffix(a);
    let (prefix_b, number_b) = split_numeric_suffix(b);
    prefix_a
        .cmp(prefix_b)
        .then_with(|| number_a.cmp(&number_b))
        .then_with(|| a.cmp(b))
}

fn split_numeric_suffix(id: &str) -> (&str, Option<u128>) {
    let prefix = id.trim_end_matches(|c: char| c.is_ascii_digit());
    (prefix, id[prefix.len()..].parse().ok())
}

/// Resolves the base of a new slip from an explicit amount or from history.
///
/// Resolution order:
/// 1. An explicit base is used verbatim, with no component lines.
/// 2. Otherwise the employee's prior submitted slips (period start strictly
///    before the target period) are consulted. With none, the structure
///    assignment's base is used, with no component lines.
/// 3. In average mode the bases of the last `average_window` prior slips are
///    averaged; components follow [`AverageComponentMode`].
/// 4. Otherwise the most recent prior slip is copied verbatim.
pub struct SalaryBaseResolver {
    backend: Arc<dyn PayrollBackend>,
    history: HistoryConfig,
}

impl SalaryBaseResolver {
    /// Creates a resolver over the given backend.
    pub fn new(backend: Arc<dyn PayrollBackend>, history: HistoryConfig) -> Self {
        Self { backend, history }
    }

    /// Resolves the base for one employee and target period.
    ///
    /// # Errors
    ///
    /// - [`PayrollError::NotFound`] if no explicit base was given and the
    ///   employee has neither a structure assignment nor prior submitted slips.
    /// - [`PayrollError::Backend`] if any backend call fails.
    pub fn resolve(
        &self,
        employee_id: &str,
        period: &PayPeriod,
        explicit_base: Option<Decimal>,
        use_average_salary: bool,
    ) -> PayrollResult<ResolvedBase> {
        if let Some(base) = explicit_base {
            debug!(employee_id = %employee_id, base = %base, "Using explicit base");
            return Ok(ResolvedBase::without_components(base, BaseSource::Explicit));
        }

        let assignment = self
            .backend
            .get_employee_salary_structure_assignment(employee_id)?;
        let prior = self.prior_submitted_slips(employee_id, period)?;

        if prior.is_empty() {
            return match assignment {
                Some(assignment) => {
                    debug!(
                        employee_id = %employee_id,
                        structure = %assignment.structure_name,
                        "No submitted history, using structure assignment"
                    );
                    Ok(ResolvedBase::without_components(
                        assignment.base,
                        BaseSource::StructureAssignment {
                            structure_name: assignment.structure_name,
                        },
                    ))
                }
                None => Err(PayrollError::NotFound {
                    employee_id: employee_id.to_string(),
                    message: "no salary structure assignment and no submitted salary slip"
                        .to_string(),
                }),
            };
        }

        if use_average_salary {
            self.average(&prior)
        } else {
            self.most_recent(&prior[0])
        }
    }

    /// Submitted slips starting before the target period, most recent first.
    fn prior_submitted_slips(
        &self,
        employee_id: &str,
        period: &PayPeriod,
    ) -> PayrollResult<Vec<SlipSummary>> {
        let mut slips: Vec<SlipSummary> = self
            .backend
            .get_salary_slips_for_employee(employee_id)?
            .into_iter()
            .filter(|s| s.is_submitted() && s.period_start < period.start_date)
            .collect();
        order_most_recent_first(&mut slips);
        Ok(slips)
    }

    fn most_recent(&self, slip: &SlipSummary) -> PayrollResult<ResolvedBase> {
        let detail = self.backend.get_salary_slip_details(&slip.id)?;
        Ok(ResolvedBase {
            base: detail.base,
            earnings: detail.earnings,
            deductions: detail.deductions,
            source: BaseSource::MostRecent {
                slip_id: slip.id.clone(),
            },
        })
    }

    fn average(&self, prior: &[SlipSummary]) -> PayrollResult<ResolvedBase> {
        let window = &prior[..prior.len().min(self.history.average_window.max(1))];
        let details = window
            .iter()
            .map(|s| self.backend.get_salary_slip_details(&s.id))
            .collect::<PayrollResult<Vec<SlipDetail>>>()?;

        let base = mean(details.iter().map(|d| d.base), details.len())
            .ok_or_else(|| {
                PayrollError::arithmetic(format!("averaging {} slip bases", details.len()))
            })?;

        let (earnings, deductions) = match self.history.average_components {
            AverageComponentMode::Empty => (Vec::new(), Vec::new()),
            AverageComponentMode::MostRecent => {
                (details[0].earnings.clone(), details[0].deductions.clone())
            }
            AverageComponentMode::Averaged => (
                average_lines(&details, |d| &d.earnings)?,
                average_lines(&details, |d| &d.deductions)?,
            ),
        };

        Ok(ResolvedBase {
            base,
            earnings,
            deductions,
            source: BaseSource::Average {
                slip_ids: window.iter().map(|s| s.id.clone()).collect(),
            },
        })
    }
}

/// Sum of `values` divided by `count`; `None` on overflow or a zero count.
fn mean(values: impl IntoIterator<Item = Decimal>, count: usize) -> Option<Decimal> {
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |sum, value| sum.checked_add(value))?
        .checked_div(Decimal::from(count))
}

/// Averages each component across all slips; a component missing from a
/// slip counts as zero there. Components keep first-seen order.
fn average_lines(
    details: &[SlipDetail],
    lines: impl Fn(&SlipDetail) -> &Vec<SlipComponent>,
) -> PayrollResult<Vec<SlipComponent>> {
    let mut names: Vec<&str> = Vec::new();
    for detail in details {
        for line in lines(detail) {
            if !names.contains(&line.component.as_str()) {
                names.push(&line.component);
            }
        }
    }

    names
        .into_iter()
        .map(|name| {
            let amounts = details.iter().flat_map(|detail| {
                lines(detail)
                    .iter()
                    .filter(move |line| line.component == name)
                    .map(|line| line.amount)
            });
            mean(amounts, details.len())
                .map(|amount| SlipComponent::new(name, amount))
                .ok_or_else(|| PayrollError::arithmetic(format!("averaging component '{}'", name)))
        })
        .collect()
}
