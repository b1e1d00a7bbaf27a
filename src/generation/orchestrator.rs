//! The generation run.
//!
//! [`GenerationOrchestrator`] walks the active employees one at a time,
//! reconciles each against existing slips, resolves a base, folds in stored
//! percentage overrides and submits the resulting draft. Each employee's
//! processing ends in an [`EmployeeOutcome`] that is folded into the run's
//! [`GenerationResult`]; a failing employee never stops the run.

use std::sync::Arc;
use std::time::Instant;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::adjustment::{MonthAdjustments, PercentageAdjustmentStore};
use crate::backend::PayrollBackend;
use crate::config::{AdjustmentConfig, GenerationConfig};
use crate::error::{PayrollError, PayrollResult};
use crate::models::{
    CreatedSlip, Employee, EmployeeOutcome, GenerationResult, PayPeriod, SalarySlipDraft,
};

use super::reconciler::{ReconcileAction, SlipReconciler};
use super::resolver::{ResolvedBase, SalaryBaseResolver};

fn default_apply_percentages() -> bool {
    true
}

/// Parameters of one generation run.
///
/// # Example
///
/// ```
/// use payroll_engine::generation::GenerationRequest;
/// use payroll_engine::models::PayPeriod;
/// use chrono::NaiveDate;
///
/// let period = PayPeriod::new(
///     NaiveDate::from_ymd_opt(2026, 4, 1).unwrap(),
///     NaiveDate::from_ymd_opt(2026, 4, 30).unwrap(),
/// )
/// .unwrap();
/// let request = GenerationRequest::new(period);
/// assert!(!request.overwrite);
/// assert!(request.apply_percentages);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// The target period.
    pub period: PayPeriod,
    /// Delete and recreate slips that already exist in the period.
    #[serde(default)]
    pub overwrite: bool,
    /// A base applied to every employee instead of deriving one from history.
    #[serde(default)]
    pub explicit_base: Option<Decimal>,
    /// Average the last N prior slips instead of copying the most recent one.
    #[serde(default)]
    pub use_average_salary: bool,
    /// Fold stored percentage overrides into the generated slips.
    #[serde(default = "default_apply_percentages")]
    pub apply_percentages: bool,
}

impl GenerationRequest {
    /// A request for `period` with default options.
    pub fn new(period: PayPeriod) -> Self {
        Self {
            period,
            overwrite: false,
            explicit_base: None,
            use_average_salary: false,
            apply_percentages: true,
        }
    }

    /// Checks the period bounds and the explicit base.
    pub fn validate(&self) -> PayrollResult<()> {
        self.period.validate()?;
        match self.explicit_base {
            Some(base) if base < Decimal::ZERO => Err(PayrollError::validation(
                "explicit_base",
                format!("{} must not be negative", base),
            )),
            _ => Ok(()),
        }
    }
}

/// Scales the base and component lines by the month's overrides.
///
/// The base uses the override of `config.base_component`; each line uses
/// the override of its own component name. Either side can be disabled.
///
/// # Errors
///
/// Returns [`PayrollError::Arithmetic`] if any scaled amount overflows.
pub fn apply_adjustments(
    mut resolved: ResolvedBase,
    adjustments: &MonthAdjustments,
    config: &AdjustmentConfig,
) -> PayrollResult<ResolvedBase> {
    if config.scale_base {
        resolved.base = adjustments.apply(resolved.base, &config.base_component)?;
    }
    if config.scale_components {
        for line in resolved
            .earnings
            .iter_mut()
            .chain(resolved.deductions.iter_mut())
        {
            line.amount = adjustments.apply(line.amount, &line.component)?;
        }
    }
    Ok(resolved)
}

/// Runs salary slip generation over the active employees.
///
/// Components receive the backend explicitly; percentage overrides are
/// optional and attached with [`GenerationOrchestrator::with_adjustments`].
pub struct GenerationOrchestrator {
    backend: Arc<dyn PayrollBackend>,
    reconciler: SlipReconciler,
    resolver: SalaryBaseResolver,
    adjustments: Option<PercentageAdjustmentStore>,
    adjustment_config: AdjustmentConfig,
}

impl GenerationOrchestrator {
    /// Creates an orchestrator over the given backend and configuration.
    pub fn new(backend: Arc<dyn PayrollBackend>, config: &GenerationConfig) -> Self {
        Self {
            reconciler: SlipReconciler::new(backend.clone()),
            resolver: SalaryBaseResolver::new(backend.clone(), config.history.clone()),
            backend,
            adjustments: None,
            adjustment_config: config.adjustments.clone(),
        }
    }

    /// Attaches the percentage adjustment store used to scale generated slips.
    pub fn with_adjustments(mut self, store: PercentageAdjustmentStore) -> Self {
        self.adjustments = Some(store);
        self
    }

    /// Runs one generation pass.
    ///
    /// Employees are processed sequentially in the order the backend returns
    /// them, so counts and error order are reproducible.
    ///
    /// # Errors
    ///
    /// Only failures before the first employee is processed are returned:
    /// an invalid request, a failed active-employee fetch, or a failed
    /// override snapshot. Per-employee failures land in
    /// [`GenerationResult::errors`].
    pub fn generate(&self, request: &GenerationRequest) -> PayrollResult<GenerationResult> {
        request.validate()?;

        let run_id = Uuid::new_v4();
        let start_time = Instant::now();

        let employees = self.backend.get_active_employees()?;
        let adjustments = self.month_adjustments(request)?;

        info!(
            run_id = %run_id,
            employees = employees.len(),
            period_start = %request.period.start_date,
            period_end = %request.period.end_date,
            overwrite = request.overwrite,
            use_average_salary = request.use_average_salary,
            adjusted = adjustments.is_some(),
            "Starting salary slip generation"
        );

        let mut result = GenerationResult::default();
        for employee in &employees {
            let outcome = self.process_employee(employee, request, adjustments.as_ref());
            match &outcome {
                EmployeeOutcome::Failed { message, .. } => warn!(
                    run_id = %run_id,
                    employee_id = %employee.id,
                    error = %message,
                    "Salary slip generation failed for employee"
                ),
                other => debug!(
                    run_id = %run_id,
                    employee_id = %employee.id,
                    outcome = ?other,
                    "Processed employee"
                ),
            }
            result.record(&employee.id, outcome);
        }

        if result.has_errors() {
            warn!(
                run_id = %run_id,
                created = result.created,
                skipped = result.skipped,
                deleted = result.deleted,
                errors = result.errors.len(),
                duration_us = start_time.elapsed().as_micros(),
                "Salary slip generation completed with errors"
            );
        } else {
            info!(
                run_id = %run_id,
                created = result.created,
                skipped = result.skipped,
                deleted = result.deleted,
                duration_us = start_time.elapsed().as_micros(),
                "Salary slip generation completed"
            );
        }
        Ok(result)
    }

    fn month_adjustments(
        &self,
        request: &GenerationRequest,
    ) -> PayrollResult<Option<MonthAdjustments>> {
        if !request.apply_percentages || !self.adjustment_config.enabled {
            return Ok(None);
        }
        match &self.adjustments {
            Some(store) => {
                let snapshot = store.for_month(request.period.month())?;
                Ok((!snapshot.is_empty()).then_some(snapshot))
            }
            None => Ok(None),
        }
    }

    fn process_employee(
        &self,
        employee: &Employee,
        request: &GenerationRequest,
        adjustments: Option<&MonthAdjustments>,
    ) -> EmployeeOutcome {
        let reconciliation =
            match self
                .reconciler
                .reconcile(&employee.id, &request.period, request.overwrite)
            {
                Ok(reconciliation) => reconciliation,
                Err(err) => {
                    return EmployeeOutcome::Failed {
                        deleted: 0,
                        deletion_errors: Vec::new(),
                        message: err.to_string(),
                    };
                }
            };

        if reconciliation.action == ReconcileAction::Skip {
            return EmployeeOutcome::Skipped;
        }

        let deleted = reconciliation.deleted();
        let deletion_errors = reconciliation.deletion.errors;

        match self.create_slip(employee, request, adjustments) {
            Ok(created) => EmployeeOutcome::Created {
                slip_id: created.id,
                deleted,
                deletion_errors,
            },
            Err(err) => EmployeeOutcome::Failed {
                deleted,
                deletion_errors,
                message: err.to_string(),
            },
        }
    }

    fn create_slip(
        &self,
        employee: &Employee,
        request: &GenerationRequest,
        adjustments: Option<&MonthAdjustments>,
    ) -> PayrollResult<CreatedSlip> {
        let resolved = self.resolver.resolve(
            &employee.id,
            &request.period,
            request.explicit_base,
            request.use_average_salary,
        )?;

        debug!(
            employee_id = %employee.id,
            source = ?resolved.source,
            base = %resolved.base,
            "Resolved salary base"
        );

        let resolved = match adjustments {
            Some(adjustments) => apply_adjustments(resolved, adjustments, &self.adjustment_config)?,
            None => resolved,
        };

        let draft = SalarySlipDraft {
            employee_id: employee.id.clone(),
            company: employee.company.clone(),
            period_start: request.period.start_date,
            period_end: request.period.end_date,
            base: resolved.base,
            earnings: resolved.earnings,
            deductions: resolved.deductions,
        };

        self.backend.add_salary_slip(&draft)
    }
}
