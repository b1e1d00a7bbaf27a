//! In-memory payroll backend.
//!
//! [`InMemoryBackend`] keeps employees, slips and structure assignments in a
//! mutex-guarded state and implements [`PayrollBackend`] over it. It records
//! every submitted draft and every call, and can be told to fail specific
//! operations, which makes it the substitute backend for tests, benchmarks
//! and the API demo state.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Mutex, MutexGuard};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::debug;

use crate::error::{PayrollError, PayrollResult};
use crate::models::{
    CreatedSlip, DeletionOutcome, Employee, SalarySlipDraft, SlipComponent, SlipDeletionError,
    SlipDetail, SlipStatus, SlipSummary, StructureAssignment,
};

use super::PayrollBackend;

/// The backend calls, used for failure injection and call counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendOperation {
    /// [`PayrollBackend::get_active_employees`]
    GetActiveEmployees,
    /// [`PayrollBackend::get_salary_slips`]
    GetSalarySlips,
    /// [`PayrollBackend::delete_existing_salary_slips`]
    DeleteExistingSalarySlips,
    /// [`PayrollBackend::get_employee_salary_structure_assignment`]
    GetStructureAssignment,
    /// [`PayrollBackend::get_salary_slips_for_employee`]
    GetSalarySlipsForEmployee,
    /// [`PayrollBackend::get_salary_slip_details`]
    GetSalarySlipDetails,
    /// [`PayrollBackend::add_salary_slip`]
    AddSalarySlip,
}

impl BackendOperation {
    /// The operation name used in [`PayrollError::Backend`].
    pub fn name(&self) -> &'static str {
        match self {
            Self::GetActiveEmployees => "get_active_employees",
            Self::GetSalarySlips => "get_salary_slips",
            Self::DeleteExistingSalarySlips => "delete_existing_salary_slips",
            Self::GetStructureAssignment => "get_employee_salary_structure_assignment",
            Self::GetSalarySlipsForEmployee => "get_salary_slips_for_employee",
            Self::GetSalarySlipDetails => "get_salary_slip_details",
            Self::AddSalarySlip => "add_salary_slip",
        }
    }
}

impl fmt::Display for BackendOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone)]
struct StoredSlip {
    summary: SlipSummary,
    detail: SlipDetail,
}

impl StoredSlip {
    /// Cancelled slips neither block generation nor get deleted.
    fn occupies(&self, employee_id: &str, period_start: NaiveDate, period_end: NaiveDate) -> bool {
        self.summary.employee_id == employee_id
            && self.summary.status != SlipStatus::Cancelled
            && self.summary.period_start >= period_start
            && self.summary.period_end <= period_end
    }
}

#[derive(Debug, Default)]
struct BackendState {
    employees: Vec<Employee>,
    slips: Vec<StoredSlip>,
    assignments: HashMap<String, StructureAssignment>,
    created: Vec<SalarySlipDraft>,
    // `None` employee means the operation fails for everyone.
    failures: HashSet<(Option<String>, BackendOperation)>,
    undeletable: HashSet<String>,
    calls: HashMap<BackendOperation, usize>,
    next_id: u64,
}

impl BackendState {
    fn enter(&mut self, op: BackendOperation, employee_id: Option<&str>) -> PayrollResult<()> {
        *self.calls.entry(op).or_insert(0) += 1;

        let fails_for_all = self.failures.contains(&(None, op));
        let fails_for_employee = employee_id
            .is_some_and(|id| self.failures.contains(&(Some(id.to_string()), op)));

        if fails_for_all || fails_for_employee {
            return Err(PayrollError::backend(
                op.name(),
                format!(
                    "injected failure for employee '{}'",
                    employee_id.unwrap_or("*")
                ),
            ));
        }
        Ok(())
    }

    fn allocate_id(&mut self) -> String {
        self.next_id += 1;
        format!("SLIP-{:05}", self.next_id)
    }

    fn push_slip(&mut self, mut summary: SlipSummary, mut detail: SlipDetail) -> String {
        if summary.id.is_empty() {
            summary.id = self.allocate_id();
        }
        detail.id = summary.id.clone();
        let id = summary.id.clone();
        self.slips.push(StoredSlip { summary, detail });
        id
    }
}

/// A thread-safe, in-memory [`PayrollBackend`].
///
/// # Example
///
/// ```
/// use payroll_engine::backend::{InMemoryBackend, PayrollBackend};
/// use payroll_engine::models::{Employee, StructureAssignment};
/// use rust_decimal::Decimal;
///
/// let backend = InMemoryBackend::new()
///     .with_employee(Employee::new("HR-EMP-0001", "Jane Doe", "Acme Ltd"))
///     .with_assignment(
///         "HR-EMP-0001",
///         StructureAssignment {
///             structure_name: "Standard".to_string(),
///             base: Decimal::new(2500, 0),
///         },
///     );
///
/// assert_eq!(backend.get_active_employees().unwrap().len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    state: Mutex<BackendState>,
}

impl InMemoryBackend {
    /// Creates an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    // A panic while holding the lock leaves the state usable; recover it.
    fn state(&self) -> MutexGuard<'_, BackendState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Adds an active employee.
    pub fn with_employee(self, employee: Employee) -> Self {
        self.state().employees.push(employee);
        self
    }

    /// Sets an employee's salary structure assignment.
    pub fn with_assignment(self, employee_id: &str, assignment: StructureAssignment) -> Self {
        self.state()
            .assignments
            .insert(employee_id.to_string(), assignment);
        self
    }

    /// Adds a submitted slip with the given content.
    pub fn with_submitted_slip(
        self,
        employee_id: &str,
        period_start: NaiveDate,
        period_end: NaiveDate,
        base: Decimal,
        earnings: Vec<SlipComponent>,
        deductions: Vec<SlipComponent>,
    ) -> Self {
        self.insert_slip(
            SlipSummary {
                id: String::new(),
                employee_id: employee_id.to_string(),
                period_start,
                period_end,
                status: SlipStatus::Submitted,
            },
            SlipDetail {
                id: String::new(),
                base,
                earnings,
                deductions,
            },
        );
        self
    }

    /// Stores a slip and returns its identifier.
    ///
    /// An empty `summary.id` is replaced by a generated `SLIP-nnnnn` id; the
    /// detail id always follows the summary id.
    pub fn insert_slip(&self, summary: SlipSummary, detail: SlipDetail) -> String {
        self.state().push_slip(summary, detail)
    }

    /// Makes `op` fail for one employee, or for every call when `employee_id` is `None`.
    pub fn fail_on(&self, op: BackendOperation, employee_id: Option<&str>) {
        self.state()
            .failures
            .insert((employee_id.map(str::to_string), op));
    }

    /// Makes deletion of a specific slip fail.
    pub fn mark_undeletable(&self, slip_id: &str) {
        self.state().undeletable.insert(slip_id.to_string());
    }

    /// Every draft accepted by [`PayrollBackend::add_salary_slip`], in order.
    pub fn created_drafts(&self) -> Vec<SalarySlipDraft> {
        self.state().created.clone()
    }

    /// How many times `op` was called, including failed calls.
    pub fn call_count(&self, op: BackendOperation) -> usize {
        self.state().calls.get(&op).copied().unwrap_or(0)
    }

    /// All stored slips of an employee, in insertion order.
    pub fn slips_for(&self, employee_id: &str) -> Vec<SlipSummary> {
        self.state()
            .slips
            .iter()
            .filter(|s| s.summary.employee_id == employee_id)
            .map(|s| s.summary.clone())
            .collect()
    }
}

impl PayrollBackend for InMemoryBackend {
    fn get_active_employees(&self) -> PayrollResult<Vec<Employee>> {
        let mut state = self.state();
        state.enter(BackendOperation::GetActiveEmployees, None)?;
        Ok(state.employees.clone())
    }

    fn get_salary_slips(
        &self,
        employee_id: &str,
        period_start: NaiveDate,
        period_end: NaiveDate,
    ) -> PayrollResult<Vec<SlipSummary>> {
        let mut state = self.state();
        state.enter(BackendOperation::GetSalarySlips, Some(employee_id))?;
        Ok(state
            .slips
            .iter()
            .filter(|s| s.occupies(employee_id, period_start, period_end))
            .map(|s| s.summary.clone())
            .collect())
    }

    fn delete_existing_salary_slips(
        &self,
        employee_id: &str,
        period_start: NaiveDate,
        period_end: NaiveDate,
    ) -> PayrollResult<DeletionOutcome> {
        let mut state = self.state();
        state.enter(BackendOperation::DeleteExistingSalarySlips, Some(employee_id))?;

        let mut outcome = DeletionOutcome::default();
        let undeletable = state.undeletable.clone();
        state.slips.retain(|slip| {
            if !slip.occupies(employee_id, period_start, period_end) {
                return true;
            }
            if undeletable.contains(&slip.summary.id) {
                outcome.errors.push(SlipDeletionError {
                    slip_id: slip.summary.id.clone(),
                    message: "slip is locked by the payroll backend".to_string(),
                });
                return true;
            }
            outcome.deleted_ids.push(slip.summary.id.clone());
            false
        });

        debug!(
            employee_id = %employee_id,
            deleted = outcome.deleted_ids.len(),
            failed = outcome.errors.len(),
            "Deleted slips from in-memory backend"
        );
        Ok(outcome)
    }

    fn get_employee_salary_structure_assignment(
        &self,
        employee_id: &str,
    ) -> PayrollResult<Option<StructureAssignment>> {
        let mut state = self.state();
        state.enter(BackendOperation::GetStructureAssignment, Some(employee_id))?;
        Ok(state.assignments.get(employee_id).cloned())
    }

    fn get_salary_slips_for_employee(&self, employee_id: &str) -> PayrollResult<Vec<SlipSummary>> {
        let mut state = self.state();
        state.enter(BackendOperation::GetSalarySlipsForEmployee, Some(employee_id))?;
        Ok(state
            .slips
            .iter()
            .filter(|s| s.summary.employee_id == employee_id)
            .map(|s| s.summary.clone())
            .collect())
    }

    fn get_salary_slip_details(&self, slip_id: &str) -> PayrollResult<SlipDetail> {
        let mut state = self.state();
        let owner = state
            .slips
            .iter()
            .find(|s| s.summary.id == slip_id)
            .map(|s| s.summary.employee_id.clone());
        state.enter(BackendOperation::GetSalarySlipDetails, owner.as_deref())?;

        state
            .slips
            .iter()
            .find(|s| s.summary.id == slip_id)
            .map(|s| s.detail.clone())
            .ok_or_else(|| {
                PayrollError::backend(
                    BackendOperation::GetSalarySlipDetails.name(),
                    format!("slip '{}' does not exist", slip_id),
                )
            })
    }

    fn add_salary_slip(&self, draft: &SalarySlipDraft) -> PayrollResult<CreatedSlip> {
        let mut state = self.state();
        state.enter(BackendOperation::AddSalarySlip, Some(&draft.employee_id))?;

        let id = state.push_slip(
            SlipSummary {
                id: String::new(),
                employee_id: draft.employee_id.clone(),
                period_start: draft.period_start,
                period_end: draft.period_end,
                status: SlipStatus::Draft,
            },
            SlipDetail {
                id: String::new(),
                base: draft.base,
                earnings: draft.earnings.clone(),
                deductions: draft.deductions.clone(),
            },
        );
        state.created.push(draft.clone());

        Ok(CreatedSlip { id })
    }
}
