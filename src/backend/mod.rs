//! The external payroll backend boundary.
//!
//! The engine never talks to the payroll system directly; every external
//! fact (employees, slips, structure assignments) and every write (slip
//! creation and deletion) goes through the [`PayrollBackend`] trait. Each
//! component receives the backend explicitly, so tests substitute
//! [`InMemoryBackend`].

mod memory;

use chrono::NaiveDate;

use crate::error::PayrollResult;
use crate::models::{
    CreatedSlip, DeletionOutcome, Employee, SalarySlipDraft, SlipDetail, SlipSummary,
    StructureAssignment,
};

pub use memory::{BackendOperation, InMemoryBackend};

/// Request/response access to the payroll system of record.
///
/// Every call is synchronous: the caller blocks until the exchange completes
/// or fails. Failures are reported as [`crate::error::PayrollError::Backend`].
pub trait PayrollBackend: Send + Sync {
    /// Lists the employees currently eligible for payroll.
    fn get_active_employees(&self) -> PayrollResult<Vec<Employee>>;

    /// Lists the slips of an employee that cover exactly the given period.
    fn get_salary_slips(
        &self,
        employee_id: &str,
        period_start: NaiveDate,
        period_end: NaiveDate,
    ) -> PayrollResult<Vec<SlipSummary>>;

    /// Deletes every slip of an employee in the given period.
    ///
    /// Per-slip failures are reported in the outcome rather than as an error.
    fn delete_existing_salary_slips(
        &self,
        employee_id: &str,
        period_start: NaiveDate,
        period_end: NaiveDate,
    ) -> PayrollResult<DeletionOutcome>;

    /// Returns the employee's salary structure assignment, if any.
    fn get_employee_salary_structure_assignment(
        &self,
        employee_id: &str,
    ) -> PayrollResult<Option<StructureAssignment>>;

    /// Lists all slips of an employee, in any status and any order.
    fn get_salary_slips_for_employee(&self, employee_id: &str) -> PayrollResult<Vec<SlipSummary>>;

    /// Returns the full content of a slip.
    fn get_salary_slip_details(&self, slip_id: &str) -> PayrollResult<SlipDetail>;

    /// Persists a draft and returns the identifier assigned to it.
    fn add_salary_slip(&self, draft: &SalarySlipDraft) -> PayrollResult<CreatedSlip>;
}
