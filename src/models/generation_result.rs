//! Generation result models.
//!
//! This module contains the [`GenerationResult`] aggregate built once per
//! generation run, and the per-employee [`EmployeeOutcome`] it is folded from.

use serde::{Deserialize, Serialize};

use super::SlipDeletionError;

/// An error recorded against one employee during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationError {
    /// The employee whose processing produced the error.
    pub employee_id: String,
    /// A human-readable description of the failure.
    pub message: String,
}

/// The outcome of processing a single employee.
///
/// Each employee's processing is captured as one of these values and folded
/// into the run's [`GenerationResult`] with [`GenerationResult::record`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmployeeOutcome {
    /// A slip already existed and overwrite was not requested.
    Skipped,
    /// A new slip was created, possibly after deleting existing ones.
    Created {
        /// Identifier of the new slip.
        slip_id: String,
        /// Number of pre-existing slips deleted.
        deleted: usize,
        /// Slips that could not be deleted.
        deletion_errors: Vec<SlipDeletionError>,
    },
    /// Processing failed after any deletions already performed.
    Failed {
        /// Number of pre-existing slips deleted before the failure.
        deleted: usize,
        /// Slips that could not be deleted.
        deletion_errors: Vec<SlipDeletionError>,
        /// A description of the failure.
        message: String,
    },
}

/// Aggregate outcome of one generation run.
///
/// Partial completion is the normal case: some employees created, some
/// skipped, some recorded in `errors`.
///
/// # Example
///
/// ```
/// use payroll_engine::models::{EmployeeOutcome, GenerationResult};
///
/// let mut result = GenerationResult::default();
/// result.record("HR-EMP-0001", EmployeeOutcome::Skipped);
/// assert_eq!(result.skipped, 1);
/// assert!(!result.has_errors());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResult {
    /// Number of slips created.
    pub created: usize,
    /// Number of employees skipped because a slip already existed.
    pub skipped: usize,
    /// Number of pre-existing slips deleted for overwrite.
    pub deleted: usize,
    /// Per-employee errors, in processing order.
    pub errors: Vec<GenerationError>,
}

impl GenerationResult {
    /// Folds one employee's outcome into the aggregate.
    pub fn record(&mut self, employee_id: &str, outcome: EmployeeOutcome) {
        match outcome {
            EmployeeOutcome::Skipped => self.skipped += 1,
            EmployeeOutcome::Created {
                deleted,
                deletion_errors,
                ..
            } => {
                self.record_deletions(employee_id, deleted, deletion_errors);
                self.created += 1;
            }
            EmployeeOutcome::Failed {
                deleted,
                deletion_errors,
                message,
            } => {
                self.record_deletions(employee_id, deleted, deletion_errors);
                self.push_error(employee_id, message);
            }
        }
    }

    fn record_deletions(
        &mut self,
        employee_id: &str,
        deleted: usize,
        deletion_errors: Vec<SlipDeletionError>,
    ) {
        self.deleted += deleted;
        for err in deletion_errors {
            self.push_error(
                employee_id,
                format!("Failed to delete slip '{}': {}", err.slip_id, err.message),
            );
        }
    }

    fn push_error(&mut self, employee_id: &str, message: String) {
        self.errors.push(GenerationError {
            employee_id: employee_id.to_string(),
            message,
        });
    }

    /// Returns true if any error was recorded.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}
