//! Reconciliation against slips that already exist in the target period.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use crate::backend::PayrollBackend;
use crate::error::PayrollResult;
use crate::models::{DeletionOutcome, PayPeriod};

/// What to do for one employee in the target period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconcileAction {
    /// Compose and submit a new slip.
    Create,
    /// Leave the existing slip alone.
    Skip,
}

/// The reconciler's decision plus what it deleted on the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    /// The action to take.
    pub action: ReconcileAction,
    /// Slips deleted (and failed deletions) when overwriting.
    pub deletion: DeletionOutcome,
}

impl Reconciliation {
    /// Number of slips actually deleted.
    pub fn deleted(&self) -> usize {
        self.deletion.deleted_ids.len()
    }
}

/// Decides skip / create / delete-then-create per employee.
pub struct SlipReconciler {
    backend: Arc<dyn PayrollBackend>,
}

impl SlipReconciler {
    /// Creates a reconciler over the given backend.
    pub fn new(backend: Arc<dyn PayrollBackend>) -> Self {
        Self { backend }
    }

    /// Checks the employee's existing slips in `period`.
    ///
    /// No slips → `Create`. Slips and no overwrite → `Skip`. Slips and
    /// overwrite → the slips are deleted and the action is `Create` even if
    /// some deletions failed; those failures are returned in `deletion`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::PayrollError::Backend`] if the existence check
    /// or the delete call itself fails.
    pub fn reconcile(
        &self,
        employee_id: &str,
        period: &PayPeriod,
        overwrite: bool,
    ) -> PayrollResult<Reconciliation> {
        let existing = self
            .backend
            .get_salary_slips(employee_id, period.start_date, period.end_date)?
            .len();

        if existing == 0 {
            return Ok(Reconciliation {
                action: ReconcileAction::Create,
                deletion: DeletionOutcome::default(),
            });
        }

        if !overwrite {
            debug!(employee_id = %employee_id, existing, "Slip exists, skipping");
            return Ok(Reconciliation {
                action: ReconcileAction::Skip,
                deletion: DeletionOutcome::default(),
            });
        }

        let deletion = self.backend.delete_existing_salary_slips(
            employee_id,
            period.start_date,
            period.end_date,
        )?;

        if !deletion.errors.is_empty() {
            warn!(
                employee_id = %employee_id,
                existing,
                deleted = deletion.deleted_ids.len(),
                failed = deletion.errors.len(),
                "Some existing slips could not be deleted"
            );
        }

        Ok(Reconciliation {
            action: ReconcileAction::Create,
            deletion,
        })
    }
}
