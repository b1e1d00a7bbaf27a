//! Salary slip generation.
//!
//! - [`SlipReconciler`]: skip, create, or delete-then-create per employee
//! - [`SalaryBaseResolver`]: base and components from an explicit amount or history
//! - [`GenerationOrchestrator`]: the run over all active employees

mod orchestrator;
mod reconciler;
mod resolver;

pub use orchestrator::{GenerationOrchestrator, GenerationRequest, apply_adjustments};
pub use reconciler::{ReconcileAction, Reconciliation, SlipReconciler};
pub use resolver::{
    BaseSource, ResolvedBase, SalaryBaseResolver, compare_slip_ids, order_most_recent_first,
};
