//! Core data models for the Payroll Engine.
//!
//! This module contains all the domain models used throughout the engine.

mod employee;
mod generation_result;
mod pay_period;
mod percentage_override;
mod salary_slip;

pub use employee::Employee;
pub use generation_result::{EmployeeOutcome, GenerationError, GenerationResult};
pub use pay_period::PayPeriod;
pub use percentage_override::PercentageOverride;
pub use salary_slip::{
    CreatedSlip, DeletionOutcome, SalarySlipDraft, SlipComponent, SlipDeletionError, SlipDetail,
    SlipStatus, SlipSummary, StructureAssignment,
};
