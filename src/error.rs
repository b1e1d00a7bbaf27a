//! Error types for the Payroll Engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur while storing percentage overrides
//! and generating salary slips.

use thiserror::Error;

/// The main error type for the Payroll Engine.
///
/// All fallible operations in the engine return this error type. During a
/// generation run, `Backend` and `NotFound` errors are captured per employee
/// and never abort the run.
///
/// # Example
///
/// ```
/// use payroll_engine::error::PayrollError;
///
/// let error = PayrollError::ConfigNotFound {
///     path: "/missing/generation.yaml".to_string(),
/// };
/// assert_eq!(
///     error.to_string(),
///     "Configuration file not found: /missing/generation.yaml"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PayrollError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed or contained invalid values.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// An input value was rejected (non-numeric percentage, bad month, bad period).
    #[error("Invalid value for '{field}': {message}")]
    Validation {
        /// The field that was invalid.
        field: String,
        /// A description of what made the value invalid.
        message: String,
    },

    /// No salary base could be derived for an employee.
    #[error("No salary base found for employee '{employee_id}': {message}")]
    NotFound {
        /// The employee the lookup was made for.
        employee_id: String,
        /// A description of what was missing.
        message: String,
    },

    /// A call to the external payroll backend failed.
    #[error("Payroll backend call '{operation}' failed: {message}")]
    Backend {
        /// The backend operation that failed (e.g. "add_salary_slip").
        operation: String,
        /// The failure reported by the backend.
        message: String,
    },

    /// A money or percentage computation left the representable range.
    #[error("Arithmetic overflow while {operation}")]
    Arithmetic {
        /// What was being computed (e.g. "scaling 1000 by 5e28%").
        operation: String,
    },

    /// The percentage override repository failed.
    #[error("Override storage error: {message}")]
    Storage {
        /// A description of the storage failure.
        message: String,
    },
}

impl PayrollError {
    /// Shorthand for a [`PayrollError::Backend`] error.
    pub fn backend(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Backend {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Shorthand for a [`PayrollError::Arithmetic`] error.
    pub fn arithmetic(operation: impl Into<String>) -> Self {
        Self::Arithmetic {
            operation: operation.into(),
        }
    }

    /// Shorthand for a [`PayrollError::Validation`] error.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// A type alias for Results that return PayrollError.
pub type PayrollResult<T> = Result<T, PayrollError>;
