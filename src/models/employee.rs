//! Employee model.
//!
//! This module defines the [`Employee`] record returned by the payroll backend
//! when listing the active workforce.

use serde::{Deserialize, Serialize};

/// An active employee eligible for salary slip generation.
///
/// # Examples
///
/// ```
/// use payroll_engine::models::Employee;
///
/// let employee = Employee::new("HR-EMP-0001", "Jane Doe", "Acme Ltd");
/// assert_eq!(employee.id, "HR-EMP-0001");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    /// Unique identifier for the employee in the payroll backend.
    pub id: String,
    /// The employee's display name.
    pub name: String,
    /// The company the employee is paid by.
    pub company: String,
}

impl Employee {
    /// Creates a new employee record.
    pub fn new(id: impl Into<String>, name: impl Into<String>, company: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            company: company.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_employee() {
        let json = r#"{
            "id": "HR-EMP-0001",
            "name": "Jane Doe",
            "company": "Acme Ltd"
        }"#;

        let employee: Employee = serde_json::from_str(json).unwrap();
        assert_eq!(employee, Employee::new("HR-EMP-0001", "Jane Doe", "Acme Ltd"));
    }

    #[test]
    fn test_deserialize_employee_missing_company_fails() {
        let json = r#"{ "id": "HR-EMP-0001", "name": "Jane Doe" }"#;
        assert!(serde_json::from_str::<Employee>(json).is_err());
    }
}
