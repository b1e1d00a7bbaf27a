//! SQLite-backed override persistence.
//!
//! Overrides live in one table keyed by `(month, component)`. Percentages
//! are stored as fixed-point text so they read back exactly.

use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{Connection, Row, params};
use rust_decimal::Decimal;

use crate::error::{PayrollError, PayrollResult};
use crate::models::PercentageOverride;

use super::repository::OverrideRepository;

const SELECT_COLUMNS: &str =
    "SELECT month, component, percentage, created_at, updated_at FROM percentage_override";

impl From<rusqlite::Error> for PayrollError {
    fn from(error: rusqlite::Error) -> Self {
        PayrollError::Storage {
            message: error.to_string(),
        }
    }
}

/// An [`OverrideRepository`] persisted in a SQLite database.
///
/// # Example
///
/// ```
/// use payroll_engine::adjustment::{OverrideRepository, SqliteOverrideRepository};
///
/// let repo = SqliteOverrideRepository::open_in_memory()?;
/// assert!(repo.components()?.is_empty());
/// # Ok::<(), payroll_engine::error::PayrollError>(())
/// ```
#[derive(Debug)]
pub struct SqliteOverrideRepository {
    conn: Mutex<Connection>,
}

impl SqliteOverrideRepository {
    /// Opens (or creates) the database file and ensures the table exists.
    pub fn open<P: AsRef<Path>>(path: P) -> PayrollResult<Self> {
        Self::from_connection(Connection::open(path)?)
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> PayrollResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    /// Wraps an existing connection and ensures the table exists.
    pub fn from_connection(conn: Connection) -> PayrollResult<Self> {
        let repo = Self {
            conn: Mutex::new(conn),
        };
        repo.ensure_table()?;
        Ok(repo)
    }

    fn conn(&self) -> PayrollResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| PayrollError::Storage {
            message: format!("connection lock poisoned: {}", e),
        })
    }

    fn ensure_table(&self) -> PayrollResult<()> {
        let conn = self.conn()?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS percentage_override (
              month INTEGER NOT NULL CHECK (month BETWEEN 1 AND 12),
              component TEXT NOT NULL,
              percentage TEXT NOT NULL,
              created_at TEXT NOT NULL,
              updated_at TEXT NOT NULL,
              PRIMARY KEY (month, component)
            );

            CREATE INDEX IF NOT EXISTS idx_percentage_override_component
              ON percentage_override(component);
            "#,
        )?;
        Ok(())
    }

    fn query(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> PayrollResult<Vec<PercentageOverride>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
            .query_map(params, read_row)?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter().map(RawOverride::into_override).collect()
    }
}

struct RawOverride {
    month: u32,
    component: String,
    percentage: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl RawOverride {
    fn into_override(self) -> PayrollResult<PercentageOverride> {
        let percentage =
            Decimal::from_str(&self.percentage).map_err(|e| PayrollError::Storage {
                message: format!(
                    "stored percentage '{}' for ({}, {}) is corrupt: {}",
                    self.percentage, self.month, self.component, e
                ),
            })?;
        Ok(PercentageOverride {
            month: self.month,
            component: self.component,
            percentage,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn read_row(row: &Row<'_>) -> rusqlite::Result<RawOverride> {
    Ok(RawOverride {
        month: row.get(0)?,
        component: row.get(1)?,
        percentage: row.get(2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}

impl OverrideRepository for SqliteOverrideRepository {
    fn replace_component(
        &self,
        component: &str,
        overrides: Vec<PercentageOverride>,
    ) -> PayrollResult<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let previous: HashMap<u32, DateTime<Utc>> = {
            let mut stmt = tx.prepare(
                "SELECT month, created_at FROM percentage_override WHERE component = ?1",
            )?;
            let rows = stmt
                .query_map(params![component], |row| {
                    Ok((row.get::<_, u32>(0)?, row.get::<_, DateTime<Utc>>(1)?))
                })?
                .collect::<Result<HashMap<_, _>, _>>()?;
            rows
        };

        tx.execute(
            "DELETE FROM percentage_override WHERE component = ?1",
            params![component],
        )?;

        {
            let mut insert = tx.prepare(
                r#"
                INSERT INTO percentage_override (month, component, percentage, created_at, updated_at)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
            )?;
            for over in &overrides {
                let created_at = previous.get(&over.month).copied().unwrap_or(over.created_at);
                insert.execute(params![
                    over.month,
                    component,
                    over.percentage.to_string(),
                    created_at,
                    over.updated_at,
                ])?;
            }
        }

        tx.commit()?;
        Ok(())
    }

    fn find_by_component(&self, component: &str) -> PayrollResult<Vec<PercentageOverride>> {
        self.query(
            &format!("{} WHERE component = ?1 ORDER BY month", SELECT_COLUMNS),
            params![component],
        )
    }

    fn find(&self, month: u32, component: &str) -> PayrollResult<Option<PercentageOverride>> {
        Ok(self
            .query(
                &format!("{} WHERE month = ?1 AND component = ?2", SELECT_COLUMNS),
                params![month, component],
            )?
            .into_iter()
            .next())
    }

    fn find_by_month(&self, month: u32) -> PayrollResult<Vec<PercentageOverride>> {
        self.query(
            &format!("{} WHERE month = ?1 ORDER BY component", SELECT_COLUMNS),
            params![month],
        )
    }

    fn delete_component(&self, component: &str) -> PayrollResult<usize> {
        let conn = self.conn()?;
        let deleted = conn.execute(
            "DELETE FROM percentage_override WHERE component = ?1",
            params![component],
        )?;
        Ok(deleted)
    }

    fn components(&self) -> PayrollResult<Vec<String>> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare("SELECT DISTINCT component FROM percentage_override ORDER BY component")?;
        let components = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(components)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn over(month: u32, component: &str, pct: &str) -> PercentageOverride {
        PercentageOverride::new(month, component, dec(pct))
    }

    #[test]
    fn test_replace_and_read_back_exactly() {
        let repo = SqliteOverrideRepository::open_in_memory().unwrap();
        repo.replace_component(
            "Basic Salary",
            vec![over(1, "Basic Salary", "10.50"), over(2, "Basic Salary", "-5.00")],
        )
        .unwrap();

        let stored = repo.find_by_component("Basic Salary").unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].month, 1);
        assert_eq!(stored[0].percentage, dec("10.5"));
        assert_eq!(stored[1].percentage, dec("-5"));
    }

    #[test]
    fn test_replace_is_delete_then_insert() {
        let repo = SqliteOverrideRepository::open_in_memory().unwrap();
        repo.replace_component("Bonus", vec![over(1, "Bonus", "5"), over(2, "Bonus", "6")])
            .unwrap();
        repo.replace_component("Bonus", vec![over(3, "Bonus", "7")])
            .unwrap();

        let months: Vec<u32> = repo
            .find_by_component("Bonus")
            .unwrap()
            .iter()
            .map(|o| o.month)
            .collect();
        assert_eq!(months, vec![3]);
    }

    #[test]
    fn test_replace_keeps_created_at_of_surviving_month() {
        let repo = SqliteOverrideRepository::open_in_memory().unwrap();
        let mut first = over(4, "Bonus", "5");
        first.created_at = first.created_at - Duration::days(10);
        let original = first.created_at;
        repo.replace_component("Bonus", vec![first]).unwrap();
        repo.replace_component("Bonus", vec![over(4, "Bonus", "9")])
            .unwrap();

        let stored = repo.find(4, "Bonus").unwrap().unwrap();
        assert_eq!(stored.created_at, original);
        assert_eq!(stored.percentage, dec("9"));
    }

    #[test]
    fn test_month_out_of_range_is_rejected_by_schema() {
        let repo = SqliteOverrideRepository::open_in_memory().unwrap();
        let result = repo.replace_component("Bonus", vec![over(13, "Bonus", "5")]);
        assert!(matches!(result, Err(PayrollError::Storage { .. })));
        // The transaction rolled back, nothing is stored.
        assert!(repo.find_by_component("Bonus").unwrap().is_empty());
    }

    #[test]
    fn test_failed_replace_keeps_previous_set() {
        let repo = SqliteOverrideRepository::open_in_memory().unwrap();
        repo.replace_component("Bonus", vec![over(1, "Bonus", "5")])
            .unwrap();
        let result =
            repo.replace_component("Bonus", vec![over(2, "Bonus", "6"), over(0, "Bonus", "1")]);
        assert!(result.is_err());

        let stored = repo.find_by_component("Bonus").unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].month, 1);
    }

    #[test]
    fn test_find_by_month_delete_and_components() {
        let repo = SqliteOverrideRepository::open_in_memory().unwrap();
        repo.replace_component("Tax", vec![over(1, "Tax", "-2")])
            .unwrap();
        repo.replace_component("Bonus", vec![over(1, "Bonus", "3"), over(2, "Bonus", "4")])
            .unwrap();

        let january = repo.find_by_month(1).unwrap();
        let names: Vec<&str> = january.iter().map(|o| o.component.as_str()).collect();
        assert_eq!(names, vec!["Bonus", "Tax"]);
        assert_eq!(
            repo.components().unwrap(),
            vec!["Bonus".to_string(), "Tax".to_string()]
        );

        assert_eq!(repo.delete_component("Bonus").unwrap(), 2);
        assert_eq!(repo.components().unwrap(), vec!["Tax".to_string()]);
    }
}
