//! Override persistence.
//!
//! This module defines the [`OverrideRepository`] trait the adjustment store
//! persists through, and an in-memory implementation of it.

use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};

use crate::error::{PayrollError, PayrollResult};
use crate::models::PercentageOverride;

/// Storage for percentage overrides, unique per (month, component).
pub trait OverrideRepository: Send + Sync {
    /// Replaces every override of `component` with `overrides` as one atomic
    /// unit: readers observe either the old set or the new set, never a
    /// partially cleared one.
    ///
    /// A month present both before and after keeps its original `created_at`.
    fn replace_component(
        &self,
        component: &str,
        overrides: Vec<PercentageOverride>,
    ) -> PayrollResult<()>;

    /// All overrides of a component, ordered by month.
    fn find_by_component(&self, component: &str) -> PayrollResult<Vec<PercentageOverride>>;

    /// The override for one (month, component), if stored.
    fn find(&self, month: u32, component: &str) -> PayrollResult<Option<PercentageOverride>>;

    /// All overrides for a month, ordered by component.
    fn find_by_month(&self, month: u32) -> PayrollResult<Vec<PercentageOverride>>;

    /// Deletes every override of a component, returning how many were removed.
    fn delete_component(&self, component: &str) -> PayrollResult<usize>;

    /// The distinct components that have at least one override, sorted.
    fn components(&self) -> PayrollResult<Vec<String>>;
}

type OverrideKey = (String, u32);

/// An [`OverrideRepository`] held in process memory.
///
/// Replacement happens under a single write lock.
#[derive(Debug, Default)]
pub struct InMemoryOverrideRepository {
    overrides: RwLock<BTreeMap<OverrideKey, PercentageOverride>>,
}

impl InMemoryOverrideRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> PayrollResult<RwLockReadGuard<'_, BTreeMap<OverrideKey, PercentageOverride>>> {
        self.overrides.read().map_err(|e| PayrollError::Storage {
            message: format!("override lock poisoned: {}", e),
        })
    }

    fn write(
        &self,
    ) -> PayrollResult<RwLockWriteGuard<'_, BTreeMap<OverrideKey, PercentageOverride>>> {
        self.overrides.write().map_err(|e| PayrollError::Storage {
            message: format!("override lock poisoned: {}", e),
        })
    }
}

impl OverrideRepository for InMemoryOverrideRepository {
    fn replace_component(
        &self,
        component: &str,
        overrides: Vec<PercentageOverride>,
    ) -> PayrollResult<()> {
        let mut map = self.write()?;

        let previous: HashMap<u32, DateTime<Utc>> = map
            .iter()
            .filter(|((c, _), _)| c == component)
            .map(|((_, month), o)| (*month, o.created_at))
            .collect();
        map.retain(|(c, _), _| c != component);

        for mut over in overrides {
            if let Some(created_at) = previous.get(&over.month) {
                over.created_at = *created_at;
            }
            map.insert((component.to_string(), over.month), over);
        }
        Ok(())
    }

    fn find_by_component(&self, component: &str) -> PayrollResult<Vec<PercentageOverride>> {
        Ok(self
            .read()?
            .iter()
            .filter(|((c, _), _)| c == component)
            .map(|(_, o)| o.clone())
            .collect())
    }

    fn find(&self, month: u32, component: &str) -> PayrollResult<Option<PercentageOverride>> {
        Ok(self.read()?.get(&(component.to_string(), month)).cloned())
    }

    fn find_by_month(&self, month: u32) -> PayrollResult<Vec<PercentageOverride>> {
        Ok(self
            .read()?
            .iter()
            .filter(|((_, m), _)| *m == month)
            .map(|(_, o)| o.clone())
            .collect())
    }

    fn delete_component(&self, component: &str) -> PayrollResult<usize> {
        let mut map = self.write()?;
        let before = map.len();
        map.retain(|(c, _), _| c != component);
        Ok(before - map.len())
    }

    fn components(&self) -> PayrollResult<Vec<String>> {
        let mut components: Vec<String> = self.read()?.keys().map(|(c, _)| c.clone()).collect();
        components.dedup();
        Ok(components)
    }
}
