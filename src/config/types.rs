//! Configuration types for salary slip generation.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from the YAML configuration file. Every section has
//! defaults, so a partial file (or none at all) is valid.

use serde::Deserialize;

/// How earnings and deductions are composed when the base is averaged
/// over several prior slips.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AverageComponentMode {
    /// Leave earnings and deductions empty.
    #[default]
    Empty,
    /// Copy the lines of the newest slip in the averaging window.
    MostRecent,
    /// Average each component across the window; a component missing from
    /// a slip contributes zero for that slip.
    Averaged,
}

/// Settings for deriving a base from slip history.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Number of prior submitted slips averaged in average mode.
    pub average_window: usize,
    /// Component composition used in average mode.
    pub average_components: AverageComponentMode,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            average_window: 3,
            average_components: AverageComponentMode::Empty,
        }
    }
}

/// Settings for folding stored percentage overrides into generated slips.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AdjustmentConfig {
    /// Whether generation applies stored overrides at all.
    pub enabled: bool,
    /// The component key whose override scales the slip base.
    pub base_component: String,
    /// Whether the base is scaled.
    pub scale_base: bool,
    /// Whether earning and deduction lines are scaled.
    pub scale_components: bool,
}

impl Default for AdjustmentConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_component: "Basic Salary".to_string(),
            scale_base: true,
            scale_components: true,
        }
    }
}

/// The complete generation configuration.
///
/// # Example
///
/// ```
/// use payroll_engine::config::{AverageComponentMode, GenerationConfig};
///
/// let config = GenerationConfig::default();
/// assert_eq!(config.history.average_window, 3);
/// assert_eq!(config.history.average_components, AverageComponentMode::Empty);
/// assert_eq!(config.adjustments.base_component, "Basic Salary");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// History derivation settings.
    pub history: HistoryConfig,
    /// Percentage adjustment settings.
    pub adjustments: AdjustmentConfig,
}

impl GenerationConfig {
    /// Checks values that deserialize fine but make no sense.
    ///
    /// Returns a description of the first offending field.
    pub fn check(&self) -> Result<(), String> {
        if self.history.average_window == 0 {
            return Err("history.average_window must be at least 1".to_string());
        }
        if self.adjustments.base_component.trim().is_empty() {
            return Err("adjustments.base_component must not be empty".to_string());
        }
        Ok(())
    }
}
