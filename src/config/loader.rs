//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading the generation
//! configuration from a YAML file.

use std::fs;
use std::path::Path;

use crate::error::{PayrollError, PayrollResult};

use super::types::GenerationConfig;

/// Loads and provides access to the generation configuration.
///
/// The configuration file looks like:
/// ```text
/// history:
///   average_window: 3
///   average_components: empty   # empty | most_recent | averaged
/// adjustments:
///   enabled: true
///   base_component: Basic Salary
///   scale_base: true
///   scale_components: true
/// ```
///
/// # Example
///
/// ```no_run
/// use payroll_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/generation.yaml")?;
/// println!("Averaging over {} slips", loader.config().history.average_window);
/// # Ok::<(), payroll_engine::error::PayrollError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    config: GenerationConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified file.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` on success, or an error if:
    /// - The file is missing (`ConfigNotFound`)
    /// - The file contains invalid YAML or unknown enum values (`ConfigParseError`)
    /// - A value fails the semantic checks in [`GenerationConfig::check`] (`ConfigParseError`)
    pub fn load<P: AsRef<Path>>(path: P) -> PayrollResult<Self> {
        let path = path.as_ref();
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| PayrollError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        Self::from_yaml_str(&content, &path_str)
    }

    /// Parses configuration from YAML text; `origin` is used in error messages.
    pub fn from_yaml_str(content: &str, origin: &str) -> PayrollResult<Self> {
        let config: GenerationConfig =
            serde_yaml::from_str(content).map_err(|e| PayrollError::ConfigParseError {
                path: origin.to_string(),
                message: e.to_string(),
            })?;

        config
            .check()
            .map_err(|message| PayrollError::ConfigParseError {
                path: origin.to_string(),
                message,
            })?;

        Ok(Self { config })
    }

    /// Returns the loaded configuration.
    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Consumes the loader, returning the configuration.
    pub fn into_config(self) -> GenerationConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AverageComponentMode;

    fn config_path() -> &'static str {
        "./config/generation.yaml"
    }

    #[test]
    fn test_load_bundled_configuration() {
        let result = ConfigLoader::load(config_path());
        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());

        let config = result.unwrap().into_config();
        assert_eq!(config.history.average_window, 3);
        assert_eq!(config.history.average_components, AverageComponentMode::Empty);
        assert_eq!(config.adjustments.base_component, "Basic Salary");
    }

    #[test]
    fn test_load_missing_file_returns_error() {
        let result = ConfigLoader::load("/nonexistent/generation.yaml");
        match result {
            Err(PayrollError::ConfigNotFound { path }) => {
                assert!(path.contains("generation.yaml"));
            }
            other => panic!("Expected ConfigNotFound error, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_yaml_returns_parse_error() {
        let result = ConfigLoader::from_yaml_str("history: [unclosed", "inline");
        assert!(matches!(
            result,
            Err(PayrollError::ConfigParseError { ref path, .. }) if path == "inline"
        ));
    }

    #[test]
    fn test_zero_window_returns_parse_error() {
        let result = ConfigLoader::from_yaml_str("history:\n  average_window: 0\n", "inline");
        match result {
            Err(PayrollError::ConfigParseError { message, .. }) => {
                assert!(message.contains("average_window"));
            }
            other => panic!("Expected ConfigParseError, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let loader = ConfigLoader::from_yaml_str("{}", "inline").unwrap();
        assert_eq!(loader.config(), &GenerationConfig::default());
    }
}
