//! Configuration loading and management for the Payroll Engine.
//!
//! This module provides functionality to load the generation configuration
//! from YAML: how history is averaged and how stored percentage overrides
//! are folded into generated slips.
//!
//! # Example
//!
//! ```no_run
//! use payroll_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/generation.yaml").unwrap();
//! println!("Base component: {}", config.config().adjustments.base_component);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{AdjustmentConfig, AverageComponentMode, GenerationConfig, HistoryConfig};
