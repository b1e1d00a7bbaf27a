//! Application state for the generation API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use crate::adjustment::PercentageAdjustmentStore;
use crate::backend::PayrollBackend;
use crate::config::GenerationConfig;
use crate::generation::GenerationOrchestrator;

/// Shared application state.
///
/// Holds the payroll backend, the percentage adjustment store and the
/// generation configuration. Cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    backend: Arc<dyn PayrollBackend>,
    adjustments: Arc<PercentageAdjustmentStore>,
    config: Arc<GenerationConfig>,
}

impl AppState {
    /// Creates a new application state.
    pub fn new(
        backend: Arc<dyn PayrollBackend>,
        adjustments: PercentageAdjustmentStore,
        config: GenerationConfig,
    ) -> Self {
        Self {
            backend,
            adjustments: Arc::new(adjustments),
            config: Arc::new(config),
        }
    }

    /// Returns the percentage adjustment store.
    pub fn adjustments(&self) -> &PercentageAdjustmentStore {
        &self.adjustments
    }

    /// Builds an orchestrator wired to this state's backend and store.
    pub fn orchestrator(&self) -> GenerationOrchestrator {
        GenerationOrchestrator::new(self.backend.clone(), &self.config)
            .with_adjustments(PercentageAdjustmentStore::clone(&self.adjustments))
    }
}
