//! HTTP API module for the Payroll Engine.
//!
//! This module provides the REST API endpoints for running salary slip
//! generation and maintaining percentage overrides.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{GenerateRequest, PercentagesRequest, RawPercentage};
pub use response::{ApiError, ApiErrorResponse, DeletedResponse, PercentagesResponse};
pub use state::AppState;
