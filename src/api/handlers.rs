//! HTTP request handlers for the generation API.
//!
//! This module contains the handler functions for all API endpoints.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::PayrollResult;
use crate::generation::GenerationRequest;

use super::request::{GenerateRequest, PercentagesRequest};
use super::response::{ApiError, ApiErrorResponse, DeletedResponse, PercentagesResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/generate", post(generate_handler))
        .route("/percentages", get(list_components_handler))
        .route(
            "/percentages/:component",
            get(get_percentages_handler)
                .put(put_percentages_handler)
                .delete(delete_percentages_handler),
        )
        .with_state(state)
}

/// Maps a JSON extraction failure to a 400 response.
fn json_rejection(correlation_id: Uuid, rejection: JsonRejection) -> ApiErrorResponse {
    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") {
                ApiError::new("VALIDATION_ERROR", body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };
    ApiErrorResponse::bad_request(error)
}

/// Runs a backend or storage call on the blocking pool.
///
/// Backend and override storage calls are synchronous; a task that panics
/// becomes a 500 response.
async fn run_blocking<T, F>(correlation_id: Uuid, call: F) -> Result<T, ApiErrorResponse>
where
    F: FnOnce() -> PayrollResult<T> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(call).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => {
            warn!(correlation_id = %correlation_id, error = %err, "Request failed");
            Err(err.into())
        }
        Err(join_err) => {
            warn!(correlation_id = %correlation_id, error = %join_err, "Blocking task aborted");
            Err(ApiErrorResponse::internal("Request task did not complete"))
        }
    }
}

/// Handler for POST /generate.
///
/// Runs one generation pass and returns the aggregate result. Per-employee
/// failures are part of a 200 response; only failures before the first
/// employee is processed produce an error status.
async fn generate_handler(
    State(state): State<AppState>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing generation request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return json_rejection(correlation_id, rejection).into_response(),
    };

    let request = match GenerationRequest::try_from(request) {
        Ok(request) => request,
        Err(err) => {
            warn!(correlation_id = %correlation_id, error = %err, "Invalid generation request");
            return ApiErrorResponse::from(err).into_response();
        }
    };

    let orchestrator = state.orchestrator();
    let start_time = Instant::now();

    match run_blocking(correlation_id, move || orchestrator.generate(&request)).await {
        Ok(result) => {
            info!(
                correlation_id = %correlation_id,
                created = result.created,
                skipped = result.skipped,
                deleted = result.deleted,
                errors = result.errors.len(),
                duration_us = start_time.elapsed().as_micros(),
                "Generation request completed"
            );
            (StatusCode::OK, Json(result)).into_response()
        }
        Err(err) => err.into_response(),
    }
}

/// Handler for GET /percentages.
async fn list_components_handler(State(state): State<AppState>) -> Response {
    let store = state.adjustments().clone();
    match run_blocking(Uuid::new_v4(), move || store.components()).await {
        Ok(components) => (StatusCode::OK, Json(json!({ "components": components }))).into_response(),
        Err(err) => err.into_response(),
    }
}

/// Handler for GET /percentages/:component.
async fn get_percentages_handler(
    State(state): State<AppState>,
    Path(component): Path<String>,
) -> Response {
    let store = state.adjustments().clone();
    let key = component.clone();
    match run_blocking(Uuid::new_v4(), move || store.get(&key)).await {
        Ok(percentages) => (
            StatusCode::OK,
            Json(PercentagesResponse {
                component,
                percentages,
            }),
        )
            .into_response(),
        Err(err) => err.into_response(),
    }
}

/// Handler for PUT /percentages/:component.
///
/// Replaces the component's overrides with the submitted mapping and returns
/// the save report, including any entries that were dropped.
async fn put_percentages_handler(
    State(state): State<AppState>,
    Path(component): Path<String>,
    payload: Result<Json<PercentagesRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(
        correlation_id = %correlation_id,
        component = %component,
        "Processing percentage save request"
    );

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return json_rejection(correlation_id, rejection).into_response(),
    };

    let store = state.adjustments().clone();
    match run_blocking(correlation_id, move || store.save(&component, request.entries())).await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(err) => err.into_response(),
    }
}

/// Handler for DELETE /percentages/:component.
async fn delete_percentages_handler(
    State(state): State<AppState>,
    Path(component): Path<String>,
) -> Response {
    let store = state.adjustments().clone();
    let key = component.clone();
    match run_blocking(Uuid::new_v4(), move || store.delete_all(&key)).await {
        Ok(deleted) => (StatusCode::OK, Json(DeletedResponse { component, deleted })).into_response(),
        Err(err) => err.into_response(),
    }
}
