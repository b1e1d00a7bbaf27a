//! Integration tests for the Payroll Engine.
//!
//! This test suite drives the public API end to end:
//! - Percentage override storage (in memory and SQLite)
//! - Explicit, most-recent, average and structure-assignment derivation
//! - Skip and overwrite reconciliation
//! - Per-employee error isolation
//! - The HTTP surface over a shared backend and store

use std::str::FromStr;
use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::{Value, json};
use tower::ServiceExt;

use payroll_engine::adjustment::{
    InMemoryOverrideRepository, PercentageAdjustmentStore, SqliteOverrideRepository,
};
use payroll_engine::api::{AppState, create_router};
use payroll_engine::backend::{BackendOperation, InMemoryBackend};
use payroll_engine::config::{AverageComponentMode, ConfigLoader, GenerationConfig};
use payroll_engine::generation::{GenerationOrchestrator, GenerationRequest};
use payroll_engine::models::{Employee, PayPeriod, SlipComponent, StructureAssignment};

// =============================================================================
// Test Helpers
// =============================================================================

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn month_period(month: u32) -> PayPeriod {
    let start = date(2026, month, 1);
    let end = date(2026, month + 1, 1).pred_opt().unwrap();
    PayPeriod::new(start, end).unwrap()
}

fn jane() -> Employee {
    Employee::new("HR-EMP-0001", "Jane Doe", "Acme Ltd")
}

fn line(name: &str, amount: &str) -> SlipComponent {
    SlipComponent::new(name, dec(amount))
}

fn sqlite_store() -> PercentageAdjustmentStore {
    PercentageAdjustmentStore::new(Arc::new(SqliteOverrideRepository::open_in_memory().unwrap()))
}

fn with_history(backend: InMemoryBackend, bases: &[(u32, &str)]) -> InMemoryBackend {
    bases.iter().fold(backend, |backend, (month, base)| {
        let period = month_period(*month);
        backend.with_submitted_slip(
            "HR-EMP-0001",
            period.start_date,
            period.end_date,
            dec(base),
            vec![line("Basic Salary", base), line("Housing", "400")],
            vec![line("Income Tax", "300")],
        )
    })
}

async fn send(router: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json");
    let request = match body {
        Some(body) => builder.body(Body::from(body.to_string())).unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

// =============================================================================
// Percentage Adjustments
// =============================================================================

#[test]
fn test_percentage_round_trip_through_sqlite() {
    let store = sqlite_store();
    store
        .save(
            "Basic Salary",
            [(1, "10.5"), (2, "-5.0"), (3, ""), (4, "0"), (5, "7.25")],
        )
        .unwrap();

    let stored = store.get("Basic Salary").unwrap();
    let months: Vec<u32> = stored.keys().copied().collect();
    assert_eq!(months, vec![1, 2, 4, 5]);
    assert_eq!(stored[&1], dec("10.5"));
    assert_eq!(stored[&2], dec("-5.0"));
    assert_eq!(stored[&4], Decimal::ZERO);
    assert_eq!(stored[&5], dec("7.25"));
}

#[test]
fn test_apply_scales_by_stored_percentage() {
    let store = sqlite_store();

    store.save("Basic Salary", [(6, "10")]).unwrap();
    assert_eq!(store.apply(dec("1000"), 6, "Basic Salary").unwrap(), dec("1100"));

    store.save("Basic Salary", [(6, "-15")]).unwrap();
    assert_eq!(store.apply(dec("1000"), 6, "Basic Salary").unwrap(), dec("850"));

    assert_eq!(store.apply(dec("1000"), 7, "Basic Salary").unwrap(), dec("1000"));
}

#[test]
fn test_has_follows_get() {
    let store = sqlite_store();
    assert!(!store.has("Bonus").unwrap());

    store.save("Bonus", [(1, "5")]).unwrap();
    assert!(store.has("Bonus").unwrap());

    store.save("Bonus", [(1, "")]).unwrap();
    assert!(store.get("Bonus").unwrap().is_empty());
    assert!(!store.has("Bonus").unwrap());
}

#[test]
fn test_sqlite_overrides_survive_reopen() {
    let dir = std::env::temp_dir().join(format!("payroll-engine-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("overrides.db");

    {
        let store =
            PercentageAdjustmentStore::new(Arc::new(SqliteOverrideRepository::open(&path).unwrap()));
        store.save("Housing", [(3, "12.5")]).unwrap();
    }

    let store =
        PercentageAdjustmentStore::new(Arc::new(SqliteOverrideRepository::open(&path).unwrap()));
    assert_eq!(store.get("Housing").unwrap()[&3], dec("12.5"));

    std::fs::remove_dir_all(&dir).unwrap();
}

// =============================================================================
// Generation Scenarios
// =============================================================================

#[test]
fn test_explicit_base_scenario() {
    let backend = Arc::new(InMemoryBackend::new().with_employee(jane()));
    let orchestrator = GenerationOrchestrator::new(backend.clone(), &GenerationConfig::default());

    let result = orchestrator
        .generate(&GenerationRequest {
            explicit_base: Some(dec("3000")),
            ..GenerationRequest::new(month_period(5))
        })
        .unwrap();

    assert_eq!(result.created, 1);
    assert_eq!(result.skipped, 0);
    assert_eq!(result.deleted, 0);
    assert!(result.errors.is_empty());
    assert_eq!(backend.created_drafts()[0].base, dec("3000"));
}

#[test]
fn test_skip_scenario() {
    let backend = Arc::new(with_history(
        InMemoryBackend::new().with_employee(jane()),
        &[(5, "2800")],
    ));
    let orchestrator = GenerationOrchestrator::new(backend.clone(), &GenerationConfig::default());

    let result = orchestrator
        .generate(&GenerationRequest::new(month_period(5)))
        .unwrap();

    assert_eq!(result.created, 0);
    assert_eq!(result.skipped, 1);
    assert_eq!(result.deleted, 0);
    assert_eq!(backend.call_count(BackendOperation::AddSalarySlip), 0);
}

#[test]
fn test_overwrite_scenario() {
    let backend = Arc::new(with_history(
        InMemoryBackend::new().with_employee(jane()),
        &[(4, "2800"), (5, "2900")],
    ));
    let orchestrator = GenerationOrchestrator::new(backend.clone(), &GenerationConfig::default());

    let result = orchestrator
        .generate(&GenerationRequest {
            overwrite: true,
            ..GenerationRequest::new(month_period(5))
        })
        .unwrap();

    assert_eq!(result.deleted, 1);
    assert_eq!(result.created, 1);
    // The replacement is derived from April, the most recent prior slip.
    assert_eq!(backend.created_drafts()[0].base, dec("2800"));
}

#[test]
fn test_most_recent_derivation() {
    let backend = Arc::new(with_history(
        InMemoryBackend::new().with_employee(jane()),
        &[(2, "2600"), (4, "2800"), (3, "2700")],
    ));
    let orchestrator = GenerationOrchestrator::new(backend.clone(), &GenerationConfig::default());

    orchestrator
        .generate(&GenerationRequest::new(month_period(5)))
        .unwrap();

    let draft = &backend.created_drafts()[0];
    assert_eq!(draft.base, dec("2800"));
    assert_eq!(draft.earnings.len(), 2);
    assert_eq!(draft.deductions.len(), 1);
}

#[test]
fn test_average_derivation() {
    let backend = Arc::new(with_history(
        InMemoryBackend::new().with_employee(jane()),
        &[(2, "2600"), (3, "2700"), (4, "2800")],
    ));
    let orchestrator = GenerationOrchestrator::new(backend.clone(), &GenerationConfig::default());

    orchestrator
        .generate(&GenerationRequest {
            use_average_salary: true,
            ..GenerationRequest::new(month_period(5))
        })
        .unwrap();

    let draft = &backend.created_drafts()[0];
    assert!((draft.base - dec("2700")).abs() <= dec("0.01"));
    assert!(draft.earnings.is_empty());
    assert!(draft.deductions.is_empty());
}

#[test]
fn test_average_derivation_with_averaged_components_from_yaml() {
    let yaml = r#"
history:
  average_window: 2
  average_components: averaged
"#;
    let config = ConfigLoader::from_yaml_str(yaml, "inline").unwrap().into_config();
    assert_eq!(config.history.average_components, AverageComponentMode::Averaged);

    let backend = Arc::new(with_history(
        InMemoryBackend::new().with_employee(jane()),
        &[(2, "2600"), (3, "2700"), (4, "2800")],
    ));
    let orchestrator = GenerationOrchestrator::new(backend.clone(), &config);

    orchestrator
        .generate(&GenerationRequest {
            use_average_salary: true,
            ..GenerationRequest::new(month_period(5))
        })
        .unwrap();

    let draft = &backend.created_drafts()[0];
    assert_eq!(draft.base, dec("2750"));
    assert_eq!(draft.earnings[0], line("Basic Salary", "2750"));
    assert_eq!(draft.earnings[1], line("Housing", "400"));
}

#[test]
fn test_structure_assignment_fallback() {
    let backend = Arc::new(InMemoryBackend::new().with_employee(jane()).with_assignment(
        "HR-EMP-0001",
        StructureAssignment {
            structure_name: "Standard".to_string(),
            base: dec("2500"),
        },
    ));
    let orchestrator = GenerationOrchestrator::new(backend.clone(), &GenerationConfig::default());

    let result = orchestrator
        .generate(&GenerationRequest::new(month_period(5)))
        .unwrap();

    assert_eq!(result.created, 1);
    assert_eq!(backend.created_drafts()[0].base, dec("2500"));
}

#[test]
fn test_error_isolation_across_employees() {
    let backend = Arc::new(
        InMemoryBackend::new()
            .with_employee(jane())
            .with_employee(Employee::new("HR-EMP-0002", "John Roe", "Acme Ltd"))
            .with_employee(Employee::new("HR-EMP-0003", "Ann Poe", "Acme Ltd")),
    );
    backend.fail_on(BackendOperation::GetSalarySlips, Some("HR-EMP-0002"));
    let orchestrator = GenerationOrchestrator::new(backend.clone(), &GenerationConfig::default());

    let result = orchestrator
        .generate(&GenerationRequest {
            explicit_base: Some(dec("3000")),
            ..GenerationRequest::new(month_period(5))
        })
        .unwrap();

    assert_eq!(result.created, 2);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].employee_id, "HR-EMP-0002");
}

#[test]
fn test_generation_applies_period_start_month_overrides() {
    let backend = Arc::new(with_history(
        InMemoryBackend::new().with_employee(jane()),
        &[(4, "2000")],
    ));
    let store = PercentageAdjustmentStore::new(Arc::new(InMemoryOverrideRepository::new()));
    store.save("Basic Salary", [(5, "10"), (6, "50")]).unwrap();
    store.save("Housing", [(5, "-25")]).unwrap();

    let orchestrator = GenerationOrchestrator::new(backend.clone(), &GenerationConfig::default())
        .with_adjustments(store);
    orchestrator
        .generate(&GenerationRequest::new(month_period(5)))
        .unwrap();

    let draft = &backend.created_drafts()[0];
    assert_eq!(draft.base, dec("2200"));
    assert_eq!(draft.earnings[0], line("Basic Salary", "2200"));
    assert_eq!(draft.earnings[1], line("Housing", "300"));
    assert_eq!(draft.deductions[0], line("Income Tax", "300"));
}

// =============================================================================
// HTTP API
// =============================================================================

#[tokio::test]
async fn test_api_percentages_then_generate() {
    let backend = Arc::new(InMemoryBackend::new().with_employee(jane()));
    let config = ConfigLoader::load("./config/generation.yaml")
        .unwrap()
        .into_config();
    let router = create_router(AppState::new(backend.clone(), sqlite_store(), config));

    let (status, report) = send(
        router.clone(),
        "PUT",
        "/percentages/Basic%20Salary",
        Some(json!({ "percentages": { "5": "20", "6": "" } })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["saved"], 1);
    assert_eq!(report["empty"], 1);

    let (status, stored) = send(router.clone(), "GET", "/percentages/Basic%20Salary", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stored["percentages"]["5"], "20");

    let (status, result) = send(
        router.clone(),
        "POST",
        "/generate",
        Some(json!({
            "start_date": "2026-05-01",
            "end_date": "2026-05-31",
            "explicit_base": "3000"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["created"], 1);
    assert_eq!(backend.created_drafts()[0].base, dec("3600"));

    let (status, result) = send(
        router,
        "POST",
        "/generate",
        Some(json!({
            "start_date": "2026-05-01",
            "end_date": "2026-05-31",
            "explicit_base": "3000"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["created"], 0);
    assert_eq!(result["skipped"], 1);
}

#[tokio::test]
async fn test_api_backend_outage_returns_502() {
    let backend = Arc::new(InMemoryBackend::new().with_employee(jane()));
    backend.fail_on(BackendOperation::GetActiveEmployees, None);
    let router = create_router(AppState::new(
        backend,
        sqlite_store(),
        GenerationConfig::default(),
    ));

    let (status, error) = send(
        router,
        "POST",
        "/generate",
        Some(json!({ "start_date": "2026-05-01", "end_date": "2026-05-31" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(error["code"], "BACKEND_ERROR");
}
