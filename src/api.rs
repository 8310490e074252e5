//! HTTP API for the Tax Engine.
//!
//! This module exposes the calculators as a small JSON API using the
//! [`axum`](https://crates.io/crates/axum) framework, so the web front
//! end can submit forms and receive results.  Reference data (tax
//! configurations, holiday calendar, deadline rules) is loaded once at
//! start-up and shared read-only across requests.

use crate::compliance::{calculate_client_compliance, ClientComplianceResult, ComplianceClient};
use crate::config::TaxConfigSet;
use crate::deadlines::{
    due_date_status, DeadlineEngine, DeadlineStatusInfo, FilingPeriod, FilingType, ServiceType,
    UpcomingDeadline, DEFAULT_DAYS_AHEAD,
};
use crate::engine::process_payroll;
use crate::error::EngineError;
use crate::models::{PayeCalculationResult, PayrollEmployee, PayrollSummary};
use crate::reports::{generate_gra_form7b_csv, generate_nis_cs3_schedule};
use crate::tax::{calculate_paye, GuyanaPayeCalculator};
use crate::vat::{calculate_vat, VatCalculation, VatInput};
use anyhow::{Context, Result};
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

/// Application state shared across requests.
pub struct AppState {
    pub configs: TaxConfigSet,
    pub deadlines: DeadlineEngine,
}

impl AppState {
    pub fn new(configs: TaxConfigSet, deadlines: DeadlineEngine) -> Self {
        Self { configs, deadlines }
    }
}

/// Request failures rendered as `{"error": ...}` with a matching status.
pub enum ApiError {
    Engine(EngineError),
    /// A background payroll task panicked or was cancelled.
    Worker(tokio::task::JoinError),
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        Self::Engine(err)
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Worker(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Engine(err) => {
                let status = match err {
                    EngineError::NoConfigForDate(_) => StatusCode::UNPROCESSABLE_ENTITY,
                    EngineError::InvalidMonth(_)
                    | EngineError::InvalidAmount(_)
                    | EngineError::DateOutOfRange { .. } => StatusCode::BAD_REQUEST,
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, err.to_string())
            }
            Self::Worker(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("payroll worker failed: {err}"),
            ),
        };
        tracing::warn!(%status, error = %message, "request failed");
        (status, Json(json!({ "error": message }))).into_response()
    }
}

type ApiResult<T> = std::result::Result<T, ApiError>;

fn current_date() -> NaiveDate {
    Utc::now().date_naive()
}

#[derive(Debug, Deserialize)]
pub struct PayeRequest {
    pub employee: PayrollEmployee,
    /// Selects the tax configuration; defaults to today.
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct PayrollRequest {
    pub employees: Vec<PayrollEmployee>,
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct VatRequest {
    #[serde(flatten)]
    pub input: VatInput,
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct ComplianceRequest {
    pub client: ComplianceClient,
    pub today: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct UpcomingRequest {
    pub services: Vec<ServiceType>,
    pub days_ahead: Option<i64>,
    pub today: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct NextDueRequest {
    pub filing_type: FilingType,
    pub period: Option<FilingPeriod>,
    pub today: Option<NaiveDate>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NextDueResponse {
    pub filing_type: FilingType,
    pub due_date: NaiveDate,
    pub status: DeadlineStatusInfo,
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub due_date: NaiveDate,
    pub today: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct Cs3Request {
    pub employees: Vec<PayrollEmployee>,
    pub employer_nis: String,
    pub month: u32,
    pub year: i32,
}

/// Build the API router over the given state.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/paye", post(paye_handler))
        .route("/api/payroll", post(payroll_handler))
        .route("/api/vat", post(vat_handler))
        .route("/api/compliance", post(compliance_handler))
        .route("/api/deadlines/upcoming", post(upcoming_handler))
        .route("/api/deadlines/next", post(next_due_handler))
        .route("/api/deadlines/status", post(status_handler))
        .route("/api/reports/form7b", post(form7b_handler))
        .route("/api/reports/cs3", post(cs3_handler))
        .with_state(state)
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn paye_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PayeRequest>,
) -> ApiResult<Json<PayeCalculationResult>> {
    let config = state.configs.for_date(req.date.unwrap_or_else(current_date))?;
    Ok(Json(calculate_paye(&req.employee, config)))
}

/// Run the rayon payroll on the blocking pool so large batches do not
/// stall the async workers.
async fn run_payroll(
    state: &AppState,
    employees: Arc<[PayrollEmployee]>,
    date: NaiveDate,
) -> ApiResult<PayrollSummary> {
    let calculator = GuyanaPayeCalculator::new(state.configs.for_date(date)?.clone());
    let summary =
        tokio::task::spawn_blocking(move || process_payroll(&employees, &calculator)).await?;
    Ok(summary)
}

async fn payroll_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PayrollRequest>,
) -> ApiResult<Json<PayrollSummary>> {
    let date = req.date.unwrap_or_else(current_date);
    let summary = run_payroll(&state, req.employees.into(), date).await?;
    Ok(Json(summary))
}

async fn vat_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<VatRequest>,
) -> ApiResult<Json<VatCalculation>> {
    let config = state.configs.for_date(req.date.unwrap_or_else(current_date))?;
    Ok(Json(calculate_vat(&req.input, config.vat_rate)))
}

async fn compliance_handler(Json(req): Json<ComplianceRequest>) -> Json<ClientComplianceResult> {
    Json(calculate_client_compliance(
        &req.client,
        req.today.unwrap_or_else(current_date),
    ))
}

async fn upcoming_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<UpcomingRequest>,
) -> ApiResult<Json<Vec<UpcomingDeadline>>> {
    let upcoming = state.deadlines.upcoming_deadlines(
        &req.services,
        req.days_ahead.unwrap_or(DEFAULT_DAYS_AHEAD),
        req.today.unwrap_or_else(current_date),
    )?;
    Ok(Json(upcoming))
}

async fn next_due_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NextDueRequest>,
) -> ApiResult<Json<NextDueResponse>> {
    let today = req.today.unwrap_or_else(current_date);
    let due_date = state
        .deadlines
        .next_due_date(req.filing_type, req.period, today)?;
    Ok(Json(NextDueResponse {
        filing_type: req.filing_type,
        due_date,
        status: due_date_status(due_date, today),
    }))
}

async fn status_handler(Json(req): Json<StatusRequest>) -> Json<DeadlineStatusInfo> {
    Json(due_date_status(req.due_date, req.today.unwrap_or_else(current_date)))
}

async fn form7b_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PayrollRequest>,
) -> ApiResult<Response> {
    let employees: Arc<[PayrollEmployee]> = req.employees.into();
    let date = req.date.unwrap_or_else(current_date);
    let summary = run_payroll(&state, Arc::clone(&employees), date).await?;
    let csv = generate_gra_form7b_csv(&summary.results, &employees);
    Ok(([(header::CONTENT_TYPE, "text/csv")], csv).into_response())
}

async fn cs3_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<Cs3Request>,
) -> ApiResult<Response> {
    if !(1..=12).contains(&req.month) {
        return Err(EngineError::InvalidMonth(req.month).into());
    }
    let period_start = NaiveDate::from_ymd_opt(req.year, req.month, 1).ok_or(
        EngineError::DateOutOfRange {
            year: req.year,
            month: req.month,
        },
    )?;
    let employees: Arc<[PayrollEmployee]> = req.employees.into();
    let summary = run_payroll(&state, Arc::clone(&employees), period_start).await?;
    let schedule = generate_nis_cs3_schedule(
        &summary.results,
        &employees,
        &req.employer_nis,
        req.month,
        req.year,
    )?;
    Ok(([(header::CONTENT_TYPE, "text/plain")], schedule).into_response())
}

/// Launch the API server on `addr` and serve until the process is
/// interrupted.
pub async fn serve(addr: &str, state: AppState) -> Result<()> {
    let router = build_router(Arc::new(state));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, router).await?;
    Ok(())
}
