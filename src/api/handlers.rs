//! REST API handlers for the clinic dashboard
//!
//! These handlers use the shared DashboardService.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

use super::service::DashboardService;
use crate::dashboard::{
    AnalysisQuery, AnalysisView, ComparisonQuery, ComparisonView, DataSummary, FilterOptions,
};
use crate::filter::UnitSelection;
use crate::models::Appointment;
use crate::source::DataSource;

// ============================================================================
// Response Types
// ============================================================================

#[derive(Serialize)]
pub struct RecordsResponse {
    pub total: usize,
    pub records: Vec<Appointment>,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

/// Data-source failures are the only error a handler can see.
fn unavailable(e: anyhow::Error) -> ApiError {
    warn!("Request failed: {:#}", e);
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(ErrorResponse {
            error: format!("{:#}", e),
        }),
    )
}

// ============================================================================
// Query Parameters
// ============================================================================

#[derive(Deserialize)]
pub struct AnalysisParams {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    /// Comma-separated unit labels; empty means every unit
    pub units: Option<String>,
}

impl From<AnalysisParams> for AnalysisQuery {
    fn from(p: AnalysisParams) -> Self {
        Self {
            start: p.start,
            end: p.end,
            units: p.units.as_deref().map(UnitSelection::parse).unwrap_or_default(),
        }
    }
}

#[derive(Deserialize)]
pub struct ComparisonParams {
    pub a_start: Option<NaiveDate>,
    pub a_end: Option<NaiveDate>,
    pub b_start: Option<NaiveDate>,
    pub b_end: Option<NaiveDate>,
    pub units: Option<String>,
}

impl From<ComparisonParams> for ComparisonQuery {
    fn from(p: ComparisonParams) -> Self {
        Self {
            a_start: p.a_start,
            a_end: p.a_end,
            b_start: p.b_start,
            b_end: p.b_end,
            units: p.units.as_deref().map(UnitSelection::parse).unwrap_or_default(),
        }
    }
}

#[derive(Deserialize)]
pub struct LimitQuery {
    pub limit: Option<usize>,
}

// ============================================================================
// Handlers
// ============================================================================

pub type AppState<S> = Arc<DashboardService<S>>;

/// GET /api/v1/health
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// GET /api/v1/options
pub async fn get_options<S: DataSource>(
    State(service): State<AppState<S>>,
) -> Result<Json<FilterOptions>, ApiError> {
    service.get_options().await.map(Json).map_err(unavailable)
}

/// GET /api/v1/analysis?start=&end=&units=
pub async fn get_analysis<S: DataSource>(
    State(service): State<AppState<S>>,
    Query(params): Query<AnalysisParams>,
) -> Result<Json<AnalysisView>, ApiError> {
    let query = AnalysisQuery::from(params);
    service.get_analysis(&query).await.map(Json).map_err(unavailable)
}

/// GET /api/v1/comparison?a_start=&a_end=&b_start=&b_end=&units=
pub async fn get_comparison<S: DataSource>(
    State(service): State<AppState<S>>,
    Query(params): Query<ComparisonParams>,
) -> Result<Json<ComparisonView>, ApiError> {
    let query = ComparisonQuery::from(params);
    service.get_comparison(&query).await.map(Json).map_err(unavailable)
}

/// GET /api/v1/records?limit=N
pub async fn get_records<S: DataSource>(
    State(service): State<AppState<S>>,
    Query(params): Query<LimitQuery>,
) -> Result<Json<RecordsResponse>, ApiError> {
    let records = service.get_records(params.limit).await.map_err(unavailable)?;
    Ok(Json(RecordsResponse {
        total: records.len(),
        records,
    }))
}

/// GET /api/v1/summary
pub async fn get_summary<S: DataSource>(
    State(service): State<AppState<S>>,
) -> Result<Json<DataSummary>, ApiError> {
    service.get_summary().await.map(Json).map_err(unavailable)
}
