//! API module for the clinic dashboard
//!
//! Serves the filtered metrics and chart aggregates as JSON.

pub mod handlers;
pub mod service;

pub use service::DashboardService;

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::source::DataSource;

pub fn create_rest_router<S: DataSource>(service: Arc<DashboardService<S>>) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/api/v1/health", get(handlers::health))
        // Filter options
        .route("/api/v1/options", get(handlers::get_options::<S>))
        // Views
        .route("/api/v1/analysis", get(handlers::get_analysis::<S>))
        .route("/api/v1/comparison", get(handlers::get_comparison::<S>))
        // Data table
        .route("/api/v1/records", get(handlers::get_records::<S>))
        .route("/api/v1/summary", get(handlers::get_summary::<S>))
        // State and middleware
        .with_state(service)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Appointment;
    use anyhow::Result;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use chrono::NaiveDate;
    use serde_json::Value;
    use std::time::Duration;
    use tower::ServiceExt;

    struct StaticSource(Vec<Appointment>);

    impl DataSource for StaticSource {
        async fn fetch(&self) -> Result<Vec<Appointment>> {
            Ok(self.0.clone())
        }

        fn describe(&self) -> String {
            "static".to_string()
        }
    }

    struct FailingSource;

    impl DataSource for FailingSource {
        async fn fetch(&self) -> Result<Vec<Appointment>> {
            anyhow::bail!("connection timed out")
        }

        fn describe(&self) -> String {
            "failing".to_string()
        }
    }

    fn appt(day: u32, unit: &str, amount: f64) -> Appointment {
        Appointment {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            unit: unit.to_string(),
            specialty: "Cardiologia".to_string(),
            amount,
            return_days: Some(20.0),
        }
    }

    fn app() -> Router {
        let source = StaticSource(vec![appt(1, "UnitA", 100.0), appt(2, "UnitB", 200.0)]);
        create_rest_router(Arc::new(DashboardService::new(source, Duration::from_secs(300))))
    }

    async fn get_json(router: Router, uri: &str) -> (StatusCode, Value) {
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = get_json(app(), "/api/v1/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_analysis_single_day() {
        let (status, body) =
            get_json(app(), "/api/v1/analysis?start=2024-01-01&end=2024-01-01").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["current"]["count"], 1);
        assert_eq!(body["current"]["total_amount"], 100.0);
        assert_eq!(body["cards"][0]["badge"], "↑ +100.0%");
        assert_eq!(body["prior_period"]["start"], "2023-12-31");
    }

    #[tokio::test]
    async fn test_analysis_extreme_dates() {
        let (status, body) =
            get_json(app(), "/api/v1/analysis?start=%2B200000-01-01&end=-200000-01-01").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["current"]["count"], 0);
        assert_eq!(body["baseline"]["count"], 0);

        let (status, body) =
            get_json(app(), "/api/v1/analysis?start=1900-01-01&end=2100-12-31").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["period"]["start"], "2024-01-01");
        assert_eq!(body["period"]["end"], "2024-01-02");
        assert_eq!(body["current"]["count"], 2);

        let uri = "/api/v1/comparison?a_start=%2B200000-01-01&a_end=-200000-01-01";
        let (status, body) = get_json(app(), uri).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["snapshot_a"]["count"], 0);
    }

    #[tokio::test]
    async fn test_analysis_empty_units_param_means_all() {
        let (_, all) = get_json(app(), "/api/v1/analysis?units=").await;
        let (_, both) = get_json(app(), "/api/v1/analysis?units=UnitA,UnitB").await;
        assert_eq!(all["current"]["count"], 2);
        assert_eq!(all["current"], both["current"]);

        let (_, one) = get_json(app(), "/api/v1/analysis?units=UnitB").await;
        assert_eq!(one["current"]["count"], 1);
    }

    #[tokio::test]
    async fn test_comparison_outer_join() {
        let uri = "/api/v1/comparison?a_start=2024-01-01&a_end=2024-01-01&b_start=2024-01-02&b_end=2024-01-02";
        let (status, body) = get_json(app(), uri).await;
        assert_eq!(status, StatusCode::OK);
        let units = body["count_by_unit"].as_array().unwrap();
        assert_eq!(units.len(), 2);
        assert_eq!(units[0]["group"], "UnitA");
        assert_eq!(units[0]["period_a"], 1);
        assert_eq!(units[0]["period_b"], 0);
        assert_eq!(body["variation"]["total_amount"], 100.0);
    }

    #[tokio::test]
    async fn test_records_and_summary() {
        let (_, records) = get_json(app(), "/api/v1/records?limit=1").await;
        assert_eq!(records["total"], 1);
        assert_eq!(records["records"][0]["date"], "2024-01-02");

        let (_, summary) = get_json(app(), "/api/v1/summary").await;
        assert_eq!(summary["total_records"], 2);
        assert_eq!(summary["total_revenue_display"], "R$ 300,00");

        let (_, options) = get_json(app(), "/api/v1/options").await;
        assert_eq!(options["units"], serde_json::json!(["UnitA", "UnitB"]));
    }

    #[tokio::test]
    async fn test_source_failure_is_unavailable() {
        let router = create_rest_router(Arc::new(DashboardService::new(
            FailingSource,
            Duration::from_secs(300),
        )));
        let (status, body) = get_json(router, "/api/v1/analysis").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        let message = body["error"].as_str().unwrap();
        assert!(message.starts_with("no data available"));
        assert!(message.contains("connection timed out"));
    }
}
