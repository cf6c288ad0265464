//! Integration tests for the API server surface

#[path = "api_server/test_utils.rs"]
mod test_utils;

use axum::http::StatusCode;
use serde_json::Value;
use test_utils::TestApiServer;

#[tokio::test]
async fn health_endpoint_reports_healthy() {
    let api = TestApiServer::new().await;

    let response = api.server.get("/health").await;
    response.assert_status(StatusCode::OK);

    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "indicatrix-trend-engine");
    assert!(body["uptime_seconds"].is_number());
}

#[tokio::test]
async fn metrics_endpoint_exports_prometheus_text() {
    let api = TestApiServer::new().await;

    // Drive one request through the middleware first
    api.server.get("/health").await.assert_status(StatusCode::OK);

    let response = api.server.get("/metrics").await;
    response.assert_status(StatusCode::OK);
    let body = response.text();
    assert!(body.contains("http_requests_total"));
    assert!(body.contains("recalc_runs_total"));
}

#[tokio::test]
async fn data_endpoints_answer_503_without_a_store() {
    let api = TestApiServer::new().await;

    api.server
        .get("/api/categories/PRODUCTION_TRADE/indicators/cereal%20production")
        .await
        .assert_status(StatusCode::SERVICE_UNAVAILABLE);

    api.server
        .get("/api/categories/PRODUCTION_TRADE/trends")
        .add_query_param("area", "Egypt")
        .await
        .assert_status(StatusCode::SERVICE_UNAVAILABLE);

    api.server
        .post("/api/calc/thresholds")
        .add_query_param("category", "PRODUCTION_TRADE")
        .await
        .assert_status(StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn unknown_routes_answer_404() {
    let api = TestApiServer::new().await;
    api.server
        .get("/api/nope")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}
