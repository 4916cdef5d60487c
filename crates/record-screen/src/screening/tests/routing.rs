use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use super::common::{read_json_body, rules, sample_check, CannedSource};
use crate::screening::engine::ScreeningEngine;
use crate::screening::router::screening_router;

fn router() -> Router {
    let engine = Arc::new(ScreeningEngine::new(rules()));
    let source = Arc::new(CannedSource::with("employee-screening-001", sample_check()));
    screening_router(engine, source)
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(body).expect("body serializes")))
        .expect("request builds")
}

#[tokio::test]
async fn assess_route_scores_a_posted_document() {
    let response = router()
        .oneshot(post_json(
            "/api/v1/screenings/assess",
            &json!({ "document": sample_check(), "as_of": "2023-09-01" }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["overall_risk_level"], "Low");
    assert_eq!(payload["summary"]["total_cases"], 3);
    assert_eq!(payload["processed_cases"]["Low"][0]["risk_score"], 11.25);
    assert_eq!(payload["processed_cases"]["High"], json!([]));
}

#[tokio::test]
async fn assess_route_rejects_malformed_documents() {
    let response = router()
        .oneshot(post_json(
            "/api/v1/screenings/assess",
            &json!({ "document": { "results": 42 } }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert!(payload["error"]
        .as_str()
        .expect("error message")
        .contains("expected schema"));
}

#[tokio::test]
async fn check_route_returns_full_report() {
    let response = router()
        .oneshot(post_json(
            "/api/v1/screenings",
            &json!({
                "first_name": "John",
                "last_name": "Doe",
                "dob": "1990-01-15",
                "reference_id": "employee-screening-001",
            }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(
        payload["checkr_check_id"],
        "5448da6a-a432-4a6e-9843-641d5e2fdd80"
    );
    assert_eq!(payload["person_info"]["dob"], "19900115");
    assert_eq!(payload["checkr_response"]["results_info"]["records_found"], 3);
    assert!(payload["execution_time_seconds"].as_f64().is_some());
}

#[tokio::test]
async fn check_route_maps_missing_names_to_unprocessable() {
    let response = router()
        .oneshot(post_json(
            "/api/v1/screenings",
            &json!({ "first_name": "John", "last_name": "   " }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn check_route_maps_unknown_people_to_not_found() {
    let response = router()
        .oneshot(post_json(
            "/api/v1/screenings",
            &json!({ "first_name": "Jane", "last_name": "Roe", "reference_id": "nobody" }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let payload = read_json_body(response).await;
    assert!(payload["error"].as_str().expect("error message").contains("nobody"));
}
