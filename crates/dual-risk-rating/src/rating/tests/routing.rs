use axum::body::Body;
use axum::extract::State;
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use super::common::*;
use crate::rating::{LoanGradingService, RatingModel, SUBMISSION_ACCEPTED};

fn office_payload() -> Value {
    json!({
        "lineOfBusiness": "CRE",
        "propertyType": "Office",
        "loanType": "Mortgage",
        "dscr": 1.6,
        "occupancy": 96,
        "ltv": 50,
        "qualitativeRatings": {
            "Lease Expiration": 4,
            "Tenant Rating": 4,
            "Number of Units": 4,
            "Collateral Value": 4
        },
        "qualitativeMetrics": {
            "Tenant Rating": "A-"
        },
        "override": { "enabled": false }
    })
}

#[tokio::test]
async fn submit_route_returns_created_receipt() {
    let store = MemoryStore::default();
    let router = grading_router_with_store(store.clone());

    let response = router
        .oneshot(json_post("/submit-loan", &office_payload()))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::CREATED);
    let payload = read_json_body(response).await;
    assert_eq!(payload["message"], json!(SUBMISSION_ACCEPTED));
    assert!(payload["loan_id"]
        .as_str()
        .unwrap_or_default()
        .starts_with("loan-"));

    let records = store.records();
    assert_eq!(records.len(), 1);
    assert_eq!(
        records[0].record.metric_for("TenantRating"),
        Some(&json!("A-"))
    );
}

#[tokio::test]
async fn submit_route_accepts_numeric_metrics() {
    let store = MemoryStore::default();
    let router = grading_router_with_store(store.clone());
    let mut payload = office_payload();
    payload["qualitativeMetrics"]["Number of Units"] = json!(12);

    let response = router
        .oneshot(json_post("/submit-loan", &payload))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::CREATED);
    let records = store.records();
    assert_eq!(records.len(), 1);
    let stored = serde_json::to_value(&records[0]).expect("record serializes");
    assert_eq!(stored["NumberOfUnits_Value"], json!(12.0));
    assert_eq!(stored["TenantRating_Value"], json!("A-"));
}

#[tokio::test]
async fn preview_route_accepts_numeric_metrics() {
    let router = grading_router_with_store(MemoryStore::default());
    let mut payload = office_payload();
    payload["qualitativeMetrics"]["Number of Units"] = json!(12.5);

    let response = router
        .oneshot(json_post("/api/v1/grades/preview", &payload))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn submit_route_maps_duplicate_loans_to_conflict() {
    let router = grading_router_with_store(DuplicateStore);

    let response = router
        .oneshot(json_post("/submit-loan", &office_payload()))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let payload = read_json_body(response).await;
    assert!(payload["error"]
        .as_str()
        .unwrap_or_default()
        .contains("has already been submitted"));
}

#[tokio::test]
async fn submit_route_reports_missing_fields() {
    let router = grading_router_with_store(MemoryStore::default());
    let mut payload = office_payload();
    payload["override"] = json!({ "enabled": true, "brg": 3, "frg": 3, "justification": " " });
    payload
        .as_object_mut()
        .expect("object payload")
        .remove("dscr");

    let response = router
        .oneshot(json_post("/submit-loan", &payload))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = read_json_body(response).await;
    assert_eq!(body["validation"]["isValid"], json!(false));
    assert_eq!(
        body["validation"]["missingFields"],
        json!(["DSCR", "Justification for Override"])
    );
}

#[tokio::test]
async fn submit_route_rejects_unsupported_line_of_business() {
    let router = grading_router_with_store(MemoryStore::default());
    let mut payload = office_payload();
    payload["lineOfBusiness"] = json!("ABL");

    let response = router
        .oneshot(json_post("/submit-loan", &payload))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn submit_handler_returns_internal_error_on_store_failure() {
    let service = Arc::new(
        LoanGradingService::new(Arc::new(UnavailableStore), RatingModel::standard())
            .expect("model is valid"),
    );

    let response = crate::rating::router::submit_handler::<UnavailableStore>(
        State(service),
        axum::Json(office_request()),
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let payload = read_json_body(response).await;
    assert!(payload["error"]
        .as_str()
        .unwrap_or_default()
        .contains("storage offline"));
}

#[tokio::test]
async fn preview_route_returns_live_grades() {
    let router = grading_router_with_store(MemoryStore::default());

    let response = router
        .oneshot(json_post("/api/v1/grades/preview", &office_payload()))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["computed"]["brg"]["blended"], json!(4));
    assert_eq!(payload["computed"]["frg"]["blended"], json!(5));
    assert_eq!(payload["finalBrg"], json!(4.0));
    assert_eq!(payload["validation"]["isValid"], json!(true));
}

#[tokio::test]
async fn preview_route_maps_stray_factors_to_unprocessable() {
    let router = grading_router_with_store(MemoryStore::default());
    let mut payload = office_payload();
    payload["qualitativeRatings"]["Liquidity"] = json!(2);

    let response = router
        .oneshot(json_post("/api/v1/grades/preview", &payload))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn malformed_json_is_rejected_before_grading() {
    let router = grading_router_with_store(MemoryStore::default());

    let response = router
        .oneshot(
            Request::post("/submit-loan")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{\"propertyType\": "))
                .expect("request builds"),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
