mod support;

use axum::http::StatusCode;
use serde_json::{Value, json};

use support::build_test_app;

#[tokio::test]
async fn node_registration_round_trip() {
    let app = build_test_app();

    let response = app
        .server
        .post("/api/v1/nodes")
        .json(&json!({ "id": "sat1", "client": "acme-orbital" }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["id"], "sat1");
    assert_eq!(body["client"], "acme-orbital");

    let listing: Value = app.server.get("/api/v1/nodes").await.json();
    assert_eq!(listing.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn duplicate_node_registration_is_a_conflict() {
    let app = build_test_app();
    let body = json!({ "id": "sat1", "client": "acme-orbital" });

    app.server
        .post("/api/v1/nodes")
        .json(&body)
        .await
        .assert_status(StatusCode::CREATED);

    let response = app.server.post("/api/v1/nodes").json(&body).await;
    response.assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn node_registration_rejects_missing_or_malformed_fields() {
    let app = build_test_app();

    app.server
        .post("/api/v1/nodes")
        .json(&json!({ "id": "sat1" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    app.server
        .post("/api/v1/nodes")
        .json(&json!({ "id": "sat/1", "client": "acme" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn request_intake_requires_a_registered_target() {
    let app = build_test_app();

    let response = app
        .server
        .post("/api/v1/requests")
        .json(&json!({ "targetId": "sat1" }))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn request_intake_inserts_an_unseen_ledger_row() {
    let app = build_test_app();
    app.server
        .post("/api/v1/nodes")
        .json(&json!({ "id": "sat1", "client": "acme-orbital" }))
        .await
        .assert_status(StatusCode::CREATED);

    let response = app
        .server
        .post("/api/v1/requests")
        .json(&json!({ "targetId": "sat1", "interval": 60 }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["id"], 1);
    assert_eq!(body["targetId"], "sat1");
    assert_eq!(body["seen"], false);

    let fetched: Value = app.server.get("/api/v1/requests/1").await.json();
    assert_eq!(fetched["id"], 1);

    app.server
        .get("/api/v1/requests/99")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn request_intake_rejects_a_missing_target() {
    let app = build_test_app();

    let response = app.server.post("/api/v1/requests").json(&json!({})).await;
    response.assert_status(StatusCode::BAD_REQUEST);
}
