//! Leads endpoint tests

use axum::http::{Method, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use crate::common::{json_request, parse_body, TestApp};

#[tokio::test]
async fn test_save_lead_normalizes_and_returns_lead() {
    let app = TestApp::new();

    let req = json_request(
        Method::POST,
        "/api/leads",
        &json!({
            "firstName": "  Ada ",
            "lastName": "Lovelace",
            "email": "Ada@Example.com",
            "phone": "+44 20 7946 0958"
        }),
    );
    let resp = app.test_router().oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let parsed = parse_body(resp).await;
    assert_eq!(parsed["firstName"], "Ada");
    assert_eq!(parsed["email"], "ada@example.com");
    assert!(parsed["id"].is_string());
    assert!(parsed["createdAt"].is_string());
}

#[tokio::test]
async fn test_save_lead_upserts_by_email() {
    let app = TestApp::new();

    let first = json_request(
        Method::POST,
        "/api/leads",
        &json!({
            "firstName": "Ada",
            "lastName": "Lovelace",
            "email": "ada@example.com",
            "phone": "555 010 2030"
        }),
    );
    let first = parse_body(app.test_router().oneshot(first).await.unwrap()).await;

    let second = json_request(
        Method::POST,
        "/api/leads",
        &json!({
            "firstName": "Augusta",
            "lastName": "King",
            "email": "ADA@example.com"
        }),
    );
    let second = parse_body(app.test_router().oneshot(second).await.unwrap()).await;

    assert_eq!(first["id"], second["id"]);
    assert_eq!(first["createdAt"], second["createdAt"]);
    assert_eq!(second["firstName"], "Augusta");
    assert_eq!(second["phone"], "555 010 2030");
    assert_eq!(app.leads.len(), 1);

    let stored = app.leads.get("ada@example.com").unwrap();
    assert_eq!(stored.last_name, "King");
}

#[tokio::test]
async fn test_save_lead_trims_padded_email() {
    let app = TestApp::new();

    let req = json_request(
        Method::POST,
        "/api/leads",
        &json!({
            "firstName": "Ada",
            "lastName": "Lovelace",
            "email": " Ada@Example.com "
        }),
    );
    let resp = app.test_router().oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = parse_body(resp).await;
    assert_eq!(body["email"], "ada@example.com");
    assert!(app.leads.get("ada@example.com").is_some());
}

#[tokio::test]
async fn test_save_lead_validation_errors() {
    let app = TestApp::new();

    for body in [
        json!({ "firstName": "", "lastName": "Lovelace", "email": "ada@example.com" }),
        json!({ "firstName": "Ada", "lastName": "Lovelace", "email": "not-an-email" }),
        json!({ "firstName": "Ada", "email": "ada@example.com" }),
        json!({ "firstName": "Ada", "lastName": "Lovelace", "email": "ada@example.com", "phone": "call me" }),
    ] {
        let req = json_request(Method::POST, "/api/leads", &body);
        let resp = app.test_router().oneshot(req).await.unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "body: {body}");
        let parsed = parse_body(resp).await;
        assert_eq!(parsed["error"]["code"], "VALIDATION_ERROR");
    }
    assert!(app.leads.is_empty());
}
