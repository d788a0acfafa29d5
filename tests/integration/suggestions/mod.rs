//! Suggestions endpoint tests

use axum::http::{Method, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use crate::common::{json_request, parse_body, TestApp};

#[tokio::test]
async fn test_suggestions_are_cleaned_and_capped() {
    let app = TestApp::new();
    app.llm.push_reply(
        "1. How much does it cost?\n2. \"Who is it for?\"\n- How much does it cost?\n* When does it start?\n• Is there a guarantee?\n6. Can I pay monthly?",
    );

    let req = json_request(
        Method::POST,
        "/api/suggestions",
        &json!({ "content": "The Mastermind is a three-day retreat.", "productContext": "mastermind" }),
    );
    let resp = app.test_router().oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let parsed = parse_body(resp).await;
    assert_eq!(
        parsed["suggestions"],
        json!([
            "How much does it cost?",
            "Who is it for?",
            "When does it start?",
            "Is there a guarantee?"
        ])
    );

    let request = &app.llm.recorded_requests()[0];
    assert!(request.messages[0].content.contains("the Mastermind Retreat"));
}

#[tokio::test]
async fn test_suggestions_provider_failure_is_empty_list() {
    let app = TestApp::new();
    app.llm.push_failure("upstream timeout");

    let req = json_request(
        Method::POST,
        "/api/suggestions",
        &json!({ "content": "Some reply" }),
    );
    let resp = app.test_router().oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(parse_body(resp).await, json!({ "suggestions": [] }));
}

#[tokio::test]
async fn test_suggestions_blank_content_skips_provider() {
    let app = TestApp::new();

    let req = json_request(Method::POST, "/api/suggestions", &json!({ "content": "" }));
    let resp = app.test_router().oneshot(req).await.unwrap();

    assert_eq!(parse_body(resp).await, json!({ "suggestions": [] }));
    assert!(app.llm.recorded_requests().is_empty());
}
