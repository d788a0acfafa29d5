//! Chat relay endpoint tests

use axum::http::{Method, StatusCode};
use funnel_chat::{FrameKind, StreamFrame};
use funnel_llm::mock::MockRunStep;
use serde_json::json;
use tower::ServiceExt;

use crate::common::{json_request, parse_body, parse_frames, TestApp};

#[tokio::test]
async fn test_chat_streams_deltas_then_done() {
    let app = TestApp::new();
    app.assistant.push_run(vec![
        MockRunStep::Delta("Hel".to_string()),
        MockRunStep::Delta("lo".to_string()),
        MockRunStep::Delta("!".to_string()),
        MockRunStep::Complete,
    ]);

    let req = json_request(
        Method::POST,
        "/api/chat",
        &json!({ "messages": [{"role": "user", "content": "Hi"}] }),
    );
    let resp = app.test_router().oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("text/event-stream")));

    let frames = parse_frames(resp).await;
    assert_eq!(
        frames,
        vec![
            StreamFrame::delta("Hel"),
            StreamFrame::delta("lo"),
            StreamFrame::delta("!"),
            StreamFrame::done("thread_mock_1"),
        ]
    );
}

#[tokio::test]
async fn test_chat_reuses_thread_and_forwards_personalization() {
    let app = TestApp::new();

    let req = json_request(
        Method::POST,
        "/api/chat",
        &json!({
            "messages": [
                {"role": "user", "content": "Hi"},
                {"role": "assistant", "content": "Hello!"},
                {"role": "user", "content": "What's the price?"}
            ],
            "threadId": "t_123",
            "productContext": "membership",
            "userProfile": {"firstName": "Ada", "email": "ada@example.com"}
        }),
    );
    let resp = app.test_router().oneshot(req).await.unwrap();
    let frames = parse_frames(resp).await;

    assert_eq!(
        frames.last().map(|f| f.kind()),
        Some(FrameKind::Done {
            thread_id: Some("t_123")
        })
    );

    let calls = app.assistant.calls();
    assert!(calls.created_threads.is_empty());
    assert_eq!(
        calls.messages,
        vec![("t_123".to_string(), "What's the price?".to_string())]
    );
    let (_, instructions) = &calls.runs[0];
    assert!(instructions.contains("Ada"));
    assert!(instructions.contains("ada@example.com"));
    assert!(!instructions.contains("last name"));
}

#[tokio::test]
async fn test_chat_run_failure_ends_with_single_error_frame() {
    let app = TestApp::new();
    app.assistant.push_run(vec![
        MockRunStep::Delta("Par".to_string()),
        MockRunStep::Fail("server_error: boom".to_string()),
    ]);

    let req = json_request(
        Method::POST,
        "/api/chat",
        &json!({ "messages": [{"role": "user", "content": "Hi"}], "threadId": "t_1" }),
    );
    let frames = parse_frames(app.test_router().oneshot(req).await.unwrap()).await;

    assert_eq!(frames.len(), 2);
    assert_eq!(frames[0], StreamFrame::delta("Par"));
    assert!(frames[1].done);
    assert!(frames[1].error.is_some());
    assert!(!frames[1].error.as_deref().unwrap_or_default().contains("boom"));
}

#[tokio::test]
async fn test_chat_thread_creation_failure_is_streamed_not_status() {
    let app = TestApp::new();
    app.assistant.fail_thread_creation();

    let req = json_request(
        Method::POST,
        "/api/chat",
        &json!({ "messages": [{"role": "user", "content": "Hi"}] }),
    );
    let resp = app.test_router().oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let frames = parse_frames(resp).await;
    assert_eq!(frames.len(), 1);
    assert!(matches!(frames[0].kind(), FrameKind::Error(_)));
}

#[tokio::test]
async fn test_chat_without_user_message_is_rejected() {
    let app = TestApp::new();

    for body in [
        json!({ "messages": [] }),
        json!({ "messages": [{"role": "user", "content": "   "}] }),
        json!({ "messages": [{"role": "assistant", "content": "Hello"}] }),
    ] {
        let req = json_request(Method::POST, "/api/chat", &body);
        let resp = app.test_router().oneshot(req).await.unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let parsed = parse_body(resp).await;
        assert_eq!(parsed["error"]["code"], "VALIDATION_ERROR");
    }
    assert!(app.assistant.calls().created_threads.is_empty());
}

#[tokio::test]
async fn test_chat_rejects_unknown_product() {
    let app = TestApp::new();

    let req = json_request(
        Method::POST,
        "/api/chat",
        &json!({
            "messages": [{"role": "user", "content": "Hi"}],
            "productContext": "platinum"
        }),
    );
    let resp = app.test_router().oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
