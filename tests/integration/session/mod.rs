//! End-to-end chat session against a live local server

use std::sync::Arc;

use funnel_chat::session::{CaptureState, FileProfileCache, APOLOGY};
use funnel_chat::{ChatSession, HttpFunnelClient, Product, SessionEvent, SubmitOutcome, UserProfile};
use funnel_llm::mock::MockRunStep;

use crate::common::TestApp;

fn http_session(base_url: &str) -> ChatSession {
    let client = Arc::new(HttpFunnelClient::new(base_url));
    ChatSession::new(client.clone(), client.clone(), client)
}

#[test_log::test(tokio::test)]
async fn test_session_full_funnel_flow() {
    let app = TestApp::new();
    let base_url = app.spawn().await.unwrap();
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let mut chat = http_session(&base_url).with_events(tx);

    // Three replies reach the capture threshold
    app.assistant.push_run(vec![
        MockRunStep::Delta("Hel".to_string()),
        MockRunStep::Delta("lo".to_string()),
        MockRunStep::Delta("!".to_string()),
        MockRunStep::Complete,
    ]);
    assert_eq!(chat.submit("Hi", None).await, Ok(SubmitOutcome::Completed));
    assert_eq!(chat.session().messages()[1].content, "Hello!");
    assert_eq!(chat.session().thread_id(), Some("thread_mock_1"));
    chat.wait_for_suggestions().await;
    assert_eq!(chat.session().suggestions().len(), 4);

    assert_eq!(
        chat.select_product(Product::Foundations).await,
        Ok(SubmitOutcome::Completed)
    );
    assert_eq!(
        chat.select_suggestion("How much does it cost?").await,
        Ok(SubmitOutcome::Completed)
    );

    // The fourth submission is held back for the capture form
    assert_eq!(
        chat.submit("What's the price?", None).await,
        Ok(SubmitOutcome::CaptureRequested)
    );
    assert_eq!(app.assistant.calls().runs.len(), 3);

    let profile = UserProfile::captured("Ada", "Lovelace", "ada@example.com", None);
    assert_eq!(
        chat.submit_profile(profile).await,
        Ok(SubmitOutcome::Completed)
    );

    let calls = app.assistant.calls();
    assert_eq!(calls.created_threads, vec!["thread_mock_1".to_string()]);
    assert_eq!(calls.runs.len(), 4);
    let (thread, instructions) = calls.runs.last().unwrap();
    assert_eq!(thread, "thread_mock_1");
    assert!(instructions.contains("Ada"));
    assert_eq!(
        calls.messages.last().map(|(_, m)| m.as_str()),
        Some("What's the price?")
    );

    assert!(app.leads.get("ada@example.com").is_some());
    assert_eq!(chat.session().capture_state(), CaptureState::Captured);
    assert_eq!(chat.session().product(), Some(Product::Foundations));

    drop(chat);
    let mut captures = 0;
    while let Some(event) = rx.recv().await {
        if event == SessionEvent::CaptureRequested {
            captures += 1;
        }
    }
    assert_eq!(captures, 1);
}

#[tokio::test]
async fn test_session_error_frame_becomes_apology() {
    let app = TestApp::new();
    let base_url = app.spawn().await.unwrap();
    let mut chat = http_session(&base_url);

    app.assistant.push_run(vec![
        MockRunStep::Delta("Par".to_string()),
        MockRunStep::Fail("server_error".to_string()),
    ]);

    assert_eq!(chat.submit("Hi", None).await, Ok(SubmitOutcome::Failed));
    assert_eq!(chat.session().messages()[1].content, APOLOGY);
    assert!(chat.session().suggestions().is_empty());

    assert_eq!(chat.submit("Retry", None).await, Ok(SubmitOutcome::Completed));
}

#[tokio::test]
async fn test_session_unreachable_server_fails_turn() {
    let mut chat = http_session("http://127.0.0.1:9");

    assert_eq!(chat.submit("Hi", None).await, Ok(SubmitOutcome::Failed));
    assert_eq!(chat.session().messages()[1].content, APOLOGY);
}

#[tokio::test]
async fn test_session_cached_profile_survives_reload() {
    let app = TestApp::new();
    let base_url = app.spawn().await.unwrap();
    let dir = tempfile::tempdir().unwrap();
    let cache_path = dir.path().join("profile.json");

    let mut chat = http_session(&base_url)
        .with_profile_cache(Arc::new(FileProfileCache::new(&cache_path)))
        .await;
    for text in ["one", "two", "three"] {
        chat.submit(text, None).await.unwrap();
    }
    assert_eq!(
        chat.submit("four", None).await,
        Ok(SubmitOutcome::CaptureRequested)
    );
    chat.submit_profile(UserProfile::captured("Ada", "Lovelace", "ada@example.com", None))
        .await
        .unwrap();

    let mut reloaded = http_session(&base_url)
        .with_profile_cache(Arc::new(FileProfileCache::new(&cache_path)))
        .await;
    assert_eq!(reloaded.session().capture_state(), CaptureState::Captured);
    for text in ["one", "two", "three", "four"] {
        assert_eq!(
            reloaded.submit(text, None).await,
            Ok(SubmitOutcome::Completed)
        );
    }
}
