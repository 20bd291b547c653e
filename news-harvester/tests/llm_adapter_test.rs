mod common;

use common::*;
use mockito::Matcher;
use news_harvester::{LlmConfig, OpenAiAdapter};
use serde_json::json;
use std::io::Write;

fn adapter_for(server: &mockito::ServerGuard) -> Result<OpenAiAdapter> {
    OpenAiAdapter::new(&LlmConfig {
        api_key: "sk-test".to_string(),
        base_url: format!("{}/v1", server.url()),
        ..LlmConfig::default()
    })
}

fn classification_request() -> ChatRequest {
    ChatRequest {
        system: "Respond only with yes or no.".to_string(),
        user: "Is this about elections?".to_string(),
        temperature: None,
        max_tokens: None,
    }
}

#[tokio::test]
async fn test_openai_adapter_sends_chat_completion() -> Result<()> {
    init_tracing();
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("POST", "/v1/chat/completions")
        .match_header("authorization", "Bearer sk-test")
        .match_body(Matcher::PartialJson(json!({
            "model": "gpt-4o",
            "max_tokens": 100,
            "messages": [
                {"role": "system", "content": "Respond only with yes or no."},
                {"role": "user", "content": "Is this about elections?"}
            ]
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"choices": [{"message": {"role": "assistant", "content": "Yes"}}]}).to_string())
        .expect(1)
        .create_async()
        .await;

    let adapter = adapter_for(&server)?;
    let answer = adapter.complete(&classification_request()).await?;

    mock.assert_async().await;
    assert_eq!(answer, "Yes");
    Ok(())
}

#[tokio::test]
async fn test_openai_api_error_is_filter_error() -> Result<()> {
    init_tracing();
    let mut server = mockito::Server::new_async().await;

    let _mock = server
        .mock("POST", "/v1/chat/completions")
        .with_status(500)
        .with_body("upstream overloaded")
        .create_async()
        .await;

    let adapter = adapter_for(&server)?;
    let err = adapter
        .complete(&classification_request())
        .await
        .expect_err("server error");

    assert!(matches!(err, HarvestError::Filter { .. }));
    assert!(err.to_string().contains("500"));
    assert!(err.describe().contains("upstream overloaded"));
    Ok(())
}

#[tokio::test]
async fn test_openai_response_without_choices_is_error() -> Result<()> {
    init_tracing();
    let mut server = mockito::Server::new_async().await;

    let _mock = server
        .mock("POST", "/v1/chat/completions")
        .with_status(200)
        .with_body(json!({"choices": []}).to_string())
        .create_async()
        .await;

    let adapter = adapter_for(&server)?;
    let err = adapter
        .complete(&classification_request())
        .await
        .expect_err("no choices");

    assert!(err.to_string().contains("no choices"));
    Ok(())
}

#[test]
fn test_openai_adapter_requires_api_key() {
    let err = OpenAiAdapter::new(&LlmConfig::default())
        .err()
        .expect("missing key must fail");
    assert!(matches!(err, HarvestError::Filter { .. }));
}

#[tokio::test]
async fn test_slow_response_body_hits_timeout() -> Result<()> {
    init_tracing();
    let mut server = mockito::Server::new_async().await;

    // Headers go out at once, the body only after three seconds
    let _mock = server
        .mock("POST", "/v1/chat/completions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_chunked_body(|w| {
            std::thread::sleep(std::time::Duration::from_secs(3));
            w.write_all(br#"{"choices": [{"message": {"content": "yes"}}]}"#)
        })
        .create_async()
        .await;

    let adapter = OpenAiAdapter::new(&LlmConfig {
        api_key: "sk-test".to_string(),
        base_url: format!("{}/v1", server.url()),
        timeout_seconds: 1,
        ..LlmConfig::default()
    })?;

    let started = std::time::Instant::now();
    let err = adapter
        .complete(&classification_request())
        .await
        .expect_err("body arrives after the deadline");

    assert!(matches!(err, HarvestError::Filter { .. }), "got {}", err.describe());
    assert!(started.elapsed() < std::time::Duration::from_millis(2500), "took {:?}", started.elapsed());
    Ok(())
}
