// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chatgen::config::settings::LlmSettings;
use chatgen::domain::models::generation::GenerationError;
use chatgen::domain::services::llm_service::{
    ChatMessage, CompletionRequest, CompletionService, OpenAiCompletionService,
};
use futures::StreamExt;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn settings(base_url: &str) -> LlmSettings {
    LlmSettings {
        api_key: Some("test-key".to_string()),
        api_base_url: format!("{}/v1", base_url),
        model: "gpt-4o".to_string(),
        max_tokens: 4000,
        temperature: 0.7,
        timeout_secs: 5,
    }
}

fn request() -> CompletionRequest {
    CompletionRequest {
        messages: vec![
            ChatMessage::system("Build a chat app."),
            ChatMessage::user("Create a chat application with this theme: ocean"),
        ],
    }
}

#[tokio::test]
async fn test_buffered_completion_returns_message_content() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({
            "model": "gpt-4o",
            "max_tokens": 4000,
            "stream": false
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "<html></html>"}}],
            "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let service = OpenAiCompletionService::new(&settings(&server.uri())).unwrap();
    let content = service.complete(&request()).await.unwrap();

    assert_eq!(content, "<html></html>");
}

#[tokio::test]
async fn test_structured_upstream_error_passes_status_and_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}
        })))
        .mount(&server)
        .await;

    let service = OpenAiCompletionService::new(&settings(&server.uri())).unwrap();
    let err = service.complete(&request()).await.unwrap_err();

    assert_eq!(
        err,
        GenerationError::upstream(
            Some(401),
            "Completion API error: Incorrect API key provided"
        )
    );
}

#[tokio::test]
async fn test_unstructured_upstream_error_reports_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
        .mount(&server)
        .await;

    let service = OpenAiCompletionService::new(&settings(&server.uri())).unwrap();
    let err = match service.complete_stream(&request()).await {
        Ok(_) => panic!("expected an upstream error"),
        Err(err) => err,
    };

    assert_eq!(
        err,
        GenerationError::upstream(Some(503), "Completion API error (status 503)")
    );
}

#[tokio::test]
async fn test_streaming_completion_yields_deltas_in_order() {
    let body = concat!(
        "data: {\"choices\":[{\"delta\":{\"role\":\"assistant\"}}]}\n\n",
        "data: {\"choices\":[{\"delta\":{\"content\":\"<html>\"}}]}\n\n",
        ": keep-alive\n\n",
        "data: {\"choices\":[{\"delta\":{\"content\":\"<body>hi</body>\"}}]}\n\n",
        "data: {\"choices\":[{\"delta\":{\"content\":\"</html>\"}}]}\n\n",
        "data: [DONE]\n\n",
    );

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(json!({"stream": true})))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/event-stream")
                .set_body_string(body),
        )
        .expect(1)
        .mount(&server)
        .await;

    let service = OpenAiCompletionService::new(&settings(&server.uri())).unwrap();
    let deltas: Vec<String> = service
        .complete_stream(&request())
        .await
        .unwrap()
        .map(|delta| delta.unwrap())
        .collect()
        .await;

    assert_eq!(deltas, vec!["<html>", "<body>hi</body>", "</html>"]);
}

#[tokio::test]
async fn test_streamed_error_event_ends_the_stream() {
    let body = concat!(
        "data: {\"choices\":[{\"delta\":{\"content\":\"<html>\"}}]}\n\n",
        "data: {\"error\":{\"message\":\"The server had an error\"}}\n\n",
        "data: {\"choices\":[{\"delta\":{\"content\":\"never\"}}]}\n\n",
    );

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&server)
        .await;

    let service = OpenAiCompletionService::new(&settings(&server.uri())).unwrap();
    let items: Vec<_> = service
        .complete_stream(&request())
        .await
        .unwrap()
        .collect()
        .await;

    assert_eq!(
        items,
        vec![
            Ok("<html>".to_string()),
            Err(GenerationError::upstream(
                None,
                "Completion API error: The server had an error"
            )),
        ]
    );
}

#[tokio::test]
async fn test_stream_closed_without_done_marker_is_an_error() {
    let body = concat!(
        "data: {\"choices\":[{\"delta\":{\"content\":\"<html><body>\"}}]}\n\n",
        "data: {\"choices\":[{\"delta\":{\"content\":\"half\"}}]}\n\n",
    );

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&server)
        .await;

    let service = OpenAiCompletionService::new(&settings(&server.uri())).unwrap();
    let items: Vec<_> = service
        .complete_stream(&request())
        .await
        .unwrap()
        .collect()
        .await;

    assert_eq!(items.len(), 3);
    assert_eq!(
        items.last(),
        Some(&Err(GenerationError::upstream(
            None,
            "Completion stream ended unexpectedly"
        )))
    );
}

#[tokio::test]
async fn test_slow_upstream_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(std::time::Duration::from_secs(3))
                .set_body_json(json!({"choices": []})),
        )
        .mount(&server)
        .await;

    let mut settings = settings(&server.uri());
    settings.timeout_secs = 1;
    let service = OpenAiCompletionService::new(&settings).unwrap();

    assert_eq!(
        service.complete(&request()).await,
        Err(GenerationError::Timeout)
    );
}
