//! HTTP behaviour of the text generator, exercised through the gateway

use crew_core::TaskOptions;
use crew_llm::{Cortex, CortexError, Service, ServiceConfig, ServiceError, TextGenerator};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn options(value: serde_json::Value) -> TaskOptions {
    value.as_object().cloned().unwrap_or_default()
}

#[tokio::test]
async fn test_successful_generation_returns_response_json() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(header("Authorization", "Bearer secret"))
        .and(body_partial_json(json!({
            "model": "llama3.1:latest",
            "stream": false,
            "max_tokens": 100
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": "llama3.1:latest",
            "message": { "role": "assistant", "content": "Once upon a time" },
            "done": true
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let cortex = Cortex::new();
    cortex
        .register_service(
            "TextGeneration",
            &ServiceConfig::new("Ollama", "TextGeneration")
                .with_endpoint(format!("{}/api/chat", mock_server.uri()))
                .with_api_key("secret"),
        )
        .unwrap();

    let result = cortex
        .think(
            "TextGeneration",
            &options(json!({ "prompt": "Tell a story", "max_tokens": 100 })),
        )
        .await
        .unwrap();

    assert_eq!(result["message"]["content"], "Once upon a time");
}

#[tokio::test]
async fn test_non_success_status_is_an_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .mount(&mock_server)
        .await;

    let generator = TextGenerator::new(
        format!("{}/v1/chat/completions", mock_server.uri()),
        "key",
        "gpt-4o-mini-2024-07-18",
    );

    let error = generator
        .run(&options(json!({ "prompt": "hi" })))
        .await
        .unwrap_err();

    match error {
        ServiceError::Api { status, body } => {
            assert_eq!(status, 503);
            assert_eq!(body, "unavailable");
        }
        other => panic!("Expected Api error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_gateway_surfaces_capability_error_message() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let cortex = Cortex::new();
    cortex
        .register_service(
            "gen",
            &ServiceConfig::new("OpenAI", "TextGeneration").with_endpoint(mock_server.uri()),
        )
        .unwrap();

    let error = cortex
        .think("gen", &options(json!({ "prompt": "hi" })))
        .await
        .unwrap_err();

    assert!(matches!(error, CortexError::Service(ServiceError::Api { status: 500, .. })));
    assert_eq!(error.to_string(), "HTTP error! status: 500");
}

#[tokio::test]
async fn test_invalid_json_body_is_an_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&mock_server)
        .await;

    let generator = TextGenerator::new(mock_server.uri(), "", "m");
    let result = generator.run(&options(json!({ "prompt": "hi" }))).await;

    assert!(result.is_err());
}
