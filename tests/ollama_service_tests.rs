//! HTTP-level tests for the Ollama client against a mock server.

use std::sync::Arc;
use std::time::Duration;

use localgen::config::LocalGenConfig;
use localgen::error::{ErrorCategory, LocalGenError};
use localgen::generation::StreamingGenerator;
use localgen::models::{CapabilityTag, ModelCapabilityClassifier};
use localgen::provider::{ModelService, OllamaService};
use localgen::types::{ChatMessage, ChatRequest, EmbeddingRequest, GenerationRequest, ImageInput};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn service(server: &MockServer) -> OllamaService {
    OllamaService::with_base_url(server.uri()).expect("valid mock url")
}

fn ndjson(lines: &[serde_json::Value]) -> String {
    lines.iter().map(|l| format!("{l}\n")).collect()
}

async fn mount_tags(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

fn unused_local_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}")
}

#[tokio::test]
async fn list_models_parses_tags_listing() {
    let server = MockServer::start().await;
    mount_tags(
        &server,
        json!({
            "models": [
                {
                    "name": "llama3.2:latest",
                    "model": "llama3.2:latest",
                    "size": 2019393189u64,
                    "digest": "a80c4f17acd5",
                    "modified_at": "2024-10-01T10:00:00Z",
                    "details": {"family": "llama", "parameter_size": "3.2B"}
                },
                {"name": "nomic-embed-text:latest"}
            ]
        }),
    )
    .await;

    let models = service(&server).list_models().await.unwrap();

    assert_eq!(models.len(), 2);
    assert_eq!(models[0].identifier(), "llama3.2:latest");
    assert_eq!(models[0].size, 2_019_393_189);
    assert_eq!(
        models[0].details.as_ref().and_then(|d| d.parameter_size.as_deref()),
        Some("3.2B")
    );
    assert_eq!(models[1].identifier(), "nomic-embed-text:latest");
}

#[tokio::test]
async fn list_models_tolerates_missing_models_key() {
    let server = MockServer::start().await;
    mount_tags(&server, json!({})).await;

    assert!(service(&server).list_models().await.unwrap().is_empty());
}

#[tokio::test]
async fn list_models_reports_http_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal"))
        .mount(&server)
        .await;

    let err = service(&server).list_models().await.unwrap_err();

    assert_eq!(err.http_status(), Some(500));
    assert_eq!(err.category(), ErrorCategory::Network);
    assert!(err.to_string().contains("internal"));
}

#[tokio::test]
async fn list_models_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"models": []}))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let config = LocalGenConfig::new()
        .with_base_url(server.uri())
        .with_list_timeout(Duration::from_millis(50));
    let err = OllamaService::new(config)
        .unwrap()
        .list_models()
        .await
        .unwrap_err();

    assert!(matches!(err, LocalGenError::Timeout(50)));
    assert!(err.is_listing_fallback());
}

#[tokio::test]
async fn list_models_rejects_invalid_json() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let err = service(&server).list_models().await.unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Serialization);
}

#[tokio::test]
async fn unreachable_service_is_service_unavailable() {
    let service = OllamaService::with_base_url(unused_local_url()).unwrap();

    let err = service.list_models().await.unwrap_err();
    assert!(matches!(
        err,
        LocalGenError::ServiceUnavailable { status: None, .. }
    ));

    let err = service
        .generate_stream(&GenerationRequest::new("llama3.2", "hi"))
        .await
        .err()
        .expect("generation must fail without a server");
    assert_eq!(err.category(), ErrorCategory::Network);
}

#[tokio::test]
async fn generate_posts_streaming_body_and_folds_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_json(json!({
            "model": "llama3.2",
            "prompt": "Why is the sky blue?",
            "stream": true
        })))
        .respond_with(ResponseTemplate::new(200).set_body_string(ndjson(&[
            json!({"model": "llama3.2", "response": "Rayleigh", "done": false}),
            json!({"model": "llama3.2", "response": " scattering.", "done": false}),
            json!({"model": "llama3.2", "response": "", "done": true, "done_reason": "stop"}),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let generator = StreamingGenerator::with_service(Arc::new(service(&server)));
    let mut seen = Vec::new();
    let text = generator
        .run(
            &GenerationRequest::new("llama3.2", "Why is the sky blue?"),
            |partial| seen.push(partial.to_string()),
        )
        .await
        .unwrap();

    assert_eq!(text, "Rayleigh scattering.");
    assert_eq!(
        seen,
        vec!["Rayleigh", "Rayleigh scattering.", "Rayleigh scattering."]
    );
}

#[tokio::test]
async fn generate_sends_images_and_system() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_partial_json(json!({
            "model": "llava",
            "images": ["aW1n"],
            "system": "Describe briefly.",
            "stream": true
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(ndjson(&[json!({"response": "A cat."})])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let request = GenerationRequest::builder()
        .model("llava")
        .prompt("What is this?")
        .system("Describe briefly.".to_string())
        .build()
        .with_images([ImageInput::from_bytes(b"img".to_vec())]);
    let generator = StreamingGenerator::with_service(Arc::new(service(&server)));

    assert_eq!(generator.collect(&request).await.unwrap(), "A cat.");
}

#[tokio::test]
async fn generate_without_trailing_newline_keeps_last_fragment() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "{\"response\":\"one\"}\r\n\r\n{\"response\":\" two\",\"done\":true}",
        ))
        .mount(&server)
        .await;

    let generator = StreamingGenerator::with_service(Arc::new(service(&server)));
    let text = generator
        .collect(&GenerationRequest::new("llama3.2", "count"))
        .await
        .unwrap();

    assert_eq!(text, "one two");
}

#[tokio::test]
async fn generate_surfaces_malformed_lines() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("{\"response\":\"ok\"}\n[1,2]\n"),
        )
        .mount(&server)
        .await;

    let generator = StreamingGenerator::with_service(Arc::new(service(&server)));
    let mut seen = Vec::new();
    let err = generator
        .run(&GenerationRequest::new("llama3.2", "x"), |p| {
            seen.push(p.to_string())
        })
        .await
        .unwrap_err();

    assert_eq!(err.category(), ErrorCategory::Stream);
    assert_eq!(seen, vec!["ok"]);
}

#[tokio::test]
async fn generate_reports_unknown_model_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"error": "model 'ghost' not found"})),
        )
        .mount(&server)
        .await;

    let generator = StreamingGenerator::with_service(Arc::new(service(&server)));
    let mut calls = 0;
    let err = generator
        .run(&GenerationRequest::new("ghost", "x"), |_| calls += 1)
        .await
        .unwrap_err();

    assert_eq!(err.http_status(), Some(404));
    assert!(err.to_string().contains("ghost"));
    assert_eq!(calls, 0);
}

#[tokio::test]
async fn chat_posts_messages_and_folds_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_json(json!({
            "model": "llava",
            "messages": [
                {"role": "system", "content": "Answer in one word."},
                {"role": "user", "content": "What animal?", "images": ["aW1n"]}
            ],
            "stream": true
        })))
        .respond_with(ResponseTemplate::new(200).set_body_string(ndjson(&[
            json!({"model": "llava", "message": {"role": "assistant", "content": "Ca"}, "done": false}),
            json!({"model": "llava", "message": {"role": "assistant", "content": "t"}, "done": false}),
            json!({"model": "llava", "message": {"role": "assistant", "content": ""}, "done": true}),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let request = ChatRequest::new(
        "llava",
        vec![
            ChatMessage::system("Answer in one word."),
            ChatMessage::user("What animal?").with_images([ImageInput::from_bytes(b"img".to_vec())]),
        ],
    );
    let generator = StreamingGenerator::with_service(Arc::new(service(&server)));
    let mut seen = Vec::new();
    let text = generator
        .chat(&request, |partial| seen.push(partial.to_string()))
        .await
        .unwrap();

    assert_eq!(text, "Cat");
    assert_eq!(seen, vec!["Ca", "Cat", "Cat"]);
}

#[tokio::test]
async fn chat_reports_http_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(400).set_body_string("invalid role"))
        .mount(&server)
        .await;

    let err = service(&server)
        .chat_stream(&ChatRequest::new("llama3.2", vec![ChatMessage::user("hi")]))
        .await
        .err()
        .expect("400 must fail the chat");

    assert_eq!(err.http_status(), Some(400));
}

#[tokio::test]
async fn embed_posts_model_and_prompt() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/embeddings"))
        .and(body_json(json!({"model": "nomic-embed-text", "prompt": "hello"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"embedding": [0.25, -0.5, 1.0]})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let response = service(&server)
        .embed(&EmbeddingRequest::new("nomic-embed-text", "hello"))
        .await
        .unwrap();

    assert_eq!(response.embedding, vec![0.25, -0.5, 1.0]);
}

#[tokio::test]
async fn show_model_returns_info_with_capabilities() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/show"))
        .and(body_json(json!({"model": "llava:7b"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "modelfile": "FROM llava",
            "parameters": "temperature 0.7",
            "template": "{{ .Prompt }}",
            "details": {"family": "llama", "families": ["llama", "clip"]}
        })))
        .mount(&server)
        .await;

    let info = service(&server).show_model("llava:7b").await.unwrap();

    assert_eq!(info.name, "llava:7b");
    assert!(info.capabilities.contains(&CapabilityTag::Vision));
    assert_eq!(info.modelfile, "FROM llava");
    assert_eq!(info.system, "");
    assert_eq!(
        info.details.and_then(|d| d.families),
        Some(vec!["llama".to_string(), "clip".to_string()])
    );
}

#[tokio::test]
async fn classifier_over_http_picks_installed_model() {
    let server = MockServer::start().await;
    mount_tags(
        &server,
        json!({"models": [
            {"name": "mistral:7b"},
            {"name": "llava:7b"},
            {"name": "all-minilm"}
        ]}),
    )
    .await;

    let classifier = ModelCapabilityClassifier::with_service(Arc::new(service(&server)));

    assert_eq!(classifier.best_model_for(CapabilityTag::Vision).await, "llava:7b");
    assert_eq!(
        classifier.best_model_for(CapabilityTag::Embedding).await,
        "all-minilm"
    );
    assert_eq!(
        classifier.best_model_for(CapabilityTag::Thinking).await,
        "deepseek-r1"
    );
}

#[tokio::test]
async fn classifier_falls_back_when_server_is_down() {
    let classifier = ModelCapabilityClassifier::new(
        LocalGenConfig::new().with_base_url(unused_local_url()),
    )
    .unwrap();

    assert_eq!(
        classifier.best_model_for(CapabilityTag::Vision).await,
        "llama3.2-vision"
    );
    assert_eq!(
        classifier
            .model_names_for(Some(CapabilityTag::Chat))
            .await
            .unwrap(),
        vec!["llama3.2", "mistral:7b"]
    );
}
