use std::time::Duration;

use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::chat_model::{ChatMessage, ChatModel};
use crate::client::{LlmClient, RetryPolicy};

fn fast_retry() -> RetryPolicy {
    RetryPolicy { max_retries: 3, base_delay: Duration::from_millis(5) }
}

fn client_for(server: &MockServer) -> LlmClient {
    LlmClient::new("test-key".to_owned(), server.uri())
        .unwrap()
        .with_model("test-model".to_owned())
        .with_retry_policy(fast_retry())
}

fn completion(content: &str) -> serde_json::Value {
    serde_json::json!({
        "choices": [{
            "message": {
                "content": content,
                "role": "assistant"
            }
        }]
    })
}

fn question() -> Vec<ChatMessage> {
    vec![ChatMessage::user("hello")]
}

#[tokio::test]
async fn test_success_on_first_attempt() {
    let server = MockServer::start().await;
    let client = client_for(&server);

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("Authorization", "Bearer test-key"))
        .and(body_partial_json(serde_json::json!({
            "model": "test-model",
            "messages": [{"role": "user", "content": "hello"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("test response")))
        .expect(1)
        .mount(&server)
        .await;

    let result = client.complete(&question()).await.unwrap();
    assert_eq!(result, "test response");
}

#[tokio::test]
async fn test_temperature_is_sent_when_configured() {
    let server = MockServer::start().await;
    let client = client_for(&server).with_temperature(0.5);

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(serde_json::json!({"temperature": 0.5})))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("warm")))
        .expect(1)
        .mount(&server)
        .await;

    assert_eq!(client.complete(&question()).await.unwrap(), "warm");
}

#[tokio::test]
async fn test_retry_on_429_then_success() {
    let server = MockServer::start().await;
    let client = client_for(&server);

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("success after retry")))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_string("Rate limit exceeded"))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    let result = client.complete(&question()).await.unwrap();
    assert_eq!(result, "success after retry");
}

#[tokio::test]
async fn test_no_retry_on_401() {
    let server = MockServer::start().await;
    let client = client_for(&server);

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
        .expect(1)
        .mount(&server)
        .await;

    let err = client.complete(&question()).await.unwrap_err();
    assert!(!err.is_transient());
    let err_msg = err.to_string();
    assert!(err_msg.contains("401"));
    assert!(err_msg.contains("Unauthorized"));
}

#[tokio::test]
async fn test_all_retries_exhausted() {
    let server = MockServer::start().await;
    let client = client_for(&server);

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
        .expect(4)
        .mount(&server)
        .await;

    let err_msg = client.complete(&question()).await.unwrap_err().to_string();
    assert!(err_msg.contains("gave up after 4 attempts"));
    assert!(err_msg.contains("503"));
    assert!(err_msg.contains("Service Unavailable"));
}

#[tokio::test]
async fn test_empty_choices_is_an_error() {
    let server = MockServer::start().await;
    let client = client_for(&server);

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"choices": []})))
        .expect(1)
        .mount(&server)
        .await;

    let err = client.complete(&question()).await.unwrap_err();
    assert!(matches!(err, crate::LlmError::EmptyResponse));
}

#[tokio::test]
async fn test_malformed_body_is_not_retried() {
    let server = MockServer::start().await;
    let client = client_for(&server);

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .expect(1)
        .mount(&server)
        .await;

    let err = client.complete(&question()).await.unwrap_err();
    assert!(matches!(err, crate::LlmError::MalformedResponse { .. }));
}
