use std::time::Duration;

use docqa_core::Turn;

use crate::chat_model::{ChatMessage, Role};
use crate::client::{LlmClient, RetryPolicy, truncate};

#[test]
fn test_truncate_within_limit() {
    assert_eq!(truncate("hello", 10), "hello");
}

#[test]
fn test_truncate_exceeds_limit() {
    assert_eq!(truncate("hello world", 5), "hello");
}

#[test]
fn test_truncate_unicode_boundary() {
    let s = "привет";
    let result = truncate(s, 5);
    assert_eq!(result, "пр");
}

#[test]
fn test_retry_delays_double() {
    let policy = RetryPolicy { max_retries: 3, base_delay: Duration::from_millis(100) };
    assert_eq!(policy.delay_for(1), Duration::from_millis(100));
    assert_eq!(policy.delay_for(2), Duration::from_millis(200));
    assert_eq!(policy.delay_for(3), Duration::from_millis(400));
}

#[test]
fn test_base_url_trailing_slash_trimmed() {
    let client = LlmClient::new("k".to_owned(), "http://localhost:8080/".to_owned()).unwrap();
    assert_eq!(client.base_url(), "http://localhost:8080");
}

#[test]
fn test_debug_hides_api_key() {
    let client = LlmClient::new("sk-very-secret".to_owned(), "http://x".to_owned()).unwrap();
    assert!(!format!("{client:?}").contains("sk-very-secret"));
}

#[test]
fn test_turn_to_message_roles() {
    assert_eq!(ChatMessage::from(&Turn::user("q")).role, Role::User);
    assert_eq!(ChatMessage::from(&Turn::assistant("a")).role, Role::Assistant);
}
