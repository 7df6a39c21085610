use std::error::Error;

use portal_assistant::errors::MAX_ERROR_BODY_CHARS;
use portal_assistant::{ChatError, ErrorKind, StoreError};

#[test]
fn test_chat_error_implements_error_trait() {
    fn assert_error<T: Error>(_: &T) {}

    assert_error(&ChatError::Busy);
    assert_error(&StoreError::Unavailable("down".to_string()));
}

#[test]
fn test_chat_error_display() {
    let error = ChatError::Upstream {
        status: 429,
        message: "Rate limit reached".to_string(),
    };
    assert_eq!(
        format!("{error}"),
        "OpenAI API error (status 429): Rate limit reached"
    );

    let error = ChatError::Transport {
        status: None,
        body: "connection refused".to_string(),
    };
    assert_eq!(
        format!("{error}"),
        "Failed to read OpenAI response (status none): connection refused"
    );

    let error = ChatError::Configuration("Please set OPENAI_API_KEY.".to_string());
    assert!(format!("{error}").contains("API key is not configured"));
}

#[test]
fn test_transport_constructor_truncates_body() {
    let body = "b".repeat(MAX_ERROR_BODY_CHARS * 3);
    match ChatError::transport(Some(500), &body) {
        ChatError::Transport { status, body } => {
            assert_eq!(status, Some(500));
            assert_eq!(body.len(), MAX_ERROR_BODY_CHARS);
        }
        other => panic!("Unexpected error type: {other:?}"),
    }
}

#[test]
fn test_user_hints_follow_error_kind() {
    let config = ChatError::Configuration("missing".to_string());
    assert_eq!(config.kind(), ErrorKind::Configuration);
    assert!(config.user_hint().contains("configure the OpenAI API key"));

    let upstream = ChatError::Upstream {
        status: 500,
        message: "API key rotated".to_string(),
    };
    // Classified by variant, not by what the provider's message says.
    assert_eq!(upstream.kind(), ErrorKind::Upstream);
    assert!(upstream.user_hint().contains("issue with the AI service"));

    let transport = ChatError::transport(None, "reset");
    assert_eq!(transport.kind(), ErrorKind::Transport);
    assert_eq!(
        transport.user_hint(),
        "Sorry, I encountered an error. Please try again."
    );

    assert_eq!(ChatError::Busy.kind(), ErrorKind::Busy);
    assert!(ChatError::Busy.user_hint().contains("wait"));
}

#[test]
fn test_store_error_from_conversions() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.json");
    let err: StoreError = io.into();
    assert!(matches!(err, StoreError::Io(_)));

    let parse = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    let err: StoreError = parse.into();
    assert!(format!("{err}").starts_with("Failed to parse records"));

    #[allow(unused)]
    fn _check_reqwest_conversion(err: reqwest::Error) -> ChatError {
        ChatError::from(err)
    }
}
