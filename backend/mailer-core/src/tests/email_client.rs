use crate::email_client::{EmailRequest, remote_error_message};
use crate::error::email_client::EmailClientError;

/// **VALUE**: Verifies the `error` field is extracted from JSON error bodies.
///
/// **WHY THIS MATTERS**: The service reports provider failures as `{"error": "..."}`.
/// That string is the only useful part of a failed send.
#[test]
fn given_json_error_body_when_extracting_message_then_returns_error_field() {
    // GIVEN: A JSON error body
    let body = r#"{"error": "boom"}"#;

    // WHEN
    let message = remote_error_message(body);

    // THEN
    assert_eq!(message, "boom");
}

/// **BUG THIS CATCHES**: Would catch if a non-string `error` field (e.g. an object)
/// were dropped instead of reported.
#[test]
fn given_non_string_error_field_when_extracting_message_then_returns_json_text() {
    let message = remote_error_message(r#"{"error": {"code": 7}}"#);

    assert_eq!(message, r#"{"code":7}"#);
}

/// **VALUE**: Verifies that HTML or plain text error pages are surfaced verbatim.
///
/// **WHY THIS MATTERS**: A crashing service (or a proxy) answers with non-JSON.
/// Reporting "JSON error" would hide the real cause.
#[test]
fn given_plain_text_body_when_extracting_message_then_returns_body() {
    let message = remote_error_message("  Internal Server Error \n");

    assert_eq!(message, "Internal Server Error");
}

#[test]
fn given_empty_body_when_extracting_message_then_returns_placeholder() {
    assert_eq!(remote_error_message(""), "<empty response body>");
}

#[test]
fn given_json_without_error_field_when_extracting_message_then_returns_body() {
    let body = r#"{"detail":"nope"}"#;

    assert_eq!(remote_error_message(body), body);
}

/// **VALUE**: Client-side checks accept whatever the service itself accepts.
///
/// **WHY THIS MATTERS**: The service only requires the fields to be present. A
/// stricter client would block addresses like `user@localhost` or whitespace
/// subjects that the service delivers without complaint.
///
/// **BUG THIS CATCHES**: Would catch a syntax check or trimming creeping back
/// into `validate()`.
#[test]
fn given_values_the_service_accepts_when_validated_then_passes() {
    for request in [
        EmailRequest::new("user@localhost", "Hi", "Hello", ""),
        EmailRequest::new("not-an-address", "Hi", "Hello", ""),
        EmailRequest::new("to@example.com", " ", " ", ""),
    ] {
        assert!(request.validate().is_ok(), "Should pass: {request:?}");
    }
}

#[test]
fn given_empty_recipient_when_validated_then_returns_validation_error() {
    let request = EmailRequest::new("", "Hi", "Hello", "");

    assert!(matches!(
        request.validate(),
        Err(EmailClientError::Validation { ref message, .. }) if message.contains("Recipient")
    ));
}

/// **VALUE**: Verifies the request serializes to the camelCase shape the service expects.
///
/// **WHY THIS MATTERS**: The service reads `plainText` and `htmlContent`. Snake-case
/// keys would be silently ignored and the send rejected as missing content.
#[test]
fn given_request_when_serialized_then_uses_service_field_names() {
    // GIVEN
    let request = EmailRequest::new("to@example.com", "Hi", "Hello", "<p>Hello</p>");

    // WHEN
    let json = serde_json::to_value(&request).expect("serializable");

    // THEN
    assert_eq!(
        json,
        serde_json::json!({
            "email": "to@example.com",
            "subject": "Hi",
            "plainText": "Hello",
            "htmlContent": "<p>Hello</p>",
        })
    );
}

#[test]
fn given_missing_subject_when_validated_then_returns_validation_error() {
    let request = EmailRequest::new("to@example.com", "", "Hello", "");

    let result = request.validate();

    assert!(matches!(
        result,
        Err(EmailClientError::Validation { ref message, .. }) if message.contains("Subject")
    ));
}

#[test]
fn given_missing_plain_text_when_validated_then_returns_validation_error() {
    let request = EmailRequest::new("to@example.com", "Hi", "", "<p>only html</p>");

    assert!(matches!(
        request.validate(),
        Err(EmailClientError::Validation { .. })
    ));
}

#[test]
fn given_empty_html_when_validated_then_is_accepted() {
    let request = EmailRequest::new("to@example.com", "Hi", "Hello", "");

    assert!(request.validate().is_ok());
}
