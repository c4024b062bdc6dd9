use mailer_core::config::LauncherConfig;
use mailer_core::email_client::{EmailClient, EmailRequest};
use mailer_core::error::email_client::EmailClientError;

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn request() -> EmailRequest {
    EmailRequest::new(
        "recipient@example.com",
        "Quarterly report",
        "See attached.",
        "<p>See attached.</p>",
    )
}

// ============================================================================
// Public API tests for EmailClient::send_email against a stub service
// ============================================================================

/// **VALUE**: Verifies a 200 `{"message":"ok"}` response returns `"ok"`.
///
/// **WHY THIS MATTERS**: This is the whole success path: the flat JSON body reaches
/// `/send-email` and the service's message comes back to the caller.
///
/// **BUG THIS CATCHES**: Would catch wrong field names, wrong path, wrong method,
/// or a missing JSON content type.
#[tokio::test]
async fn given_stub_returning_ok_when_send_email_called_then_returns_message() {
    // GIVEN: A stub that only accepts the exact payload
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/send-email"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({
            "email": "recipient@example.com",
            "subject": "Quarterly report",
            "plainText": "See attached.",
            "htmlContent": "<p>See attached.</p>",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "ok"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = EmailClient::new(&server.uri()).expect("client");

    // WHEN
    let result = client.send_email(&request()).await;

    // THEN
    assert_eq!(result.expect("send should succeed"), "ok");
}

/// **VALUE**: Verifies a 500 `{"error":"boom"}` response surfaces `"boom"`.
///
/// **WHY THIS MATTERS**: Provider failures (bad sender domain, quota) come back
/// this way. The caller needs the provider's message, not a generic failure.
#[tokio::test]
async fn given_stub_returning_500_when_send_email_called_then_returns_remote_error() {
    // GIVEN
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/send-email"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"error": "boom"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = EmailClient::new(&server.uri()).expect("client");

    // WHEN
    let result = client.send_email(&request()).await;

    // THEN
    match result {
        Err(EmailClientError::Remote {
            status, message, ..
        }) => {
            assert_eq!(status.0, 500);
            assert!(status.is_server_error());
            assert_eq!(message, "boom");
        }
        other => panic!("Expected Remote error, got {other:?}"),
    }
}

#[tokio::test]
async fn given_stub_returning_400_when_send_email_called_then_returns_client_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/send-email"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "Email address, subject, and plain text content are required"
        })))
        .mount(&server)
        .await;

    let client = EmailClient::new(&server.uri()).expect("client");

    let err = client
        .send_email(&request())
        .await
        .expect_err("400 must fail");

    match err {
        EmailClientError::Remote { status, message, .. } => {
            assert!(status.is_client_error());
            assert!(message.contains("required"));
        }
        other => panic!("Expected Remote error, got {other:?}"),
    }
}

/// **VALUE**: Verifies a success status with an unexpected body is a JSON error, not a panic.
///
/// **BUG THIS CATCHES**: Would catch an unchecked `result["message"]` style access
/// that panics when the field is missing.
#[tokio::test]
async fn given_success_without_message_when_send_email_called_then_returns_json_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/send-email"))
        .respond_with(ResponseTemplate::new(200).set_body_string("sent"))
        .mount(&server)
        .await;

    let client = EmailClient::new(&server.uri()).expect("client");

    let result = client.send_email(&request()).await;

    assert!(matches!(result, Err(EmailClientError::Json { .. })));
}

/// **VALUE**: Verifies invalid requests are rejected before any network call.
#[tokio::test]
async fn given_missing_recipient_when_send_email_called_then_no_request_is_made() {
    // GIVEN: A stub that must never be hit
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "ok"})))
        .expect(0)
        .mount(&server)
        .await;

    let client = EmailClient::new(&server.uri()).expect("client");
    let bad = EmailRequest::new("", "Hi", "Hello", "");

    // WHEN
    let result = client.send_email(&bad).await;

    // THEN
    assert!(matches!(result, Err(EmailClientError::Validation { .. })));
}

#[tokio::test]
async fn given_unreachable_service_when_send_email_called_then_returns_http_error() {
    let port = crate::helpers::free_port();
    let client = EmailClient::new(&format!("http://127.0.0.1:{port}")).expect("client");

    let result = client.send_email(&request()).await;

    assert!(matches!(result, Err(EmailClientError::Http { .. })));
}

#[test]
fn given_malformed_base_url_when_client_created_then_returns_url_parse_error() {
    let result = EmailClient::new("not a url");

    assert!(matches!(result, Err(EmailClientError::UrlParse { .. })));
}

/// **VALUE**: Verifies the configured endpoint and request timeout are honoured.
///
/// **BUG THIS CATCHES**: Would catch `from_config` ignoring `endpoint` (always
/// posting to `/send-email`) or ignoring `request_timeout`.
#[tokio::test]
async fn given_config_with_endpoint_and_timeout_when_service_is_slow_then_times_out() {
    // GIVEN: A stub on a custom endpoint that answers after 2s
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v2/mail"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"message": "late"}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let address = server.address();
    let config = LauncherConfig {
        host: address.ip().to_string(),
        port: address.port(),
        endpoint: "/v2/mail".to_string(),
        request_timeout: Some(Duration::from_millis(200)),
        ..LauncherConfig::default()
    };
    let client = EmailClient::from_config(&config).expect("client");

    // WHEN
    let result = client.send_email(&request()).await;

    // THEN
    assert!(matches!(result, Err(EmailClientError::Http { .. })));
}
