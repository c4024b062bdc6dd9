use mailer_core::error::email_client::EmailClientError;

use common::{ErrorLocation, HttpStatusCode};

use std::panic::Location;

/// **VALUE**: Verifies a remote error shows the status and the service's own message.
///
/// **WHY THIS MATTERS**: `{"error": "..."}` from the service is usually the provider's
/// explanation (unverified sender domain, invalid recipient).
#[test]
fn given_remote_error_when_formatted_then_includes_status_and_message() {
    // GIVEN
    let err = EmailClientError::Remote {
        status: HttpStatusCode(500),
        message: "boom".to_string(),
        location: ErrorLocation::from(Location::caller()),
    };

    // WHEN
    let rendered = err.to_string();

    // THEN
    assert!(rendered.starts_with("Remote Error: HTTP 500 - boom"));
    assert!(rendered.contains("error/email_client.rs"));
}

/// **VALUE**: Verifies `?` on a url parse failure records the caller's location.
///
/// **BUG THIS CATCHES**: Would catch a missing `#[track_caller]` on the `From` impl,
/// which makes every converted error point at the error module.
#[test]
fn given_url_parse_failure_when_converted_then_location_is_call_site() {
    // GIVEN
    fn parse(raw: &str) -> Result<url::Url, EmailClientError> {
        Ok(url::Url::parse(raw)?)
    }

    // WHEN
    let err = parse("::not a url::").expect_err("invalid url");

    // THEN
    match err {
        EmailClientError::UrlParse { location, .. } => {
            assert!(location.file.contains("integration_tests"));
        }
        other => panic!("Expected UrlParse, got {other:?}"),
    }
}

#[test]
fn given_not_running_error_when_formatted_then_mentions_state() {
    let err = EmailClientError::NotRunning {
        message: "Mail service is Stopped".to_string(),
        location: ErrorLocation::from(Location::caller()),
    };

    assert!(err.to_string().starts_with("Not Running Error: Mail service is Stopped"));
}
