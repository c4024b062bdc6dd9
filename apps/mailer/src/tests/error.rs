// Unit tests for error module

use crate::error::MailerError;

use mailer_core::error::config::ConfigError;
use mailer_core::error::launch::LaunchError;

use common::ErrorLocation;

use std::panic::Location;

/// **VALUE**: Core errors keep their full rendered text when flattened.
///
/// **WHY THIS MATTERS**: The CLI prints one line per failure. If the conversion
/// dropped the inner message the user would only see "Core Error".
#[test]
fn given_launch_error_when_converted_then_keeps_core_message() {
    // GIVEN
    let launch = LaunchError::PortInUse {
        message: "Port 8005 is held by python (PID: 77)".to_string(),
        port: 8005,
        owner_pid: Some(77),
        location: ErrorLocation::from(Location::caller()),
    };

    // WHEN
    let err = MailerError::from(launch);

    // THEN
    let rendered = err.to_string();
    assert!(rendered.starts_with("Core Error: Port In Use Error: Port 8005"));
    assert!(matches!(err, MailerError::Core { .. }));
}

/// **VALUE**: The `?` conversion records where the app received the error.
///
/// **BUG THIS CATCHES**: Would catch `#[track_caller]` missing on one of the
/// chained `From` impls, which would point every location at error.rs.
#[test]
fn given_config_error_when_converted_with_question_mark_then_location_is_caller() {
    fn load() -> Result<(), MailerError> {
        Err(ConfigError::MissingEnv {
            location: ErrorLocation::from(Location::caller()),
            variable: "SENDER_ADDRESS".to_string(),
        })?;
        Ok(())
    }

    let err = load().unwrap_err();

    match err {
        MailerError::Core { message, location } => {
            assert!(message.contains("SENDER_ADDRESS"));
            assert!(location.file.ends_with("tests/error.rs"), "{location}");
        }
        other => panic!("Expected Core error, got {other:?}"),
    }
}

#[test]
fn given_app_error_when_formatted_then_uses_mailer_prefix() {
    let err = MailerError::Mailer {
        message: "Failed to create log directory".to_string(),
        location: ErrorLocation::from(Location::caller()),
    };

    assert!(err.to_string().starts_with("Mailer Error: Failed to create log directory"));
}
