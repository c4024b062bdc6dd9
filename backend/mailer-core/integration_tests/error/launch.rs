use mailer_core::error::config::ConfigError;
use mailer_core::error::launch::LaunchError;

use common::{ErrorLocation, ModelError};

use std::error::Error;
use std::io::Error as IoError;
use std::io::ErrorKind;
use std::panic::Location;

/// **VALUE**: Verifies each launch failure kind renders its own prefix.
///
/// **WHY THIS MATTERS**: Users see only the rendered string. "Extraction" (disk),
/// "Process Start" (binary/interpreter) and "Readiness Timeout" (service never
/// listened) point at entirely different fixes.
#[test]
fn given_each_launch_error_kind_when_formatted_then_uses_distinct_prefix() {
    // GIVEN
    let location = ErrorLocation::from(Location::caller());
    let cases = vec![
        (
            LaunchError::Extraction {
                message: "disk full".to_string(),
                location,
                source: Box::new(IoError::new(ErrorKind::StorageFull, "disk full")),
            },
            "Extraction Error: disk full",
        ),
        (
            LaunchError::ProcessStart {
                message: "Mail service exited with exit status: 3".to_string(),
                location,
                source: None,
            },
            "Process Start Error: Mail service exited",
        ),
        (
            LaunchError::ReadinessTimeout {
                message: "127.0.0.1:8005 did not accept connections within 10s".to_string(),
                location,
            },
            "Readiness Timeout Error: 127.0.0.1:8005",
        ),
        (
            LaunchError::PortInUse {
                message: "Port 8005 is already in use by python (PID: 7)".to_string(),
                port: 8005,
                owner_pid: Some(7),
                location,
            },
            "Port In Use Error: Port 8005",
        ),
        (
            LaunchError::State {
                message: "Cannot launch a service in state Stopped".to_string(),
                location,
            },
            "State Error: Cannot launch",
        ),
    ];

    // WHEN / THEN
    for (err, expected_prefix) in cases {
        let rendered = err.to_string();
        assert!(
            rendered.starts_with(expected_prefix),
            "{rendered:?} should start with {expected_prefix:?}"
        );
        assert!(rendered.contains("error/launch.rs"), "{rendered:?} should carry location");
    }
}

/// **VALUE**: Verifies the optional source of ProcessStart is exposed when present.
#[test]
fn given_process_start_with_io_source_when_inspected_then_preserves_chain() {
    let err = LaunchError::ProcessStart {
        message: "Failed to start python3".to_string(),
        location: ErrorLocation::from(Location::caller()),
        source: Some(Box::new(IoError::new(ErrorKind::NotFound, "No such file"))),
    };

    let source = err.source().expect("source must be preserved");

    assert_eq!(source.to_string(), "No such file");
}

#[test]
fn given_process_start_without_source_when_inspected_then_has_no_source() {
    let err = LaunchError::ProcessStart {
        message: "exited early".to_string(),
        location: ErrorLocation::from(Location::caller()),
        source: None,
    };

    assert!(err.source().is_none());
}

/// **VALUE**: Verifies config errors pass through unchanged.
///
/// **BUG THIS CATCHES**: Would catch the `#[error(transparent)]` being replaced by
/// a wrapper that hides the variable name of a MissingEnv error.
#[test]
fn given_config_error_when_converted_then_display_is_transparent() {
    let config_err = ConfigError::MissingEnv {
        location: ErrorLocation::from(Location::caller()),
        variable: "SENDER_ADDRESS".to_string(),
    };
    let expected = config_err.to_string();

    let err: LaunchError = config_err.into();

    assert_eq!(err.to_string(), expected);
    assert!(matches!(err, LaunchError::Config(ConfigError::MissingEnv { .. })));
}

#[test]
fn given_model_error_when_converted_then_becomes_validation_error() {
    let model_err = ModelError::Validation {
        message: "PID must be non-zero".to_string(),
        location: ErrorLocation::from(Location::caller()),
    };

    let err: LaunchError = model_err.into();

    match err {
        LaunchError::Validation { message, .. } => assert_eq!(message, "PID must be non-zero"),
        other => panic!("Expected Validation, got {other:?}"),
    }
}
