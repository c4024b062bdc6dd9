use mailer_core::error::discovery::DiscoveryError;

use common::ErrorLocation;

use std::error::Error;
use std::io::Error as IoError;
use std::io::ErrorKind;
use std::panic::Location;

/// **VALUE**: Verifies socket table failures render kind, message and location.
///
/// **WHY THIS MATTERS**: When /proc is not readable the launcher logs this error and
/// falls back to an anonymous PortInUse. The log line is the only trace of why.
#[test]
fn given_network_query_error_when_formatted_then_includes_kind_message_and_location() {
    // GIVEN
    let err = DiscoveryError::NetworkQuery {
        message: "Failed to query network sockets: permission denied".to_string(),
        location: ErrorLocation::from(Location::caller()),
        source: Box::new(IoError::new(ErrorKind::PermissionDenied, "permission denied")),
    };

    // WHEN
    let rendered = err.to_string();

    // THEN
    assert!(rendered.starts_with("Network Query Error: Failed to query network sockets"));
    assert!(rendered.contains("error/discovery.rs"));
}

/// **VALUE**: Verifies the OS error stays reachable through `source()`.
///
/// **BUG THIS CATCHES**: Would catch a dropped `#[source]` attribute.
#[test]
fn given_network_query_error_when_source_inspected_then_returns_io_error() {
    let err = DiscoveryError::NetworkQuery {
        message: "Failed to query network sockets".to_string(),
        location: ErrorLocation::from(Location::caller()),
        source: Box::new(IoError::new(ErrorKind::PermissionDenied, "access denied")),
    };

    let source = err.source().expect("source must be preserved");

    assert_eq!(source.to_string(), "access denied");
}

/// **VALUE**: Verifies a failed port reclaim names the process it could not stop.
#[test]
fn given_system_query_error_when_formatted_then_names_the_process() {
    let err = DiscoveryError::SystemQuery {
        message: "Failed to terminate python (PID: 4242) holding port 8005".to_string(),
        location: ErrorLocation::from(Location::caller()),
    };

    let rendered = err.to_string();

    assert!(rendered.starts_with("System Query Error"));
    assert!(rendered.contains("PID: 4242"));
    assert!(err.source().is_none());
}
