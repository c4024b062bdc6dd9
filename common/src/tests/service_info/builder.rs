use crate::{ModelError, ServiceInfoBuilder};

fn valid_builder() -> ServiceInfoBuilder {
    ServiceInfoBuilder::default()
        .with_pid(4242)
        .with_port(8005)
        .with_base_url("http://localhost:8005")
        .with_program("/tmp/mailer-payload-x/app")
        .with_working_dir("/tmp/mailer-payload-x")
}

/// **VALUE**: Verifies that builder validation rejects zero PIDs.
///
/// **WHY THIS MATTERS**: PID 0 is never a real child. A ServiceInfo with PID 0
/// would make liveness checks report on the wrong process.
#[test]
fn given_zero_pid_when_building_service_info_then_returns_validation_error() {
    // GIVEN: Builder with PID set to zero
    let builder = valid_builder().with_pid(0);

    // WHEN: Attempting to build
    let result = builder.build();

    // THEN: Should return validation error
    match result {
        Err(ModelError::Validation { message, .. }) => {
            assert_eq!(message, "PID must be non-zero");
        }
        Ok(info) => panic!("Expected validation error, got {info:?}"),
    }
}

#[test]
fn given_missing_pid_when_building_then_returns_validation_error() {
    let builder = ServiceInfoBuilder::default()
        .with_port(8005)
        .with_base_url("http://localhost:8005")
        .with_program("app");

    let result = builder.build();

    assert!(matches!(
        result,
        Err(ModelError::Validation { ref message, .. }) if message == "PID is required"
    ));
}

/// **VALUE**: Verifies that non-HTTP base URLs are rejected.
///
/// **BUG THIS CATCHES**: Would catch if the scheme check is removed and a
/// `localhost:8005` style value (no scheme) slips into the handle.
#[test]
fn given_invalid_url_scheme_when_building_then_returns_validation_error() {
    // GIVEN: A base URL without scheme
    let builder = valid_builder().with_base_url("localhost:8005");

    // WHEN
    let result = builder.build();

    // THEN
    assert!(result.is_err(), "Should reject URL without http(s) scheme");
}

#[test]
fn given_zero_port_when_building_then_returns_validation_error() {
    let result = valid_builder().with_port(0).build();

    assert!(result.is_err());
}

#[test]
fn given_empty_program_when_building_then_returns_validation_error() {
    let result = valid_builder().with_program("").build();

    assert!(result.is_err());
}

/// **VALUE**: Verifies the happy path produces a ServiceInfo with every field set.
#[test]
fn given_all_valid_fields_when_building_then_returns_service_info() {
    // GIVEN: A fully populated builder
    let builder = valid_builder();

    // WHEN
    let info = builder.build().expect("valid builder should build");

    // THEN
    assert_eq!(info.pid, 4242);
    assert_eq!(info.port, 8005);
    assert_eq!(info.base_url, "http://localhost:8005");
    assert_eq!(info.program, "/tmp/mailer-payload-x/app");
    assert_eq!(info.working_dir, "/tmp/mailer-payload-x");
}

#[test]
fn given_missing_working_dir_when_building_then_defaults_to_empty() {
    let info = ServiceInfoBuilder::default()
        .with_pid(1)
        .with_port(1)
        .with_base_url("https://localhost:1")
        .with_program("app")
        .build()
        .expect("working dir is optional");

    assert!(info.working_dir.is_empty());
}
