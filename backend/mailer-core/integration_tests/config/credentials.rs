use mailer_core::config::{LauncherConfig, ServiceCredentials};
use mailer_core::error::config::ConfigError;

use std::collections::HashMap;

use serial_test::serial;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |name| map.get(name).cloned()
}

/// **VALUE**: Verifies both credentials are read under the configured names.
#[test]
fn given_both_variables_when_credentials_read_then_returns_credentials() {
    // GIVEN
    let config = LauncherConfig::default();
    let lookup = lookup_from(&[
        ("AZURE_CONNECTION_STRING", "endpoint=https://acs;accesskey=k"),
        ("SENDER_ADDRESS", "DoNotReply@example.com"),
    ]);

    // WHEN
    let credentials = ServiceCredentials::from_lookup(&config, lookup).expect("credentials");

    // THEN
    assert_eq!(
        credentials.connection_string().expose(),
        "endpoint=https://acs;accesskey=k"
    );
    assert_eq!(credentials.sender_address(), "DoNotReply@example.com");
    assert!(credentials.validate().is_ok());
}

/// **VALUE**: Verifies a missing variable is reported by name.
///
/// **WHY THIS MATTERS**: Without the name the user has to guess which of the
/// two variables is absent.
#[test]
fn given_missing_sender_when_credentials_read_then_returns_missing_env_error() {
    // GIVEN
    let config = LauncherConfig::default();
    let lookup = lookup_from(&[("AZURE_CONNECTION_STRING", "endpoint=x")]);

    // WHEN
    let result = ServiceCredentials::from_lookup(&config, lookup);

    // THEN
    match result {
        Err(ConfigError::MissingEnv { variable, .. }) => assert_eq!(variable, "SENDER_ADDRESS"),
        other => panic!("Expected MissingEnv, got {other:?}"),
    }
}

#[test]
fn given_blank_connection_string_when_credentials_read_then_returns_missing_env_error() {
    let config = LauncherConfig::default();
    let lookup = lookup_from(&[
        ("AZURE_CONNECTION_STRING", "   "),
        ("SENDER_ADDRESS", "from@example.com"),
    ]);

    let result = ServiceCredentials::from_lookup(&config, lookup);

    assert!(matches!(
        result,
        Err(ConfigError::MissingEnv { ref variable, .. }) if variable == "AZURE_CONNECTION_STRING"
    ));
}

/// **VALUE**: Verifies Debug output of credentials hides the connection string.
///
/// **BUG THIS CATCHES**: Would catch a switch from RedactedSecret back to String.
#[test]
fn given_credentials_when_debug_formatted_then_secret_is_redacted() {
    let credentials = ServiceCredentials::new("accesskey=TOPSECRET", "from@example.com");

    let debug = format!("{credentials:?}");

    assert!(!debug.contains("TOPSECRET"));
    assert!(debug.contains("from@example.com"));
}

#[test]
fn given_empty_sender_when_validated_then_returns_validation_error() {
    let credentials = ServiceCredentials::new("accesskey=x", "");

    assert!(matches!(
        credentials.validate(),
        Err(ConfigError::ValidationError { .. })
    ));
}

/// **VALUE**: Verifies `from_env` reads the real process environment.
#[test]
#[serial]
fn given_process_environment_when_from_env_called_then_reads_variables() {
    // GIVEN: Custom variable names so the test never collides with a real setup
    let config = LauncherConfig {
        connection_string_env: "MAILER_TEST_CONNECTION_STRING".to_string(),
        sender_address_env: "MAILER_TEST_SENDER_ADDRESS".to_string(),
        ..LauncherConfig::default()
    };
    // SAFETY: serialized with other environment-touching tests
    unsafe {
        std::env::set_var("MAILER_TEST_CONNECTION_STRING", "accesskey=env");
        std::env::set_var("MAILER_TEST_SENDER_ADDRESS", "env@example.com");
    }

    // WHEN
    let result = ServiceCredentials::from_env(&config);

    // Cleanup
    unsafe {
        std::env::remove_var("MAILER_TEST_CONNECTION_STRING");
        std::env::remove_var("MAILER_TEST_SENDER_ADDRESS");
    }

    // THEN
    let credentials = result.expect("credentials from env");
    assert_eq!(credentials.connection_string().expose(), "accesskey=env");
    assert_eq!(credentials.sender_address(), "env@example.com");
}
