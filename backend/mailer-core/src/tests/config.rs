use crate::config::{LauncherConfig, PortConflictPolicy, ReadinessConfig, ReadinessProbe};
use crate::error::config::ConfigError;
use crate::{DEFAULT_SERVICE_BASE_URL, DEFAULT_SERVICE_PORT};

use std::path::PathBuf;
use std::time::Duration;

use backoff::backoff::Backoff;

/// **VALUE**: Verifies the defaults reproduce the service's fixed address and env names.
///
/// **WHY THIS MATTERS**: The bundled service listens on localhost:8005 and reads
/// `AZURE_CONNECTION_STRING` / `SENDER_ADDRESS`. Changing a default silently breaks
/// every caller that relies on it.
#[test]
fn given_default_config_when_inspected_then_matches_service_contract() {
    // GIVEN / WHEN
    let config = LauncherConfig::default();

    // THEN
    assert_eq!(config.port, DEFAULT_SERVICE_PORT);
    assert_eq!(config.base_url(), DEFAULT_SERVICE_BASE_URL);
    assert_eq!(config.base_url(), "http://localhost:8005");
    assert_eq!(config.address(), "localhost:8005");
    assert_eq!(config.endpoint, "/send-email");
    assert_eq!(config.connection_string_env, "AZURE_CONNECTION_STRING");
    assert_eq!(config.sender_address_env, "SENDER_ADDRESS");
    assert_eq!(config.port_conflict, PortConflictPolicy::Refuse);
    assert_eq!(config.readiness.probe, ReadinessProbe::Tcp);
    assert_eq!(config.readiness.timeout, Duration::from_secs(10));
    assert!(config.request_timeout.is_none());
    assert!(config.validate().is_ok());
}

/// **VALUE**: Verifies a partial TOML file fills the rest from defaults and parses durations.
///
/// **BUG THIS CATCHES**: Would catch a missing `#[serde(default)]` (partial files
/// rejected) or a broken humantime adapter (`"250ms"` not understood).
#[test]
fn given_partial_toml_when_parsed_then_merges_with_defaults() {
    // GIVEN
    let toml = r#"
        port = 9025
        port_conflict = "reclaim"
        request_timeout = "30s"

        [readiness]
        probe = "http"
        health_path = "/health"
        timeout = "2s"
        initial_interval = "250ms"
    "#;

    // WHEN
    let config = LauncherConfig::from_toml_str(toml).expect("valid config");

    // THEN
    assert_eq!(config.port, 9025);
    assert_eq!(config.host, "localhost");
    assert_eq!(config.port_conflict, PortConflictPolicy::Reclaim);
    assert_eq!(config.request_timeout, Some(Duration::from_secs(30)));
    assert_eq!(config.readiness.probe, ReadinessProbe::Http);
    assert_eq!(config.readiness.health_path, "/health");
    assert_eq!(config.readiness.timeout, Duration::from_secs(2));
    assert_eq!(config.readiness.initial_interval, Duration::from_millis(250));
    assert_eq!(config.readiness.max_interval, Duration::from_secs(1));
}

#[test]
fn given_invalid_duration_when_parsed_then_returns_parse_error() {
    let toml = r#"
        [readiness]
        timeout = "soon"
    "#;

    let result = LauncherConfig::from_toml_str(toml);

    assert!(matches!(result, Err(ConfigError::ParseError { .. })));
}

#[test]
fn given_unknown_probe_when_parsed_then_returns_parse_error() {
    let toml = r#"
        [readiness]
        probe = "sleep"
    "#;

    assert!(matches!(
        LauncherConfig::from_toml_str(toml),
        Err(ConfigError::ParseError { .. })
    ));
}

/// **VALUE**: Verifies the serialized config parses back to the same values.
///
/// **WHY THIS MATTERS**: `mailer config init` writes this text to disk and later
/// launches read it back.
#[test]
fn given_custom_config_when_written_as_toml_then_reads_back_identically() {
    // GIVEN
    let config = LauncherConfig {
        port: 9100,
        temp_root: Some(PathBuf::from("/var/tmp/mailer")),
        request_timeout: Some(Duration::from_millis(1500)),
        readiness: ReadinessConfig {
            timeout: Duration::from_secs(3),
            ..ReadinessConfig::default()
        },
        ..LauncherConfig::default()
    };

    // WHEN
    let text = config.to_toml_string().expect("serializable");
    let parsed = LauncherConfig::from_toml_str(&text).expect("parsable");

    // THEN
    assert_eq!(parsed, config);
}

fn assert_validation_error(config: LauncherConfig, expected: &str) {
    match config.validate() {
        Err(ConfigError::ValidationError { reason, .. }) => {
            assert!(
                reason.contains(expected),
                "Expected reason containing {expected:?}, got {reason:?}"
            );
        }
        other => panic!("Expected validation error, got {other:?}"),
    }
}

/// **VALUE**: Verifies each validation rule fires.
///
/// **BUG THIS CATCHES**: Would catch a rule being dropped in refactoring, letting a
/// zero port or zero timeout through to the launcher where it fails obscurely.
#[test]
fn given_invalid_values_when_validated_then_returns_validation_errors() {
    let base = LauncherConfig::default;

    assert_validation_error(
        LauncherConfig {
            port: 0,
            ..base()
        },
        "port",
    );
    assert_validation_error(
        LauncherConfig {
            host: " ".to_string(),
            ..base()
        },
        "host",
    );
    assert_validation_error(
        LauncherConfig {
            endpoint: "send-email".to_string(),
            ..base()
        },
        "endpoint",
    );
    assert_validation_error(
        LauncherConfig {
            sender_address_env: "AZURE_CONNECTION_STRING".to_string(),
            ..base()
        },
        "both",
    );
    assert_validation_error(
        LauncherConfig {
            request_timeout: Some(Duration::ZERO),
            ..base()
        },
        "request_timeout",
    );
    assert_validation_error(
        LauncherConfig {
            readiness: ReadinessConfig {
                timeout: Duration::ZERO,
                ..ReadinessConfig::default()
            },
            ..base()
        },
        "readiness.timeout",
    );
    assert_validation_error(
        LauncherConfig {
            readiness: ReadinessConfig {
                initial_interval: Duration::from_secs(5),
                max_interval: Duration::from_secs(1),
                ..ReadinessConfig::default()
            },
            ..base()
        },
        "intervals",
    );
    assert_validation_error(
        LauncherConfig {
            readiness: ReadinessConfig {
                health_path: "health".to_string(),
                ..ReadinessConfig::default()
            },
            ..base()
        },
        "health_path",
    );
}

/// **VALUE**: Verifies the readiness backoff starts near the configured interval.
///
/// **BUG THIS CATCHES**: Would catch a missing `reset()` after building the
/// backoff, which leaves the first wait at the library's 500ms default.
#[test]
fn given_readiness_config_when_backoff_built_then_first_interval_follows_config() {
    // GIVEN
    let readiness = ReadinessConfig {
        initial_interval: Duration::from_millis(20),
        max_interval: Duration::from_millis(40),
        ..ReadinessConfig::default()
    };

    // WHEN
    let mut backoff = readiness.backoff();
    let first = backoff.next_backoff().expect("within timeout");

    // THEN: randomization is at most +/-50%
    assert!(first >= Duration::from_millis(10), "first={first:?}");
    assert!(first <= Duration::from_millis(30), "first={first:?}");
}
