use mailer_core::config::{CONFIG_FILE_NAME, LauncherConfig, PortConflictPolicy};
use mailer_core::error::config::ConfigError;

use std::fs;

use tempfile::tempdir;

/// **VALUE**: Verifies a missing config file yields defaults instead of an error.
///
/// **WHY THIS MATTERS**: First runs have no config file. Failing there would make
/// the launcher unusable out of the box.
#[test]
fn given_missing_config_file_when_loaded_then_returns_defaults() {
    // GIVEN
    let dir = tempdir().expect("temp dir");

    // WHEN
    let config = LauncherConfig::load(dir.path()).expect("defaults");

    // THEN
    assert_eq!(config, LauncherConfig::default());
}

#[test]
fn given_config_file_when_loaded_then_uses_its_values() {
    // GIVEN
    let dir = tempdir().expect("temp dir");
    fs::write(
        dir.path().join(CONFIG_FILE_NAME),
        "port = 8105\nport_conflict = \"reclaim\"\n",
    )
    .unwrap();

    // WHEN
    let config = LauncherConfig::load(dir.path()).expect("loaded");

    // THEN
    assert_eq!(config.port, 8105);
    assert_eq!(config.port_conflict, PortConflictPolicy::Reclaim);
}

/// **VALUE**: Verifies a corrupt file is reported with its real path.
///
/// **BUG THIS CATCHES**: Would catch the parse error keeping the placeholder file
/// name instead of the path that was actually read.
#[test]
fn given_corrupt_config_file_when_loaded_then_returns_parse_error_with_path() {
    // GIVEN
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join(CONFIG_FILE_NAME);
    fs::write(&path, "port = \"not a number\"").unwrap();

    // WHEN
    let result = LauncherConfig::load(dir.path());

    // THEN
    match result {
        Err(ConfigError::ParseError { path: reported, .. }) => assert_eq!(reported, path),
        other => panic!("Expected ParseError, got {other:?}"),
    }
}

#[test]
fn given_invalid_values_in_file_when_loaded_then_returns_validation_error() {
    let dir = tempdir().expect("temp dir");
    fs::write(dir.path().join(CONFIG_FILE_NAME), "port = 0").unwrap();

    let result = LauncherConfig::load(dir.path());

    assert!(matches!(result, Err(ConfigError::ValidationError { .. })));
}

/// **VALUE**: Verifies save creates missing directories and leaves no temp file behind.
#[test]
fn given_config_when_saved_then_load_returns_same_config() {
    // GIVEN
    let dir = tempdir().expect("temp dir");
    let config_dir = dir.path().join("nested").join("mailer");
    let config = LauncherConfig {
        port: 8200,
        ..LauncherConfig::default()
    };

    // WHEN
    let written = config.save(&config_dir).expect("saved");
    let loaded = LauncherConfig::load(&config_dir).expect("loaded");

    // THEN
    assert_eq!(written, config_dir.join(CONFIG_FILE_NAME));
    assert_eq!(loaded, config);
    assert!(!config_dir.join(format!("{CONFIG_FILE_NAME}.tmp")).exists());
}

#[test]
fn given_invalid_config_when_saved_then_nothing_is_written() {
    let dir = tempdir().expect("temp dir");
    let config = LauncherConfig {
        port: 0,
        ..LauncherConfig::default()
    };

    assert!(config.save(dir.path()).is_err());
    assert!(!dir.path().join(CONFIG_FILE_NAME).exists());
}
