use mailer::commands::config::{init, show};
use mailer::commands::resolve_config_dir;
use mailer::error::MailerError;

use mailer_core::LauncherConfig;

use std::fs;

use tempfile::tempdir;

/// **VALUE**: `config init` writes a loadable default file exactly once.
///
/// **WHY THIS MATTERS**: Re-running init must not wipe a user's edited port or
/// env var names.
#[test]
fn given_empty_dir_when_init_twice_then_creates_once_and_keeps_edits() {
    // GIVEN
    let dir = tempdir().unwrap();

    // WHEN
    let (path, created) = init(dir.path()).expect("first init");
    fs::write(&path, "port = 9100\n").unwrap();
    let (same_path, created_again) = init(dir.path()).expect("second init");

    // THEN
    assert!(created);
    assert!(!created_again);
    assert_eq!(path, same_path);
    assert_eq!(LauncherConfig::load(dir.path()).unwrap().port, 9100);
}

#[test]
fn given_no_file_when_show_then_renders_defaults() {
    let dir = tempdir().unwrap();

    let rendered = show(dir.path()).expect("show");

    assert!(rendered.contains("port = 8005"));
    assert!(rendered.contains("endpoint = \"/send-email\""));
    assert!(rendered.contains("[readiness]"));
}

/// **VALUE**: A broken config file is reported through the app error type.
#[test]
fn given_invalid_file_when_show_then_returns_core_error() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("mailer.toml"), "port = \"not a number\"\n").unwrap();

    let err = show(dir.path()).unwrap_err();

    assert!(matches!(err, MailerError::Core { .. }));
    assert!(err.to_string().contains("mailer.toml"));
}

#[test]
fn given_explicit_dir_when_resolved_then_used_verbatim() {
    let dir = tempdir().unwrap();

    let resolved = resolve_config_dir(Some(dir.path())).unwrap();

    assert_eq!(resolved, dir.path());
}
