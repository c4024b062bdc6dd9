// Unit tests for payload providers
// Materialization into temp dirs (and its failure modes) is covered in integration_tests/launcher/payload.rs

use crate::launcher::payload::{EmbeddedExecutable, PathPayload, ResourceProvider, ScriptBundle};

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use tempfile::tempdir;

/// **VALUE**: Verifies an embedded executable lands on disk with exec permissions.
///
/// **WHY THIS MATTERS**: The original payload is a single frozen binary. Without the
/// exec bit the spawn fails with "permission denied".
#[test]
fn given_embedded_executable_when_materialized_then_writes_executable_file() {
    // GIVEN
    let dir = tempdir().expect("temp dir");
    let provider = EmbeddedExecutable::new("app", &b"#!/bin/sh\nexit 0\n"[..]);

    // WHEN
    let target = provider.materialize(dir.path()).expect("materialized");

    // THEN
    assert_eq!(target.program, dir.path().join("app"));
    assert!(target.args.is_empty());
    assert_eq!(target.working_dir, dir.path());
    assert_eq!(fs::read(&target.program).unwrap(), b"#!/bin/sh\nexit 0\n");

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = fs::metadata(&target.program).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }
}

#[test]
fn given_empty_embedded_executable_when_materialized_then_returns_invalid_data() {
    let dir = tempdir().expect("temp dir");
    let provider = EmbeddedExecutable::new("app", Vec::new());

    let err = provider.materialize(dir.path()).expect_err("empty payload");

    assert_eq!(err.kind(), ErrorKind::InvalidData);
}

/// **VALUE**: Verifies a script bundle writes nested files and runs the entry through the interpreter.
///
/// **WHY THIS MATTERS**: The script variant of the service is a directory tree
/// (`app.py` plus helper modules) started as `python3 app.py`.
#[test]
fn given_script_bundle_when_materialized_then_writes_tree_and_targets_interpreter() {
    // GIVEN
    let dir = tempdir().expect("temp dir");
    let bundle = ScriptBundle::new("email-service", "python3", "app.py")
        .with_file("app.py", &b"print('hi')"[..])
        .with_file("lib/helpers.py", &b"X = 1"[..]);

    // WHEN
    let target = bundle.materialize(dir.path()).expect("materialized");

    // THEN
    assert_eq!(target.program, PathBuf::from("python3"));
    assert_eq!(
        target.args,
        vec![dir.path().join("app.py").to_string_lossy().to_string()]
    );
    assert!(dir.path().join("lib/helpers.py").is_file());
    assert_eq!(bundle.name(), "email-service");
}

/// **VALUE**: Verifies bundle paths cannot escape the payload directory.
///
/// **BUG THIS CATCHES**: Would catch a `../` entry writing outside the temp dir,
/// e.g. over a file in the user's home.
#[test]
fn given_escaping_path_when_materialized_then_returns_invalid_input() {
    // GIVEN
    let dir = tempdir().expect("temp dir");
    let nested = dir.path().join("payload");
    fs::create_dir(&nested).unwrap();
    let bundle = ScriptBundle::new("evil", "sh", "run.sh")
        .with_file("run.sh", &b"exit 0"[..])
        .with_file("../escaped.sh", &b"exit 0"[..]);

    // WHEN
    let err = bundle.materialize(&nested).expect_err("escaping path");

    // THEN
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
    assert!(!dir.path().join("escaped.sh").exists());
}

#[test]
fn given_absolute_path_when_materialized_then_returns_invalid_input() {
    let dir = tempdir().expect("temp dir");
    let bundle = ScriptBundle::new("abs", "sh", "run.sh").with_file("/tmp/run.sh", &b""[..]);

    let err = bundle.materialize(dir.path()).expect_err("absolute path");

    assert_eq!(err.kind(), ErrorKind::InvalidInput);
}

#[test]
fn given_missing_entry_when_materialized_then_returns_not_found() {
    let dir = tempdir().expect("temp dir");
    let bundle = ScriptBundle::new("noentry", "sh", "run.sh").with_file("other.sh", &b""[..]);

    let err = bundle.materialize(dir.path()).expect_err("missing entry");

    assert_eq!(err.kind(), ErrorKind::NotFound);
}

/// **VALUE**: Verifies a script directory on disk is copied recursively.
#[test]
fn given_script_dir_when_materialized_then_copies_tree() {
    // GIVEN
    let source = tempdir().expect("source dir");
    fs::write(source.path().join("app.py"), "print('hi')").unwrap();
    fs::create_dir(source.path().join("pkg")).unwrap();
    fs::write(source.path().join("pkg/mod.py"), "X = 1").unwrap();
    let destination = tempdir().expect("destination dir");
    let payload = PathPayload::script_dir(source.path(), "app.py", "python3");

    // WHEN
    let target = payload.materialize(destination.path()).expect("materialized");

    // THEN
    assert_eq!(target.program, PathBuf::from("python3"));
    assert!(destination.path().join("app.py").is_file());
    assert!(destination.path().join("pkg/mod.py").is_file());
    assert_eq!(target.working_dir, destination.path());
}

#[test]
fn given_executable_path_when_materialized_then_copies_file_with_same_name() {
    let source = tempdir().expect("source dir");
    let exe = source.path().join("email_service");
    fs::write(&exe, "#!/bin/sh\n").unwrap();
    let destination = tempdir().expect("destination dir");
    let payload = PathPayload::executable(&exe);

    let target = payload.materialize(destination.path()).expect("materialized");

    assert_eq!(payload.name(), "email_service");
    assert_eq!(target.program, destination.path().join("email_service"));
    assert!(target.program.is_file());
}

#[test]
fn given_missing_executable_path_when_materialized_then_returns_error() {
    let destination = tempdir().expect("destination dir");
    let payload = PathPayload::executable("/nonexistent/mailer/app");

    assert!(payload.materialize(destination.path()).is_err());
}
