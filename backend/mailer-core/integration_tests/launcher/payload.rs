use mailer_core::error::launch::LaunchError;
use mailer_core::launcher::payload::{
    EmbeddedExecutable, LaunchTarget, ResourceProvider, ScriptBundle, materialize_payload,
};

use std::fs;
use std::io::{Error as IoError, ErrorKind};
use std::path::Path;

use tempfile::tempdir;

/// Provider that writes one file and then fails, to observe cleanup.
struct HalfWrittenProvider;

impl ResourceProvider for HalfWrittenProvider {
    fn name(&self) -> &str {
        "half-written"
    }

    fn materialize(&self, dir: &Path) -> Result<LaunchTarget, IoError> {
        fs::write(dir.join("app"), b"#!/bin/sh\n")?;
        Err(IoError::new(ErrorKind::Other, "disk went away"))
    }
}

fn entries(dir: &Path) -> usize {
    fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
}

/// **VALUE**: Verifies the payload lands in a fresh, prefixed directory under the temp root.
#[test]
fn given_provider_when_materialized_then_creates_fresh_prefixed_dir() {
    // GIVEN
    let root = tempdir().expect("temp root");
    let provider = EmbeddedExecutable::new("email_service", &b"#!/bin/sh\nexit 0\n"[..]);

    // WHEN
    let first = materialize_payload(&provider, Some(root.path())).expect("first");
    let second = materialize_payload(&provider, Some(root.path())).expect("second");

    // THEN
    assert_ne!(first.path(), second.path(), "Each launch gets its own dir");
    assert!(first.path().starts_with(root.path()));
    let dir_name = first.path().file_name().unwrap().to_string_lossy().to_string();
    assert!(dir_name.starts_with("email_service-"), "{dir_name}");
    assert!(first.target.program.is_file());
}

/// **VALUE**: Verifies closing the payload removes its directory.
///
/// **WHY THIS MATTERS**: Every launch unpacks a full service. Without cleanup,
/// each run leaves another copy in the temp dir.
#[test]
fn given_materialized_payload_when_closed_then_directory_is_removed() {
    // GIVEN
    let root = tempdir().expect("temp root");
    let bundle = ScriptBundle::new("svc", "sh", "run.sh").with_file("run.sh", &b"exit 0\n"[..]);
    let payload = materialize_payload(&bundle, Some(root.path())).expect("materialized");
    let path = payload.path().to_path_buf();

    // WHEN
    payload.close().expect("closed");

    // THEN
    assert!(!path.exists());
    assert_eq!(entries(root.path()), 0);
}

/// **VALUE**: Extraction faults cleanly when the temp directory cannot be created.
///
/// **WHY THIS MATTERS**: A read-only or missing temp root must produce an
/// Extraction error, never a panic and never a half-written runnable payload.
#[test]
fn given_temp_root_is_a_file_when_materialized_then_returns_extraction_error() {
    // GIVEN: A temp root that is a regular file
    let scratch = tempdir().expect("scratch");
    let not_a_dir = scratch.path().join("occupied");
    fs::write(&not_a_dir, b"").unwrap();
    let provider = EmbeddedExecutable::new("app", &b"#!/bin/sh\n"[..]);

    // WHEN
    let result = materialize_payload(&provider, Some(&not_a_dir));

    // THEN
    assert!(matches!(result, Err(LaunchError::Extraction { .. })));
    assert_eq!(entries(scratch.path()), 1, "Only the blocking file remains");
}

#[test]
fn given_missing_temp_root_when_materialized_then_returns_extraction_error() {
    let scratch = tempdir().expect("scratch");
    let missing = scratch.path().join("does").join("not").join("exist");
    let provider = EmbeddedExecutable::new("app", &b"#!/bin/sh\n"[..]);

    let result = materialize_payload(&provider, Some(&missing));

    assert!(matches!(result, Err(LaunchError::Extraction { .. })));
    assert!(!missing.exists());
}

/// **VALUE**: A provider failing midway leaves nothing runnable behind.
///
/// **BUG THIS CATCHES**: Would catch the temp dir being kept (e.g. via `keep()`)
/// before materialization has succeeded.
#[test]
fn given_provider_failing_midway_when_materialized_then_partial_files_are_removed() {
    // GIVEN
    let root = tempdir().expect("temp root");

    // WHEN
    let result = materialize_payload(&HalfWrittenProvider, Some(root.path()));

    // THEN
    match result {
        Err(LaunchError::Extraction { message, .. }) => {
            assert!(message.contains("disk went away"));
        }
        other => panic!("Expected Extraction error, got {other:?}"),
    }
    assert_eq!(entries(root.path()), 0, "Partial payload must be removed");
}
