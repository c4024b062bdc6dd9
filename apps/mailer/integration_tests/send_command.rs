use mailer::cli::{Cli, Commands, SendArgs};
use mailer::commands::send::run;
use mailer::error::MailerError;

use mailer_core::LauncherConfig;

use std::fs;
use std::net::TcpListener;
use std::path::Path;

use clap::Parser;
use serial_test::serial;
use tempfile::{TempDir, tempdir};

const SECRET_ENV: &str = "MAILER_APP_TEST_CONNECTION_STRING";
const SENDER_ENV: &str = "MAILER_APP_TEST_SENDER_ADDRESS";

fn parse_send(argv: &[&str]) -> SendArgs {
    let mut full = vec!["mailer", "send"];
    full.extend_from_slice(argv);
    match Cli::try_parse_from(full).expect("valid args").command {
        Commands::Send(args) => args,
        other => panic!("Expected send, got {other:?}"),
    }
}

/// Config dir whose env var names are private to these tests.
fn config_dir(port: u16) -> TempDir {
    let dir = tempdir().unwrap();
    let config = LauncherConfig {
        host: "127.0.0.1".to_string(),
        port,
        connection_string_env: SECRET_ENV.to_string(),
        sender_address_env: SENDER_ENV.to_string(),
        ..LauncherConfig::default()
    };
    config.save(dir.path()).unwrap();
    dir
}

fn free_port() -> u16 {
    TcpListener::bind("127.0.0.1:0")
        .and_then(|l| l.local_addr())
        .map(|a| a.port())
        .unwrap()
}

fn set_credentials() {
    // SAFETY: serialized with other environment-touching tests
    unsafe {
        std::env::set_var(SECRET_ENV, "endpoint=https://example/;accesskey=abc");
        std::env::set_var(SENDER_ENV, "noreply@example.com");
    }
}

fn clear_credentials() {
    // SAFETY: serialized with other environment-touching tests
    unsafe {
        std::env::remove_var(SECRET_ENV);
        std::env::remove_var(SENDER_ENV);
    }
}

fn write_script(dir: &Path, body: &str) {
    fs::write(dir.join("run.sh"), body).unwrap();
}

/// **VALUE**: Missing credentials fail before anything is launched.
#[tokio::test]
#[serial]
async fn given_missing_credentials_when_sending_then_names_the_variable() {
    // GIVEN
    clear_credentials();
    let config = config_dir(free_port());
    let args = parse_send(&[
        "--to", "user@example.com", "--subject", "Hi", "--text", "Hello",
        "--executable", "/nonexistent/email_service",
    ]);

    // WHEN
    let err = run(config.path(), &args).await.unwrap_err();

    // THEN
    assert!(matches!(err, MailerError::Core { .. }));
    assert!(err.to_string().contains(SECRET_ENV), "{err}");
}

/// **VALUE**: A missing recipient is rejected before the service is launched.
///
/// **BUG THIS CATCHES**: Would catch validation moving after `EmailService::start`,
/// which would spend a full launch on a request that can never succeed.
#[tokio::test]
#[serial]
async fn given_empty_recipient_when_sending_then_fails_without_launching() {
    // GIVEN: An executable path that would fail to launch if it were reached
    set_credentials();
    let config = config_dir(free_port());
    let args = parse_send(&[
        "--to", "", "--subject", "Hi", "--text", "Hello",
        "--executable", "/nonexistent/email_service",
    ]);

    // WHEN
    let err = run(config.path(), &args).await.unwrap_err();
    clear_credentials();

    // THEN
    let rendered = err.to_string();
    assert!(rendered.contains("Validation"), "{rendered}");
    assert!(!rendered.contains("Extraction"), "{rendered}");
}

/// **VALUE**: A service that dies on startup surfaces as a launch failure.
#[cfg(unix)]
#[tokio::test]
#[serial]
async fn given_script_exiting_immediately_when_sending_then_reports_process_start() {
    // GIVEN
    set_credentials();
    let config = config_dir(free_port());
    let scripts = tempdir().unwrap();
    write_script(scripts.path(), "exit 1\n");
    let script_dir = scripts.path().to_string_lossy().to_string();
    let args = parse_send(&[
        "--to", "user@example.com", "--subject", "Hi", "--text", "Hello",
        "--script-dir", &script_dir, "--entry", "run.sh", "--interpreter", "sh",
    ]);

    // WHEN
    let err = run(config.path(), &args).await.unwrap_err();
    clear_credentials();

    // THEN
    assert!(err.to_string().contains("Process Start Error"), "{err}");
}
