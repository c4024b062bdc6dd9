// Unit tests for argument parsing

use crate::cli::{Cli, Commands, ConfigAction, SendArgs};

use clap::{CommandFactory, Parser};
use clap::error::ErrorKind;
use std::path::PathBuf;

fn send_args(extra: &[&str]) -> Result<SendArgs, clap::Error> {
    let mut argv = vec![
        "mailer", "send", "--to", "user@example.com", "--subject", "Hi", "--text", "Hello",
    ];
    argv.extend_from_slice(extra);

    match Cli::try_parse_from(argv)?.command {
        Commands::Send(args) => Ok(args),
        other => panic!("Expected send, got {other:?}"),
    }
}

/// **VALUE**: Catches clap definition mistakes (duplicate ids, bad group members).
#[test]
fn given_cli_definition_when_asserted_then_is_consistent() {
    Cli::command().debug_assert();
}

#[test]
fn given_executable_when_parsed_then_payload_is_executable() {
    let args = send_args(&["--executable", "/opt/mail/email_service"]).unwrap();

    assert_eq!(args.executable, Some(PathBuf::from("/opt/mail/email_service")));
    assert_eq!(args.html, "", "HTML body defaults to empty");
    assert!(args.payload().is_some());
}

#[test]
fn given_script_dir_when_parsed_then_interpreter_defaults_to_python() {
    let args = send_args(&["--script-dir", "/opt/mail", "--entry", "app.py"]).unwrap();

    assert_eq!(args.interpreter, "python3");
    assert_eq!(args.entry, Some(PathBuf::from("app.py")));
    assert!(args.payload().is_some());
}

/// **VALUE**: Exactly one payload source is required.
///
/// **BUG THIS CATCHES**: Would catch the ArgGroup losing `required(true)`, which
/// would defer the failure to a runtime error after credentials were loaded.
#[test]
fn given_no_payload_when_parsed_then_fails() {
    let err = send_args(&[]).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
}

#[test]
fn given_both_payloads_when_parsed_then_conflict() {
    let err = send_args(&[
        "--executable",
        "/opt/mail/email_service",
        "--script-dir",
        "/opt/mail",
        "--entry",
        "app.py",
    ])
    .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ArgumentConflict);
}

#[test]
fn given_script_dir_without_entry_when_parsed_then_fails() {
    assert!(send_args(&["--script-dir", "/opt/mail"]).is_err());
}

#[test]
fn given_email_fields_when_request_built_then_maps_all_four() {
    let args = send_args(&["--html", "<b>Hello</b>", "--executable", "svc"]).unwrap();

    let request = args.request();

    assert_eq!(request.email, "user@example.com");
    assert_eq!(request.subject, "Hi");
    assert_eq!(request.plain_text, "Hello");
    assert_eq!(request.html_content, "<b>Hello</b>");
}

#[test]
fn given_global_flags_after_subcommand_when_parsed_then_applied() {
    let cli = Cli::try_parse_from([
        "mailer",
        "config",
        "show",
        "--verbose",
        "--config-dir",
        "/tmp/mailer-conf",
    ])
    .unwrap();

    assert!(cli.verbose);
    assert_eq!(cli.config_dir, Some(PathBuf::from("/tmp/mailer-conf")));
    assert!(matches!(
        cli.command,
        Commands::Config {
            action: ConfigAction::Show
        }
    ));
}
