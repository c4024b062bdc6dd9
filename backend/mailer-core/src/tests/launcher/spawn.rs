// Unit tests for spawn module private functions
// Integration tests for the public launch flow are in integration_tests/service/lifecycle.rs

use crate::config::{LauncherConfig, ServiceCredentials};
use crate::launcher::payload::LaunchTarget;
use crate::launcher::spawn::build_launch_command;

use std::ffi::OsStr;
use std::path::PathBuf;

fn target() -> LaunchTarget {
    LaunchTarget {
        program: PathBuf::from("/tmp/mail-service-abc/app"),
        args: vec!["--flag".to_string()],
        working_dir: PathBuf::from("/tmp/mail-service-abc"),
    }
}

fn env_value<'a>(cmd: &'a tokio::process::Command, name: &str) -> Option<&'a OsStr> {
    cmd.as_std()
        .get_envs()
        .find(|(key, _)| *key == OsStr::new(name))
        .and_then(|(_, value)| value)
}

/// **VALUE**: Verifies the child receives both credentials under the default variable names.
///
/// **WHY THIS MATTERS**: The service reads `AZURE_CONNECTION_STRING` and
/// `SENDER_ADDRESS` at request time. A missing variable only shows up as a failed
/// send much later.
///
/// **BUG THIS CATCHES**: Would catch if the env names are swapped or the secret is
/// passed through its redacted Display form.
#[test]
fn given_credentials_when_build_launch_command_called_then_sets_environment() {
    // GIVEN
    let config = LauncherConfig::default();
    let credentials = ServiceCredentials::new("endpoint=x;accesskey=y", "noreply@example.com");

    // WHEN
    let cmd = build_launch_command(&target(), &config, &credentials);

    // THEN
    assert_eq!(
        env_value(&cmd, "AZURE_CONNECTION_STRING"),
        Some(OsStr::new("endpoint=x;accesskey=y"))
    );
    assert_eq!(
        env_value(&cmd, "SENDER_ADDRESS"),
        Some(OsStr::new("noreply@example.com"))
    );
}

#[test]
fn given_custom_env_names_when_build_launch_command_called_then_uses_them() {
    let config = LauncherConfig {
        connection_string_env: "ACS_CONN".to_string(),
        sender_address_env: "ACS_FROM".to_string(),
        ..LauncherConfig::default()
    };
    let credentials = ServiceCredentials::new("secret", "from@example.com");

    let cmd = build_launch_command(&target(), &config, &credentials);

    assert_eq!(env_value(&cmd, "ACS_CONN"), Some(OsStr::new("secret")));
    assert_eq!(env_value(&cmd, "ACS_FROM"), Some(OsStr::new("from@example.com")));
    assert!(env_value(&cmd, "AZURE_CONNECTION_STRING").is_none());
}

/// **VALUE**: Verifies program, arguments and working directory come from the launch target.
#[test]
fn given_launch_target_when_build_launch_command_called_then_sets_program_args_and_dir() {
    // GIVEN
    let config = LauncherConfig::default();
    let credentials = ServiceCredentials::new("secret", "from@example.com");

    // WHEN
    let cmd = build_launch_command(&target(), &config, &credentials);
    let std_cmd = cmd.as_std();

    // THEN
    assert_eq!(std_cmd.get_program(), OsStr::new("/tmp/mail-service-abc/app"));
    assert_eq!(
        std_cmd.get_args().collect::<Vec<_>>(),
        vec![OsStr::new("--flag")]
    );
    assert_eq!(
        std_cmd.get_current_dir(),
        Some(PathBuf::from("/tmp/mail-service-abc").as_path())
    );
}
