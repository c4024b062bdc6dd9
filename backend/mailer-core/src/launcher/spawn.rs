use crate::config::{LauncherConfig, ServiceCredentials};
use crate::error::launch::LaunchError;
use crate::launcher::payload::LaunchTarget;

use common::ErrorLocation;

use std::panic::Location;
use std::process::Stdio;

use log::{debug, info};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Child as TokioChild;
use tokio::process::Command as TokioCommand;
use tokio::spawn as TokioSpawn;

const STDOUT_LABEL: &str = "stdout";
const STDERR_LABEL: &str = "stderr";

pub(crate) fn build_launch_command(
    target: &LaunchTarget,
    config: &LauncherConfig,
    credentials: &ServiceCredentials,
) -> TokioCommand {
    let mut cmd = TokioCommand::new(&target.program);
    cmd.args(&target.args)
        .current_dir(&target.working_dir)
        .env(
            &config.connection_string_env,
            credentials.connection_string().expose(),
        )
        .env(&config.sender_address_env, credentials.sender_address())
        .stdin(Stdio::null())
        .kill_on_drop(true);

    if config.forward_output {
        cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
    } else {
        cmd.stdout(Stdio::null()).stderr(Stdio::null());
    }

    cmd
}

/// Start the materialized service as a child process.
///
/// The connection secret and sender address are added to the inherited
/// environment under the names from `config`. Must be called inside a tokio runtime.
#[track_caller]
pub fn spawn_service(
    target: &LaunchTarget,
    config: &LauncherConfig,
    credentials: &ServiceCredentials,
) -> Result<TokioChild, LaunchError> {
    debug!(
        "Starting {} {:?} in {}",
        target.program.display(),
        target.args,
        target.working_dir.display()
    );

    let mut child = build_launch_command(target, config, credentials)
        .spawn()
        .map_err(|e| LaunchError::ProcessStart {
            message: format!("Failed to start {}: {e}", target.program.display()),
            location: ErrorLocation::from(Location::caller()),
            source: Some(Box::new(e)),
        })?;

    info!(
        "Started {} (PID: {:?})",
        target.program.display(),
        child.id()
    );

    if let Some(stdout) = child.stdout.take() {
        forward_lines(stdout, STDOUT_LABEL);
    }
    if let Some(stderr) = child.stderr.take() {
        forward_lines(stderr, STDERR_LABEL);
    }

    Ok(child)
}

fn forward_lines<R>(stream: R, label: &'static str)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    TokioSpawn(async move {
        let mut lines = BufReader::new(stream).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            debug!("Mail service {label}: {line}");
        }
    });
}
