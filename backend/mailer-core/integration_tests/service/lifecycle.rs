use mailer_core::config::{LauncherConfig, PortConflictPolicy, ReadinessProbe, ServiceCredentials};
use mailer_core::discovery::process::is_process_alive;
use mailer_core::error::email_client::EmailClientError;
use mailer_core::error::launch::LaunchError;
use mailer_core::{EmailRequest, EmailService, SERVICE_NAME, ScriptBundle, ServiceState};

use crate::helpers::{free_port, http_service_script, python3_available, test_config};
#[cfg(unix)]
use crate::helpers::foreign_listener;

use std::path::{Path, PathBuf};
use std::time::Duration;

use serial_test::serial;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio::time::sleep;

const LONG_RUNNING_SCRIPT: &[u8] = b"printf '%s\\n%s\\n' \"$AZURE_CONNECTION_STRING\" \"$SENDER_ADDRESS\" > env.txt\nexec sleep 30\n";

fn credentials() -> ServiceCredentials {
    ServiceCredentials::new("endpoint=https://example/;accesskey=abc", "noreply@example.com")
}

fn script(body: &'static [u8]) -> ScriptBundle {
    ScriptBundle::new(SERVICE_NAME, "sh", "run.sh").with_file("run.sh", body)
}

/// Config whose temp root is a scratch dir, so leftovers can be counted.
fn scratch_config(port: u16, timeout: Duration) -> (LauncherConfig, TempDir) {
    let root = tempfile::tempdir().expect("temp root");
    let mut config = test_config(port, timeout);
    config.temp_root = Some(root.path().to_path_buf());
    (config, root)
}

/// Stand-in for the service's HTTP listener: the script only sleeps, so the
/// test binds the port on its behalf shortly after launch begins.
fn listen_later(port: u16, delay: Duration) -> JoinHandle<std::io::Result<TcpListener>> {
    tokio::spawn(async move {
        sleep(delay).await;
        TcpListener::bind(("127.0.0.1", port)).await
    })
}

async fn read_when_written(path: &Path) -> String {
    for _ in 0..40 {
        let contents = std::fs::read_to_string(path).unwrap_or_default();
        if contents.lines().count() >= 2 {
            return contents;
        }
        sleep(Duration::from_millis(50)).await;
    }
    panic!("{} was never written", path.display());
}

fn entries(dir: &Path) -> usize {
    std::fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
}

/// **VALUE**: Launch then Stop leaves no live child and no payload on disk.
///
/// **WHY THIS MATTERS**: The launcher owns a real OS process holding a secret in
/// its environment. Stopping must reliably end it.
///
/// **BUG THIS CATCHES**: Would catch `stop()` dropping the child handle without
/// killing it, or keeping the temp dir alive.
#[cfg(unix)]
#[tokio::test]
#[serial]
async fn given_launched_service_when_stopped_then_child_is_gone_and_payload_removed() {
    // GIVEN
    let port = free_port();
    let (config, root) = scratch_config(port, Duration::from_secs(5));
    let listener = listen_later(port, Duration::from_millis(300));

    // WHEN
    let mut service = EmailService::start(config, script(LONG_RUNNING_SCRIPT), &credentials())
        .await
        .expect("service should launch");

    // THEN: Running with a live child
    assert_eq!(service.state(), ServiceState::Running);
    assert!(service.is_running());
    assert_eq!(service.base_url(), format!("http://127.0.0.1:{port}"));

    let info = service.info().cloned().expect("info while running");
    assert_eq!(info.port, port);
    assert!(is_process_alive(info.pid), "Child should be alive");
    let working_dir = PathBuf::from(&info.working_dir);
    assert!(working_dir.starts_with(root.path()));

    // WHEN: Stopped
    assert!(service.stop().await, "A live child should be terminated");

    // THEN
    assert_eq!(service.state(), ServiceState::Stopped);
    assert!(service.info().is_none());
    assert!(!is_process_alive(info.pid), "Child must not survive stop");
    assert!(!working_dir.exists(), "Payload dir must be removed");
    assert_eq!(entries(root.path()), 0);

    drop(listener.await);
}

/// **VALUE**: The child sees both configured variables in its environment.
///
/// **BUG THIS CATCHES**: Would catch the env var names being swapped or the
/// secret being passed in redacted form.
#[cfg(unix)]
#[tokio::test]
#[serial]
async fn given_credentials_when_launched_then_child_receives_both_env_vars() {
    // GIVEN
    let port = free_port();
    let (config, _root) = scratch_config(port, Duration::from_secs(5));
    let listener = listen_later(port, Duration::from_millis(300));

    // WHEN
    let mut service = EmailService::start(config, script(LONG_RUNNING_SCRIPT), &credentials())
        .await
        .expect("service should launch");

    // THEN: The script ran in the payload dir and dumped its environment there
    let env_file = PathBuf::from(&service.info().expect("running").working_dir).join("env.txt");
    let contents = read_when_written(&env_file).await;
    let mut lines = contents.lines();
    assert_eq!(lines.next(), Some("endpoint=https://example/;accesskey=abc"));
    assert_eq!(lines.next(), Some("noreply@example.com"));

    service.stop().await;
    drop(listener.await);
}

/// **VALUE**: Stop is idempotent and safe before launch.
#[tokio::test]
#[serial]
async fn given_never_launched_service_when_stopped_twice_then_no_fault() {
    // GIVEN
    let config = test_config(free_port(), Duration::from_secs(1));
    let mut service = EmailService::new(config, script(LONG_RUNNING_SCRIPT)).expect("handle");

    // WHEN / THEN
    assert!(!service.stop().await);
    assert!(!service.stop().await);
    assert_eq!(service.state(), ServiceState::NotStarted);
}

/// **VALUE**: Lifecycle is linear; a stopped handle cannot be relaunched.
///
/// **WHY THIS MATTERS**: Reusing a handle after stop would silently start a
/// second service with a stale payload. Callers must create a new handle.
#[cfg(unix)]
#[tokio::test]
#[serial]
async fn given_stopped_service_when_launched_again_then_returns_state_error() {
    // GIVEN
    let port = free_port();
    let (config, _root) = scratch_config(port, Duration::from_secs(5));
    let listener = listen_later(port, Duration::from_millis(300));
    let mut service = EmailService::start(config, script(LONG_RUNNING_SCRIPT), &credentials())
        .await
        .expect("service should launch");
    service.stop().await;
    assert!(!service.stop().await, "Second stop is a no-op");

    // WHEN
    let result = service.launch(&credentials()).await;

    // THEN
    assert!(matches!(result, Err(LaunchError::State { .. })));
    assert_eq!(service.state(), ServiceState::Stopped);

    drop(listener.await);
}

/// **VALUE**: A child that exits during the readiness wait fails fast.
///
/// **BUG THIS CATCHES**: Would catch the readiness loop ignoring `try_wait()` and
/// running out the whole timeout on a dead process.
#[cfg(unix)]
#[tokio::test]
#[serial]
async fn given_child_exiting_early_when_launched_then_returns_process_start() {
    // GIVEN
    let (config, root) = scratch_config(free_port(), Duration::from_secs(10));
    let mut service = EmailService::new(config, script(b"exit 3\n")).expect("handle");
    let started = std::time::Instant::now();

    // WHEN
    let result = service.launch(&credentials()).await;

    // THEN
    match result {
        Err(LaunchError::ProcessStart { message, .. }) => {
            assert!(message.contains('3'), "Exit status should be reported: {message}");
        }
        other => panic!("Expected ProcessStart, got {other:?}"),
    }
    assert!(started.elapsed() < Duration::from_secs(10));
    assert_eq!(service.state(), ServiceState::NotStarted);
    assert_eq!(entries(root.path()), 0, "Failed launch must clean up");
}

/// **VALUE**: A child that never listens is killed after the readiness window.
#[cfg(unix)]
#[tokio::test]
#[serial]
async fn given_child_never_listening_when_launched_then_returns_readiness_timeout() {
    // GIVEN
    let (config, root) = scratch_config(free_port(), Duration::from_millis(400));
    let mut service = EmailService::new(config, script(b"exec sleep 30\n")).expect("handle");

    // WHEN
    let result = service.launch(&credentials()).await;

    // THEN
    assert!(matches!(result, Err(LaunchError::ReadinessTimeout { .. })));
    assert!(!service.is_running());
    assert_eq!(entries(root.path()), 0);
}

/// **VALUE**: An occupied port is reported, not reclaimed, by default.
#[tokio::test]
#[serial]
async fn given_occupied_port_when_launched_then_returns_port_in_use() {
    // GIVEN
    let occupant = std::net::TcpListener::bind("127.0.0.1:0").expect("occupant");
    let port = occupant.local_addr().unwrap().port();
    let (config, root) = scratch_config(port, Duration::from_secs(1));
    let mut service = EmailService::new(config, script(LONG_RUNNING_SCRIPT)).expect("handle");

    // WHEN
    let result = service.launch(&credentials()).await;

    // THEN
    assert!(matches!(result, Err(LaunchError::PortInUse { port: p, .. }) if p == port));
    assert_eq!(entries(root.path()), 0, "Nothing is materialized on refusal");
}

#[tokio::test]
#[serial]
async fn given_blank_credentials_when_launched_then_fails_before_spawning() {
    let (config, root) = scratch_config(free_port(), Duration::from_secs(1));
    let mut service = EmailService::new(config, script(LONG_RUNNING_SCRIPT)).expect("handle");

    let result = service
        .launch(&ServiceCredentials::new("   ", "noreply@example.com"))
        .await;

    assert!(matches!(result, Err(LaunchError::Config(_))));
    assert_eq!(entries(root.path()), 0);
}

/// **VALUE**: Sending through a handle that is not running never hits the network.
#[tokio::test]
async fn given_not_running_service_when_sending_then_returns_not_running() {
    // GIVEN
    let config = test_config(free_port(), Duration::from_secs(1));
    let service = EmailService::new(config, script(LONG_RUNNING_SCRIPT)).expect("handle");
    let request = EmailRequest::new("user@example.com", "Hi", "Hello", "");

    // WHEN
    let result = service.send_email(&request).await;

    // THEN
    assert!(matches!(result, Err(EmailClientError::NotRunning { .. })));
}

fn http_service(port: u16) -> ScriptBundle {
    ScriptBundle::new(SERVICE_NAME, "python3", "app.py")
        .with_file("app.py", http_service_script(port).into_bytes())
}

/// **VALUE**: Full round trip: launch a real HTTP service, send, get its message back.
///
/// **WHY THIS MATTERS**: This is the whole contract of the handle. The child
/// must receive the sender address through its environment and the response
/// `message` must come back unchanged.
#[tokio::test]
#[serial]
async fn given_running_http_service_when_sending_then_returns_service_message() {
    if !python3_available() {
        eprintln!("python3 not available, skipping");
        return;
    }

    // GIVEN
    let port = free_port();
    let (config, root) = scratch_config(port, Duration::from_secs(10));
    let mut service = EmailService::start(config, http_service(port), &credentials())
        .await
        .expect("service should launch");

    // WHEN
    let message = service
        .send_email(&EmailRequest::new("user@example.com", "Hi", "Hello", "<b>Hello</b>"))
        .await;

    // THEN
    assert_eq!(
        message.expect("send should succeed"),
        "Email sent successfully from noreply@example.com"
    );

    assert!(service.stop().await);
    assert_eq!(entries(root.path()), 0);
}

/// **VALUE**: Launch with the HTTP readiness probe waits for the service to answer.
#[tokio::test]
#[serial]
async fn given_http_probe_when_launching_http_service_then_becomes_running() {
    if !python3_available() {
        eprintln!("python3 not available, skipping");
        return;
    }

    // GIVEN
    let port = free_port();
    let (mut config, _root) = scratch_config(port, Duration::from_secs(10));
    config.readiness.probe = ReadinessProbe::Http;

    // WHEN
    let mut service = EmailService::start(config, http_service(port), &credentials())
        .await
        .expect("service should launch");

    // THEN: Ready means the first send works without retry
    assert!(service.is_running());
    let result = service
        .send_email(&EmailRequest::new("user@example.com", "Hi", "Hello", ""))
        .await;
    assert!(result.is_ok(), "Expected success, got {result:?}");

    service.stop().await;
}

/// **VALUE**: A non-2xx answer from the running service comes back as a remote error
/// carrying the service's `error` field.
#[tokio::test]
#[serial]
async fn given_running_http_service_when_endpoint_unknown_then_returns_remote_error() {
    if !python3_available() {
        eprintln!("python3 not available, skipping");
        return;
    }

    let port = free_port();
    let (config, _root) = scratch_config(port, Duration::from_secs(10));
    let mut service = EmailService::start(config, http_service(port), &credentials())
        .await
        .expect("service should launch");

    // Same service, endpoint it does not serve
    let mut wrong_endpoint = service.config().clone();
    wrong_endpoint.endpoint = "/missing".to_string();
    let client = mailer_core::EmailClient::from_config(&wrong_endpoint).expect("client");
    let result = client
        .send_email(&EmailRequest::new("user@example.com", "Hi", "Hello", ""))
        .await;

    assert!(matches!(
        result,
        Err(EmailClientError::Remote { ref message, .. }) if message == "not found"
    ));

    service.stop().await;
}

/// **VALUE**: With reclaim, a stale process on the port is replaced by the new service.
///
/// **WHY THIS MATTERS**: This is the opt-in path that terminates whatever
/// holds the port and then carries on with the launch.
#[cfg(unix)]
#[tokio::test]
#[serial]
async fn given_stale_process_on_port_when_launching_with_reclaim_then_replaces_it() {
    if !python3_available() {
        eprintln!("python3 not available, skipping");
        return;
    }

    // GIVEN
    let (mut stale, port) = foreign_listener();
    let stale_pid = stale.id();
    let (mut config, _root) = scratch_config(port, Duration::from_secs(10));
    config.port_conflict = PortConflictPolicy::Reclaim;

    // WHEN
    let result = EmailService::start(config, http_service(port), &credentials()).await;
    let stale_alive = is_process_alive(stale_pid);
    let _ = stale.kill();
    let _ = stale.wait();

    // THEN: Where socket ownership is hidden the owner is unknown and refused
    match result {
        Ok(mut service) => {
            assert!(!stale_alive, "Stale owner must be terminated");
            let sent = service
                .send_email(&EmailRequest::new("user@example.com", "Hi", "Hello", ""))
                .await;
            assert!(sent.is_ok(), "New service should answer, got {sent:?}");
            service.stop().await;
        }
        Err(LaunchError::PortInUse { owner_pid: None, .. }) => {}
        Err(other) => panic!("Expected reclaim and launch, got {other:?}"),
    }
}
