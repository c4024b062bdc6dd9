use mailer_core::LauncherConfig;
use mailer_core::config::PortConflictPolicy;
use mailer_core::discovery::process::{is_port_bound, is_process_alive};
use mailer_core::error::launch::LaunchError;
use mailer_core::launcher::port::ensure_port_available;

use crate::helpers::{free_port, test_config};
#[cfg(unix)]
use crate::helpers::foreign_listener;

use std::net::TcpListener;
use std::time::Duration;

use serial_test::serial;

/// **VALUE**: Launch refuses an occupied port instead of killing its owner.
///
/// **WHY THIS MATTERS**: The old approach killed whatever held the port, which can
/// be an unrelated user process. The default now fails with the port number.
#[test]
#[serial]
fn given_occupied_port_when_policy_is_refuse_then_returns_port_in_use() {
    // GIVEN
    let listener = TcpListener::bind("127.0.0.1:0").expect("listener");
    let port = listener.local_addr().unwrap().port();
    let config = test_config(port, Duration::from_secs(1));

    // WHEN
    let result = ensure_port_available(&config);

    // THEN
    match result {
        Err(LaunchError::PortInUse {
            port: reported,
            owner_pid,
            ..
        }) => {
            assert_eq!(reported, port);
            if let Some(pid) = owner_pid {
                assert_eq!(pid, std::process::id());
            }
        }
        other => panic!("Expected PortInUse, got {other:?}"),
    }
}

#[test]
#[serial]
fn given_free_port_when_checked_then_returns_ok() {
    let config = test_config(free_port(), Duration::from_secs(1));

    assert!(ensure_port_available(&config).is_ok());
}

/// **VALUE**: Reclaim never terminates the launcher's own process.
///
/// **BUG THIS CATCHES**: Would catch the self-PID guard in `stop_pid` being removed,
/// which would make this test kill the test runner.
#[test]
#[serial]
fn given_port_owned_by_self_when_policy_is_reclaim_then_fails_without_killing() {
    // GIVEN
    let listener = TcpListener::bind("127.0.0.1:0").expect("listener");
    let port = listener.local_addr().unwrap().port();
    let mut config = test_config(port, Duration::from_secs(1));
    config.port_conflict = PortConflictPolicy::Reclaim;

    // WHEN
    let result = ensure_port_available(&config);

    // THEN: Either the owner is us (refused) or unknown (PortInUse)
    assert!(matches!(
        result,
        Err(LaunchError::Discovery(_)) | Err(LaunchError::PortInUse { .. })
    ));
    assert!(listener.local_addr().is_ok());
}

/// **VALUE**: The default `localhost` host refuses a port held on IPv4 loopback.
///
/// **WHY THIS MATTERS**: Every other test pins `127.0.0.1`. With the default host,
/// `localhost` may resolve to `::1` first, where the port is free.
#[test]
#[serial]
fn given_default_host_and_port_held_on_ipv4_when_checked_then_returns_port_in_use() {
    // GIVEN
    let occupant = TcpListener::bind("127.0.0.1:0").expect("occupant");
    let port = occupant.local_addr().unwrap().port();
    let config = LauncherConfig {
        port,
        ..LauncherConfig::default()
    };
    assert_eq!(config.host, "localhost");

    // WHEN
    let result = ensure_port_available(&config);

    // THEN
    assert!(
        matches!(result, Err(LaunchError::PortInUse { port: p, .. }) if p == port),
        "Expected PortInUse, got {result:?}"
    );
}

/// **VALUE**: Reclaim terminates a foreign owner and lets the launch continue.
///
/// **WHY THIS MATTERS**: A crashed earlier launch can leave a stale service on
/// the port. With `port_conflict = "reclaim"` that process is replaced.
#[cfg(unix)]
#[test]
#[serial]
fn given_port_held_by_other_process_when_policy_is_reclaim_then_owner_is_stopped() {
    // GIVEN
    let (mut occupant, port) = foreign_listener();
    let occupant_pid = occupant.id();
    let mut config = test_config(port, Duration::from_secs(1));
    config.port_conflict = PortConflictPolicy::Reclaim;

    // WHEN
    let result = ensure_port_available(&config);
    let alive_after = is_process_alive(occupant_pid);
    let _ = occupant.kill();
    let _ = occupant.wait();

    // THEN: Where socket ownership is hidden the owner is unknown and refused
    match result {
        Ok(()) => {
            assert!(!alive_after, "Owner must be gone once reclaim succeeds");
            assert!(!is_port_bound("127.0.0.1", port));
        }
        Err(LaunchError::PortInUse { owner_pid: None, .. }) => {}
        Err(other) => panic!("Expected reclaim to succeed, got {other:?}"),
    }
}
