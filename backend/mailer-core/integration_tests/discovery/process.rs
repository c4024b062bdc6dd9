use mailer_core::discovery::process::{
    is_bound_on_any, is_port_bound, is_process_alive, port_owner, stop_pid,
};

use crate::helpers::free_port;

use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, TcpListener};
use std::time::Duration;

use serial_test::serial;

// ============================================================================
// Public API tests for port and process inspection
// ============================================================================

// ----------------------------------------------------------------------------
// stop_pid()
// ----------------------------------------------------------------------------

/// **VALUE**: Verifies that `stop_pid()` gracefully handles non-existent processes.
///
/// **WHY THIS MATTERS**: The owner of a port can exit between discovery and
/// termination. That must not crash the launcher.
#[test]
fn given_nonexistent_pid_when_stop_pid_called_then_returns_false() {
    // GIVEN: A PID that doesn't exist
    let fake_pid = u32::MAX;

    // WHEN
    let result = stop_pid(fake_pid);

    // THEN
    assert!(!result, "Should return false for non-existent process");
}

/// **VALUE**: Refuses to kill PID 1 (init/systemd).
///
/// **WHY THIS MATTERS**: With `port_conflict = "reclaim"`, a socket table quirk
/// that attributes the port to PID 1 would otherwise take down the machine.
#[test]
fn given_pid_1_when_stop_pid_called_then_refuses_and_returns_false() {
    assert!(!stop_pid(1), "Should never kill PID 1 (init process)");
}

#[test]
fn given_own_pid_when_stop_pid_called_then_refuses_and_returns_false() {
    assert!(!stop_pid(std::process::id()), "Should never kill itself");
}

/// **VALUE**: Verifies a real process is terminated and reported as such.
#[cfg(unix)]
#[test]
#[serial]
fn given_running_child_when_stop_pid_called_then_terminates_it() {
    // GIVEN: A long running child
    let mut child = std::process::Command::new("sleep")
        .arg("30")
        .spawn()
        .expect("sleep should be available");
    let pid = child.id();
    assert!(is_process_alive(pid));

    // WHEN
    let stopped = stop_pid(pid);

    // THEN
    assert!(stopped, "Child should have been terminated");
    let _ = child.wait();
    assert!(!is_process_alive(pid));
}

/// **VALUE**: A process that ignores SIGTERM is force killed and verified gone.
///
/// **BUG THIS CATCHES**: Would catch `stop_pid()` reporting success as soon as
/// SIGKILL is sent, before the process has actually exited. A reclaim would
/// then re-check the port while the old owner still holds it.
#[cfg(unix)]
#[test]
#[serial]
fn given_child_ignoring_sigterm_when_stop_pid_called_then_force_kills_and_verifies() {
    // GIVEN: A child with SIGTERM ignored
    let mut child = std::process::Command::new("sh")
        .args(["-c", "trap '' TERM; exec sleep 30"])
        .spawn()
        .expect("sh should be available");
    let pid = child.id();
    std::thread::sleep(Duration::from_millis(200));

    // WHEN
    let stopped = stop_pid(pid);

    // THEN: Only reported once the process is really gone
    assert!(stopped, "SIGKILL fallback should terminate the child");
    assert!(!is_process_alive(pid));
    let _ = child.wait();
}

// ----------------------------------------------------------------------------
// is_port_bound() / port_owner()
// ----------------------------------------------------------------------------

/// **VALUE**: Verifies the bind probe sees an existing listener.
///
/// **WHY THIS MATTERS**: This is the check that replaces "kill whatever owns the
/// port". If it misses a listener, the readiness probe later connects to the wrong
/// process and the launch "succeeds" against it.
#[test]
#[serial]
fn given_listener_when_is_port_bound_called_then_returns_true() {
    // GIVEN
    let listener = TcpListener::bind("127.0.0.1:0").expect("listener");
    let port = listener.local_addr().unwrap().port();

    // WHEN / THEN
    assert!(is_port_bound("127.0.0.1", port));
}

/// **VALUE**: A host resolving to several addresses counts as bound if any is taken.
///
/// **WHY THIS MATTERS**: `localhost` commonly resolves to `::1` first and then
/// `127.0.0.1`. Binding only the first address that works would report a port
/// held on `127.0.0.1` as free, and the launcher would then talk to the
/// foreign process as if it were its own service.
#[test]
#[serial]
fn given_ipv6_first_and_ipv4_taken_when_checked_then_returns_true() {
    // GIVEN: A listener on IPv4 only
    let listener = TcpListener::bind("127.0.0.1:0").expect("listener");
    let port = listener.local_addr().unwrap().port();
    let addrs = [
        SocketAddr::from((Ipv6Addr::LOCALHOST, port)),
        SocketAddr::from((Ipv4Addr::LOCALHOST, port)),
    ];

    // WHEN / THEN
    assert!(is_bound_on_any(addrs));
}

/// **VALUE**: The default host is checked the same way.
#[test]
#[serial]
fn given_listener_on_ipv4_loopback_when_localhost_checked_then_returns_true() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("listener");
    let port = listener.local_addr().unwrap().port();

    assert!(is_port_bound("localhost", port));
}

#[test]
#[serial]
fn given_listener_on_ipv6_loopback_when_localhost_checked_then_returns_true() {
    // GIVEN: Skip where IPv6 loopback is missing or localhost does not map to it
    let Ok(listener) = TcpListener::bind("[::1]:0") else {
        return;
    };
    let port = listener.local_addr().unwrap().port();
    let localhost_has_v6 = std::net::ToSocketAddrs::to_socket_addrs(&("localhost", port))
        .map(|mut addrs| addrs.any(|a| a.is_ipv6()))
        .unwrap_or(false);
    if !localhost_has_v6 {
        return;
    }

    // WHEN / THEN
    assert!(is_port_bound("localhost", port));
}

#[test]
#[serial]
fn given_free_port_on_every_address_when_checked_then_returns_false() {
    let port = free_port();
    let addrs = [
        SocketAddr::from((Ipv6Addr::LOCALHOST, port)),
        SocketAddr::from((Ipv4Addr::LOCALHOST, port)),
    ];

    assert!(!is_bound_on_any(addrs));
    assert!(!is_port_bound("localhost", port));
}

#[test]
fn given_unresolvable_host_when_is_port_bound_called_then_returns_false() {
    assert!(!is_port_bound("host.invalid", free_port()));
}

#[test]
#[serial]
fn given_free_port_when_is_port_bound_called_then_returns_false() {
    let port = free_port();

    assert!(!is_port_bound("127.0.0.1", port));
}

/// **VALUE**: Verifies the owner lookup attributes our own listener to our PID.
///
/// **ENVIRONMENT-DEPENDENT**: Some sandboxes hide socket ownership. `Ok(None)` is
/// accepted there; a wrong PID or an error is not.
#[test]
#[serial]
fn given_own_listener_when_port_owner_called_then_reports_own_pid() {
    // GIVEN
    let listener = TcpListener::bind("127.0.0.1:0").expect("listener");
    let port = listener.local_addr().unwrap().port();

    // WHEN
    let result = port_owner(port);

    // THEN
    let owner = result.expect("socket table should be queryable");
    if let Some(owner) = owner {
        assert_eq!(owner.pid, std::process::id());
    }
}

#[test]
#[serial]
fn given_free_port_when_port_owner_called_then_returns_none() {
    let port = free_port();

    let result = port_owner(port);

    assert!(matches!(result, Ok(None)));
}

#[test]
fn given_own_pid_when_is_process_alive_called_then_returns_true() {
    assert!(is_process_alive(std::process::id()));
    assert!(!is_process_alive(u32::MAX));
}
