use crate::error::discovery::DiscoveryError;

use common::ErrorLocation;

use std::io::ErrorKind;
use std::net::{SocketAddr, TcpListener, ToSocketAddrs};
use std::panic::Location;
use std::thread::sleep;
use std::time::Duration;

use backoff::{ExponentialBackoff, backoff::Backoff};
use log::{debug, trace};
use netstat2::{
    AddressFamilyFlags, ProtocolFlags, ProtocolSocketInfo, SocketInfo, TcpState, get_sockets_info,
};
use sysinfo::{Pid, Process, ProcessRefreshKind, ProcessStatus, ProcessesToUpdate, Signal, System};

const KILL_VERIFY_MAX_ELAPSED: Duration = Duration::from_secs(5);
const FORCE_KILL_VERIFY_MAX_ELAPSED: Duration = Duration::from_secs(2);
const INIT_PID: u32 = 1;

/// A process found listening on a TCP port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortOwner {
    pub pid: u32,
    pub name: String,
    pub command: String,
}

#[track_caller]
fn query_tcp_sockets() -> Result<Vec<SocketInfo>, DiscoveryError> {
    get_sockets_info(
        AddressFamilyFlags::IPV4 | AddressFamilyFlags::IPV6,
        ProtocolFlags::TCP,
    )
    .map_err(|e| DiscoveryError::NetworkQuery {
        message: format!("Failed to query network sockets: {e}"),
        location: ErrorLocation::from(Location::caller()),
        source: Box::new(e),
    })
}

/// Check whether something is already listening on `host:port`.
///
/// `host` may resolve to several addresses (`localhost` is usually both `::1`
/// and `127.0.0.1`). The port counts as bound if any of them is taken.
/// An unresolvable host is logged and reported as free.
pub fn is_port_bound(host: &str, port: u16) -> bool {
    match (host, port).to_socket_addrs() {
        Ok(addrs) => is_bound_on_any(addrs),
        Err(e) => {
            debug!("Could not resolve {host}:{port} ({e}), treating port as free");
            false
        }
    }
}

/// Try to bind each address in turn; `true` at the first `AddrInUse`.
///
/// Other bind failures (no IPv6 on this host, permission) skip that address.
pub fn is_bound_on_any<I>(addrs: I) -> bool
where
    I: IntoIterator<Item = SocketAddr>,
{
    for addr in addrs {
        match TcpListener::bind(addr) {
            Ok(_) => trace!("{addr} is free"),
            Err(e) if e.kind() == ErrorKind::AddrInUse => {
                debug!("{addr} is already bound");
                return true;
            }
            Err(e) => debug!("Bind check on {addr} failed ({e}), skipping"),
        }
    }

    false
}

/// Find the process listening on `port`, if the OS socket table can tell.
///
/// # Returns
///
/// * `Ok(Some(PortOwner))` - A listening socket with an associated PID was found
/// * `Ok(None)` - Nothing listens on the port, or the owner is not visible to us
/// * `Err(DiscoveryError)` - The socket table could not be queried
#[track_caller]
pub fn port_owner(port: u16) -> Result<Option<PortOwner>, DiscoveryError> {
    let sockets = query_tcp_sockets()?;

    for s in sockets {
        if let ProtocolSocketInfo::Tcp(tcp) = s.protocol_socket_info
            && tcp.state == TcpState::Listen
            && tcp.local_port == port
            && let Some(&pid) = s.associated_pids.first()
        {
            trace!("Found process {pid} listening on port {port}");

            let data = with_process(pid, |p| {
                (p.name().to_string_lossy().to_string(), format_command(p))
            });

            if let Some((name, command)) = data {
                debug!("Port {port} is owned by {name} (PID: {pid})");
                return Ok(Some(PortOwner { pid, name, command }));
            }

            trace!("Process {pid} disappeared before we could read its info");
        }
    }

    debug!("No process found listening on port {port}");
    Ok(None)
}

#[track_caller]
pub(crate) fn with_process<F, R>(pid: u32, f: F) -> Option<R>
where
    F: FnOnce(&Process) -> R,
{
    let mut sys = System::new();
    sys.refresh_processes_specifics(
        ProcessesToUpdate::Some(&[Pid::from_u32(pid)]),
        true,
        ProcessRefreshKind::everything(),
    );

    sys.process(Pid::from_u32(pid)).map(f)
}

pub(crate) fn format_command(process: &Process) -> String {
    process
        .cmd()
        .iter()
        .map(|s| s.to_string_lossy().to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Whether a live (non-zombie) process with this PID exists.
pub fn is_process_alive(pid: u32) -> bool {
    with_process(pid, |p| !matches!(p.status(), ProcessStatus::Zombie)).unwrap_or(false)
}

/// Stop a process by PID.
///
/// Attempts graceful termination (SIGTERM) first, falls back to force kill (SIGKILL).
/// Uses exponential backoff to verify the process has terminated, waiting up to 5 seconds,
/// then sends SIGKILL and verifies again for up to 2 seconds.
/// PID 1 and the current process are never signalled.
///
/// # Returns
///
/// * `true` - If the process was successfully terminated
/// * `false` - If the process doesn't exist, is protected, or couldn't be killed
pub fn stop_pid(pid: u32) -> bool {
    if pid == INIT_PID || pid == std::process::id() {
        debug!("Refusing to stop protected PID {pid}");
        return false;
    }

    let killed = with_process(pid, |p| {
        if let Some(sent) = p.kill_with(Signal::Term) {
            debug!("Sent SIGTERM to PID {pid}: success={sent}");
            sent
        } else {
            let killed = p.kill();
            debug!("Sent SIGKILL to PID {pid}: success={killed}");
            killed
        }
    })
    .unwrap_or_else(|| {
        debug!("Process {pid} not found");
        false
    });

    if !killed {
        return false;
    }

    if wait_for_exit(pid, KILL_VERIFY_MAX_ELAPSED) {
        return true;
    }

    debug!("Process {pid} still running after max backoff time, sending SIGKILL");
    if with_process(pid, |p| p.kill()) == Some(false) {
        debug!("SIGKILL to PID {pid} was not delivered");
    }

    wait_for_exit(pid, FORCE_KILL_VERIFY_MAX_ELAPSED)
}

/// Poll until `pid` is gone or `max_elapsed` has passed.
fn wait_for_exit(pid: u32, max_elapsed: Duration) -> bool {
    let mut backoff = ExponentialBackoff {
        initial_interval: Duration::from_millis(50),
        max_elapsed_time: Some(max_elapsed),
        ..Default::default()
    };
    backoff.reset();

    loop {
        if !is_process_alive(pid) {
            debug!("Process {pid} successfully terminated");
            return true;
        }

        match backoff.next_backoff() {
            Some(duration) => {
                trace!("Process {pid} still alive, retrying after {duration:?}");
                sleep(duration);
            }
            None => {
                debug!("Process {pid} still alive after {max_elapsed:?}");
                return false;
            }
        }
    }
}
