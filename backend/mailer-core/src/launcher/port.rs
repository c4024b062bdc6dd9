use crate::config::{LauncherConfig, PortConflictPolicy};
use crate::discovery::process::{PortOwner, is_port_bound, port_owner, stop_pid};
use crate::error::discovery::DiscoveryError;
use crate::error::launch::LaunchError;

use common::ErrorLocation;

use std::panic::Location;

use log::{debug, info, warn};

/// Make sure the configured port is free before the service is started.
///
/// With [`PortConflictPolicy::Refuse`] an occupied port fails the launch.
/// With [`PortConflictPolicy::Reclaim`] the owning process is terminated first;
/// this only works when the owner can be identified through the socket table.
#[track_caller]
pub fn ensure_port_available(config: &LauncherConfig) -> Result<(), LaunchError> {
    let port = config.port;

    if !is_port_bound(&config.host, port) {
        debug!("Port {port} is free");
        return Ok(());
    }

    let owner = match port_owner(port) {
        Ok(owner) => owner,
        Err(e) => {
            warn!("Could not identify the owner of port {port}: {e}");
            None
        }
    };

    match config.port_conflict {
        PortConflictPolicy::Refuse => Err(port_in_use(port, owner.as_ref())),
        PortConflictPolicy::Reclaim => reclaim_port(config, owner),
    }
}

#[track_caller]
fn reclaim_port(config: &LauncherConfig, owner: Option<PortOwner>) -> Result<(), LaunchError> {
    let port = config.port;

    let Some(owner) = owner else {
        return Err(port_in_use(port, None));
    };

    warn!(
        "Reclaiming port {port}: terminating {} (PID: {})",
        owner.name, owner.pid
    );

    if !stop_pid(owner.pid) {
        return Err(LaunchError::Discovery(DiscoveryError::SystemQuery {
            message: format!(
                "Failed to terminate {} (PID: {}) holding port {port}",
                owner.name, owner.pid
            ),
            location: ErrorLocation::from(Location::caller()),
        }));
    }

    if is_port_bound(&config.host, port) {
        return Err(port_in_use(port, None));
    }

    info!("Port {port} reclaimed");
    Ok(())
}

#[track_caller]
fn port_in_use(port: u16, owner: Option<&PortOwner>) -> LaunchError {
    let message = match owner {
        Some(o) => format!("Port {port} is already in use by {} (PID: {})", o.name, o.pid),
        None => format!("Port {port} is already in use"),
    };

    LaunchError::PortInUse {
        message,
        port,
        owner_pid: owner.map(|o| o.pid),
        location: ErrorLocation::from(Location::caller()),
    }
}
