use crate::config::{LauncherConfig, ReadinessConfig, ReadinessProbe};
use crate::error::launch::LaunchError;

use common::ErrorLocation;

use std::future::Future;
use std::panic::Location;
use std::time::{Duration, Instant};

use backoff::backoff::Backoff;
use log::{debug, info, trace};
use reqwest::Client;
use tokio::net::TcpStream;
use tokio::process::Child as TokioChild;
use tokio::time::{sleep as TokioSleep, timeout as TokioTimeout};

const CONNECT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(1);
const CHECK_HEALTH_DURATION: Duration = Duration::from_secs(3);

/// Check if the service answers HTTP on `path`.
///
/// Performs a GET on `{base_url}{path}` with a 3-second timeout.
///
/// # Returns
///
/// * `true` - If the service responds with HTTP 2xx
/// * `false` - If the request fails, times out, or returns any other status
pub async fn check_health(base_url: &str, path: &str) -> bool {
    let url = format!("{base_url}{path}");
    let client = Client::new();

    match client.get(&url).timeout(CHECK_HEALTH_DURATION).send().await {
        Ok(resp) if resp.status().is_success() => {
            trace!("Health check succeeded for {url}");
            true
        }
        Ok(resp) => {
            trace!("Health check failed for {url}: status={}", resp.status());
            false
        }
        Err(e) => {
            trace!("Health check failed for {url}: {e}");
            false
        }
    }
}

/// Whether a TCP connection to `address` can be opened right now.
pub async fn check_port(address: &str) -> bool {
    match TokioTimeout(CONNECT_ATTEMPT_TIMEOUT, TcpStream::connect(address)).await {
        Ok(Ok(_)) => true,
        Ok(Err(e)) => {
            trace!("Connect to {address} failed: {e}");
            false
        }
        Err(_) => {
            trace!("Connect to {address} timed out");
            false
        }
    }
}

/// Wait until `address` accepts TCP connections.
///
/// Polls with exponential backoff bounded by `readiness.timeout`.
///
/// # Errors
///
/// Returns [`LaunchError::ReadinessTimeout`] if nothing is listening before the window closes.
#[track_caller]
pub fn wait_for_port<'a>(
    address: &'a str,
    readiness: &'a ReadinessConfig,
) -> impl Future<Output = Result<(), LaunchError>> + 'a {
    let location = ErrorLocation::from(Location::caller());
    poll_until_ready(address, readiness, None, move || check_port(address), location)
}

/// Wait until the freshly started service is ready, watching for early exit.
///
/// Fails with [`LaunchError::ProcessStart`] if the child exits during the wait
/// and with [`LaunchError::ReadinessTimeout`] when the window closes.
#[track_caller]
pub fn wait_for_service<'a>(
    child: &'a mut TokioChild,
    config: &'a LauncherConfig,
    address: &'a str,
    base_url: &'a str,
) -> impl Future<Output = Result<(), LaunchError>> + 'a {
    let location = ErrorLocation::from(Location::caller());
    let readiness = &config.readiness;
    let health_path = readiness.health_path.as_str();
    let probe = readiness.probe;

    poll_until_ready(
        address,
        readiness,
        Some(child),
        move || async move {
            match probe {
                ReadinessProbe::Tcp => check_port(address).await,
                ReadinessProbe::Http => check_health(base_url, health_path).await,
            }
        },
        location,
    )
}

async fn poll_until_ready<F, Fut>(
    address: &str,
    readiness: &ReadinessConfig,
    mut child: Option<&mut TokioChild>,
    mut probe: F,
    location: ErrorLocation,
) -> Result<(), LaunchError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let mut backoff = readiness.backoff();
    let deadline = Instant::now() + readiness.timeout;

    debug!(
        "Waiting up to {:?} for {address} to accept connections",
        readiness.timeout
    );

    loop {
        if let Some(child) = child.as_deref_mut() {
            match child.try_wait() {
                Ok(Some(status)) => {
                    return Err(LaunchError::ProcessStart {
                        message: format!(
                            "Mail service exited with {status} before accepting connections on {address}"
                        ),
                        location,
                        source: None,
                    });
                }
                Ok(None) => {}
                Err(e) => {
                    return Err(LaunchError::ProcessStart {
                        message: format!("Failed to poll mail service process: {e}"),
                        location,
                        source: Some(Box::new(e)),
                    });
                }
            }
        }

        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(readiness_timeout(address, readiness, location));
        }

        // A single attempt may not outlive the readiness window.
        if TokioTimeout(remaining, probe()).await.unwrap_or(false) {
            info!("Mail service is ready at {address}");
            return Ok(());
        }

        let remaining = deadline.saturating_duration_since(Instant::now());
        match backoff.next_backoff() {
            Some(duration) if !remaining.is_zero() => {
                let duration = duration.min(remaining);
                trace!("{address} not ready, retrying after {duration:?}");
                TokioSleep(duration).await;
            }
            _ => return Err(readiness_timeout(address, readiness, location)),
        }
    }
}

fn readiness_timeout(
    address: &str,
    readiness: &ReadinessConfig,
    location: ErrorLocation,
) -> LaunchError {
    LaunchError::ReadinessTimeout {
        message: format!(
            "{address} did not accept connections within {:?}",
            readiness.timeout
        ),
        location,
    }
}
