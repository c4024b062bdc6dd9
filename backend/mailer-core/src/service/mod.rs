//! The service handle: owns one launched mail service and talks to it.

use crate::config::{LauncherConfig, ServiceCredentials};
use crate::email_client::{EmailClient, EmailRequest};
use crate::error::email_client::EmailClientError;
use crate::error::launch::LaunchError;
use crate::launcher::payload::{MaterializedPayload, ResourceProvider, materialize_payload};
use crate::launcher::port::ensure_port_available;
use crate::launcher::readiness::wait_for_service;
use crate::launcher::spawn::spawn_service;

use common::{ErrorLocation, ServiceInfo, ServiceInfoBuilder};

use std::io::ErrorKind;
use std::panic::Location;

use log::{debug, info, warn};
use tokio::process::Child as TokioChild;

/// Lifecycle of an [`EmailService`]. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceState {
    NotStarted,
    Running,
    Stopped,
}

struct RunningService {
    child: TokioChild,
    payload: MaterializedPayload,
    info: ServiceInfo,
}

/// Handle to a local mail service child process.
///
/// Created with [`EmailService::new`] (not started) or [`EmailService::start`]
/// (launched). Dropping a running handle kills the child and removes its
/// payload directory; [`EmailService::stop`] does the same explicitly.
pub struct EmailService {
    config: LauncherConfig,
    provider: Box<dyn ResourceProvider>,
    client: EmailClient,
    state: ServiceState,
    running: Option<RunningService>,
}

impl EmailService {
    pub fn new<P>(config: LauncherConfig, provider: P) -> Result<Self, LaunchError>
    where
        P: ResourceProvider + 'static,
    {
        config.validate()?;

        let client = EmailClient::from_config(&config).map_err(|e| LaunchError::Validation {
            message: format!("Invalid service address {}: {e}", config.base_url()),
            location: ErrorLocation::from(Location::caller()),
        })?;

        Ok(Self {
            config,
            provider: Box::new(provider),
            client,
            state: ServiceState::NotStarted,
            running: None,
        })
    }

    /// Create a handle and launch it in one step.
    pub async fn start<P>(
        config: LauncherConfig,
        provider: P,
        credentials: &ServiceCredentials,
    ) -> Result<Self, LaunchError>
    where
        P: ResourceProvider + 'static,
    {
        let mut service = Self::new(config, provider)?;
        service.launch(credentials).await?;
        Ok(service)
    }

    /// Materialize the payload, start it, and wait for it to accept connections.
    ///
    /// Only valid from [`ServiceState::NotStarted`]. A failed launch leaves the
    /// handle in `NotStarted` with nothing running and nothing on disk.
    pub async fn launch(&mut self, credentials: &ServiceCredentials) -> Result<(), LaunchError> {
        if self.state != ServiceState::NotStarted {
            return Err(LaunchError::State {
                message: format!("Cannot launch a service in state {:?}", self.state),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        credentials.validate()?;

        let base_url = self.config.base_url();
        let address = self.config.address();

        info!("Launching {} on {base_url}", self.provider.name());

        ensure_port_available(&self.config)?;

        let payload =
            materialize_payload(self.provider.as_ref(), self.config.temp_root.as_deref())?;

        let mut child = spawn_service(&payload.target, &self.config, credentials)?;

        if let Err(e) = wait_for_service(&mut child, &self.config, &address, &base_url).await {
            warn!(
                "Mail service did not become ready, killing it (PID: {:?})",
                child.id()
            );
            if let Err(kill_err) = child.kill().await {
                debug!("Kill after failed launch: {kill_err}");
            }
            if let Err(cleanup) = payload.close() {
                warn!("Failed to remove payload directory: {cleanup}");
            }
            return Err(e);
        }

        let info = ServiceInfoBuilder::default()
            .with_pid(child.id().unwrap_or_default())
            .with_port(self.config.port)
            .with_base_url(base_url)
            .with_program(payload.target.program.to_string_lossy())
            .with_working_dir(payload.path().to_string_lossy())
            .build()?;

        info!(
            "Mail service ready at {} (PID: {})",
            info.base_url, info.pid
        );

        self.running = Some(RunningService {
            child,
            payload,
            info,
        });
        self.state = ServiceState::Running;

        Ok(())
    }

    /// Send one email through the running service.
    ///
    /// # Returns
    ///
    /// The `message` field of the service's success response.
    pub async fn send_email(&self, request: &EmailRequest) -> Result<String, EmailClientError> {
        if self.state != ServiceState::Running {
            return Err(EmailClientError::NotRunning {
                message: format!("Mail service is {:?}", self.state),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        self.client.send_email(request).await
    }

    /// Terminate the child process and remove its payload directory.
    ///
    /// Safe to call any number of times, including before [`EmailService::launch`].
    ///
    /// # Returns
    ///
    /// * `true` - A running child was terminated by this call
    /// * `false` - Nothing was running, or the child had already exited
    pub async fn stop(&mut self) -> bool {
        let Some(mut running) = self.running.take() else {
            debug!("Stop requested with no running mail service ({:?})", self.state);
            return false;
        };

        self.state = ServiceState::Stopped;
        let pid = running.info.pid;

        let terminated = match running.child.kill().await {
            Ok(()) => {
                info!("Stopped mail service (PID: {pid})");
                true
            }
            Err(e) if e.kind() == ErrorKind::InvalidInput => {
                debug!("Mail service (PID: {pid}) had already exited");
                false
            }
            Err(e) => {
                warn!("Failed to kill mail service (PID: {pid}): {e}");
                false
            }
        };

        if let Err(e) = running.payload.close() {
            warn!("Failed to remove payload directory: {e}");
        }

        terminated
    }

    pub fn state(&self) -> ServiceState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == ServiceState::Running
    }

    pub fn base_url(&self) -> String {
        self.config.base_url()
    }

    pub fn config(&self) -> &LauncherConfig {
        &self.config
    }

    /// Snapshot of the running child; `None` unless [`ServiceState::Running`].
    pub fn info(&self) -> Option<&ServiceInfo> {
        self.running.as_ref().map(|r| &r.info)
    }
}
