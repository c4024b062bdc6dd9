use crate::{ErrorLocation, ModelError, ServiceInfo};

use std::panic::Location;

/// Builder for creating validated ServiceInfo instances.
#[derive(Debug, Default)]
pub struct ServiceInfoBuilder {
    pid: Option<u32>,
    port: Option<u16>,
    base_url: Option<String>,
    program: Option<String>,
    working_dir: Option<String>,
}

impl ServiceInfoBuilder {
    pub fn with_pid(mut self, pid: u32) -> Self {
        self.pid = Some(pid);
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = Some(program.into());
        self
    }

    pub fn with_working_dir(mut self, dir: impl Into<String>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Build the ServiceInfo with validation.
    #[track_caller]
    pub fn build(self) -> Result<ServiceInfo, ModelError> {
        let pid = self.pid.ok_or_else(|| ModelError::Validation {
            message: String::from("PID is required"),
            location: ErrorLocation::from(Location::caller()),
        })?;

        if pid == 0 {
            return Err(ModelError::Validation {
                message: String::from("PID must be non-zero"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let port = self.port.ok_or_else(|| ModelError::Validation {
            message: String::from("Port is required"),
            location: ErrorLocation::from(Location::caller()),
        })?;

        if port == 0 {
            return Err(ModelError::Validation {
                message: String::from("Port must be non-zero"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let base_url = self.base_url.ok_or_else(|| ModelError::Validation {
            message: String::from("Base URL is required"),
            location: ErrorLocation::from(Location::caller()),
        })?;

        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ModelError::Validation {
                message: format!("Invalid base URL format: {base_url}"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let program = self.program.ok_or_else(|| ModelError::Validation {
            message: String::from("Program is required"),
            location: ErrorLocation::from(Location::caller()),
        })?;

        if program.is_empty() {
            return Err(ModelError::Validation {
                message: String::from("Program cannot be empty"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let working_dir = self.working_dir.unwrap_or_default();

        Ok(ServiceInfo {
            pid,
            port,
            base_url,
            program,
            working_dir,
        })
    }
}
