use crate::config::LauncherConfig;
use crate::error::config::ConfigError;

use common::{ErrorLocation, RedactedSecret};

use std::panic::Location;

use log::{debug, trace, warn};

/// Values handed to the local service through its environment.
#[derive(Debug, Clone)]
pub struct ServiceCredentials {
    connection_string: RedactedSecret,
    sender_address: String,
}

impl ServiceCredentials {
    pub fn new(connection_string: impl Into<String>, sender_address: impl Into<String>) -> Self {
        Self {
            connection_string: RedactedSecret::new(connection_string),
            sender_address: sender_address.into(),
        }
    }

    /// Read credentials from the process environment.
    ///
    /// A `.env` file in the working directory (or a parent) is loaded first if present.
    /// Variable names come from `config.connection_string_env` and `config.sender_address_env`.
    pub fn from_env(config: &LauncherConfig) -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(path) => debug!("Loaded environment from {}", path.display()),
            Err(e) if e.not_found() => trace!("No .env file found"),
            Err(e) => warn!("Failed to load .env file: {e}"),
        }

        Self::from_lookup(config, |name| std::env::var(name).ok())
    }

    /// Read credentials through an arbitrary variable lookup.
    #[track_caller]
    pub fn from_lookup<F>(config: &LauncherConfig, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| {
            lookup(name)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| ConfigError::MissingEnv {
                    location: ErrorLocation::from(Location::caller()),
                    variable: name.to_string(),
                })
        };

        let connection_string = read(&config.connection_string_env)?;
        let sender_address = read(&config.sender_address_env)?;

        Ok(Self::new(connection_string, sender_address))
    }

    pub fn connection_string(&self) -> &RedactedSecret {
        &self.connection_string
    }

    pub fn sender_address(&self) -> &str {
        &self.sender_address
    }

    #[track_caller]
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.connection_string.is_empty() {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: "connection string cannot be empty".to_string(),
            });
        }

        if self.sender_address.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: "sender address cannot be empty".to_string(),
            });
        }

        Ok(())
    }
}
