use crate::error::config::ConfigError;
use crate::error::discovery::DiscoveryError;

use common::{ErrorLocation, ModelError};

use std::error::Error as StdError;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum LaunchError {
    #[error("Extraction Error: {message} {location}")]
    Extraction {
        message: String,
        location: ErrorLocation,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    #[error("Process Start Error: {message} {location}")]
    ProcessStart {
        message: String,
        location: ErrorLocation,
        #[source]
        source: Option<Box<dyn StdError + Send + Sync>>,
    },

    #[error("Readiness Timeout Error: {message} {location}")]
    ReadinessTimeout {
        message: String,
        location: ErrorLocation,
    },

    #[error("Port In Use Error: {message} {location}")]
    PortInUse {
        message: String,
        port: u16,
        owner_pid: Option<u32>,
        location: ErrorLocation,
    },

    #[error("State Error: {message} {location}")]
    State {
        message: String,
        location: ErrorLocation,
    },

    #[error("Validation Error: {message} {location}")]
    Validation {
        message: String,
        location: ErrorLocation,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Discovery(#[from] DiscoveryError),
}

impl From<ModelError> for LaunchError {
    fn from(error: ModelError) -> Self {
        match error {
            ModelError::Validation { message, location } => {
                LaunchError::Validation { message, location }
            }
        }
    }
}
