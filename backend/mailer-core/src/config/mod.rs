pub mod credentials;
pub mod duration;
pub mod readiness;

pub use credentials::ServiceCredentials;
pub use readiness::{ReadinessConfig, ReadinessProbe};

use crate::error::config::ConfigError;
use crate::{
    CONNECTION_STRING_ENV, DEFAULT_SERVICE_HOSTNAME, DEFAULT_SERVICE_PORT, SEND_EMAIL_ENDPOINT,
    SENDER_ADDRESS_ENV,
};

use common::ErrorLocation;

use std::panic::Location;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{info, warn};
use serde::{Deserialize, Serialize};

pub const CONFIG_FILE_NAME: &str = "mailer.toml";
const CONFIG_DIR_NAME: &str = "mailer";

// ============================================
// ENUMS WITH DEFAULTS
// ============================================

/// What to do when the service port is already bound at launch time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PortConflictPolicy {
    /// Fail the launch and report the owning process.
    Refuse,
    /// Terminate the owning process and continue.
    Reclaim,
}

impl Default for PortConflictPolicy {
    fn default() -> Self {
        PortConflictPolicy::Refuse
    }
}

// ============================================
// CONFIG STRUCTS
// ============================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LauncherConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_connection_string_env")]
    pub connection_string_env: String,

    #[serde(default = "default_sender_address_env")]
    pub sender_address_env: String,

    #[serde(default)]
    pub port_conflict: PortConflictPolicy,

    /// Parent directory for the materialized payload. System temp dir when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temp_root: Option<PathBuf>,

    /// Forward the child's stdout/stderr to the log.
    #[serde(default = "default_forward_output")]
    pub forward_output: bool,

    #[serde(
        default,
        with = "duration::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub request_timeout: Option<Duration>,

    #[serde(default)]
    pub readiness: ReadinessConfig,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            endpoint: default_endpoint(),
            connection_string_env: default_connection_string_env(),
            sender_address_env: default_sender_address_env(),
            port_conflict: PortConflictPolicy::default(),
            temp_root: None,
            forward_output: default_forward_output(),
            request_timeout: None,
            readiness: ReadinessConfig::default(),
        }
    }
}

// ============================================
// DEFAULT FUNCTIONS
// ============================================

fn default_host() -> String {
    DEFAULT_SERVICE_HOSTNAME.to_string()
}
fn default_port() -> u16 {
    DEFAULT_SERVICE_PORT
}
fn default_endpoint() -> String {
    SEND_EMAIL_ENDPOINT.to_string()
}
fn default_connection_string_env() -> String {
    CONNECTION_STRING_ENV.to_string()
}
fn default_sender_address_env() -> String {
    SENDER_ADDRESS_ENV.to_string()
}
fn default_forward_output() -> bool {
    true
}

/// Platform config directory for the launcher (`~/.config/mailer` on Linux).
#[track_caller]
pub fn default_config_dir() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| dir.join(CONFIG_DIR_NAME))
        .ok_or_else(|| ConfigError::DirectoryNotFound {
            location: ErrorLocation::from(Location::caller()),
            reason: "No platform config directory available".to_string(),
        })
}

// ============================================
// IMPLEMENTATION
// ============================================

impl LauncherConfig {
    /// `http://{host}:{port}`
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    /// `{host}:{port}`, the address probed during the readiness wait.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Load config from {config_dir}/mailer.toml.
    ///
    /// # Returns
    ///
    /// Returns `Ok(LauncherConfig)` if loaded successfully or defaults if the file is missing.
    /// Returns `Err(ConfigError)` if the file exists but is unreadable or invalid.
    pub fn load(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            info!(
                "Config file not found at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path).map_err(|e| {
            warn!("Failed to read config file: {e}");
            ConfigError::ReadError {
                location: ErrorLocation::from(Location::caller()),
                path: config_path.clone(),
                source: e,
            }
        })?;

        let config = Self::from_toml_str(&contents).map_err(|e| match e {
            ConfigError::ParseError {
                location, reason, ..
            } => ConfigError::ParseError {
                location,
                path: config_path.clone(),
                reason,
            },
            other => other,
        })?;

        info!("Config loaded from {}", config_path.display());
        Ok(config)
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: LauncherConfig =
            toml::from_str(contents).map_err(|e| ConfigError::ParseError {
                location: ErrorLocation::from(Location::caller()),
                path: PathBuf::from(CONFIG_FILE_NAME),
                reason: e.to_string(),
            })?;

        config.validate()?;

        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::SerializeError {
            location: ErrorLocation::from(Location::caller()),
            reason: e.to_string(),
        })
    }

    /// Save config to {config_dir}/mailer.toml using atomic write.
    ///
    /// Uses temp file + rename so a crash never leaves a half written config.
    pub fn save(&self, config_dir: &Path) -> Result<PathBuf, ConfigError> {
        self.validate()?;

        std::fs::create_dir_all(config_dir).map_err(|e| ConfigError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: config_dir.to_path_buf(),
            source: e,
        })?;

        let config_path = config_dir.join(CONFIG_FILE_NAME);
        let temp_path = config_dir.join(format!("{CONFIG_FILE_NAME}.tmp"));

        let contents = self.to_toml_string()?;

        std::fs::write(&temp_path, contents).map_err(|e| ConfigError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: temp_path.clone(),
            source: e,
        })?;

        std::fs::rename(&temp_path, &config_path).map_err(|e| ConfigError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: config_path.clone(),
            source: e,
        })?;

        info!("Config saved to {}", config_path.display());
        Ok(config_path)
    }

    /// Validate config values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: "host cannot be empty".to_string(),
            });
        }

        if self.port == 0 {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: "port must be non-zero".to_string(),
            });
        }

        if !self.endpoint.starts_with('/') {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: format!("endpoint must start with '/': {}", self.endpoint),
            });
        }

        if self.connection_string_env.is_empty() || self.sender_address_env.is_empty() {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: "environment variable names cannot be empty".to_string(),
            });
        }

        if self.connection_string_env == self.sender_address_env {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: format!(
                    "connection_string_env and sender_address_env are both {}",
                    self.connection_string_env
                ),
            });
        }

        if self.request_timeout == Some(Duration::ZERO) {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: "request_timeout must be non-zero when set".to_string(),
            });
        }

        let readiness = &self.readiness;

        if readiness.timeout.is_zero() {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: "readiness.timeout must be non-zero".to_string(),
            });
        }

        if readiness.initial_interval.is_zero()
            || readiness.initial_interval > readiness.max_interval
        {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: format!(
                    "readiness intervals invalid: initial {:?}, max {:?}",
                    readiness.initial_interval, readiness.max_interval
                ),
            });
        }

        if !readiness.health_path.starts_with('/') {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: format!(
                    "readiness.health_path must start with '/': {}",
                    readiness.health_path
                ),
            });
        }

        Ok(())
    }
}
