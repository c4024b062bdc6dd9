use crate::config::duration;

use std::time::Duration;

use backoff::ExponentialBackoff;
use backoff::backoff::Backoff;
use serde::{Deserialize, Serialize};

const DEFAULT_READINESS_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_INITIAL_INTERVAL: Duration = Duration::from_millis(100);
const DEFAULT_MAX_INTERVAL: Duration = Duration::from_secs(1);
const DEFAULT_HEALTH_PATH: &str = "/";

/// How the launcher decides that the local service is accepting requests.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReadinessProbe {
    /// A TCP connection to the service port succeeds.
    Tcp,
    /// A GET on `health_path` returns a 2xx status.
    Http,
}

impl Default for ReadinessProbe {
    fn default() -> Self {
        ReadinessProbe::Tcp
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReadinessConfig {
    #[serde(default)]
    pub probe: ReadinessProbe,

    #[serde(default = "default_health_path")]
    pub health_path: String,

    /// Overall window for the service to become ready.
    #[serde(default = "default_timeout", with = "duration")]
    pub timeout: Duration,

    #[serde(default = "default_initial_interval", with = "duration")]
    pub initial_interval: Duration,

    #[serde(default = "default_max_interval", with = "duration")]
    pub max_interval: Duration,
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            probe: ReadinessProbe::default(),
            health_path: default_health_path(),
            timeout: default_timeout(),
            initial_interval: default_initial_interval(),
            max_interval: default_max_interval(),
        }
    }
}

impl ReadinessConfig {
    /// Backoff schedule for one readiness wait, starting now.
    pub fn backoff(&self) -> ExponentialBackoff {
        let mut backoff = ExponentialBackoff {
            initial_interval: self.initial_interval,
            max_interval: self.max_interval,
            max_elapsed_time: Some(self.timeout),
            ..Default::default()
        };
        backoff.reset();
        backoff
    }
}

fn default_health_path() -> String {
    DEFAULT_HEALTH_PATH.to_string()
}
fn default_timeout() -> Duration {
    DEFAULT_READINESS_TIMEOUT
}
fn default_initial_interval() -> Duration {
    DEFAULT_INITIAL_INTERVAL
}
fn default_max_interval() -> Duration {
    DEFAULT_MAX_INTERVAL
}
