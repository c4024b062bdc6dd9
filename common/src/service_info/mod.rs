pub mod builder;

use serde::Serialize;

/// Snapshot of a running local mail service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceInfo {
    pub pid: u32,
    pub port: u16,
    pub base_url: String,
    pub program: String,
    pub working_dir: String,
}
