pub mod config;
pub mod send;

use crate::error::MailerError;

use mailer_core::config::default_config_dir;

use std::path::{Path, PathBuf};

/// `--config-dir` when given, else the platform config directory.
pub fn resolve_config_dir(config_dir: Option<&Path>) -> Result<PathBuf, MailerError> {
    match config_dir {
        Some(dir) => Ok(dir.to_path_buf()),
        None => Ok(default_config_dir()?),
    }
}
