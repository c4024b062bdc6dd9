use crate::error::MailerError;

use mailer_core::LauncherConfig;
use mailer_core::config::CONFIG_FILE_NAME;

use std::path::{Path, PathBuf};

use log::info;

/// Write a default `mailer.toml` into `config_dir`.
///
/// An existing file is left untouched.
///
/// # Returns
///
/// The config file path and whether it was created by this call.
pub fn init(config_dir: &Path) -> Result<(PathBuf, bool), MailerError> {
    let path = config_dir.join(CONFIG_FILE_NAME);
    if path.exists() {
        info!("Config already exists at {}", path.display());
        return Ok((path, false));
    }

    let path = LauncherConfig::default().save(config_dir)?;
    Ok((path, true))
}

/// Render the effective configuration (file contents merged over defaults).
pub fn show(config_dir: &Path) -> Result<String, MailerError> {
    let config = LauncherConfig::load(config_dir)?;
    Ok(config.to_toml_string()?)
}
