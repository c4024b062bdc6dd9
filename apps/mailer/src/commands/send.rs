use crate::cli::SendArgs;
use crate::error::MailerError;

use common::ErrorLocation;

use mailer_core::{EmailService, LauncherConfig, ServiceCredentials};

use std::panic::Location;
use std::path::Path;

use log::{debug, error, info};

/// Launch the service, send one email, and stop the service.
///
/// The service is stopped whether or not the send succeeds.
///
/// # Returns
///
/// The confirmation message returned by the service.
pub async fn run(config_dir: &Path, args: &SendArgs) -> Result<String, MailerError> {
    let config = LauncherConfig::load(config_dir)?;
    let credentials = ServiceCredentials::from_env(&config)?;

    // Reject a bad request before paying for a launch.
    let request = args.request();
    request.validate()?;

    let provider = args.payload().ok_or_else(|| MailerError::Mailer {
        message: "Either --executable or --script-dir with --entry is required".to_string(),
        location: ErrorLocation::from(Location::caller()),
    })?;

    let mut service = EmailService::start(config, provider, &credentials).await?;
    debug!("Service info: {:?}", service.info());

    let result = service.send_email(&request).await;

    service.stop().await;

    match result {
        Ok(message) => {
            info!("Email to {} accepted: {message}", request.email);
            Ok(message)
        }
        Err(e) => {
            error!("Failed to send email to {}: {e}", request.email);
            Err(e.into())
        }
    }
}
