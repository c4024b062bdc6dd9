use common::ErrorLocation;

use mailer_core::error::CoreError;
use mailer_core::error::config::ConfigError;
use mailer_core::error::email_client::EmailClientError;
use mailer_core::error::launch::LaunchError;

use std::panic::Location;

use thiserror::Error;

/// Errors surfaced by the `mailer` command line.
///
/// Core failures are flattened to their rendered message so the terminal shows
/// one line per failure, with the location inside the core crate preserved in
/// the text and the app-side location in `location`.
#[derive(Debug, Error)]
pub enum MailerError {
    /// Error from this App
    #[error("Mailer Error: {message} {location}")]
    Mailer {
        message: String,
        location: ErrorLocation,
    },

    /// Error from mailer-core operations (config, launch, send)
    #[error("Core Error: {message} {location}")]
    Core {
        message: String,
        location: ErrorLocation,
    },
}

impl From<CoreError> for MailerError {
    #[track_caller]
    fn from(error: CoreError) -> Self {
        MailerError::Core {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<ConfigError> for MailerError {
    #[track_caller]
    fn from(error: ConfigError) -> Self {
        MailerError::from(CoreError::from(error))
    }
}

impl From<LaunchError> for MailerError {
    #[track_caller]
    fn from(error: LaunchError) -> Self {
        MailerError::from(CoreError::from(error))
    }
}

impl From<EmailClientError> for MailerError {
    #[track_caller]
    fn from(error: EmailClientError) -> Self {
        MailerError::from(CoreError::from(error))
    }
}
