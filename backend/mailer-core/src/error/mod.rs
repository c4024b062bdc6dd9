pub mod config;
pub mod discovery;
pub mod email_client;
pub mod launch;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Config(#[from] config::ConfigError),

    #[error(transparent)]
    Discovery(#[from] discovery::DiscoveryError),

    #[error(transparent)]
    Launch(#[from] launch::LaunchError),

    #[error(transparent)]
    EmailClient(#[from] email_client::EmailClientError),
}
