pub mod config;
pub mod discovery;
pub mod email_client;
pub mod error;
pub mod launcher;
pub mod service;

#[cfg(test)]
mod tests;

pub use config::{LauncherConfig, ServiceCredentials};
pub use email_client::{EmailClient, EmailRequest};
pub use launcher::payload::{EmbeddedExecutable, PathPayload, ResourceProvider, ScriptBundle};
pub use service::{EmailService, ServiceState};

pub const SERVICE_NAME: &str = "mail-service";
pub const DEFAULT_SERVICE_HOSTNAME: &str = "localhost";
pub const DEFAULT_SERVICE_PORT: u16 = 8005;
pub const DEFAULT_SERVICE_BASE_URL: &str =
    const_format::concatcp!("http://", DEFAULT_SERVICE_HOSTNAME, ":", DEFAULT_SERVICE_PORT);
pub const SEND_EMAIL_ENDPOINT: &str = "/send-email";
pub const CONNECTION_STRING_ENV: &str = "AZURE_CONNECTION_STRING";
pub const SENDER_ADDRESS_ENV: &str = "SENDER_ADDRESS";
