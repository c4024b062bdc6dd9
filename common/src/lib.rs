//! Shared data types for the local mail service launcher.
//!
//! This crate contains pure data structures used by every layer. It has no
//! business logic: it only describes values that are passed between layers.
//!
//! ## Architecture
//!
//! - **common** (this crate): Pure data structures
//! - **mailer-core**: Launching, supervising and talking to the local service
//! - **mailer**: Command-line application wiring everything together

pub mod error;
pub mod http_status;
pub mod redacted_secret;
pub mod service_info;

#[cfg(test)]
mod tests;

pub use error::error_location::ErrorLocation;
pub use error::model_error::ModelError;
pub use error::redact_error::RedactError;
pub use http_status::HttpStatusCode;
pub use redacted_secret::RedactedSecret;
pub use service_info::{ServiceInfo, builder::ServiceInfoBuilder};
