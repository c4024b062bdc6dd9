pub mod error_location;
pub mod model_error;
pub mod redact_error;
