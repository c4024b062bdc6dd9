mod error_location;
mod redacted_secret;
mod service_info;
