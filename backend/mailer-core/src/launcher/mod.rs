//! Materializing, starting and waiting on the local mail service.
//!
//! A launch runs four steps in order:
//! 1. [`port::ensure_port_available`] - refuse (or reclaim) an occupied port
//! 2. [`payload::materialize_payload`] - unpack the bundled service into a fresh temp dir
//! 3. [`spawn::spawn_service`] - start it with credentials in its environment
//! 4. [`readiness::wait_for_service`] - poll until it accepts connections
//!
//! [`crate::service::EmailService`] drives these steps and owns the results.

pub mod payload;
pub mod port;
pub mod readiness;
pub mod spawn;
