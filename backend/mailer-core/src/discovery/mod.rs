//! Operating-system inspection of ports and processes.
//!
//! Used by the launcher to find out whether the service port is already
//! bound, which process owns it, and to terminate that process when the
//! configuration asks for the port to be reclaimed.

pub mod process;
