//! Utility modules for gopsmon.

mod host;

pub use host::local_hostname;
