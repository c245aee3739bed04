//! In-memory doubles for testing the collection loop.
//!
//! This module provides `MockFs`, `MockSource` and `MockLiveness`, plus
//! pre-built gops output scenarios, so the loop can be exercised without a
//! running Go process or the `gops` binary.

mod filesystem;
mod process;
mod scenarios;

pub use filesystem::MockFs;
pub use process::{MockLiveness, MockSource};
pub use scenarios::{MEMSTATS_OUTPUT, STATS_OUTPUT};
