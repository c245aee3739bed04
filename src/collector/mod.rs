//! Go runtime metrics collector.
//!
//! This module turns the text printed by `gops memstats` and `gops stats`
//! into InfluxDB points, with support for mocking the external process.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         Collector                           │
//! │  ┌─────────────────────┐   ┌─────────────────────────────┐  │
//! │  │  gops memstats      │   │     gops stats              │  │
//! │  │  Registry::memstats │   │     Registry::stats         │  │
//! │  └──────────┬──────────┘   └──────────────┬──────────────┘  │
//! │             │ extract + assemble          │ extract         │
//! │             └──────────────┬──────────────┘                 │
//! │                     ┌──────▼──────────┐                     │
//! │                     │ DiagnosticSource│ (trait)             │
//! │                     └──────┬──────────┘                     │
//! └────────────────────────────┼────────────────────────────────┘
//!                              │
//!                      ┌───────┴───────┐
//!               ┌──────▼──────┐ ┌──────▼──────┐
//!               │   GopsCli   │ │ MockSource  │
//!               │ (subprocess)│ │ (Testing)   │
//!               └─────────────┘ └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```
//! use gopsmon::collector::{Collector, SourceKind};
//! use gopsmon::collector::mock::MockSource;
//!
//! let source = MockSource::new();
//! source.push_output(SourceKind::HeapGc, "alloc: 1024 bytes\n");
//! source.push_output(SourceKind::Scheduler, "goroutines: 4\n");
//!
//! let mut collector = Collector::new(source, 4242, "localhost");
//! let capture = collector.poll().unwrap();
//! let points = collector.extract(&capture);
//! assert_eq!(points.len(), 2);
//! ```

pub mod assemble;
#[allow(clippy::module_inception)]
mod collector;
pub mod extract;
pub mod mock;
pub mod parser;
pub mod traits;

pub use collector::{Capture, Collector, CollectorTiming, PollError};
pub use parser::ParseError;
pub use traits::{
    DiagnosticSource, FileSystem, GopsCli, Liveness, ProcfsLiveness, PsLiveness, RealFs,
    SourceError, SourceKind,
};
