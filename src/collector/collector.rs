//! Main collector that combines both gops dumps into one batch of points.
//!
//! The `Collector` owns the registries and the host tags and performs the
//! polling and extraction phases of a cycle. Deciding what to do when a
//! poll fails is left to [`crate::daemon`].

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

use crate::collector::assemble::{assemble, assemble_flat};
use crate::collector::extract::extract;
use crate::collector::traits::{DiagnosticSource, SourceError, SourceKind};
use crate::model::{Point, Tags, host_tags};
use crate::schema::Registry;

/// Timing information for each phase of a cycle.
///
/// Used for debugging and performance monitoring.
#[derive(Debug, Clone, Default)]
pub struct CollectorTiming {
    /// Time spent in `gops memstats`.
    pub memstats: Duration,
    /// Time spent in `gops stats`.
    pub stats: Duration,
    /// Time to extract and assemble points.
    pub extract: Duration,
}

/// Raw output of both dumps for one cycle.
#[derive(Debug, Clone)]
pub struct Capture {
    pub memstats: Vec<String>,
    pub stats: Vec<String>,
    pub taken_at: DateTime<Utc>,
}

/// A failed dump, tagged with the source that produced it.
#[derive(Debug)]
pub struct PollError {
    pub source: SourceKind,
    pub cause: SourceError,
}

/// Polls a Go process through a [`DiagnosticSource`] and converts the output.
pub struct Collector<S: DiagnosticSource> {
    source: S,
    pid: u32,
    memstats: Registry,
    stats: Registry,
    tags: Tags,
    last_timing: CollectorTiming,
}

impl<S: DiagnosticSource> Collector<S> {
    /// Creates a collector with the built-in gops registries.
    ///
    /// # Arguments
    /// * `source` - Diagnostic source (gops CLI or mock)
    /// * `pid` - Target Go process
    /// * `hostname` - Value of the `host` tag on every point
    pub fn new(source: S, pid: u32, hostname: &str) -> Self {
        Self::with_registries(source, pid, hostname, Registry::memstats(), Registry::stats())
    }

    /// Creates a collector with custom registries.
    pub fn with_registries(
        source: S,
        pid: u32,
        hostname: &str,
        memstats: Registry,
        stats: Registry,
    ) -> Self {
        Self {
            source,
            pid,
            memstats,
            stats,
            tags: host_tags(hostname),
            last_timing: CollectorTiming::default(),
        }
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Timing of the most recent `poll` + `extract` pair.
    pub fn last_timing(&self) -> &CollectorTiming {
        &self.last_timing
    }

    /// Runs `gops memstats` then `gops stats`.
    ///
    /// Stops at the first failing dump.
    pub fn poll(&mut self) -> Result<Capture, PollError> {
        let start = Instant::now();
        let memstats = self.dump(SourceKind::HeapGc)?;
        self.last_timing.memstats = start.elapsed();

        let start = Instant::now();
        let stats = self.dump(SourceKind::Scheduler)?;
        self.last_timing.stats = start.elapsed();

        Ok(Capture {
            memstats,
            stats,
            taken_at: Utc::now(),
        })
    }

    /// Converts a capture into points: heap/GC first, then scheduler.
    ///
    /// Every point, including the merged GC family point, carries
    /// `capture.taken_at`, so one cycle's batch shares a single timestamp
    /// regardless of when extraction runs.
    pub fn extract(&mut self, capture: &Capture) -> Vec<Point> {
        let start = Instant::now();
        let ts = capture.taken_at;

        let heap = extract(&capture.memstats, &self.memstats, &self.tags, ts);
        let mut points = assemble(heap, &self.tags, ts);
        points.extend(assemble_flat(extract(
            &capture.stats,
            &self.stats,
            &self.tags,
            ts,
        )));

        self.last_timing.extract = start.elapsed();
        points
    }

    fn dump(&self, kind: SourceKind) -> Result<Vec<String>, PollError> {
        self.source
            .dump(kind, self.pid)
            .map_err(|cause| PollError { source: kind, cause })
    }
}
