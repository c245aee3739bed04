//! Fixed metric schema for `gops` diagnostic output.
//!
//! Each [`MetricSpec`] maps one diagnostic field name (the text before the
//! colon in `gops memstats` / `gops stats` output) to a parse rule and the
//! InfluxDB measurement it is written to.
//!
//! Two registries exist, one per diagnostic source:
//! - [`Registry::memstats`] — heap and GC fields from `gops memstats`
//! - [`Registry::stats`] — scheduler fields from `gops stats`

use std::collections::HashMap;

/// How the raw text value of a field is converted to a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Human-readable size containing `<N> bytes`.
    ByteSize,
    /// Plain decimal integer.
    IntegerCount,
    /// Go `time.Time` string, converted to epoch seconds.
    Timestamp,
    /// Go `time.Duration` string, converted to seconds.
    Duration,
}

/// Metric families whose fields are merged into a single point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FamilyId {
    /// `go_gc_duration_seconds` with `sum` and `count` sub-fields.
    GcDuration,
}

/// Mapping from one diagnostic field to an output metric.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSpec {
    /// Field name as printed by gops (lookup key).
    pub source_field: &'static str,
    pub kind: ValueKind,
    /// Output measurement name. Not unique across specs of one family.
    pub metric: &'static str,
    /// Output field key within the measurement.
    pub subfield: &'static str,
    /// Set when several specs contribute fields to one merged point.
    pub family: Option<FamilyId>,
}

impl MetricSpec {
    const fn new(
        source_field: &'static str,
        kind: ValueKind,
        metric: &'static str,
        subfield: &'static str,
    ) -> Self {
        Self {
            source_field,
            kind,
            metric,
            subfield,
            family: None,
        }
    }

    const fn in_family(mut self, family: FamilyId) -> Self {
        self.family = Some(family);
        self
    }
}

/// Measurement name of the merged GC pause family.
pub const GC_DURATION_METRIC: &str = "go_gc_duration_seconds";

#[rustfmt::skip]
const MEMSTATS_SPECS: &[MetricSpec] = &[
    MetricSpec::new("alloc", ValueKind::ByteSize, "go_memstats_alloc_bytes", "gauge"),
    MetricSpec::new("total-alloc", ValueKind::ByteSize, "go_memstats_alloc_bytes_total", "counter"),
    MetricSpec::new("sys", ValueKind::ByteSize, "go_memstats_sys_bytes", "gauge"),
    MetricSpec::new("lookups", ValueKind::IntegerCount, "go_memstats_lookups_total", "counter"),
    MetricSpec::new("mallocs", ValueKind::IntegerCount, "go_memstats_mallocs_total", "counter"),
    MetricSpec::new("frees", ValueKind::IntegerCount, "go_memstats_frees_total", "counter"),
    MetricSpec::new("heap-alloc", ValueKind::ByteSize, "go_memstats_heap_alloc_bytes", "gauge"),
    MetricSpec::new("heap-sys", ValueKind::ByteSize, "go_memstats_heap_sys_bytes", "gauge"),
    MetricSpec::new("heap-idle", ValueKind::ByteSize, "go_memstats_heap_idle_bytes", "gauge"),
    MetricSpec::new("heap-in-use", ValueKind::ByteSize, "go_memstats_heap_inuse_bytes", "gauge"),
    MetricSpec::new("heap-released", ValueKind::ByteSize, "go_memstats_heap_released_bytes", "gauge"),
    MetricSpec::new("heap-objects", ValueKind::IntegerCount, "go_memstats_objects", "gauge"),
    MetricSpec::new("stack-in-use", ValueKind::ByteSize, "go_memstats_stack_inuse_bytes", "gauge"),
    MetricSpec::new("stack-sys", ValueKind::ByteSize, "go_memstats_stack_sys_bytes", "gauge"),
    MetricSpec::new("gc-pause", ValueKind::Duration, GC_DURATION_METRIC, "sum")
        .in_family(FamilyId::GcDuration),
    MetricSpec::new("next-gc", ValueKind::ByteSize, "go_memstats_next_gc_bytes", "gauge"),
    MetricSpec::new("last-gc", ValueKind::Timestamp, "go_memstats_last_gc_time_seconds", "gauge"),
    MetricSpec::new("num-gc", ValueKind::IntegerCount, GC_DURATION_METRIC, "count")
        .in_family(FamilyId::GcDuration),
];

#[rustfmt::skip]
const STATS_SPECS: &[MetricSpec] = &[
    MetricSpec::new("goroutines", ValueKind::IntegerCount, "go_goroutines", "gauge"),
    MetricSpec::new("OS threads", ValueKind::IntegerCount, "go_threads", "gauge"),
];

/// Immutable lookup table from diagnostic field name to [`MetricSpec`].
#[derive(Debug, Clone, Default)]
pub struct Registry {
    specs: HashMap<&'static str, MetricSpec>,
}

impl Registry {
    /// Builds a registry from a list of specs. Later duplicates replace earlier ones.
    pub fn from_specs(specs: impl IntoIterator<Item = MetricSpec>) -> Self {
        Self {
            specs: specs.into_iter().map(|s| (s.source_field, s)).collect(),
        }
    }

    /// Heap and GC fields printed by `gops memstats`.
    pub fn memstats() -> Self {
        Self::from_specs(MEMSTATS_SPECS.iter().cloned())
    }

    /// Scheduler fields printed by `gops stats`.
    pub fn stats() -> Self {
        Self::from_specs(STATS_SPECS.iter().cloned())
    }

    /// Returns the spec registered for `field`, if any.
    pub fn get(&self, field: &str) -> Option<&MetricSpec> {
        self.specs.get(field)
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}
