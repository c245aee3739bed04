//! Captured gops output used by tests.

/// `gops memstats <pid>` output of a small Go service (gops 0.3.x layout).
pub const MEMSTATS_OUTPUT: &str = "\
alloc: 1.21MB (1269760 bytes)
total-alloc: 3.40MB (3565568 bytes)
sys: 6.95MB (7285776 bytes)
lookups: 0
mallocs: 12021
frees: 9433
heap-alloc: 1.21MB (1269760 bytes)
heap-sys: 3.75MB (3932160 bytes)
heap-idle: 1.73MB (1810432 bytes)
heap-in-use: 2.02MB (2121728 bytes)
heap-released: 1.59MB (1671168 bytes)
heap-objects: 2588
stack-in-use: 416.00KB (425984 bytes)
stack-sys: 416.00KB (425984 bytes)
stack-mspan-inuse: 36.56KB (37440 bytes)
stack-mspan-sys: 48.00KB (49152 bytes)
stack-mcache-inuse: 2.34KB (2400 bytes)
stack-mcache-sys: 15.23KB (15600 bytes)
other-sys: 1.03MB (1081235 bytes)
gc-sys: 1.96MB (2054248 bytes)
next-gc: when heap-alloc >= 4.00MB (4194304 bytes)
last-gc: 2023-01-02 03:04:05.5 +0000 UTC
gc-pause-total: 1.012ms
gc-pause: 1500000ns
gc-pause-end: 1672628645500000000
num-gc: 3
num-forced-gc: 0
gc-cpu-fraction: 1.6033217036770395e-05
enable-gc: true
debug-gc: false
";

/// `gops stats <pid>` output.
pub const STATS_OUTPUT: &str = "\
goroutines: 12
OS threads: 9
GOMAXPROCS: 4
num CPU: 4
";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::assemble::{assemble, assemble_flat};
    use crate::collector::extract::extract_text;
    use crate::model::host_tags;
    use crate::schema::{GC_DURATION_METRIC, Registry};
    use chrono::Utc;

    #[test]
    fn test_full_memstats_output() {
        let tags = host_tags("box");
        let now = Utc::now();
        let obs = extract_text(MEMSTATS_OUTPUT, &Registry::memstats(), &tags, now);
        // 18 registered fields, two of which merge into one point
        assert_eq!(obs.len(), 18);

        let points = assemble(obs, &tags, now);
        assert_eq!(points.len(), 17);

        let by_name = |name: &str| points.iter().find(|p| p.metric == name).unwrap();
        assert_eq!(by_name("go_memstats_alloc_bytes").field("gauge"), Some(1269760.0));
        assert_eq!(by_name("go_memstats_next_gc_bytes").field("gauge"), Some(4194304.0));
        assert_eq!(by_name("go_memstats_lookups_total").field("counter"), Some(0.0));
        assert_eq!(
            by_name("go_memstats_last_gc_time_seconds").field("gauge"),
            Some(1672628645.5)
        );

        let gc = by_name(GC_DURATION_METRIC);
        assert_eq!(gc.field("count"), Some(3.0));
        assert!((gc.field("sum").unwrap() - 0.0015).abs() < 1e-12);
        assert_eq!(points.last().unwrap().metric, GC_DURATION_METRIC);
    }

    #[test]
    fn test_full_stats_output() {
        let tags = host_tags("box");
        let obs = extract_text(STATS_OUTPUT, &Registry::stats(), &tags, Utc::now());
        let points = assemble_flat(obs);
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].metric, "go_goroutines");
        assert_eq!(points[1].metric, "go_threads");
        assert_eq!(points[1].field("gauge"), Some(9.0));
    }
}
