//! Line extractor: raw `gops` output to typed observations.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::collector::parser::parse_value;
use crate::model::{Observation, Tags};
use crate::schema::Registry;

/// Splits a `name: value` line on the first colon.
///
/// The name is kept verbatim; the value is trimmed. Returns `None` for lines
/// without a colon.
pub fn split_field(line: &str) -> Option<(&str, &str)> {
    line.split_once(':')
        .map(|(name, value)| (name, value.trim()))
}

/// Extracts one observation per line whose field is in `registry`.
///
/// Blank lines, lines without a colon and unknown fields are skipped.
/// Values that fail to parse are recorded as `0.0`.
pub fn extract<S: AsRef<str>>(
    lines: &[S],
    registry: &Registry,
    tags: &Tags,
    timestamp: DateTime<Utc>,
) -> Vec<Observation> {
    let mut observations = Vec::new();

    for line in lines {
        let Some((name, raw)) = split_field(line.as_ref()) else {
            continue;
        };
        let Some(spec) = registry.get(name) else {
            continue;
        };

        let value = parse_value(spec.kind, raw).unwrap_or_else(|e| {
            debug!("{}: {}, recording 0", spec.source_field, e);
            0.0
        });

        observations.push(Observation {
            metric: spec.metric,
            subfield: spec.subfield,
            value,
            family: spec.family,
            tags: tags.clone(),
            timestamp,
        });
    }

    observations
}

/// Convenience wrapper over [`extract`] for a single text blob.
pub fn extract_text(
    text: &str,
    registry: &Registry,
    tags: &Tags,
    timestamp: DateTime<Utc>,
) -> Vec<Observation> {
    let lines: Vec<&str> = text.lines().collect();
    extract(&lines, registry, tags, timestamp)
}
