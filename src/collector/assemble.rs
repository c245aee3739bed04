//! Point assembler: observations to sink points.
//!
//! Observations that belong to a [`FamilyId`] are merged into one point per
//! family; everything else becomes a single-field point.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::model::{Observation, Point, Tags};
use crate::schema::FamilyId;

/// Accumulated fields of one metric family.
struct FamilyFields {
    metric: &'static str,
    fields: BTreeMap<String, f64>,
}

/// Converts observations to points, merging family members.
///
/// Non-family points keep the order of `observations` and come first; the
/// merged family points follow, stamped with `timestamp`. Callers pass the
/// cycle's capture time, so merged and single-field points of one batch share
/// a timestamp. A family point only contains the sub-fields that were
/// observed. Families with no observations produce no point.
pub fn assemble(
    observations: Vec<Observation>,
    tags: &Tags,
    timestamp: DateTime<Utc>,
) -> Vec<Point> {
    let mut points = Vec::with_capacity(observations.len());
    let mut families: BTreeMap<FamilyId, FamilyFields> = BTreeMap::new();

    for obs in observations {
        match obs.family {
            Some(family) => {
                let entry = families.entry(family).or_insert_with(|| FamilyFields {
                    metric: obs.metric,
                    fields: BTreeMap::new(),
                });
                entry.fields.insert(obs.subfield.to_string(), obs.value);
            }
            None => points.push(Point::from(obs)),
        }
    }

    points.extend(families.into_values().map(|f| Point {
        metric: f.metric.to_string(),
        tags: tags.clone(),
        fields: f.fields,
        timestamp,
    }));

    points
}

/// Converts observations one-to-one, without family merging.
///
/// Used for the scheduler-level source, whose fields never share a metric.
pub fn assemble_flat(observations: Vec<Observation>) -> Vec<Point> {
    observations.into_iter().map(Point::from).collect()
}
