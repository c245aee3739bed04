//! Observation and point structures produced by one poll cycle.
//!
//! Neither type outlives the cycle that created it: observations are folded
//! into points, and points are dropped once the sink write returns.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::schema::FamilyId;

/// Tag set attached to every point (currently only `host`).
pub type Tags = BTreeMap<String, String>;

/// Builds the tag set for a host.
pub fn host_tags(hostname: &str) -> Tags {
    let mut tags = Tags::new();
    tags.insert("host".to_string(), hostname.to_string());
    tags
}

/// A single parsed field value, tagged with its output identity.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub metric: &'static str,
    pub subfield: &'static str,
    pub value: f64,
    pub family: Option<FamilyId>,
    pub tags: Tags,
    pub timestamp: DateTime<Utc>,
}

/// One time-series point as accepted by a sink.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Point {
    pub metric: String,
    pub tags: Tags,
    pub fields: BTreeMap<String, f64>,
    pub timestamp: DateTime<Utc>,
}

impl Point {
    /// Creates a point with a single field.
    pub fn single(
        metric: impl Into<String>,
        tags: Tags,
        subfield: impl Into<String>,
        value: f64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert(subfield.into(), value);
        Self {
            metric: metric.into(),
            tags,
            fields,
            timestamp,
        }
    }

    /// Returns the value of a field, if present.
    pub fn field(&self, key: &str) -> Option<f64> {
        self.fields.get(key).copied()
    }
}

impl From<Observation> for Point {
    fn from(obs: Observation) -> Self {
        Point::single(obs.metric, obs.tags, obs.subfield, obs.value, obs.timestamp)
    }
}
