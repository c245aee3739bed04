//! Dry-run sink that logs points instead of sending them.

use tracing::info;

use super::{Sink, SinkError};
use crate::model::Point;

/// Writes each point to the log as one JSON object.
#[derive(Debug, Default)]
pub struct LogSink {
    written: u64,
}

impl LogSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total points logged so far.
    pub fn written(&self) -> u64 {
        self.written
    }
}

impl Sink for LogSink {
    fn write(&mut self, points: &[Point]) -> Result<(), SinkError> {
        for point in points {
            let json =
                serde_json::to_string(point).map_err(|e| SinkError::Encode(e.to_string()))?;
            info!("{}", json);
        }
        self.written += points.len() as u64;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::host_tags;
    use chrono::Utc;

    #[test]
    fn test_log_sink_counts_points() {
        let mut sink = LogSink::new();
        let points = vec![
            Point::single("a", host_tags("h"), "gauge", 1.0, Utc::now()),
            Point::single("b", host_tags("h"), "gauge", 2.0, Utc::now()),
        ];
        sink.write(&points).unwrap();
        sink.write(&points[..1]).unwrap();
        assert_eq!(sink.written(), 3);
    }

    #[test]
    fn test_point_json_shape() {
        let p = Point::single("go_threads", host_tags("h"), "gauge", 9.0, Utc::now());
        let value: serde_json::Value = serde_json::to_value(&p).unwrap();
        assert_eq!(value["metric"], "go_threads");
        assert_eq!(value["tags"]["host"], "h");
        assert_eq!(value["fields"]["gauge"], 9.0);
    }
}
