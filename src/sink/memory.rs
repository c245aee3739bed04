//! In-memory sink for tests.

use super::{Sink, SinkError};
use crate::model::Point;

/// Records every batch it receives. Can be told to reject writes.
#[derive(Debug, Default)]
pub struct MemorySink {
    batches: Vec<Vec<Point>>,
    fail: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink whose writes always fail with a 503.
    pub fn failing() -> Self {
        Self {
            batches: Vec::new(),
            fail: true,
        }
    }

    /// Batches received, one per successful write.
    pub fn batches(&self) -> &[Vec<Point>] {
        &self.batches
    }

    pub fn total_points(&self) -> usize {
        self.batches.iter().map(Vec::len).sum()
    }
}

impl Sink for MemorySink {
    fn write(&mut self, points: &[Point]) -> Result<(), SinkError> {
        if self.fail {
            return Err(SinkError::Status {
                code: 503,
                body: "unavailable".to_string(),
            });
        }
        self.batches.push(points.to_vec());
        Ok(())
    }
}
