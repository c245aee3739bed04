//! Destinations for assembled points.
//!
//! A sink receives the whole batch of one cycle in a single call:
//! - [`InfluxSink`] — InfluxDB `/write` endpoint over HTTP (line protocol)
//! - [`LogSink`] — logs every point as JSON (dry run)
//! - [`MemorySink`] — keeps batches in memory (tests)

mod influx;
pub mod line_protocol;
mod log;
mod memory;

pub use influx::InfluxSink;
pub use self::log::LogSink;
pub use memory::MemorySink;

use crate::model::Point;

/// Error type for sink writes.
#[derive(Debug)]
pub enum SinkError {
    /// Transport failure (connect, timeout, TLS).
    Http(reqwest::Error),
    /// Server answered with a non-success status.
    Status { code: u16, body: String },
    /// Point could not be serialized.
    Encode(String),
}

impl std::fmt::Display for SinkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SinkError::Http(e) => write!(f, "HTTP error: {}", e),
            SinkError::Status { code, body } => {
                write!(f, "server returned {}", code)?;
                if !body.trim().is_empty() {
                    write!(f, ": {}", body.trim())?;
                }
                Ok(())
            }
            SinkError::Encode(msg) => write!(f, "encode error: {}", msg),
        }
    }
}

impl std::error::Error for SinkError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SinkError::Http(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for SinkError {
    fn from(e: reqwest::Error) -> Self {
        SinkError::Http(e)
    }
}

/// Accepts one batch of points per cycle.
pub trait Sink {
    fn write(&mut self, points: &[Point]) -> Result<(), SinkError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sink_error_display() {
        let err = SinkError::Status {
            code: 404,
            body: "{\"error\":\"database not found: \\\"go\\\"\"}\n".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "server returned 404: {\"error\":\"database not found: \\\"go\\\"\"}"
        );
        assert_eq!(
            SinkError::Status {
                code: 500,
                body: String::new()
            }
            .to_string(),
            "server returned 500"
        );
    }
}
