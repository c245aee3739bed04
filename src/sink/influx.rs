//! InfluxDB HTTP writer.
//!
//! Points are posted to `<addr>/write?db=<db>&precision=s` as line protocol.
//! The HTTP client carries a request timeout so an unreachable server delays
//! a cycle by at most that long. `https://` addresses are served over rustls.

use std::time::Duration;

use reqwest::blocking::Client;
use tracing::trace;

use super::line_protocol::encode_batch;
use super::{Sink, SinkError};
use crate::model::Point;

/// Writes point batches to an InfluxDB 1.x compatible `/write` endpoint.
pub struct InfluxSink {
    client: Client,
    url: String,
    database: String,
}

impl InfluxSink {
    /// Creates a writer.
    ///
    /// # Arguments
    /// * `host` - Server address as `host:port`, optionally with `http://` prefix
    /// * `database` - Target database
    /// * `timeout` - Per-request timeout
    pub fn new(host: &str, database: &str, timeout: Duration) -> Result<Self, SinkError> {
        let client = Client::builder()
            .use_rustls_tls()
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            url: write_url(host),
            database: database.to_string(),
        })
    }

    /// Full URL of the write endpoint.
    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Builds the `/write` endpoint URL from a server address.
fn write_url(host: &str) -> String {
    let host = host.trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        format!("{}/write", host)
    } else {
        format!("http://{}/write", host)
    }
}

impl Sink for InfluxSink {
    fn write(&mut self, points: &[Point]) -> Result<(), SinkError> {
        let body = encode_batch(points);
        if body.is_empty() {
            return Ok(());
        }
        trace!("POST {} ({} bytes)", self.url, body.len());

        let response = self
            .client
            .post(&self.url)
            .query(&[("db", self.database.as_str()), ("precision", "s")])
            .body(body)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(SinkError::Status {
                code: status.as_u16(),
                body: response.text().unwrap_or_default(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::host_tags;
    use chrono::Utc;

    #[test]
    fn test_write_url() {
        assert_eq!(write_url("localhost:8086"), "http://localhost:8086/write");
        assert_eq!(write_url("http://influx:8086/"), "http://influx:8086/write");
        assert_eq!(write_url("https://influx.example"), "https://influx.example/write");
    }

    #[test]
    fn test_https_address_reaches_transport() {
        let mut sink = InfluxSink::new("https://127.0.0.1:1", "go", Duration::from_millis(200))
            .unwrap();
        assert_eq!(sink.url(), "https://127.0.0.1:1/write");

        let points = vec![Point::single("m", host_tags("h"), "gauge", 1.0, Utc::now())];
        let err = sink.write(&points).unwrap_err();
        match err {
            // The TLS connector accepts the scheme; only the connection fails.
            SinkError::Http(e) => {
                let mut chain = e.to_string();
                let mut cause = std::error::Error::source(&e);
                while let Some(c) = cause {
                    chain.push_str(&format!(": {}", c));
                    cause = c.source();
                }
                assert!(!chain.contains("scheme is not http"), "{chain}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_batch_is_not_sent() {
        // Nothing listens on port 9 of the documentation address range;
        // an empty batch must return before any connection attempt.
        let mut sink = InfluxSink::new("192.0.2.1:9", "go", Duration::from_millis(50)).unwrap();
        assert!(sink.write(&[]).is_ok());
        assert_eq!(sink.url(), "http://192.0.2.1:9/write");
    }

    #[test]
    fn test_unreachable_server_is_an_error() {
        let mut sink = InfluxSink::new("127.0.0.1:1", "go", Duration::from_millis(200)).unwrap();
        let points = vec![Point::single("m", host_tags("h"), "gauge", 1.0, Utc::now())];
        let err = sink.write(&points).unwrap_err();
        assert!(matches!(err, SinkError::Http(_)));
    }
}
