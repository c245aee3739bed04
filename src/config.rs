//! Startup configuration and CLI value parsers.
//!
//! The binary parses flags with clap; the parsers here validate individual
//! values, and [`Config`] holds the checked result.

use std::time::Duration;

use crate::collector::parser::parse_duration;

/// Default poll interval.
pub const DEFAULT_INTERVAL: &str = "1s";

/// Default timeout for one InfluxDB write.
pub const DEFAULT_WRITE_TIMEOUT: &str = "10s";

/// Where points are sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkTarget {
    /// InfluxDB server (`host:port`) and database.
    Influx { host: String, database: String },
    /// Log points instead of writing them.
    Log,
}

/// Validated daemon settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Target Go process.
    pub pid: u32,
    pub sink: SinkTarget,
    pub interval: Duration,
    pub write_timeout: Duration,
    /// `gops` executable name or path.
    pub gops_bin: String,
}

/// Parses a positive process id.
pub fn parse_pid(s: &str) -> Result<u32, String> {
    let pid: u32 = s
        .trim()
        .parse()
        .map_err(|e| format!("invalid pid '{}': {}", s, e))?;
    if pid == 0 {
        return Err("pid must be positive".to_string());
    }
    Ok(pid)
}

/// Parses a positive Go-style duration such as `1s`, `500ms` or `1m30s`.
pub fn parse_interval(s: &str) -> Result<Duration, String> {
    let secs = parse_duration(s.trim()).map_err(|e| e.message)?;
    if secs <= 0.0 {
        return Err(format!("duration '{}' must be positive", s));
    }
    Duration::try_from_secs_f64(secs).map_err(|e| format!("invalid duration '{}': {}", s, e))
}

/// Formats a duration the way it is accepted on the command line.
pub fn format_interval(d: Duration) -> String {
    if d.subsec_nanos() == 0 {
        format!("{}s", d.as_secs())
    } else if d.subsec_nanos() % 1_000_000 == 0 {
        format!("{}ms", d.as_millis())
    } else {
        format!("{}us", d.as_micros())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pid() {
        assert_eq!(parse_pid("4242"), Ok(4242));
        assert_eq!(parse_pid(" 1 "), Ok(1));
        assert!(parse_pid("0").is_err());
        assert!(parse_pid("-5").is_err());
        assert!(parse_pid("abc").is_err());
        assert!(parse_pid("").is_err());
    }

    #[test]
    fn test_parse_interval() {
        assert_eq!(parse_interval("1s"), Ok(Duration::from_secs(1)));
        assert_eq!(parse_interval("500ms"), Ok(Duration::from_millis(500)));
        assert_eq!(parse_interval("1m30s"), Ok(Duration::from_secs(90)));
        assert_eq!(
            parse_interval(DEFAULT_INTERVAL),
            Ok(Duration::from_secs(1))
        );
        assert_eq!(
            parse_interval(DEFAULT_WRITE_TIMEOUT),
            Ok(Duration::from_secs(10))
        );
    }

    #[test]
    fn test_parse_interval_rejects_non_positive() {
        assert!(parse_interval("0").is_err());
        assert!(parse_interval("-1s").is_err());
        assert!(parse_interval("10").is_err());
        assert!(parse_interval("").is_err());
    }

    #[test]
    fn test_format_interval() {
        assert_eq!(format_interval(Duration::from_secs(2)), "2s");
        assert_eq!(format_interval(Duration::from_millis(1500)), "1500ms");
        assert_eq!(format_interval(Duration::from_micros(250)), "250us");
    }
}
