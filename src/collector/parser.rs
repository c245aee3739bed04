//! Parsers for individual `gops` field values.
//!
//! These are pure functions that convert the trimmed text after `name:` into
//! a number, according to the field's [`ValueKind`]. They are designed to be
//! easily testable with string inputs.

use std::sync::LazyLock;

use chrono::DateTime;
use regex::Regex;

use crate::schema::ValueKind;

/// Error type for parsing failures.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
}

impl ParseError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Parse error: {}", self.message)
    }
}

impl std::error::Error for ParseError {}

/// First `<digits> bytes` occurrence, e.g. in `1.21MB (1269760 bytes)`.
static BYTES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9]+) bytes").expect("valid byte count regex"));

/// Layout of Go's `time.Time.String()` without the trailing zone abbreviation.
const GO_TIME_LAYOUT: &str = "%Y-%m-%d %H:%M:%S%.f %z";

/// Converts a raw field value to a number using the rule for `kind`.
pub fn parse_value(kind: ValueKind, raw: &str) -> Result<f64, ParseError> {
    match kind {
        ValueKind::ByteSize => parse_byte_size(raw),
        ValueKind::IntegerCount => parse_count(raw),
        ValueKind::Timestamp => parse_timestamp(raw),
        ValueKind::Duration => parse_duration(raw),
    }
}

/// Extracts the byte count from a human-readable size.
///
/// gops prints sizes as `1.21MB (1269760 bytes)`; only the exact byte count
/// is used.
pub fn parse_byte_size(raw: &str) -> Result<f64, ParseError> {
    let caps = BYTES_RE
        .captures(raw)
        .ok_or_else(|| ParseError::new(format!("no byte count in '{}'", raw)))?;
    caps[1]
        .parse()
        .map_err(|_| ParseError::new(format!("invalid byte count in '{}'", raw)))
}

/// Parses a decimal counter.
pub fn parse_count(raw: &str) -> Result<f64, ParseError> {
    raw.parse()
        .map_err(|_| ParseError::new(format!("invalid count '{}'", raw)))
}

/// Parses a Go `time.Time` string into seconds since epoch.
///
/// Format: `2006-01-02 15:04:05.999999999 -0700 MST`. The fractional part is
/// optional and kept with nanosecond precision. A monotonic clock suffix
/// (` m=+1.23`) is ignored.
pub fn parse_timestamp(raw: &str) -> Result<f64, ParseError> {
    let raw = match raw.find(" m=") {
        Some(idx) => &raw[..idx],
        None => raw,
    };

    // The zone abbreviation carries no information beyond the numeric offset.
    let without_zone = raw.rsplit_once(' ').map(|(head, _)| head);
    let dt = without_zone
        .and_then(|s| DateTime::parse_from_str(s, GO_TIME_LAYOUT).ok())
        .or_else(|| DateTime::parse_from_str(raw, GO_TIME_LAYOUT).ok())
        .ok_or_else(|| ParseError::new(format!("invalid timestamp '{}'", raw)))?;

    Ok(dt.timestamp() as f64 + f64::from(dt.timestamp_subsec_nanos()) / 1e9)
}

/// Parses a Go `time.Duration` string into seconds.
///
/// Accepts a sequence of decimal numbers with unit suffixes, such as `300ms`,
/// `1.5h` or `2h45m`. Valid units are `ns`, `us` (or `µs`), `ms`, `s`, `m`
/// and `h`. A bare `0` is accepted.
///
/// The sum is accumulated in integer nanoseconds and converted once, so
/// `4.9ms` yields exactly `0.0049`. Totals beyond the `i64` nanosecond range
/// are rejected.
pub fn parse_duration(raw: &str) -> Result<f64, ParseError> {
    let err = || ParseError::new(format!("invalid duration '{}'", raw));

    let (negative, mut rest) = match raw.as_bytes().first() {
        Some(b'-') => (true, &raw[1..]),
        Some(b'+') => (false, &raw[1..]),
        _ => (false, raw),
    };

    if rest == "0" {
        return Ok(0.0);
    }
    if rest.is_empty() {
        return Err(err());
    }

    let mut total_ns: u64 = 0;
    while !rest.is_empty() {
        let int_len = rest.bytes().take_while(u8::is_ascii_digit).count();
        let int_part = &rest[..int_len];
        rest = &rest[int_len..];

        let mut frac_part = "";
        if let Some(after_dot) = rest.strip_prefix('.') {
            let frac_len = after_dot.bytes().take_while(u8::is_ascii_digit).count();
            frac_part = &after_dot[..frac_len];
            rest = &after_dot[frac_len..];
        }
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(err());
        }

        let unit_len = rest
            .bytes()
            .take_while(|b| !b.is_ascii_digit() && *b != b'.')
            .count();
        let unit = &rest[..unit_len];
        let unit_ns: u64 = match unit {
            "ns" => 1,
            "us" | "\u{b5}s" | "\u{3bc}s" => 1_000,
            "ms" => 1_000_000,
            "s" => 1_000_000_000,
            "m" => 60 * 1_000_000_000,
            "h" => 3_600 * 1_000_000_000,
            "" => {
                return Err(ParseError::new(format!(
                    "missing unit in duration '{}'",
                    raw
                )));
            }
            other => {
                return Err(ParseError::new(format!(
                    "unknown unit '{}' in duration '{}'",
                    other, raw
                )));
            }
        };
        rest = &rest[unit_len..];

        let whole: u64 = if int_part.is_empty() {
            0
        } else {
            int_part.parse().map_err(|_| err())?
        };
        let mut component = whole.checked_mul(unit_ns).ok_or_else(err)?;
        if !frac_part.is_empty() {
            component = component
                .checked_add(fraction_ns(frac_part, unit_ns))
                .ok_or_else(err)?;
        }
        total_ns = total_ns.checked_add(component).ok_or_else(err)?;
    }

    let total_ns = i64::try_from(total_ns).map_err(|_| err())?;
    let seconds = total_ns as f64 / 1e9;
    Ok(if negative { -seconds } else { seconds })
}

/// Nanoseconds contributed by the fractional digits of one duration component.
///
/// Digits that would overflow the accumulator are dropped; they are below
/// nanosecond resolution for every unit.
fn fraction_ns(digits: &str, unit_ns: u64) -> u64 {
    let mut frac: u64 = 0;
    let mut scale = 1.0_f64;
    for d in digits.bytes() {
        if frac > (1 << 62) / 10 {
            break;
        }
        frac = frac * 10 + u64::from(d - b'0');
        scale *= 10.0;
    }
    (frac as f64 * (unit_ns as f64 / scale)) as u64
}
