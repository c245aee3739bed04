//! InfluxDB line protocol encoding with second precision.
//!
//! `<measurement>[,<tag_key>=<tag_value>...] <field_key>=<value>[,...] <unix_seconds>`
//!
//! Tags and fields are written in key order. Non-finite values are dropped,
//! and a point left without fields is not written at all.

use std::fmt::Write;

use crate::model::Point;

fn escape(out: &mut String, s: &str, special: &[char]) {
    for c in s.chars() {
        if special.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
}

/// Encodes one point as a line, or `None` if it has no writable field.
pub fn encode_point(point: &Point) -> Option<String> {
    let fields: Vec<(&String, f64)> = point
        .fields
        .iter()
        .filter(|(_, v)| v.is_finite())
        .map(|(k, v)| (k, *v))
        .collect();
    if fields.is_empty() {
        return None;
    }

    let mut line = String::new();
    escape(&mut line, &point.metric, &[',', ' ']);

    for (key, value) in &point.tags {
        // InfluxDB rejects empty tag values.
        if value.is_empty() {
            continue;
        }
        line.push(',');
        escape(&mut line, key, &[',', '=', ' ']);
        line.push('=');
        escape(&mut line, value, &[',', '=', ' ']);
    }

    for (i, (key, value)) in fields.iter().enumerate() {
        line.push(if i == 0 { ' ' } else { ',' });
        escape(&mut line, key, &[',', '=', ' ']);
        let _ = write!(line, "={}", value);
    }

    let _ = write!(line, " {}", point.timestamp.timestamp());
    Some(line)
}

/// Encodes a batch, one line per point, newline separated.
pub fn encode_batch(points: &[Point]) -> String {
    points
        .iter()
        .filter_map(encode_point)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Tags, host_tags};
    use chrono::{TimeZone, Utc};
    use std::collections::BTreeMap;

    fn ts() -> chrono::DateTime<Utc> {
        Utc.timestamp_opt(1672628645, 500_000_000).single().unwrap()
    }

    #[test]
    fn test_encode_single_field() {
        let p = Point::single("go_memstats_alloc_bytes", host_tags("web-1"), "gauge", 1024.0, ts());
        assert_eq!(
            encode_point(&p).unwrap(),
            "go_memstats_alloc_bytes,host=web-1 gauge=1024 1672628645"
        );
    }

    #[test]
    fn test_encode_merged_fields_sorted() {
        let mut fields = BTreeMap::new();
        fields.insert("sum".to_string(), 0.0015);
        fields.insert("count".to_string(), 3.0);
        let p = Point {
            metric: "go_gc_duration_seconds".to_string(),
            tags: host_tags("web-1"),
            fields,
            timestamp: ts(),
        };
        assert_eq!(
            encode_point(&p).unwrap(),
            "go_gc_duration_seconds,host=web-1 count=3,sum=0.0015 1672628645"
        );
    }

    #[test]
    fn test_encode_escapes() {
        let p = Point::single("my metric,x", host_tags("my host=a,b"), "a b", 1.5, ts());
        assert_eq!(
            encode_point(&p).unwrap(),
            "my\\ metric\\,x,host=my\\ host\\=a\\,b a\\ b=1.5 1672628645"
        );
    }

    #[test]
    fn test_encode_skips_empty_tags_and_non_finite() {
        let p = Point::single("m", host_tags(""), "gauge", 2.0, ts());
        assert_eq!(encode_point(&p).unwrap(), "m gauge=2 1672628645");

        let p = Point::single("m", Tags::new(), "gauge", f64::NAN, ts());
        assert_eq!(encode_point(&p), None);
    }

    #[test]
    fn test_encode_batch() {
        let points = vec![
            Point::single("a", Tags::new(), "gauge", 1.0, ts()),
            Point::single("b", Tags::new(), "gauge", f64::INFINITY, ts()),
            Point::single("c", Tags::new(), "counter", 3.0, ts()),
        ];
        assert_eq!(
            encode_batch(&points),
            "a gauge=1 1672628645\nc counter=3 1672628645"
        );
        assert_eq!(encode_batch(&[]), "");
    }
}
