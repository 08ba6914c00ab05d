// Statsdig - A minimal StatsD client and receiver for Rust!
//
// Copyright 2026 Statsdig Developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Encoding of metrics into the StatsD wire format
//!
//! Every metric is written as a single line without a trailing newline:
//!
//! ``` text
//! name[#tag1=val1,tag2=val2]:value|suffix
//! ```
//!
//! The tag block (including the leading `#`) is only present when at least
//! one tag is given. Encoding can't fail.

use crate::types::{MetricKind, MetricValue, Tag};
use std::fmt::Write;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct MetricFormatter<'a> {
    name: &'a str,
    value: MetricValue,
    kind: MetricKind,
    tags: &'a [Tag],
}

impl<'a> MetricFormatter<'a> {
    const TAG_PREFIX: char = '#';

    /// Counters are always a single increment.
    pub fn count(name: &'a str, tags: &'a [Tag]) -> Self {
        Self::new(name, MetricValue::Signed(1), MetricKind::Count, tags)
    }

    pub fn gauge(name: &'a str, value: i64, tags: &'a [Tag]) -> Self {
        Self::new(name, MetricValue::Signed(value), MetricKind::Gauge, tags)
    }

    pub fn gauge_float(name: &'a str, value: f64, tags: &'a [Tag]) -> Self {
        Self::new(name, MetricValue::Float(value), MetricKind::GaugeFloat, tags)
    }

    /// Durations are truncated to whole milliseconds, saturating at `u64::MAX`.
    pub fn time(name: &'a str, value: Duration, tags: &'a [Tag]) -> Self {
        Self::new(name, MetricValue::Unsigned(duration_to_millis(value)), MetricKind::Time, tags)
    }

    /// Values that don't match `kind` are converted to the representation
    /// that kind uses on the wire, and counts are always a single increment.
    pub fn new(name: &'a str, value: MetricValue, kind: MetricKind, tags: &'a [Tag]) -> Self {
        MetricFormatter {
            name,
            value: coerce_value(kind, value),
            kind,
            tags,
        }
    }

    fn tag_size_hint(&self) -> usize {
        if self.tags.is_empty() {
            return 0;
        }

        // prefix, names, '=' separators, values, commas
        let kv: usize = self.tags.iter().map(|t| t.name.len() + 1 + t.value.len()).sum();
        1 + kv + self.tags.len() - 1
    }

    fn write_tags(&self, out: &mut String) {
        if !self.tags.is_empty() {
            out.push(Self::TAG_PREFIX);
            for (i, tag) in self.tags.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&tag.name);
                out.push('=');
                out.push_str(&tag.value);
            }
        }
    }

    pub fn format(&self) -> String {
        #[rustfmt::skip]
        let size_hint = self.name.len() + self.tag_size_hint() + 1 /* : */ + 20 /* value */ + 1 /* | */ + 2 /* kind */;
        let mut out = String::with_capacity(size_hint);
        out.push_str(self.name);
        self.write_tags(&mut out);
        let _ = write!(out, ":{}|{}", self.value, self.kind);
        out
    }
}

// Float to integer `as` casts saturate and map NaN to zero.
fn coerce_value(kind: MetricKind, value: MetricValue) -> MetricValue {
    match (kind, value) {
        (MetricKind::Count, _) => MetricValue::Signed(1),
        (MetricKind::Gauge, MetricValue::Signed(v)) => MetricValue::Signed(v),
        (MetricKind::Gauge, MetricValue::Unsigned(v)) => MetricValue::Signed(i64::try_from(v).unwrap_or(i64::MAX)),
        (MetricKind::Gauge, MetricValue::Float(v)) => MetricValue::Signed(v as i64),
        (MetricKind::GaugeFloat, MetricValue::Signed(v)) => MetricValue::Float(v as f64),
        (MetricKind::GaugeFloat, MetricValue::Unsigned(v)) => MetricValue::Float(v as f64),
        (MetricKind::GaugeFloat, MetricValue::Float(v)) => MetricValue::Float(v),
        (MetricKind::Time, MetricValue::Signed(v)) => MetricValue::Unsigned(u64::try_from(v).unwrap_or(0)),
        (MetricKind::Time, MetricValue::Unsigned(v)) => MetricValue::Unsigned(v),
        (MetricKind::Time, MetricValue::Float(v)) => MetricValue::Unsigned(v as u64),
    }
}

/// Convert a duration to whole milliseconds, rounding down.
pub fn duration_to_millis(value: Duration) -> u64 {
    let millis = value.as_millis();
    if millis > u64::MAX as u128 {
        u64::MAX
    } else {
        millis as u64
    }
}

/// Encode a metric as the string that would be sent over the wire.
pub fn encode_to_string(name: &str, value: MetricValue, kind: MetricKind, tags: &[Tag]) -> String {
    MetricFormatter::new(name, value, kind, tags).format()
}

/// Encode a metric as the bytes of a single datagram.
pub fn encode(name: &str, value: MetricValue, kind: MetricKind, tags: &[Tag]) -> Vec<u8> {
    encode_to_string(name, value, kind, tags).into_bytes()
}

#[cfg(test)]
mod tests {
    use super::{duration_to_millis, encode, encode_to_string, MetricFormatter};
    use crate::parse::parse;
    use crate::types::{MetricKind, MetricValue, Tag};
    use std::time::Duration;

    #[test]
    fn test_encode_count_no_tags() {
        assert_eq!(b"x:1|c".to_vec(), encode("x", MetricValue::Signed(1), MetricKind::Count, &[]));
    }

    #[test]
    fn test_encode_count_ignores_increment() {
        assert_eq!("x:1|c", encode_to_string("x", MetricValue::Signed(5), MetricKind::Count, &[]));
        assert_eq!("x:1|c", encode_to_string("x", MetricValue::Float(2.5), MetricKind::Count, &[]));
    }

    #[test]
    fn test_encode_coerces_value_to_kind() {
        assert_eq!("t:1|ms", encode_to_string("t", MetricValue::Float(1.5), MetricKind::Time, &[]));
        assert_eq!("t:0|ms", encode_to_string("t", MetricValue::Signed(-20), MetricKind::Time, &[]));
        assert_eq!("g:3|g", encode_to_string("g", MetricValue::Float(3.9), MetricKind::Gauge, &[]));
        assert_eq!(
            "g:9223372036854775807|g",
            encode_to_string("g", MetricValue::Unsigned(u64::MAX), MetricKind::Gauge, &[])
        );
        assert_eq!("f:42|gf", encode_to_string("f", MetricValue::Unsigned(42), MetricKind::GaugeFloat, &[]));
    }

    #[test]
    fn test_encode_output_always_parses() {
        let values = [MetricValue::Signed(-7), MetricValue::Unsigned(7), MetricValue::Float(7.25)];
        let kinds = [MetricKind::Count, MetricKind::Gauge, MetricKind::GaugeFloat, MetricKind::Time];

        for kind in kinds.iter() {
            for value in values.iter() {
                let encoded = encode_to_string("m", *value, *kind, &[]);
                let metric = parse(&encoded).unwrap();
                assert_eq!(*kind, metric.kind, "{}", encoded);
            }
        }
    }

    #[test]
    fn test_encode_is_deterministic() {
        let first = encode("x", MetricValue::Signed(1), MetricKind::Count, &[]);
        let second = encode("x", MetricValue::Signed(1), MetricKind::Count, &[]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_encode_count_with_tags() {
        let tags = vec![Tag::new("tag", "hi"), Tag::new("tag2", "1")];
        assert_eq!(
            "TestCountTags#tag=hi,tag2=1:1|c",
            MetricFormatter::count("TestCountTags", &tags).format()
        );
    }

    #[test]
    fn test_encode_duplicate_tags_kept_in_order() {
        let tags = vec![Tag::new("b", "2"), Tag::new("a", "1"), Tag::new("b", "2")];
        assert_eq!("dup#b=2,a=1,b=2:5|g", MetricFormatter::gauge("dup", 5, &tags).format());
    }

    #[test]
    fn test_encode_gauge() {
        assert_eq!("some.gauge:666|g", MetricFormatter::gauge("some.gauge", 666, &[]).format());
        assert_eq!("some.gauge:-4|g", MetricFormatter::gauge("some.gauge", -4, &[]).format());
    }

    #[test]
    fn test_encode_gauge_float() {
        assert_eq!("m:500.012|gf", MetricFormatter::gauge_float("m", 500.012, &[]).format());
        assert_eq!("m:0.1|gf", MetricFormatter::gauge_float("m", 0.1, &[]).format());
        assert_eq!("m:777|gf", MetricFormatter::gauge_float("m", 777.0, &[]).format());
    }

    #[test]
    fn test_encode_gauge_float_with_tags() {
        let tags = vec![Tag::new("mem", "1")];
        assert_eq!(
            "gaugefloat#mem=1:777.41|gf",
            encode_to_string("gaugefloat", MetricValue::Float(777.41), MetricKind::GaugeFloat, &tags)
        );
    }

    #[test]
    fn test_encode_time_minute() {
        assert_eq!(
            "t:60000|ms",
            MetricFormatter::time("t", Duration::from_secs(60), &[]).format()
        );
    }

    #[test]
    fn test_encode_time_millisecond() {
        assert_eq!("t:1|ms", MetricFormatter::time("t", Duration::from_millis(1), &[]).format());
    }

    #[test]
    fn test_encode_time_truncates_sub_millisecond() {
        assert_eq!("t:1|ms", MetricFormatter::time("t", Duration::from_micros(1999), &[]).format());
        assert_eq!("t:0|ms", MetricFormatter::time("t", Duration::from_nanos(10), &[]).format());
    }

    #[test]
    fn test_duration_to_millis_saturates() {
        assert_eq!(u64::MAX, duration_to_millis(Duration::new(u64::MAX, 0)));
    }
}
