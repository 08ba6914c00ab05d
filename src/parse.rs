// Statsdig - A minimal StatsD client and receiver for Rust!
//
// Copyright 2026 Statsdig Developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Decoding of the StatsD wire format produced by `format`.

use crate::types::{ErrorKind, Metric, MetricError, MetricKind, MetricResult, MetricValue, Tag};
use std::str;

fn decode_error(desc: &'static str, input: &str) -> MetricError {
    MetricError::from((ErrorKind::Decode, desc, input.to_owned()))
}

/// Parse the raw bytes of a datagram into a `Metric`.
pub fn parse_bytes(payload: &[u8]) -> MetricResult<Metric> {
    match str::from_utf8(payload) {
        Ok(s) => parse(s),
        Err(e) => Err(MetricError::from((ErrorKind::Decode, "payload is not utf-8", e.to_string()))),
    }
}

/// Parse a single `name[#tags]:value|suffix` metric.
pub fn parse(input: &str) -> MetricResult<Metric> {
    let (body, suffix) = input
        .rsplit_once('|')
        .ok_or_else(|| decode_error("missing type separator", input))?;
    let kind = MetricKind::from_suffix(suffix).ok_or_else(|| decode_error("unknown metric type", input))?;

    let (head, raw_value) = body
        .rsplit_once(':')
        .ok_or_else(|| decode_error("missing value separator", input))?;
    let value = parse_value(kind, raw_value).ok_or_else(|| decode_error("invalid value", input))?;

    let (name, tags) = match head.split_once('#') {
        Some((name, raw_tags)) => (name, parse_tags(raw_tags, input)?),
        None => (head, Vec::new()),
    };

    if name.is_empty() {
        return Err(decode_error("empty metric name", input));
    }

    Ok(Metric {
        name: name.to_owned(),
        tags,
        value,
        kind,
    })
}

fn parse_value(kind: MetricKind, raw: &str) -> Option<MetricValue> {
    match kind {
        MetricKind::Count | MetricKind::Gauge => raw.parse().ok().map(MetricValue::Signed),
        MetricKind::Time => raw.parse().ok().map(MetricValue::Unsigned),
        MetricKind::GaugeFloat => raw.parse().ok().map(MetricValue::Float),
    }
}

fn parse_tags(raw: &str, input: &str) -> MetricResult<Vec<Tag>> {
    if raw.is_empty() {
        return Err(decode_error("empty tag block", input));
    }

    raw.split(',')
        .map(|pair| match pair.split_once('=') {
            Some((name, value)) if !name.is_empty() => Ok(Tag::new(name, value)),
            _ => Err(decode_error("malformed tag", input)),
        })
        .collect()
}
