// Statsdig - A minimal StatsD client and receiver for Rust!
//
// Copyright 2026 Statsdig Developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use crate::format::duration_to_millis;
use crate::samplers::core::Sampler;
use crate::types::{MetricKind, MetricResult, MetricValue, Tag};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// `Sampler` implementation that records metrics in memory so that the
/// number of times each one was sampled can be queried.
///
/// This is not a general purpose sampler, rather it's meant for verifying
/// metrics recorded during the course of tests. Every call takes the same
/// lock, so it should not be used in production.
///
/// Metrics are keyed by kind, name, value and tags (in the same order), so a
/// query only matches a recording made with all of them equal. Tags are kept
/// as separate pairs, so a tag value containing `,` or `=` never matches a
/// different set of tags that happens to encode to the same wire string.
/// Each recording increments the count for its key by one.
///
/// # Example
///
/// ```
/// use statsdig::prelude::*;
/// use statsdig::{MemSampler, Tag};
///
/// let sampler = MemSampler::new();
/// let tags = [Tag::new("mem", "1")];
///
/// sampler.count("requests", &tags).unwrap();
/// sampler.count("requests", &tags).unwrap();
///
/// assert_eq!(2, sampler.get_count("requests", &tags));
/// assert_eq!(0, sampler.get_count("requests", &[]));
/// ```
#[derive(Debug, Default)]
pub struct MemSampler {
    storage: Mutex<HashMap<Signature, u64>>,
}

// Float gauges are keyed by their bit pattern since `f64` isn't `Hash`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum SignatureValue {
    Signed(i64),
    Unsigned(u64),
    Float(u64),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct Signature {
    kind: MetricKind,
    name: String,
    value: SignatureValue,
    tags: Vec<Tag>,
}

impl Signature {
    fn new(kind: MetricKind, name: &str, value: MetricValue, tags: &[Tag]) -> Signature {
        let value = match value {
            MetricValue::Signed(v) => SignatureValue::Signed(v),
            MetricValue::Unsigned(v) => SignatureValue::Unsigned(v),
            MetricValue::Float(v) => SignatureValue::Float(v.to_bits()),
        };

        Signature {
            kind,
            name: name.to_owned(),
            value,
            tags: tags.to_vec(),
        }
    }

    fn count(name: &str, tags: &[Tag]) -> Signature {
        Signature::new(MetricKind::Count, name, MetricValue::Signed(1), tags)
    }

    fn gauge(name: &str, value: i64, tags: &[Tag]) -> Signature {
        Signature::new(MetricKind::Gauge, name, MetricValue::Signed(value), tags)
    }

    fn gauge_float(name: &str, value: f64, tags: &[Tag]) -> Signature {
        Signature::new(MetricKind::GaugeFloat, name, MetricValue::Float(value), tags)
    }

    fn time(name: &str, value: Duration, tags: &[Tag]) -> Signature {
        Signature::new(MetricKind::Time, name, MetricValue::Unsigned(duration_to_millis(value)), tags)
    }
}

impl MemSampler {
    pub fn new() -> MemSampler {
        MemSampler::default()
    }

    /// Number of times `count` was called with this name and tags.
    pub fn get_count(&self, name: &str, tags: &[Tag]) -> u64 {
        self.get(&Signature::count(name, tags))
    }

    /// Number of times `gauge` was called with this name, value and tags.
    pub fn get_gauge(&self, name: &str, value: i64, tags: &[Tag]) -> u64 {
        self.get(&Signature::gauge(name, value, tags))
    }

    /// Number of times `gauge_float` was called with this name, value and
    /// tags, as a float.
    pub fn get_gauge_float(&self, name: &str, value: f64, tags: &[Tag]) -> f64 {
        self.get(&Signature::gauge_float(name, value, tags)) as f64
    }

    /// Number of times `time` was called with this name, duration and tags.
    ///
    /// Durations that are equal at millisecond resolution match.
    pub fn get_time(&self, name: &str, value: Duration, tags: &[Tag]) -> u64 {
        self.get(&Signature::time(name, value, tags))
    }

    /// Number of distinct metrics recorded.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // A panic while holding the lock can't leave a counter half-updated,
    // so a poisoned lock is still safe to use.
    fn lock(&self) -> MutexGuard<'_, HashMap<Signature, u64>> {
        self.storage.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn add(&self, key: Signature) -> MetricResult<()> {
        *self.lock().entry(key).or_insert(0) += 1;
        Ok(())
    }

    fn get(&self, key: &Signature) -> u64 {
        self.lock().get(key).copied().unwrap_or(0)
    }
}

impl Sampler for MemSampler {
    fn count(&self, name: &str, tags: &[Tag]) -> MetricResult<()> {
        self.add(Signature::count(name, tags))
    }

    fn gauge(&self, name: &str, value: i64, tags: &[Tag]) -> MetricResult<()> {
        self.add(Signature::gauge(name, value, tags))
    }

    fn gauge_float(&self, name: &str, value: f64, tags: &[Tag]) -> MetricResult<()> {
        self.add(Signature::gauge_float(name, value, tags))
    }

    fn time(&self, name: &str, value: Duration, tags: &[Tag]) -> MetricResult<()> {
        self.add(Signature::time(name, value, tags))
    }
}
