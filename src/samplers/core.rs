// Statsdig - A minimal StatsD client and receiver for Rust!
//
// Copyright 2026 Statsdig Developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use crate::types::{MetricResult, Tag};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Snapshot of what a sampler has sent so far.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SamplerStats {
    pub bytes_sent: u64,
    pub packets_sent: u64,
    pub bytes_dropped: u64,
    pub packets_dropped: u64,
}

#[derive(Debug, Default)]
pub(crate) struct SocketStats {
    bytes_sent: AtomicU64,
    packets_sent: AtomicU64,
    bytes_dropped: AtomicU64,
    packets_dropped: AtomicU64,
}

impl SocketStats {
    pub(crate) fn incr_sent(&self, n: usize) {
        self.bytes_sent.fetch_add(n as u64, Ordering::Relaxed);
        self.packets_sent.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn incr_dropped(&self, n: usize) {
        self.bytes_dropped.fetch_add(n as u64, Ordering::Relaxed);
        self.packets_dropped.fetch_add(1, Ordering::Relaxed);
    }
}

impl From<&SocketStats> for SamplerStats {
    fn from(stats: &SocketStats) -> Self {
        SamplerStats {
            bytes_sent: stats.bytes_sent.load(Ordering::Relaxed),
            packets_sent: stats.packets_sent.load(Ordering::Relaxed),
            bytes_dropped: stats.bytes_dropped.load(Ordering::Relaxed),
            packets_dropped: stats.packets_dropped.load(Ordering::Relaxed),
        }
    }
}

/// Trait for the various ways of recording StatsD metrics.
///
/// Each method encodes a single metric and either sends it somewhere (see
/// `UdpSampler`) or records it for later inspection (see `MemSampler`).
/// Tags are written in the order given. Errors are always returned to the
/// caller, nothing is retried.
///
/// Examples of each metric type on the wire are given below.
///
/// ## Count
///
/// ``` text
/// some.counter:1|c
/// ```
///
/// ## Gauge
///
/// ``` text
/// some.gauge#host=web1:5|g
/// ```
///
/// ## Float gauge
///
/// ``` text
/// some.gauge:500.012|gf
/// ```
///
/// ## Time
///
/// ``` text
/// some.timer:456|ms
/// ```
///
/// See the [StatsD metric types](https://github.com/statsd/statsd/blob/master/docs/metric_types.md)
/// documentation for more information.
pub trait Sampler {
    /// Increment the counter with the given name by one.
    fn count(&self, name: &str, tags: &[Tag]) -> MetricResult<()>;

    /// Set the gauge with the given name to the given value.
    fn gauge(&self, name: &str, value: i64, tags: &[Tag]) -> MetricResult<()>;

    /// Set the float gauge with the given name to the given value.
    fn gauge_float(&self, name: &str, value: f64, tags: &[Tag]) -> MetricResult<()>;

    /// Record a timing, truncated to whole milliseconds.
    fn time(&self, name: &str, value: Duration, tags: &[Tag]) -> MetricResult<()>;
}

/// Implementation of `Sampler` that discards all metrics.
///
/// Useful for disabling metric collection.
#[derive(Debug, Clone, Default)]
pub struct NopSampler;

impl Sampler for NopSampler {
    fn count(&self, _name: &str, _tags: &[Tag]) -> MetricResult<()> {
        Ok(())
    }

    fn gauge(&self, _name: &str, _value: i64, _tags: &[Tag]) -> MetricResult<()> {
        Ok(())
    }

    fn gauge_float(&self, _name: &str, _value: f64, _tags: &[Tag]) -> MetricResult<()> {
        Ok(())
    }

    fn time(&self, _name: &str, _value: Duration, _tags: &[Tag]) -> MetricResult<()> {
        Ok(())
    }
}
