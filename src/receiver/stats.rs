// Statsdig - A minimal StatsD client and receiver for Rust!
//
// Copyright 2026 Statsdig Developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::sync::atomic::{AtomicU64, Ordering};

/// Snapshot of the counters kept by a `Receiver`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReceiverStats {
    /// Non-empty datagrams counted.
    pub received: u64,
    /// Zero-length datagrams, which are never counted as received.
    pub empty: u64,
    /// Datagrams that could not be decoded as a metric (fan-in mode only).
    pub decode_failures: u64,
}

/// Counters shared between the reader workers, the aggregator and the
/// owning `Receiver`.
///
/// In shared counter mode every reader increments `received`. In fan-in
/// mode only the aggregator does, the atomics just make the running total
/// readable from other threads.
#[derive(Debug, Default)]
pub(crate) struct ReceiverCounters {
    received: AtomicU64,
    empty: AtomicU64,
    decode_failures: AtomicU64,
}

impl ReceiverCounters {
    pub(crate) fn incr_received(&self) {
        self.received.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn received(&self) -> u64 {
        self.received.load(Ordering::Relaxed)
    }

    pub(crate) fn incr_empty(&self) {
        self.empty.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn incr_decode_failures(&self) {
        self.decode_failures.fetch_add(1, Ordering::Relaxed);
    }
}

impl From<&ReceiverCounters> for ReceiverStats {
    fn from(counters: &ReceiverCounters) -> Self {
        ReceiverStats {
            received: counters.received.load(Ordering::Relaxed),
            empty: counters.empty.load(Ordering::Relaxed),
            decode_failures: counters.decode_failures.load(Ordering::Relaxed),
        }
    }
}
