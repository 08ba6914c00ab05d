// Statsdig - A minimal StatsD client and receiver for Rust!
//
// Copyright 2026 Statsdig Developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! A minimal StatsD toolkit: an encoder for the plain-text wire format,
//! samplers that emit metrics, and a concurrent UDP receiver.
//!
//! ## Wire format
//!
//! Every metric is a single line sent as one datagram:
//!
//! ```text
//! <name>[#<tag>=<value>,<tag>=<value>...]:<value>|<suffix>
//! ```
//!
//! The suffix is `c` for counts (always incremented by one), `g` for integer
//! gauges, `gf` for floating point gauges and `ms` for timings, which are
//! sent as whole milliseconds.
//!
//! ## Samplers
//!
//! Anything implementing the `Sampler` trait can record the four metric
//! kinds. `UdpSampler` sends each one to a StatsD server as it's recorded,
//! `MemSampler` keeps per-metric counts in memory for use in tests and
//! `NopSampler` discards everything.
//!
//! ```no_run
//! use std::time::Duration;
//! use statsdig::prelude::*;
//! use statsdig::{Tag, UdpSampler};
//!
//! let sampler = UdpSampler::new("metrics.example.com:8125").unwrap();
//! let tags = [Tag::new("region", "eu")];
//!
//! sampler.count("requests", &tags).unwrap();
//! sampler.gauge("queue.depth", 42, &tags).unwrap();
//! sampler.gauge_float("load", 0.75, &[]).unwrap();
//! sampler.time("request.latency", Duration::from_millis(12), &tags).unwrap();
//! ```
//!
//! ## Receiver
//!
//! A `Receiver` reads datagrams on one UDP port with a fixed pool of worker
//! threads and keeps a running total, either with a shared atomic counter or
//! by fanning packets into a bounded queue consumed by a single aggregator.
//! See the `receiver` module for details.
//!
//! ```no_run
//! use statsdig::Receiver;
//!
//! let receiver = Receiver::builder(8125).with_workers(10).start().unwrap();
//! // ...
//! println!("{} packets", receiver.total());
//! receiver.shutdown_and_wait().unwrap();
//! ```

#[macro_use]
extern crate log;

/// Port StatsD servers conventionally listen on.
pub const DEFAULT_PORT: u16 = 8125;

/// Host used by `UdpSampler::local()`.
pub const DEFAULT_HOST: &str = "127.0.0.1";

pub use self::format::{encode, encode_to_string, MetricFormatter};

pub use self::parse::{parse, parse_bytes};

pub use self::receiver::{
    Aggregation, Packet, PacketHandler, Receiver, ReceiverBuilder, ReceiverStats,
    DEFAULT_QUEUE_CAPACITY, DEFAULT_WORKERS, MAX_UDP_SIZE,
};

pub use self::samplers::{MemSampler, NopSampler, Sampler, SamplerStats, UdpSampler};

pub use self::types::{ErrorKind, Metric, MetricError, MetricKind, MetricResult, MetricValue, Tag};

pub mod format;
pub mod parse;
pub mod prelude;
pub mod receiver;
mod samplers;
mod types;
