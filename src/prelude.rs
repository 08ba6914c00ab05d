// Statsdig - A minimal StatsD client and receiver for Rust!
//
// Copyright 2026 Statsdig Developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Export commonly used parts of Statsdig for easy glob imports
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use statsdig::prelude::*;
//! use statsdig::NopSampler;
//!
//! let sampler = NopSampler;
//!
//! sampler.count("some.counter", &[]).unwrap();
//! sampler.gauge("some.gauge", 45, &[]).unwrap();
//! sampler.gauge_float("some.gauge", 4.5, &[]).unwrap();
//! sampler.time("some.timer", Duration::from_millis(23), &[]).unwrap();
//! ```

pub use crate::samplers::Sampler;
