// Statsdig - A minimal StatsD client and receiver for Rust!
//
// Copyright 2026 Statsdig Developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

mod core;
mod memory;
mod udp;

pub use crate::samplers::core::{NopSampler, Sampler, SamplerStats};
pub use crate::samplers::memory::MemSampler;
pub use crate::samplers::udp::UdpSampler;
