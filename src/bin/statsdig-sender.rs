// Statsdig - A minimal StatsD client and receiver for Rust!
//
// Copyright 2026 Statsdig Developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Generates lots of count metrics so there is something to look at on a
//! dashboard, or something for `statsdig-receiver` to count.

use getopts::Options;
use log::{error, info, warn};
use statsdig::prelude::*;
use statsdig::{SamplerStats, UdpSampler};
use std::env;
use std::process;
use std::str::FromStr;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

fn print_usage(program: &str, opts: &Options) {
    let brief = format!("Usage: {} [options]", program);
    print!("{}", opts.usage(&brief));
}

fn opts() -> Options {
    let mut opts = Options::new();

    opts.optopt("a", "addr", "address of the StatsD server (default 127.0.0.1:8125)", "HOST:PORT");
    opts.optopt("c", "count", "number of counts to send per sender (default 10000)", "INTEGER");
    opts.optopt("m", "metric", "metric name to send (default statsdig.test)", "STRING");
    opts.optopt("d", "delay", "milliseconds to wait between sends (default 0)", "INTEGER");
    opts.optopt("s", "senders", "number of parallel sender threads (default 1)", "INTEGER");
    opts.optflag("h", "help", "print this help menu");

    opts
}

fn opt_or<T: FromStr>(matches: &getopts::Matches, name: &str, default: T) -> Result<T, String> {
    match matches.opt_str(name) {
        Some(s) => s.parse().map_err(|_| format!("invalid value for --{}: {}", name, s)),
        None => Ok(default),
    }
}

fn send_counts(sampler: &UdpSampler, metric: &str, count: u64, delay: Duration) -> u64 {
    let mut failures = 0;

    for _ in 0..count {
        if let Err(e) = sampler.count(metric, &[]) {
            failures += 1;
            warn!("failed to send {}: {}", metric, e);
        }

        if delay > Duration::from_millis(0) {
            thread::sleep(delay);
        }
    }

    failures
}

fn main() {
    pretty_env_logger::init();

    let args: Vec<String> = env::args().collect();
    let program = &args[0];
    let opts = opts();

    let matches = match opts.parse(&args[1..]) {
        Ok(m) => m,
        Err(f) => {
            error!("Failed to parse command line args: {}", f);
            process::exit(2);
        }
    };

    if matches.opt_present("help") {
        print_usage(program, &opts);
        return;
    }

    let addr = matches.opt_str("addr").unwrap_or_else(|| "127.0.0.1:8125".to_owned());
    let metric = matches.opt_str("metric").unwrap_or_else(|| "statsdig.test".to_owned());
    let parsed = opt_or(&matches, "count", 10_000u64).and_then(|count| {
        let delay = opt_or(&matches, "delay", 0u64)?;
        let senders = opt_or(&matches, "senders", 1usize)?;
        Ok((count, delay, senders.max(1)))
    });

    let (count, delay, senders) = match parsed {
        Ok(v) => v,
        Err(e) => {
            error!("{}", e);
            process::exit(2);
        }
    };

    let sampler = match UdpSampler::new(addr.as_str()) {
        Ok(s) => Arc::new(s),
        Err(e) => {
            error!("Failed to create sampler for {}: {}", addr, e);
            process::exit(1);
        }
    };

    info!(
        "starting {} sender(s) of metric[{}] count[{}] to {}",
        senders,
        metric,
        count,
        sampler.addr()
    );

    let start = Instant::now();
    let delay = Duration::from_millis(delay);
    let handles: Vec<_> = (0..senders)
        .map(|_| {
            let sampler = Arc::clone(&sampler);
            let metric = metric.clone();
            thread::spawn(move || send_counts(&sampler, &metric, count, delay))
        })
        .collect();

    let failures: u64 = handles.into_iter().map(|h| h.join().unwrap_or(count)).sum();
    let stats: SamplerStats = sampler.stats();

    info!(
        "done in {:?}: {} packets ({} bytes) sent, {} failed",
        start.elapsed(),
        stats.packets_sent,
        stats.bytes_sent,
        failures
    );

    if failures > 0 {
        process::exit(1);
    }
}
