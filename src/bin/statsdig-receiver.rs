// Statsdig - A minimal StatsD client and receiver for Rust!
//
// Copyright 2026 Statsdig Developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Counts StatsD packets arriving on a port and logs the running total.

use getopts::Options;
use log::{error, info};
use statsdig::{Receiver, DEFAULT_PORT, DEFAULT_WORKERS};
use std::env;
use std::process;
use std::str::FromStr;
use std::thread;
use std::time::Duration;

fn print_usage(program: &str, opts: &Options) {
    let brief = format!("Usage: {} [options]", program);
    print!("{}", opts.usage(&brief));
}

fn opts() -> Options {
    let mut opts = Options::new();

    opts.optopt("p", "port", "port to listen on (default 8125)", "INTEGER");
    opts.optopt("w", "workers", "number of reader threads (default 10)", "INTEGER");
    opts.optopt("q", "queue", "aggregate through a queue of this capacity", "INTEGER");
    opts.optopt("b", "buffer", "datagram buffer size in bytes (default 65536)", "INTEGER");
    opts.optopt("i", "interval", "seconds between reports (default 1)", "INTEGER");
    opts.optflag("h", "help", "print this help menu");

    opts
}

fn opt<T: FromStr>(matches: &getopts::Matches, name: &str) -> Result<Option<T>, String> {
    match matches.opt_str(name) {
        Some(s) => s
            .parse()
            .map(Some)
            .map_err(|_| format!("invalid value for --{}: {}", name, s)),
        None => Ok(None),
    }
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

    let parsed = (|| -> Result<_, String> {
        let port: u16 = opt(&matches, "port")?.unwrap_or(DEFAULT_PORT);
        let workers: usize = opt(&matches, "workers")?.unwrap_or(DEFAULT_WORKERS);
        let queue: Option<usize> = opt(&matches, "queue")?;
        let buffer: Option<usize> = opt(&matches, "buffer")?;
        let interval: u64 = opt(&matches, "interval")?.unwrap_or(1);
        Ok((port, workers, queue, buffer, interval.max(1)))
    })();

    let (port, workers, queue, buffer, interval) = match parsed {
        Ok(v) => v,
        Err(e) => {
            error!("{}", e);
            process::exit(2);
        }
    };

    let mut builder = Receiver::builder(port).with_workers(workers);
    if let Some(capacity) = queue {
        builder = builder.with_queue_capacity(capacity);
    }
    if let Some(size) = buffer {
        builder = builder.with_buffer_size(size);
    }

    let receiver = match builder.start() {
        Ok(r) => r,
        Err(e) => {
            error!("Failed to start receiver on port {}: {}", port, e);
            process::exit(1);
        }
    };

    info!(
        "listening on {} with {} workers ({:?})",
        receiver.local_addr(),
        workers,
        receiver.aggregation()
    );

    let mut last = 0;
    while !receiver.is_shutdown() {
        thread::sleep(Duration::from_secs(interval));

        let stats = receiver.stats();
        info!(
            "total: {} (+{}) empty: {} undecodable: {} queued: {}",
            stats.received,
            stats.received - last,
            stats.empty,
            stats.decode_failures,
            receiver.queued()
        );
        last = stats.received;
    }

    if let Err(e) = receiver.join() {
        error!("receiver stopped: {}", e);
        process::exit(1);
    }
}
