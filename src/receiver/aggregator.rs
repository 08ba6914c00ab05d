// Statsdig - A minimal StatsD client and receiver for Rust!
//
// Copyright 2026 Statsdig Developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use crate::parse::parse_bytes;
use crate::receiver::stats::ReceiverCounters;
use crate::types::Metric;
use crossbeam_channel::Receiver;
use std::fmt;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

/// A datagram read by one of the receiver workers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub source: SocketAddr,
    pub payload: Vec<u8>,
}

/// Callback invoked by the aggregator for every packet that decoded to a
/// metric.
///
/// Handlers run in the single aggregator thread, one packet at a time, so
/// they don't need any locking of their own. A slow handler slows down the
/// aggregator, which in turn blocks the reader workers once the queue is
/// full.
pub trait PacketHandler {
    fn accept(&self, packet: &Packet, metric: Metric);
}

impl<F> PacketHandler for F
where
    F: Fn(&Packet, Metric),
{
    fn accept(&self, packet: &Packet, metric: Metric) {
        (self)(packet, metric);
    }
}

/// Single consumer of the fan-in queue.
///
/// Runs until every sending side of the queue (one per reader worker plus
/// the one held by the `Receiver`) has been dropped, so everything queued
/// before shutdown is still counted.
///
/// If a handler panics the queue is dropped while unwinding, which wakes any
/// worker blocked on a full queue with a disconnect error, and shutdown is
/// signaled so idle workers stop too.
pub(crate) struct Aggregator {
    queue: Receiver<Packet>,
    counters: Arc<ReceiverCounters>,
    shutdown: Arc<AtomicBool>,
    handler: Option<Box<dyn PacketHandler + Send + 'static>>,
}

struct PanicGuard<'a> {
    shutdown: &'a AtomicBool,
}

impl Drop for PanicGuard<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            error!("aggregator panicked, shutting down receiver");
            self.shutdown.store(true, Ordering::Release);
        }
    }
}

impl Aggregator {
    pub(crate) fn new(
        queue: Receiver<Packet>,
        counters: Arc<ReceiverCounters>,
        shutdown: Arc<AtomicBool>,
        handler: Option<Box<dyn PacketHandler + Send + 'static>>,
    ) -> Self {
        Aggregator {
            queue,
            counters,
            shutdown,
            handler,
        }
    }

    pub(crate) fn run(self) {
        debug!("aggregator started");
        let _guard = PanicGuard {
            shutdown: &self.shutdown,
        };

        for packet in self.queue.iter() {
            self.process(packet);
        }

        debug!("aggregator stopped after {} packets", self.counters.received());
    }

    fn process(&self, packet: Packet) {
        self.counters.incr_received();

        match parse_bytes(&packet.payload) {
            Ok(metric) => {
                if let Some(ref handler) = self.handler {
                    handler.accept(&packet, metric);
                }
            }
            Err(e) => {
                self.counters.incr_decode_failures();
                debug!("dropping packet from {}: {}", packet.source, e);
            }
        }
    }
}

impl fmt::Debug for Aggregator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Aggregator {{ queue: {:?}, handler: ... }}", self.queue)
    }
}

#[cfg(test)]
mod tests {
    use super::{Aggregator, Packet, PacketHandler};
    use crate::receiver::stats::{ReceiverCounters, ReceiverStats};
    use crate::types::{Metric, MetricKind};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};
    use std::thread;
    use std::time::Duration;

    fn packet(payload: &str) -> Packet {
        Packet {
            source: "127.0.0.1:9999".parse().unwrap(),
            payload: payload.as_bytes().to_vec(),
        }
    }

    #[test]
    fn test_aggregator_drains_queue_after_disconnect() {
        let (tx, rx) = crossbeam_channel::bounded(4);
        let counters = Arc::new(ReceiverCounters::default());
        let aggregator = Aggregator::new(rx, Arc::clone(&counters), Arc::new(AtomicBool::new(false)), None);

        tx.send(packet("a:1|c")).unwrap();
        tx.send(packet("b:1|c")).unwrap();
        tx.send(packet("c:1|c")).unwrap();
        drop(tx);

        aggregator.run();
        assert_eq!(3, counters.received());
    }

    #[test]
    fn test_aggregator_counts_decode_failures() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let counters = Arc::new(ReceiverCounters::default());
        let aggregator = Aggregator::new(rx, Arc::clone(&counters), Arc::new(AtomicBool::new(false)), None);

        tx.send(packet("a:1|c")).unwrap();
        tx.send(packet("garbage")).unwrap();
        tx.send(packet("b:what|g")).unwrap();
        drop(tx);

        aggregator.run();

        let expected = ReceiverStats {
            received: 3,
            empty: 0,
            decode_failures: 2,
        };
        assert_eq!(expected, ReceiverStats::from(&*counters));
    }

    #[test]
    fn test_aggregator_handler_sees_decoded_metrics_in_order() {
        let seen: Arc<Mutex<Vec<Metric>>> = Arc::new(Mutex::new(Vec::new()));
        let seen_ref = Arc::clone(&seen);

        let (tx, rx) = crossbeam_channel::unbounded();
        let counters = Arc::new(ReceiverCounters::default());
        let handler: Box<dyn PacketHandler + Send> = Box::new(move |_: &Packet, m: Metric| {
            seen_ref.lock().unwrap().push(m);
        });
        let aggregator = Aggregator::new(rx, counters, Arc::new(AtomicBool::new(false)), Some(handler));

        tx.send(packet("first:1|c")).unwrap();
        tx.send(packet("bad")).unwrap();
        tx.send(packet("second#k=v:12|ms")).unwrap();
        drop(tx);

        aggregator.run();

        let seen = seen.lock().unwrap();
        assert_eq!(2, seen.len());
        assert_eq!("first", seen[0].name);
        assert_eq!(MetricKind::Count, seen[0].kind);
        assert_eq!("second", seen[1].name);
        assert_eq!(MetricKind::Time, seen[1].kind);
    }

    #[test]
    fn test_aggregator_handler_panic_signals_shutdown_and_disconnects() {
        let (tx, rx) = crossbeam_channel::bounded(1);
        let counters = Arc::new(ReceiverCounters::default());
        let shutdown = Arc::new(AtomicBool::new(false));
        let handler: Box<dyn PacketHandler + Send> = Box::new(|_: &Packet, _: Metric| panic!("handler failed"));
        let aggregator = Aggregator::new(rx, counters, Arc::clone(&shutdown), Some(handler));

        let t = thread::spawn(move || aggregator.run());
        tx.send(packet("a:1|c")).unwrap();

        assert!(t.join().is_err());
        assert!(shutdown.load(Ordering::Acquire));
        // A sender blocked on the full queue would see the same error.
        assert!(tx.send_timeout(packet("b:1|c"), Duration::from_secs(5)).is_err());
    }
}
