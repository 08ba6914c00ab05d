// Statsdig - A minimal StatsD client and receiver for Rust!
//
// Copyright 2026 Statsdig Developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Concurrent ingestion of StatsD datagrams
//!
//! A `Receiver` owns one inbound UDP socket and a fixed pool of reader
//! threads that all read from it. What the readers do with each datagram
//! depends on the `Aggregation` mode:
//!
//! * `SharedCounter`: every reader atomically increments one counter. This
//!   is the cheapest mode, the total is always exact but individual packets
//!   can't be inspected.
//! * `FanIn`: every reader pushes the datagram (and its source address) on
//!   to a bounded queue consumed by a single aggregator thread. The
//!   aggregator counts packets, decodes them and hands metrics to an optional
//!   `PacketHandler`. When the queue is full, readers block until the
//!   aggregator catches up instead of dropping packets or growing memory
//!   without bound. Undecodable packets are counted as decode failures.
//!
//! Empty datagrams are never counted as received, see `ReceiverStats::empty`.
//!
//! # Example
//!
//! ```no_run
//! use statsdig::Receiver;
//!
//! let receiver = Receiver::builder(8125)
//!     .with_workers(4)
//!     .with_queue_capacity(10_000)
//!     .with_handler(|packet: &statsdig::Packet, metric: statsdig::Metric| {
//!         println!("{} sent {}", packet.source, metric.name);
//!     })
//!     .start()
//!     .unwrap();
//!
//! println!("received {} packets so far", receiver.total());
//! receiver.shutdown_and_wait().unwrap();
//! ```

mod aggregator;
mod stats;
mod worker;

pub use crate::receiver::aggregator::{Packet, PacketHandler};
pub use crate::receiver::stats::ReceiverStats;

use crate::receiver::aggregator::Aggregator;
use crate::receiver::stats::ReceiverCounters;
use crate::receiver::worker::{ReadWorker, Recorder};
use crate::types::{ErrorKind, MetricError, MetricResult};
use crate::DEFAULT_PORT;
use crossbeam_channel::Sender;
use std::fmt;
use std::mem;
use std::net::{Ipv4Addr, SocketAddr, UdpSocket};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Largest payload a UDP datagram can carry, used as the default buffer
/// size so that no metric is ever truncated.
pub const MAX_UDP_SIZE: usize = 65536;

/// Default number of reader threads.
pub const DEFAULT_WORKERS: usize = 10;

/// Default capacity of the fan-in queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 10_000;

/// Default read timeout, i.e. how long shutdown may take to be noticed.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// How datagrams read by the workers are aggregated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregation {
    /// Workers increment one shared atomic counter.
    SharedCounter,
    /// Workers push onto a queue of this capacity drained by one aggregator.
    FanIn { capacity: usize },
}

/// Builder for creating and customizing `Receiver` instances.
///
/// Instances of the builder should be created by calling the `::builder()`
/// method on the `Receiver` struct.
///
/// Defaults:
///
/// * Bound to `0.0.0.0` on the given port.
/// * `DEFAULT_WORKERS` reader threads.
/// * Buffers of `MAX_UDP_SIZE` bytes. Choosing something smaller (1024 is
///   common) saves memory per worker at the cost of silently truncating
///   larger datagrams.
/// * Shared counter mode.
/// * A read timeout of `DEFAULT_POLL_INTERVAL`.
pub struct ReceiverBuilder {
    addr: SocketAddr,
    workers: usize,
    buffer_size: usize,
    aggregation: Aggregation,
    poll_interval: Duration,
    handler: Option<Box<dyn PacketHandler + Send + 'static>>,
}

impl ReceiverBuilder {
    fn new(addr: SocketAddr) -> Self {
        ReceiverBuilder {
            addr,
            workers: DEFAULT_WORKERS,
            buffer_size: MAX_UDP_SIZE,
            aggregation: Aggregation::SharedCounter,
            poll_interval: DEFAULT_POLL_INTERVAL,
            handler: None,
        }
    }

    /// Listen on this exact address instead of `0.0.0.0:<port>`.
    pub fn with_bind_addr(mut self, addr: SocketAddr) -> Self {
        self.addr = addr;
        self
    }

    /// Number of reader threads, at least one.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Size in bytes of each worker's datagram buffer, at least one.
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size.max(1);
        self
    }

    /// Use fan-in mode with a queue of the given capacity (at least one).
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.aggregation = Aggregation::FanIn {
            capacity: capacity.max(1),
        };
        self
    }

    /// Set the aggregation mode directly.
    pub fn with_aggregation(mut self, aggregation: Aggregation) -> Self {
        self.aggregation = match aggregation {
            Aggregation::FanIn { capacity } => Aggregation::FanIn {
                capacity: capacity.max(1),
            },
            other => other,
        };
        self
    }

    /// How long a blocked read waits before checking for shutdown.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval.max(Duration::from_millis(1));
        self
    }

    /// Handler for every decoded metric.
    ///
    /// Only used in fan-in mode. Setting a handler without having chosen a
    /// mode switches to fan-in with `DEFAULT_QUEUE_CAPACITY`.
    pub fn with_handler<H>(mut self, handler: H) -> Self
    where
        H: PacketHandler + Send + 'static,
    {
        if self.aggregation == Aggregation::SharedCounter {
            self.aggregation = Aggregation::FanIn {
                capacity: DEFAULT_QUEUE_CAPACITY,
            };
        }
        self.handler = Some(Box::new(handler));
        self
    }

    /// Bind the socket and start the worker threads (and the aggregator
    /// thread in fan-in mode).
    ///
    /// # Failures
    ///
    /// This method fails with a `Socket` error if the address can't be bound,
    /// the read timeout can't be set, or the socket can't be shared with the
    /// workers.
    pub fn start(self) -> MetricResult<Receiver> {
        let socket = UdpSocket::bind(self.addr).map_err(socket_error)?;
        socket.set_read_timeout(Some(self.poll_interval)).map_err(socket_error)?;
        let local_addr = socket.local_addr().map_err(socket_error)?;

        let mut receiver = Receiver {
            local_addr,
            aggregation: self.aggregation,
            shutdown: Arc::new(AtomicBool::new(false)),
            counters: Arc::new(ReceiverCounters::default()),
            queue: None,
            workers: Vec::with_capacity(self.workers),
            aggregator: None,
        };

        let sender = match self.aggregation {
            Aggregation::SharedCounter => None,
            Aggregation::FanIn { capacity } => {
                let (tx, rx) = crossbeam_channel::bounded(capacity);
                let aggregator = Aggregator::new(
                    rx,
                    Arc::clone(&receiver.counters),
                    Arc::clone(&receiver.shutdown),
                    self.handler,
                );
                receiver.aggregator = Some(spawn("statsdig-aggregator".to_owned(), move || aggregator.run())?);
                receiver.queue = Some(tx.clone());
                Some(tx)
            }
        };

        for id in 0..self.workers {
            let recorder = match sender {
                Some(ref tx) => Recorder::Queue(tx.clone()),
                None => Recorder::Counter,
            };

            let worker = ReadWorker::new(
                id,
                socket.try_clone().map_err(socket_error)?,
                self.buffer_size,
                Arc::clone(&receiver.shutdown),
                Arc::clone(&receiver.counters),
                recorder,
            );

            let handle = spawn(format!("statsdig-reader-{}", id), move || worker.run())?;
            receiver.workers.push(handle);
        }

        debug!(
            "receiver listening on {} with {} workers ({:?})",
            local_addr, self.workers, self.aggregation
        );

        Ok(receiver)
    }
}

impl fmt::Debug for ReceiverBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ReceiverBuilder {{ addr: {:?}, workers: {}, buffer_size: {}, aggregation: {:?}, poll_interval: {:?}, handler: ... }}",
            self.addr, self.workers, self.buffer_size, self.aggregation, self.poll_interval,
        )
    }
}

fn socket_error(err: std::io::Error) -> MetricError {
    MetricError::from((ErrorKind::Socket, err))
}

fn spawn<F, T>(name: String, f: F) -> MetricResult<JoinHandle<T>>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    thread::Builder::new().name(name).spawn(f).map_err(socket_error)
}

/// Running StatsD receiver.
///
/// Workers keep reading until `.shutdown()` is called, the `Receiver` is
/// dropped, or one of them hits a socket error. Use `.join()` to wait for
/// them and find out why they stopped.
///
/// # Example
///
/// ```
/// use std::net::UdpSocket;
/// use std::time::{Duration, Instant};
/// use statsdig::Receiver;
///
/// let receiver = Receiver::builder(0)
///     .with_bind_addr("127.0.0.1:0".parse().unwrap())
///     .with_workers(2)
///     .start()
///     .unwrap();
///
/// let client = UdpSocket::bind("127.0.0.1:0").unwrap();
/// client.send_to(b"some.counter:1|c", receiver.local_addr()).unwrap();
///
/// let deadline = Instant::now() + Duration::from_secs(5);
/// while receiver.total() < 1 && Instant::now() < deadline {
///     std::thread::sleep(Duration::from_millis(5));
/// }
///
/// assert_eq!(1, receiver.total());
/// receiver.shutdown_and_wait().unwrap();
/// ```
pub struct Receiver {
    local_addr: SocketAddr,
    aggregation: Aggregation,
    shutdown: Arc<AtomicBool>,
    counters: Arc<ReceiverCounters>,
    // Only used to read the queue length, dropped before joining the aggregator.
    queue: Option<Sender<Packet>>,
    workers: Vec<JoinHandle<MetricResult<()>>>,
    aggregator: Option<JoinHandle<()>>,
}

impl Receiver {
    /// Create a builder for a receiver listening on all interfaces at the
    /// given port (use `0` for any free port).
    pub fn builder(port: u16) -> ReceiverBuilder {
        ReceiverBuilder::new(SocketAddr::from((Ipv4Addr::UNSPECIFIED, port)))
    }

    /// Start a receiver with all defaults on the standard StatsD port.
    pub fn start_default() -> MetricResult<Receiver> {
        Receiver::builder(DEFAULT_PORT).start()
    }

    /// Address the socket is actually bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn aggregation(&self) -> Aggregation {
        self.aggregation
    }

    /// Number of packets counted so far. Safe to call from any thread.
    pub fn total(&self) -> u64 {
        self.counters.received()
    }

    pub fn stats(&self) -> ReceiverStats {
        (&*self.counters).into()
    }

    /// Number of packets waiting for the aggregator, always `0` in shared
    /// counter mode.
    pub fn queued(&self) -> usize {
        self.queue.as_ref().map(|q| q.len()).unwrap_or(0)
    }

    /// Has shutdown been requested, or has a worker failed?
    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::Acquire)
    }

    /// Signal every worker to stop. Workers notice within one poll interval.
    ///
    /// Note that this only signals the workers, it doesn't wait for them.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Release);
    }

    /// Wait for every worker to stop and the aggregator (if any) to drain the
    /// queue, returning the first socket error a worker hit.
    ///
    /// This blocks until `.shutdown()` is called from another thread or a
    /// worker fails.
    pub fn join(mut self) -> MetricResult<()> {
        let mut first_err = None;

        for handle in mem::take(&mut self.workers) {
            let res = handle
                .join()
                .unwrap_or_else(|_| Err(MetricError::from((ErrorKind::Transport, "receiver worker panicked"))));

            if let Err(e) = res {
                first_err.get_or_insert(e);
            }
        }

        // With the last sender gone the aggregator stops once it has drained
        // whatever is left.
        self.queue = None;
        if let Some(handle) = self.aggregator.take() {
            if handle.join().is_err() {
                first_err.get_or_insert(MetricError::from((ErrorKind::Transport, "aggregator panicked")));
            }
        }

        debug!("receiver on {} stopped after {} packets", self.local_addr, self.total());

        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Signal shutdown and wait for everything to stop.
    pub fn shutdown_and_wait(self) -> MetricResult<()> {
        self.shutdown();
        self.join()
    }
}

impl Drop for Receiver {
    /// Signal the workers to stop without waiting for them.
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl fmt::Debug for Receiver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Receiver {{ local_addr: {:?}, aggregation: {:?}, stats: {:?}, workers: {} }}",
            self.local_addr,
            self.aggregation,
            self.stats(),
            self.workers.len(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{Aggregation, Receiver, DEFAULT_QUEUE_CAPACITY, DEFAULT_WORKERS, MAX_UDP_SIZE};
    use crate::types::ErrorKind;
    use std::net::UdpSocket;
    use std::time::Duration;

    fn local_builder() -> super::ReceiverBuilder {
        Receiver::builder(0)
            .with_bind_addr("127.0.0.1:0".parse().unwrap())
            .with_poll_interval(Duration::from_millis(10))
    }

    #[test]
    fn test_builder_defaults() {
        let builder = Receiver::builder(8125);
        assert_eq!("0.0.0.0:8125", builder.addr.to_string());
        assert_eq!(DEFAULT_WORKERS, builder.workers);
        assert_eq!(MAX_UDP_SIZE, builder.buffer_size);
        assert_eq!(Aggregation::SharedCounter, builder.aggregation);
    }

    #[test]
    fn test_builder_clamps_values() {
        let builder = Receiver::builder(0)
            .with_workers(0)
            .with_buffer_size(0)
            .with_queue_capacity(0)
            .with_poll_interval(Duration::from_millis(0));

        assert_eq!(1, builder.workers);
        assert_eq!(1, builder.buffer_size);
        assert_eq!(Aggregation::FanIn { capacity: 1 }, builder.aggregation);
        assert_eq!(Duration::from_millis(1), builder.poll_interval);
    }

    #[test]
    fn test_builder_handler_switches_to_fan_in() {
        let builder = Receiver::builder(0).with_handler(|_: &super::Packet, _: crate::Metric| {});
        assert_eq!(
            Aggregation::FanIn {
                capacity: DEFAULT_QUEUE_CAPACITY
            },
            builder.aggregation
        );
    }

    #[test]
    fn test_builder_handler_keeps_explicit_capacity() {
        let builder = Receiver::builder(0)
            .with_queue_capacity(16)
            .with_handler(|_: &super::Packet, _: crate::Metric| {});
        assert_eq!(Aggregation::FanIn { capacity: 16 }, builder.aggregation);
    }

    #[test]
    fn test_start_address_in_use() {
        let taken = UdpSocket::bind("127.0.0.1:0").unwrap();
        let res = Receiver::builder(0)
            .with_bind_addr(taken.local_addr().unwrap())
            .start();

        assert_eq!(ErrorKind::Socket, res.unwrap_err().kind());
    }

    #[test]
    fn test_shutdown_and_wait_shared_counter() {
        let receiver = local_builder().with_workers(3).start().unwrap();
        assert!(!receiver.is_shutdown());
        assert_eq!(0, receiver.queued());
        assert!(receiver.shutdown_and_wait().is_ok());
    }

    #[test]
    fn test_shutdown_and_wait_fan_in() {
        let receiver = local_builder().with_queue_capacity(4).start().unwrap();
        assert_eq!(Aggregation::FanIn { capacity: 4 }, receiver.aggregation());
        assert!(receiver.shutdown_and_wait().is_ok());
    }
}
