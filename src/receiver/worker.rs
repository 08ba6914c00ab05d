// Statsdig - A minimal StatsD client and receiver for Rust!
//
// Copyright 2026 Statsdig Developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use crate::receiver::aggregator::Packet;
use crate::receiver::stats::ReceiverCounters;
use crate::types::{ErrorKind, MetricError, MetricResult};
use crossbeam_channel::Sender;
use std::io;
use std::net::{SocketAddr, UdpSocket};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// What a worker does with each datagram it reads.
#[derive(Debug)]
pub(crate) enum Recorder {
    /// Increment the shared `received` counter.
    Counter,
    /// Hand the datagram to the aggregator, blocking while the queue is full.
    Queue(Sender<Packet>),
}

/// One of the fixed pool of threads reading from the shared inbound socket.
///
/// Each worker owns a handle to the same socket and a private buffer. The
/// socket has a read timeout set so that the worker checks the shutdown flag
/// at least once per timeout, even if no datagrams arrive.
#[derive(Debug)]
pub(crate) struct ReadWorker {
    id: usize,
    socket: UdpSocket,
    buffer_size: usize,
    shutdown: Arc<AtomicBool>,
    counters: Arc<ReceiverCounters>,
    recorder: Recorder,
}

impl ReadWorker {
    pub(crate) fn new(
        id: usize,
        socket: UdpSocket,
        buffer_size: usize,
        shutdown: Arc<AtomicBool>,
        counters: Arc<ReceiverCounters>,
        recorder: Recorder,
    ) -> Self {
        ReadWorker {
            id,
            socket,
            buffer_size,
            shutdown,
            counters,
            recorder,
        }
    }

    /// Read datagrams until shutdown is signaled or the socket fails.
    ///
    /// A socket failure stops this worker and signals shutdown to every
    /// other worker sharing the socket, since they won't be able to use it
    /// either.
    pub(crate) fn run(self) -> MetricResult<()> {
        debug!("receiver worker {} started", self.id);

        let mut buf = vec![0u8; self.buffer_size];
        let res = self.read_loop(&mut buf);

        if let Err(ref e) = res {
            error!("receiver worker {} stopping: {}", self.id, e);
            self.shutdown.store(true, Ordering::Release);
        }

        debug!("receiver worker {} stopped", self.id);
        res
    }

    fn read_loop(&self, buf: &mut [u8]) -> MetricResult<()> {
        while !self.shutdown.load(Ordering::Acquire) {
            match self.socket.recv_from(buf) {
                Ok((0, source)) => {
                    self.counters.incr_empty();
                    trace!("receiver worker {} ignoring empty datagram from {}", self.id, source);
                }
                Ok((n, source)) => self.record(source, &buf[..n])?,
                Err(ref e) if is_benign(e) => {}
                Err(e) => return Err(MetricError::from((ErrorKind::Transport, e))),
            }
        }

        Ok(())
    }

    fn record(&self, source: SocketAddr, payload: &[u8]) -> MetricResult<()> {
        match self.recorder {
            Recorder::Counter => {
                self.counters.incr_received();
                Ok(())
            }
            Recorder::Queue(ref queue) => {
                let packet = Packet {
                    source,
                    payload: payload.to_vec(),
                };

                queue
                    .send(packet)
                    .map_err(|_| MetricError::from((ErrorKind::Transport, "aggregator queue disconnected")))
            }
        }
    }
}

// Hitting the read timeout is expected, it's how workers notice shutdown.
fn is_benign(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut | io::ErrorKind::Interrupted
    )
}
