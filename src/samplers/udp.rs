// Statsdig - A minimal StatsD client and receiver for Rust!
//
// Copyright 2026 Statsdig Developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use std::time::Duration;

use crate::format::MetricFormatter;
use crate::samplers::core::{Sampler, SamplerStats, SocketStats};
use crate::types::{ErrorKind, MetricError, MetricResult, Tag};
use crate::{DEFAULT_HOST, DEFAULT_PORT};

/// Attempt to convert anything implementing the `ToSocketAddrs` trait
/// into a concrete `SocketAddr` instance, returning a `Resolution`
/// error if the address could not be parsed or resolved.
// Public portion of the API (the sampler constructors) is pass by value so
// there's no point in changing this to be pass by reference yet.
#[allow(clippy::needless_pass_by_value)]
fn get_addr<A: ToSocketAddrs>(addr: A) -> MetricResult<SocketAddr> {
    let mut addrs = addr
        .to_socket_addrs()
        .map_err(|e| MetricError::from((ErrorKind::Resolution, e)))?;

    match addrs.next() {
        Some(addr) => Ok(addr),
        None => Err(MetricError::from((
            ErrorKind::Resolution,
            "No socket addresses yielded",
        ))),
    }
}

/// Open an unbound-port socket of the same family as the destination.
fn get_socket(dest: &SocketAddr) -> MetricResult<UdpSocket> {
    let local = if dest.is_ipv4() { "0.0.0.0:0" } else { "[::]:0" };
    UdpSocket::bind(local).map_err(|e| MetricError::from((ErrorKind::Socket, e)))
}

/// Implementation of a `Sampler` that emits metrics over UDP.
///
/// Each metric is encoded and sent to the StatsD server as a single datagram
/// when one of the `Sampler` methods is called, in the thread of the caller.
/// There is no buffering and no retries.
///
/// The sampler may be shared between threads (wrap it in an `Arc`). Every call
/// encodes into its own buffer and the socket is only ever used for
/// `send_to`, which is atomic per datagram.
#[derive(Debug)]
pub struct UdpSampler {
    addr: SocketAddr,
    socket: UdpSocket,
    stats: SocketStats,
}

impl UdpSampler {
    /// Construct a new `UdpSampler` sending to the given address.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use statsdig::UdpSampler;
    ///
    /// let sampler = UdpSampler::new("metrics.example.com:8125").unwrap();
    /// ```
    ///
    /// # Failures
    ///
    /// This method may fail if:
    ///
    /// * It is unable to resolve the hostname of the metric server (`Resolution`).
    /// * A local socket could not be opened (`Socket`).
    pub fn new<A>(to_addr: A) -> MetricResult<UdpSampler>
    where
        A: ToSocketAddrs,
    {
        let addr = get_addr(to_addr)?;
        let socket = get_socket(&addr)?;
        Ok(UdpSampler::with_socket(addr, socket))
    }

    /// Construct a new `UdpSampler` sending to a StatsD server on the local
    /// machine at the default port (`127.0.0.1:8125`).
    pub fn local() -> MetricResult<UdpSampler> {
        UdpSampler::new((DEFAULT_HOST, DEFAULT_PORT))
    }

    /// Construct a new `UdpSampler` from an already bound socket.
    ///
    /// The socket should already have any desired configuration applied
    /// (blocking vs non-blocking, etc.).
    ///
    /// # Example
    ///
    /// ```no_run
    /// use std::net::UdpSocket;
    /// use statsdig::{UdpSampler, DEFAULT_PORT};
    ///
    /// let socket = UdpSocket::bind("0.0.0.0:0").unwrap();
    /// socket.set_nonblocking(true).unwrap();
    /// let sampler = UdpSampler::from_socket(("metrics.example.com", DEFAULT_PORT), socket);
    /// ```
    pub fn from_socket<A>(to_addr: A, socket: UdpSocket) -> MetricResult<UdpSampler>
    where
        A: ToSocketAddrs,
    {
        let addr = get_addr(to_addr)?;
        Ok(UdpSampler::with_socket(addr, socket))
    }

    fn with_socket(addr: SocketAddr, socket: UdpSocket) -> UdpSampler {
        UdpSampler {
            addr,
            socket,
            stats: SocketStats::default(),
        }
    }

    /// Address metrics are sent to.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Statistics about the datagrams this sampler has sent or dropped.
    pub fn stats(&self) -> SamplerStats {
        (&self.stats).into()
    }

    fn send(&self, metric: &str) -> MetricResult<()> {
        let len = metric.len();
        match self.socket.send_to(metric.as_bytes(), self.addr) {
            Ok(written) if written == len => {
                self.stats.incr_sent(written);
                Ok(())
            }
            Ok(written) => {
                self.stats.incr_dropped(len);
                Err(MetricError::from((
                    ErrorKind::PartialSend,
                    "short write",
                    format!("expected to send {} bytes but sent {}", len, written),
                )))
            }
            Err(e) => {
                self.stats.incr_dropped(len);
                Err(MetricError::from((ErrorKind::Transport, e)))
            }
        }
    }
}

impl Sampler for UdpSampler {
    fn count(&self, name: &str, tags: &[Tag]) -> MetricResult<()> {
        self.send(&MetricFormatter::count(name, tags).format())
    }

    fn gauge(&self, name: &str, value: i64, tags: &[Tag]) -> MetricResult<()> {
        self.send(&MetricFormatter::gauge(name, value, tags).format())
    }

    fn gauge_float(&self, name: &str, value: f64, tags: &[Tag]) -> MetricResult<()> {
        self.send(&MetricFormatter::gauge_float(name, value, tags).format())
    }

    fn time(&self, name: &str, value: Duration, tags: &[Tag]) -> MetricResult<()> {
        self.send(&MetricFormatter::time(name, value, tags).format())
    }
}

#[cfg(test)]
mod tests {
    use super::{get_addr, Sampler, UdpSampler};
    use crate::types::{ErrorKind, Tag};
    use std::net::UdpSocket;
    use std::str;
    use std::time::Duration;

    fn listener() -> UdpSocket {
        let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
        socket.set_read_timeout(Some(Duration::from_secs(1))).unwrap();
        socket
    }

    fn recv_string(socket: &UdpSocket) -> String {
        let mut buf = [0u8; 1024];
        let (n, _) = socket.recv_from(&mut buf).unwrap();
        str::from_utf8(&buf[..n]).unwrap().to_owned()
    }

    #[test]
    fn test_get_addr_bad_address() {
        let res = get_addr("asdf");
        assert_eq!(ErrorKind::Resolution, res.unwrap_err().kind());
    }

    #[test]
    fn test_get_addr_valid_address() {
        let res = get_addr("127.0.0.1:8125");
        assert!(res.is_ok());
    }

    #[test]
    fn test_new_bad_address() {
        let res = UdpSampler::new("not an address");
        assert_eq!(ErrorKind::Resolution, res.unwrap_err().kind());
    }

    #[test]
    fn test_local_sampler_address() {
        let sampler = UdpSampler::local().unwrap();
        assert_eq!("127.0.0.1:8125", sampler.addr().to_string());
    }

    #[test]
    fn test_udp_sampler_count() {
        let server = listener();
        let sampler = UdpSampler::new(server.local_addr().unwrap()).unwrap();

        sampler.count("buz", &[]).unwrap();
        assert_eq!("buz:1|c", recv_string(&server));
    }

    #[test]
    fn test_udp_sampler_each_kind_with_tags() {
        let server = listener();
        let sampler = UdpSampler::new(server.local_addr().unwrap()).unwrap();
        let tags = vec![Tag::new("tag", "hi"), Tag::new("tag2", "1")];

        sampler.gauge("g", 777, &tags).unwrap();
        sampler.gauge_float("gf", 666.99, &tags).unwrap();
        sampler.time("t", Duration::from_secs(1), &tags).unwrap();

        assert_eq!("g#tag=hi,tag2=1:777|g", recv_string(&server));
        assert_eq!("gf#tag=hi,tag2=1:666.99|gf", recv_string(&server));
        assert_eq!("t#tag=hi,tag2=1:1000|ms", recv_string(&server));
    }

    #[test]
    fn test_udp_sampler_stats() {
        let server = listener();
        let sampler = UdpSampler::new(server.local_addr().unwrap()).unwrap();

        sampler.count("buz", &[]).unwrap();
        sampler.count("buz", &[]).unwrap();

        let stats = sampler.stats();
        assert_eq!(2, stats.packets_sent);
        assert_eq!(14, stats.bytes_sent);
        assert_eq!(0, stats.packets_dropped);
    }

    #[test]
    fn test_non_blocking_udp_sampler() {
        let server = listener();
        let socket = UdpSocket::bind("0.0.0.0:0").unwrap();
        socket.set_nonblocking(true).unwrap();
        let sampler = UdpSampler::from_socket(server.local_addr().unwrap(), socket).unwrap();

        assert!(sampler.count("baz", &[]).is_ok());
    }
}
