// Statsdig - A minimal StatsD client and receiver for Rust!
//
// Copyright 2026 Statsdig Developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::error;
use std::fmt;
use std::io;

/// Extra dimension attached to a metric, like a Prometheus label.
///
/// Tags are written in the order they are given and duplicates are kept
/// as-is. See the Sysdig StatsD tag format for details on how servers
/// interpret them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tag {
    pub name: String,
    pub value: String,
}

impl Tag {
    pub fn new<N, V>(name: N, value: V) -> Tag
    where
        N: Into<String>,
        V: Into<String>,
    {
        Tag {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl<N, V> From<(N, V)> for Tag
where
    N: Into<String>,
    V: Into<String>,
{
    fn from((name, value): (N, V)) -> Tag {
        Tag::new(name, value)
    }
}

/// Type of metric that knows how to display its wire suffix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    Count,
    Gauge,
    GaugeFloat,
    Time,
}

impl MetricKind {
    /// Suffix written after the `|` separator for this kind of metric.
    pub fn suffix(self) -> &'static str {
        match self {
            MetricKind::Count => "c",
            MetricKind::Gauge => "g",
            MetricKind::GaugeFloat => "gf",
            MetricKind::Time => "ms",
        }
    }

    /// Inverse of `suffix()`, `None` for anything this crate doesn't emit.
    pub fn from_suffix(suffix: &str) -> Option<MetricKind> {
        match suffix {
            "c" => Some(MetricKind::Count),
            "g" => Some(MetricKind::Gauge),
            "gf" => Some(MetricKind::GaugeFloat),
            "ms" => Some(MetricKind::Time),
            _ => None,
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.suffix().fmt(f)
    }
}

/// Holder for primitive metric values that knows how to display itself
///
/// Counts and gauges are signed, timers are whole milliseconds and float
/// gauges use the shortest representation that parses back to the same
/// `f64`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MetricValue {
    Signed(i64),
    Unsigned(u64),
    Float(f64),
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            MetricValue::Signed(v) => v.fmt(f),
            MetricValue::Unsigned(v) => v.fmt(f),
            MetricValue::Float(v) => v.fmt(f),
        }
    }
}

/// A single metric decoded from the wire format.
#[derive(Debug, Clone, PartialEq)]
pub struct Metric {
    pub name: String,
    pub tags: Vec<Tag>,
    pub value: MetricValue,
    pub kind: MetricKind,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ErrorKind {
    /// The destination address could not be resolved
    Resolution,
    /// A local socket could not be opened or bound
    Socket,
    /// Sending or receiving on a socket failed
    Transport,
    /// Fewer bytes were written than the encoded metric contains
    PartialSend,
    /// An inbound payload was not a valid metric
    Decode,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let desc = match *self {
            ErrorKind::Resolution => "resolution error",
            ErrorKind::Socket => "socket error",
            ErrorKind::Transport => "transport error",
            ErrorKind::PartialSend => "partial send",
            ErrorKind::Decode => "decode error",
        };
        desc.fmt(f)
    }
}

/// Error generated by this library
#[derive(Debug)]
pub struct MetricError {
    repr: ErrorRepr,
}

#[derive(Debug)]
enum ErrorRepr {
    WithDescription(ErrorKind, &'static str),
    WithDetail(ErrorKind, &'static str, String),
    IoError(ErrorKind, io::Error),
}

impl MetricError {
    /// Return the kind of the error
    pub fn kind(&self) -> ErrorKind {
        match self.repr {
            ErrorRepr::WithDescription(kind, _) => kind,
            ErrorRepr::WithDetail(kind, _, _) => kind,
            ErrorRepr::IoError(kind, _) => kind,
        }
    }
}

impl fmt::Display for MetricError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.repr {
            ErrorRepr::WithDescription(kind, desc) => write!(f, "{}: {}", kind, desc),
            ErrorRepr::WithDetail(kind, desc, ref detail) => write!(f, "{}: {}: {}", kind, desc, detail),
            ErrorRepr::IoError(kind, ref err) => write!(f, "{}: {}", kind, err),
        }
    }
}

impl error::Error for MetricError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self.repr {
            ErrorRepr::IoError(_, ref err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for MetricError {
    fn from(err: io::Error) -> MetricError {
        MetricError {
            repr: ErrorRepr::IoError(ErrorKind::Transport, err),
        }
    }
}

impl From<(ErrorKind, io::Error)> for MetricError {
    fn from((kind, err): (ErrorKind, io::Error)) -> MetricError {
        MetricError {
            repr: ErrorRepr::IoError(kind, err),
        }
    }
}

impl From<(ErrorKind, &'static str)> for MetricError {
    fn from((kind, desc): (ErrorKind, &'static str)) -> MetricError {
        MetricError {
            repr: ErrorRepr::WithDescription(kind, desc),
        }
    }
}

impl From<(ErrorKind, &'static str, String)> for MetricError {
    fn from((kind, desc, detail): (ErrorKind, &'static str, String)) -> MetricError {
        MetricError {
            repr: ErrorRepr::WithDetail(kind, desc, detail),
        }
    }
}

pub type MetricResult<T> = Result<T, MetricError>;
