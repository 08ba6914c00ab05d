use statsdig::prelude::*;
use statsdig::Tag;
use std::net::UdpSocket;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Run `iterations` rounds of all four metric kinds on `num_threads` threads
/// sharing one sampler.
#[allow(dead_code)]
pub fn run_arc_threaded_test<S>(sampler: S, num_threads: u64, iterations: u64) -> Arc<S>
where
    S: Sampler + Send + Sync + 'static,
{
    let shared_sampler = Arc::new(sampler);

    let threads: Vec<_> = (0..num_threads)
        .map(|_| {
            let local_sampler = Arc::clone(&shared_sampler);

            thread::spawn(move || {
                let tags = [Tag::new("thread", "shared")];
                for _ in 0..iterations {
                    local_sampler.count("some.counter", &tags).unwrap();
                    local_sampler.gauge("some.gauge", 666, &tags).unwrap();
                    local_sampler.gauge_float("some.gauge", 666.99, &tags).unwrap();
                    local_sampler.time("some.timer", Duration::from_millis(100), &tags).unwrap();
                }
            })
        })
        .collect();

    for t in threads {
        t.join().unwrap();
    }

    shared_sampler
}

/// Poll `cond` until it's true or a few seconds have passed.
#[allow(dead_code)]
pub fn wait_for<F: Fn() -> bool>(cond: F) -> bool {
    let deadline = Instant::now() + Duration::from_secs(10);
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    cond()
}

/// Socket standing in for a StatsD server.
#[allow(dead_code)]
pub fn new_listener() -> UdpSocket {
    let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
    socket.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
    socket
}

#[allow(dead_code)]
pub fn recv_string(socket: &UdpSocket) -> String {
    let mut buf = [0u8; 1024];
    let (n, _) = socket.recv_from(&mut buf).unwrap();
    String::from_utf8(buf[..n].to_vec()).unwrap()
}
