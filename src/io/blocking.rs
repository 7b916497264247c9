// Copyright 2022 Matthew Ingwersen.
//
// Licensed under the Apache License, Version 2.0 (the "License"); you
// may not use this file except in compliance with the License. You may
// obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or
// implied. See the License for the specific language governing
// permissions and limitations under the License.

//! Implementation of the blocking I/O provider.

// NOTE: Workers are not restarted, so neither receive nor send errors
// end a worker. Receive errors are logged and followed by a short pause
// so that a persistently failing socket does not spin.

use std::io;
use std::net::{SocketAddr, UdpSocket};
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use log::Level::Debug;
use log::{debug, error, log_enabled};

use crate::server::Server;
use crate::thread::WorkerGroup;

/// The largest UDP payload we will receive or send.
pub const MAX_DATAGRAM_SIZE: usize = 65_507;

/// A blocking I/O provider.
///
/// This provider serves a single UDP socket with a configurable number
/// of worker threads. Each worker receives a datagram, has the
/// [`Server`] handle it, and sends the response before receiving the
/// next one.
///
/// To shut the provider down, shut down the [`WorkerGroup`] in which it
/// was started (see [`BlockingIoProvider::start`]) and join it. Workers
/// notice within [`CHECK_FOR_SHUTDOWN_TIMEOUT`].
pub struct BlockingIoProvider {
    config: BlockingIoConfig,
    socket: Arc<UdpSocket>,
}

/// Configuration options for the [`BlockingIoProvider`].
#[derive(Clone, Debug)]
pub struct BlockingIoConfig {
    /// The number of worker threads to run on the socket.
    pub udp_workers: NonZeroUsize,
}

impl Default for BlockingIoConfig {
    fn default() -> Self {
        Self {
            udp_workers: NonZeroUsize::MIN,
        }
    }
}

impl BlockingIoProvider {
    /// Creates a new `BlockingIoProvider`. This binds the UDP socket in
    /// preparation, but does not start serving.
    pub fn bind(config: BlockingIoConfig, addr: SocketAddr) -> io::Result<Self> {
        let socket = UdpSocket::bind(addr)?;
        socket.set_read_timeout(Some(CHECK_FOR_SHUTDOWN_TIMEOUT))?;
        Ok(Self {
            config,
            socket: Arc::new(socket),
        })
    }

    /// Returns the address the socket is bound to. Useful when binding
    /// to port 0.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Starts serving on the provided [`WorkerGroup`]. If the group is
    /// already shutting down, nothing is started.
    pub fn start(self, server: &Arc<Server>, group: &Arc<WorkerGroup>) -> io::Result<()> {
        for i in 0..self.config.udp_workers.get() {
            let group_clone = group.clone();
            let server = server.clone();
            let socket = self.socket.clone();
            let task = move || run_udp_worker(&group_clone, &server, &socket);
            if !group.spawn(format!("udp worker {i}"), task)? {
                break;
            }
        }
        Ok(())
    }
}

/// The timeout on UDP receive operations. Workers check for worker
/// group shutdown between receives, so this is the longest shutdown
/// will have to wait for them.
pub const CHECK_FOR_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(1);

/// How long a worker pauses after a receive error it can't skip.
const RECEIVE_ERROR_BACKOFF: Duration = Duration::from_millis(100);

/// The UDP receive/handle/send loop.
fn run_udp_worker(group: &WorkerGroup, server: &Server, socket: &UdpSocket) {
    let mut received_buf = vec![0; MAX_DATAGRAM_SIZE];

    loop {
        if group.is_shutting_down() {
            return;
        }

        let (received_len, src) = match socket.recv_from(&mut received_buf) {
            Ok(pair) => pair,
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => continue,
            Err(e) if e.kind() == io::ErrorKind::TimedOut => continue,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            // Reported on some targets when an earlier response was
            // refused by its destination.
            Err(e) if e.kind() == io::ErrorKind::ConnectionReset => continue,
            Err(e) => {
                log_io_errors::<()>(Err(e));
                thread::sleep(RECEIVE_ERROR_BACKOFF);
                continue;
            }
        };
        let received = &received_buf[..received_len];
        if log_enabled!(Debug) {
            debug!(
                "Received request from {}: {}",
                src,
                String::from_utf8_lossy(received).trim()
            );
        }

        let mut response = server.handle_datagram(received);
        if response.len() > MAX_DATAGRAM_SIZE {
            error!(
                "Response to {} is {} octets; truncating to {}",
                src,
                response.len(),
                MAX_DATAGRAM_SIZE
            );
            truncate_response(&mut response, MAX_DATAGRAM_SIZE);
        }

        // Don't exit the task if the send fails. (See the note at the
        // beginning of the module.)
        log_io_errors(retry_if_interrupted(|| socket.send_to(&response, src)));
    }
}

/// Truncates `response`, which holds UTF-8 text, to at most `max_len`
/// octets without splitting a character.
fn truncate_response(response: &mut Vec<u8>, max_len: usize) {
    let mut end = max_len.min(response.len());
    // Anything that isn't text is cut at the byte limit.
    if let Ok(text) = std::str::from_utf8(response) {
        while !text.is_char_boundary(end) {
            end -= 1;
        }
    }
    response.truncate(end);
}

/// Executes `f`, retrying the operation if it is interrupted.
fn retry_if_interrupted<F, R>(mut f: F) -> io::Result<R>
where
    F: FnMut() -> io::Result<R>,
{
    loop {
        match f() {
            Ok(r) => return Ok(r),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}

/// Logs the error, if any, from an I/O operation of a worker.
fn log_io_errors<T>(result: io::Result<T>) {
    if let Err(e) = result {
        let current_thread = thread::current();
        let thread_name = current_thread.name().unwrap_or("anonymous thread");
        error!("I/O error in thread {}: {}", thread_name, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncation_keeps_whole_characters() {
        // "é" is two octets; a limit of 2 would split it.
        let mut response = "aé".as_bytes().to_vec();
        truncate_response(&mut response, 2);
        assert_eq!(response, b"a");

        let mut response = "aé".as_bytes().to_vec();
        truncate_response(&mut response, 3);
        assert_eq!(response, "aé".as_bytes());

        let mut response = b"abcdef".to_vec();
        truncate_response(&mut response, 4);
        assert_eq!(response, b"abcd");
    }
}
