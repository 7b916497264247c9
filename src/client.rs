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

//! A client for talking to a running directory server.
//!
//! The [`Client`] sends one command per datagram and waits a bounded
//! time for the response. It never retries: a timeout is reported like
//! any other failure, as an `Error: ...` string in place of the
//! response.

use std::io;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, UdpSocket};
use std::time::{Duration, Instant};

use crate::family::Family;
use crate::io::MAX_DATAGRAM_SIZE;

/// How long [`Client::send_request`] waits for a response by default.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// What [`Client::send_request`] returns when the server doesn't answer
/// in time.
pub const TIMEOUT_MESSAGE: &str = "Error: Server response timed out.";

/// A UDP client for the directory protocol.
pub struct Client {
    server: SocketAddr,
    socket: UdpSocket,
    timeout: Duration,
}

impl Client {
    /// Creates a new `Client` for the server at `server`, bound to an
    /// ephemeral local port. `timeout` bounds the wait for each
    /// response and must be non-zero.
    pub fn new(server: SocketAddr, timeout: Duration) -> io::Result<Self> {
        let local: SocketAddr = match server {
            SocketAddr::V4(_) => (Ipv4Addr::UNSPECIFIED, 0).into(),
            SocketAddr::V6(_) => (Ipv6Addr::UNSPECIFIED, 0).into(),
        };
        let socket = UdpSocket::bind(local)?;
        socket.set_read_timeout(Some(timeout))?;
        Ok(Self {
            server,
            socket,
            timeout,
        })
    }

    /// Returns the address of the server this client talks to.
    pub fn server(&self) -> SocketAddr {
        self.server
    }

    /// Sends `command` and returns the server's response. Failures are
    /// folded into the returned text: [`TIMEOUT_MESSAGE`] on timeout,
    /// `Error: <cause>` otherwise.
    pub fn send_request(&self, command: &str) -> String {
        match self.try_send_request(command) {
            Ok(response) => response,
            Err(e) if is_timeout(&e) => TIMEOUT_MESSAGE.to_owned(),
            Err(e) => format!("Error: {e}"),
        }
    }

    /// Like [`Client::send_request`], but returns failures as errors.
    /// Datagrams from addresses other than the server are ignored; they
    /// do not extend the wait past the client's timeout.
    pub fn try_send_request(&self, command: &str) -> io::Result<String> {
        self.socket.send_to(command.as_bytes(), self.server)?;
        let deadline = Instant::now() + self.timeout;
        let mut buf = vec![0; MAX_DATAGRAM_SIZE];
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            // A zero read timeout is rejected by the socket.
            if remaining.is_zero() {
                return Err(io::ErrorKind::TimedOut.into());
            }
            self.socket.set_read_timeout(Some(remaining))?;
            let (len, src) = self.socket.recv_from(&mut buf)?;
            if src == self.server {
                return Ok(String::from_utf8_lossy(&buf[..len]).into_owned());
            }
        }
    }
}

/// Returns whether `error` is what a read timeout produces. Which kind
/// that is depends on the target.
fn is_timeout(error: &io::Error) -> bool {
    matches!(
        error.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
    )
}

/// Looks up both address families of `domain` with separate queries and
/// describes the result, one line per family:
///
/// * `IPv4 Record for <domain>: <addresses>` when found, or
/// * `<domain> has no IPv4 record.` when the server reports it missing.
///
/// (And likewise for IPv6.) Transport errors are shown in place of the
/// addresses.
pub fn resolve(client: &Client, domain: &str) -> Vec<String> {
    if domain.is_empty() {
        return vec!["Invalid domain. Please enter a valid domain name.".to_owned()];
    }

    Family::ALL
        .into_iter()
        .map(|family| {
            let response =
                client.send_request(&format!("QUERY_{} {}", family.verb_suffix(), domain));
            if response.contains("not found") {
                format!("{domain} has no {family} record.")
            } else {
                let addresses = response.rsplit(": ").next().unwrap_or(response.as_str());
                format!("{family} Record for {domain}: {addresses}")
            }
        })
        .collect()
}
