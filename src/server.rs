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

//! The request-handling logic of the directory server.
//!
//! The [`Server`] structure is the heart of this module; see its
//! documentation for details.

use std::sync::{Mutex, MutexGuard};

use log::debug;

use crate::cache::DEFAULT_CAPACITY;
use crate::directory::Directory;
use crate::family::Family;
use crate::protocol::{self, response, Request};

/// A directory server, abstracted from any underlying network I/O
/// provider.
///
/// The `Server` receives request lines through
/// [`Server::handle_request`] (or raw datagrams through
/// [`Server::handle_datagram`]) and produces a response for every one
/// of them, including unknown and malformed requests. An I/O provider
/// is responsible for receiving datagrams and sending the responses
/// back.
///
/// Each address family has its own [`Directory`] behind its own lock.
/// A request holds a family's lock only while it touches that family,
/// so requests for different families never wait on each other, and a
/// `QUERY_BOTH` never holds both locks at once.
pub struct Server {
    ipv4: Mutex<Directory>,
    ipv6: Mutex<Directory>,
}

impl Server {
    /// Creates a new `Server` with empty directories whose caches hold
    /// at most `cache_capacity` domains each.
    pub fn new(cache_capacity: usize) -> Self {
        Self::with_directories(
            Directory::new(Family::Ipv4, cache_capacity),
            Directory::new(Family::Ipv6, cache_capacity),
        )
    }

    /// Creates a new `Server` over existing directories.
    ///
    /// # Panics
    ///
    /// Panics if the directories are not for IPv4 and IPv6,
    /// respectively.
    pub fn with_directories(ipv4: Directory, ipv6: Directory) -> Self {
        assert_eq!(ipv4.family(), Family::Ipv4, "expected an IPv4 directory");
        assert_eq!(ipv6.family(), Family::Ipv6, "expected an IPv6 directory");
        Self {
            ipv4: Mutex::new(ipv4),
            ipv6: Mutex::new(ipv6),
        }
    }

    /// Locks and returns the directory of `family`.
    pub fn directory(&self, family: Family) -> MutexGuard<Directory> {
        match family {
            Family::Ipv4 => self.ipv4.lock().unwrap(),
            Family::Ipv6 => self.ipv6.lock().unwrap(),
        }
    }

    /// Handles one request line and returns the response text.
    pub fn handle_request(&self, line: &str) -> String {
        let request = match protocol::parse(line) {
            Ok(request) => request,
            Err(e) => {
                debug!("Rejecting request {:?}: {}", line, e);
                return response::malformed(&e);
            }
        };

        match request {
            Request::Query { family, domain } => {
                let outcome = self.directory(family).query(domain);
                response::query(domain, &outcome)
            }
            Request::QueryBoth { domain } => {
                let ipv4 = self.directory(Family::Ipv4).query(domain);
                let ipv6 = self.directory(Family::Ipv6).query(domain);
                response::combined(domain, &ipv4, &ipv6)
            }
            Request::Insert {
                family,
                domain,
                address,
            } => {
                self.directory(family).insert(domain, address);
                response::inserted(domain, address)
            }
            Request::Remove {
                family,
                domain,
                address,
            } => {
                let result = self.directory(family).remove(domain, address);
                response::removed(domain, address, result)
            }
            Request::GetAll { family } => response::listing(self.directory(family).tree()),
            Request::Invalid => response::INVALID_COMMAND.to_owned(),
        }
    }

    /// Handles a received datagram and returns the response datagram.
    /// The datagram is decoded as UTF-8 (invalid sequences are replaced
    /// rather than rejected) and surrounding whitespace is ignored.
    pub fn handle_datagram(&self, received: &[u8]) -> Vec<u8> {
        let line = String::from_utf8_lossy(received);
        self.handle_request(line.trim()).into_bytes()
    }
}

impl Default for Server {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
