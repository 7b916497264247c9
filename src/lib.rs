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

//! Namedir is a small name-to-address directory served over UDP.
//!
//! Clients send one-line text commands (`INSERT_IPV4`, `QUERY_BOTH`,
//! `GET_ALL_IPV6`, and so on) in single datagrams, and the server
//! answers each with a single text datagram. Addresses are kept
//! separately for two [address families](family::Family), each with its
//! own [`DomainTree`](tree::DomainTree) and FIFO
//! [`LookupCache`](cache::LookupCache).
//!
//! The crate is split the same way the server is run: the [`Server`]
//! structure handles requests abstracted from any network I/O, and an
//! [I/O provider](io) moves datagrams between the operating system and
//! the [`Server`]. A matching [`Client`](client::Client) is provided
//! for talking to a running server.

pub mod cache;
pub mod client;
pub mod directory;
pub mod family;
pub mod io;
pub mod load;
pub mod protocol;
pub mod server;
pub mod thread;
pub mod tree;

pub use server::Server;
