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

//! Implements the client commands, `send` and `resolve`.

use std::process;

use namedir::client::{self, Client};

use crate::args::{ClientArgs, ResolveArgs, SendArgs};

/// Sends one command and prints the response.
pub fn send(args: SendArgs) {
    let client = connect(&args.client);
    let command = args.command.join(" ");
    println!("Response: {}", client.send_request(&command));
}

/// Prints the IPv4 and IPv6 records of a domain.
pub fn resolve(args: ResolveArgs) {
    let client = connect(&args.client);
    for line in client::resolve(&client, args.domain.trim()) {
        println!("{line}");
    }
}

fn connect(args: &ClientArgs) -> Client {
    match Client::new(args.server, args.timeout.0) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Error: failed to create a client socket: {e}");
            process::exit(1);
        }
    }
}
