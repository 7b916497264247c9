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

//! Implements command-line argument parsing.

use std::net::{IpAddr, SocketAddr};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::anyhow;
use clap::{Args as ClapArgs, Parser, Subcommand};

/// Parses the command line arguments.
pub fn parse() -> Args {
    Args::parse()
}

/// The namedir directory server
#[derive(Debug, Parser)]
#[command(author, version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the server
    Run(RunArgs),

    /// Send a single command to a server and print the response
    Send(SendArgs),

    /// Look up the IPv4 and IPv6 records of a domain
    Resolve(ResolveArgs),
}

#[derive(Debug, Parser)]
pub struct RunArgs {
    /// Set the configuration file to use
    #[arg(
        long,
        conflicts_with_all = ["host", "port", "ipv4_file", "ipv6_file", "cache_size", "udp_workers"],
        value_name = "FILE"
    )]
    pub config: Option<PathBuf>,

    /// Set the server bind IP address
    #[arg(long, value_name = "IP")]
    pub host: Option<IpAddr>,

    /// Set the server port
    #[arg(long, value_name = "PORT")]
    pub port: Option<u16>,

    /// Load IPv4 records from a file of "domain address" lines
    #[arg(long, value_name = "FILE")]
    pub ipv4_file: Option<PathBuf>,

    /// Load IPv6 records from a file of "domain address" lines
    #[arg(long, value_name = "FILE")]
    pub ipv6_file: Option<PathBuf>,

    /// Set the number of domains cached per address family
    #[arg(long, value_name = "N")]
    pub cache_size: Option<usize>,

    /// Set the number of UDP worker threads (at least 1)
    #[arg(long, value_name = "N")]
    pub udp_workers: Option<NonZeroUsize>,
}

/// Options shared by the client commands.
#[derive(Debug, ClapArgs)]
pub struct ClientArgs {
    /// Set the server IP address and port
    #[arg(long, default_value = "127.0.0.1:8080", value_name = "IP:PORT")]
    pub server: SocketAddr,

    /// Set how long to wait for each response, in seconds
    #[arg(long, default_value = "5", value_name = "SECONDS")]
    pub timeout: Seconds,
}

#[derive(Debug, Parser)]
pub struct SendArgs {
    #[command(flatten)]
    pub client: ClientArgs,

    /// The command to send, e.g. QUERY_IPV4 example.com
    #[arg(required = true, num_args = 1.., value_name = "COMMAND")]
    pub command: Vec<String>,
}

#[derive(Debug, Parser)]
pub struct ResolveArgs {
    #[command(flatten)]
    pub client: ClientArgs,

    /// The domain to look up
    pub domain: String,
}

/// A non-zero timeout given in (possibly fractional) seconds.
#[derive(Clone, Copy, Debug)]
pub struct Seconds(pub Duration);

impl FromStr for Seconds {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let secs: f64 = s
            .parse()
            .map_err(|e| anyhow!("invalid number of seconds: {}", e))?;
        let duration = Duration::try_from_secs_f64(secs)
            .map_err(|e| anyhow!("invalid number of seconds: {}", e))?;
        if duration.is_zero() {
            Err(anyhow!("the timeout must be greater than zero"))
        } else {
            Ok(Self(duration))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seconds_from_str_accepts_fractions_and_rejects_zero() {
        let half: Seconds = "0.5".parse().unwrap();
        assert_eq!(half.0, Duration::from_millis(500));
        assert!("0".parse::<Seconds>().is_err());
        assert!("-1".parse::<Seconds>().is_err());
        assert!("soon".parse::<Seconds>().is_err());
    }

    #[test]
    fn send_collects_command_words() {
        let args = Args::try_parse_from(["namedird", "send", "QUERY_IPV4", "a.com"]).unwrap();
        match args.command {
            Command::Send(send) => {
                assert_eq!(send.command.join(" "), "QUERY_IPV4 a.com");
                assert_eq!(send.client.server, "127.0.0.1:8080".parse().unwrap());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn run_rejects_zero_udp_workers() {
        assert!(Args::try_parse_from(["namedird", "run", "--udp-workers", "0"]).is_err());
        let args = Args::try_parse_from(["namedird", "run", "--udp-workers", "3"]).unwrap();
        match args.command {
            Command::Run(run) => assert_eq!(run.udp_workers.map(NonZeroUsize::get), Some(3)),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn run_config_conflicts_with_flags() {
        assert!(
            Args::try_parse_from(["namedird", "run", "--config", "x.toml", "--port", "53"])
                .is_err()
        );
    }
}
