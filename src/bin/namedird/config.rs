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

//! Implements the server configuration file.

use std::fs;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use log::Level::Debug;
use log::{debug, log_enabled};
use serde::Deserialize;

use namedir::cache::DEFAULT_CAPACITY;
use namedir::io::BlockingIoConfig;

use crate::args::RunArgs;

////////////////////////////////////////////////////////////////////////
// CONFIGURATION LOADING                                              //
////////////////////////////////////////////////////////////////////////

/// Loads the server configuration from the file given by `path`.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<Config> {
    let dir = match path.as_ref().parent() {
        Some(p) => p,
        None => return Err(anyhow!("the configuration file path has no parent")),
    };
    let raw_config = fs::read(path.as_ref()).context("failed to read the configuration file")?;
    let mut config: Config =
        toml::from_slice(&raw_config).context("failed to parse the configuration file")?;

    // When loading the configuration from a path, record file paths are
    // interpreted relative to the configuration file's directory.
    for record_file in [&mut config.ipv4_file, &mut config.ipv6_file]
        .into_iter()
        .flatten()
    {
        if record_file.is_relative() {
            *record_file = dir.join(&*record_file);
        }
    }

    log_config_summary(&config);
    Ok(config)
}

/// Loads the server configuration from the parsed command line
/// arguments given by `args`.
pub fn load_from_args(args: RunArgs) -> Config {
    let config = Config {
        host: args.host.unwrap_or_else(default_host),
        port: args.port.unwrap_or_else(default_port),
        ipv4_file: args.ipv4_file,
        ipv6_file: args.ipv6_file,
        cache_size: args.cache_size.unwrap_or_else(default_cache_size),
        io: IoConfig {
            udp_workers: args.udp_workers.unwrap_or_else(default_udp_workers),
        },
    };
    log_config_summary(&config);
    config
}

/// Summarizes the configuration in the log, if the debug log level is
/// enabled.
fn log_config_summary(config: &Config) {
    if !log_enabled!(Debug) {
        // Don't compute the message if it will never be printed.
        return;
    }

    debug!(
        "Configuration loaded:\n\
         Bind address: {}\n\
         UDP workers:  {}\n\
         Cache size:   {}\n\
         IPv4 records: {}\n\
         IPv6 records: {}",
        config.bind(),
        config.io.udp_workers,
        config.cache_size,
        describe_path(config.ipv4_file.as_deref()),
        describe_path(config.ipv6_file.as_deref()),
    );
}

fn describe_path(path: Option<&Path>) -> String {
    match path {
        Some(path) => path.display().to_string(),
        None => "none to load".to_owned(),
    }
}

////////////////////////////////////////////////////////////////////////
// CONFIGURATION FILE STRUCTURE                                       //
////////////////////////////////////////////////////////////////////////

/// The complete configuration file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
    pub ipv4_file: Option<PathBuf>,
    pub ipv6_file: Option<PathBuf>,
    #[serde(default = "default_cache_size")]
    pub cache_size: usize,
    #[serde(default)]
    pub io: IoConfig,
}

impl Config {
    /// Returns the address the server binds to.
    pub fn bind(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::LOCALHOST)
}

fn default_port() -> u16 {
    8080
}

fn default_cache_size() -> usize {
    DEFAULT_CAPACITY
}

////////////////////////////////////////////////////////////////////////
// CONFIGURATION SECTION: I/O                                         //
////////////////////////////////////////////////////////////////////////

/// Configuration for the
/// [`BlockingIoProvider`](namedir::io::BlockingIoProvider). This mirrors
/// [`BlockingIoConfig`] and can be converted into one; its purpose is
/// basically to make the configuration deserializable and to provide
/// defaults.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IoConfig {
    #[serde(default = "default_udp_workers")]
    pub udp_workers: NonZeroUsize,
}

fn default_udp_workers() -> NonZeroUsize {
    BlockingIoConfig::default().udp_workers
}

impl Default for IoConfig {
    fn default() -> Self {
        Self {
            udp_workers: default_udp_workers(),
        }
    }
}

impl From<&IoConfig> for BlockingIoConfig {
    fn from(toml_config: &IoConfig) -> Self {
        Self {
            udp_workers: toml_config.udp_workers,
        }
    }
}
