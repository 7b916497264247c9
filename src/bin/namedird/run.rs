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

//! Implements the `run` command (i.e., running the server).

use std::fmt::Write;
use std::path::Path;
use std::process;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use anyhow::{Context, Result};
use env_logger::Env;
use log::{error, info};
use signal_hook::consts::signal::{SIGINT, SIGTERM};
use signal_hook::iterator::Signals;

use namedir::directory::Directory;
use namedir::family::Family;
use namedir::io::BlockingIoProvider;
use namedir::load;
use namedir::thread::WorkerGroup;
use namedir::tree::DomainTree;
use namedir::Server;

use crate::args::RunArgs;
use crate::config::{self, Config};

/// Runs the server.
pub fn run(args: RunArgs) {
    env_logger::init_from_env(Env::new().default_filter_or("info"));

    if let Err(e) = try_running(args) {
        let mut message = String::from("Failed to run:");
        for (i, cause) in e.chain().enumerate() {
            write!(message, "\n[{}] {}", i + 1, cause).unwrap();
        }
        message.push_str("\nExiting with failure.");
        error!("{}", message);
        process::exit(1);
    }
    info!("Exiting with success.");
}

fn try_running(run_args: RunArgs) -> Result<()> {
    info!(
        "namedir daemon v{}.{}.{} starting.",
        env!("CARGO_PKG_VERSION_MAJOR"),
        env!("CARGO_PKG_VERSION_MINOR"),
        env!("CARGO_PKG_VERSION_PATCH"),
    );

    // Get the configuration, either from the file system or from the
    // command line arguments, as appropriate.
    let config = if let Some(ref config_path) = run_args.config {
        info!("Loading the configuration from {}.", config_path.display());
        config::load_from_path(config_path).context("failed to load the configuration")?
    } else {
        info!("Loading the configuration from the command line.");
        config::load_from_args(run_args)
    };

    // Bind before loading records: loading may take a while, so it's
    // better to fail fast.
    let io_provider = BlockingIoProvider::bind((&config.io).into(), config.bind())
        .context("failed to bind the UDP socket")?;

    let server = Arc::new(load_server(&config)?);

    // Set up signal handling.
    let mut signals = set_up_signal_handling().context("failed to set up signal handling")?;

    info!(
        "Set-up is complete; directory server started on {}.",
        config.bind()
    );
    let workers = WorkerGroup::new();
    io_provider
        .start(&server, &workers)
        .context("failed to start the I/O provider")?;

    // Wait for a termination signal.
    if let Some(signal) = signals.forever().next() {
        let name = match signal {
            SIGINT => "SIGINT",
            SIGTERM => "SIGTERM",
            _ => unreachable!(),
        };
        info!("Received {}; shutting down.", name);
    }

    workers.shut_down();
    workers.join();
    info!("Shutdown complete.");
    Ok(())
}

/// Creates the [`Server`], loading each family's records file if one is
/// configured.
fn load_server(config: &Config) -> Result<Server> {
    let ipv4 = load_directory(Family::Ipv4, config.ipv4_file.as_deref(), config.cache_size)?;
    let ipv6 = load_directory(Family::Ipv6, config.ipv6_file.as_deref(), config.cache_size)?;
    info!("Domain data loaded successfully.");
    Ok(Server::with_directories(ipv4, ipv6))
}

fn load_directory(family: Family, path: Option<&Path>, cache_size: usize) -> Result<Directory> {
    let mut tree = DomainTree::new();
    if let Some(path) = path {
        info!("Loading domains from {} for {}.", path.display(), family);
        load::load_file(path, &mut tree)
            .with_context(|| format!("failed to load {} records from {}", family, path.display()))?;
    }
    Ok(Directory::with_tree(family, tree, cache_size))
}

fn set_up_signal_handling() -> Result<Signals> {
    let term_signals = &[SIGINT, SIGTERM];
    let already_terminating = Arc::new(AtomicBool::new(false));

    // This sets up signal handlers to exit immediately if a second
    // termination signal arrives before the process finishes shutting
    // down gracefully.
    for sig in term_signals {
        signal_hook::flag::register_conditional_shutdown(*sig, 1, already_terminating.clone())?;
        signal_hook::flag::register(*sig, already_terminating.clone())?;
    }

    Signals::new(term_signals).map_err(Into::into)
}
