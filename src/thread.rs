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

//! The group of worker threads serving the UDP socket.
//!
//! A [`WorkerGroup`] is a shutdown flag plus the join handles of the
//! threads started on it. Workers are never interrupted: each one polls
//! [`WorkerGroup::is_shutting_down`] between receives and returns once
//! it is set. The daemon's main thread then [joins](WorkerGroup::join)
//! them.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use log::{debug, error};

/// Worker threads started together and shut down together.
#[derive(Debug, Default)]
pub struct WorkerGroup {
    shutting_down: AtomicBool,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl WorkerGroup {
    /// Creates a new group with no workers.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Starts a worker thread named `name` that runs `task`. Once shutdown
    /// has begun, no worker is started and this returns `Ok(false)`.
    pub fn spawn<F>(&self, name: String, task: F) -> io::Result<bool>
    where
        F: FnOnce() + Send + 'static,
    {
        let mut workers = self.workers.lock().unwrap();
        if self.is_shutting_down() {
            return Ok(false);
        }
        let handle = thread::Builder::new().name(name).spawn(task)?;
        workers.push(handle);
        Ok(true)
    }

    /// Asks every worker to stop after its current request.
    pub fn shut_down(&self) {
        self.shutting_down.store(true, Ordering::Release);
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutting_down.load(Ordering::Acquire)
    }

    /// Waits for every worker started so far to exit. A worker that
    /// panicked is logged, not propagated. Calling this from a worker
    /// deadlocks.
    pub fn join(&self) {
        let workers: Vec<_> = self.workers.lock().unwrap().drain(..).collect();
        for handle in workers {
            let name = handle.thread().name().unwrap_or("worker").to_owned();
            match handle.join() {
                Ok(()) => debug!("{} exited", name),
                Err(_) => error!("{} panicked", name),
            }
        }
    }

    /// Returns the number of workers not yet joined.
    pub fn len(&self) -> usize {
        self.workers.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
