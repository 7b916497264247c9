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

//! Bulk loading of records from text files.
//!
//! A record file holds one `domain address` pair per line, separated by
//! whitespace. Blank lines are skipped. Any other line that does not
//! consist of exactly two fields is logged and skipped; a bad line never
//! stops the load.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use log::{info, warn};

use crate::tree::DomainTree;

/// Counts of what happened during a load.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct LoadSummary {
    pub loaded: usize,
    pub skipped: usize,
}

/// Loads records from the file at `path` into `tree`. Only failing to
/// open or read the file is an error.
pub fn load_file(path: impl AsRef<Path>, tree: &mut DomainTree) -> io::Result<LoadSummary> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let summary = load_records(BufReader::new(file), tree, &path.display().to_string())?;
    info!(
        "Loaded {} records from {} ({} skipped).",
        summary.loaded,
        path.display(),
        summary.skipped,
    );
    Ok(summary)
}

/// Loads records from `reader` into `tree`. `source` names the input in
/// log messages.
pub fn load_records<R: BufRead>(
    reader: R,
    tree: &mut DomainTree,
    source: &str,
) -> io::Result<LoadSummary> {
    let mut summary = LoadSummary::default();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match parse_line(line) {
            Some((domain, address)) => {
                tree.insert(domain, address);
                summary.loaded += 1;
            }
            None => {
                warn!(
                    "Skipping invalid line {} in {}: {}",
                    index + 1,
                    source,
                    line
                );
                summary.skipped += 1;
            }
        }
    }
    Ok(summary)
}

/// Splits a line into its domain and address, if it has exactly two
/// fields.
fn parse_line(line: &str) -> Option<(&str, &str)> {
    let mut fields = line.split_whitespace();
    match (fields.next(), fields.next(), fields.next()) {
        (Some(domain), Some(address), None) => Some((domain, address)),
        _ => None,
    }
}
