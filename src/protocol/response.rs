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

//! Formatting of response text.
//!
//! These shapes are what existing clients parse, so they must not
//! change:
//!
//! * `Records for <domain>: <a1>, <a2>` (prefixed with `Cache Hit: `
//!   when served from the cache), or `Domain <domain> not found.`
//! * `Domain: <domain>`, `IPv4: <list|None>`, `IPv6: <list|None>`, each
//!   line newline-terminated, for `QUERY_BOTH`.
//! * One `<domain>: <a1>, <a2>` line per populated domain for
//!   `GET_ALL_*`, or `No records found.`

use std::fmt::Write;

use super::ParseError;
use crate::directory::QueryOutcome;
use crate::family::Family;
use crate::tree::{DomainTree, RemoveError, Removed};

/// The response to a request with an unknown verb.
pub const INVALID_COMMAND: &str = "Invalid command.";

/// The response to `GET_ALL_*` on a tree with no records.
pub const NO_RECORDS: &str = "No records found.";

const ADDRESS_SEPARATOR: &str = ", ";

/// Formats the response to a single-family query.
pub fn query(domain: &str, outcome: &QueryOutcome) -> String {
    match outcome {
        QueryOutcome::CacheHit(addresses) => format!(
            "Cache Hit: Records for {}: {}",
            domain,
            addresses.join(ADDRESS_SEPARATOR)
        ),
        QueryOutcome::Found(addresses) => format!(
            "Records for {}: {}",
            domain,
            addresses.join(ADDRESS_SEPARATOR)
        ),
        QueryOutcome::NotFound => not_found(domain),
    }
}

/// Formats the response to `QUERY_BOTH`. Whether an address list came
/// from the cache is not shown.
pub fn combined(domain: &str, ipv4: &QueryOutcome, ipv6: &QueryOutcome) -> String {
    let mut response = format!("Domain: {domain}\n");
    for (family, outcome) in Family::ALL.into_iter().zip([ipv4, ipv6]) {
        let list = match outcome.addresses() {
            Some(addresses) => addresses.join(ADDRESS_SEPARATOR),
            None => "None".to_owned(),
        };
        writeln!(response, "{family}: {list}").unwrap();
    }
    response
}

/// Formats the full listing of a tree.
pub fn listing(tree: &DomainTree) -> String {
    let lines: Vec<String> = tree
        .iter()
        .map(|(domain, records)| format!("{}: {}", domain, records.join(ADDRESS_SEPARATOR)))
        .collect();
    if lines.is_empty() {
        NO_RECORDS.to_owned()
    } else {
        lines.join("\n")
    }
}

/// Formats the confirmation of an insertion.
pub fn inserted(domain: &str, address: &str) -> String {
    format!("Inserted: {domain} -> {address}")
}

/// Formats the result of a removal.
pub fn removed(domain: &str, address: Option<&str>, result: Result<Removed, RemoveError>) -> String {
    match (result, address) {
        (Ok(Removed::All), _) | (Ok(Removed::One), None) => {
            format!("Removed all records for {domain}")
        }
        (Ok(Removed::One), Some(address)) => format!("Removed {address} from {domain}"),
        (Err(RemoveError::AddressNotFound), Some(address)) => {
            format!("IP {address} not found for domain {domain}")
        }
        (Err(_), _) => not_found(domain),
    }
}

/// Formats the response to a request with the wrong number of
/// arguments.
pub fn malformed(error: &ParseError) -> String {
    format!("Error: {error}")
}

fn not_found(domain: &str) -> String {
    format!("Domain {domain} not found.")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addrs(list: &[&str]) -> Vec<String> {
        list.iter().map(|a| a.to_string()).collect()
    }

    #[test]
    fn query_responses_distinguish_cache_hits() {
        let list = addrs(&["1.1.1.1", "2.2.2.2"]);
        assert_eq!(
            query("a.com", &QueryOutcome::Found(list.clone())),
            "Records for a.com: 1.1.1.1, 2.2.2.2"
        );
        assert_eq!(
            query("a.com", &QueryOutcome::CacheHit(list)),
            "Cache Hit: Records for a.com: 1.1.1.1, 2.2.2.2"
        );
        assert_eq!(query("a.com", &QueryOutcome::NotFound), "Domain a.com not found.");
    }

    #[test]
    fn combined_response_marks_missing_family_as_none() {
        let response = combined(
            "a.com",
            &QueryOutcome::CacheHit(addrs(&["10.0.0.1"])),
            &QueryOutcome::NotFound,
        );
        assert_eq!(response, "Domain: a.com\nIPv4: 10.0.0.1\nIPv6: None\n");
    }

    #[test]
    fn listing_of_empty_tree() {
        assert_eq!(listing(&DomainTree::new()), NO_RECORDS);
    }

    #[test]
    fn listing_has_one_line_per_domain() {
        let mut tree = DomainTree::new();
        tree.insert("a.com", "10.0.0.1");
        tree.insert("a.com", "10.0.0.3");
        tree.insert("b.a.com", "10.0.0.2");
        let listing = listing(&tree);
        let mut lines: Vec<&str> = listing.lines().collect();
        lines.sort_unstable();
        assert_eq!(lines, ["a.com: 10.0.0.1, 10.0.0.3", "b.a.com: 10.0.0.2"]);
    }

    #[test]
    fn removal_messages() {
        assert_eq!(
            removed("a.com", None, Ok(Removed::All)),
            "Removed all records for a.com"
        );
        assert_eq!(
            removed("a.com", Some("1.1.1.1"), Ok(Removed::One)),
            "Removed 1.1.1.1 from a.com"
        );
        assert_eq!(
            removed("a.com", Some("1.1.1.1"), Err(RemoveError::AddressNotFound)),
            "IP 1.1.1.1 not found for domain a.com"
        );
        assert_eq!(
            removed("a.com", Some("1.1.1.1"), Err(RemoveError::DomainNotFound)),
            "Domain a.com not found."
        );
    }
}
