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

//! Implementation of the [`Family`] type for address families.

use std::fmt;
use std::str::FromStr;

/// An address family. The server keeps a separate tree and cache for
/// each one.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Family {
    Ipv4,
    Ipv6,
}

impl Family {
    /// Both families, in the order they appear in combined responses.
    pub const ALL: [Self; 2] = [Self::Ipv4, Self::Ipv6];

    /// Returns the DNS record type that conventionally holds addresses
    /// of this family (`A` or `AAAA`).
    pub fn record_type(self) -> &'static str {
        match self {
            Self::Ipv4 => "A",
            Self::Ipv6 => "AAAA",
        }
    }

    /// Returns the suffix used by protocol verbs for this family, e.g.
    /// the `IPV4` in `QUERY_IPV4`.
    pub fn verb_suffix(self) -> &'static str {
        match self {
            Self::Ipv4 => "IPV4",
            Self::Ipv6 => "IPV6",
        }
    }
}

impl FromStr for Family {
    type Err = &'static str;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        if text.eq_ignore_ascii_case("ipv4") || text.eq_ignore_ascii_case("A") {
            Ok(Self::Ipv4)
        } else if text.eq_ignore_ascii_case("ipv6") || text.eq_ignore_ascii_case("AAAA") {
            Ok(Self::Ipv6)
        } else {
            Err("unknown address family")
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Self::Ipv4 => f.write_str("IPv4"),
            Self::Ipv6 => f.write_str("IPv6"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Family;

    #[test]
    fn parses_names_and_record_types() {
        assert_eq!("IPv4".parse(), Ok(Family::Ipv4));
        assert_eq!("aaaa".parse(), Ok(Family::Ipv6));
        assert!("ipv5".parse::<Family>().is_err());
    }

    #[test]
    fn displays_as_used_in_combined_responses() {
        assert_eq!(Family::Ipv4.to_string(), "IPv4");
        assert_eq!(Family::Ipv6.to_string(), "IPv6");
    }
}
