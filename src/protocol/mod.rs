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

//! The request grammar of the directory protocol.
//!
//! Each request is a single line of text: a verb followed by
//! whitespace-separated arguments. Verbs are matched
//! ASCII-case-insensitively; arguments are taken as-is.
//!
//! | Verb | Arguments |
//! |------|-----------|
//! | `QUERY_IPV4`, `QUERY_IPV6`, `QUERY_BOTH` | `domain` |
//! | `INSERT_IPV4`, `INSERT_IPV6` | `domain address` |
//! | `REMOVE_IPV4`, `REMOVE_IPV6` | `domain [address]` |
//! | `GET_ALL_IPV4`, `GET_ALL_IPV6` | none |
//!
//! An unknown verb is not an error; it parses to
//! [`Request::Invalid`], which the server answers like any other
//! request. Only a known verb with the wrong number of arguments is a
//! [`ParseError`].

use std::fmt;
use std::str::FromStr;

use crate::family::Family;

pub mod response;

/// A parsed request.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Request<'a> {
    Query {
        family: Family,
        domain: &'a str,
    },
    QueryBoth {
        domain: &'a str,
    },
    Insert {
        family: Family,
        domain: &'a str,
        address: &'a str,
    },
    Remove {
        family: Family,
        domain: &'a str,
        address: Option<&'a str>,
    },
    GetAll {
        family: Family,
    },
    Invalid,
}

/// The verbs of the protocol.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Verb {
    Query(Family),
    QueryBoth,
    Insert(Family),
    Remove(Family),
    GetAll(Family),
}

impl Verb {
    /// Returns a usage line for the verb, as shown in error responses.
    pub fn usage(self) -> String {
        match self {
            Self::Query(_) | Self::QueryBoth => format!("{self} domain"),
            Self::Insert(_) => format!("{self} domain ip"),
            Self::Remove(_) => format!("{self} domain [ip]"),
            Self::GetAll(_) => self.to_string(),
        }
    }

    /// Builds a [`Request`] for this verb from its arguments.
    fn build<'a>(self, args: &[&'a str]) -> Result<Request<'a>, ParseError> {
        let malformed = Err(ParseError { verb: self });
        match (self, args) {
            (Self::Query(family), &[domain]) => Ok(Request::Query { family, domain }),
            (Self::QueryBoth, &[domain]) => Ok(Request::QueryBoth { domain }),
            (Self::Insert(family), &[domain, address]) => Ok(Request::Insert {
                family,
                domain,
                address,
            }),
            (Self::Remove(family), &[domain]) => Ok(Request::Remove {
                family,
                domain,
                address: None,
            }),
            (Self::Remove(family), &[domain, address]) => Ok(Request::Remove {
                family,
                domain,
                address: Some(address),
            }),
            (Self::GetAll(family), &[]) => Ok(Request::GetAll { family }),
            _ => malformed,
        }
    }
}

impl FromStr for Verb {
    type Err = ();

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        if text.eq_ignore_ascii_case("QUERY_BOTH") {
            return Ok(Self::QueryBoth);
        }
        let (action, suffix) = text.rsplit_once('_').ok_or(())?;
        let family = Family::ALL
            .into_iter()
            .find(|f| suffix.eq_ignore_ascii_case(f.verb_suffix()))
            .ok_or(())?;
        if action.eq_ignore_ascii_case("QUERY") {
            Ok(Self::Query(family))
        } else if action.eq_ignore_ascii_case("INSERT") {
            Ok(Self::Insert(family))
        } else if action.eq_ignore_ascii_case("REMOVE") {
            Ok(Self::Remove(family))
        } else if action.eq_ignore_ascii_case("GET_ALL") {
            Ok(Self::GetAll(family))
        } else {
            Err(())
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Self::Query(family) => write!(f, "QUERY_{}", family.verb_suffix()),
            Self::QueryBoth => f.write_str("QUERY_BOTH"),
            Self::Insert(family) => write!(f, "INSERT_{}", family.verb_suffix()),
            Self::Remove(family) => write!(f, "REMOVE_{}", family.verb_suffix()),
            Self::GetAll(family) => write!(f, "GET_ALL_{}", family.verb_suffix()),
        }
    }
}

/// Parses a request line. Leading and trailing whitespace is ignored.
pub fn parse(line: &str) -> Result<Request, ParseError> {
    let mut words = line.split_whitespace();
    let verb = match words.next().map(str::parse::<Verb>) {
        Some(Ok(verb)) => verb,
        _ => return Ok(Request::Invalid),
    };
    let args: Vec<&str> = words.collect();
    verb.build(&args)
}

/// The error returned when a known verb is given the wrong number of
/// arguments.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ParseError {
    verb: Verb,
}

impl ParseError {
    pub fn verb(&self) -> Verb {
        self.verb
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "malformed {} request; usage: {}",
            self.verb,
            self.verb.usage()
        )
    }
}

impl std::error::Error for ParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbs_are_case_insensitive() {
        assert_eq!(
            parse("query_ipv6 example.com"),
            Ok(Request::Query {
                family: Family::Ipv6,
                domain: "example.com",
            })
        );
        assert_eq!(
            parse("Get_All_IPv4"),
            Ok(Request::GetAll {
                family: Family::Ipv4
            })
        );
    }

    #[test]
    fn arguments_keep_their_case() {
        assert_eq!(
            parse("INSERT_IPV4 Example.COM 10.0.0.1"),
            Ok(Request::Insert {
                family: Family::Ipv4,
                domain: "Example.COM",
                address: "10.0.0.1",
            })
        );
    }

    #[test]
    fn remove_takes_an_optional_address() {
        assert_eq!(
            parse("REMOVE_IPV6 example.com"),
            Ok(Request::Remove {
                family: Family::Ipv6,
                domain: "example.com",
                address: None,
            })
        );
        assert_eq!(
            parse("REMOVE_IPV6 example.com ::1"),
            Ok(Request::Remove {
                family: Family::Ipv6,
                domain: "example.com",
                address: Some("::1"),
            })
        );
    }

    #[test]
    fn unknown_verbs_and_empty_lines_are_invalid_requests() {
        assert_eq!(parse("LOOKUP example.com"), Ok(Request::Invalid));
        assert_eq!(parse("QUERY_IPV5 example.com"), Ok(Request::Invalid));
        assert_eq!(parse("   "), Ok(Request::Invalid));
    }

    #[test]
    fn wrong_argument_counts_are_parse_errors() {
        for line in [
            "INSERT_IPV4 example.com",
            "INSERT_IPV4 example.com 1.1.1.1 2.2.2.2",
            "QUERY_BOTH",
            "REMOVE_IPV4",
            "GET_ALL_IPV6 example.com",
        ] {
            assert!(parse(line).is_err(), "{line:?} should not parse");
        }
    }

    #[test]
    fn parse_error_displays_usage() {
        let error = parse("insert_ipv6 example.com").unwrap_err();
        assert_eq!(error.verb(), Verb::Insert(Family::Ipv6));
        assert_eq!(
            error.to_string(),
            "malformed INSERT_IPV6 request; usage: INSERT_IPV6 domain ip"
        );
    }
}
