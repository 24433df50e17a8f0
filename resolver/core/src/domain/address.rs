// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Mail Address Value Object
//!
//! Every address the resolver works with (sender, recipients, override keys, user ids)
//! goes through [`Address::parse`], so comparisons are always made on the normalized
//! addr-spec. A mailbox such as `"Alice <Alice@Example.net>"` and the bare
//! `alice@example.net` normalize to the same `Address`.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

static ADDR_SPEC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@<>,;]+@[^\s@<>,;]+$").expect("addr-spec pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("The mail address for '{0}' could not be extracted")]
    Unparseable(String),
}

/// Normalized (lowercase) addr-spec.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    /// Extract and normalize the addr-spec from a bare address or a
    /// `Display Name <local@domain>` mailbox.
    pub fn parse(input: &str) -> Result<Self, AddressError> {
        let candidate = match (input.rfind('<'), input.rfind('>')) {
            (Some(open), Some(close)) if open < close => &input[open + 1..close],
            (None, None) => input,
            _ => return Err(AddressError::Unparseable(input.to_string())),
        };
        let candidate = candidate.trim();
        if !ADDR_SPEC.is_match(candidate) {
            return Err(AddressError::Unparseable(input.to_string()));
        }
        Ok(Self(candidate.to_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Address {
    type Error = AddressError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.0
    }
}

impl std::str::FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_address_is_lowercased() {
        let address = Address::parse("Alice@Example.NET").unwrap();
        assert_eq!(address.as_str(), "alice@example.net");
    }

    #[test]
    fn test_mailbox_form_is_extracted() {
        let address = Address::parse("Needs to be normalized <full-validity@example.net>").unwrap();
        assert_eq!(address.as_str(), "full-validity@example.net");

        let quoted = Address::parse("\"Doe, John\" < john@example.org >").unwrap();
        assert_eq!(quoted.as_str(), "john@example.org");
    }

    #[test]
    fn test_invalid_addresses_are_rejected() {
        for input in ["", "no-at-sign", "two@@example.net", "a b@example.net", "@example.net", "alice@", "Alice <alice@example.net", "<>"] {
            assert!(
                matches!(Address::parse(input), Err(AddressError::Unparseable(_))),
                "{input:?} should not parse"
            );
        }
    }

    #[test]
    fn test_serde_round_trip_normalizes() {
        let address: Address = serde_json::from_str("\"Bob <BOB@example.net>\"").unwrap();
        assert_eq!(address.as_str(), "bob@example.net");
        assert_eq!(serde_json::to_string(&address).unwrap(), "\"bob@example.net\"");
        assert!(serde_json::from_str::<Address>("\"not an address\"").is_err());
    }
}
