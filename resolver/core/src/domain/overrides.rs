// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Override Table
//!
//! Caller-supplied certificate assignments that take precedence over the store's
//! own choice. Entries are keyed by a protocol hint and a normalized address.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::address::{Address, AddressError};
use super::certificate::Protocol;

/// Which slot an override feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverrideProtocolHint {
    OpenPgp,
    Cms,
    /// Protocol is taken from each looked-up certificate; feeds the common slot.
    FromCertificate,
}

impl OverrideProtocolHint {
    /// The concrete protocol, if the hint names one.
    pub fn protocol(self) -> Option<Protocol> {
        match self {
            OverrideProtocolHint::OpenPgp => Some(Protocol::OpenPgp),
            OverrideProtocolHint::Cms => Some(Protocol::Cms),
            OverrideProtocolHint::FromCertificate => None,
        }
    }
}

impl From<Protocol> for OverrideProtocolHint {
    fn from(protocol: Protocol) -> Self {
        match protocol {
            Protocol::OpenPgp => OverrideProtocolHint::OpenPgp,
            Protocol::Cms => OverrideProtocolHint::Cms,
        }
    }
}

impl fmt::Display for OverrideProtocolHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.protocol() {
            Some(protocol) => write!(f, "{}", protocol),
            None => f.write_str("any protocol"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverrideTable {
    entries: BTreeMap<OverrideProtocolHint, BTreeMap<Address, Vec<String>>>,
}

impl OverrideTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces any previous identifiers for `(hint, address)`.
    pub fn insert<I, S>(
        &mut self,
        hint: OverrideProtocolHint,
        address: &str,
        identifiers: I,
    ) -> Result<(), AddressError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let address = Address::parse(address)?;
        let identifiers = identifiers.into_iter().map(Into::into).collect();
        self.entries.entry(hint).or_default().insert(address, identifiers);
        Ok(())
    }

    /// Merges `other` into this table; entries of `other` win.
    pub fn extend(&mut self, other: OverrideTable) {
        for (hint, by_address) in other.entries {
            self.entries.entry(hint).or_default().extend(by_address);
        }
    }

    pub fn get(&self, hint: OverrideProtocolHint, address: &Address) -> Option<&[String]> {
        self.entries
            .get(&hint)
            .and_then(|by_address| by_address.get(address))
            .map(Vec::as_slice)
    }

    /// Entries for one hint, sorted by address.
    pub fn entries_for(
        &self,
        hint: OverrideProtocolHint,
    ) -> impl Iterator<Item = (&Address, &[String])> + '_ {
        self.entries
            .get(&hint)
            .into_iter()
            .flat_map(|by_address| by_address.iter().map(|(a, ids)| (a, ids.as_slice())))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.values().all(BTreeMap::is_empty)
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(BTreeMap::len).sum()
    }
}
