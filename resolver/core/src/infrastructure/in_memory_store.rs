// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # In-Memory Certificate Store
//!
//! [`CertificateStore`] backed by a map of certificates and an optional list of
//! groups (one address standing for several certificates). Used by the CLI, which
//! loads a [`Keyring`] from YAML, and by tests.
//!
//! ## Keyring format
//!
//! ```yaml
//! certificates:
//!   - fingerprint: 1BA323932B3FAA826132C79E8D9860C58F246DE6
//!     protocol: openpgp
//!     user_ids:
//!       - address: "Alice <alice@example.net>"
//!         validity: ultimate
//!     can_sign: true
//!     can_encrypt: true
//!     has_secret: true
//! groups:
//!   - address: team@example.net
//!     protocol: openpgp
//!     fingerprints: [1BA323932B3FAA826132C79E8D9860C58F246DE6]
//! ```

use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use anyhow::Context;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::domain::address::Address;
use crate::domain::certificate::{Certificate, Protocol};
use crate::domain::predicates::validity_for;
use crate::domain::store::{CertificateStore, StoreError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupDefinition {
    pub address: Address,
    pub protocol: Protocol,
    pub fingerprints: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keyring {
    #[serde(default)]
    pub certificates: Vec<Certificate>,
    #[serde(default)]
    pub groups: Vec<GroupDefinition>,
}

impl Keyring {
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        let keyring = serde_yaml::from_str(yaml)?;
        Ok(keyring)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read keyring {:?}", path))?;
        Self::from_yaml_str(&content).with_context(|| format!("Failed to parse keyring {:?}", path))
    }
}

#[derive(Default)]
struct Contents {
    /// Keyed by upper-case fingerprint.
    certificates: BTreeMap<String, Certificate>,
    groups: HashMap<(Address, Protocol), Vec<String>>,
}

#[derive(Default)]
pub struct InMemoryCertificateStore {
    contents: RwLock<Contents>,
}

impl InMemoryCertificateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from a keyring; every group member must be one of its
    /// certificates.
    pub fn from_keyring(keyring: Keyring) -> Result<Self, StoreError> {
        let store = Self::new();
        for cert in keyring.certificates {
            store.insert(cert);
        }
        for group in keyring.groups {
            store.insert_group(&group.address, group.protocol, group.fingerprints)?;
        }
        Ok(store)
    }

    /// Adds a certificate, replacing one with the same fingerprint.
    pub fn insert(&self, mut cert: Certificate) {
        cert.fingerprint = cert.fingerprint.to_uppercase();
        self.contents
            .write()
            .certificates
            .insert(cert.fingerprint.clone(), cert);
    }

    /// Makes `address` resolve to all of `fingerprints` for `protocol`.
    pub fn insert_group<I, S>(
        &self,
        address: &Address,
        protocol: Protocol,
        fingerprints: I,
    ) -> Result<(), StoreError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut contents = self.contents.write();
        let mut members = Vec::new();
        for fingerprint in fingerprints {
            let fingerprint = fingerprint.as_ref().to_uppercase();
            match contents.certificates.get(&fingerprint) {
                Some(cert) if cert.protocol == protocol => members.push(fingerprint),
                Some(_) => {
                    return Err(StoreError::InvalidIdentifier(format!(
                        "{} is not a {} certificate",
                        fingerprint, protocol
                    )))
                }
                None => {
                    return Err(StoreError::InvalidIdentifier(format!(
                        "unknown group member {}",
                        fingerprint
                    )))
                }
            }
        }
        contents.groups.insert((address.clone(), protocol), members);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.contents.read().certificates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn is_hex_identifier(identifier: &str) -> bool {
    let identifier = identifier
        .strip_prefix("0x")
        .or_else(|| identifier.strip_prefix("0X"))
        .unwrap_or(identifier);
    !identifier.is_empty() && identifier.chars().all(|c| c.is_ascii_hexdigit())
}

impl CertificateStore for InMemoryCertificateStore {
    fn find_best_candidates(
        &self,
        address: &Address,
        protocol: Protocol,
        require_secret: bool,
        for_encryption: bool,
    ) -> Result<Vec<Certificate>, StoreError> {
        let contents = self.contents.read();

        if for_encryption {
            if let Some(members) = contents.groups.get(&(address.clone(), protocol)) {
                return Ok(members
                    .iter()
                    .filter_map(|fingerprint| contents.certificates.get(fingerprint).cloned())
                    .collect());
            }
        }

        let best = contents
            .certificates
            .values()
            .filter(|cert| cert.protocol == protocol && cert.user_id_for(address).is_some())
            .filter(|cert| !require_secret || (cert.can_sign && cert.has_secret))
            .filter(|cert| !for_encryption || cert.can_encrypt)
            .min_by_key(|cert| {
                let unusable = cert.revoked || cert.expired || cert.disabled;
                (unusable, Reverse(validity_for(cert, address)))
            });
        Ok(best.cloned().into_iter().collect())
    }

    fn find_by_identifier(&self, identifier: &str) -> Result<Option<Certificate>, StoreError> {
        let identifier = identifier.trim();
        if !is_hex_identifier(identifier) {
            return Err(StoreError::InvalidIdentifier(identifier.to_string()));
        }
        Ok(self
            .contents
            .read()
            .certificates
            .values()
            .find(|cert| cert.matches_identifier(identifier))
            .cloned())
    }
}
