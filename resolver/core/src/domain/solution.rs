// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Resolution Results
//!
//! What a resolution hands back to the caller: a primary [`Solution`], an optional
//! alternative, and enough bookkeeping to explain what is missing.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::address::Address;
use super::certificate::{Certificate, Protocol};

/// Protocol a solution is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolvedProtocol {
    OpenPgp,
    Cms,
    /// Recipients may use different protocols.
    Mixed,
}

impl From<Protocol> for ResolvedProtocol {
    fn from(protocol: Protocol) -> Self {
        match protocol {
            Protocol::OpenPgp => ResolvedProtocol::OpenPgp,
            Protocol::Cms => ResolvedProtocol::Cms,
        }
    }
}

impl fmt::Display for ResolvedProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolvedProtocol::OpenPgp => f.write_str("OpenPGP"),
            ResolvedProtocol::Cms => f.write_str("S/MIME"),
            ResolvedProtocol::Mixed => f.write_str("mixed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Solution {
    pub protocol: ResolvedProtocol,
    pub signing_certificates: Vec<Certificate>,
    /// Every recipient has an entry; an empty list means unresolved.
    pub encryption_certificates: BTreeMap<Address, Vec<Certificate>>,
}

impl Solution {
    pub fn empty(protocol: ResolvedProtocol) -> Self {
        Self {
            protocol,
            signing_certificates: Vec::new(),
            encryption_certificates: BTreeMap::new(),
        }
    }

    /// Recipients without any certificate.
    pub fn unresolved_addresses(&self) -> Vec<Address> {
        self.encryption_certificates
            .iter()
            .filter(|(_, certs)| certs.is_empty())
            .map(|(address, _)| address.clone())
            .collect()
    }

    pub fn certificates(&self) -> impl Iterator<Item = &Certificate> + '_ {
        self.signing_certificates
            .iter()
            .chain(self.encryption_certificates.values().flatten())
    }

    /// Which protocols the certificates of this solution actually use.
    pub fn usage(&self) -> ProtocolUsage {
        let uses = |protocol: Protocol| self.certificates().any(|cert| cert.protocol == protocol);
        match (uses(Protocol::OpenPgp), uses(Protocol::Cms)) {
            (true, true) => ProtocolUsage::Mixed,
            (false, true) => ProtocolUsage::CmsOnly,
            (true, false) => ProtocolUsage::OpenPgpOnly,
            (false, false) => match self.protocol {
                ResolvedProtocol::Cms => ProtocolUsage::CmsOnly,
                _ => ProtocolUsage::OpenPgpOnly,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProtocolUsage {
    OpenPgpOnly,
    CmsOnly,
    Mixed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionStatus {
    FullyResolved,
    /// The caller (or its user) has to pick certificates.
    NeedsDisambiguation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub status: ResolutionStatus,
    pub usage: ProtocolUsage,
    pub solution: Solution,
    pub alternative: Option<Solution>,
    /// Per-protocol recipients the store could not serve.
    pub unresolved: BTreeMap<Protocol, Vec<Address>>,
    /// Signing was requested and a signing certificate the solution needs is missing.
    pub missing_signing: bool,
}

impl Resolution {
    pub fn is_fully_resolved(&self) -> bool {
        self.status == ResolutionStatus::FullyResolved
    }

    pub fn needs_disambiguation(&self) -> bool {
        self.status == ResolutionStatus::NeedsDisambiguation
    }

    pub fn unresolved_recipients(&self, protocol: Protocol) -> &[Address] {
        self.unresolved.get(&protocol).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn unresolved_addresses(&self) -> Vec<Address> {
        self.solution.unresolved_addresses()
    }

    pub fn missing_signing(&self) -> bool {
        self.missing_signing
    }
}
