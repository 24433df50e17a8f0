// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Certificate Domain Types
//!
//! Certificates are owned by the certificate store; the resolver only reads the
//! attributes modelled here. Two incompatible ecosystems coexist:
//!
//! | Protocol | Ecosystem |
//! |----------|-----------|
//! | [`Protocol::OpenPgp`] | OpenPGP keys |
//! | [`Protocol::Cms`] | S/MIME (X.509 / CMS) certificates |

use std::fmt;

use serde::{Deserialize, Serialize};

use super::address::Address;

/// Concrete protocol a certificate belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    OpenPgp,
    Cms,
}

impl Protocol {
    pub const ALL: [Protocol; 2] = [Protocol::OpenPgp, Protocol::Cms];

    /// The other ecosystem.
    pub fn other(self) -> Protocol {
        match self {
            Protocol::OpenPgp => Protocol::Cms,
            Protocol::Cms => Protocol::OpenPgp,
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::OpenPgp => f.write_str("OpenPGP"),
            Protocol::Cms => f.write_str("S/MIME"),
        }
    }
}

impl std::str::FromStr for Protocol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "openpgp" | "pgp" => Ok(Protocol::OpenPgp),
            "cms" | "smime" | "s/mime" => Ok(Protocol::Cms),
            other => Err(format!("unknown protocol '{}' (expected openpgp or cms)", other)),
        }
    }
}

/// Trust in the binding between a user id and its certificate, weakest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Validity {
    #[default]
    Unknown,
    Undefined,
    Never,
    Marginal,
    Full,
    Ultimate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserId {
    /// `None` for user ids without a usable mail address.
    #[serde(default)]
    pub address: Option<Address>,
    #[serde(default)]
    pub validity: Validity,
}

impl UserId {
    pub fn new(address: Address, validity: Validity) -> Self {
        Self {
            address: Some(address),
            validity,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Certificate {
    /// Primary fingerprint, upper-case hex.
    pub fingerprint: String,
    pub protocol: Protocol,
    #[serde(default)]
    pub user_ids: Vec<UserId>,
    #[serde(default)]
    pub revoked: bool,
    #[serde(default)]
    pub expired: bool,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub can_sign: bool,
    #[serde(default)]
    pub can_encrypt: bool,
    #[serde(default)]
    pub has_secret: bool,
    /// Compliance modes (e.g. `de-vs`) every subkey of this certificate satisfies.
    #[serde(default)]
    pub compliance: Vec<String>,
}

impl Certificate {
    /// A certificate with a single user id and no capabilities; use the `with_*`
    /// builders to add them.
    pub fn new(fingerprint: impl Into<String>, protocol: Protocol, user_id: UserId) -> Self {
        Self {
            fingerprint: fingerprint.into().to_uppercase(),
            protocol,
            user_ids: vec![user_id],
            revoked: false,
            expired: false,
            disabled: false,
            can_sign: false,
            can_encrypt: false,
            has_secret: false,
            compliance: Vec::new(),
        }
    }

    /// Long key id: the last 16 hex digits of the fingerprint.
    pub fn key_id(&self) -> &str {
        let start = self.fingerprint.len().saturating_sub(16);
        self.fingerprint.get(start..).unwrap_or(&self.fingerprint)
    }

    /// Whether `identifier` names this certificate, by full fingerprint, long key id or
    /// short (8 digit) key id. A `0x` prefix and letter case are ignored.
    pub fn matches_identifier(&self, identifier: &str) -> bool {
        let identifier = identifier.trim();
        let identifier = identifier
            .strip_prefix("0x")
            .or_else(|| identifier.strip_prefix("0X"))
            .unwrap_or(identifier);
        if identifier.is_empty() {
            return false;
        }
        let identifier = identifier.to_uppercase();
        let fingerprint = self.fingerprint.to_uppercase();
        match identifier.len() {
            8 | 16 => fingerprint.ends_with(&identifier),
            _ => fingerprint == identifier,
        }
    }

    pub fn is_compliant_with(&self, mode: &str) -> bool {
        self.compliance.iter().any(|m| m.eq_ignore_ascii_case(mode))
    }

    pub fn user_id_for(&self, address: &Address) -> Option<&UserId> {
        self.user_ids
            .iter()
            .find(|uid| uid.address.as_ref() == Some(address))
    }

    pub fn with_signing(mut self) -> Self {
        self.can_sign = true;
        self
    }

    pub fn with_encryption(mut self) -> Self {
        self.can_encrypt = true;
        self
    }

    pub fn with_secret(mut self) -> Self {
        self.has_secret = true;
        self
    }

    pub fn with_compliance(mut self, mode: impl Into<String>) -> Self {
        self.compliance.push(mode.into());
        self
    }
}
