// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Certificate Predicates
//!
//! Pure classification functions used by the resolution pipeline.
//!
//! | Function | Question answered |
//! |----------|-------------------|
//! | [`is_valid_signing_certificate`] | Can this certificate sign at all? |
//! | [`is_valid_encryption_certificate`] | Can this certificate encrypt at all? |
//! | [`validity_for`] | How much do we trust this certificate for an address? |
//! | [`minimum_validity`] | How trustworthy is a multi-certificate assignment? |
//! | [`AcceptanceCriteria`] | The above plus the caller's threshold and compliance mode |

use tracing::debug;

use super::address::Address;
use super::certificate::{Certificate, Validity};

/// Compliance token that means "no compliance restriction".
pub const NO_COMPLIANCE: &str = "gnupg";

fn is_usable(cert: &Certificate) -> bool {
    !(cert.revoked || cert.expired || cert.disabled)
}

pub fn is_valid_signing_certificate(cert: &Certificate) -> bool {
    is_usable(cert) && cert.can_sign && cert.has_secret
}

pub fn is_valid_encryption_certificate(cert: &Certificate) -> bool {
    is_usable(cert) && cert.can_encrypt
}

/// Validity of the user id matching `address`. If no user id matches, the best
/// validity of all user ids is returned.
pub fn validity_for(cert: &Certificate, address: &Address) -> Validity {
    match cert.user_id_for(address) {
        Some(uid) => uid.validity,
        None => cert
            .user_ids
            .iter()
            .map(|uid| uid.validity)
            .max()
            .unwrap_or(Validity::Unknown),
    }
}

/// A multi-certificate assignment is only as trustworthy as its weakest member.
pub fn minimum_validity(certs: &[Certificate], address: &Address) -> Validity {
    certs
        .iter()
        .map(|cert| validity_for(cert, address))
        .min()
        .unwrap_or(Validity::Unknown)
}

/// Caller-controlled acceptance thresholds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptanceCriteria {
    pub minimum_validity: Validity,
    /// Active compliance mode, already normalized (see [`normalize_compliance`]).
    pub compliance: Option<String>,
}

impl Default for AcceptanceCriteria {
    fn default() -> Self {
        Self {
            minimum_validity: Validity::Marginal,
            compliance: None,
        }
    }
}

impl AcceptanceCriteria {
    pub fn new(minimum_validity: Validity, compliance: Option<&str>) -> Self {
        Self {
            minimum_validity,
            compliance: normalize_compliance(compliance),
        }
    }

    fn is_compliant(&self, cert: &Certificate) -> bool {
        match &self.compliance {
            Some(mode) => cert.is_compliant_with(mode),
            None => true,
        }
    }

    pub fn is_acceptable_signing(&self, cert: &Certificate) -> bool {
        if !is_valid_signing_certificate(cert) {
            return false;
        }
        if !self.is_compliant(cert) {
            debug!(
                fingerprint = %cert.fingerprint,
                "Rejected signing certificate because it is not compliant"
            );
            return false;
        }
        true
    }

    /// With `address`, a user id for that address must reach the minimum validity.
    /// Without it only protocol-level usability and compliance are checked, which is
    /// what group members are held to.
    pub fn is_acceptable_encryption(&self, cert: &Certificate, address: Option<&Address>) -> bool {
        if !is_valid_encryption_certificate(cert) {
            return false;
        }
        if !self.is_compliant(cert) {
            debug!(
                fingerprint = %cert.fingerprint,
                "Rejected encryption certificate because it is not compliant"
            );
            return false;
        }
        let Some(address) = address else {
            return true;
        };
        cert.user_ids.iter().any(|uid| {
            uid.address.as_ref() == Some(address) && uid.validity >= self.minimum_validity
        })
    }
}

/// Maps the configured compliance token to the mode that must be enforced.
pub fn normalize_compliance(token: Option<&str>) -> Option<String> {
    let token = token?.trim();
    if token.is_empty() || token.eq_ignore_ascii_case(NO_COMPLIANCE) {
        None
    } else {
        Some(token.to_ascii_lowercase())
    }
}
