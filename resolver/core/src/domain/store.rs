// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Certificate Store Interface
//!
//! Lookup contract the resolver depends on. The interface lives in the domain layer
//! and is implemented in `crate::infrastructure`.
//!
//! | Trait | Implementations |
//! |-------|-----------------|
//! | [`CertificateStore`] | `InMemoryCertificateStore` |

use thiserror::Error;

use super::address::Address;
use super::certificate::{Certificate, Protocol};

/// Read-only certificate lookup, shared between resolvers.
pub trait CertificateStore: Send + Sync {
    /// The store's best certificate(s) for `address` in `protocol`. More than one
    /// certificate means the address is a group.
    fn find_best_candidates(
        &self,
        address: &Address,
        protocol: Protocol,
        require_secret: bool,
        for_encryption: bool,
    ) -> Result<Vec<Certificate>, StoreError>;

    /// Look up a certificate by fingerprint or key id.
    fn find_by_identifier(&self, identifier: &str) -> Result<Option<Certificate>, StoreError>;
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Certificate store unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Store error: {0}")]
    Other(String),
}
