// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Store access for the pipeline stages. A failing store never aborts a
//! resolution: the failure is logged and treated as "nothing found".

use tracing::{debug, warn};

use crate::domain::address::Address;
use crate::domain::certificate::{Certificate, Protocol};
use crate::domain::store::CertificateStore;

pub(crate) fn best_candidates(
    store: &dyn CertificateStore,
    address: &Address,
    protocol: Protocol,
    require_secret: bool,
    for_encryption: bool,
) -> Vec<Certificate> {
    match store.find_best_candidates(address, protocol, require_secret, for_encryption) {
        Ok(certs) => certs,
        Err(e) => {
            warn!(%address, %protocol, error = %e, "Certificate lookup failed");
            Vec::new()
        }
    }
}

pub(crate) fn by_identifier(store: &dyn CertificateStore, identifier: &str) -> Option<Certificate> {
    match store.find_by_identifier(identifier) {
        Ok(Some(cert)) => Some(cert),
        Ok(None) => {
            debug!(identifier, "No certificate found for identifier");
            None
        }
        Err(e) => {
            warn!(identifier, error = %e, "Certificate lookup failed");
            None
        }
    }
}

/// Looks up each identifier in order, skipping misses.
pub(crate) fn by_identifiers(store: &dyn CertificateStore, identifiers: &[String]) -> Vec<Certificate> {
    identifiers
        .iter()
        .filter_map(|identifier| by_identifier(store, identifier))
        .collect()
}
