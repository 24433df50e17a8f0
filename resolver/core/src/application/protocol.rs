// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Per-protocol stage: fill one protocol's signing and encryption slots from the
//! store.

use tracing::debug;

use super::lookup;
use crate::domain::address::Address;
use crate::domain::certificate::{Certificate, Protocol};
use crate::domain::policy::ResolverPolicy;
use crate::domain::predicates::AcceptanceCriteria;
use crate::domain::state::{ResolutionStage, WorkingState};
use crate::domain::store::CertificateStore;

pub fn resolve_protocol(
    mut state: WorkingState,
    protocol: Protocol,
    policy: &ResolverPolicy,
    store: &dyn CertificateStore,
) -> WorkingState {
    let next = match protocol {
        Protocol::OpenPgp => ResolutionStage::OpenPgpResolved,
        Protocol::Cms => ResolutionStage::CmsResolved,
    };
    if !policy.allows(protocol) {
        return state.advance(next);
    }

    let criteria = policy.acceptance_criteria();
    if policy.sign {
        resolve_signing(&mut state, protocol, &criteria, store);
    }
    if policy.encrypt {
        resolve_encryption(&mut state, protocol, &criteria, store);
    }
    state.advance(next)
}

fn resolve_signing(
    state: &mut WorkingState,
    protocol: Protocol,
    criteria: &AcceptanceCriteria,
    store: &dyn CertificateStore,
) {
    if state.has_signing(protocol) {
        return;
    }
    let Some(sender) = state.sender.as_ref() else {
        return;
    };
    let candidates = lookup::best_candidates(store, sender, protocol, true, false);
    if candidates.is_empty() {
        debug!(%sender, %protocol, "No signing certificate found");
        return;
    }
    if let Some(rejected) = candidates.iter().find(|cert| !criteria.is_acceptable_signing(cert)) {
        debug!(%sender, fingerprint = %rejected.fingerprint, "Unacceptable signing certificate");
        return;
    }
    state.signing.insert(protocol, candidates);
}

fn resolve_encryption(
    state: &mut WorkingState,
    protocol: Protocol,
    criteria: &AcceptanceCriteria,
    store: &dyn CertificateStore,
) {
    for (address, slots) in state.recipients.iter_mut() {
        if !slots.get(protocol).is_empty() {
            continue;
        }
        if !slots.common.is_empty() {
            if slots.common.iter().all(|cert| cert.protocol == protocol) {
                let common = slots.common.clone();
                *slots.get_mut(protocol) = common;
            } else {
                debug!(%address, %protocol, "Common override does not cover this protocol");
            }
            continue;
        }
        *slots.get_mut(protocol) = resolve_recipient(address, protocol, criteria, store);
    }
}

/// A single candidate must be valid for `address`. A group is all-or-nothing.
fn resolve_recipient(
    address: &Address,
    protocol: Protocol,
    criteria: &AcceptanceCriteria,
    store: &dyn CertificateStore,
) -> Vec<Certificate> {
    let candidates = lookup::best_candidates(store, address, protocol, false, true);
    match candidates.as_slice() {
        [] => {
            debug!(%address, %protocol, "No encryption certificate found");
            return Vec::new();
        }
        [single] => {
            if !criteria.is_acceptable_encryption(single, Some(address)) {
                debug!(%address, fingerprint = %single.fingerprint, "Encryption certificate has not enough validity");
                return Vec::new();
            }
        }
        group => {
            if let Some(rejected) = group
                .iter()
                .find(|cert| !criteria.is_acceptable_encryption(cert, None))
            {
                debug!(%address, fingerprint = %rejected.fingerprint, "Rejecting group with unacceptable member");
                return Vec::new();
            }
        }
    }
    for cert in &candidates {
        debug!(%address, %protocol, fingerprint = %cert.fingerprint, "Resolved encryption certificate");
    }
    candidates
}
