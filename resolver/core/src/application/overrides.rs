// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Override stage: caller-pinned certificates are placed into the working state
//! before the store is consulted.
//!
//! Common (`FromCertificate`) overrides are applied first and, when they yield a
//! certificate, shadow the protocol-specific overrides of the same address.

use tracing::debug;

use super::error::OverrideConflict;
use super::lookup;
use crate::domain::certificate::Protocol;
use crate::domain::overrides::{OverrideProtocolHint, OverrideTable};
use crate::domain::policy::ResolverPolicy;
use crate::domain::state::{ResolutionStage, WorkingState};
use crate::domain::store::CertificateStore;

pub fn apply_overrides(
    mut state: WorkingState,
    policy: &ResolverPolicy,
    overrides: &OverrideTable,
    store: &dyn CertificateStore,
) -> WorkingState {
    if !policy.encrypt {
        return state.advance(ResolutionStage::OverridesApplied);
    }

    for (address, identifiers) in overrides.entries_for(OverrideProtocolHint::FromCertificate) {
        let Some(slots) = state.recipients.get_mut(address) else {
            debug!(%address, "Ignoring override for an address that is not a recipient");
            continue;
        };
        let certs = lookup::by_identifiers(store, identifiers);
        for cert in &certs {
            debug!(%address, protocol = %cert.protocol, fingerprint = %cert.fingerprint, "Override");
        }
        slots.common = certs;
    }

    for protocol in Protocol::ALL {
        let hint = OverrideProtocolHint::from(protocol);
        for (address, identifiers) in overrides.entries_for(hint) {
            if !policy.allows(protocol) {
                debug!(%address, %protocol, "Skipping override for an excluded protocol");
                continue;
            }
            let Some(slots) = state.recipients.get_mut(address) else {
                debug!(%address, "Ignoring override for an address that is not a recipient");
                continue;
            };
            if !slots.common.is_empty() {
                debug!(%address, %protocol, "Common override takes precedence");
                continue;
            }
            let certs: Vec<_> = lookup::by_identifiers(store, identifiers)
                .into_iter()
                .filter(|cert| {
                    if cert.protocol != protocol {
                        debug!(%address, %protocol, fingerprint = %cert.fingerprint, "Ignoring override certificate of the wrong protocol");
                        return false;
                    }
                    debug!(%address, %protocol, fingerprint = %cert.fingerprint, "Override");
                    true
                })
                .collect();
            *slots.get_mut(protocol) = certs;
        }
    }

    state.advance(ResolutionStage::OverridesApplied)
}

/// Common overrides must fit the forced protocol and, without mixing, a single
/// protocol.
pub fn check_conflicts(state: &WorkingState, policy: &ResolverPolicy) -> Result<(), OverrideConflict> {
    if let Some(forced) = policy.forced_protocol {
        let needed = forced.other();
        if state.common_needs(needed) {
            return Err(OverrideConflict::ForcedProtocol { forced, needed });
        }
    }
    if !policy.allow_mixed
        && state.common_needs(Protocol::OpenPgp)
        && state.common_needs(Protocol::Cms)
    {
        return Err(OverrideConflict::MixingDisabled);
    }
    Ok(())
}
