// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Merge stage: pick one protocol's certificates per recipient for the common slot.

use std::cmp::Ordering;

use tracing::debug;

use crate::domain::certificate::Protocol;
use crate::domain::policy::ResolverPolicy;
use crate::domain::predicates::minimum_validity;
use crate::domain::state::{ResolutionStage, WorkingState};

pub fn merge_encryption(mut state: WorkingState, policy: &ResolverPolicy) -> WorkingState {
    if !policy.allow_mixed || policy.forced_protocol.is_some() {
        return state.advance(ResolutionStage::Merged);
    }

    for (address, slots) in state.recipients.iter_mut() {
        if !slots.common.is_empty() {
            continue;
        }
        let winner = match (slots.open_pgp.is_empty(), slots.cms.is_empty()) {
            (true, true) => continue,
            (false, true) => Protocol::OpenPgp,
            (true, false) => Protocol::Cms,
            (false, false) => {
                let pgp = minimum_validity(&slots.open_pgp, address);
                let cms = minimum_validity(&slots.cms, address);
                match pgp.cmp(&cms) {
                    Ordering::Greater => Protocol::OpenPgp,
                    Ordering::Less => Protocol::Cms,
                    Ordering::Equal => policy.preferred_protocol.unwrap_or(Protocol::OpenPgp),
                }
            }
        };
        debug!(%address, protocol = %winner, "Merged encryption certificates");
        slots.common = slots.get(winner).to_vec();
    }

    state.advance(ResolutionStage::Merged)
}
