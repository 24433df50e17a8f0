// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Decision Engine
//!
//! Turns the fully populated working state into a [`Resolution`].
//!
//! A protocol is *complete* when every recipient has a certificate in it and, if
//! signing was requested, a signing certificate exists for it.
//!
//! | Forced | Complete protocol | Mixing | Outcome |
//! |--------|-------------------|--------|---------|
//! | `p` | - | - | `p` solution, resolved iff `p` is complete |
//! | no | yes | no | that protocol, other complete protocol as alternative |
//! | no | yes | yes | that protocol's certificates, tagged mixed |
//! | no | none | no | needs disambiguation, preferred protocol first |
//! | no | none | yes | merged solution, resolved iff nothing is missing |
//!
//! When both protocols are complete, S/MIME is chosen only if it is preferred.

use tracing::info;

use crate::domain::certificate::Protocol;
use crate::domain::policy::ResolverPolicy;
use crate::domain::solution::{Resolution, ResolutionStatus, ResolvedProtocol, Solution};
use crate::domain::state::{ResolutionStage, WorkingState};

struct Outcome {
    status: ResolutionStatus,
    solution: Solution,
    alternative: Option<Solution>,
    missing_signing: bool,
}

pub fn decide(state: WorkingState, policy: &ResolverPolicy) -> (WorkingState, Resolution) {
    let unresolved = Protocol::ALL
        .into_iter()
        .map(|protocol| (protocol, state.unresolved_recipients(protocol)))
        .collect();

    let outcome = if !policy.sign && !policy.encrypt {
        let protocol = policy
            .forced_protocol
            .map_or(ResolvedProtocol::OpenPgp, ResolvedProtocol::from);
        Outcome {
            status: ResolutionStatus::FullyResolved,
            solution: Solution::empty(protocol),
            alternative: None,
            missing_signing: false,
        }
    } else if let Some(forced) = policy.forced_protocol {
        Outcome {
            status: status(is_complete(&state, policy, forced)),
            solution: protocol_solution(&state, forced),
            alternative: None,
            missing_signing: policy.sign && !state.has_signing(forced),
        }
    } else {
        decide_unforced(&state, policy)
    };

    let stage = match outcome.status {
        ResolutionStatus::FullyResolved => ResolutionStage::Finalized,
        ResolutionStatus::NeedsDisambiguation => ResolutionStage::NeedsDisambiguation,
    };
    let resolution = Resolution {
        status: outcome.status,
        usage: outcome.solution.usage(),
        solution: outcome.solution,
        alternative: outcome.alternative,
        unresolved,
        missing_signing: outcome.missing_signing,
    };
    info!(
        status = ?resolution.status,
        protocol = %resolution.solution.protocol,
        alternative = resolution.alternative.is_some(),
        "Key resolution finished"
    );
    (state.advance(stage), resolution)
}

fn decide_unforced(state: &WorkingState, policy: &ResolverPolicy) -> Outcome {
    let open_pgp = is_complete(state, policy, Protocol::OpenPgp);
    let cms = is_complete(state, policy, Protocol::Cms);
    let chosen = if cms && (!open_pgp || policy.preferred_protocol == Some(Protocol::Cms)) {
        Some(Protocol::Cms)
    } else if open_pgp {
        Some(Protocol::OpenPgp)
    } else {
        None
    };

    match (chosen, policy.allow_mixed) {
        (Some(protocol), false) => {
            let other = protocol.other();
            Outcome {
                status: ResolutionStatus::FullyResolved,
                solution: protocol_solution(state, protocol),
                alternative: is_complete(state, policy, other)
                    .then(|| protocol_solution(state, other)),
                missing_signing: false,
            }
        }
        (Some(protocol), true) => {
            let mut solution = protocol_solution(state, protocol);
            solution.protocol = ResolvedProtocol::Mixed;
            Outcome {
                status: ResolutionStatus::FullyResolved,
                solution,
                alternative: None,
                missing_signing: false,
            }
        }
        (None, false) => {
            let primary = policy.preferred_protocol.unwrap_or(Protocol::OpenPgp);
            Outcome {
                status: ResolutionStatus::NeedsDisambiguation,
                solution: protocol_solution(state, primary),
                alternative: Some(protocol_solution(state, primary.other())),
                missing_signing: policy.sign && !state.has_signing(primary),
            }
        }
        (None, true) => {
            let missing_signing = policy.sign
                && !(state.has_signing(Protocol::OpenPgp) && state.has_signing(Protocol::Cms));
            Outcome {
                status: status(!state.has_gap() && !missing_signing),
                solution: merged_solution(state),
                alternative: None,
                missing_signing,
            }
        }
    }
}

fn is_complete(state: &WorkingState, policy: &ResolverPolicy, protocol: Protocol) -> bool {
    state.all_resolved(protocol) && (!policy.sign || state.has_signing(protocol))
}

fn status(resolved: bool) -> ResolutionStatus {
    if resolved {
        ResolutionStatus::FullyResolved
    } else {
        ResolutionStatus::NeedsDisambiguation
    }
}

fn protocol_solution(state: &WorkingState, protocol: Protocol) -> Solution {
    Solution {
        protocol: protocol.into(),
        signing_certificates: state.signing_for(protocol).to_vec(),
        encryption_certificates: state
            .recipients
            .iter()
            .map(|(address, slots)| (address.clone(), slots.get(protocol).to_vec()))
            .collect(),
    }
}

fn merged_solution(state: &WorkingState) -> Solution {
    Solution {
        protocol: ResolvedProtocol::Mixed,
        signing_certificates: Protocol::ALL
            .into_iter()
            .flat_map(|protocol| state.signing_for(protocol).iter().cloned())
            .collect(),
        encryption_certificates: state
            .recipients
            .iter()
            .map(|(address, slots)| (address.clone(), slots.common.clone()))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::address::Address;
    use crate::domain::certificate::{Certificate, UserId, Validity};
    use crate::domain::solution::ProtocolUsage;

    fn addr(s: &str) -> Address {
        Address::parse(s).unwrap()
    }

    fn cert(protocol: Protocol) -> Certificate {
        Certificate::new("AAAA", protocol, UserId::new(addr("bob@example.net"), Validity::Full))
    }

    /// State with `bob` resolved in the given protocols.
    fn state_with(protocols: &[Protocol]) -> WorkingState {
        let mut state = WorkingState::new(None, [addr("bob@example.net")]);
        let slots = state.recipients.get_mut(&addr("bob@example.net")).unwrap();
        for protocol in protocols {
            slots.get_mut(*protocol).push(cert(*protocol));
        }
        state
    }

    #[test]
    fn test_nothing_to_do() {
        let policy = ResolverPolicy {
            encrypt: false,
            ..Default::default()
        };
        let (state, resolution) = decide(WorkingState::new(None, []), &policy);
        assert_eq!(state.stage(), ResolutionStage::Finalized);
        assert!(resolution.is_fully_resolved());
        assert!(resolution.solution.encryption_certificates.is_empty());
        assert!(resolution.solution.signing_certificates.is_empty());
    }

    #[test]
    fn test_forced_protocol_incomplete() {
        let policy = ResolverPolicy {
            forced_protocol: Some(Protocol::Cms),
            ..Default::default()
        };
        let (state, resolution) = decide(state_with(&[Protocol::OpenPgp]), &policy);
        assert_eq!(state.stage(), ResolutionStage::NeedsDisambiguation);
        assert!(resolution.needs_disambiguation());
        assert_eq!(resolution.solution.protocol, ResolvedProtocol::Cms);
        assert!(resolution.alternative.is_none());
        assert_eq!(resolution.unresolved_recipients(Protocol::Cms), &[addr("bob@example.net")][..]);
        assert!(resolution.unresolved.contains_key(&Protocol::OpenPgp));
        assert!(resolution.unresolved_recipients(Protocol::OpenPgp).is_empty());
    }

    #[test]
    fn test_both_complete_without_mixing_offers_alternative() {
        let policy = ResolverPolicy {
            allow_mixed: false,
            ..Default::default()
        };
        let (_, resolution) = decide(state_with(&[Protocol::OpenPgp, Protocol::Cms]), &policy);
        assert!(resolution.is_fully_resolved());
        assert_eq!(resolution.solution.protocol, ResolvedProtocol::OpenPgp);
        assert_eq!(resolution.usage, ProtocolUsage::OpenPgpOnly);
        assert_eq!(
            resolution.alternative.as_ref().map(|alt| alt.protocol),
            Some(ResolvedProtocol::Cms)
        );
    }

    #[test]
    fn test_neither_complete_without_mixing() {
        let policy = ResolverPolicy {
            allow_mixed: false,
            preferred_protocol: Some(Protocol::Cms),
            ..Default::default()
        };
        let (_, resolution) = decide(state_with(&[]), &policy);
        assert!(resolution.needs_disambiguation());
        assert_eq!(resolution.solution.protocol, ResolvedProtocol::Cms);
        assert_eq!(resolution.usage, ProtocolUsage::CmsOnly);
        assert_eq!(
            resolution.alternative.as_ref().map(|alt| alt.protocol),
            Some(ResolvedProtocol::OpenPgp)
        );
        assert_eq!(resolution.unresolved_addresses(), vec![addr("bob@example.net")]);
    }

    #[test]
    fn test_gap_in_merged_solution() {
        let (state, resolution) = decide(state_with(&[]), &ResolverPolicy::default());
        assert_eq!(state.stage(), ResolutionStage::NeedsDisambiguation);
        assert_eq!(resolution.solution.protocol, ResolvedProtocol::Mixed);
        assert!(resolution.alternative.is_none());
    }

    #[test]
    fn test_missing_signing_blocks_merged_solution() {
        let mut state = state_with(&[]);
        state
            .recipients
            .get_mut(&addr("bob@example.net"))
            .unwrap()
            .common
            .push(cert(Protocol::Cms));
        state.signing.insert(Protocol::OpenPgp, vec![cert(Protocol::OpenPgp)]);

        let policy = ResolverPolicy {
            sign: true,
            ..Default::default()
        };
        let (_, resolution) = decide(state, &policy);
        assert!(resolution.needs_disambiguation());
        assert!(resolution.missing_signing());
        assert_eq!(resolution.usage, ProtocolUsage::Mixed);
    }
}
