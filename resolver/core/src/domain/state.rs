// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Working Resolution State
//!
//! Private per-resolution state threaded through the pipeline. Every stage takes the
//! state by value and hands back the next one, so a stage can never observe a state
//! that has moved past it.
//!
//! ```text
//! Start -> OverridesApplied -> OpenPgpResolved -> CmsResolved -> Merged -> Finalized
//!                                                                      \-> NeedsDisambiguation
//! ```

use std::collections::BTreeMap;

use super::address::Address;
use super::certificate::{Certificate, Protocol};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ResolutionStage {
    Start,
    OverridesApplied,
    OpenPgpResolved,
    CmsResolved,
    Merged,
    Finalized,
    NeedsDisambiguation,
}

impl ResolutionStage {
    pub fn is_terminal(self) -> bool {
        matches!(self, ResolutionStage::Finalized | ResolutionStage::NeedsDisambiguation)
    }
}

/// Certificates assigned to one recipient.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncryptionSlots {
    pub open_pgp: Vec<Certificate>,
    pub cms: Vec<Certificate>,
    /// Protocol-independent slot, filled by common overrides or by the merge.
    pub common: Vec<Certificate>,
}

impl EncryptionSlots {
    pub fn get(&self, protocol: Protocol) -> &[Certificate] {
        match protocol {
            Protocol::OpenPgp => &self.open_pgp,
            Protocol::Cms => &self.cms,
        }
    }

    pub fn get_mut(&mut self, protocol: Protocol) -> &mut Vec<Certificate> {
        match protocol {
            Protocol::OpenPgp => &mut self.open_pgp,
            Protocol::Cms => &mut self.cms,
        }
    }
}

#[derive(Debug, Clone)]
pub struct WorkingState {
    stage: ResolutionStage,
    pub sender: Option<Address>,
    pub recipients: BTreeMap<Address, EncryptionSlots>,
    pub signing: BTreeMap<Protocol, Vec<Certificate>>,
}

impl WorkingState {
    pub fn new<I>(sender: Option<Address>, recipients: I) -> Self
    where
        I: IntoIterator<Item = Address>,
    {
        Self {
            stage: ResolutionStage::Start,
            sender,
            recipients: recipients
                .into_iter()
                .map(|address| (address, EncryptionSlots::default()))
                .collect(),
            signing: BTreeMap::new(),
        }
    }

    pub fn stage(&self) -> ResolutionStage {
        self.stage
    }

    /// Move to `next`. Stages only move forward; a backwards request keeps the
    /// current stage.
    pub fn advance(mut self, next: ResolutionStage) -> Self {
        if next > self.stage && !self.stage.is_terminal() {
            self.stage = next;
        } else {
            tracing::debug!(current = ?self.stage, requested = ?next, "Ignoring stage regression");
        }
        self
    }

    pub fn signing_for(&self, protocol: Protocol) -> &[Certificate] {
        self.signing.get(&protocol).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has_signing(&self, protocol: Protocol) -> bool {
        !self.signing_for(protocol).is_empty()
    }

    /// Recipients without a certificate in `protocol`'s slot, in address order.
    pub fn unresolved_recipients(&self, protocol: Protocol) -> Vec<Address> {
        self.recipients
            .iter()
            .filter(|(_, slots)| slots.get(protocol).is_empty())
            .map(|(address, _)| address.clone())
            .collect()
    }

    pub fn all_resolved(&self, protocol: Protocol) -> bool {
        self.recipients.values().all(|slots| !slots.get(protocol).is_empty())
    }

    /// A recipient is left without any merged certificate.
    pub fn has_gap(&self) -> bool {
        self.recipients.values().any(|slots| slots.common.is_empty())
    }

    /// Some common slot holds a certificate of `protocol`.
    pub fn common_needs(&self, protocol: Protocol) -> bool {
        self.recipients
            .values()
            .flat_map(|slots| slots.common.iter())
            .any(|cert| cert.protocol == protocol)
    }
}
