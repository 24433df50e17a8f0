// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use thiserror::Error;

use crate::domain::address::AddressError;
use crate::domain::certificate::Protocol;

/// Override keys that cannot be honoured under the active policy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OverrideConflict {
    #[error("override certificates need {needed} but the resolution is restricted to {forced}")]
    ForcedProtocol { forced: Protocol, needed: Protocol },

    #[error("override certificates need both OpenPGP and S/MIME but mixing protocols is disabled")]
    MixingDisabled,
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error(transparent)]
    InvalidAddress(#[from] AddressError),

    #[error("Conflicting override keys: {0}")]
    OverrideConflict(#[from] OverrideConflict),
}
