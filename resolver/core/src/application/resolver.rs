// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Key Resolver
//!
//! Entry point of the crate. A [`KeyResolver`] is configured with a sender,
//! recipients, optional signing keys and overrides, then [`KeyResolver::resolve`]
//! runs the fixed pipeline:
//!
//! ```text
//! overrides -> OpenPGP -> S/MIME -> merge -> decision
//! ```
//!
//! Each call to `resolve` works on a fresh private state, so a resolver can be
//! resolved repeatedly and shares nothing mutable with other resolvers.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use tracing::{debug, info};

use super::error::ResolveError;
use super::{decision, lookup, merge, overrides, protocol};
use crate::domain::address::Address;
use crate::domain::certificate::{Certificate, Protocol};
use crate::domain::overrides::OverrideTable;
use crate::domain::policy::ResolverPolicy;
use crate::domain::solution::Resolution;
use crate::domain::state::WorkingState;
use crate::domain::store::CertificateStore;

pub struct KeyResolver {
    store: Arc<dyn CertificateStore>,
    policy: ResolverPolicy,
    sender: Option<Address>,
    recipients: BTreeSet<Address>,
    signing_keys: Vec<String>,
    overrides: OverrideTable,
}

impl KeyResolver {
    pub fn new(store: Arc<dyn CertificateStore>, policy: ResolverPolicy) -> Self {
        Self {
            store,
            policy,
            sender: None,
            recipients: BTreeSet::new(),
            signing_keys: Vec::new(),
            overrides: OverrideTable::new(),
        }
    }

    pub fn policy(&self) -> &ResolverPolicy {
        &self.policy
    }

    pub fn normalized_sender(&self) -> Option<&Address> {
        self.sender.as_ref()
    }

    /// The sender signs and, when encrypting, is also a recipient.
    pub fn set_sender(&mut self, sender: &str) -> Result<(), ResolveError> {
        let sender = Address::parse(sender)?;
        if self.policy.encrypt {
            self.recipients.insert(sender.clone());
        }
        self.sender = Some(sender);
        Ok(())
    }

    /// Adds recipients. Nothing is added when not encrypting, but every address is
    /// still validated.
    pub fn set_recipients<I, S>(&mut self, recipients: I) -> Result<(), ResolveError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let parsed = recipients
            .into_iter()
            .map(|r| Address::parse(r.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        if self.policy.encrypt {
            self.recipients.extend(parsed);
        }
        Ok(())
    }

    /// Signing certificates chosen by the caller, by fingerprint or key id. They
    /// replace the store's choice for their protocol.
    pub fn set_signing_keys<I, S>(&mut self, identifiers: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.signing_keys.extend(identifiers.into_iter().map(Into::into));
    }

    pub fn set_override_keys(&mut self, overrides: OverrideTable) {
        self.overrides.extend(overrides);
    }

    pub fn recipients(&self) -> impl Iterator<Item = &Address> + '_ {
        self.recipients.iter()
    }

    pub fn resolve(&self) -> Result<Resolution, ResolveError> {
        let store = self.store.as_ref();
        let policy = &self.policy;
        info!(
            recipients = self.recipients.len(),
            sign = policy.sign,
            encrypt = policy.encrypt,
            "Starting key resolution"
        );

        let mut state = WorkingState::new(self.sender.clone(), self.recipients.iter().cloned());
        if policy.sign {
            state.signing = self.caller_signing_certificates();
        }

        let state = overrides::apply_overrides(state, policy, &self.overrides, store);
        overrides::check_conflicts(&state, policy)?;
        let state = protocol::resolve_protocol(state, Protocol::OpenPgp, policy, store);
        let state = protocol::resolve_protocol(state, Protocol::Cms, policy, store);
        let state = merge::merge_encryption(state, policy);
        let (state, resolution) = decision::decide(state, policy);
        debug!(stage = ?state.stage(), "Resolution pipeline finished");
        Ok(resolution)
    }

    fn caller_signing_certificates(&self) -> BTreeMap<Protocol, Vec<Certificate>> {
        let mut by_protocol: BTreeMap<Protocol, Vec<Certificate>> = BTreeMap::new();
        for cert in lookup::by_identifiers(self.store.as_ref(), &self.signing_keys) {
            by_protocol.entry(cert.protocol).or_default().push(cert);
        }
        by_protocol
    }
}
