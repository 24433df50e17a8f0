// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Key Resolver Core
//!
//! Picks signing and encryption certificates for a message across OpenPGP and
//! S/MIME, honouring caller overrides and policy.
//!
//! # Architecture
//!
//! - **Layer:** Core System
//! - **Purpose:** Domain model, resolution pipeline, in-memory certificate store
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use keyresolver_core::{InMemoryCertificateStore, KeyResolver, ResolverPolicy};
//!
//! let store = Arc::new(InMemoryCertificateStore::new());
//! let mut resolver = KeyResolver::new(store, ResolverPolicy::default());
//! resolver.set_recipients(["bob@example.net"]).unwrap();
//! let resolution = resolver.resolve().unwrap();
//! assert!(resolution.needs_disambiguation());
//! ```

pub mod domain;
pub mod application;
pub mod infrastructure;

pub use application::{KeyResolver, OverrideConflict, ResolveError};
pub use domain::address::{Address, AddressError};
pub use domain::certificate::{Certificate, Protocol, UserId, Validity};
pub use domain::overrides::{OverrideProtocolHint, OverrideTable};
pub use domain::policy::{PolicyError, ResolverPolicy};
pub use domain::solution::{ProtocolUsage, Resolution, ResolutionStatus, ResolvedProtocol, Solution};
pub use domain::store::{CertificateStore, StoreError};
pub use infrastructure::{InMemoryCertificateStore, Keyring};
