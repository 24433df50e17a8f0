// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Infrastructure
//!
//! Concrete implementations of the domain contracts.
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure Layer
//! - **Purpose:** Certificate store backends

pub mod in_memory_store;

pub use in_memory_store::{InMemoryCertificateStore, Keyring};
