// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Domain
//!
//! Value objects, predicates and contracts of key resolution.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Certificate model, overrides, policy, working state and results

pub mod address;
pub mod certificate;
pub mod predicates;
pub mod overrides;
pub mod store;
pub mod policy;
pub mod state;
pub mod solution;
