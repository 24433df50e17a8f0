// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Command implementations for the keyresolve CLI

pub mod policy;
pub mod resolve;

pub use self::policy::PolicyCommand;
pub use self::resolve::{OverrideArg, ResolveArgs};
