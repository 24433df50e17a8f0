// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod error;
mod lookup;
pub mod overrides;
pub mod protocol;
pub mod merge;
pub mod decision;
pub mod resolver;

pub use error::{OverrideConflict, ResolveError};
pub use resolver::KeyResolver;
