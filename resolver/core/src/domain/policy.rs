// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Resolver Policy
//!
//! What the caller wants from a resolution: which operations, which protocols, and how
//! strict the acceptance checks are.
//!
//! ## Example (`keyresolver-policy.yaml`)
//!
//! ```yaml
//! encrypt: true
//! sign: true
//! forced_protocol: null      # openpgp | cms
//! allow_mixed: true
//! preferred_protocol: cms
//! minimum_validity: marginal
//! compliance: de-vs
//! ```
//!
//! ## Discovery
//!
//! 1. Explicit path (CLI `--policy`)
//! 2. `KEYRESOLVER_POLICY_PATH` environment variable
//! 3. `./keyresolver-policy.yaml`
//! 4. `~/.keyresolver/policy.yaml`
//! 5. Built-in defaults

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::certificate::{Protocol, Validity};
use super::predicates::{normalize_compliance, AcceptanceCriteria};

pub const POLICY_PATH_ENV: &str = "KEYRESOLVER_POLICY_PATH";
pub const COMPLIANCE_ENV: &str = "KEYRESOLVER_COMPLIANCE";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PolicyError {
    #[error("Compliance mode must not be empty (omit it to disable compliance checks)")]
    EmptyCompliance,

    #[error("Preferred protocol {preferred} contradicts forced protocol {forced}")]
    PreferenceContradictsForced { forced: Protocol, preferred: Protocol },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverPolicy {
    pub encrypt: bool,
    pub sign: bool,
    pub forced_protocol: Option<Protocol>,
    pub allow_mixed: bool,
    pub preferred_protocol: Option<Protocol>,
    pub minimum_validity: Validity,
    pub compliance: Option<String>,
}

impl Default for ResolverPolicy {
    fn default() -> Self {
        Self {
            encrypt: true,
            sign: false,
            forced_protocol: None,
            allow_mixed: true,
            preferred_protocol: None,
            minimum_validity: Validity::Marginal,
            compliance: None,
        }
    }
}

impl ResolverPolicy {
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        let policy = serde_yaml::from_str(yaml)?;
        Ok(policy)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read policy file {:?}", path))?;
        Self::from_yaml_str(&content).with_context(|| format!("Failed to parse policy file {:?}", path))
    }

    pub fn to_yaml_file(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// First existing policy file in the discovery order, explicit path excluded.
    pub fn discover() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(POLICY_PATH_ENV) {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        let cwd = PathBuf::from("./keyresolver-policy.yaml");
        if cwd.exists() {
            return Some(cwd);
        }

        if let Some(home) = dirs::home_dir() {
            let user_policy = home.join(".keyresolver").join("policy.yaml");
            if user_policy.exists() {
                return Some(user_policy);
            }
        }

        None
    }

    /// An explicit path must load; otherwise discovery falls back to defaults.
    pub fn load_or_default(explicit_path: Option<PathBuf>) -> anyhow::Result<Self> {
        let mut policy = if let Some(path) = explicit_path {
            tracing::info!("Loading policy from explicit path: {:?}", path);
            Self::from_yaml_file(&path)?
        } else if let Some(path) = Self::discover() {
            tracing::info!("Loading policy from discovered path: {:?}", path);
            Self::from_yaml_file(&path)?
        } else {
            tracing::debug!("No policy file found in standard locations, using defaults");
            Self::default()
        };
        policy.apply_env_overrides();
        Ok(policy)
    }

    /// `KEYRESOLVER_COMPLIANCE` replaces the configured compliance mode.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(value) = std::env::var(COMPLIANCE_ENV) {
            tracing::info!("Environment override: {}={}", COMPLIANCE_ENV, value);
            self.compliance = Some(value);
        }
    }

    pub fn validate(&self) -> Result<(), PolicyError> {
        if let Some(compliance) = &self.compliance {
            if compliance.trim().is_empty() {
                return Err(PolicyError::EmptyCompliance);
            }
        }
        if let (Some(forced), Some(preferred)) = (self.forced_protocol, self.preferred_protocol) {
            if forced != preferred {
                return Err(PolicyError::PreferenceContradictsForced { forced, preferred });
            }
        }
        Ok(())
    }

    /// Compliance mode to enforce; `gnupg` and unset mean none.
    pub fn compliance_mode(&self) -> Option<String> {
        normalize_compliance(self.compliance.as_deref())
    }

    pub fn acceptance_criteria(&self) -> AcceptanceCriteria {
        AcceptanceCriteria::new(self.minimum_validity, self.compliance.as_deref())
    }

    /// Whether `protocol` takes part in this resolution.
    pub fn allows(&self, protocol: Protocol) -> bool {
        self.forced_protocol.is_none_or(|forced| forced == protocol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let policy = ResolverPolicy::default();
        assert!(policy.encrypt);
        assert!(!policy.sign);
        assert!(policy.allow_mixed);
        assert_eq!(policy.minimum_validity, Validity::Marginal);
        assert!(policy.allows(Protocol::OpenPgp) && policy.allows(Protocol::Cms));
        assert!(policy.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let policy = ResolverPolicy::from_yaml_str("sign: true\nforced_protocol: cms\n").unwrap();
        assert!(policy.sign && policy.encrypt && policy.allow_mixed);
        assert_eq!(policy.forced_protocol, Some(Protocol::Cms));
        assert!(!policy.allows(Protocol::OpenPgp));
        assert!(policy.allows(Protocol::Cms));
    }

    #[test]
    fn test_unknown_protocol_is_rejected() {
        assert!(ResolverPolicy::from_yaml_str("forced_protocol: x509\n").is_err());
    }

    #[test]
    fn test_validate() {
        let policy = ResolverPolicy {
            compliance: Some(" ".to_string()),
            ..Default::default()
        };
        assert_eq!(policy.validate(), Err(PolicyError::EmptyCompliance));

        let policy = ResolverPolicy {
            forced_protocol: Some(Protocol::OpenPgp),
            preferred_protocol: Some(Protocol::Cms),
            ..Default::default()
        };
        assert!(matches!(
            policy.validate(),
            Err(PolicyError::PreferenceContradictsForced { .. })
        ));
    }

    #[test]
    fn test_compliance_mode_normalization() {
        let mut policy = ResolverPolicy::default();
        assert_eq!(policy.compliance_mode(), None);
        policy.compliance = Some("gnupg".to_string());
        assert_eq!(policy.compliance_mode(), None);
        policy.compliance = Some("DE-VS".to_string());
        assert_eq!(policy.compliance_mode(), Some("de-vs".to_string()));
        assert_eq!(policy.acceptance_criteria().compliance, Some("de-vs".to_string()));
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("policy.yaml");
        let policy = ResolverPolicy {
            sign: true,
            allow_mixed: false,
            preferred_protocol: Some(Protocol::Cms),
            minimum_validity: Validity::Full,
            ..Default::default()
        };
        policy.to_yaml_file(&path).unwrap();
        assert_eq!(ResolverPolicy::from_yaml_file(&path).unwrap(), policy);
        assert!(ResolverPolicy::from_yaml_file(dir.path().join("missing.yaml")).is_err());
    }
}
