// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Policy management commands
//!
//! Commands: show, validate, generate

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::{Path, PathBuf};

use keyresolver_core::domain::policy::{COMPLIANCE_ENV, POLICY_PATH_ENV};
use keyresolver_core::ResolverPolicy;

const POLICY_WITH_EXAMPLES: &str = include_str!("../../templates/policy-with-examples.yaml");

#[derive(Subcommand, Debug, Clone)]
pub enum PolicyCommand {
    /// Show the effective policy
    Show {
        /// Show policy file paths checked
        #[arg(long)]
        paths: bool,
    },

    /// Validate a policy file
    Validate {
        /// Path to policy file (default: discover)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Generate a policy file
    Generate {
        /// Output path
        #[arg(short, long, default_value = "./keyresolver-policy.yaml")]
        output: PathBuf,

        /// Write a commented policy describing every setting
        #[arg(long)]
        examples: bool,
    },
}

pub fn handle_command(command: PolicyCommand, policy_override: Option<PathBuf>) -> Result<()> {
    match command {
        PolicyCommand::Show { paths } => show(policy_override, paths),
        PolicyCommand::Validate { file } => validate(file.or(policy_override)).map(|_| ()),
        PolicyCommand::Generate { output, examples } => generate(&output, examples),
    }
}

fn show(policy_override: Option<PathBuf>, show_paths: bool) -> Result<()> {
    let policy = ResolverPolicy::load_or_default(policy_override.clone())
        .context("Failed to load policy")?;

    if show_paths {
        println!("{}", "Policy discovery paths:".bold());
        if let Some(path) = &policy_override {
            println!("  1. --policy flag: {}", path.display());
        } else {
            println!("  1. --policy flag: {}", "(not set)".dimmed());
        }
        println!(
            "  2. {}: {}",
            POLICY_PATH_ENV,
            std::env::var(POLICY_PATH_ENV)
                .unwrap_or_else(|_| "(not set)".to_string())
                .dimmed()
        );
        println!("  3. ./keyresolver-policy.yaml");
        println!("  4. ~/.keyresolver/policy.yaml");
        println!();
    }

    println!("{}", "Current policy:".bold());
    print!("{}", serde_yaml::to_string(&policy).context("Failed to serialize policy")?);
    if let Ok(value) = std::env::var(COMPLIANCE_ENV) {
        println!("{}", format!("(compliance set by {}={})", COMPLIANCE_ENV, value).dimmed());
    }

    Ok(())
}

/// Loads and validates a policy; discovery applies when `path` is `None`.
pub fn validate(path: Option<PathBuf>) -> Result<ResolverPolicy> {
    println!("Validating policy...");

    let policy = ResolverPolicy::load_or_default(path).context("Failed to load policy")?;
    policy.validate().context("Policy validation failed")?;

    println!("{}", "✓ Policy is valid".green());

    Ok(policy)
}

pub fn generate(output: &Path, with_examples: bool) -> Result<()> {
    if with_examples {
        std::fs::write(output, POLICY_WITH_EXAMPLES)
            .with_context(|| format!("Failed to write policy to {:?}", output))?;
    } else {
        ResolverPolicy::default()
            .to_yaml_file(output)
            .with_context(|| format!("Failed to write policy to {:?}", output))?;
    }

    println!(
        "{}",
        format!("✓ Policy generated: {}", output.display()).green()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use keyresolver_core::{PolicyError, Protocol, Validity};

    #[test]
    fn test_template_matches_defaults() {
        let policy = ResolverPolicy::from_yaml_str(POLICY_WITH_EXAMPLES).unwrap();
        assert_eq!(policy, ResolverPolicy::default());
        assert_eq!(policy.minimum_validity, Validity::Marginal);
    }

    #[test]
    fn test_generate_then_validate() {
        let dir = tempfile::tempdir().unwrap();
        for examples in [false, true] {
            let path = dir.path().join(format!("policy-{examples}.yaml"));
            generate(&path, examples).unwrap();
            let policy = validate(Some(path)).unwrap();
            assert!(policy.encrypt);
            assert!(policy.allow_mixed);
        }
    }

    #[test]
    fn test_validate_reports_contradictions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("policy.yaml");
        std::fs::write(&path, "forced_protocol: openpgp\npreferred_protocol: cms\n").unwrap();

        let err = validate(Some(path)).unwrap_err();
        assert_eq!(
            err.downcast_ref::<PolicyError>(),
            Some(&PolicyError::PreferenceContradictsForced {
                forced: Protocol::OpenPgp,
                preferred: Protocol::Cms,
            })
        );
    }

    #[test]
    fn test_validate_missing_explicit_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(validate(Some(dir.path().join("absent.yaml"))).is_err());
    }
}
