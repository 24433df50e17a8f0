// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Key resolution command
//!
//! Loads a keyring and a policy, applies the command-line adjustments and prints
//! the resolution as coloured text or JSON.

use std::fmt::Write;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use tracing::info;

use keyresolver_core::{
    InMemoryCertificateStore, KeyResolver, Keyring, OverrideProtocolHint, OverrideTable, Protocol,
    ProtocolUsage, Resolution, ResolutionStatus, ResolverPolicy, Solution,
};

#[derive(Args, Debug, Clone)]
pub struct ResolveArgs {
    /// Keyring file (YAML) with the certificates and groups to resolve against
    #[arg(short, long, value_name = "FILE")]
    pub keyring: PathBuf,

    /// Sender address; signs and, when encrypting, is also a recipient
    #[arg(short, long, value_name = "ADDR")]
    pub sender: Option<String>,

    /// Recipient address (repeatable)
    #[arg(short, long = "recipient", value_name = "ADDR")]
    pub recipients: Vec<String>,

    /// Signing key to use instead of the store's choice (repeatable)
    #[arg(long = "signing-key", value_name = "ID")]
    pub signing_keys: Vec<String>,

    /// Pin keys for a recipient; PROTO is openpgp, cms or auto (default)
    #[arg(short, long = "override", value_name = "[PROTO:]ADDR=ID[,ID...]")]
    pub overrides: Vec<OverrideArg>,

    /// Resolve signing keys
    #[arg(long)]
    pub sign: bool,

    /// Do not resolve encryption keys
    #[arg(long)]
    pub no_encrypt: bool,

    /// Restrict resolution to one protocol (openpgp, cms)
    #[arg(long, value_name = "PROTOCOL")]
    pub protocol: Option<Protocol>,

    /// Protocol to prefer when both would do (openpgp, cms)
    #[arg(long, value_name = "PROTOCOL")]
    pub prefer: Option<Protocol>,

    /// Do not combine OpenPGP and S/MIME certificates in one solution
    #[arg(long)]
    pub no_mixed: bool,

    /// Print the resolution as JSON
    #[arg(long)]
    pub json: bool,
}

impl ResolveArgs {
    /// Flags only ever tighten or redirect the loaded policy.
    pub fn apply_to(&self, policy: &mut ResolverPolicy) {
        if self.sign {
            policy.sign = true;
        }
        if self.no_encrypt {
            policy.encrypt = false;
        }
        if self.no_mixed {
            policy.allow_mixed = false;
        }
        if let Some(protocol) = self.protocol {
            policy.forced_protocol = Some(protocol);
        }
        if let Some(protocol) = self.prefer {
            policy.preferred_protocol = Some(protocol);
        }
    }

    pub fn override_table(&self) -> Result<OverrideTable> {
        let mut table = OverrideTable::new();
        for arg in &self.overrides {
            table
                .insert(arg.hint, &arg.address, arg.identifiers.iter().cloned())
                .with_context(|| format!("Invalid override address '{}'", arg.address))?;
        }
        Ok(table)
    }
}

/// One `--override` value: `[PROTO:]ADDR=ID[,ID...]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverrideArg {
    pub hint: OverrideProtocolHint,
    pub address: String,
    pub identifiers: Vec<String>,
}

impl FromStr for OverrideArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (target, ids) = s
            .split_once('=')
            .ok_or_else(|| format!("expected [PROTO:]ADDR=ID[,ID...], got '{}'", s))?;

        let (hint, address) = match target.split_once(':') {
            Some((protocol, address)) => (parse_hint(protocol)?, address.trim()),
            None => (OverrideProtocolHint::FromCertificate, target.trim()),
        };
        if address.is_empty() {
            return Err(format!("override '{}' has no address", s));
        }

        let identifiers: Vec<String> = ids
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(String::from)
            .collect();
        if identifiers.is_empty() {
            return Err(format!("override for '{}' names no key", address));
        }

        Ok(Self {
            hint,
            address: address.to_string(),
            identifiers,
        })
    }
}

fn parse_hint(s: &str) -> Result<OverrideProtocolHint, String> {
    match s.trim().to_ascii_lowercase().as_str() {
        "auto" | "any" => Ok(OverrideProtocolHint::FromCertificate),
        other => other.parse::<Protocol>().map(OverrideProtocolHint::from),
    }
}

pub fn handle_command(args: ResolveArgs, policy_path: Option<PathBuf>) -> Result<ResolutionStatus> {
    let resolution = run(&args, policy_path)?;

    if args.json {
        println!("{}", render_json(&resolution)?);
    } else {
        print!("{}", render_text(&resolution)?);
    }

    Ok(resolution.status)
}

/// Builds the resolver described by `args` and runs it once.
pub fn run(args: &ResolveArgs, policy_path: Option<PathBuf>) -> Result<Resolution> {
    let resolver = build_resolver(args, policy_path)?;
    let resolution = resolver.resolve().context("Key resolution failed")?;
    Ok(resolution)
}

pub fn build_resolver(args: &ResolveArgs, policy_path: Option<PathBuf>) -> Result<KeyResolver> {
    let keyring = Keyring::from_yaml_file(&args.keyring)?;
    let store = InMemoryCertificateStore::from_keyring(keyring)
        .with_context(|| format!("Failed to load keyring {:?}", args.keyring))?;
    info!(certificates = store.len(), "Loaded keyring");

    let mut policy = ResolverPolicy::load_or_default(policy_path).context("Failed to load policy")?;
    args.apply_to(&mut policy);
    policy.validate().context("Policy validation failed")?;

    let mut resolver = KeyResolver::new(Arc::new(store), policy);
    if let Some(sender) = &args.sender {
        resolver.set_sender(sender).context("Invalid sender")?;
    }
    resolver
        .set_recipients(&args.recipients)
        .context("Invalid recipient")?;
    resolver.set_signing_keys(args.signing_keys.iter().cloned());
    resolver.set_override_keys(args.override_table()?);

    Ok(resolver)
}

pub fn render_json(resolution: &Resolution) -> Result<String> {
    serde_json::to_string_pretty(resolution).context("Failed to serialize resolution")
}

pub fn render_text(resolution: &Resolution) -> Result<String> {
    let mut out = String::new();

    let status = match resolution.status {
        ResolutionStatus::FullyResolved => "fully resolved".green().bold(),
        ResolutionStatus::NeedsDisambiguation => "needs disambiguation".yellow().bold(),
    };
    writeln!(out, "{} {}", "Status:".bold(), status)?;
    writeln!(
        out,
        "{} {} ({})",
        "Protocol:".bold(),
        resolution.solution.protocol,
        usage_label(resolution.usage)
    )?;
    if resolution.missing_signing {
        writeln!(out, "  {}", "No acceptable signing certificate".red())?;
    }
    write_solution(&mut out, &resolution.solution)?;

    if let Some(alternative) = &resolution.alternative {
        writeln!(out)?;
        writeln!(out, "{} {}", "Alternative:".bold(), alternative.protocol)?;
        write_solution(&mut out, alternative)?;
    }

    let unresolved: Vec<_> = resolution
        .unresolved
        .iter()
        .filter(|(_, addresses)| !addresses.is_empty())
        .collect();
    if !unresolved.is_empty() {
        writeln!(out)?;
        writeln!(out, "{}", "Unresolved recipients:".bold())?;
        for (protocol, addresses) in unresolved {
            let addresses: Vec<String> = addresses.iter().map(ToString::to_string).collect();
            writeln!(out, "  {}: {}", protocol, addresses.join(", "))?;
        }
    }

    Ok(out)
}

fn write_solution(out: &mut String, solution: &Solution) -> std::fmt::Result {
    if !solution.signing_certificates.is_empty() {
        writeln!(out, "  Signing:")?;
        for cert in &solution.signing_certificates {
            writeln!(out, "    {} {}", cert.fingerprint, cert.protocol.to_string().dimmed())?;
        }
    }
    if !solution.encryption_certificates.is_empty() {
        writeln!(out, "  Encryption:")?;
        for (address, certs) in &solution.encryption_certificates {
            if certs.is_empty() {
                writeln!(out, "    {} {}", address, "(no key)".red())?;
                continue;
            }
            writeln!(out, "    {}", address)?;
            for cert in certs {
                writeln!(out, "      {} {}", cert.fingerprint, cert.protocol.to_string().dimmed())?;
            }
        }
    }
    Ok(())
}

fn usage_label(usage: ProtocolUsage) -> &'static str {
    match usage {
        ProtocolUsage::OpenPgpOnly => "OpenPGP only",
        ProtocolUsage::CmsOnly => "S/MIME only",
        ProtocolUsage::Mixed => "mixed",
    }
}
