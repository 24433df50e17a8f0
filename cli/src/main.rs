// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # keyresolve
//!
//! Command-line front end for the key resolver: loads a keyring and a policy from
//! YAML, resolves signing and encryption certificates for a message and prints the
//! outcome.
//!
//! ## Commands
//!
//! - `keyresolve resolve` - Resolve keys for a sender and recipients
//! - `keyresolve policy show|validate|generate` - Policy management
//!
//! ## Exit codes
//!
//! - `0` - fully resolved (or policy command succeeded)
//! - `2` - the resolution needs disambiguation by the user
//! - `1` - any error

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

use keyresolver_cli::commands::{self, PolicyCommand, ResolveArgs};
use keyresolver_core::ResolutionStatus;

/// Resolve OpenPGP and S/MIME certificates for a message
#[derive(Parser)]
#[command(name = "keyresolve")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to policy file (overrides discovery)
    #[arg(
        short,
        long,
        global = true,
        env = "KEYRESOLVER_POLICY_PATH",
        value_name = "FILE"
    )]
    policy: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "KEYRESOLVER_LOG_LEVEL", default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve signing and encryption keys
    #[command(name = "resolve")]
    Resolve(ResolveArgs),

    /// Policy management
    #[command(name = "policy")]
    Policy {
        #[command(subcommand)]
        command: PolicyCommand,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli.log_level)?;

    match cli.command {
        Some(Commands::Resolve(args)) => {
            let status = commands::resolve::handle_command(args, cli.policy)?;
            if status == ResolutionStatus::NeedsDisambiguation {
                std::process::exit(2);
            }
            Ok(())
        }
        Some(Commands::Policy { command }) => commands::policy::handle_command(command, cli.policy),
        None => {
            eprintln!("{}", "No command specified. Use --help for usage.".yellow());
            std::process::exit(1);
        }
    }
}

/// Initialize tracing subscriber for logging
fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();

    Ok(())
}
