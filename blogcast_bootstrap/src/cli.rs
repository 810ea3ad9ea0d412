// /////////////////////////////////////////////////////////////////////////////
// Blogcast
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Command-Line Interface Module
//!
//! Bootstrap-layer CLI handling with security-first design.
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │  1. parse_cli()                     │  Parse CLI with clap
//! └─────────────────┬───────────────────┘
//!                   ↓
//! ┌─────────────────────────────────────┐
//! │  2. validate_cli()                  │  Security validation
//! └─────────────────┬───────────────────┘
//!                   ↓
//! ┌─────────────────────────────────────┐
//! │  3. ValidatedCli                    │  Safe, validated config
//! └─────────────────────────────────────┘
//! ```
//!
//! The binary runs as one of two roles (§2, §6.6): `api` accepts
//! submissions and serves status/download; `worker` drains the queue and
//! runs the four pipeline stages. A single process may run both for small
//! deployments.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while validating already-parsed CLI arguments.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid value for --{arg}: {reason}")]
    InvalidValue { arg: String, reason: String },

    #[error("path traversal or unsafe pattern in argument: {0}")]
    UnsafePath(String),
}

/// Minimal security validation for path-shaped and free-form string
/// arguments, independent of clap's own parsing.
pub struct SecureArgParser;

impl SecureArgParser {
    /// Rejects NUL bytes and `..` path-traversal segments in a free-form
    /// string argument (pipeline names, bind addresses, log levels).
    pub fn validate_argument(value: &str) -> Result<(), ParseError> {
        if value.contains('\0') {
            return Err(ParseError::UnsafePath(value.to_string()));
        }
        if value.split(['/', '\\']).any(|segment| segment == "..") {
            return Err(ParseError::UnsafePath(value.to_string()));
        }
        Ok(())
    }

    /// Validates a filesystem path argument, returning the path unchanged
    /// on success. Does not require the path to already exist - both
    /// `--config` and `--data-root` may point at not-yet-created
    /// locations.
    pub fn validate_path(value: &str) -> Result<PathBuf, ParseError> {
        Self::validate_argument(value)?;
        Ok(PathBuf::from(value))
    }
}

/// Which half of the service this process runs (§2, §6.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Role {
    /// HTTP submission, status, and download endpoints (§6.1).
    Api,
    /// Queue-draining worker pool running the four pipeline stages (§6.6).
    Worker,
    /// Both roles in a single process, for small deployments.
    Both,
}

#[derive(Debug, Parser)]
#[command(name = "blogcast", version, about = "Blog-to-video job orchestrator")]
pub struct Cli {
    /// Which role this process plays.
    #[arg(long, value_enum)]
    pub role: Role,

    /// Path to the service configuration file (§4.9). Falls back to
    /// environment variables and built-in defaults when omitted.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Root directory for downloaded videos and working files.
    #[arg(long)]
    pub data_root: Option<PathBuf>,

    /// Address the API role binds to, e.g. `0.0.0.0:8080`.
    #[arg(long)]
    pub bind_addr: Option<String>,

    /// Worker concurrency override (§4.9 `max_concurrent_jobs`).
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Verbose (debug-level) logging.
    #[arg(short, long)]
    pub verbose: bool,
}

/// Validated CLI configuration: all paths and values checked, ready to
/// hand to the composition root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedCli {
    pub role: Role,
    pub config: Option<PathBuf>,
    pub data_root: Option<PathBuf>,
    pub bind_addr: Option<String>,
    pub concurrency: Option<usize>,
    pub verbose: bool,
}

fn parse_cli() -> Cli {
    Cli::parse()
}

fn validate_cli(cli: Cli) -> Result<ValidatedCli, ParseError> {
    let config = match cli.config {
        Some(path) => Some(SecureArgParser::validate_path(&path.to_string_lossy())?),
        None => None,
    };

    let data_root = match cli.data_root {
        Some(path) => Some(SecureArgParser::validate_path(&path.to_string_lossy())?),
        None => None,
    };

    if let Some(ref addr) = cli.bind_addr {
        SecureArgParser::validate_argument(addr)?;
    }

    if let Some(n) = cli.concurrency {
        if n == 0 || n > 1024 {
            return Err(ParseError::InvalidValue {
                arg: "concurrency".to_string(),
                reason: "must be between 1 and 1024".to_string(),
            });
        }
    }

    Ok(ValidatedCli {
        role: cli.role,
        config,
        data_root,
        bind_addr: cli.bind_addr,
        concurrency: cli.concurrency,
        verbose: cli.verbose,
    })
}

/// Parse and validate CLI arguments in one step; the main entry point for
/// the bootstrap layer.
///
/// # Errors
///
/// Returns [`ParseError`] if any validation fails. Clap handles `--help`
/// and `--version` itself and exits the process before this is reached.
pub fn parse_and_validate() -> Result<ValidatedCli, ParseError> {
    validate_cli(parse_cli())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_path_traversal_segments() {
        assert!(SecureArgParser::validate_argument("../../etc/passwd").is_err());
    }

    #[test]
    fn accepts_ordinary_bind_address() {
        assert!(SecureArgParser::validate_argument("0.0.0.0:8080").is_ok());
    }

    #[test]
    fn rejects_zero_concurrency() {
        let cli = Cli {
            role: Role::Worker,
            config: None,
            data_root: None,
            bind_addr: None,
            concurrency: Some(0),
            verbose: false,
        };
        assert_eq!(
            validate_cli(cli),
            Err(ParseError::InvalidValue {
                arg: "concurrency".to_string(),
                reason: "must be between 1 and 1024".to_string(),
            })
        );
    }

    #[test]
    fn validates_a_minimal_api_invocation() {
        let cli = Cli {
            role: Role::Api,
            config: None,
            data_root: None,
            bind_addr: Some("127.0.0.1:3000".to_string()),
            concurrency: None,
            verbose: true,
        };
        let validated = validate_cli(cli).unwrap();
        assert_eq!(validated.role, Role::Api);
        assert!(validated.verbose);
    }
}
