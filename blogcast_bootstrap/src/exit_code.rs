// /////////////////////////////////////////////////////////////////////////////
// Blogcast
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Process Exit Codes
//!
//! Maps top-level failures to the BSD `sysexits.h` convention so process
//! supervisors (systemd, docker, k8s) can distinguish configuration
//! mistakes from transient failures without parsing log output.

use std::process::ExitCode as StdExitCode;

/// Unix exit codes used by the `api` and `worker` binaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Clean shutdown.
    Success,
    /// Generic failure with no more specific code.
    Failure,
    /// Command-line usage error (EX_USAGE).
    Usage,
    /// Configuration file missing or malformed (EX_CONFIG).
    Config,
    /// Could not reach a required external collaborator at startup, e.g.
    /// the record store (EX_UNAVAILABLE).
    Unavailable,
    /// Received a termination signal during graceful shutdown and the
    /// grace period expired before in-flight work finished.
    ShutdownTimedOut,
}

impl ExitCode {
    pub const fn as_u8(self) -> u8 {
        match self {
            ExitCode::Success => 0,
            ExitCode::Failure => 1,
            ExitCode::Usage => 64,
            ExitCode::Config => 78,
            ExitCode::Unavailable => 69,
            ExitCode::ShutdownTimedOut => 70,
        }
    }
}

impl From<ExitCode> for StdExitCode {
    fn from(code: ExitCode) -> Self {
        StdExitCode::from(code.as_u8())
    }
}

/// Maps a CLI parse failure to [`ExitCode::Usage`].
pub fn map_error_to_exit_code(error: &crate::cli::ParseError) -> ExitCode {
    match error {
        crate::cli::ParseError::InvalidValue { .. } => ExitCode::Usage,
        crate::cli::ParseError::UnsafePath(_) => ExitCode::Usage,
    }
}

/// Converts an application result into a process exit code, logging the
/// error (if any) before returning.
pub fn result_to_exit_code<E: std::fmt::Display>(result: Result<(), E>) -> StdExitCode {
    match result {
        Ok(()) => ExitCode::Success.into(),
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::Failure.into()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_maps_to_zero() {
        assert_eq!(ExitCode::Success.as_u8(), 0);
    }

    #[test]
    fn config_error_maps_to_sysexits_config() {
        assert_eq!(ExitCode::Config.as_u8(), 78);
    }

    #[test]
    fn parse_errors_map_to_usage() {
        let err = crate::cli::ParseError::InvalidValue {
            arg: "concurrency".to_string(),
            reason: "must be between 1 and 1024".to_string(),
        };
        assert_eq!(map_error_to_exit_code(&err), ExitCode::Usage);
    }

    #[test]
    fn ok_result_exits_cleanly() {
        let result: Result<(), String> = Ok(());
        let _code: StdExitCode = result_to_exit_code(result);
        // std::process::ExitCode has no PartialEq impl; reaching here
        // without panicking is the assertion.
    }
}
