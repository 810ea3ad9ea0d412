// /////////////////////////////////////////////////////////////////////////////
// Blogcast
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Submitted source URL (§3): non-empty, at most 2048 characters, write-once.

use crate::JobError;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const MAX_URL_LEN: usize = 2048;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceUrl(String);

impl SourceUrl {
    pub fn new(raw: impl Into<String>) -> Result<Self, JobError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(JobError::validation("url must not be empty"));
        }
        if trimmed.chars().count() > MAX_URL_LEN {
            return Err(JobError::validation(format!(
                "url exceeds {} characters",
                MAX_URL_LEN
            )));
        }
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(JobError::validation("url must be http(s)"));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_trimmed_http_url() {
        let url = SourceUrl::new("  https://example.com/a  ").unwrap();
        assert_eq!(url.as_str(), "https://example.com/a");
    }

    #[test]
    fn rejects_empty_and_oversized() {
        assert!(SourceUrl::new("").is_err());
        let long = format!("https://example.com/{}", "a".repeat(MAX_URL_LEN));
        assert!(SourceUrl::new(long).is_err());
    }

    #[test]
    fn rejects_non_http_scheme() {
        assert!(SourceUrl::new("ftp://example.com").is_err());
    }
}
