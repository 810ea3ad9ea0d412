// /////////////////////////////////////////////////////////////////////////////
// Blogcast
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Type-safe job identifier.
//!
//! The id is opaque and assigned by the external record store on create
//! (§4.1); the domain never mints one itself, it only wraps whatever string
//! the store handed back so it cannot be confused with a [`SourceUrl`] or any
//! other `String`-shaped field.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JobId(String);

impl JobId {
    /// Wraps a record-store-assigned id. Rejects empty strings since an
    /// empty id can never be a valid store reference.
    pub fn new(raw: impl Into<String>) -> Result<Self, crate::JobError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(crate::JobError::validation("job id must not be empty"));
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for JobId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_id() {
        assert!(JobId::new("").is_err());
        assert!(JobId::new("   ").is_err());
    }

    #[test]
    fn round_trips_through_display() {
        let id = JobId::new("job_01J").unwrap();
        assert_eq!(id.to_string(), "job_01J");
        assert_eq!(id.as_str(), "job_01J");
    }
}
