// /////////////////////////////////////////////////////////////////////////////
// Blogcast
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! The four pipeline stages and the global progress band each owns (§4.5).

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageKind {
    Script,
    Audio,
    Slides,
    Video,
}

impl StageKind {
    pub const ORDERED: [StageKind; 4] = [
        StageKind::Script,
        StageKind::Audio,
        StageKind::Slides,
        StageKind::Video,
    ];

    /// Global percentage band `(start, end)` this stage owns.
    pub fn band(&self) -> (u8, u8) {
        match self {
            StageKind::Script => (0, 20),
            StageKind::Audio => (20, 55),
            StageKind::Slides => (55, 80),
            StageKind::Video => (80, 100),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StageKind::Script => "script",
            StageKind::Audio => "audio",
            StageKind::Slides => "slides",
            StageKind::Video => "video",
        }
    }

    pub fn parse(raw: &str) -> Option<StageKind> {
        match raw {
            "script" => Some(StageKind::Script),
            "audio" => Some(StageKind::Audio),
            "slides" => Some(StageKind::Slides),
            "video" => Some(StageKind::Video),
            _ => None,
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bands_tile_the_full_range_without_gaps() {
        let mut prev_end = 0u8;
        for stage in StageKind::ORDERED {
            let (start, end) = stage.band();
            assert_eq!(start, prev_end);
            prev_end = end;
        }
        assert_eq!(prev_end, 100);
    }

    #[test]
    fn round_trips_through_str() {
        for stage in StageKind::ORDERED {
            assert_eq!(StageKind::parse(stage.as_str()), Some(stage));
        }
    }
}
