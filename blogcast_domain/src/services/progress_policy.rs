// /////////////////////////////////////////////////////////////////////////////
// Blogcast
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Pure band-translation arithmetic for §4.8: a stage's local `(done,
//! total)` callback is rebased onto its slice of the global percentage
//! range so that progress never dips when a later stage's first callback
//! reports `(0, total)`.

use crate::value_objects::{Progress, StageKind};

/// `band_start + (done/total) * (band_end - band_start)`, clamped to the
/// stage's own band. `total == 0` is treated as "stage just started",
/// returning the band start.
pub fn translate(stage: StageKind, done: u64, total: u64) -> Progress {
    let (start, end) = stage.band();
    if total == 0 {
        return Progress::new(start as u32).expect("band start is always <= 100");
    }
    let fraction = (done as f64 / total as f64).clamp(0.0, 1.0);
    let pct = start as f64 + fraction * (end as f64 - start as f64);
    Progress::clamped(pct.clamp(start as f64, end as f64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_of_band_at_zero_done() {
        assert_eq!(translate(StageKind::Audio, 0, 10).value(), 20);
    }

    #[test]
    fn end_of_band_at_done_equals_total() {
        assert_eq!(translate(StageKind::Audio, 10, 10).value(), 55);
    }

    #[test]
    fn midpoint_of_band() {
        // Slides band is 55..80, a 25-point span; halfway is 67 or 68
        // depending on rounding, but must stay inside the band either way.
        let pct = translate(StageKind::Slides, 1, 2).value();
        assert!((55..=80).contains(&pct));
    }

    #[test]
    fn zero_total_reports_band_start() {
        assert_eq!(translate(StageKind::Video, 0, 0).value(), 80);
    }

    #[test]
    fn overshooting_done_clamps_to_band_end() {
        assert_eq!(translate(StageKind::Script, 5, 4).value(), 20);
    }
}
