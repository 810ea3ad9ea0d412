// /////////////////////////////////////////////////////////////////////////////
// Blogcast
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Benchmarks the per-callback band-translation arithmetic (§4.8). A
//! stage may call `ProgressSink::report` many times per second during
//! audio synthesis, so this stays on the hot path of every job.

use blogcast_domain::services::progress_policy::translate;
use blogcast_domain::value_objects::StageKind;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn bench_translate(c: &mut Criterion) {
    c.bench_function("translate_midpoint", |b| {
        b.iter(|| translate(black_box(StageKind::Audio), black_box(50), black_box(100)))
    });

    c.bench_function("translate_zero_total", |b| {
        b.iter(|| translate(black_box(StageKind::Video), black_box(0), black_box(0)))
    });

    c.bench_function("translate_across_all_stages", |b| {
        b.iter(|| {
            for stage in StageKind::ORDERED {
                black_box(translate(stage, black_box(37), black_box(113)));
            }
        })
    });
}

criterion_group!(benches, bench_translate);
criterion_main!(benches);
