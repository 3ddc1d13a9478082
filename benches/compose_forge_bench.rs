// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Benchmarks for assembly and port resolution over the builtin catalog

use compose_forge::assembler::assemble;
use compose_forge::catalog::Catalog;
use compose_forge::resolver::resolve;
use compose_forge::types::Settings;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn bench_pipeline(c: &mut Criterion) {
    let catalog = Catalog::builtin().expect("builtin catalog");
    let tools = catalog.tools();
    let settings = Settings::default();
    let draft = assemble(tools, &settings, false);

    c.bench_function("assemble_all", |b| {
        b.iter(|| assemble(black_box(tools), black_box(&settings), true));
    });
    c.bench_function("resolve_all", |b| {
        b.iter(|| resolve(black_box(&draft)));
    });
}

criterion_group!(benches, bench_pipeline);
criterion_main!(benches);
