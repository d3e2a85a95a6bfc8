//! Benchmarks for the full segmentation pipeline.
#![expect(missing_docs, reason = "Criterion macros generate undocumented items")]

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use graphseg_benches::{
    params::ImageBenchParams,
    synthetic::{SyntheticError, SyntheticImageConfig, generate},
};
use graphseg_core::{Connectivity, SegmenterBuilder};

const SIZES: &[usize] = &[64, 128, 256];

fn segment_bench_impl(c: &mut Criterion) -> Result<(), SyntheticError> {
    let mut group = c.benchmark_group("segment");
    group.sample_size(20);

    for &size in SIZES {
        let grid = generate(&SyntheticImageConfig {
            rows: size,
            cols: size,
            tile: 16,
            noise: 6.0,
            seed: 42,
        })?;
        for connectivity in [Connectivity::Four, Connectivity::Eight] {
            let segmenter = SegmenterBuilder::new()
                .with_granularity(300.0)
                .with_min_segment_size(20)
                .with_connectivity(connectivity)
                .build()?;
            let params = ImageBenchParams {
                rows: size,
                cols: size,
                connectivity,
            };
            group.bench_with_input(BenchmarkId::from_parameter(&params), &grid, |b, grid| {
                b.iter(|| segmenter.label_grid(grid));
            });
        }
    }

    group.finish();
    Ok(())
}

fn segment_bench(c: &mut Criterion) {
    if let Err(err) = segment_bench_impl(c) {
        panic!("segment benchmark setup failed: {err}");
    }
}

criterion_group!(benches, segment_bench);
criterion_main!(benches);
