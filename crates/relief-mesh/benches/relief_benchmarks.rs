//! Benchmarks for relief-mesh stages.
//!
//! Run with: cargo bench -p relief-mesh
//!
//! To compare against baseline:
//! 1. First run: cargo bench -p relief-mesh -- --save-baseline main
//! 2. After changes: cargo bench -p relief-mesh -- --baseline main

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use relief_mesh::distance::{DEFAULT_Z_CUT, chamfer_sweep, edge_distance};
use relief_mesh::fillet::compose_fillet;
use relief_mesh::skeleton::seed_skeleton;
use relief_mesh::{Grid, MeshBuilder, ReliefPipeline, SolidExporter};

// =============================================================================
// Test Heightmaps
// =============================================================================

/// Two overlapping disks on a flat canvas.
fn create_heightmap(size: u32) -> Grid {
    let s = f64::from(size);
    Grid::from_fn(size, size, |x, y| {
        let (x, y) = (f64::from(x), f64::from(y));
        let a = ((x - 0.4 * s).powi(2) + (y - 0.5 * s).powi(2)).sqrt() < 0.25 * s;
        let b = ((x - 0.65 * s).powi(2) + (y - 0.45 * s).powi(2)).sqrt() < 0.2 * s;
        if a || b { 220.0 } else { 0.0 }
    })
    .unwrap()
}

const SIZES: [u32; 3] = [64, 128, 256];

// =============================================================================
// Stages
// =============================================================================

fn bench_distance(c: &mut Criterion) {
    let mut group = c.benchmark_group("edge_distance");
    for size in SIZES {
        let raw = create_heightmap(size);
        group.throughput(Throughput::Elements(raw.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &raw, |b, raw| {
            b.iter(|| edge_distance(black_box(raw), DEFAULT_Z_CUT))
        });
    }
    group.finish();
}

fn bench_fillet(c: &mut Criterion) {
    let mut group = c.benchmark_group("compose_fillet");
    for size in SIZES {
        let raw = create_heightmap(size);
        let edge = edge_distance(&raw, DEFAULT_Z_CUT);
        let mut ridge = seed_skeleton(&raw, &edge).unwrap();
        chamfer_sweep(&mut ridge);
        group.throughput(Throughput::Elements(raw.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| compose_fillet(black_box(&raw), &edge, &ridge, 1.0).unwrap())
        });
    }
    group.finish();
}

fn bench_mesh(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_mesh");
    for size in SIZES {
        let heights = ReliefPipeline::new(create_heightmap(size))
            .run()
            .unwrap()
            .fillet
            .heights;
        for walls in [false, true] {
            let id = format!("{size}/walls={walls}");
            group.bench_with_input(BenchmarkId::from_parameter(id), &heights, |b, h| {
                b.iter(|| MeshBuilder::new(black_box(h)).side_walls(walls).build())
            });
        }
    }
    group.finish();
}

fn bench_export(c: &mut Criterion) {
    let mut group = c.benchmark_group("export_stl");
    for size in [64u32, 128] {
        let output = ReliefPipeline::new(create_heightmap(size)).run().unwrap();
        let coords = output.flat_coords();
        let exporter = SolidExporter::for_mesh(&output.mesh);
        group.throughput(Throughput::Elements(output.mesh.triangle_count() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &coords, |b, coords| {
            b.iter(|| exporter.to_text(black_box(coords)).unwrap())
        });
    }
    group.finish();
}

fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");
    group.sample_size(20);
    for size in SIZES {
        let raw = create_heightmap(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &raw, |b, raw| {
            b.iter(|| ReliefPipeline::new(raw.clone()).side_walls(true).run().unwrap())
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_distance,
    bench_fillet,
    bench_mesh,
    bench_export,
    bench_pipeline
);
criterion_main!(benches);
