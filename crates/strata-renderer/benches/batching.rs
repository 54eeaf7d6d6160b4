//! Benchmarks: batch manager throughput per rect routing path.
//!
//! Run with: cargo bench --package strata-renderer

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use strata_core::{Color, DeviceCapabilities, Rect};
use strata_renderer::{BatchConfig, HeadlessDevice, RenderBatchManager};

// ── Scene generators ──

/// Grid of small tiles, like a workspace overview.
fn gen_tiles(count: usize) -> Vec<(Rect, Color)> {
    (0..count)
        .map(|i| {
            let x = (i % 100) as f32 * 12.0;
            let y = (i / 100) as f32 * 12.0;
            let shade = (i % 7) as f32 / 7.0;
            (Rect::new(x, y, 10.0, 10.0), Color::new(shade, 0.4, 1.0 - shade, 0.9))
        })
        .collect()
}

fn run_session(device: &mut HeadlessDevice, manager: &mut RenderBatchManager, tiles: &[(Rect, Color)]) {
    manager.begin_batch();
    for (rect, color) in tiles {
        manager.add_rect(device, *rect, *color, 4.0, 2.0);
    }
    manager.end_batch(device);
}

fn bench_rect_paths(c: &mut Criterion) {
    let paths: &[(&str, bool, bool)] = &[
        ("instanced", true, true),
        ("batched", true, false),
        ("immediate", false, false),
    ];

    for &(name, optimized, instancing) in paths {
        let mut group = c.benchmark_group(format!("rect_batch/{}", name));
        for &count in &[100usize, 1_000, 10_000] {
            let tiles = gen_tiles(count);
            let config = BatchConfig {
                auto_flush: false,
                optimized_rects: optimized,
                instancing,
                ..BatchConfig::default()
            };
            let mut device = HeadlessDevice::with_capabilities(DeviceCapabilities {
                instancing,
                live_blur: false,
            });
            let log = device.log();
            let mut manager = RenderBatchManager::new(config);
            manager.init(&mut device).unwrap();

            group.throughput(Throughput::Elements(count as u64));
            group.bench_with_input(BenchmarkId::from_parameter(count), &tiles, |b, tiles| {
                b.iter(|| {
                    log.clear();
                    run_session(&mut device, &mut manager, black_box(tiles));
                });
            });
            manager.release(&mut device);
        }
        group.finish();
    }
}

fn bench_mixed_keys(c: &mut Criterion) {
    let tiles = gen_tiles(5_000);
    let mut device = HeadlessDevice::new();
    let log = device.log();
    let mut manager = RenderBatchManager::new(BatchConfig::default());
    manager.init(&mut device).unwrap();

    c.bench_function("rect_batch/mixed_round_16_keys", |b| {
        b.iter(|| {
            log.clear();
            manager.begin_batch();
            for (i, (rect, color)) in tiles.iter().enumerate() {
                let round = (i % 16) as f32;
                manager.add_rect(&mut device, *rect, *color, round, 2.0);
            }
            manager.end_batch(&mut device);
        });
    });
    manager.release(&mut device);
}

criterion_group!(benches, bench_rect_paths, bench_mixed_keys);
criterion_main!(benches);
