// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use glam::{Mat4, Vec3};
use understory_scene::{Box3, Payload, SceneCache, Shape};
use understory_store::{MemoryStore, OpenMode};

/// `groups` transforms under the root, each holding `leaves` unit shapes.
fn build(groups: usize, leaves: usize) -> SceneCache {
    let store = MemoryStore::new("/", OpenMode::WRITE).unwrap();
    let mut cache = SceneCache::from_store(Box::new(store)).unwrap();
    let shape = Shape::new(
        Box3::new(Vec3::ZERO, Vec3::ONE),
        Payload::new("Box", 1, vec![0_u8; 16]),
    );
    for g in 0..groups {
        let group = format!("/g{g}");
        cache
            .write_transform(group.as_str(), Mat4::from_translation(Vec3::X * g as f32))
            .unwrap();
        for l in 0..leaves {
            cache
                .write_shape((format!("s{l}").as_str(), group.as_str()), &shape)
                .unwrap();
        }
    }
    cache
}

fn bench_bounds(c: &mut Criterion) {
    let mut group = c.benchmark_group("scene_bounds");
    for &(groups, leaves) in &[(8usize, 8usize), (16, 32)] {
        group.throughput(Throughput::Elements((groups * leaves) as u64));
        group.bench_function(format!("cold_root_bound_{}x{}", groups, leaves), |b| {
            b.iter_batched(
                || build(groups, leaves),
                |mut cache| black_box(cache.bound("/").unwrap()),
                BatchSize::LargeInput,
            )
        });

        let mut warm = build(groups, leaves);
        warm.flush().unwrap();
        let moved = Shape::new(
            Box3::new(Vec3::ZERO, Vec3::splat(2.0)),
            Payload::new("Box", 1, vec![1_u8; 16]),
        );
        group.bench_function(format!("single_leaf_edit_{}x{}", groups, leaves), |b| {
            b.iter(|| {
                warm.write_shape("/g0/s0", &moved).unwrap();
                black_box(warm.bound("/").unwrap())
            })
        });
        group.bench_function(format!("clean_query_{}x{}", groups, leaves), |b| {
            b.iter(|| black_box(warm.bound("/").unwrap()))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_bounds);
criterion_main!(benches);
