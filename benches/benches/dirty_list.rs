// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use understory_dependency::{MarkDirty, TreeGraphDependency};
use understory_scene::ScenePath;

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
    fn below(&mut self, n: u64) -> u64 {
        self.next_u64() % n
    }
}

/// Random node paths in a tree of the given fan-out and maximum depth.
fn gen_paths(count: usize, fan_out: u64, depth: u64, seed: u64) -> Vec<ScenePath> {
    let mut rng = Rng::new(seed);
    (0..count)
        .map(|_| {
            let mut p = ScenePath::root();
            for _ in 0..=rng.below(depth) {
                p = p.join(&format!("n{}", rng.below(fan_out))).unwrap();
            }
            p
        })
        .collect()
}

fn propagate(node: &ScenePath, dirty: &mut dyn MarkDirty<ScenePath>) -> Result<(), ()> {
    if let Some(parent) = node.parent() {
        dirty.set_dirty(parent);
    }
    Ok(())
}

fn bench_set_dirty(c: &mut Criterion) {
    let mut group = c.benchmark_group("set_dirty");
    for &n in &[256usize, 1024, 4096] {
        let paths = gen_paths(n, 8, 6, 0x5eed);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(format!("random_n{}", n), |b| {
            b.iter_batched(
                TreeGraphDependency::<ScenePath>::new,
                |mut deps| {
                    for p in paths.iter().cloned() {
                        deps.set_dirty(p);
                    }
                    black_box(deps.len());
                },
                BatchSize::SmallInput,
            )
        });
        let mut sorted = paths.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        group.bench_function(format!("descending_with_hint_n{}", n), |b| {
            b.iter_batched(
                TreeGraphDependency::<ScenePath>::new,
                |mut deps| {
                    let mut hint = 0;
                    for p in sorted.iter().cloned() {
                        hint = deps.set_dirty_from(hint, p);
                    }
                    black_box(deps.len());
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn bench_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("update");
    for &n in &[256usize, 1024, 4096] {
        let paths = gen_paths(n, 8, 6, 0xfeed);
        let mut deps = TreeGraphDependency::new();
        for p in paths.iter().cloned() {
            deps.set_dirty(p);
        }
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(format!("update_all_propagating_n{}", n), |b| {
            b.iter_batched(
                || deps.clone(),
                |mut deps| {
                    deps.update_all(&mut propagate).unwrap();
                    black_box(deps.is_empty());
                },
                BatchSize::SmallInput,
            )
        });
        let subtree = ScenePath::parse("/n3").unwrap();
        group.bench_function(format!("update_subtree_n{}", n), |b| {
            b.iter_batched(
                || deps.clone(),
                |mut deps| {
                    deps.update(&subtree, &mut propagate).unwrap();
                    black_box(deps.len());
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, bench_set_dirty, bench_update);
criterion_main!(benches);
