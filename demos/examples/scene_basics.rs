// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scene cache basics.
//!
//! Build a small scene, query bounds, edit a leaf, and query again.
//!
//! Run:
//! - `RUST_LOG=understory_scene=trace cargo run -p understory_demos --example scene_basics`

use glam::{Mat4, Vec3};
use understory_scene::{Box3, Payload, SceneCache, Shape};
use understory_store::OpenMode;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
    understory_store::init_default_backends();

    let mut cache = SceneCache::open("demo.mem", OpenMode::WRITE).unwrap();
    let sphere = |r: f32| {
        Shape::new(
            Box3::new(Vec3::splat(-r), Vec3::splat(r)),
            Payload::new("SpherePrimitive", 1, r.to_le_bytes()),
        )
    };

    // Two planets orbiting the origin, one with a moon.
    cache
        .write_transform("/earth", Mat4::from_translation(Vec3::new(10.0, 0.0, 0.0)))
        .unwrap();
    cache.write_shape("/earth/body", &sphere(1.0)).unwrap();
    cache
        .write_transform("/earth/moon", Mat4::from_translation(Vec3::new(0.0, 3.0, 0.0)))
        .unwrap();
    cache.write_shape("/earth/moon/body", &sphere(0.25)).unwrap();
    cache
        .write_transform("/mars", Mat4::from_translation(Vec3::new(-15.0, 0.0, 0.0)))
        .unwrap();
    cache.write_shape("/mars/body", &sphere(0.5)).unwrap();

    println!("pending before query: {}", cache.pending());
    println!("scene bound: {:?}", cache.bound("/").unwrap());
    println!("recomputed: {}", cache.recompute_count());

    // Only the moon's path back to the root is stale after this.
    let before = cache.recompute_count();
    cache.write_shape("/earth/moon/body", &sphere(2.0)).unwrap();
    let earth = cache.bound("/earth").unwrap();
    println!("earth bound after moon grew: {earth:?}");
    println!("recomputed for the edit: {}", cache.recompute_count() - before);
    assert!(earth.contains(Vec3::new(10.0, 5.0, 0.0)), "moon should reach y = 5");

    let moon = cache.global_transform_matrix("/earth/moon/body").unwrap();
    println!("moon origin in world space: {}", moon.transform_point3(Vec3::ZERO));

    for path in cache.objects().unwrap() {
        let kind = cache.node_kind(&path).unwrap();
        println!("{path}: transform={} shape={}", kind.is_transform(), kind.is_shape());
    }
}
