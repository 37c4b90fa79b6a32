// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Persisting a scene.
//!
//! Write a scene to a `.ust` file with options read from TOML, then reopen it
//! read-only and read the stored bounds without recomputing anything.
//!
//! Run:
//! - `RUST_LOG=debug cargo run -p understory_demos --example scene_file`

use glam::{Mat4, Vec3};
use understory_scene::{Box3, Payload, SceneCache, Shape};
use understory_store::{OpenMode, StoreOptions};

const OPTIONS: &str = r#"
sync_on_flush = true
create_parent_dirs = true
"#;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
    understory_store::init_default_backends();

    let options = StoreOptions::from_toml_str(OPTIONS).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("nested/scene.ust");

    {
        let mut cache = SceneCache::open_with(&file, OpenMode::WRITE, &options).unwrap();
        cache
            .write_header("author", &Payload::string("scene_file demo"))
            .unwrap();
        for i in 0..4 {
            let group = format!("/row{i}");
            let offset = Vec3::new(0.0, 2.0 * i as f32, 0.0);
            cache
                .write_transform(group.as_str(), Mat4::from_translation(offset))
                .unwrap();
            let unit = Shape::new(
                Box3::new(Vec3::ZERO, Vec3::ONE),
                Payload::new("Box", 1, vec![i as u8]),
            );
            cache.write_shape(("box", group.as_str()), &unit).unwrap();
        }
        // Dropping the cache settles pending bounds and saves the file.
    }

    let mut cache = SceneCache::open(&file, OpenMode::READ).unwrap();
    println!("headers: {:?}", cache.read_headers().unwrap());
    println!("scene bound: {:?}", cache.bound("/").unwrap());
    println!("recomputed after reopen: {}", cache.recompute_count());
    assert_eq!(cache.recompute_count(), 0, "stored bounds are read back as is");
}
