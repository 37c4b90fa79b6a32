// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Flat attribute cache.
//!
//! Store per-object attributes and filter attribute names by regex.
//!
//! Run:
//! - `cargo run -p understory_demos --example attribute_cache`

use regex::Regex;
use understory_scene::{AttributeCache, Payload};
use understory_store::OpenMode;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
    understory_store::init_default_backends();

    let mut cache = AttributeCache::open("attributes.mem", OpenMode::WRITE).unwrap();
    for (obj, frame) in [("rock", 1.0_f32), ("rock", 2.0), ("tree", 1.0)] {
        let attr = format!("P.frame{frame}");
        cache
            .write(obj, &attr, &Payload::new("Float", 1, frame.to_le_bytes()))
            .unwrap();
    }
    cache
        .write("tree", "material", &Payload::string("bark"))
        .unwrap();

    let positions = Regex::new(r"^P\.").unwrap();
    for obj in cache.objects().unwrap() {
        println!(
            "{obj}: all={:?} positions={:?}",
            cache.attributes(&obj).unwrap(),
            cache.attributes_matching(&obj, &positions).unwrap()
        );
    }
    println!(
        "tree material: {:?}",
        cache.read("tree", "material").unwrap().as_str()
    );
}
