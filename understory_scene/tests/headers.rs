// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Header generators. Kept in their own test binary because the generator list is process-wide.

use std::sync::Arc;

use understory_scene::header::{self, register_header_generator, reset_header_generators};
use understory_scene::{Payload, SceneCache};
use understory_store::{MemoryStore, OpenMode};

static LOCK: parking_lot::Mutex<()> = parking_lot::const_mutex(());

fn writable() -> SceneCache {
    let store = MemoryStore::new("/", OpenMode::WRITE).unwrap();
    SceneCache::from_store(Box::new(store)).unwrap()
}

#[test]
fn registered_generators_add_and_override_fields() {
    let _g = LOCK.lock();
    reset_header_generators();
    register_header_generator(Arc::new(|| {
        vec![
            ("pipeline".to_owned(), Payload::string("lighting")),
            (header::USER.to_owned(), Payload::string("render-farm")),
        ]
    }));

    let mut c = writable();
    assert_eq!(
        c.read_header("pipeline").unwrap().as_str(),
        Some("lighting")
    );
    assert_eq!(
        c.read_header(header::USER).unwrap().as_str(),
        Some("render-farm")
    );
    assert!(c.headers().unwrap().iter().any(|h| h == header::CREATED_AT));
    reset_header_generators();
}

#[test]
fn reset_leaves_only_standard_fields() {
    let _g = LOCK.lock();
    register_header_generator(Arc::new(|| {
        vec![("pipeline".to_owned(), Payload::string("lighting"))]
    }));
    reset_header_generators();

    let mut c = writable();
    assert!(!c.headers().unwrap().iter().any(|h| h == "pipeline"));
    assert!(c.read_headers().unwrap().keys().eq(header::generate().keys()));
}

