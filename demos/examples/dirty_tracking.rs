// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The dependency engine on its own.
//!
//! Mark a few nodes of a path tree dirty and watch the order in which an
//! update visits them: children first, each node once.
//!
//! Run:
//! - `cargo run -p understory_demos --example dirty_tracking`

use understory_dependency::{MarkDirty, TreeGraphDependency};
use understory_scene::ScenePath;

fn main() {
    let mut deps = TreeGraphDependency::new();
    for p in ["/a/b/c", "/a", "/d", "/a/b/e"] {
        deps.set_dirty(ScenePath::parse(p).unwrap());
    }
    let listed: Vec<String> = deps.iter().map(ToString::to_string).collect();
    println!("dirty list: {listed:?}");

    let mut visited = Vec::new();
    let mut compute = |node: &ScenePath, dirty: &mut dyn MarkDirty<ScenePath>| -> Result<(), ()> {
        visited.push(node.to_string());
        if let Some(parent) = node.parent() {
            dirty.set_dirty(parent);
        }
        Ok(())
    };
    deps.update(&ScenePath::parse("/a").unwrap(), &mut compute).unwrap();
    println!("update(/a) visited: {visited:?}");

    let left: Vec<String> = deps.iter().map(ToString::to_string).collect();
    println!("still dirty: {left:?}");
}
