// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_dependency --heading-base-level=0

//! Understory Dependency: lazy, dirty-list driven recomputation.
//!
//! Callers mark nodes dirty as their inputs change and ask for a node to be
//! brought up to date only when its value is needed. The engine owns nothing
//! but the dirty list; the values themselves live wherever the [`Compute`]
//! callback reads and writes them.
//!
//! - [`GraphDependency`]: insertion-ordered list for keys with no structure.
//! - [`TreeGraphDependency`]: list kept so that descendants precede ancestors,
//!   for values that depend on the values of children (bounds, aggregates).
//!
//! A callback receives a [`MarkDirty`] handle and may mark further nodes while it
//! runs, typically the parent of the node it just recomputed. Nothing else can
//! touch the list during an update, since the update holds it mutably.
//!
//! # Example
//!
//! ```rust
//! use understory_dependency::{GraphDependency, MarkDirty};
//!
//! let mut deps = GraphDependency::new();
//! deps.set_dirty(String::from("mesh"));
//! deps.set_dirty(String::from("material"));
//!
//! let mut rebuilt = Vec::new();
//! deps.update(&mut |n: &String, _: &mut dyn MarkDirty<String>| -> Result<(), ()> {
//!     rebuilt.push(n.clone());
//!     Ok(())
//! })
//! .unwrap();
//! assert_eq!(rebuilt, ["mesh", "material"]);
//! assert!(deps.is_empty());
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod graph;
pub mod tree;

pub use graph::{Compute, GraphDependency, MarkDirty};
pub use tree::{TreeGraphDependency, TreeKey};
