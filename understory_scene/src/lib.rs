// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_scene --heading-base-level=0

//! Understory Scene: a hierarchical scene cache with lazily maintained bounds.
//!
//! [`SceneCache`] stores a tree of named nodes in an [`understory_store`] store.
//! Each node carries opaque attributes ([`Payload`]) and at most one of a
//! transform ([`glam::Mat4`]) or a [`Shape`]. Every node also has an
//! axis-aligned [`Box3`] bound that covers its shape and its children, mapped
//! through its own transform.
//!
//! Bounds are not recomputed on write. Writes mark the touched nodes dirty in a
//! [`TreeGraphDependency`](understory_dependency::TreeGraphDependency), and a
//! bound query recomputes only the stale nodes below the queried one, children
//! before parents. A node whose bound changes marks its parent, so staleness
//! travels upward exactly as far as it has to.
//!
//! [`AttributeCache`] is the flat variant: objects keyed by id, each with
//! attributes, and no hierarchy or bounds.
//!
//! # Example
//!
//! ```rust
//! use glam::{Mat4, Vec3};
//! use understory_scene::{Box3, Payload, SceneCache, Shape};
//! use understory_store::OpenMode;
//!
//! understory_store::init_default_backends();
//! let mut cache = SceneCache::open("scene.mem", OpenMode::WRITE).unwrap();
//!
//! let sphere = Shape::new(
//!     Box3::new(Vec3::splat(-1.0), Vec3::splat(1.0)),
//!     Payload::new("SpherePrimitive", 1, vec![0_u8; 4]),
//! );
//! cache.write_transform("/geo", Mat4::from_translation(Vec3::Z)).unwrap();
//! cache.write_shape("/geo/sphere", &sphere).unwrap();
//! cache.write_attribute("/geo", "label", &Payload::string("planet")).unwrap();
//!
//! let b = cache.bound("/").unwrap();
//! assert_eq!(b, Box3::new(Vec3::new(-1.0, -1.0, 0.0), Vec3::new(1.0, 1.0, 2.0)));
//! assert!(cache.is_transform("/geo").unwrap());
//! ```
//!
//! ## Store layout
//!
//! Node `/a/b` lives at `/children/a/children/b` in the store, next to its
//! `attributes`, `boundingBox`, and either `transformMatrix` or `shape`.
//! Headers live in `/headers`. Every writable cache records the fields of
//! [`header::generate`]: library version, host, user and creation time, plus
//! whatever registered generators add.

pub mod attribute_cache;
pub mod bound;
pub mod cache;
pub mod error;
pub mod header;
pub mod kind;
mod layout;
pub mod path;
pub mod payload;

pub use attribute_cache::AttributeCache;
pub use bound::Box3;
pub use cache::SceneCache;
pub use error::{Result, SceneError};
pub use kind::NodeKind;
pub use path::{IntoScenePath, ScenePath};
pub use payload::{Payload, Shape};

pub use glam;
