// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_store --heading-base-level=0

//! Understory Store: a hierarchical, path-addressed store of typed data.
//!
//! A store is a small virtual filesystem. Every entry is either a directory or a
//! typed value: a scalar or an array of one of a closed set of primitive types
//! (see [`DataType`]). Each handle carries one cursor that moves between
//! directories with [`Store::navigate`] and [`Store::up`], and never leaves the
//! subtree below the handle's mount root.
//!
//! - Backends implement the object-safe [`Store`] trait.
//! - [`StoreExt`] adds typed reads and writes on top of the untyped [`Data`] interface.
//! - A process-wide registry maps file extensions to backend factories, so callers
//!   open stores by path with [`create`] and never name a backend type.
//!
//! Handles opened with [`OpenMode::READ`] reject every mutation with
//! [`StoreError::PermissionDenied`].
//!
//! # Example
//!
//! ```rust
//! use understory_store::{OpenMode, Store, StoreExt, StoreOptions};
//!
//! understory_store::init_default_backends();
//! let mut store =
//!     understory_store::create("scratch.mem", "/", OpenMode::WRITE, &StoreOptions::default())
//!         .unwrap();
//!
//! store.mkdir("points").unwrap();
//! store.navigate("points").unwrap();
//! store.write_array("x", vec![0.0_f32, 1.0, 2.0]).unwrap();
//!
//! let x: Vec<f32> = store.read_array("x").unwrap();
//! assert_eq!(x, [0.0, 1.0, 2.0]);
//! assert_eq!(store.path(), "/points");
//! ```
//!
//! ## Backends
//!
//! - [`MemoryStore`] (`mem`): contents live as long as the handle.
//! - [`FileStore`] (`ust`): one `bincode` snapshot file, saved on flush and on drop.
//!
//! Register additional backends with [`register_backend`].

pub mod backends;
pub mod error;
pub mod filter;
pub mod mode;
pub mod options;
pub mod registry;
pub mod store;
pub mod types;

pub use backends::{FileStore, MemoryStore};
pub use error::{Result, StoreError};
pub use filter::EntryFilter;
pub use mode::OpenMode;
pub use options::StoreOptions;
pub use registry::{
    BackendFactory, create, init_default_backends, register_backend, reset_registry,
    supported_extensions,
};
pub use store::{Store, StoreExt};
pub use types::{Data, DataType, Entry, EntryId, EntryType, Half, Primitive};
