// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Reference backends.
//!
//! - `memory`: arena of directory slots; contents die with the handle (`mem`).
//! - `file`: a memory store saved to one `bincode` snapshot file (`ust`).
//!
//! Neither is meant as a production container format. Register your own
//! factories with [`register_backend`](crate::register_backend) for that.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;
