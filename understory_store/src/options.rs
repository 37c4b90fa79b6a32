// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend configuration.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Settings passed to backend factories by [`create`](crate::create).
///
/// Backends ignore settings that do not apply to them.
///
/// ```
/// use understory_store::StoreOptions;
///
/// let opts = StoreOptions::from_toml_str("sync_on_flush = true").unwrap();
/// assert!(opts.sync_on_flush);
/// assert!(opts.create_parent_dirs);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreOptions {
    /// Call `fsync` after every snapshot write.
    pub sync_on_flush: bool,
    /// Create missing filesystem directories above a snapshot file before writing it.
    pub create_parent_dirs: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            sync_on_flush: false,
            create_parent_dirs: true,
        }
    }
}

impl StoreOptions {
    /// Parse options from TOML. Missing keys take their defaults.
    pub fn from_toml_str(src: &str) -> Result<Self> {
        Ok(toml::from_str(src)?)
    }
}
