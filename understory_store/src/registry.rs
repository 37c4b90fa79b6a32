// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Process-wide backend registry keyed by file extension.
//!
//! Nothing is registered implicitly. Call [`init_default_backends`] (or
//! [`register_backend`] with your own factories) before [`create`].

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::backends::{FileStore, MemoryStore};
use crate::error::{Result, StoreError};
use crate::mode::OpenMode;
use crate::options::StoreOptions;
use crate::store::Store;

/// Constructor for one backend: `(file, mount root, mode, options)`.
pub type BackendFactory =
    Arc<dyn Fn(&Path, &str, OpenMode, &StoreOptions) -> Result<Box<dyn Store>> + Send + Sync>;

static REGISTRY: RwLock<BTreeMap<String, BackendFactory>> =
    parking_lot::const_rwlock(BTreeMap::new());

fn normalize(extension: &str) -> String {
    extension.trim_start_matches('.').to_ascii_lowercase()
}

/// Register `factory` for files ending in `extension` (with or without the dot).
///
/// Returns the factory previously registered for the extension, if any.
pub fn register_backend(extension: &str, factory: BackendFactory) -> Option<BackendFactory> {
    let ext = normalize(extension);
    debug!(extension = %ext, "registering store backend");
    REGISTRY.write().insert(ext, factory)
}

fn open_memory(
    _file: &Path,
    root: &str,
    mode: OpenMode,
    _options: &StoreOptions,
) -> Result<Box<dyn Store>> {
    Ok(Box::new(MemoryStore::new(root, mode)?))
}

fn open_file(
    file: &Path,
    root: &str,
    mode: OpenMode,
    options: &StoreOptions,
) -> Result<Box<dyn Store>> {
    Ok(Box::new(FileStore::open(file, root, mode, options)?))
}

/// Register the built-in `mem` and `ust` backends unless already present.
pub fn init_default_backends() {
    let defaults: [(&str, BackendFactory); 2] =
        [("mem", Arc::new(open_memory)), ("ust", Arc::new(open_file))];
    let mut reg = REGISTRY.write();
    for (ext, factory) in defaults {
        reg.entry(ext.to_owned()).or_insert(factory);
    }
}

/// Remove every registered backend.
pub fn reset_registry() {
    REGISTRY.write().clear();
}

/// Registered extensions, sorted.
pub fn supported_extensions() -> Vec<String> {
    REGISTRY.read().keys().cloned().collect()
}

/// Open a store for `file`, choosing the backend by its extension.
///
/// Fails with [`StoreError::UnsupportedFormat`] if no backend handles the extension.
pub fn create(
    file: impl AsRef<Path>,
    root: &str,
    mode: OpenMode,
    options: &StoreOptions,
) -> Result<Box<dyn Store>> {
    let file = file.as_ref();
    let ext = file
        .extension()
        .and_then(|e| e.to_str())
        .map(normalize)
        .unwrap_or_default();
    // Clone out so the factory runs without holding the lock.
    let factory = REGISTRY
        .read()
        .get(&ext)
        .cloned()
        .ok_or_else(|| StoreError::UnsupportedFormat(ext.clone()))?;
    debug!(file = %file.display(), extension = %ext, ?mode, "creating store");
    factory(file, root, mode, options)
}
