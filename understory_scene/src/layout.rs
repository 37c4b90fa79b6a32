// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Entry names and helpers shared by both cache flavors.

use std::collections::BTreeMap;

use understory_store::{EntryFilter, EntryType, Store, StoreExt};

use crate::error::{Result, SceneError};
use crate::header;
use crate::payload::{self, Payload};

pub(crate) const HEADERS: &str = "headers";
pub(crate) const CHILDREN: &str = "children";
pub(crate) const OBJECTS: &str = "objects";
pub(crate) const ATTRIBUTES: &str = "attributes";
pub(crate) const BOUNDING_BOX: &str = "boundingBox";
pub(crate) const TRANSFORM: &str = "transformMatrix";
pub(crate) const SHAPE: &str = "shape";

/// Create (writable handles) or check (read handles) the top-level directories.
///
/// Writable handles also write the generated headers.
pub(crate) fn prepare(store: &mut dyn Store, container: &'static str) -> Result<()> {
    store.reset_root();
    if store.writable() {
        store.mkdir(HEADERS)?;
        store.mkdir(container)?;
        store.navigate(HEADERS)?;
        let written = header::generate()
            .iter()
            .try_for_each(|(name, value)| payload::save(store, name, value));
        store.reset_root();
        return written;
    }
    for dir in [HEADERS, container] {
        let is_dir = store
            .entry(dir)
            .is_ok_and(|e| e.entry_type() == EntryType::Directory);
        if !is_dir {
            return Err(SceneError::NotACache(dir));
        }
    }
    Ok(())
}

/// Names of the payload directories in the cursor directory.
pub(crate) fn payload_names(store: &dyn Store, filter: &EntryFilter) -> Vec<String> {
    store
        .list(filter)
        .into_iter()
        .filter(|e| e.entry_type() == EntryType::Directory)
        .map(|e| e.id().to_owned())
        .collect()
}

/// Every payload in the cursor directory, by name.
pub(crate) fn read_all(store: &mut dyn Store) -> Result<BTreeMap<String, Payload>> {
    payload_names(store, &EntryFilter::directories())
        .into_iter()
        .map(|name| payload::load(store, &name).map(|p| (name, p)))
        .collect()
}

/// Header access, identical for both cache flavors.
pub(crate) mod headers {
    use super::*;

    pub(crate) fn write(store: &mut dyn Store, name: &str, value: &Payload) -> Result<()> {
        store.reset_root();
        store.navigate(HEADERS)?;
        payload::save(store, name, value)
    }

    pub(crate) fn read(store: &mut dyn Store, name: &str) -> Result<Payload> {
        store.reset_root();
        store.navigate(HEADERS)?;
        payload::load(store, name)
    }

    pub(crate) fn read_all(store: &mut dyn Store) -> Result<BTreeMap<String, Payload>> {
        store.reset_root();
        store.navigate(HEADERS)?;
        super::read_all(store)
    }

    pub(crate) fn names(store: &mut dyn Store) -> Result<Vec<String>> {
        store.reset_root();
        store.navigate(HEADERS)?;
        Ok(payload_names(store, &EntryFilter::directories()))
    }

    pub(crate) fn remove(store: &mut dyn Store, name: &str) -> Result<()> {
        store.reset_root();
        store.navigate(HEADERS)?;
        store.remove(name)?;
        Ok(())
    }
}
