// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Flat per-object attribute cache.

use std::collections::BTreeMap;
use std::path::Path;

use regex::Regex;
use tracing::{debug, error};
use understory_store::{EntryFilter, OpenMode, Store, StoreExt, StoreOptions};

use crate::error::Result;
use crate::layout::{self, ATTRIBUTES, OBJECTS, headers};
use crate::payload::{self, Payload};

/// Attributes keyed by object id, with no hierarchy between objects.
///
/// Object ids are single entry names: non-empty and without `/`.
pub struct AttributeCache {
    store: Box<dyn Store>,
}

impl core::fmt::Debug for AttributeCache {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AttributeCache")
            .field("store", &self.store)
            .finish()
    }
}

impl AttributeCache {
    /// Open the cache file at `path` with default store options.
    pub fn open(path: impl AsRef<Path>, mode: OpenMode) -> Result<Self> {
        Self::open_with(path, mode, &StoreOptions::default())
    }

    /// Open the cache file at `path`.
    pub fn open_with(path: impl AsRef<Path>, mode: OpenMode, options: &StoreOptions) -> Result<Self> {
        let store = understory_store::create(path, "/", mode, options)?;
        Self::from_store(store)
    }

    /// Use an already open store.
    pub fn from_store(mut store: Box<dyn Store>) -> Result<Self> {
        layout::prepare(&mut *store, OBJECTS)?;
        debug!(mode = ?store.open_mode(), "opened attribute cache");
        Ok(Self { store })
    }

    /// Move to `/objects/<obj>`.
    fn object(&mut self, obj: &str) -> Result<()> {
        self.store.reset_root();
        self.store.navigate(OBJECTS)?;
        self.store.navigate(obj)?;
        Ok(())
    }

    /// Move to `/objects/<obj>/attributes`, creating it if `create`.
    fn object_attributes(&mut self, obj: &str, create: bool) -> Result<()> {
        self.store.reset_root();
        self.store.navigate(OBJECTS)?;
        if create {
            self.store.mkdir(obj)?;
        }
        self.store.navigate(obj)?;
        if create {
            self.store.mkdir(ATTRIBUTES)?;
        }
        self.store.navigate(ATTRIBUTES)?;
        Ok(())
    }

    /// Write the attribute `attr` of `obj`, creating the object if needed.
    pub fn write(&mut self, obj: &str, attr: &str, value: &Payload) -> Result<()> {
        self.object_attributes(obj, true)?;
        payload::save(&mut *self.store, attr, value)
    }

    /// Read the attribute `attr` of `obj`.
    pub fn read(&mut self, obj: &str, attr: &str) -> Result<Payload> {
        self.object_attributes(obj, false)?;
        payload::load(&mut *self.store, attr)
    }

    /// Every attribute of `obj`, by name.
    pub fn read_object(&mut self, obj: &str) -> Result<BTreeMap<String, Payload>> {
        self.object(obj)?;
        if !self.store.has_entry(ATTRIBUTES) {
            return Ok(BTreeMap::new());
        }
        self.store.navigate(ATTRIBUTES)?;
        layout::read_all(&mut *self.store)
    }

    /// Write the header `name`.
    pub fn write_header(&mut self, name: &str, value: &Payload) -> Result<()> {
        headers::write(&mut *self.store, name, value)
    }

    /// Read the header `name`.
    pub fn read_header(&mut self, name: &str) -> Result<Payload> {
        headers::read(&mut *self.store, name)
    }

    /// Every header, by name.
    pub fn read_headers(&mut self) -> Result<BTreeMap<String, Payload>> {
        headers::read_all(&mut *self.store)
    }

    /// Header names, sorted.
    pub fn headers(&mut self) -> Result<Vec<String>> {
        headers::names(&mut *self.store)
    }

    /// Object ids, sorted.
    pub fn objects(&mut self) -> Result<Vec<String>> {
        self.store.reset_root();
        self.store.navigate(OBJECTS)?;
        Ok(layout::payload_names(&*self.store, &EntryFilter::directories()))
    }

    /// Attribute names of `obj`, sorted.
    pub fn attributes(&mut self, obj: &str) -> Result<Vec<String>> {
        self.attribute_names(obj, &EntryFilter::directories())
    }

    /// Attribute names of `obj` in which `pattern` finds a match.
    pub fn attributes_matching(&mut self, obj: &str, pattern: &Regex) -> Result<Vec<String>> {
        self.attribute_names(obj, &EntryFilter::directories().and_name(pattern.clone()))
    }

    fn attribute_names(&mut self, obj: &str, filter: &EntryFilter) -> Result<Vec<String>> {
        self.object(obj)?;
        if !self.store.has_entry(ATTRIBUTES) {
            return Ok(Vec::new());
        }
        self.store.navigate(ATTRIBUTES)?;
        Ok(layout::payload_names(&*self.store, filter))
    }

    /// True if `obj` exists.
    pub fn contains(&mut self, obj: &str) -> bool {
        self.object(obj).is_ok()
    }

    /// True if `obj` exists and has the attribute `attr`.
    pub fn contains_attribute(&mut self, obj: &str, attr: &str) -> bool {
        self.object_attributes(obj, false).is_ok() && self.store.has_entry(attr)
    }

    /// Delete the attribute `attr` of `obj`.
    pub fn remove(&mut self, obj: &str, attr: &str) -> Result<()> {
        self.object_attributes(obj, false)?;
        self.store.remove(attr)?;
        Ok(())
    }

    /// Delete `obj` and all of its attributes.
    pub fn remove_object(&mut self, obj: &str) -> Result<()> {
        self.store.reset_root();
        self.store.navigate(OBJECTS)?;
        self.store.remove(obj)?;
        debug!(obj, "removed object");
        Ok(())
    }

    /// Delete the header `name`.
    pub fn remove_header(&mut self, name: &str) -> Result<()> {
        headers::remove(&mut *self.store, name)
    }

    /// Flush the underlying store.
    pub fn flush(&mut self) -> Result<()> {
        self.store.flush()?;
        Ok(())
    }
}

impl Drop for AttributeCache {
    fn drop(&mut self) {
        if self.store.writable()
            && let Err(e) = self.flush()
        {
            error!(error = %e, "failed to flush attribute cache on drop");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use understory_store::{MemoryStore, StoreError};

    use crate::error::SceneError;

    fn cache() -> AttributeCache {
        let store = MemoryStore::new("/", OpenMode::WRITE).unwrap();
        AttributeCache::from_store(Box::new(store)).unwrap()
    }

    #[test]
    fn objects_are_flat() {
        let mut c = cache();
        c.write("obj2", "a", &Payload::string("x")).unwrap();
        c.write("obj1", "b", &Payload::string("y")).unwrap();
        c.write("obj1", "a", &Payload::string("z")).unwrap();
        assert_eq!(c.objects().unwrap(), ["obj1", "obj2"]);
        assert_eq!(c.attributes("obj1").unwrap(), ["a", "b"]);
        assert_eq!(c.read("obj1", "a").unwrap().as_str(), Some("z"));
        assert_eq!(c.read_object("obj1").unwrap().len(), 2);
        assert!(c.write("a/b", "x", &Payload::string("")).is_err());
    }

    #[test]
    fn removal() {
        let mut c = cache();
        c.write("o", "a", &Payload::string("1")).unwrap();
        c.write("o", "b", &Payload::string("2")).unwrap();
        c.remove("o", "a").unwrap();
        assert!(!c.contains_attribute("o", "a"));
        assert!(c.contains_attribute("o", "b"));
        c.remove_object("o").unwrap();
        assert!(!c.contains("o"));
        assert!(matches!(
            c.read("o", "b"),
            Err(SceneError::Store(StoreError::NotFound(_)))
        ));
    }
}
