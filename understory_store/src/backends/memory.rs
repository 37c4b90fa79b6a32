// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory backend: an arena of directory slots with a free list.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{Result, StoreError};
use crate::filter::EntryFilter;
use crate::mode::OpenMode;
use crate::store::{Store, check_name, ensure_writable};
use crate::types::{Data, Entry, EntryId};

const MEDIUM_ROOT: usize = 0;

#[derive(Clone, Debug)]
enum Slot {
    Dir(usize),
    Data(Data),
}

#[derive(Clone, Debug)]
struct Dir {
    name: EntryId,
    parent: Option<usize>,
    entries: BTreeMap<EntryId, Slot>,
}

impl Dir {
    fn new(name: EntryId, parent: Option<usize>) -> Self {
        Self {
            name,
            parent,
            entries: BTreeMap::new(),
        }
    }
}

/// Tree form of a store's contents, used for persistence.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub(crate) struct SnapshotDir {
    entries: BTreeMap<EntryId, SnapshotNode>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
enum SnapshotNode {
    Dir(SnapshotDir),
    Data(Data),
}

/// Store whose contents live only as long as the handle.
///
/// Registered under the `mem` extension by
/// [`init_default_backends`](crate::init_default_backends). A handle opened with
/// [`OpenMode::READ`] sees an empty store.
///
/// ```
/// use understory_store::{EntryFilter, MemoryStore, OpenMode, Store, StoreExt};
///
/// let mut store = MemoryStore::new("/", OpenMode::WRITE).unwrap();
/// store.mkdir("sub").unwrap();
/// store.navigate("sub").unwrap();
/// store.write_scalar("answer", 42_i32).unwrap();
/// assert_eq!(store.read_scalar::<i32>("answer").unwrap(), 42);
/// store.up().unwrap();
/// assert_eq!(store.list(&EntryFilter::default()).len(), 1);
/// ```
pub struct MemoryStore {
    mode: OpenMode,
    dirs: Vec<Option<Dir>>, // slots
    free_list: Vec<usize>,
    mount: usize,
    cursor: usize,
}

impl core::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let total = self.dirs.len();
        let alive = self.dirs.iter().filter(|d| d.is_some()).count();
        f.debug_struct("MemoryStore")
            .field("mode", &self.mode)
            .field("dirs_total", &total)
            .field("dirs_alive", &alive)
            .field("free_list", &self.free_list.len())
            .field("path", &self.path())
            .finish_non_exhaustive()
    }
}

impl MemoryStore {
    /// Open an empty store mounted at `root`.
    ///
    /// Writable modes create the mount directories; in read mode any mount
    /// root other than `/` is [`NotFound`](StoreError::NotFound).
    pub fn new(root: &str, mode: OpenMode) -> Result<Self> {
        Self::with_contents(SnapshotDir::default(), root, mode)
    }

    pub(crate) fn with_contents(contents: SnapshotDir, root: &str, mode: OpenMode) -> Result<Self> {
        let mode = mode.validate()?;
        let mut store = Self {
            mode,
            dirs: vec![Some(Dir::new("/".to_owned(), None))],
            free_list: Vec::new(),
            mount: MEDIUM_ROOT,
            cursor: MEDIUM_ROOT,
        };
        store.import(MEDIUM_ROOT, contents);
        store.mount = store.mount_at(root)?;
        store.cursor = store.mount;
        Ok(store)
    }

    /// Whole medium in tree form, independent of the mount root and cursor.
    pub(crate) fn snapshot(&self) -> SnapshotDir {
        self.export(MEDIUM_ROOT)
    }

    fn mount_at(&mut self, root: &str) -> Result<usize> {
        let mut slot = MEDIUM_ROOT;
        for seg in root.split('/').filter(|s| !s.is_empty()) {
            check_name(seg)?;
            slot = match self.dir(slot).entries.get(seg) {
                Some(Slot::Dir(child)) => *child,
                Some(Slot::Data(_)) => {
                    return Err(StoreError::WrongEntryKind(format!(
                        "mount root {root}: {seg} is a data entry"
                    )));
                }
                None if self.mode.is_writable() => self.alloc_child(slot, seg),
                None => return Err(StoreError::NotFound(format!("mount root {root}"))),
            };
        }
        Ok(slot)
    }

    fn dir(&self, slot: usize) -> &Dir {
        self.dirs[slot].as_ref().expect("dangling directory slot")
    }

    fn dir_mut(&mut self, slot: usize) -> &mut Dir {
        self.dirs[slot].as_mut().expect("dangling directory slot")
    }

    fn alloc_child(&mut self, parent: usize, name: &str) -> usize {
        let dir = Dir::new(name.to_owned(), Some(parent));
        let slot = if let Some(slot) = self.free_list.pop() {
            self.dirs[slot] = Some(dir);
            slot
        } else {
            self.dirs.push(Some(dir));
            self.dirs.len() - 1
        };
        self.dir_mut(parent)
            .entries
            .insert(name.to_owned(), Slot::Dir(slot));
        slot
    }

    fn free_subtree(&mut self, slot: usize) {
        let mut stack = vec![slot];
        while let Some(s) = stack.pop() {
            if let Some(dir) = self.dirs[s].take() {
                stack.extend(dir.entries.values().filter_map(|e| match e {
                    Slot::Dir(child) => Some(*child),
                    Slot::Data(_) => None,
                }));
                self.free_list.push(s);
            }
        }
    }

    fn import(&mut self, slot: usize, contents: SnapshotDir) {
        for (name, node) in contents.entries {
            match node {
                SnapshotNode::Data(data) => {
                    self.dir_mut(slot).entries.insert(name, Slot::Data(data));
                }
                SnapshotNode::Dir(sub) => {
                    let child = self.alloc_child(slot, &name);
                    self.import(child, sub);
                }
            }
        }
    }

    fn export(&self, slot: usize) -> SnapshotDir {
        let entries = self
            .dir(slot)
            .entries
            .iter()
            .map(|(name, e)| {
                let node = match e {
                    Slot::Dir(child) => SnapshotNode::Dir(self.export(*child)),
                    Slot::Data(data) => SnapshotNode::Data(data.clone()),
                };
                (name.clone(), node)
            })
            .collect();
        SnapshotDir { entries }
    }

    fn describe(name: &str, slot: &Slot) -> Entry {
        match slot {
            Slot::Dir(_) => Entry::directory(name),
            Slot::Data(data) => Entry::file(name, data),
        }
    }

    fn qualified(&self, name: &str) -> String {
        let path = self.path();
        if path == "/" {
            format!("/{name}")
        } else {
            format!("{path}/{name}")
        }
    }
}

impl Store for MemoryStore {
    fn open_mode(&self) -> OpenMode {
        self.mode
    }

    fn path(&self) -> String {
        let mut names = Vec::new();
        let mut slot = self.cursor;
        while slot != self.mount {
            let dir = self.dir(slot);
            names.push(dir.name.as_str());
            match dir.parent {
                Some(p) => slot = p,
                None => break,
            }
        }
        names.reverse();
        format!("/{}", names.join("/"))
    }

    fn current_entry_id(&self) -> EntryId {
        self.dir(self.cursor).name.clone()
    }

    fn navigate(&mut self, name: &str) -> Result<()> {
        check_name(name)?;
        match self.dir(self.cursor).entries.get(name) {
            Some(Slot::Dir(child)) => {
                self.cursor = *child;
                trace!(path = %self.path(), "navigate");
                Ok(())
            }
            Some(Slot::Data(_)) => Err(StoreError::WrongEntryKind(format!(
                "{} is a data entry",
                self.qualified(name)
            ))),
            None => Err(StoreError::NotFound(self.qualified(name))),
        }
    }

    fn up(&mut self) -> Result<()> {
        if self.cursor == self.mount {
            return Err(StoreError::AtMountRoot);
        }
        self.cursor = self.dir(self.cursor).parent.unwrap_or(self.mount);
        Ok(())
    }

    fn reset_root(&mut self) {
        self.cursor = self.mount;
    }

    fn mkdir(&mut self, name: &str) -> Result<()> {
        ensure_writable(self.mode, "mkdir")?;
        check_name(name)?;
        match self.dir(self.cursor).entries.get(name) {
            Some(Slot::Dir(_)) => Ok(()),
            Some(Slot::Data(_)) => Err(StoreError::AlreadyExists(self.qualified(name))),
            None => {
                self.alloc_child(self.cursor, name);
                debug!(path = %self.qualified(name), "mkdir");
                Ok(())
            }
        }
    }

    fn list(&self, filter: &EntryFilter) -> Vec<Entry> {
        self.dir(self.cursor)
            .entries
            .iter()
            .map(|(name, slot)| Self::describe(name, slot))
            .filter(|e| filter.accepts(e))
            .collect()
    }

    fn entry(&self, name: &str) -> Result<Entry> {
        self.dir(self.cursor)
            .entries
            .get(name)
            .map(|slot| Self::describe(name, slot))
            .ok_or_else(|| StoreError::NotFound(self.qualified(name)))
    }

    fn has_entry(&self, name: &str) -> bool {
        self.dir(self.cursor).entries.contains_key(name)
    }

    fn read(&self, name: &str) -> Result<Data> {
        match self.dir(self.cursor).entries.get(name) {
            Some(Slot::Data(data)) => Ok(data.clone()),
            Some(Slot::Dir(_)) => Err(StoreError::WrongEntryKind(format!(
                "{} is a directory",
                self.qualified(name)
            ))),
            None => Err(StoreError::NotFound(self.qualified(name))),
        }
    }

    fn write(&mut self, name: &str, data: Data) -> Result<()> {
        ensure_writable(self.mode, "write")?;
        check_name(name)?;
        if let Some(Slot::Dir(_)) = self.dir(self.cursor).entries.get(name) {
            return Err(StoreError::WrongEntryKind(format!(
                "cannot write data over directory {}",
                self.qualified(name)
            )));
        }
        let cursor = self.cursor;
        self.dir_mut(cursor)
            .entries
            .insert(name.to_owned(), Slot::Data(data));
        Ok(())
    }

    fn remove(&mut self, name: &str) -> Result<()> {
        ensure_writable(self.mode, "remove")?;
        let cursor = self.cursor;
        match self.dir_mut(cursor).entries.remove(name) {
            Some(Slot::Dir(slot)) => {
                self.free_subtree(slot);
                debug!(path = %self.qualified(name), "removed directory");
                Ok(())
            }
            Some(Slot::Data(_)) => Ok(()),
            None => Err(StoreError::NotFound(self.qualified(name))),
        }
    }

    fn remove_all(&mut self) -> Result<()> {
        ensure_writable(self.mode, "remove_all")?;
        let cursor = self.cursor;
        let entries = core::mem::take(&mut self.dir_mut(cursor).entries);
        for slot in entries.into_values() {
            if let Slot::Dir(s) = slot {
                self.free_subtree(s);
            }
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreExt;
    use crate::types::EntryType;

    fn names(store: &MemoryStore, filter: &EntryFilter) -> Vec<String> {
        store.list(filter).iter().map(|e| e.id().to_owned()).collect()
    }

    #[test]
    fn mkdir_navigate_and_list_sorted() {
        let mut s = MemoryStore::new("/", OpenMode::WRITE).unwrap();
        s.mkdir("b").unwrap();
        s.mkdir("a").unwrap();
        s.write_scalar("c", 1.5_f32).unwrap();
        assert_eq!(names(&s, &EntryFilter::default()), ["a", "b", "c"]);
        assert_eq!(names(&s, &EntryFilter::directories()), ["a", "b"]);
        assert_eq!(names(&s, &EntryFilter::files()), ["c"]);

        s.navigate("a").unwrap();
        assert_eq!(s.path(), "/a");
        assert_eq!(s.current_entry_id(), "a");
        s.up().unwrap();
        assert_eq!(s.path(), "/");
        assert!(matches!(s.up(), Err(StoreError::AtMountRoot)));
    }

    #[test]
    fn mkdir_is_idempotent_but_not_over_data() {
        let mut s = MemoryStore::new("/", OpenMode::WRITE).unwrap();
        s.mkdir("d").unwrap();
        s.mkdir("d").unwrap();
        s.write_scalar("x", 1_u8).unwrap();
        assert!(matches!(s.mkdir("x"), Err(StoreError::AlreadyExists(_))));
        assert!(matches!(
            s.write_scalar("d", 1_u8),
            Err(StoreError::WrongEntryKind(_))
        ));
        assert!(matches!(s.read("d"), Err(StoreError::WrongEntryKind(_))));
        assert!(matches!(s.navigate("x"), Err(StoreError::WrongEntryKind(_))));
        assert!(matches!(s.navigate("nope"), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn typed_reads_check_layout() {
        let mut s = MemoryStore::new("/", OpenMode::WRITE).unwrap();
        s.write_array("bound", vec![0.0_f32, 1.0, 2.0]).unwrap();
        s.write_scalar("n", 3_u32).unwrap();

        assert!(matches!(
            s.read_scalar::<f32>("bound"),
            Err(StoreError::WrongEntryKind(_))
        ));
        assert!(matches!(
            s.read_array::<u32>("n"),
            Err(StoreError::WrongEntryKind(_))
        ));

        let mut buf = [0.0_f32; 3];
        s.read_array_into("bound", &mut buf).unwrap();
        assert_eq!(buf, [0.0, 1.0, 2.0]);
        let mut short = [0.0_f32; 2];
        assert!(matches!(
            s.read_array_into("bound", &mut short),
            Err(StoreError::InvalidArgument(_))
        ));

        let e = s.entry("bound").unwrap();
        assert_eq!(e.entry_type(), EntryType::File);
        assert_eq!(e.array_length().unwrap(), 3);
    }

    #[test]
    fn read_handles_deny_mutation() {
        let mut s = MemoryStore::new("/", OpenMode::READ).unwrap();
        assert!(matches!(s.mkdir("a"), Err(StoreError::PermissionDenied(_))));
        assert!(matches!(
            s.write_scalar("a", 1_i32),
            Err(StoreError::PermissionDenied(_))
        ));
        assert!(matches!(s.remove("a"), Err(StoreError::PermissionDenied(_))));
        assert!(matches!(s.remove_all(), Err(StoreError::PermissionDenied(_))));
        assert!(!s.writable());
        assert!(s.readable());
    }

    #[test]
    fn read_write_handles_mutate_and_read_back() {
        let mut s = MemoryStore::new("/mnt", OpenMode::READ | OpenMode::WRITE).unwrap();
        assert!(s.writable());
        s.write_scalar("n", 4_u32).unwrap();
        assert_eq!(s.read_scalar::<u32>("n").unwrap(), 4);
        assert!(MemoryStore::new("/", OpenMode::READ | OpenMode::APPEND).is_ok());
        assert!(matches!(
            MemoryStore::new("/", OpenMode::WRITE | OpenMode::APPEND),
            Err(StoreError::InvalidArgument(_))
        ));
    }

    #[test]
    fn mount_root_hides_entries_above_it() {
        let mut s = MemoryStore::new("/scene/cache", OpenMode::WRITE).unwrap();
        assert_eq!(s.path(), "/");
        assert_eq!(s.current_entry_id(), "cache");
        assert!(matches!(s.up(), Err(StoreError::AtMountRoot)));
        s.mkdir("x").unwrap();
        s.navigate_path(&["x"]).unwrap();
        assert_eq!(s.path(), "/x");

        assert!(matches!(
            MemoryStore::new("/scene", OpenMode::READ),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn navigate_path_restores_cursor_on_failure() {
        let mut s = MemoryStore::new("/", OpenMode::WRITE).unwrap();
        s.mkdir("a").unwrap();
        s.navigate("a").unwrap();
        s.mkdir("b").unwrap();
        s.reset_root();
        assert!(s.navigate_path(&["a", "b", "c"]).is_err());
        assert_eq!(s.path(), "/");
    }

    #[test]
    fn removed_slots_are_reused() {
        let mut s = MemoryStore::new("/", OpenMode::WRITE).unwrap();
        s.mkdir("a").unwrap();
        s.navigate("a").unwrap();
        s.mkdir("b").unwrap();
        s.up().unwrap();
        let before = s.dirs.len();
        s.remove("a").unwrap();
        assert_eq!(s.free_list.len(), 2);
        s.mkdir("c").unwrap();
        assert_eq!(s.dirs.len(), before);
        assert!(!s.has_entry("a"));
        assert!(matches!(s.remove("a"), Err(StoreError::NotFound(_))));

        s.remove_all().unwrap();
        assert!(s.list(&EntryFilter::default()).is_empty());
    }

    #[test]
    fn snapshot_round_trip() {
        let mut s = MemoryStore::new("/", OpenMode::WRITE).unwrap();
        s.mkdir("a").unwrap();
        s.navigate("a").unwrap();
        s.write_scalar("v", String::from("hi")).unwrap();
        let snap = s.snapshot();

        let mut t = MemoryStore::with_contents(snap.clone(), "/a", OpenMode::READ).unwrap();
        assert_eq!(t.read_scalar::<String>("v").unwrap(), "hi");
        t.reset_root();
        assert_eq!(t.snapshot(), snap);
    }
}
