// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Single-file snapshot backend.
//!
//! The whole medium is held in a [`MemoryStore`] and written to disk as one
//! `bincode` snapshot: a 4-byte magic tag, a format version, then the tree.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write as _};
use std::path::{Path, PathBuf};

use tracing::{debug, error};

use super::memory::{MemoryStore, SnapshotDir};
use crate::error::{Result, StoreError};
use crate::filter::EntryFilter;
use crate::mode::OpenMode;
use crate::options::StoreOptions;
use crate::store::Store;
use crate::types::{Data, Entry, EntryId};

const MAGIC: [u8; 4] = *b"UST\0";
const FORMAT_VERSION: u32 = 1;

/// Store persisted to a single snapshot file.
///
/// - [`OpenMode::WRITE`] starts from an empty medium and replaces the file.
/// - [`OpenMode::APPEND`] loads the file if it exists.
/// - [`OpenMode::READ`] requires the file.
///
/// Writable handles save on [`Store::flush`], and when dropped with changes
/// made since the last save. Registered under the `ust` extension.
pub struct FileStore {
    inner: MemoryStore,
    file: PathBuf,
    options: StoreOptions,
    unsaved: bool,
}

impl core::fmt::Debug for FileStore {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FileStore")
            .field("file", &self.file)
            .field("unsaved", &self.unsaved)
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}

impl FileStore {
    /// Open `file` and mount the handle at `root`.
    pub fn open(
        file: impl AsRef<Path>,
        root: &str,
        mode: OpenMode,
        options: &StoreOptions,
    ) -> Result<Self> {
        let file = file.as_ref().to_path_buf();
        let mode = mode.validate()?;
        let contents = if mode.contains(OpenMode::WRITE) {
            SnapshotDir::default()
        } else if file.exists() {
            load(&file)?
        } else if mode.is_writable() {
            SnapshotDir::default()
        } else {
            return Err(StoreError::NotFound(file.display().to_string()));
        };
        debug!(file = %file.display(), ?mode, "opened file store");
        Ok(Self {
            inner: MemoryStore::with_contents(contents, root, mode)?,
            file,
            options: options.clone(),
            // Truncation and mount directories must reach the file too.
            unsaved: mode.is_writable(),
        })
    }

    /// Path of the snapshot file.
    pub fn file(&self) -> &Path {
        &self.file
    }

    fn save(&self) -> Result<()> {
        if self.options.create_parent_dirs
            && let Some(parent) = self.file.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.file.with_extension("ust.tmp");
        {
            let f = File::create(&tmp)?;
            let mut w = BufWriter::new(f);
            bincode::serialize_into(&mut w, &MAGIC)?;
            bincode::serialize_into(&mut w, &FORMAT_VERSION)?;
            bincode::serialize_into(&mut w, &self.inner.snapshot())?;
            w.flush()?;
            if self.options.sync_on_flush {
                w.get_ref().sync_all()?;
            }
        }
        fs::rename(&tmp, &self.file)?;
        debug!(file = %self.file.display(), "saved snapshot");
        Ok(())
    }
}

fn load(file: &Path) -> Result<SnapshotDir> {
    let mut r = BufReader::new(File::open(file)?);
    let magic: [u8; 4] = bincode::deserialize_from(&mut r)
        .map_err(|_| StoreError::Corrupt(format!("{}: truncated header", file.display())))?;
    if magic != MAGIC {
        return Err(StoreError::Corrupt(format!(
            "{}: not a store snapshot",
            file.display()
        )));
    }
    let version: u32 = bincode::deserialize_from(&mut r)
        .map_err(|_| StoreError::Corrupt(format!("{}: truncated header", file.display())))?;
    if version != FORMAT_VERSION {
        return Err(StoreError::Corrupt(format!(
            "{}: unsupported format version {version}",
            file.display()
        )));
    }
    Ok(bincode::deserialize_from(&mut r)?)
}

impl Drop for FileStore {
    fn drop(&mut self) {
        if self.unsaved
            && let Err(e) = self.save()
        {
            error!(file = %self.file.display(), error = %e, "failed to save store on drop");
        }
    }
}

impl Store for FileStore {
    fn open_mode(&self) -> OpenMode {
        self.inner.open_mode()
    }

    fn path(&self) -> String {
        self.inner.path()
    }

    fn current_entry_id(&self) -> EntryId {
        self.inner.current_entry_id()
    }

    fn navigate(&mut self, name: &str) -> Result<()> {
        self.inner.navigate(name)
    }

    fn up(&mut self) -> Result<()> {
        self.inner.up()
    }

    fn reset_root(&mut self) {
        self.inner.reset_root();
    }

    fn mkdir(&mut self, name: &str) -> Result<()> {
        self.inner.mkdir(name)?;
        self.unsaved = true;
        Ok(())
    }

    fn list(&self, filter: &EntryFilter) -> Vec<Entry> {
        self.inner.list(filter)
    }

    fn entry(&self, name: &str) -> Result<Entry> {
        self.inner.entry(name)
    }

    fn has_entry(&self, name: &str) -> bool {
        self.inner.has_entry(name)
    }

    fn read(&self, name: &str) -> Result<Data> {
        self.inner.read(name)
    }

    fn write(&mut self, name: &str, data: Data) -> Result<()> {
        self.inner.write(name, data)?;
        self.unsaved = true;
        Ok(())
    }

    fn remove(&mut self, name: &str) -> Result<()> {
        self.inner.remove(name)?;
        self.unsaved = true;
        Ok(())
    }

    fn remove_all(&mut self) -> Result<()> {
        self.inner.remove_all()?;
        self.unsaved = true;
        Ok(())
    }

    /// Save the snapshot if anything changed since the last save.
    fn flush(&mut self) -> Result<()> {
        if self.unsaved {
            self.save()?;
            self.unsaved = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreExt;

    #[test]
    fn write_read_append_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("cache.ust");
        let opts = StoreOptions::default();

        {
            let mut s = FileStore::open(&path, "/", OpenMode::WRITE, &opts).unwrap();
            s.mkdir("a").unwrap();
            s.navigate("a").unwrap();
            s.write_array("v", vec![1_i64, 2, 3]).unwrap();
        }
        {
            let mut s = FileStore::open(&path, "/a", OpenMode::READ, &opts).unwrap();
            assert_eq!(s.read_array::<i64>("v").unwrap(), [1, 2, 3]);
            assert!(matches!(
                s.write_scalar("w", 1_i8),
                Err(StoreError::PermissionDenied(_))
            ));
        }
        {
            let mut s = FileStore::open(&path, "/", OpenMode::APPEND, &opts).unwrap();
            s.write_scalar("top", 7_u16).unwrap();
            s.flush().unwrap();
        }
        let s = FileStore::open(&path, "/", OpenMode::READ, &opts).unwrap();
        assert!(s.has_entry("a"));
        assert_eq!(s.read_scalar::<u16>("top").unwrap(), 7);
    }

    #[test]
    fn write_truncates_existing_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.ust");
        let opts = StoreOptions::default();
        {
            let mut s = FileStore::open(&path, "/", OpenMode::WRITE, &opts).unwrap();
            s.write_scalar("old", 1_u8).unwrap();
        }
        {
            let _s = FileStore::open(&path, "/", OpenMode::WRITE, &opts).unwrap();
        }
        let s = FileStore::open(&path, "/", OpenMode::READ, &opts).unwrap();
        assert!(!s.has_entry("old"));
    }

    #[test]
    fn only_unsaved_changes_are_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("once.ust");
        let opts = StoreOptions::default();

        let mut s = FileStore::open(&path, "/", OpenMode::WRITE, &opts).unwrap();
        s.write_scalar("x", 1_u8).unwrap();
        s.flush().unwrap();
        assert!(path.exists());
        fs::remove_file(&path).unwrap();
        // Clean: neither a second flush nor the drop touches the file.
        s.flush().unwrap();
        drop(s);
        assert!(!path.exists());

        let mut s = FileStore::open(&path, "/", OpenMode::READ | OpenMode::APPEND, &opts).unwrap();
        s.flush().unwrap();
        fs::remove_file(&path).unwrap();
        s.write_scalar("y", 2_u8).unwrap();
        drop(s);
        let s = FileStore::open(&path, "/", OpenMode::READ, &opts).unwrap();
        assert_eq!(s.read_scalar::<u8>("y").unwrap(), 2);
        assert!(!s.has_entry("x"));
    }

    #[test]
    fn missing_and_foreign_files() {
        let dir = tempfile::tempdir().unwrap();
        let opts = StoreOptions::default();
        assert!(matches!(
            FileStore::open(dir.path().join("none.ust"), "/", OpenMode::READ, &opts),
            Err(StoreError::NotFound(_))
        ));

        let junk = dir.path().join("junk.ust");
        fs::write(&junk, b"definitely not a snapshot").unwrap();
        assert!(matches!(
            FileStore::open(&junk, "/", OpenMode::READ, &opts),
            Err(StoreError::Corrupt(_))
        ));
    }
}
