// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The store trait and its typed helpers.

use core::fmt::Debug;

use crate::error::{Result, StoreError};
use crate::filter::EntryFilter;
use crate::mode::OpenMode;
use crate::types::{Data, Entry, EntryId, Primitive};

/// A hierarchical, path-addressed container of typed data.
///
/// Each handle owns one cursor. Names passed to the entry methods are resolved
/// relative to the cursor directory and must be single path segments.
/// The cursor never leaves the subtree below the handle's mount root.
///
/// Every mutating method fails with [`StoreError::PermissionDenied`] when the
/// handle was opened with [`OpenMode::READ`].
pub trait Store: Debug + Send {
    /// Mode the handle was opened with, after [`OpenMode::validate`].
    fn open_mode(&self) -> OpenMode;

    /// Cursor path below the mount root, `"/"` at the mount root.
    fn path(&self) -> String;

    /// Name of the cursor directory, `"/"` at the top of the medium.
    fn current_entry_id(&self) -> EntryId;

    /// Move the cursor into the child directory `name`.
    fn navigate(&mut self, name: &str) -> Result<()>;

    /// Move the cursor to the parent directory.
    ///
    /// Fails with [`StoreError::AtMountRoot`] at the mount root.
    fn up(&mut self) -> Result<()>;

    /// Move the cursor back to the mount root.
    fn reset_root(&mut self);

    /// Create the child directory `name`.
    ///
    /// Does nothing if the directory already exists, and fails with
    /// [`StoreError::AlreadyExists`] if a data entry holds that name.
    fn mkdir(&mut self, name: &str) -> Result<()>;

    /// Entries of the cursor directory accepted by `filter`, sorted by name.
    fn list(&self, filter: &EntryFilter) -> Vec<Entry>;

    /// Description of the entry `name`.
    fn entry(&self, name: &str) -> Result<Entry>;

    /// True if the cursor directory holds an entry called `name`.
    fn has_entry(&self, name: &str) -> bool;

    /// Read the data entry `name`.
    fn read(&self, name: &str) -> Result<Data>;

    /// Create or overwrite the data entry `name`.
    ///
    /// Fails with [`StoreError::WrongEntryKind`] if `name` is a directory.
    fn write(&mut self, name: &str, data: Data) -> Result<()>;

    /// Remove the entry `name`, including everything below it.
    fn remove(&mut self, name: &str) -> Result<()>;

    /// Remove every entry of the cursor directory.
    fn remove_all(&mut self) -> Result<()>;

    /// Push buffered state to the backing medium.
    fn flush(&mut self) -> Result<()>;
}

/// Typed conveniences available on every [`Store`], including `dyn Store`.
pub trait StoreExt: Store {
    /// Read a scalar of type `T`.
    fn read_scalar<T: Primitive>(&self, name: &str) -> Result<T> {
        let data = self.read(name)?;
        T::from_data(&data)
            .cloned()
            .ok_or_else(|| mismatch(name, T::DATA_TYPE, &data))
    }

    /// Read an array of `T`.
    fn read_array<T: Primitive>(&self, name: &str) -> Result<Vec<T>> {
        let data = self.read(name)?;
        T::array_from_data(&data)
            .map(<[T]>::to_vec)
            .ok_or_else(|| mismatch(name, T::DATA_TYPE.array(), &data))
    }

    /// Read an array of `T` into `dst`, which must have exactly the stored length.
    fn read_array_into<T: Primitive>(&self, name: &str, dst: &mut [T]) -> Result<()> {
        let data = self.read(name)?;
        let src =
            T::array_from_data(&data).ok_or_else(|| mismatch(name, T::DATA_TYPE.array(), &data))?;
        if src.len() != dst.len() {
            return Err(StoreError::InvalidArgument(format!(
                "{name} holds {} elements, destination has room for {}",
                src.len(),
                dst.len()
            )));
        }
        dst.clone_from_slice(src);
        Ok(())
    }

    /// Write a scalar.
    fn write_scalar<T: Primitive>(&mut self, name: &str, value: T) -> Result<()> {
        self.write(name, value.into_data())
    }

    /// Write an array.
    fn write_array<T: Primitive>(&mut self, name: &str, values: Vec<T>) -> Result<()> {
        self.write(name, T::array_into_data(values))
    }

    /// Navigate through each of `names` in turn.
    ///
    /// On failure the cursor is returned to where it started.
    fn navigate_path(&mut self, names: &[&str]) -> Result<()> {
        for (depth, name) in names.iter().enumerate() {
            if let Err(e) = self.navigate(name) {
                for _ in 0..depth {
                    self.up()?;
                }
                return Err(e);
            }
        }
        Ok(())
    }

    /// True if the handle permits reads. Every open handle does.
    fn readable(&self) -> bool {
        true
    }

    /// True if the handle permits mutation.
    fn writable(&self) -> bool {
        self.open_mode().is_writable()
    }
}

impl<S: Store + ?Sized> StoreExt for S {}

fn mismatch(name: &str, wanted: crate::types::DataType, found: &Data) -> StoreError {
    StoreError::WrongEntryKind(format!(
        "{name}: expected {wanted:?}, found {:?}",
        found.data_type()
    ))
}

/// Fail with [`StoreError::PermissionDenied`] unless `mode` permits mutation.
pub(crate) fn ensure_writable(mode: OpenMode, op: &str) -> Result<()> {
    if mode.is_writable() {
        Ok(())
    } else {
        Err(StoreError::PermissionDenied(format!(
            "{op} on a handle opened with {mode:?}"
        )))
    }
}

/// Reject names that are not a single, non-empty path segment.
pub(crate) fn check_name(name: &str) -> Result<()> {
    if name.is_empty() || name.contains('/') {
        Err(StoreError::InvalidArgument(format!(
            "entry name {name:?} must be a single non-empty segment"
        )))
    } else {
        Ok(())
    }
}
