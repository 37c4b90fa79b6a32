// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Open modes for store handles.

use crate::error::{Result, StoreError};

bitflags::bitflags! {
    /// How a store handle accesses its medium.
    ///
    /// [`WRITE`](Self::WRITE) or [`APPEND`](Self::APPEND) (never both) makes a handle
    /// writable, and [`READ`](Self::READ) may accompany either. Exactly one of
    /// [`SHARED`](Self::SHARED) and [`EXCLUSIVE`](Self::EXCLUSIVE) selects the sharing policy.
    /// Use [`OpenMode::validate`] to fill in the defaults and reject contradictions.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct OpenMode: u8 {
        /// Read-only access. Every mutation fails with [`StoreError::PermissionDenied`].
        const READ      = 0b0000_0001;
        /// Create or truncate. Existing contents below the mount root are discarded.
        const WRITE     = 0b0000_0010;
        /// Open existing contents (if any) for reading and writing.
        const APPEND    = 0b0000_0100;
        /// Other handles may access the same medium.
        const SHARED    = 0b0000_1000;
        /// This handle expects to be the only one accessing the medium.
        const EXCLUSIVE = 0b0001_0000;
    }
}

impl Default for OpenMode {
    fn default() -> Self {
        Self::READ | Self::SHARED
    }
}

impl OpenMode {
    const ACCESS: Self = Self::READ.union(Self::WRITE).union(Self::APPEND);
    const SHARING: Self = Self::SHARED.union(Self::EXCLUSIVE);

    /// Normalize the mode and reject contradictory flags.
    ///
    /// - No access flag implies [`READ`](Self::READ).
    /// - No sharing flag implies [`SHARED`](Self::SHARED).
    /// - [`WRITE`](Self::WRITE) with [`APPEND`](Self::APPEND), or both sharing flags, is an
    ///   [`InvalidArgument`](StoreError::InvalidArgument).
    pub fn validate(self) -> Result<Self> {
        let mut mode = self;
        if (mode & Self::ACCESS).is_empty() {
            mode |= Self::READ;
        } else if mode.contains(Self::WRITE | Self::APPEND) {
            return Err(StoreError::InvalidArgument(
                "open mode cannot both truncate and append".to_owned(),
            ));
        }
        let sharing = mode & Self::SHARING;
        if sharing.is_empty() {
            mode |= Self::SHARED;
        } else if sharing == Self::SHARING {
            return Err(StoreError::InvalidArgument(
                "open mode cannot be both shared and exclusive".to_owned(),
            ));
        }
        Ok(mode)
    }

    /// True if the mode permits mutation.
    pub fn is_writable(self) -> bool {
        self.intersects(Self::WRITE | Self::APPEND)
    }

    /// True if existing contents are preserved when opening.
    pub fn preserves_contents(self) -> bool {
        !self.contains(Self::WRITE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_in() {
        assert_eq!(OpenMode::empty().validate().unwrap(), OpenMode::READ | OpenMode::SHARED);
        assert_eq!(
            OpenMode::WRITE.validate().unwrap(),
            OpenMode::WRITE | OpenMode::SHARED
        );
        assert_eq!(
            OpenMode::EXCLUSIVE.validate().unwrap(),
            OpenMode::READ | OpenMode::EXCLUSIVE
        );
    }

    #[test]
    fn contradictions_are_rejected() {
        for bad in [
            OpenMode::WRITE | OpenMode::APPEND,
            OpenMode::READ | OpenMode::WRITE | OpenMode::APPEND,
            OpenMode::SHARED | OpenMode::EXCLUSIVE,
        ] {
            assert!(
                matches!(bad.validate(), Err(StoreError::InvalidArgument(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn read_combines_with_write_and_append() {
        let rw = (OpenMode::READ | OpenMode::WRITE).validate().unwrap();
        assert_eq!(rw, OpenMode::READ | OpenMode::WRITE | OpenMode::SHARED);
        assert!(rw.is_writable());
        assert!(!rw.preserves_contents());

        let ra = (OpenMode::READ | OpenMode::APPEND | OpenMode::EXCLUSIVE)
            .validate()
            .unwrap();
        assert_eq!(ra, OpenMode::READ | OpenMode::APPEND | OpenMode::EXCLUSIVE);
        assert!(ra.is_writable());
        assert!(ra.preserves_contents());

        let rs = (OpenMode::READ | OpenMode::SHARED).validate().unwrap();
        assert_eq!(rs, OpenMode::READ | OpenMode::SHARED);
        assert!(!rs.is_writable());
    }

    #[test]
    fn writability() {
        assert!(!OpenMode::READ.is_writable());
        assert!(OpenMode::WRITE.is_writable());
        assert!(OpenMode::APPEND.is_writable());
        assert!(OpenMode::APPEND.preserves_contents());
        assert!(!OpenMode::WRITE.preserves_contents());
    }
}
