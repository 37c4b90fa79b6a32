// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error type shared by every store backend.

use thiserror::Error;

/// Errors reported by [`Store`](crate::Store) handles and the backend registry.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No backend is registered for the file extension.
    #[error("no store backend registered for extension {0:?}")]
    UnsupportedFormat(String),

    /// A mutating call was issued on a handle opened for reading.
    #[error("store is not writable: {0}")]
    PermissionDenied(String),

    /// The named entry, directory, or file does not exist.
    #[error("entry not found: {0}")]
    NotFound(String),

    /// The entry exists but is of the wrong kind for the operation,
    /// for example a data read on a directory or an array read on a scalar.
    #[error("wrong entry kind: {0}")]
    WrongEntryKind(String),

    /// An argument was rejected, for example contradictory open-mode flags.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A directory cannot be created over an existing data entry.
    #[error("entry already exists: {0}")]
    AlreadyExists(String),

    /// The cursor is already at the mount root and cannot move up.
    #[error("cursor is at the mount root")]
    AtMountRoot,

    /// A persisted snapshot failed validation.
    #[error("corrupt store file: {0}")]
    Corrupt(String),

    /// Underlying I/O failure.
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot encoding or decoding failure.
    #[error("store encoding error: {0}")]
    Encoding(#[from] bincode::Error),

    /// Options could not be parsed.
    #[error("invalid store options: {0}")]
    Options(#[from] toml::de::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T, E = StoreError> = core::result::Result<T, E>;
