// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scene cache errors.

use thiserror::Error;
use understory_store::StoreError;

/// Errors reported by [`SceneCache`](crate::SceneCache) and [`AttributeCache`](crate::AttributeCache).
#[derive(Debug, Error)]
pub enum SceneError {
    /// The underlying store failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A transform was requested from a node that does not hold one.
    #[error("{0} is not a transform")]
    NotATransform(String),

    /// A shape was requested from a node that does not hold one.
    #[error("{0} is not a shape")]
    NotAShape(String),

    /// The root has no parent.
    #[error("the root node has no parent")]
    NoParent,

    /// A path or name was malformed.
    #[error("invalid path {path:?}: {reason}")]
    InvalidPath {
        /// The offending input.
        path: String,
        /// What is wrong with it.
        reason: &'static str,
    },

    /// An operation was not permitted on its target, for example a transform on the root.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The store does not hold the directories of a cache.
    #[error("not a cache: missing {0}")]
    NotACache(&'static str),

    /// A stored payload record is incomplete or has the wrong layout.
    #[error("malformed payload {0}")]
    Payload(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T, E = SceneError> = core::result::Result<T, E>;
