// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! What a scene node holds.

use glam::Mat4;
use understory_store::{Store, StoreExt};

use crate::error::Result;
use crate::layout::{SHAPE, TRANSFORM};
use crate::payload::{Shape, load_shape};

/// Content of a node, read once per query.
///
/// A node holds at most one of a transform and a shape. The root is always
/// [`Untyped`](Self::Untyped).
#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    /// The node places its children with this matrix.
    Transform(Mat4),
    /// The node is a leaf renderable.
    Shape(Shape),
    /// Neither: a plain grouping node, or the root.
    Untyped,
}

impl NodeKind {
    /// True for [`Transform`](Self::Transform).
    pub fn is_transform(&self) -> bool {
        matches!(self, Self::Transform(_))
    }

    /// True for [`Shape`](Self::Shape).
    pub fn is_shape(&self) -> bool {
        matches!(self, Self::Shape(_))
    }

    /// The transform matrix, if any.
    pub fn transform(&self) -> Option<&Mat4> {
        match self {
            Self::Transform(m) => Some(m),
            _ => None,
        }
    }

    /// The shape, if any.
    pub fn shape(&self) -> Option<&Shape> {
        match self {
            Self::Shape(s) => Some(s),
            _ => None,
        }
    }

    /// Read the kind of the node at the store cursor.
    pub(crate) fn read(store: &mut dyn Store) -> Result<Self> {
        if store.has_entry(TRANSFORM) {
            let mut cols = [0.0_f32; 16];
            store.read_array_into(TRANSFORM, &mut cols)?;
            Ok(Self::Transform(Mat4::from_cols_array(&cols)))
        } else if store.has_entry(SHAPE) {
            Ok(Self::Shape(load_shape(store, SHAPE)?))
        } else {
            Ok(Self::Untyped)
        }
    }
}
