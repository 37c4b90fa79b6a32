// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Order-agnostic dirty list and the compute callback traits.

use alloc::vec::Vec;

/// Handle through which a [`Compute`] callback marks further nodes dirty.
pub trait MarkDirty<K> {
    /// Mark `node` dirty. No-op if it already is.
    fn set_dirty(&mut self, node: K);

    /// True if `node` is currently dirty.
    fn get_dirty(&self, node: &K) -> bool;
}

/// Recomputes the value held for one node.
///
/// Engines call this for each dirty node they clean. A node is only cleaned
/// when `compute` succeeds; on error it stays dirty and the error is returned
/// to the caller of `update`.
pub trait Compute<K> {
    /// Failure reported by [`compute`](Self::compute).
    type Error;

    /// Recompute `node`. Nodes that depend on it may be marked through `dirty`.
    fn compute(&mut self, node: &K, dirty: &mut dyn MarkDirty<K>) -> Result<(), Self::Error>;
}

impl<K, E, F> Compute<K> for F
where
    F: FnMut(&K, &mut dyn MarkDirty<K>) -> Result<(), E>,
{
    type Error = E;

    fn compute(&mut self, node: &K, dirty: &mut dyn MarkDirty<K>) -> Result<(), E> {
        self(node, dirty)
    }
}

/// Dirty list with no knowledge of how nodes relate.
///
/// Nodes are recomputed in the order they were marked.
#[derive(Clone, Debug)]
pub struct GraphDependency<K> {
    dirty: Vec<K>,
}

impl<K> Default for GraphDependency<K> {
    fn default() -> Self {
        Self { dirty: Vec::new() }
    }
}

impl<K: Clone + PartialEq> GraphDependency<K> {
    /// Create an empty dirty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `node` dirty. Returns false if it already was.
    pub fn set_dirty(&mut self, node: K) -> bool {
        if self.dirty.contains(&node) {
            return false;
        }
        self.dirty.push(node);
        true
    }

    /// True if `node` is dirty.
    pub fn get_dirty(&self, node: &K) -> bool {
        self.dirty.contains(node)
    }

    /// Number of dirty nodes.
    pub fn len(&self) -> usize {
        self.dirty.len()
    }

    /// True if nothing is dirty.
    pub fn is_empty(&self) -> bool {
        self.dirty.is_empty()
    }

    /// Dirty nodes in recompute order.
    pub fn iter(&self) -> impl Iterator<Item = &K> + '_ {
        self.dirty.iter()
    }

    /// Drop `node` from the list without computing it. Returns false if it was clean.
    pub fn clear_node(&mut self, node: &K) -> bool {
        match self.dirty.iter().position(|k| k == node) {
            Some(at) => {
                self.dirty.remove(at);
                true
            }
            None => false,
        }
    }

    /// Drop every node without computing.
    pub fn clear(&mut self) {
        self.dirty.clear();
    }

    /// Recompute dirty nodes front to back until none remain.
    ///
    /// A callback that keeps re-marking a node it computes never terminates.
    pub fn update<C: Compute<K> + ?Sized>(&mut self, compute: &mut C) -> Result<(), C::Error> {
        while let Some(node) = self.dirty.first().cloned() {
            compute.compute(&node, self)?;
            self.clear_node(&node);
        }
        Ok(())
    }
}

impl<K: Clone + PartialEq> MarkDirty<K> for GraphDependency<K> {
    fn set_dirty(&mut self, node: K) {
        Self::set_dirty(self, node);
    }

    fn get_dirty(&self, node: &K) -> bool {
        Self::get_dirty(self, node)
    }
}
