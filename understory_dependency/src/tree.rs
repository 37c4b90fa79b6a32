// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty list ordered so that descendants are always recomputed before their ancestors.

use alloc::vec::Vec;

use crate::graph::{Compute, MarkDirty};

/// Keys addressing nodes of a tree.
///
/// The `Ord` implementation must place every proper descendant after each of its
/// ancestors. Lexicographic order over path segments satisfies this, since a
/// descendant's segment list extends its ancestor's.
pub trait TreeKey: Ord + Clone {
    /// Key of the tree root.
    fn root() -> Self;

    /// True if `self` is `ancestor` or lies below it.
    fn is_descendant(&self, ancestor: &Self) -> bool;
}

/// Tree-aware dirty list.
///
/// The list is kept in descending key order. Because descendants sort after
/// their ancestors, descending order puts every dirty descendant ahead of its
/// dirty ancestors, so a front-to-back walk recomputes children first and a
/// [`Compute`] callback may assume the children of the node it is given are clean.
///
/// ```
/// use understory_dependency::{MarkDirty, TreeGraphDependency, TreeKey};
///
/// #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
/// struct Path(Vec<u8>);
///
/// impl TreeKey for Path {
///     fn root() -> Self {
///         Path(Vec::new())
///     }
///     fn is_descendant(&self, ancestor: &Self) -> bool {
///         self.0.starts_with(&ancestor.0)
///     }
/// }
///
/// let mut deps = TreeGraphDependency::new();
/// deps.set_dirty(Path(vec![1]));
/// deps.set_dirty(Path(vec![1, 2]));
/// deps.set_dirty(Path(vec![3]));
///
/// let mut order = Vec::new();
/// let mut record = |p: &Path, _: &mut dyn MarkDirty<Path>| -> Result<(), ()> {
///     order.push(p.clone());
///     Ok(())
/// };
/// deps.update(&Path(vec![1]), &mut record).unwrap();
/// assert_eq!(order, [Path(vec![1, 2]), Path(vec![1])]);
/// assert!(deps.get_dirty(&Path(vec![3])));
/// ```
#[derive(Clone, Debug)]
pub struct TreeGraphDependency<K> {
    dirty: Vec<K>, // descending
}

impl<K> Default for TreeGraphDependency<K> {
    fn default() -> Self {
        Self { dirty: Vec::new() }
    }
}

impl<K: TreeKey> TreeGraphDependency<K> {
    /// Create an empty dirty list.
    pub fn new() -> Self {
        Self::default()
    }

    fn search(&self, node: &K) -> Result<usize, usize> {
        self.dirty.binary_search_by(|probe| node.cmp(probe))
    }

    /// Mark `node` dirty. Returns false if it already was.
    pub fn set_dirty(&mut self, node: K) -> bool {
        match self.search(&node) {
            Ok(_) => false,
            Err(at) => {
                self.dirty.insert(at, node);
                true
            }
        }
    }

    /// Mark `node` dirty, scanning for its slot from `hint` onwards.
    ///
    /// Returns the index `node` now occupies, which makes a good hint for the
    /// next key when marking a batch in descending order. A hint past the
    /// correct slot falls back to a full search.
    pub fn set_dirty_from(&mut self, hint: usize, node: K) -> usize {
        let start = hint.min(self.dirty.len());
        if start > 0 && self.dirty[start - 1] <= node {
            return match self.search(&node) {
                Ok(at) => at,
                Err(at) => {
                    self.dirty.insert(at, node);
                    at
                }
            };
        }
        let mut at = start;
        while at < self.dirty.len() && self.dirty[at] > node {
            at += 1;
        }
        if self.dirty.get(at) != Some(&node) {
            self.dirty.insert(at, node);
        }
        at
    }

    /// True if `node` is dirty.
    pub fn get_dirty(&self, node: &K) -> bool {
        self.search(node).is_ok()
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

    /// Recompute every dirty node in the subtree of `node`, `node` included.
    ///
    /// Nodes the callback marks inside the subtree are recomputed in the same
    /// call. Dirty nodes outside it, including ancestors of `node`, are left for
    /// a later update. On error the failing node stays dirty.
    pub fn update<C: Compute<K> + ?Sized>(
        &mut self,
        node: &K,
        compute: &mut C,
    ) -> Result<(), C::Error> {
        let mut from = 0;
        while let Some(pos) = self.dirty[from..]
            .iter()
            .position(|k| k.is_descendant(node))
            .map(|p| p + from)
        {
            let key = self.dirty[pos].clone();
            compute.compute(&key, self)?;
            // Marks may have landed ahead of `key`; rescan if so.
            from = match self.search(&key) {
                Ok(at) => {
                    self.dirty.remove(at);
                    if at == pos { at } else { 0 }
                }
                Err(_) => 0,
            };
        }
        Ok(())
    }

    /// Recompute every dirty node.
    pub fn update_all<C: Compute<K> + ?Sized>(&mut self, compute: &mut C) -> Result<(), C::Error> {
        while let Some(key) = self.dirty.first().cloned() {
            compute.compute(&key, self)?;
            if let Ok(at) = self.search(&key) {
                self.dirty.remove(at);
            }
        }
        Ok(())
    }

    /// Drop `node` and every dirty node below it without computing them.
    pub fn clear(&mut self, node: &K) {
        self.dirty.retain(|k| !k.is_descendant(node));
    }

    /// Drop every node without computing.
    pub fn clear_all(&mut self) {
        self.dirty.clear();
    }
}

impl<K: TreeKey> MarkDirty<K> for TreeGraphDependency<K> {
    fn set_dirty(&mut self, node: K) {
        Self::set_dirty(self, node);
    }

    fn get_dirty(&self, node: &K) -> bool {
        Self::get_dirty(self, node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
    struct P(Vec<u8>);

    impl TreeKey for P {
        fn root() -> Self {
            Self(Vec::new())
        }
        fn is_descendant(&self, ancestor: &Self) -> bool {
            self.0.starts_with(&ancestor.0)
        }
    }

    fn p(s: &[u8]) -> P {
        P(s.to_vec())
    }

    /// Compute that records its calls and marks the parent dirty, like a bound cache.
    struct Propagate {
        seen: Vec<P>,
    }

    impl Compute<P> for Propagate {
        type Error = ();

        fn compute(&mut self, node: &P, dirty: &mut dyn MarkDirty<P>) -> Result<(), ()> {
            self.seen.push(node.clone());
            if let Some((_, parent)) = node.0.split_last() {
                dirty.set_dirty(P(parent.to_vec()));
            }
            Ok(())
        }
    }

    #[test]
    fn descendants_precede_ancestors() {
        let mut t = TreeGraphDependency::new();
        for k in [p(&[]), p(&[1]), p(&[1, 2]), p(&[0]), p(&[1, 2, 3]), p(&[2])] {
            t.set_dirty(k);
        }
        assert!(!t.set_dirty(p(&[1])));
        let order: Vec<_> = t.iter().cloned().collect();
        assert_eq!(
            order,
            vec![p(&[2]), p(&[1, 2, 3]), p(&[1, 2]), p(&[1]), p(&[0]), p(&[])]
        );
    }

    #[test]
    fn hinted_marks_agree_with_searched_marks() {
        let mut a = TreeGraphDependency::new();
        let mut b = TreeGraphDependency::new();
        let mut hint = 0;
        for k in [p(&[3]), p(&[2, 9]), p(&[2]), p(&[1]), p(&[2])] {
            a.set_dirty(k.clone());
            hint = b.set_dirty_from(hint, k);
        }
        // A hint past the slot still lands correctly.
        b.set_dirty_from(b.len(), p(&[5]));
        a.set_dirty(p(&[5]));
        assert_eq!(a.iter().collect::<Vec<_>>(), b.iter().collect::<Vec<_>>());
    }

    #[test]
    fn update_propagates_within_subtree_only() {
        let mut t = TreeGraphDependency::new();
        t.set_dirty(p(&[1, 2, 3]));
        t.set_dirty(p(&[4]));
        let mut c = Propagate { seen: Vec::new() };
        t.update(&p(&[1]), &mut c).unwrap();
        assert_eq!(c.seen, vec![p(&[1, 2, 3]), p(&[1, 2]), p(&[1])]);
        // The root was marked by the last compute but lies outside the subtree.
        assert!(t.get_dirty(&p(&[])));
        assert!(t.get_dirty(&p(&[4])));
        assert!(!t.get_dirty(&p(&[1])));

        c.seen.clear();
        t.update(&p(&[1]), &mut c).unwrap();
        assert!(c.seen.is_empty());
    }

    #[test]
    fn update_all_drains_and_clear_prunes_subtrees() {
        let mut t = TreeGraphDependency::new();
        t.set_dirty(p(&[1, 1]));
        t.set_dirty(p(&[1, 2]));
        t.set_dirty(p(&[2]));
        t.clear(&p(&[1]));
        assert_eq!(t.iter().cloned().collect::<Vec<_>>(), vec![p(&[2])]);

        let mut c = Propagate { seen: Vec::new() };
        t.update_all(&mut c).unwrap();
        assert!(t.is_empty());
        assert_eq!(c.seen, vec![p(&[2]), p(&[])]);

        t.set_dirty(P::root());
        t.clear_all();
        assert!(t.is_empty());
    }

    #[test]
    fn failed_compute_keeps_node_dirty() {
        let mut t = TreeGraphDependency::new();
        t.set_dirty(p(&[1]));
        t.set_dirty(p(&[1, 1]));
        let mut fail_leaf =
            |n: &P, _: &mut dyn MarkDirty<P>| if n.0.len() == 2 { Err(()) } else { Ok(()) };
        assert_eq!(t.update(&p(&[1]), &mut fail_leaf), Err(()));
        assert_eq!(t.len(), 2);
    }
}
