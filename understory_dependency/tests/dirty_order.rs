// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property tests for the descendants-before-ancestors ordering.

use proptest::prelude::*;
use understory_dependency::{Compute, MarkDirty, TreeGraphDependency, TreeKey};

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct Key(Vec<u8>);

impl TreeKey for Key {
    fn root() -> Self {
        Self(Vec::new())
    }

    fn is_descendant(&self, ancestor: &Self) -> bool {
        self.0.starts_with(&ancestor.0)
    }
}

impl Key {
    fn parent(&self) -> Option<Self> {
        self.0.split_last().map(|(_, rest)| Self(rest.to_vec()))
    }
}

#[derive(Clone, Debug)]
enum Op {
    Mark(Key),
    MarkFrom(usize, Key),
    Clear(Key),
    Update(Key),
}

fn key() -> impl Strategy<Value = Key> {
    prop::collection::vec(0_u8..3, 0..4).prop_map(Key)
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => key().prop_map(Op::Mark),
        2 => (0_usize..8, key()).prop_map(|(h, k)| Op::MarkFrom(h, k)),
        1 => key().prop_map(Op::Clear),
        2 => key().prop_map(Op::Update),
    ]
}

/// Records calls and marks each computed node's parent, like a bound cache does.
#[derive(Default)]
struct Recorder {
    calls: Vec<Key>,
}

impl Compute<Key> for Recorder {
    type Error = ();

    fn compute(&mut self, node: &Key, dirty: &mut dyn MarkDirty<Key>) -> Result<(), ()> {
        self.calls.push(node.clone());
        if let Some(parent) = node.parent() {
            dirty.set_dirty(parent);
        }
        Ok(())
    }
}

fn assert_ordered(deps: &TreeGraphDependency<Key>) -> Result<(), TestCaseError> {
    let keys: Vec<&Key> = deps.iter().collect();
    for (i, a) in keys.iter().enumerate() {
        for b in &keys[i + 1..] {
            prop_assert!(a != b, "duplicate {:?}", a);
            prop_assert!(
                !(b.is_descendant(a) && b != a),
                "descendant {:?} listed after ancestor {:?}",
                b,
                a
            );
        }
    }
    Ok(())
}

proptest! {
    #[test]
    fn list_stays_ordered_under_any_operation_sequence(ops in prop::collection::vec(op(), 0..40)) {
        let mut deps = TreeGraphDependency::new();
        for op in ops {
            match op {
                Op::Mark(k) => {
                    deps.set_dirty(k);
                }
                Op::MarkFrom(h, k) => {
                    let at = deps.set_dirty_from(h, k.clone());
                    prop_assert_eq!(deps.iter().nth(at), Some(&k));
                }
                Op::Clear(k) => {
                    deps.clear(&k);
                    prop_assert!(deps.iter().all(|d| !d.is_descendant(&k)));
                }
                Op::Update(k) => {
                    let mut rec = Recorder::default();
                    deps.update(&k, &mut rec).unwrap();
                    prop_assert!(deps.iter().all(|d| !d.is_descendant(&k)));
                    prop_assert!(rec.calls.iter().all(|c| c.is_descendant(&k)));
                }
            }
            assert_ordered(&deps)?;
        }
    }

    #[test]
    fn update_computes_children_before_parents_once_each(marks in prop::collection::vec(key(), 1..20)) {
        let mut deps = TreeGraphDependency::new();
        for k in &marks {
            deps.set_dirty(k.clone());
        }
        let mut rec = Recorder::default();
        deps.update_all(&mut rec).unwrap();
        prop_assert!(deps.is_empty());

        for (i, a) in rec.calls.iter().enumerate() {
            for b in &rec.calls[i + 1..] {
                prop_assert!(a != b, "{:?} computed twice", a);
                prop_assert!(!b.is_descendant(a), "{:?} computed after its ancestor {:?}", b, a);
            }
        }
        // Every marked node and every ancestor of one is computed.
        for k in &marks {
            let mut cur = Some(k.clone());
            while let Some(c) = cur {
                prop_assert!(rec.calls.contains(&c));
                cur = c.parent();
            }
        }
    }
}
