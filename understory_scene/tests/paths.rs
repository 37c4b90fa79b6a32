// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Name function properties.

use proptest::prelude::*;
use understory_scene::ScenePath;
use understory_scene::path::{absolute_name, canonical_name, parent_name, relative_name};

fn segment() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_]{1,8}"
}

fn parent() -> impl Strategy<Value = String> {
    prop::collection::vec(segment(), 0..4).prop_map(|s| format!("/{}", s.join("/")))
}

proptest! {
    #[test]
    fn relative_of_absolute_is_identity(r in segment(), p in parent()) {
        let abs = absolute_name(&r, &p).unwrap();
        prop_assert_eq!(relative_name(&abs).unwrap(), r);
        prop_assert_eq!(parent_name(&abs).unwrap(), canonical_name(&p).unwrap());
    }

    #[test]
    fn display_parses_back(p in parent(), trailing in any::<bool>()) {
        let path: ScenePath = p.parse().unwrap();
        let text = if trailing && !path.is_root() { format!("{path}/") } else { path.to_string() };
        prop_assert_eq!(ScenePath::parse(&text).unwrap(), path);
    }
}
