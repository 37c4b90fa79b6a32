// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hierarchical scene cache with lazily maintained bounds.

use std::collections::BTreeMap;
use std::path::Path;

use glam::Mat4;
use regex::Regex;
use tracing::{debug, error, trace, warn};
use understory_dependency::{Compute, MarkDirty, TreeGraphDependency};
use understory_store::{EntryFilter, OpenMode, Store, StoreError, StoreExt, StoreOptions};

use crate::bound::Box3;
use crate::error::{Result, SceneError};
use crate::kind::NodeKind;
use crate::layout::{self, ATTRIBUTES, BOUNDING_BOX, CHILDREN, SHAPE, TRANSFORM, headers};
use crate::path::{IntoScenePath, ScenePath};
use crate::payload::{self, Payload, Shape};

/// Move the cursor to the directory of `path`.
fn goto(store: &mut dyn Store, path: &ScenePath) -> Result<()> {
    store.reset_root();
    for seg in path.segments() {
        if store.navigate(CHILDREN).and_then(|()| store.navigate(seg)).is_err() {
            return Err(StoreError::NotFound(format!("scene node {path}")).into());
        }
    }
    Ok(())
}

fn read_bound(store: &dyn Store) -> Result<Option<Box3>> {
    if !store.has_entry(BOUNDING_BOX) {
        return Ok(None);
    }
    let mut a = [0.0_f32; 6];
    store.read_array_into(BOUNDING_BOX, &mut a)?;
    Ok(Some(Box3::from_array(a)))
}

fn child_names(store: &dyn Store) -> Vec<String> {
    store
        .list(&EntryFilter::directories())
        .into_iter()
        .map(|e| e.id().to_owned())
        .collect()
}

/// Recomputes one node's bound from its shape and its children's stored bounds.
struct BoundUpdater<'a> {
    store: &'a mut dyn Store,
    recomputed: &'a mut u64,
}

impl Compute<ScenePath> for BoundUpdater<'_> {
    type Error = SceneError;

    fn compute(&mut self, node: &ScenePath, dirty: &mut dyn MarkDirty<ScenePath>) -> Result<()> {
        let store = &mut *self.store;
        if goto(store, node).is_err() {
            trace!(%node, "skipping removed node");
            return Ok(());
        }
        *self.recomputed += 1;

        let kind = NodeKind::read(store).unwrap_or_else(|e| {
            warn!(%node, error = %e, "treating unreadable node content as absent");
            NodeKind::Untyped
        });
        let mut bound = kind.shape().map_or(Box3::EMPTY, |s| s.bound);
        if store.has_entry(CHILDREN) {
            store.navigate(CHILDREN)?;
            for child in child_names(store) {
                store.navigate(&child)?;
                if let Some(b) = read_bound(store)? {
                    bound = bound.union(&b);
                }
                store.up()?;
            }
            store.up()?;
        }
        if let Some(m) = kind.transform() {
            bound = bound.transformed(m);
        }

        let changed = match read_bound(store)? {
            Some(old) => old != bound,
            None => !bound.is_empty(),
        };
        if changed {
            store.write_array(BOUNDING_BOX, bound.to_array().to_vec())?;
            if let Some(parent) = node.parent() {
                dirty.set_dirty(parent);
            }
        }
        trace!(%node, changed, "recomputed bound");
        Ok(())
    }
}

/// A scene stored as a tree of named nodes.
///
/// Every node may hold attributes (named opaque payloads) and at most one of a
/// transform matrix and a shape. The cache keeps an axis-aligned bound for each
/// node: the union of its shape's bound and its children's bounds, mapped
/// through its own transform. Writes only mark nodes dirty; [`bound`](Self::bound)
/// recomputes what is stale below the queried node, children first, and reads
/// the result back.
///
/// Paths are accepted as absolute strings, [`ScenePath`]s or `(relative, parent)`
/// pairs. Nodes and their ancestors are created by any write.
///
/// ```
/// use glam::{Mat4, Vec3};
/// use understory_scene::{Box3, Payload, SceneCache, Shape};
/// use understory_store::{MemoryStore, OpenMode};
///
/// let store = MemoryStore::new("/", OpenMode::WRITE).unwrap();
/// let mut cache = SceneCache::from_store(Box::new(store)).unwrap();
///
/// let unit = Box3::new(Vec3::ZERO, Vec3::ONE);
/// cache.write_transform("/geo", Mat4::from_translation(Vec3::X)).unwrap();
/// cache.write_shape("/geo/box", &Shape::new(unit, Payload::new("Box", 1, vec![0_u8]))).unwrap();
///
/// assert_eq!(cache.bound("/geo/box").unwrap(), unit);
/// assert_eq!(cache.bound("/geo").unwrap(), Box3::new(Vec3::X, Vec3::new(2.0, 1.0, 1.0)));
/// ```
pub struct SceneCache {
    store: Box<dyn Store>,
    deps: TreeGraphDependency<ScenePath>,
    recomputed: u64,
}

impl core::fmt::Debug for SceneCache {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SceneCache")
            .field("store", &self.store)
            .field("pending", &self.deps.len())
            .field("recomputed", &self.recomputed)
            .finish_non_exhaustive()
    }
}

impl SceneCache {
    /// Open the cache file at `path` with default store options.
    ///
    /// The backend is chosen by extension through the store registry, which must
    /// have been populated (see [`understory_store::init_default_backends`]).
    pub fn open(path: impl AsRef<Path>, mode: OpenMode) -> Result<Self> {
        Self::open_with(path, mode, &StoreOptions::default())
    }

    /// Open the cache file at `path`.
    pub fn open_with(path: impl AsRef<Path>, mode: OpenMode, options: &StoreOptions) -> Result<Self> {
        let store = understory_store::create(path, "/", mode, options)?;
        Self::from_store(store)
    }

    /// Use an already open store.
    ///
    /// Writable stores get the cache layout and the generated headers.
    /// Read-only stores must already hold a cache, or this fails with
    /// [`SceneError::NotACache`].
    pub fn from_store(mut store: Box<dyn Store>) -> Result<Self> {
        layout::prepare(&mut *store, CHILDREN)?;
        debug!(mode = ?store.open_mode(), "opened scene cache");
        Ok(Self {
            store,
            deps: TreeGraphDependency::new(),
            recomputed: 0,
        })
    }

    /// Mode of the underlying store.
    pub fn open_mode(&self) -> OpenMode {
        self.store.open_mode()
    }

    /// Number of nodes whose bound is awaiting recomputation.
    pub fn pending(&self) -> usize {
        self.deps.len()
    }

    /// Number of node bounds recomputed since the cache was opened.
    pub fn recompute_count(&self) -> u64 {
        self.recomputed
    }

    /// Create the directories of `path` and its ancestors, marking new nodes dirty.
    /// Leaves the cursor at `path`.
    fn guarantee(&mut self, path: &ScenePath) -> Result<()> {
        let store = &mut *self.store;
        store.reset_root();
        for (node, seg) in path.lineage().zip(path.segments()) {
            store.mkdir(CHILDREN)?;
            store.navigate(CHILDREN)?;
            if !store.has_entry(seg) {
                store.mkdir(seg)?;
                debug!(%node, "created node");
                self.deps.set_dirty(node);
            }
            store.navigate(seg)?;
        }
        Ok(())
    }

    fn refresh(&mut self, path: &ScenePath) -> Result<()> {
        let mut updater = BoundUpdater {
            store: &mut *self.store,
            recomputed: &mut self.recomputed,
        };
        self.deps.update(path, &mut updater)
    }

    /// Write the attribute `attr` of the node at `path`.
    pub fn write_attribute(
        &mut self,
        path: impl IntoScenePath,
        attr: &str,
        value: &Payload,
    ) -> Result<()> {
        let path = path.into_scene_path()?;
        self.guarantee(&path)?;
        self.store.mkdir(ATTRIBUTES)?;
        self.store.navigate(ATTRIBUTES)?;
        payload::save(&mut *self.store, attr, value)?;
        self.deps.set_dirty(path);
        Ok(())
    }

    /// Make the node at `path` a transform, discarding any shape it held.
    ///
    /// The root cannot hold a transform.
    pub fn write_transform(&mut self, path: impl IntoScenePath, matrix: Mat4) -> Result<()> {
        let path = path.into_scene_path()?;
        if path.is_root() {
            return Err(SceneError::InvalidArgument(
                "the root node cannot hold a transform".to_owned(),
            ));
        }
        self.guarantee(&path)?;
        self.store
            .write_array(TRANSFORM, matrix.to_cols_array().to_vec())?;
        if self.store.has_entry(SHAPE) {
            self.store.remove(SHAPE)?;
        }
        self.deps.set_dirty(path);
        Ok(())
    }

    /// Make the node at `path` a shape, discarding any transform it held.
    ///
    /// The root cannot hold a shape.
    pub fn write_shape(&mut self, path: impl IntoScenePath, shape: &Shape) -> Result<()> {
        let path = path.into_scene_path()?;
        if path.is_root() {
            return Err(SceneError::InvalidArgument(
                "the root node cannot hold a shape".to_owned(),
            ));
        }
        self.guarantee(&path)?;
        if self.store.has_entry(TRANSFORM) {
            self.store.remove(TRANSFORM)?;
        }
        payload::save_shape(&mut *self.store, SHAPE, shape)?;
        self.deps.set_dirty(path);
        Ok(())
    }

    /// Write the header `name`.
    pub fn write_header(&mut self, name: &str, value: &Payload) -> Result<()> {
        headers::write(&mut *self.store, name, value)
    }

    /// Read the attribute `attr` of the node at `path`.
    pub fn read_attribute(&mut self, path: impl IntoScenePath, attr: &str) -> Result<Payload> {
        let path = path.into_scene_path()?;
        goto(&mut *self.store, &path)?;
        self.store.navigate(ATTRIBUTES)?;
        payload::load(&mut *self.store, attr)
    }

    /// Every attribute of the node at `path`.
    pub fn read_attributes(&mut self, path: impl IntoScenePath) -> Result<BTreeMap<String, Payload>> {
        let path = path.into_scene_path()?;
        goto(&mut *self.store, &path)?;
        if !self.store.has_entry(ATTRIBUTES) {
            return Ok(BTreeMap::new());
        }
        self.store.navigate(ATTRIBUTES)?;
        layout::read_all(&mut *self.store)
    }

    /// Read the header `name`.
    pub fn read_header(&mut self, name: &str) -> Result<Payload> {
        headers::read(&mut *self.store, name)
    }

    /// Every header, by name.
    pub fn read_headers(&mut self) -> Result<BTreeMap<String, Payload>> {
        headers::read_all(&mut *self.store)
    }

    /// Header names, sorted.
    pub fn headers(&mut self) -> Result<Vec<String>> {
        headers::names(&mut *self.store)
    }

    /// What the node at `path` holds.
    pub fn node_kind(&mut self, path: impl IntoScenePath) -> Result<NodeKind> {
        let path = path.into_scene_path()?;
        goto(&mut *self.store, &path)?;
        NodeKind::read(&mut *self.store)
    }

    /// Local transform of the node at `path`.
    ///
    /// Fails with [`SceneError::NotATransform`] unless the node holds one.
    pub fn transform_matrix(&mut self, path: impl IntoScenePath) -> Result<Mat4> {
        let path = path.into_scene_path()?;
        match self.node_kind(&path)? {
            NodeKind::Transform(m) => Ok(m),
            _ => Err(SceneError::NotATransform(path.to_string())),
        }
    }

    /// Shape of the node at `path`.
    ///
    /// Fails with [`SceneError::NotAShape`] unless the node holds one.
    pub fn shape(&mut self, path: impl IntoScenePath) -> Result<Shape> {
        let path = path.into_scene_path()?;
        match self.node_kind(&path)? {
            NodeKind::Shape(s) => Ok(s),
            _ => Err(SceneError::NotAShape(path.to_string())),
        }
    }

    /// True if the node at `path` holds a transform. Always false for the root.
    pub fn is_transform(&mut self, path: impl IntoScenePath) -> Result<bool> {
        let path = path.into_scene_path()?;
        goto(&mut *self.store, &path)?;
        Ok(!path.is_root() && self.store.has_entry(TRANSFORM))
    }

    /// True if the node at `path` holds a shape. Always false for the root.
    pub fn is_shape(&mut self, path: impl IntoScenePath) -> Result<bool> {
        let path = path.into_scene_path()?;
        goto(&mut *self.store, &path)?;
        Ok(!path.is_root() && self.store.has_entry(SHAPE))
    }

    /// Bound of the node at `path`, recomputing whatever is stale below it.
    ///
    /// A node with no shape below it has the empty bound.
    pub fn bound(&mut self, path: impl IntoScenePath) -> Result<Box3> {
        let path = path.into_scene_path()?;
        self.refresh(&path)?;
        goto(&mut *self.store, &path)?;
        Ok(read_bound(&*self.store)?.unwrap_or(Box3::EMPTY))
    }

    /// Product of the transforms from the root down to `path`, inclusive.
    ///
    /// Nodes that are not transforms contribute the identity.
    pub fn global_transform_matrix(&mut self, path: impl IntoScenePath) -> Result<Mat4> {
        let path = path.into_scene_path()?;
        let mut global = Mat4::IDENTITY;
        for node in path.lineage() {
            goto(&mut *self.store, &node)?;
            match NodeKind::read(&mut *self.store) {
                Ok(NodeKind::Transform(m)) => global *= m,
                Ok(_) => {}
                Err(e) => warn!(%node, error = %e, "ignoring unreadable transform"),
            }
        }
        Ok(global)
    }

    /// Immediate children of the node at `path`, sorted by name.
    pub fn children(&mut self, path: impl IntoScenePath) -> Result<Vec<ScenePath>> {
        let path = path.into_scene_path()?;
        goto(&mut *self.store, &path)?;
        if !self.store.has_entry(CHILDREN) {
            return Ok(Vec::new());
        }
        self.store.navigate(CHILDREN)?;
        child_names(&*self.store)
            .iter()
            .map(|name| path.join(name))
            .collect()
    }

    /// Every node except the root, depth first, siblings sorted by name.
    pub fn objects(&mut self) -> Result<Vec<ScenePath>> {
        let mut out = Vec::new();
        let mut stack = vec![ScenePath::root()];
        while let Some(node) = stack.pop() {
            let children = self.children(&node)?;
            stack.extend(children.into_iter().rev());
            if !node.is_root() {
                out.push(node);
            }
        }
        Ok(out)
    }

    /// True if a node exists at `path`.
    pub fn contains(&mut self, path: impl IntoScenePath) -> Result<bool> {
        let path = path.into_scene_path()?;
        Ok(goto(&mut *self.store, &path).is_ok())
    }

    /// True if the node at `path` exists and has the attribute `attr`.
    pub fn contains_attribute(&mut self, path: impl IntoScenePath, attr: &str) -> Result<bool> {
        let path = path.into_scene_path()?;
        Ok(goto(&mut *self.store, &path).is_ok()
            && self.store.navigate(ATTRIBUTES).is_ok()
            && self.store.has_entry(attr))
    }

    /// Attribute names of the node at `path`, sorted.
    pub fn attributes(&mut self, path: impl IntoScenePath) -> Result<Vec<String>> {
        self.attribute_names(path, &EntryFilter::directories())
    }

    /// Attribute names of the node at `path` in which `pattern` finds a match.
    pub fn attributes_matching(
        &mut self,
        path: impl IntoScenePath,
        pattern: &Regex,
    ) -> Result<Vec<String>> {
        self.attribute_names(path, &EntryFilter::directories().and_name(pattern.clone()))
    }

    fn attribute_names(
        &mut self,
        path: impl IntoScenePath,
        filter: &EntryFilter,
    ) -> Result<Vec<String>> {
        let path = path.into_scene_path()?;
        goto(&mut *self.store, &path)?;
        if !self.store.has_entry(ATTRIBUTES) {
            return Ok(Vec::new());
        }
        self.store.navigate(ATTRIBUTES)?;
        Ok(layout::payload_names(&*self.store, filter))
    }

    /// Delete the node at `path` and everything below it.
    ///
    /// Pending recomputation inside the subtree is dropped and the parent is
    /// marked dirty. The root cannot be removed.
    pub fn remove(&mut self, path: impl IntoScenePath) -> Result<()> {
        let path = path.into_scene_path()?;
        let (Some(parent), Some(name)) = (path.parent(), path.name()) else {
            return Err(SceneError::InvalidArgument(
                "the root node cannot be removed".to_owned(),
            ));
        };
        goto(&mut *self.store, &path)?;
        goto(&mut *self.store, &parent)?;
        self.store.navigate(CHILDREN)?;
        self.store.remove(name)?;
        self.deps.clear(&path);
        self.deps.set_dirty(parent);
        debug!(%path, "removed node");
        Ok(())
    }

    /// Delete the attribute `attr` of the node at `path`.
    pub fn remove_attribute(&mut self, path: impl IntoScenePath, attr: &str) -> Result<()> {
        let path = path.into_scene_path()?;
        goto(&mut *self.store, &path)?;
        self.store.navigate(ATTRIBUTES)?;
        self.store.remove(attr)?;
        Ok(())
    }

    /// Delete the header `name`.
    pub fn remove_header(&mut self, name: &str) -> Result<()> {
        headers::remove(&mut *self.store, name)
    }

    /// Recompute every stale bound and flush the store.
    pub fn flush(&mut self) -> Result<()> {
        let mut updater = BoundUpdater {
            store: &mut *self.store,
            recomputed: &mut self.recomputed,
        };
        self.deps.update_all(&mut updater)?;
        self.store.flush()?;
        Ok(())
    }
}

impl Drop for SceneCache {
    fn drop(&mut self) {
        if self.store.writable()
            && let Err(e) = self.flush()
        {
            error!(error = %e, "failed to flush scene cache on drop");
        }
    }
}
