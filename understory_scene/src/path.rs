// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scene paths and the name functions built on them.
//!
//! A path is the sequence of node names from the root. Its text form starts
//! with `/`, separates names with `/`, and may carry one trailing `/`, which is
//! dropped. The root is `"/"`.

use core::fmt;
use core::str::FromStr;

use understory_dependency::TreeKey;

use crate::error::{Result, SceneError};

const SEPARATOR: char = '/';

/// Canonical, absolute path of a scene node.
///
/// Ordered lexicographically by segment, so a descendant always sorts after
/// each of its ancestors.
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScenePath {
    segments: Vec<String>,
}

fn invalid(path: &str, reason: &'static str) -> SceneError {
    SceneError::InvalidPath {
        path: path.to_owned(),
        reason,
    }
}

fn check_segment(whole: &str, seg: &str) -> Result<()> {
    match seg {
        "" => Err(invalid(whole, "empty segment")),
        "." | ".." => Err(invalid(whole, "relative segments are not allowed")),
        _ => Ok(()),
    }
}

/// Split a relative name into validated segments.
fn relative_segments(relative: &str) -> Result<Vec<String>> {
    if relative.starts_with(SEPARATOR) {
        return Err(invalid(relative, "relative name starts with '/'"));
    }
    let trimmed = relative.strip_suffix(SEPARATOR).unwrap_or(relative);
    if trimmed.is_empty() {
        return Err(invalid(relative, "empty name"));
    }
    trimmed
        .split(SEPARATOR)
        .map(|seg| check_segment(relative, seg).map(|()| seg.to_owned()))
        .collect()
}

impl ScenePath {
    /// The root path, `"/"`.
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse an absolute path.
    pub fn parse(path: &str) -> Result<Self> {
        let Some(rest) = path.strip_prefix(SEPARATOR) else {
            return Err(invalid(path, "path is not absolute"));
        };
        if rest.is_empty() {
            return Ok(Self::root());
        }
        let segments = relative_segments(rest).map_err(|e| match e {
            SceneError::InvalidPath { reason, .. } => invalid(path, reason),
            other => other,
        })?;
        Ok(Self { segments })
    }

    /// Resolve `relative` (one or more names, no leading `/`) below `self`.
    pub fn join(&self, relative: &str) -> Result<Self> {
        let mut segments = self.segments.clone();
        segments.extend(relative_segments(relative)?);
        Ok(Self { segments })
    }

    /// True for `"/"`.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Names from the root down, excluding the root itself.
    pub fn segments(&self) -> impl ExactSizeIterator<Item = &str> + '_ {
        self.segments.iter().map(String::as_str)
    }

    /// Number of names below the root.
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// Last name of the path, `None` for the root.
    pub fn name(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// Parent path, `None` for the root.
    pub fn parent(&self) -> Option<Self> {
        let (_, init) = self.segments.split_last()?;
        Some(Self {
            segments: init.to_vec(),
        })
    }

    /// Every proper ancestor followed by `self`, starting at the first node below the root.
    pub fn lineage(&self) -> impl Iterator<Item = Self> + '_ {
        (1..=self.segments.len()).map(move |n| Self {
            segments: self.segments[..n].to_vec(),
        })
    }
}

impl TreeKey for ScenePath {
    fn root() -> Self {
        Self::root()
    }

    fn is_descendant(&self, ancestor: &Self) -> bool {
        self.segments.starts_with(&ancestor.segments)
    }
}

impl fmt::Display for ScenePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("/");
        }
        for seg in &self.segments {
            write!(f, "/{seg}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for ScenePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ScenePath({self})")
    }
}

impl FromStr for ScenePath {
    type Err = SceneError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Anything a cache accepts where a node path is expected.
///
/// Implemented for absolute path strings, [`ScenePath`] values, and
/// `(relative, parent)` pairs of strings.
pub trait IntoScenePath {
    /// Resolve to a canonical path.
    fn into_scene_path(self) -> Result<ScenePath>;
}

impl IntoScenePath for ScenePath {
    fn into_scene_path(self) -> Result<ScenePath> {
        Ok(self)
    }
}

impl IntoScenePath for &ScenePath {
    fn into_scene_path(self) -> Result<ScenePath> {
        Ok(self.clone())
    }
}

impl IntoScenePath for &str {
    fn into_scene_path(self) -> Result<ScenePath> {
        ScenePath::parse(self)
    }
}

impl IntoScenePath for &String {
    fn into_scene_path(self) -> Result<ScenePath> {
        ScenePath::parse(self)
    }
}

impl IntoScenePath for String {
    fn into_scene_path(self) -> Result<ScenePath> {
        ScenePath::parse(&self)
    }
}

impl IntoScenePath for (&str, &str) {
    fn into_scene_path(self) -> Result<ScenePath> {
        let (relative, parent) = self;
        ScenePath::parse(parent)?.join(relative)
    }
}

/// Text form of the root path.
pub fn root_name() -> &'static str {
    "/"
}

/// Resolve `relative` below `parent`.
///
/// `relative` must not start with `/`, and `parent` must.
///
/// ```
/// use understory_scene::path::absolute_name;
///
/// assert_eq!(absolute_name("child/", "/parent1/parent2/").unwrap(), "/parent1/parent2/child");
/// assert!(absolute_name("/child", "/parent").is_err());
/// assert!(absolute_name("child", "parent").is_err());
/// ```
pub fn absolute_name(relative: &str, parent: &str) -> Result<String> {
    Ok((relative, parent).into_scene_path()?.to_string())
}

/// Last name of `path`, or `"/"` for the root.
pub fn relative_name(path: &str) -> Result<String> {
    let p = ScenePath::parse(path)?;
    Ok(p.name().unwrap_or(root_name()).to_owned())
}

/// Parent of `path`. Fails with [`SceneError::NoParent`] at the root.
pub fn parent_name(path: &str) -> Result<String> {
    ScenePath::parse(path)?
        .parent()
        .map(|p| p.to_string())
        .ok_or(SceneError::NoParent)
}

/// `path` with any trailing separator removed, after validation.
pub fn canonical_name(path: &str) -> Result<String> {
    Ok(ScenePath::parse(path)?.to_string())
}
