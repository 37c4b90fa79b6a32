// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Entry filters for [`Store::list`](crate::Store::list).

use regex::Regex;

use crate::error::{Result, StoreError};
use crate::types::{Entry, EntryType};

/// Restricts directory listings by entry type and/or name.
///
/// Both conditions must hold when both are set. A default filter accepts everything.
#[derive(Clone, Debug, Default)]
pub struct EntryFilter {
    entry_type: Option<EntryType>,
    name: Option<Regex>,
}

impl EntryFilter {
    /// Accept only entries of `entry_type`.
    pub fn entry_type(entry_type: EntryType) -> Self {
        Self {
            entry_type: Some(entry_type),
            name: None,
        }
    }

    /// Accept only directories.
    pub fn directories() -> Self {
        Self::entry_type(EntryType::Directory)
    }

    /// Accept only data entries.
    pub fn files() -> Self {
        Self::entry_type(EntryType::File)
    }

    /// Accept only entries whose whole name matches `pattern`.
    pub fn name_matching(pattern: &str) -> Result<Self> {
        Ok(Self::default().and_name(anchored(pattern)?))
    }

    /// Add a name condition to this filter.
    ///
    /// The regex is searched for anywhere in the entry name; anchor it to match whole names.
    pub fn and_name(mut self, name: Regex) -> Self {
        self.name = Some(name);
        self
    }

    /// Add an entry-type condition to this filter.
    pub fn and_entry_type(mut self, entry_type: EntryType) -> Self {
        self.entry_type = Some(entry_type);
        self
    }

    /// True if `entry` passes every condition.
    pub fn accepts(&self, entry: &Entry) -> bool {
        if let Some(t) = self.entry_type
            && entry.entry_type() != t
        {
            return false;
        }
        match &self.name {
            Some(re) => re.is_match(entry.id()),
            None => true,
        }
    }
}

/// Compile `pattern` so that it must match a whole name.
pub fn anchored(pattern: &str) -> Result<Regex> {
    Regex::new(&format!("^(?:{pattern})$"))
        .map_err(|e| StoreError::InvalidArgument(format!("bad name pattern {pattern:?}: {e}")))
}
