// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Opaque payload records and their store layout.
//!
//! A payload is stored as a directory holding `typeName` (string), `version`
//! (unsigned int) and `data` (byte array). A shape adds `bound` (six floats).

use understory_store::{Store, StoreError, StoreExt};

use crate::bound::Box3;
use crate::error::{Result, SceneError};

const TYPE_NAME: &str = "typeName";
const VERSION: &str = "version";
const DATA: &str = "data";
const BOUND: &str = "bound";

/// Serialized object of a type the cache never interprets.
///
/// `version` is the writer's schema version for `bytes`, passed through unchanged.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Payload {
    /// Name of the serialized type.
    pub type_name: String,
    /// Schema version of `bytes`.
    pub version: u32,
    /// Serialized contents.
    pub bytes: Vec<u8>,
}

impl Payload {
    /// Create a payload.
    pub fn new(type_name: impl Into<String>, version: u32, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            type_name: type_name.into(),
            version,
            bytes: bytes.into(),
        }
    }

    /// A UTF-8 string payload of type `"String"`.
    pub fn string(value: &str) -> Self {
        Self::new("String", 0, value.as_bytes())
    }

    /// Contents as UTF-8, if they are.
    pub fn as_str(&self) -> Option<&str> {
        core::str::from_utf8(&self.bytes).ok()
    }
}

/// A renderable's payload together with its intrinsic bound.
///
/// The bound is stored next to the payload so the cache never has to decode it.
#[derive(Clone, Debug, PartialEq)]
pub struct Shape {
    /// Bound of the shape in its own space.
    pub bound: Box3,
    /// The serialized shape.
    pub payload: Payload,
}

impl Shape {
    /// Create a shape.
    pub fn new(bound: Box3, payload: Payload) -> Self {
        Self { bound, payload }
    }
}

/// Write `payload` as the directory `name` in the cursor directory, replacing any previous one.
pub(crate) fn save(store: &mut dyn Store, name: &str, payload: &Payload) -> Result<()> {
    if store.has_entry(name) {
        store.remove(name)?;
    }
    store.mkdir(name)?;
    store.navigate(name)?;
    let written = write_fields(store, payload);
    store.up()?;
    written
}

fn write_fields(store: &mut dyn Store, payload: &Payload) -> Result<()> {
    store.write_scalar(TYPE_NAME, payload.type_name.clone())?;
    store.write_scalar(VERSION, payload.version)?;
    store.write_array(DATA, payload.bytes.clone())?;
    Ok(())
}

/// Read the payload directory `name` from the cursor directory.
pub(crate) fn load(store: &mut dyn Store, name: &str) -> Result<Payload> {
    store.navigate(name)?;
    let read = read_fields(store, name);
    store.up()?;
    read
}

fn read_fields(store: &dyn Store, name: &str) -> Result<Payload> {
    let field = |e: StoreError| SceneError::Payload(format!("{name}: {e}"));
    Ok(Payload {
        type_name: store.read_scalar(TYPE_NAME).map_err(field)?,
        version: store.read_scalar(VERSION).map_err(field)?,
        bytes: store.read_array(DATA).map_err(field)?,
    })
}

/// Write `shape` as the directory `name` in the cursor directory.
pub(crate) fn save_shape(store: &mut dyn Store, name: &str, shape: &Shape) -> Result<()> {
    save(store, name, &shape.payload)?;
    store.navigate(name)?;
    let written = store
        .write_array(BOUND, shape.bound.to_array().to_vec())
        .map_err(SceneError::from);
    store.up()?;
    written
}

/// Read the shape directory `name` from the cursor directory.
pub(crate) fn load_shape(store: &mut dyn Store, name: &str) -> Result<Shape> {
    let payload = load(store, name)?;
    store.navigate(name)?;
    let mut bound = [0.0_f32; 6];
    let read = store
        .read_array_into(BOUND, &mut bound)
        .map_err(|e| SceneError::Payload(format!("{name}: {e}")));
    store.up()?;
    read?;
    Ok(Shape::new(Box3::from_array(bound), payload))
}
