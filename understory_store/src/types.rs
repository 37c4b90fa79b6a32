// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Entry descriptions and typed data values.

use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};

/// Name of one entry within a directory.
pub type EntryId = String;

/// Kind of a directory entry.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EntryType {
    /// A container of further entries.
    Directory,
    /// Typed data (scalar or array).
    File,
}

/// Closed set of primitive data layouts a store can hold.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(missing_docs, reason = "Variant names are the element types they describe.")]
pub enum DataType {
    Float,
    FloatArray,
    Double,
    DoubleArray,
    Half,
    HalfArray,
    Char,
    CharArray,
    UChar,
    UCharArray,
    Short,
    ShortArray,
    UShort,
    UShortArray,
    Int,
    IntArray,
    UInt,
    UIntArray,
    Int64,
    Int64Array,
    UInt64,
    UInt64Array,
    String,
    StringArray,
}

impl DataType {
    /// True for the `...Array` variants.
    pub const fn is_array(self) -> bool {
        matches!(
            self,
            Self::FloatArray
                | Self::DoubleArray
                | Self::HalfArray
                | Self::CharArray
                | Self::UCharArray
                | Self::ShortArray
                | Self::UShortArray
                | Self::IntArray
                | Self::UIntArray
                | Self::Int64Array
                | Self::UInt64Array
                | Self::StringArray
        )
    }

    /// The scalar type of an array type, or `self` for scalars.
    pub const fn element(self) -> Self {
        match self {
            Self::FloatArray => Self::Float,
            Self::DoubleArray => Self::Double,
            Self::HalfArray => Self::Half,
            Self::CharArray => Self::Char,
            Self::UCharArray => Self::UChar,
            Self::ShortArray => Self::Short,
            Self::UShortArray => Self::UShort,
            Self::IntArray => Self::Int,
            Self::UIntArray => Self::UInt,
            Self::Int64Array => Self::Int64,
            Self::UInt64Array => Self::UInt64,
            Self::StringArray => Self::String,
            scalar => scalar,
        }
    }

    /// The array type of a scalar type, or `self` for arrays.
    pub const fn array(self) -> Self {
        match self {
            Self::Float => Self::FloatArray,
            Self::Double => Self::DoubleArray,
            Self::Half => Self::HalfArray,
            Self::Char => Self::CharArray,
            Self::UChar => Self::UCharArray,
            Self::Short => Self::ShortArray,
            Self::UShort => Self::UShortArray,
            Self::Int => Self::IntArray,
            Self::UInt => Self::UIntArray,
            Self::Int64 => Self::Int64Array,
            Self::UInt64 => Self::UInt64Array,
            Self::String => Self::StringArray,
            array => array,
        }
    }
}

/// IEEE-754 binary16 value, kept as raw bits.
///
/// Stores never do arithmetic on half values, so no conversion is provided beyond the bits.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Half(pub u16);

impl Half {
    /// Wrap raw binary16 bits.
    pub const fn from_bits(bits: u16) -> Self {
        Self(bits)
    }

    /// Raw binary16 bits.
    pub const fn to_bits(self) -> u16 {
        self.0
    }
}

/// Description of one directory entry, as returned by [`Store::list`](crate::Store::list).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    id: EntryId,
    entry_type: EntryType,
    data_type: Option<DataType>,
    array_length: Option<usize>,
}

impl Entry {
    /// Describe a directory.
    pub fn directory(id: impl Into<EntryId>) -> Self {
        Self {
            id: id.into(),
            entry_type: EntryType::Directory,
            data_type: None,
            array_length: None,
        }
    }

    /// Describe a data entry holding `data`.
    pub fn file(id: impl Into<EntryId>, data: &Data) -> Self {
        Self {
            id: id.into(),
            entry_type: EntryType::File,
            data_type: Some(data.data_type()),
            array_length: data.array_length(),
        }
    }

    /// Entry name.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Directory or data.
    pub fn entry_type(&self) -> EntryType {
        self.entry_type
    }

    /// Data layout of a data entry.
    ///
    /// Fails with [`StoreError::WrongEntryKind`] for directories.
    pub fn data_type(&self) -> Result<DataType> {
        self.data_type
            .ok_or_else(|| StoreError::WrongEntryKind(format!("{} is a directory", self.id)))
    }

    /// True if the entry holds array data.
    pub fn is_array(&self) -> bool {
        self.data_type.is_some_and(DataType::is_array)
    }

    /// Element count of an array entry.
    ///
    /// Fails with [`StoreError::WrongEntryKind`] for directories and scalar data.
    pub fn array_length(&self) -> Result<usize> {
        self.array_length
            .ok_or_else(|| StoreError::WrongEntryKind(format!("{} is not an array", self.id)))
    }
}

/// An owned, typed data value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[allow(missing_docs, reason = "Variants mirror DataType one to one.")]
pub enum Data {
    Float(f32),
    FloatArray(Vec<f32>),
    Double(f64),
    DoubleArray(Vec<f64>),
    Half(Half),
    HalfArray(Vec<Half>),
    Char(i8),
    CharArray(Vec<i8>),
    UChar(u8),
    UCharArray(Vec<u8>),
    Short(i16),
    ShortArray(Vec<i16>),
    UShort(u16),
    UShortArray(Vec<u16>),
    Int(i32),
    IntArray(Vec<i32>),
    UInt(u32),
    UIntArray(Vec<u32>),
    Int64(i64),
    Int64Array(Vec<i64>),
    UInt64(u64),
    UInt64Array(Vec<u64>),
    String(String),
    StringArray(Vec<String>),
}

impl Data {
    /// Layout of this value.
    pub fn data_type(&self) -> DataType {
        match self {
            Self::Float(_) => DataType::Float,
            Self::FloatArray(_) => DataType::FloatArray,
            Self::Double(_) => DataType::Double,
            Self::DoubleArray(_) => DataType::DoubleArray,
            Self::Half(_) => DataType::Half,
            Self::HalfArray(_) => DataType::HalfArray,
            Self::Char(_) => DataType::Char,
            Self::CharArray(_) => DataType::CharArray,
            Self::UChar(_) => DataType::UChar,
            Self::UCharArray(_) => DataType::UCharArray,
            Self::Short(_) => DataType::Short,
            Self::ShortArray(_) => DataType::ShortArray,
            Self::UShort(_) => DataType::UShort,
            Self::UShortArray(_) => DataType::UShortArray,
            Self::Int(_) => DataType::Int,
            Self::IntArray(_) => DataType::IntArray,
            Self::UInt(_) => DataType::UInt,
            Self::UIntArray(_) => DataType::UIntArray,
            Self::Int64(_) => DataType::Int64,
            Self::Int64Array(_) => DataType::Int64Array,
            Self::UInt64(_) => DataType::UInt64,
            Self::UInt64Array(_) => DataType::UInt64Array,
            Self::String(_) => DataType::String,
            Self::StringArray(_) => DataType::StringArray,
        }
    }

    /// Element count for arrays, `None` for scalars.
    pub fn array_length(&self) -> Option<usize> {
        Some(match self {
            Self::FloatArray(v) => v.len(),
            Self::DoubleArray(v) => v.len(),
            Self::HalfArray(v) => v.len(),
            Self::CharArray(v) => v.len(),
            Self::UCharArray(v) => v.len(),
            Self::ShortArray(v) => v.len(),
            Self::UShortArray(v) => v.len(),
            Self::IntArray(v) => v.len(),
            Self::UIntArray(v) => v.len(),
            Self::Int64Array(v) => v.len(),
            Self::UInt64Array(v) => v.len(),
            Self::StringArray(v) => v.len(),
            _ => return None,
        })
    }
}

/// Element types that can be read and written through a store.
///
/// Implemented for every scalar layout of [`DataType`].
pub trait Primitive: Clone + Sized {
    /// Scalar layout of this type.
    const DATA_TYPE: DataType;

    /// Wrap a scalar.
    fn into_data(self) -> Data;

    /// Wrap an array.
    fn array_into_data(values: Vec<Self>) -> Data;

    /// Borrow the scalar inside `data`, if it has this layout.
    fn from_data(data: &Data) -> Option<&Self>;

    /// Borrow the array inside `data`, if it has this layout.
    fn array_from_data(data: &Data) -> Option<&[Self]>;
}

macro_rules! impl_primitive {
    ($($ty:ty => $scalar:ident, $array:ident;)*) => {
        $(
            impl Primitive for $ty {
                const DATA_TYPE: DataType = DataType::$scalar;

                fn into_data(self) -> Data {
                    Data::$scalar(self)
                }

                fn array_into_data(values: Vec<Self>) -> Data {
                    Data::$array(values)
                }

                fn from_data(data: &Data) -> Option<&Self> {
                    match data {
                        Data::$scalar(v) => Some(v),
                        _ => None,
                    }
                }

                fn array_from_data(data: &Data) -> Option<&[Self]> {
                    match data {
                        Data::$array(v) => Some(v.as_slice()),
                        _ => None,
                    }
                }
            }
        )*
    };
}

impl_primitive! {
    f32 => Float, FloatArray;
    f64 => Double, DoubleArray;
    Half => Half, HalfArray;
    i8 => Char, CharArray;
    u8 => UChar, UCharArray;
    i16 => Short, ShortArray;
    u16 => UShort, UShortArray;
    i32 => Int, IntArray;
    u32 => UInt, UIntArray;
    i64 => Int64, Int64Array;
    u64 => UInt64, UInt64Array;
    String => String, StringArray;
}
