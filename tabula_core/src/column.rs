// Copyright 2025 the Tabula Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Typed, nullable columns.
//!
//! A [`Column`] is a closed enum with one variant per [`DataType`]. Plain variants wrap a
//! [`TypedColumn<T>`], whose per-type behavior (ordering, equality, hashing keys) lives in the
//! [`ColumnValue`] trait. `Utf8Dictionary` wraps a [`DictionaryColumn`], which exposes the same
//! row operations over decoded strings. `Column` methods forward through the `dispatch!` macro.
//!
//! Null policy:
//! - nulls sort after every non-null value (`compare` is null-last),
//! - two nulls are equal (`equals_at` and join keys group nulls together).

extern crate alloc;

use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;
use core::cmp::Ordering;
use core::fmt;

use crate::{DataType, DictionaryColumn, SchemaError};

/// A hashable image of a single cell, used to build join keys.
///
/// Floats are canonicalized so that `-0.0` and `0.0` share a key, as do all NaNs, which keeps
/// key equality consistent with [`ColumnValue::cmp_value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyScalar<'a> {
    /// A null cell.
    Null,
    /// Any signed integer, widened.
    Int(i64),
    /// Any unsigned integer, widened.
    UInt(u64),
    /// Canonical bit pattern of a float, widened to `f64`.
    Float(u64),
    /// A boolean.
    Bool(bool),
    /// String or binary bytes.
    Bytes(&'a [u8]),
}

/// Per-type capabilities of a column value.
pub trait ColumnValue: Clone + Default + fmt::Debug + Sized {
    /// The physical type this value is stored as.
    const DATA_TYPE: DataType;

    /// Total order over non-null values.
    fn cmp_value(&self, other: &Self) -> Ordering;

    /// Equality consistent with [`ColumnValue::cmp_value`].
    fn eq_value(&self, other: &Self) -> bool {
        self.cmp_value(other) == Ordering::Equal
    }

    /// Hashable key image of this value.
    fn key(&self) -> KeyScalar<'_>;

    /// Borrows the typed column behind `column` if it stores this value type.
    fn downcast(column: &Column) -> Option<&TypedColumn<Self>>;

    /// Wraps a typed column into the matching [`Column`] variant.
    fn wrap(column: TypedColumn<Self>) -> Column;
}

/// A fixed-length sequence of values of one physical type with a validity mask.
#[derive(Debug, Clone)]
pub struct TypedColumn<T> {
    values: Vec<T>,
    validity: Vec<bool>,
}

impl<T: ColumnValue> TypedColumn<T> {
    /// Creates a column from values and a validity mask (`true` = present).
    pub fn try_new(values: Vec<T>, validity: Vec<bool>) -> Result<Self, SchemaError> {
        if values.len() != validity.len() {
            return Err(SchemaError::LengthMismatch {
                name: String::from("<validity>"),
                expected: values.len(),
                actual: validity.len(),
            });
        }
        Ok(Self { values, validity })
    }

    /// Creates a column of `len` nulls.
    pub fn nulls(len: usize) -> Self {
        Self {
            values: vec![T::default(); len],
            validity: vec![false; len],
        }
    }

    /// Returns the number of rows.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if the column has no rows.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns `true` if row `i` holds a value.
    pub fn is_valid(&self, i: usize) -> bool {
        self.validity[i]
    }

    /// Returns the value at row `i`, or `None` if it is null or out of bounds.
    pub fn get(&self, i: usize) -> Option<&T> {
        match self.validity.get(i) {
            Some(true) => self.values.get(i),
            _ => None,
        }
    }

    /// Raw value storage; slots that are null hold an unspecified value.
    pub fn values(&self) -> &[T] {
        &self.values
    }

    /// Validity mask.
    pub fn validity(&self) -> &[bool] {
        &self.validity
    }

    /// Number of null rows.
    pub fn null_count(&self) -> usize {
        self.validity.iter().filter(|v| !**v).count()
    }

    /// Iterates rows as options.
    pub fn iter(&self) -> impl Iterator<Item = Option<&T>> + '_ {
        self.values
            .iter()
            .zip(&self.validity)
            .map(|(v, valid)| valid.then_some(v))
    }

    /// Compares row `i` of `self` with row `j` of `other`, nulls last.
    pub fn compare(&self, i: usize, other: &Self, j: usize) -> Ordering {
        match (self.validity[i], other.validity[j]) {
            (true, true) => self.values[i].cmp_value(&other.values[j]),
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => Ordering::Equal,
        }
    }

    /// Returns `true` if row `i` of `self` equals row `j` of `other`; nulls equal nulls.
    pub fn equals(&self, i: usize, other: &Self, j: usize) -> bool {
        match (self.validity[i], other.validity[j]) {
            (true, true) => self.values[i].eq_value(&other.values[j]),
            (valid_a, valid_b) => valid_a == valid_b,
        }
    }

    /// Hashable key of row `i`.
    pub fn key(&self, i: usize) -> KeyScalar<'_> {
        if self.validity[i] {
            self.values[i].key()
        } else {
            KeyScalar::Null
        }
    }

    /// Builds a new column whose row `k` is row `indices[k]` of `self`, or null for `None`.
    ///
    /// # Panics
    ///
    /// Panics if a position is out of bounds.
    pub fn gather(&self, indices: &[Option<usize>]) -> Self {
        let mut values = Vec::with_capacity(indices.len());
        let mut validity = Vec::with_capacity(indices.len());
        for slot in indices {
            match *slot {
                Some(i) if self.validity[i] => {
                    values.push(self.values[i].clone());
                    validity.push(true);
                }
                _ => {
                    values.push(T::default());
                    validity.push(false);
                }
            }
        }
        Self { values, validity }
    }

    fn interleave(sources: &[&Column], picks: &[Option<(usize, usize)>]) -> Option<Self> {
        let typed = sources
            .iter()
            .map(|c| T::downcast(c))
            .collect::<Option<Vec<_>>>()?;
        let mut values = Vec::with_capacity(picks.len());
        let mut validity = Vec::with_capacity(picks.len());
        for pick in picks {
            match pick.and_then(|(s, i)| typed[s].get(i)) {
                Some(v) => {
                    values.push(v.clone());
                    validity.push(true);
                }
                None => {
                    values.push(T::default());
                    validity.push(false);
                }
            }
        }
        Some(Self { values, validity })
    }
}

impl<T: ColumnValue> PartialEq for TypedColumn<T> {
    fn eq(&self, other: &Self) -> bool {
        self.validity == other.validity
            && self
                .values
                .iter()
                .zip(&other.values)
                .zip(&self.validity)
                .all(|((a, b), &valid)| !valid || a.eq_value(b))
    }
}

impl<T: ColumnValue> From<Vec<T>> for TypedColumn<T> {
    fn from(values: Vec<T>) -> Self {
        let validity = vec![true; values.len()];
        Self { values, validity }
    }
}

impl<T: ColumnValue> FromIterator<Option<T>> for TypedColumn<T> {
    fn from_iter<I: IntoIterator<Item = Option<T>>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let (lower, _) = iter.size_hint();
        let mut values = Vec::with_capacity(lower);
        let mut validity = Vec::with_capacity(lower);
        for v in iter {
            validity.push(v.is_some());
            values.push(v.unwrap_or_default());
        }
        Self { values, validity }
    }
}

/// A typed, nullable column of one of the supported physical types.
#[derive(Debug, Clone)]
pub enum Column {
    /// `i8` values.
    Int8(TypedColumn<i8>),
    /// `i16` values.
    Int16(TypedColumn<i16>),
    /// `i32` values.
    Int32(TypedColumn<i32>),
    /// `i64` values.
    Int64(TypedColumn<i64>),
    /// `u8` values.
    UInt8(TypedColumn<u8>),
    /// `u16` values.
    UInt16(TypedColumn<u16>),
    /// `u32` values.
    UInt32(TypedColumn<u32>),
    /// `u64` values.
    UInt64(TypedColumn<u64>),
    /// `f32` values.
    Float32(TypedColumn<f32>),
    /// `f64` values.
    Float64(TypedColumn<f64>),
    /// `bool` values.
    Boolean(TypedColumn<bool>),
    /// UTF-8 strings.
    Utf8(TypedColumn<String>),
    /// Byte strings.
    Binary(TypedColumn<Vec<u8>>),
    /// Dictionary-encoded UTF-8 strings.
    Utf8Dictionary(DictionaryColumn),
}

macro_rules! dispatch {
    ($column:expr, $typed:ident => $body:expr) => {
        match $column {
            Column::Int8($typed) => $body,
            Column::Int16($typed) => $body,
            Column::Int32($typed) => $body,
            Column::Int64($typed) => $body,
            Column::UInt8($typed) => $body,
            Column::UInt16($typed) => $body,
            Column::UInt32($typed) => $body,
            Column::UInt64($typed) => $body,
            Column::Float32($typed) => $body,
            Column::Float64($typed) => $body,
            Column::Boolean($typed) => $body,
            Column::Utf8($typed) => $body,
            Column::Binary($typed) => $body,
            Column::Utf8Dictionary($typed) => $body,
        }
    };
}

macro_rules! dispatch_type {
    ($data_type:expr, $t:ident => $body:expr, dictionary => $dictionary:expr) => {
        match $data_type {
            DataType::Int8 => {
                type $t = i8;
                $body
            }
            DataType::Int16 => {
                type $t = i16;
                $body
            }
            DataType::Int32 => {
                type $t = i32;
                $body
            }
            DataType::Int64 => {
                type $t = i64;
                $body
            }
            DataType::UInt8 => {
                type $t = u8;
                $body
            }
            DataType::UInt16 => {
                type $t = u16;
                $body
            }
            DataType::UInt32 => {
                type $t = u32;
                $body
            }
            DataType::UInt64 => {
                type $t = u64;
                $body
            }
            DataType::Float32 => {
                type $t = f32;
                $body
            }
            DataType::Float64 => {
                type $t = f64;
                $body
            }
            DataType::Boolean => {
                type $t = bool;
                $body
            }
            DataType::Utf8 => {
                type $t = String;
                $body
            }
            DataType::Binary => {
                type $t = Vec<u8>;
                $body
            }
            DataType::Utf8Dictionary => $dictionary,
        }
    };
}

impl Column {
    /// Creates a column of `len` nulls of the given type.
    pub fn new_null(data_type: DataType, len: usize) -> Self {
        dispatch_type!(
            data_type,
            T => T::wrap(TypedColumn::<T>::nulls(len)),
            dictionary => Self::Utf8Dictionary(DictionaryColumn::nulls(len))
        )
    }

    /// Returns the physical type.
    pub fn data_type(&self) -> DataType {
        match self {
            Self::Int8(_) => DataType::Int8,
            Self::Int16(_) => DataType::Int16,
            Self::Int32(_) => DataType::Int32,
            Self::Int64(_) => DataType::Int64,
            Self::UInt8(_) => DataType::UInt8,
            Self::UInt16(_) => DataType::UInt16,
            Self::UInt32(_) => DataType::UInt32,
            Self::UInt64(_) => DataType::UInt64,
            Self::Float32(_) => DataType::Float32,
            Self::Float64(_) => DataType::Float64,
            Self::Boolean(_) => DataType::Boolean,
            Self::Utf8(_) => DataType::Utf8,
            Self::Binary(_) => DataType::Binary,
            Self::Utf8Dictionary(_) => DataType::Utf8Dictionary,
        }
    }

    /// Returns the number of rows.
    pub fn len(&self) -> usize {
        dispatch!(self, c => c.len())
    }

    /// Returns `true` if the column has no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of null rows.
    pub fn null_count(&self) -> usize {
        dispatch!(self, c => c.null_count())
    }

    /// Returns `true` if row `i` holds a value.
    pub fn is_valid(&self, i: usize) -> bool {
        dispatch!(self, c => c.is_valid(i))
    }

    /// Returns `true` if row `i` is null.
    pub fn is_null(&self, i: usize) -> bool {
        !self.is_valid(i)
    }

    /// Orders rows `i` and `j` of this column, nulls last.
    pub fn compare(&self, i: usize, j: usize) -> Ordering {
        dispatch!(self, c => c.compare(i, c, j))
    }

    /// Returns `true` if rows `i` and `j` are equal; two nulls are equal.
    pub fn equals_at(&self, i: usize, j: usize) -> bool {
        dispatch!(self, c => c.equals(i, c, j))
    }

    /// Orders row `i` of `self` against row `j` of `other`.
    ///
    /// Returns `None` if the two columns have different types.
    pub fn compare_across(&self, other: &Self, i: usize, j: usize) -> Option<Ordering> {
        dispatch!(self, c => same_kind(c, other).map(|b| c.compare(i, b, j)))
    }

    /// Returns `true` if row `i` of `self` equals row `j` of `other`.
    ///
    /// Columns of different types never compare equal.
    pub fn equals_across(&self, other: &Self, i: usize, j: usize) -> bool {
        dispatch!(self, c => same_kind(c, other).is_some_and(|b| c.equals(i, b, j)))
    }

    /// Hashable key image of row `i`.
    pub fn key(&self, i: usize) -> KeyScalar<'_> {
        dispatch!(self, c => c.key(i))
    }

    /// Builds a new column by selecting rows at `indices`; `None` slots become null.
    ///
    /// # Panics
    ///
    /// Panics if a position is out of bounds.
    pub fn gather(&self, indices: &[Option<usize>]) -> Self {
        dispatch!(self, c => Self::from(c.gather(indices)))
    }

    /// Builds a new column where slot `k` takes row `picks[k].1` of `sources[picks[k].0]`.
    ///
    /// `None` picks become null. Returns `None` if `sources` is empty or mixes types.
    ///
    /// # Panics
    ///
    /// Panics if a source index is out of bounds.
    pub fn interleave(sources: &[&Self], picks: &[Option<(usize, usize)>]) -> Option<Self> {
        let first = sources.first()?;
        dispatch_type!(
            first.data_type(),
            T => TypedColumn::<T>::interleave(sources, picks).map(T::wrap),
            dictionary => DictionaryColumn::interleave(sources, picks).map(Self::Utf8Dictionary)
        )
    }

    /// Borrows the dictionary-encoded column, if this is one.
    pub fn as_utf8_dictionary(&self) -> Option<&DictionaryColumn> {
        DictionaryColumn::downcast_from(self)
    }
}

/// Column storage that can be recovered from a [`Column`].
trait ColumnArray {
    fn downcast_from(column: &Column) -> Option<&Self>;
}

impl<T: ColumnValue> ColumnArray for TypedColumn<T> {
    fn downcast_from(column: &Column) -> Option<&Self> {
        T::downcast(column)
    }
}

impl ColumnArray for DictionaryColumn {
    fn downcast_from(column: &Column) -> Option<&Self> {
        match column {
            Column::Utf8Dictionary(c) => Some(c),
            _ => None,
        }
    }
}

/// Borrows `other` as the same storage type as `_like`.
fn same_kind<'a, C: ColumnArray>(_like: &C, other: &'a Column) -> Option<&'a C> {
    C::downcast_from(other)
}

impl PartialEq for Column {
    fn eq(&self, other: &Self) -> bool {
        dispatch!(self, c => same_kind(c, other).is_some_and(|b| c == b))
    }
}

impl From<DictionaryColumn> for Column {
    fn from(column: DictionaryColumn) -> Self {
        Self::Utf8Dictionary(column)
    }
}

impl<T: ColumnValue> From<TypedColumn<T>> for Column {
    fn from(column: TypedColumn<T>) -> Self {
        T::wrap(column)
    }
}

impl<T: ColumnValue> From<Vec<T>> for Column {
    fn from(values: Vec<T>) -> Self {
        T::wrap(TypedColumn::from(values))
    }
}

impl<T: ColumnValue> From<Vec<Option<T>>> for Column {
    fn from(values: Vec<Option<T>>) -> Self {
        T::wrap(values.into_iter().collect())
    }
}

impl From<Vec<&str>> for Column {
    fn from(values: Vec<&str>) -> Self {
        Self::Utf8(values.into_iter().map(|s| Some(String::from(s))).collect())
    }
}

impl From<Vec<Option<&str>>> for Column {
    fn from(values: Vec<Option<&str>>) -> Self {
        Self::Utf8(values.into_iter().map(|s| s.map(String::from)).collect())
    }
}

fn cmp_f64(a: f64, b: f64) -> Ordering {
    match a.partial_cmp(&b) {
        Some(ord) => ord,
        None => {
            // NaN sorts after every number and equals itself.
            if a.is_nan() && !b.is_nan() {
                Ordering::Greater
            } else if !a.is_nan() && b.is_nan() {
                Ordering::Less
            } else {
                Ordering::Equal
            }
        }
    }
}

fn canonical_f64_bits(v: f64) -> u64 {
    if v.is_nan() {
        f64::NAN.to_bits()
    } else if v == 0.0 {
        0
    } else {
        v.to_bits()
    }
}

macro_rules! impl_column_value {
    ($t:ty, $variant:ident, $as_fn:ident, |$v:ident| $key:expr, |$a:ident, $b:ident| $cmp:expr) => {
        impl ColumnValue for $t {
            const DATA_TYPE: DataType = DataType::$variant;

            fn cmp_value(&self, other: &Self) -> Ordering {
                let ($a, $b) = (self, other);
                $cmp
            }

            fn key(&self) -> KeyScalar<'_> {
                let $v = self;
                $key
            }

            fn downcast(column: &Column) -> Option<&TypedColumn<Self>> {
                match column {
                    Column::$variant(c) => Some(c),
                    _ => None,
                }
            }

            fn wrap(column: TypedColumn<Self>) -> Column {
                Column::$variant(column)
            }
        }

        impl Column {
            #[doc = concat!("Borrows the `", stringify!($t), "` column, if this is one.")]
            pub fn $as_fn(&self) -> Option<&TypedColumn<$t>> {
                <$t as ColumnValue>::downcast(self)
            }
        }
    };
}

impl_column_value!(
    i8,
    Int8,
    as_int8,
    |v| KeyScalar::Int(i64::from(*v)),
    |a, b| a.cmp(b)
);
impl_column_value!(
    i16,
    Int16,
    as_int16,
    |v| KeyScalar::Int(i64::from(*v)),
    |a, b| a.cmp(b)
);
impl_column_value!(
    i32,
    Int32,
    as_int32,
    |v| KeyScalar::Int(i64::from(*v)),
    |a, b| a.cmp(b)
);
impl_column_value!(
    i64,
    Int64,
    as_int64,
    |v| KeyScalar::Int(*v),
    |a, b| a.cmp(b)
);
impl_column_value!(
    u8,
    UInt8,
    as_uint8,
    |v| KeyScalar::UInt(u64::from(*v)),
    |a, b| a.cmp(b)
);
impl_column_value!(
    u16,
    UInt16,
    as_uint16,
    |v| KeyScalar::UInt(u64::from(*v)),
    |a, b| a.cmp(b)
);
impl_column_value!(
    u32,
    UInt32,
    as_uint32,
    |v| KeyScalar::UInt(u64::from(*v)),
    |a, b| a.cmp(b)
);
impl_column_value!(
    u64,
    UInt64,
    as_uint64,
    |v| KeyScalar::UInt(*v),
    |a, b| a.cmp(b)
);
impl_column_value!(
    f32,
    Float32,
    as_float32,
    |v| KeyScalar::Float(canonical_f64_bits(f64::from(*v))),
    |a, b| cmp_f64(f64::from(*a), f64::from(*b))
);
impl_column_value!(
    f64,
    Float64,
    as_float64,
    |v| KeyScalar::Float(canonical_f64_bits(*v)),
    |a, b| cmp_f64(*a, *b)
);
impl_column_value!(
    bool,
    Boolean,
    as_boolean,
    |v| KeyScalar::Bool(*v),
    |a, b| a.cmp(b)
);
impl_column_value!(
    String,
    Utf8,
    as_utf8,
    |v| KeyScalar::Bytes(v.as_bytes()),
    |a, b| a.cmp(b)
);
impl_column_value!(
    Vec<u8>,
    Binary,
    as_binary,
    |v| KeyScalar::Bytes(v.as_slice()),
    |a, b| a.cmp(b)
);
