// Copyright 2025 the Tabula Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Physical column types.

use core::fmt;

/// The physical type of a [`Column`](crate::Column).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    /// 8-bit signed integer.
    Int8,
    /// 16-bit signed integer.
    Int16,
    /// 32-bit signed integer.
    Int32,
    /// 64-bit signed integer.
    Int64,
    /// 8-bit unsigned integer.
    UInt8,
    /// 16-bit unsigned integer.
    UInt16,
    /// 32-bit unsigned integer.
    UInt32,
    /// 64-bit unsigned integer.
    UInt64,
    /// 32-bit IEEE float.
    Float32,
    /// 64-bit IEEE float.
    Float64,
    /// Boolean.
    Boolean,
    /// Variable-length UTF-8 string.
    Utf8,
    /// Variable-length byte string.
    Binary,
    /// UTF-8 string stored as keys into a dictionary of distinct values.
    Utf8Dictionary,
}

impl DataType {
    /// Returns the lower-case type name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::UInt8 => "uint8",
            Self::UInt16 => "uint16",
            Self::UInt32 => "uint32",
            Self::UInt64 => "uint64",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::Boolean => "bool",
            Self::Utf8 => "utf8",
            Self::Binary => "binary",
            Self::Utf8Dictionary => "dictionary<utf8>",
        }
    }

    /// Returns `true` for the signed integer types.
    pub const fn is_signed_integer(self) -> bool {
        matches!(self, Self::Int8 | Self::Int16 | Self::Int32 | Self::Int64)
    }

    /// Returns the narrowest signed integer type that can hold every value in `0..len`.
    ///
    /// `len` values need a maximum of `len - 1`, so 128 rows still fit in `Int8`.
    pub const fn smallest_signed_for_len(len: usize) -> Self {
        let max = len.saturating_sub(1) as u128;
        if max <= i8::MAX as u128 {
            Self::Int8
        } else if max <= i16::MAX as u128 {
            Self::Int16
        } else if max <= i32::MAX as u128 {
            Self::Int32
        } else {
            Self::Int64
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::DataType;

    #[test]
    fn index_width_boundaries() {
        assert_eq!(DataType::smallest_signed_for_len(0), DataType::Int8);
        assert_eq!(DataType::smallest_signed_for_len(128), DataType::Int8);
        assert_eq!(DataType::smallest_signed_for_len(129), DataType::Int16);
        assert_eq!(DataType::smallest_signed_for_len(32768), DataType::Int16);
        assert_eq!(DataType::smallest_signed_for_len(32769), DataType::Int32);
        assert_eq!(
            DataType::smallest_signed_for_len(1 << 31),
            DataType::Int32,
            "2^31 rows need a maximum of i32::MAX"
        );
        assert_eq!(
            DataType::smallest_signed_for_len((1 << 31) + 1),
            DataType::Int64
        );
    }
}
