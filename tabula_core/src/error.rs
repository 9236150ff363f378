// Copyright 2025 the Tabula Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Schema errors shared by batch construction and every transform.

extern crate alloc;

use alloc::string::String;

use thiserror::Error;

use crate::DataType;

/// Errors raised when a batch or a transform references an invalid schema.
///
/// This is the only failure kind of the engine: given valid schemas every
/// operation is total.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// A referenced column name does not exist.
    #[error("column `{name}` not found")]
    ColumnNotFound {
        /// The missing column name.
        name: String,
    },
    /// Two columns of one batch share a name.
    #[error("duplicate column `{name}`")]
    DuplicateColumn {
        /// The repeated column name.
        name: String,
    },
    /// The number of columns does not match the number of schema fields.
    #[error("schema has {fields} fields but {columns} columns were given")]
    ColumnCountMismatch {
        /// Number of schema fields.
        fields: usize,
        /// Number of columns.
        columns: usize,
    },
    /// A column's length differs from the batch row count.
    #[error("column `{name}` has {actual} rows, expected {expected}")]
    LengthMismatch {
        /// The offending column.
        name: String,
        /// The batch row count.
        expected: usize,
        /// The column's length.
        actual: usize,
    },
    /// A column's physical type differs from the declared one.
    #[error("column `{name}` has type {actual}, expected {expected}")]
    TypeMismatch {
        /// The offending column.
        name: String,
        /// The declared type.
        expected: DataType,
        /// The column's type.
        actual: DataType,
    },
    /// A transform was given no key columns.
    #[error("at least one key column is required")]
    EmptyKey,
    /// The batch already carries the reserved synthetic index column.
    #[error("batch already has an index column `{name}`")]
    IndexColumnExists {
        /// The reserved column name.
        name: String,
    },
    /// A merge key has different physical types on the two sides.
    #[error("merge key `{name}` has type {left} on the left but {right} on the right")]
    IncompatibleKeyType {
        /// The key column.
        name: String,
        /// Left-hand type.
        left: DataType,
        /// Right-hand type.
        right: DataType,
    },
    /// A non-key column exists on both sides of a merge.
    #[error("column `{name}` exists on both sides of the merge")]
    ColumnCollision {
        /// The colliding output name.
        name: String,
    },
    /// A dictionary key points past the end of its dictionary.
    #[error("dictionary key {key} is out of range for {len} values")]
    InvalidDictionaryKey {
        /// The offending key.
        key: u32,
        /// Dictionary size.
        len: usize,
    },
    /// More distinct strings than a `u32` key can address.
    #[error("dictionary of {len} values exceeds the key range")]
    DictionaryTooLarge {
        /// Number of distinct values already encoded.
        len: usize,
    },
}

impl SchemaError {
    /// Shorthand for [`SchemaError::ColumnNotFound`].
    pub fn column_not_found(name: impl Into<String>) -> Self {
        Self::ColumnNotFound { name: name.into() }
    }
}
