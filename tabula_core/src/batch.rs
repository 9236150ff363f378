// Copyright 2025 the Tabula Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Schemas and record batches.

extern crate alloc;

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::{Column, DataType, SchemaError};

/// Batch-level key/value metadata.
///
/// A sorted map so that equality and iteration order are deterministic.
pub type Metadata = BTreeMap<String, String>;

/// A named, typed column slot of a [`Schema`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Field {
    /// Column name, unique within a schema.
    pub name: String,
    /// Physical type.
    pub data_type: DataType,
}

impl Field {
    /// Creates a field.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

/// An ordered list of uniquely named fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Schema {
    fields: Vec<Field>,
}

impl Schema {
    /// Creates a schema, rejecting duplicate names.
    pub fn try_new(fields: Vec<Field>) -> Result<Self, SchemaError> {
        for (i, f) in fields.iter().enumerate() {
            if fields[..i].iter().any(|g| g.name == f.name) {
                return Err(SchemaError::DuplicateColumn {
                    name: f.name.clone(),
                });
            }
        }
        Ok(Self { fields })
    }

    /// Returns the fields in order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Returns the field at position `i`.
    pub fn field(&self, i: usize) -> Option<&Field> {
        self.fields.get(i)
    }

    /// Returns the number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if there are no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns the position of the named field.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Returns `true` if a field with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }

    /// Iterates field names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.fields.iter().map(|f| f.name.as_str())
    }
}

/// Owned pieces of a [`Batch`], as exchanged with a host adapter.
#[derive(Debug, Clone, Default)]
pub struct BatchParts {
    /// Column fields, in display order.
    pub fields: Vec<Field>,
    /// Columns aligned to `fields`.
    pub columns: Vec<Arc<Column>>,
    /// Batch metadata.
    pub metadata: Metadata,
}

/// An ordered set of uniquely named, equal-length columns plus metadata.
///
/// Batches are immutable. Columns are reference counted so that transforms which keep a column
/// unchanged share it with their input instead of copying it.
#[derive(Debug, Clone)]
pub struct Batch {
    schema: Schema,
    columns: Vec<Arc<Column>>,
    metadata: Metadata,
    row_count: usize,
}

impl Batch {
    /// Creates a batch, validating column count, types and lengths against `schema`.
    pub fn try_new(
        schema: Schema,
        columns: Vec<Arc<Column>>,
        metadata: Metadata,
    ) -> Result<Self, SchemaError> {
        if schema.len() != columns.len() {
            return Err(SchemaError::ColumnCountMismatch {
                fields: schema.len(),
                columns: columns.len(),
            });
        }
        let row_count = columns.first().map_or(0, |c| c.len());
        for (field, column) in schema.fields().iter().zip(&columns) {
            if column.data_type() != field.data_type {
                return Err(SchemaError::TypeMismatch {
                    name: field.name.clone(),
                    expected: field.data_type,
                    actual: column.data_type(),
                });
            }
            if column.len() != row_count {
                return Err(SchemaError::LengthMismatch {
                    name: field.name.clone(),
                    expected: row_count,
                    actual: column.len(),
                });
            }
        }
        Ok(Self {
            schema,
            columns,
            metadata,
            row_count,
        })
    }

    /// Creates a batch from `(name, column)` pairs with empty metadata.
    pub fn try_from_columns<I, S>(columns: I) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = (S, Column)>,
        S: Into<String>,
    {
        let mut fields = Vec::new();
        let mut cols = Vec::new();
        for (name, column) in columns {
            fields.push(Field::new(name, column.data_type()));
            cols.push(Arc::new(column));
        }
        Self::try_new(Schema::try_new(fields)?, cols, Metadata::new())
    }

    /// Creates a zero-row batch with the given schema.
    pub fn empty(schema: Schema) -> Self {
        let columns = schema
            .fields()
            .iter()
            .map(|f| Arc::new(Column::new_null(f.data_type, 0)))
            .collect();
        Self {
            schema,
            columns,
            metadata: Metadata::new(),
            row_count: 0,
        }
    }

    /// Reassembles a batch from adapter-supplied parts.
    pub fn try_from_parts(parts: BatchParts) -> Result<Self, SchemaError> {
        let BatchParts {
            fields,
            columns,
            metadata,
        } = parts;
        Self::try_new(Schema::try_new(fields)?, columns, metadata)
    }

    /// Splits the batch into owned parts for a host adapter.
    pub fn into_parts(self) -> BatchParts {
        BatchParts {
            fields: self.schema.fields,
            columns: self.columns,
            metadata: self.metadata,
        }
    }

    /// Returns the schema.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Returns the shared row count.
    pub fn num_rows(&self) -> usize {
        self.row_count
    }

    /// Returns the number of columns.
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Returns all columns in schema order.
    pub fn columns(&self) -> &[Arc<Column>] {
        &self.columns
    }

    /// Returns the column at position `i`.
    pub fn column(&self, i: usize) -> Option<&Arc<Column>> {
        self.columns.get(i)
    }

    /// Returns the named column.
    pub fn column_by_name(&self, name: &str) -> Option<&Arc<Column>> {
        self.schema.index_of(name).map(|i| &self.columns[i])
    }

    /// Returns the position of the named column or [`SchemaError::ColumnNotFound`].
    pub fn require_column(&self, name: &str) -> Result<usize, SchemaError> {
        self.schema
            .index_of(name)
            .ok_or_else(|| SchemaError::column_not_found(name))
    }

    /// Returns the metadata map.
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Returns a metadata value.
    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }

    /// Returns a batch with the same columns and the given metadata.
    pub fn with_metadata(&self, metadata: Metadata) -> Self {
        Self {
            schema: self.schema.clone(),
            columns: self.columns.clone(),
            metadata,
            row_count: self.row_count,
        }
    }
}

impl PartialEq for Batch {
    fn eq(&self, other: &Self) -> bool {
        self.schema == other.schema
            && self.metadata == other.metadata
            && self.row_count == other.row_count
            && self
                .columns
                .iter()
                .zip(&other.columns)
                .all(|(a, b)| Arc::ptr_eq(a, b) || a == b)
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::string::ToString;
    use alloc::vec;

    use super::*;

    fn sample() -> Batch {
        Batch::try_from_columns([
            ("a", Column::from(vec![1_i64, 2, 3])),
            ("b", Column::from(vec![Some("x"), None, Some("z")])),
        ])
        .unwrap()
    }

    #[test]
    fn rejects_duplicate_names() {
        let err = Batch::try_from_columns([
            ("a", Column::from(vec![1_i8])),
            ("a", Column::from(vec![2_i8])),
        ])
        .unwrap_err();
        assert_eq!(err, SchemaError::DuplicateColumn { name: "a".into() });
    }

    #[test]
    fn rejects_ragged_columns() {
        let err = Batch::try_from_columns([
            ("a", Column::from(vec![1_i8, 2])),
            ("b", Column::from(vec![2_i8])),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            SchemaError::LengthMismatch {
                name: "b".into(),
                expected: 2,
                actual: 1,
            }
        );
    }

    #[test]
    fn rejects_type_mismatch_against_schema() {
        let schema = Schema::try_new(vec![Field::new("a", DataType::Int32)]).unwrap();
        let err = Batch::try_new(
            schema,
            vec![Arc::new(Column::from(vec![1.5_f64]))],
            Metadata::new(),
        )
        .unwrap_err();
        assert!(matches!(err, SchemaError::TypeMismatch { .. }));
    }

    #[test]
    fn lookup_by_name() {
        let b = sample();
        assert_eq!(b.num_rows(), 3);
        assert_eq!(b.require_column("b"), Ok(1));
        assert_eq!(
            b.require_column("nope"),
            Err(SchemaError::column_not_found("nope"))
        );
        assert_eq!(b.column_by_name("a").unwrap().data_type(), DataType::Int64);
    }

    #[test]
    fn parts_round_trip_preserves_everything() {
        let mut meta = Metadata::new();
        meta.insert("k".to_string(), "v".to_string());
        meta.insert("tabula:index".to_string(), "a".to_string());
        let b = sample().with_metadata(meta);
        let back = Batch::try_from_parts(b.clone().into_parts()).unwrap();
        assert_eq!(back, b);
        assert_eq!(back.metadata_value("k"), Some("v"));
        assert_eq!(back.schema().names().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn equality_covers_metadata_and_nulls() {
        let a = sample();
        let mut meta = Metadata::new();
        meta.insert("k".to_string(), "v".to_string());
        assert_ne!(a, a.with_metadata(meta));

        let c = Batch::try_from_columns([
            ("a", Column::from(vec![1_i64, 2, 3])),
            ("b", Column::from(vec![Some("x"), Some("y"), Some("z")])),
        ])
        .unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn empty_batch_keeps_schema() {
        let b = Batch::empty(sample().schema().clone());
        assert_eq!(b.num_rows(), 0);
        assert_eq!(b.num_columns(), 2);
        assert_eq!(b.column(1).unwrap().data_type(), DataType::Utf8);
    }
}
