// Copyright 2025 the Tabula Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Synthetic ordinal index column.

extern crate alloc;

use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;

use tabula_core::{Batch, Column, ColumnValue, DataType, Field, Schema, SchemaError};
use tracing::debug;

use crate::compare::RowComparator;
use crate::metadata::{INDEX_COLUMN_NAME, with_index_key};

/// Prepends the synthetic [`INDEX_COLUMN_NAME`] column to `batch`.
///
/// Slot `k` of the index holds the row position of the `k`-th row in the stable ascending order by
/// `key_columns`, so the column is a permutation of `0..N`. It is typed as the narrowest signed
/// integer that holds `N - 1`. The original columns follow unchanged and are shared with `batch`.
///
/// The index metadata entry is set to `key_columns[0]`.
pub fn add_index(batch: &Batch, key_columns: &[&str]) -> Result<Batch, SchemaError> {
    let comparator = RowComparator::new(batch, key_columns)?;
    if batch.schema().contains(INDEX_COLUMN_NAME) {
        return Err(SchemaError::IndexColumnExists {
            name: String::from(INDEX_COLUMN_NAME),
        });
    }

    let permutation = comparator.sort_permutation(batch.num_rows());
    let index = ordinal_column(&permutation);

    let mut fields = Vec::with_capacity(batch.num_columns() + 1);
    fields.push(Field::new(INDEX_COLUMN_NAME, index.data_type()));
    fields.extend(batch.schema().fields().iter().cloned());

    let mut columns = Vec::with_capacity(batch.num_columns() + 1);
    columns.push(Arc::new(index));
    columns.extend(batch.columns().iter().cloned());

    debug!(
        rows = batch.num_rows(),
        keys = ?key_columns,
        "add_index"
    );

    Batch::try_new(
        Schema::try_new(fields)?,
        columns,
        with_index_key(batch.metadata(), key_columns[0]),
    )
}

fn ordinal_column(permutation: &[usize]) -> Column {
    match DataType::smallest_signed_for_len(permutation.len()) {
        DataType::Int8 => narrow::<i8>(permutation),
        DataType::Int16 => narrow::<i16>(permutation),
        DataType::Int32 => narrow::<i32>(permutation),
        _ => narrow::<i64>(permutation),
    }
}

fn narrow<T: ColumnValue + TryFrom<usize>>(permutation: &[usize]) -> Column {
    // The width was chosen so every position fits.
    Column::from(
        permutation
            .iter()
            .map(|&p| T::try_from(p).unwrap_or_default())
            .collect::<Vec<T>>(),
    )
}
