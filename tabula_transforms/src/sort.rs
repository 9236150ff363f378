// Copyright 2025 the Tabula Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Stable multi-key sort.

extern crate alloc;

use alloc::sync::Arc;
use alloc::vec::Vec;

use tabula_core::{Batch, SchemaError};
use tracing::debug;

use crate::compare::RowComparator;
use crate::metadata::with_index_key;

/// Reorders the rows of `batch` by `key_columns`, ascending with nulls last.
///
/// Ties keep their original relative order. Every column is gathered, including a synthetic
/// index column if present; names, column order and row count are unchanged. The index metadata
/// entry is set to `key_columns[0]`.
pub fn sort(batch: &Batch, key_columns: &[&str]) -> Result<Batch, SchemaError> {
    let comparator = RowComparator::new(batch, key_columns)?;
    let permutation: Vec<Option<usize>> = comparator
        .sort_permutation(batch.num_rows())
        .into_iter()
        .map(Some)
        .collect();

    let columns = batch
        .columns()
        .iter()
        .map(|c| Arc::new(c.gather(&permutation)))
        .collect();

    debug!(rows = batch.num_rows(), keys = ?key_columns, "sort");

    Batch::try_new(
        batch.schema().clone(),
        columns,
        with_index_key(batch.metadata(), key_columns[0]),
    )
}
