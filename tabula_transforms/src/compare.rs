// Copyright 2025 the Tabula Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Multi-column row ordering.

extern crate alloc;

use alloc::vec::Vec;
use core::cmp::Ordering;

use tabula_core::{Batch, Column, SchemaError};

/// Lexicographic row comparator over a batch's key columns.
///
/// The first column is primary; later columns break ties. Each column orders nulls last.
#[derive(Debug)]
pub(crate) struct RowComparator<'a> {
    columns: Vec<&'a Column>,
}

impl<'a> RowComparator<'a> {
    /// Resolves `keys` against `batch`.
    pub(crate) fn new(batch: &'a Batch, keys: &[&str]) -> Result<Self, SchemaError> {
        if keys.is_empty() {
            return Err(SchemaError::EmptyKey);
        }
        let columns = keys
            .iter()
            .map(|k| batch.require_column(k).map(|i| &*batch.columns()[i]))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { columns })
    }

    pub(crate) fn compare(&self, a: usize, b: usize) -> Ordering {
        for c in &self.columns {
            let ord = c.compare(a, b);
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }

    /// Returns the stable ascending permutation of `0..rows`.
    ///
    /// Rows with equal keys keep their original relative order.
    pub(crate) fn sort_permutation(&self, rows: usize) -> Vec<usize> {
        let mut idx: Vec<usize> = (0..rows).collect();
        idx.sort_by(|&a, &b| self.compare(a, b));
        idx
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;

    use super::*;

    #[test]
    fn ties_fall_through_to_later_columns() {
        let b = Batch::try_from_columns([
            ("a", Column::from(vec!["1", "2", "1", "2", "0"])),
            ("b", Column::from(vec![100_i32, 150, 99, 200, 1000])),
        ])
        .unwrap();
        let cmp = RowComparator::new(&b, &["a", "b"]).unwrap();
        assert_eq!(cmp.sort_permutation(b.num_rows()), vec![4, 2, 0, 1, 3]);
    }

    #[test]
    fn equal_keys_keep_input_order() {
        let keys = Column::from(vec![Some(2_i64), None, Some(1), Some(2), None]);
        let b = Batch::try_from_columns([("k", keys)]).unwrap();
        let cmp = RowComparator::new(&b, &["k"]).unwrap();
        assert_eq!(cmp.sort_permutation(5), vec![2, 0, 3, 1, 4]);
    }

    #[test]
    fn rejects_unknown_and_empty_keys() {
        let b = Batch::try_from_columns([("k", Column::from(vec![1_u8]))]).unwrap();
        assert_eq!(
            RowComparator::new(&b, &["k", "missing"]).unwrap_err(),
            SchemaError::column_not_found("missing")
        );
        assert_eq!(
            RowComparator::new(&b, &[]).unwrap_err(),
            SchemaError::EmptyKey
        );
    }
}
