// Copyright 2025 the Tabula Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property tests for index, sort and merge.

use std::collections::BTreeMap;

use proptest::prelude::*;
use tabula_core::{Batch, Column};
use tabula_transforms::{INDEX_COLUMN_NAME, JoinType, add_index, merge, sort};

/// Nullable keys over a tiny domain so duplicates and null groups are common.
fn arb_keys(max_len: usize) -> impl Strategy<Value = Vec<Option<i8>>> {
    prop::collection::vec(prop::option::of(0_i8..4), 0..max_len)
}

fn keyed_batch(keys: &[Option<i8>], payload: &str) -> Batch {
    let rows: Vec<u32> = (0..).take(keys.len()).collect();
    Batch::try_from_columns([
        ("k", Column::from(keys.to_vec())),
        (payload, Column::from(rows)),
    ])
    .unwrap()
}

/// Reference stable ascending order with nulls last.
fn reference_order(keys: &[Option<i8>]) -> Vec<usize> {
    let mut idx: Vec<usize> = (0..keys.len()).collect();
    idx.sort_by_key(|&i| (keys[i].is_none(), keys[i]));
    idx
}

fn key_counts(column: &Column) -> BTreeMap<Option<i8>, usize> {
    let mut counts = BTreeMap::new();
    for v in column.as_int8().unwrap().iter() {
        *counts.entry(v.copied()).or_insert(0) += 1;
    }
    counts
}

proptest! {
    #[test]
    fn index_is_the_stable_ordinal_permutation(keys in arb_keys(64)) {
        let b = keyed_batch(&keys, "row");
        let out = add_index(&b, &["k"]).unwrap();
        let index: Vec<usize> = out
            .column_by_name(INDEX_COLUMN_NAME)
            .unwrap()
            .as_int8()
            .unwrap()
            .iter()
            .map(|v| usize::try_from(*v.unwrap()).unwrap())
            .collect();

        let mut seen = index.clone();
        seen.sort_unstable();
        prop_assert_eq!(seen, (0..keys.len()).collect::<Vec<_>>());
        prop_assert_eq!(index, reference_order(&keys));
    }

    #[test]
    fn sort_is_stable_and_idempotent(keys in arb_keys(64)) {
        let b = keyed_batch(&keys, "row");
        let once = sort(&b, &["k"]).unwrap();
        let twice = sort(&once, &["k"]).unwrap();
        prop_assert_eq!(&once, &twice);

        let expected: Vec<u32> = reference_order(&keys)
            .into_iter()
            .map(|i| u32::try_from(i).unwrap())
            .collect();
        prop_assert_eq!(&**once.column_by_name("row").unwrap(), &Column::from(expected));
    }

    #[test]
    fn inner_merge_multiplies_group_sizes(left in arb_keys(24), right in arb_keys(24)) {
        let l = keyed_batch(&left, "l");
        let r = keyed_batch(&right, "r");
        let out = merge(&l, &r, &["k"], JoinType::Inner).unwrap();

        let lc = key_counts(l.column_by_name("k").unwrap());
        let rc = key_counts(r.column_by_name("k").unwrap());
        let oc = key_counts(out.column_by_name("k").unwrap());
        for (key, n) in &lc {
            let expected = n * rc.get(key).copied().unwrap_or(0);
            prop_assert_eq!(oc.get(key).copied().unwrap_or(0), expected);
        }
        prop_assert_eq!(oc.values().sum::<usize>(), out.num_rows());
        prop_assert_eq!(out.schema().names().collect::<Vec<_>>(), vec!["k", "l", "r"]);
    }

    #[test]
    fn outer_merge_covers_every_input_row(left in arb_keys(24), right in arb_keys(24)) {
        let l = keyed_batch(&left, "l");
        let r = keyed_batch(&right, "r");
        let inner = merge(&l, &r, &["k"], JoinType::Inner).unwrap();
        let outer = merge(&l, &r, &["k"], JoinType::Outer).unwrap();

        let unmatched_left = left.iter().filter(|k| !right.contains(k)).count();
        let unmatched_right = right.iter().filter(|k| !left.contains(k)).count();
        prop_assert_eq!(
            outer.num_rows(),
            inner.num_rows() + unmatched_left + unmatched_right
        );
        // Null keys form one group: joined when both sides have nulls, kept as-is otherwise.
        let left_nulls = left.iter().filter(|k| k.is_none()).count();
        let right_nulls = right.iter().filter(|k| k.is_none()).count();
        let expected_nulls = if left_nulls > 0 && right_nulls > 0 {
            left_nulls * right_nulls
        } else {
            left_nulls + right_nulls
        };
        prop_assert_eq!(outer.column_by_name("k").unwrap().null_count(), expected_nulls);
    }

    #[test]
    fn left_merge_keeps_every_left_row(left in arb_keys(24), right in arb_keys(24)) {
        let l = keyed_batch(&left, "l");
        let r = keyed_batch(&right, "r");
        let out = merge(&l, &r, &["k"], JoinType::Left).unwrap();
        let rows: Vec<u32> = out
            .column_by_name("l")
            .unwrap()
            .as_uint32()
            .unwrap()
            .iter()
            .map(|v| *v.unwrap())
            .collect();
        // Left order is the primary grouping.
        prop_assert!(rows.windows(2).all(|w| w[0] <= w[1]));
        let mut distinct = rows.clone();
        distinct.dedup();
        prop_assert_eq!(distinct.len(), left.len());
    }

    #[test]
    fn parts_round_trip(keys in arb_keys(32)) {
        let b = add_index(&keyed_batch(&keys, "row"), &["k"]).unwrap();
        let back = Batch::try_from_parts(b.clone().into_parts()).unwrap();
        prop_assert_eq!(back, b);
    }
}
