// Copyright 2025 the Tabula Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Relational merge (join) of two batches on shared key columns.
//!
//! The join is a hash join: a multi-map from key tuple to row positions is built over one side and
//! probed with the other in input order. Null keys hash to their own bucket, so null matches null.
//!
//! Output layout:
//! - the `on` columns once, in `on` order, taking each value from whichever side is present,
//! - then the left non-key columns in their original order,
//! - then the right non-key columns in their original order.
//!
//! The synthetic index column is dropped from both inputs, and the output metadata is empty: a
//! join invalidates any prior index.

extern crate alloc;

use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec;
use alloc::vec::Vec;
use core::fmt;
use core::str::FromStr;

use hashbrown::{HashMap, HashSet};
use smallvec::SmallVec;
use tabula_core::{Batch, Column, Field, KeyScalar, Metadata, Schema, SchemaError};
use thiserror::Error;
use tracing::{debug, trace};

use crate::metadata::INDEX_COLUMN_NAME;

/// Which unmatched rows a merge keeps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum JoinType {
    /// Only rows whose key exists on both sides.
    #[default]
    Inner,
    /// Every left row; unmatched rows get null right columns.
    Left,
    /// Every right row; unmatched rows get null left columns.
    Right,
    /// Every row of both sides.
    Outer,
}

impl JoinType {
    /// Returns the lower-case name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Inner => "inner",
            Self::Left => "left",
            Self::Right => "right",
            Self::Outer => "outer",
        }
    }
}

impl fmt::Display for JoinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown join kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported merge kind `{0}` (expected inner, left, right or outer)")]
pub struct ParseJoinTypeError(pub String);

impl FromStr for JoinType {
    type Err = ParseJoinTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("inner") {
            Ok(Self::Inner)
        } else if s.eq_ignore_ascii_case("left") {
            Ok(Self::Left)
        } else if s.eq_ignore_ascii_case("right") {
            Ok(Self::Right)
        } else if s.eq_ignore_ascii_case("outer") {
            Ok(Self::Outer)
        } else {
            Err(ParseJoinTypeError(String::from(s)))
        }
    }
}

/// Options for [`merge_with`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeOptions {
    /// Join kind.
    pub how: JoinType,
    /// Suffix appended to the name of every right non-key column.
    ///
    /// Without a suffix, a right column whose name already exists on the left is rejected, as is a
    /// suffixed name that still collides.
    pub right_suffix: Option<String>,
}

impl MergeOptions {
    /// Options for the given join kind, without a suffix.
    pub fn new(how: JoinType) -> Self {
        Self {
            how,
            right_suffix: None,
        }
    }

    /// Sets the suffix appended to right non-key column names.
    #[must_use]
    pub fn with_right_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.right_suffix = Some(suffix.into());
        self
    }
}

/// Joins `left` and `right` on the shared columns `on`.
///
/// See [`merge_with`]; colliding non-key column names are rejected.
pub fn merge(
    left: &Batch,
    right: &Batch,
    on: &[&str],
    how: JoinType,
) -> Result<Batch, SchemaError> {
    merge_with(left, right, on, &MergeOptions::new(how))
}

/// Joins `left` and `right` on the shared columns `on`.
///
/// Row order:
/// - `Inner`/`Left`: left input order; several right matches expand in right input order.
/// - `Right`: the mirror, driven by right input order.
/// - `Outer`: as `Left`, followed by unmatched right rows in right input order.
///
/// A key present `p` times on the left and `q` times on the right yields `p * q` rows.
pub fn merge_with(
    left: &Batch,
    right: &Batch,
    on: &[&str],
    options: &MergeOptions,
) -> Result<Batch, SchemaError> {
    if on.is_empty() {
        return Err(SchemaError::EmptyKey);
    }
    let left_keys = key_columns(left, on)?;
    let right_keys = key_columns(right, on)?;
    for (name, (l, r)) in on.iter().zip(left_keys.iter().zip(&right_keys)) {
        if l.data_type() != r.data_type() {
            return Err(SchemaError::IncompatibleKeyType {
                name: String::from(*name),
                left: l.data_type(),
                right: r.data_type(),
            });
        }
    }

    let left_payload = payload_columns(left, on);
    let right_payload = payload_columns(right, on);
    let fields = output_fields(
        on,
        &left_keys,
        left,
        &left_payload,
        right,
        &right_payload,
        options.right_suffix.as_deref(),
    )?;

    let pairs = match options.how {
        JoinType::Inner => hash_join(&left_keys, &right_keys, false, false),
        JoinType::Left => hash_join(&left_keys, &right_keys, true, false),
        JoinType::Outer => hash_join(&left_keys, &right_keys, true, true),
        JoinType::Right => hash_join(&right_keys, &left_keys, true, false).swap(),
    };

    let mut columns = Vec::with_capacity(fields.len());
    let picks: Vec<Option<(usize, usize)>> = pairs
        .left
        .iter()
        .zip(&pairs.right)
        .map(|(l, r)| l.map(|i| (0, i)).or(r.map(|j| (1, j))))
        .collect();
    for (name, (l, r)) in on.iter().zip(left_keys.iter().zip(&right_keys)) {
        let key = Column::interleave(&[*l, *r], &picks).ok_or_else(|| {
            SchemaError::IncompatibleKeyType {
                name: String::from(*name),
                left: l.data_type(),
                right: r.data_type(),
            }
        })?;
        columns.push(Arc::new(key));
    }
    for &i in &left_payload {
        columns.push(Arc::new(left.columns()[i].gather(&pairs.left)));
    }
    for &i in &right_payload {
        columns.push(Arc::new(right.columns()[i].gather(&pairs.right)));
    }

    debug!(
        how = options.how.as_str(),
        keys = ?on,
        left_rows = left.num_rows(),
        right_rows = right.num_rows(),
        rows = pairs.left.len(),
        "merge"
    );

    Batch::try_new(Schema::try_new(fields)?, columns, Metadata::new())
}

/// Row pairs of a join; `None` marks the side that contributes nulls.
#[derive(Debug, Default)]
struct JoinIndices {
    left: Vec<Option<usize>>,
    right: Vec<Option<usize>>,
}

impl JoinIndices {
    fn push(&mut self, left: Option<usize>, right: Option<usize>) {
        self.left.push(left);
        self.right.push(right);
    }

    fn swap(self) -> Self {
        Self {
            left: self.right,
            right: self.left,
        }
    }
}

type KeyTuple<'a> = SmallVec<[KeyScalar<'a>; 4]>;

fn row_key<'a>(keys: &[&'a Column], row: usize) -> KeyTuple<'a> {
    keys.iter().map(|c| c.key(row)).collect()
}

/// Probes `build` with every `probe` row in order.
///
/// The result's `left` side holds probe rows and its `right` side build rows.
fn hash_join(
    probe: &[&Column],
    build: &[&Column],
    keep_unmatched_probe: bool,
    append_unmatched_build: bool,
) -> JoinIndices {
    let probe_rows = probe.first().map_or(0, |c| c.len());
    let build_rows = build.first().map_or(0, |c| c.len());

    let mut buckets: HashMap<KeyTuple<'_>, Vec<usize>> = HashMap::new();
    for j in 0..build_rows {
        buckets.entry(row_key(build, j)).or_default().push(j);
    }
    trace!(buckets = buckets.len(), build_rows, "join multi-map built");

    let mut out = JoinIndices::default();
    let tracked = if append_unmatched_build { build_rows } else { 0 };
    let mut build_matched = vec![false; tracked];
    for i in 0..probe_rows {
        match buckets.get(&row_key(probe, i)) {
            Some(rows) => {
                for &j in rows {
                    out.push(Some(i), Some(j));
                    if append_unmatched_build {
                        build_matched[j] = true;
                    }
                }
            }
            None if keep_unmatched_probe => out.push(Some(i), None),
            None => {}
        }
    }
    if append_unmatched_build {
        for (j, matched) in build_matched.iter().enumerate() {
            if !matched {
                out.push(None, Some(j));
            }
        }
    }
    out
}

fn key_columns<'a>(batch: &'a Batch, on: &[&str]) -> Result<Vec<&'a Column>, SchemaError> {
    on.iter()
        .map(|name| batch.require_column(name).map(|i| &*batch.columns()[i]))
        .collect()
}

/// Positions of the columns carried through besides the keys.
fn payload_columns(batch: &Batch, on: &[&str]) -> Vec<usize> {
    batch
        .schema()
        .fields()
        .iter()
        .enumerate()
        .filter(|(_, f)| {
            f.name != INDEX_COLUMN_NAME && !on.contains(&f.name.as_str())
        })
        .map(|(i, _)| i)
        .collect()
}

fn output_fields(
    on: &[&str],
    key_columns: &[&Column],
    left: &Batch,
    left_payload: &[usize],
    right: &Batch,
    right_payload: &[usize],
    right_suffix: Option<&str>,
) -> Result<Vec<Field>, SchemaError> {
    let mut fields = Vec::with_capacity(on.len() + left_payload.len() + right_payload.len());
    for (name, c) in on.iter().zip(key_columns) {
        fields.push(Field::new(*name, c.data_type()));
    }
    fields.extend(
        left_payload
            .iter()
            .map(|&i| left.schema().fields()[i].clone()),
    );

    let mut taken: HashSet<String> = fields.iter().map(|f| f.name.clone()).collect();
    for &i in right_payload {
        let field = &right.schema().fields()[i];
        let mut name = field.name.clone();
        if let Some(suffix) = right_suffix {
            name.push_str(suffix);
        }
        if !taken.insert(name.clone()) {
            return Err(SchemaError::ColumnCollision { name });
        }
        fields.push(Field::new(name, field.data_type));
    }
    Ok(fields)
}
