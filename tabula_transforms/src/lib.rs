// Copyright 2025 the Tabula Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Index, sort and merge transforms over [`tabula_core::Batch`].
//!
//! This crate provides three pure transforms. None of them mutates its input; each returns a new
//! batch that shares unchanged columns with the input:
//! - [`add_index`] prepends a synthetic ordinal column ([`INDEX_COLUMN_NAME`]),
//! - [`sort`] stably reorders rows by one or more key columns (nulls last),
//! - [`merge`] / [`merge_with`] join two batches on shared key columns.
//!
//! The active index key is tracked under [`INDEX_METADATA_KEY`]; see [`metadata`] for how each
//! transform updates it.

#![no_std]

extern crate alloc;

mod compare;
mod index;
mod merge;
pub mod metadata;
mod sort;

pub use index::add_index;
pub use merge::{JoinType, MergeOptions, ParseJoinTypeError, merge, merge_with};
pub use metadata::{INDEX_COLUMN_NAME, INDEX_METADATA_KEY};
pub use sort::sort;
