// Copyright 2025 the Tabula Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Columnar data model for the tabula transform engine.
//!
//! This crate provides:
//! - [`Column`]: a typed, nullable column over a closed set of physical types, with null-last
//!   ordering, null-equal equality, and `gather` for materializing reordered or joined rows;
//! - [`DictionaryColumn`]: dictionary-encoded strings that behave like their decoded values;
//! - [`Batch`]: uniquely named, equal-length columns plus a string metadata map;
//! - [`SchemaError`]: the single error kind shared by batch construction and all transforms.
//!
//! Transforms (index, sort, merge) live in `tabula_transforms`.

#![no_std]

extern crate alloc;

mod batch;
mod column;
mod data_type;
mod dictionary;
mod error;

pub use batch::{Batch, BatchParts, Field, Metadata, Schema};
pub use column::{Column, ColumnValue, KeyScalar, TypedColumn};
pub use data_type::DataType;
pub use dictionary::DictionaryColumn;
pub use error::SchemaError;
