// Copyright 2025 the Tabula Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Index bookkeeping carried in batch metadata.
//!
//! A batch records the columns it is currently ordered by under [`INDEX_METADATA_KEY`], as a
//! comma-joined list of column names. The transforms here only ever write a single name. The
//! entry is advisory: nothing checks it against the actual row order.
//!
//! Propagation rules:
//! - `add_index` and `sort` set the entry to their first key column,
//! - `merge` returns an empty metadata map,
//! - every other entry of the input map is preserved verbatim.

extern crate alloc;

use alloc::string::String;

use tabula_core::Metadata;

/// Name of the synthetic index column added by [`add_index`](crate::add_index).
pub const INDEX_COLUMN_NAME: &str = "__tabula_index";

/// Metadata key holding the comma-joined list of active index columns.
pub const INDEX_METADATA_KEY: &str = "tabula:index";

/// Returns a copy of `metadata` with the index entry set to `key`.
pub fn with_index_key(metadata: &Metadata, key: &str) -> Metadata {
    let mut out = metadata.clone();
    out.insert(String::from(INDEX_METADATA_KEY), String::from(key));
    out
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::string::ToString;

    use super::*;

    #[test]
    fn setting_the_key_keeps_other_entries() {
        let mut meta = Metadata::new();
        meta.insert(INDEX_METADATA_KEY.to_string(), "a".to_string());
        meta.insert("owner".to_string(), "host".to_string());

        let set = with_index_key(&meta, "z");
        assert_eq!(set.get(INDEX_METADATA_KEY).map(String::as_str), Some("z"));
        assert_eq!(set.get("owner").map(String::as_str), Some("host"));
        assert_eq!(set.len(), 2);
        assert_eq!(meta.get(INDEX_METADATA_KEY).map(String::as_str), Some("a"));
    }

    #[test]
    fn setting_the_key_on_empty_metadata_adds_one_entry() {
        let set = with_index_key(&Metadata::new(), "k");
        assert_eq!(set.len(), 1);
        assert_eq!(set.get(INDEX_METADATA_KEY).map(String::as_str), Some("k"));
    }
}
