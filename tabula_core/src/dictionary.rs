// Copyright 2025 the Tabula Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dictionary-encoded UTF-8 columns.

extern crate alloc;

use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::cmp::Ordering;

use hashbrown::HashMap;

use crate::{Column, KeyScalar, SchemaError, TypedColumn};

/// A UTF-8 column stored as per-row keys into a shared dictionary of strings.
///
/// Every operation looks through the keys at the decoded strings. Two columns with different
/// dictionaries are equal when their rows decode to the same values, and join keys hash the
/// string bytes. `gather` keeps the dictionary and only rewrites the keys.
#[derive(Debug, Clone)]
pub struct DictionaryColumn {
    keys: TypedColumn<u32>,
    values: Arc<[String]>,
}

impl DictionaryColumn {
    /// Creates a column from per-row keys and the dictionary they index.
    ///
    /// Fails if a valid key is out of range for `values`.
    pub fn try_new(keys: TypedColumn<u32>, values: Vec<String>) -> Result<Self, SchemaError> {
        if let Some(&key) = keys.iter().flatten().find(|&&k| lookup(&values, k).is_none()) {
            return Err(SchemaError::InvalidDictionaryKey {
                key,
                len: values.len(),
            });
        }
        Ok(Self {
            keys,
            values: values.into(),
        })
    }

    /// Dictionary-encodes `strings`; distinct values get keys in first-seen order.
    pub fn encode<'a, I>(strings: I) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = Option<&'a str>>,
    {
        let mut positions: HashMap<&'a str, u32> = HashMap::new();
        let mut values = Vec::new();
        let mut keys = Vec::new();
        for s in strings {
            let key = match s {
                None => None,
                Some(s) => match positions.get(s) {
                    Some(&k) => Some(k),
                    None => {
                        let k = next_key(values.len())?;
                        positions.insert(s, k);
                        values.push(String::from(s));
                        Some(k)
                    }
                },
            };
            keys.push(key);
        }
        Ok(Self {
            keys: keys.into_iter().collect(),
            values: values.into(),
        })
    }

    /// Creates a column of `len` nulls with an empty dictionary.
    pub fn nulls(len: usize) -> Self {
        Self {
            keys: TypedColumn::nulls(len),
            values: Arc::from(Vec::new()),
        }
    }

    /// Per-row dictionary keys.
    pub fn keys(&self) -> &TypedColumn<u32> {
        &self.keys
    }

    /// The dictionary.
    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Returns the number of rows.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns `true` if the column has no rows.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Returns `true` if row `i` holds a value.
    pub fn is_valid(&self, i: usize) -> bool {
        self.keys.is_valid(i)
    }

    /// Number of null rows.
    pub fn null_count(&self) -> usize {
        self.keys.null_count()
    }

    /// Returns the decoded string at row `i`, or `None` if it is null or out of bounds.
    pub fn get(&self, i: usize) -> Option<&str> {
        self.keys
            .get(i)
            .and_then(|&k| lookup(&self.values, k))
            .map(String::as_str)
    }

    /// Iterates decoded rows as options.
    pub fn iter(&self) -> impl Iterator<Item = Option<&str>> + '_ {
        (0..self.len()).map(|i| self.get(i))
    }

    /// Compares row `i` of `self` with row `j` of `other` by decoded value, nulls last.
    pub fn compare(&self, i: usize, other: &Self, j: usize) -> Ordering {
        match (self.get(i), other.get(j)) {
            (Some(a), Some(b)) => a.cmp(b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }

    /// Returns `true` if row `i` of `self` decodes to row `j` of `other`; nulls equal nulls.
    pub fn equals(&self, i: usize, other: &Self, j: usize) -> bool {
        self.get(i) == other.get(j)
    }

    /// Hashable key of row `i`, identical to the key of the same string in a plain UTF-8 column.
    pub fn key(&self, i: usize) -> KeyScalar<'_> {
        self.get(i).map_or(KeyScalar::Null, |s| KeyScalar::Bytes(s.as_bytes()))
    }

    /// Selects rows at `indices` over the same dictionary; `None` slots become null.
    ///
    /// # Panics
    ///
    /// Panics if a position is out of bounds.
    pub fn gather(&self, indices: &[Option<usize>]) -> Self {
        Self {
            keys: self.keys.gather(indices),
            values: Arc::clone(&self.values),
        }
    }

    /// Picks rows from several dictionary columns, re-encoding into one dictionary.
    pub(crate) fn interleave(
        sources: &[&Column],
        picks: &[Option<(usize, usize)>],
    ) -> Option<Self> {
        let typed = sources
            .iter()
            .map(|c| c.as_utf8_dictionary())
            .collect::<Option<Vec<_>>>()?;
        let strings = picks
            .iter()
            .map(|pick| pick.and_then(|(s, i)| typed[s].get(i)));
        Self::encode(strings).ok()
    }
}

fn next_key(len: usize) -> Result<u32, SchemaError> {
    u32::try_from(len).map_err(|_| SchemaError::DictionaryTooLarge { len })
}

fn lookup(values: &[String], key: u32) -> Option<&String> {
    usize::try_from(key).ok().and_then(|k| values.get(k))
}

impl PartialEq for DictionaryColumn {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && (0..self.len()).all(|i| self.equals(i, other, i))
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;

    use super::*;

    fn dict(values: &[Option<&str>]) -> DictionaryColumn {
        DictionaryColumn::encode(values.iter().copied()).unwrap()
    }

    #[test]
    fn encode_shares_repeated_values() {
        let d = dict(&[Some("1"), Some("2"), Some("1"), None, Some("4")]);
        assert_eq!(d.values(), ["1", "2", "4"]);
        assert_eq!(
            d.keys().iter().map(|k| k.copied()).collect::<Vec<_>>(),
            vec![Some(0), Some(1), Some(0), None, Some(2)]
        );
        assert_eq!(d.null_count(), 1);
        assert_eq!(d.get(2), Some("1"));
        assert_eq!(d.get(3), None);
    }

    #[test]
    fn compares_decoded_strings_nulls_last() {
        let d = dict(&[Some("1"), Some("2"), None, Some("1"), Some("4")]);
        assert_eq!(d.compare(0, &d, 1), Ordering::Less);
        assert_eq!(d.compare(0, &d, 3), Ordering::Equal);
        assert_eq!(d.compare(4, &d, 1), Ordering::Greater);
        assert_eq!(d.compare(0, &d, 2), Ordering::Less);
        assert_eq!(d.compare(2, &d, 2), Ordering::Equal);
        assert!(d.equals(2, &d, 2));
    }

    #[test]
    fn different_dictionaries_compare_by_value() {
        let a = DictionaryColumn::try_new(
            TypedColumn::from(vec![1_u32, 0]),
            vec!["x".into(), "y".into()],
        )
        .unwrap();
        let b = dict(&[Some("y"), Some("x")]);
        assert_eq!(a, b);
        assert_eq!(a.key(0), b.key(0));
        assert_eq!(a.key(0), KeyScalar::Bytes(b"y"));
    }

    #[test]
    fn gather_keeps_the_dictionary() {
        let d = dict(&[Some("b"), Some("a"), None]);
        let g = d.gather(&[Some(1), None, Some(0), Some(1)]);
        assert!(Arc::ptr_eq(&g.values, &d.values));
        assert_eq!(
            g.iter().collect::<Vec<_>>(),
            vec![Some("a"), None, Some("b"), Some("a")]
        );
    }

    #[test]
    fn out_of_range_keys_are_rejected() {
        let keys: TypedColumn<u32> = vec![Some(0_u32), None, Some(2)].into_iter().collect();
        assert_eq!(
            DictionaryColumn::try_new(keys, vec!["a".into(), "b".into()]).unwrap_err(),
            SchemaError::InvalidDictionaryKey { key: 2, len: 2 }
        );

        // Keys under a null slot are never decoded.
        let keys = TypedColumn::try_new(vec![0_u32, 9], vec![true, false]).unwrap();
        assert!(DictionaryColumn::try_new(keys, vec!["a".into()]).is_ok());
    }
}
