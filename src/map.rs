//! Ordered pending-field map used while decoding a record.
//!
//! The decoder gathers everything it finds for a record (field lines, row
//! cells, nested headers) into a [`FieldMap`] before the record is
//! constructed, so fields can be applied in declared order regardless of the
//! order they appeared in. [`IndexMap`] keeps the encounter order for the
//! diagnostics about names the target type does not know.

use crate::value::Decoded;
use indexmap::IndexMap;

/// Data collected for one field.
#[derive(Debug)]
pub(crate) enum Pending {
    /// Raw, still escaped text of a field line or a row cell.
    Token(String),
    /// Row cells addressed by dotted paths below this field.
    Group(FieldMap),
    /// A nested header that has already been decoded.
    Parsed(Decoded),
}

impl Pending {
    fn is_null(&self) -> bool {
        match self {
            Pending::Token(raw) => raw.trim() == "null",
            Pending::Group(group) => group.is_all_null(),
            Pending::Parsed(decoded) => decoded.is_null(),
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct FieldMap(IndexMap<String, Pending>);

impl FieldMap {
    pub fn new() -> Self {
        FieldMap(IndexMap::new())
    }

    /// Inserts or replaces the data for `key`; later lines win.
    pub fn insert(&mut self, key: &str, value: Pending) {
        self.0.insert(key.to_string(), value);
    }

    /// Files a row cell under its dotted `path`, creating groups on the way.
    ///
    /// Returns false when a path segment is already taken by a plain value.
    pub fn insert_path(&mut self, path: &str, raw: &str) -> bool {
        match path.split_once('.') {
            None => {
                self.insert(path, Pending::Token(raw.to_string()));
                true
            }
            Some((head, rest)) => {
                let slot = self
                    .0
                    .entry(head.to_string())
                    .or_insert_with(|| Pending::Group(FieldMap::new()));
                match slot {
                    Pending::Group(group) => group.insert_path(rest, raw),
                    _ => false,
                }
            }
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<Pending> {
        self.0.shift_remove(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when every collected value is the `null` literal.
    pub fn is_all_null(&self) -> bool {
        self.0.values().all(Pending::is_null)
    }
}
