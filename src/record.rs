//! Field access for condition input and record collections.
//!
//! Two kinds of values flow through the interpreters: the [`FieldMap`] that
//! *carries* one query's conditions, and the records a predicate is
//! *evaluated against*. Records come in map-like and struct-like shapes, so
//! the predicate backend only ever reaches them through the [`FieldAccess`]
//! capability instead of branching on the concrete type.

use std::collections::{BTreeMap, HashMap};

/// The one capability the predicate backend needs from a record: fetch a
/// field's value as text, or `None` when the field is absent/null.
pub trait FieldAccess {
    fn get(&self, name: &str) -> Option<String>;
}

impl FieldAccess for HashMap<String, String> {
    fn get(&self, name: &str) -> Option<String> {
        HashMap::get(self, name).cloned()
    }
}

impl FieldAccess for BTreeMap<String, String> {
    fn get(&self, name: &str) -> Option<String> {
        BTreeMap::get(self, name).cloned()
    }
}

impl<T: FieldAccess> FieldAccess for &T {
    fn get(&self, name: &str) -> Option<String> {
        T::get(self, name)
    }
}

/// One query's filter input: an insertion-ordered name → condition-string
/// bag. Blank values mean "no constraint" and are skipped by both backends.
///
/// Insertion order is preserved because it is observable: bind names derive
/// from the order fields are visited, and order specs with equal sequence
/// numbers keep it as their tie-break. Neither backend ever mutates a map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMap {
    entries: Vec<(String, String)>,
}

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field's condition, replacing any previous one in place.
    /// A scalar value (no grammar tag) acts as a plain equality constraint.
    pub fn set(&mut self, name: impl Into<String>, condition: impl Into<String>) -> &mut Self {
        let name = name.into();
        let condition = condition.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = condition,
            None => self.entries.push((name, condition)),
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, c)| c.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, c)| (n.as_str(), c.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<N: Into<String>, C: Into<String>> FromIterator<(N, C)> for FieldMap {
    fn from_iter<I: IntoIterator<Item = (N, C)>>(iter: I) -> Self {
        let mut map = FieldMap::new();
        for (name, condition) in iter {
            map.set(name, condition);
        }
        map
    }
}

impl FieldAccess for FieldMap {
    fn get(&self, name: &str) -> Option<String> {
        FieldMap::get(self, name).map(str::to_string)
    }
}
