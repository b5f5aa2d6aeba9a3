//! Literal value substitution applied before typed parsing.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::table::Value;

/// Exact-match literal substitutions.
///
/// Keys are literal cell texts. A `None` target rewrites the cell to the null
/// marker; a `Some` target rewrites it to the given text. Matching is on the
/// whole cell, never a substring, and only text cells are candidates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubstitutionMap {
    entries: IndexMap<String, Option<String>>,
}

impl SubstitutionMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Map a literal to the null marker.
    pub fn null(mut self, literal: impl Into<String>) -> Self {
        self.entries.insert(literal.into(), None);
        self
    }

    /// Map a literal to a corrected text.
    pub fn replace(mut self, literal: impl Into<String>, replacement: impl Into<String>) -> Self {
        self.entries.insert(literal.into(), Some(replacement.into()));
        self
    }

    /// Add every entry of another map, overriding existing keys.
    pub fn extend(&mut self, other: &SubstitutionMap) {
        for (literal, target) in &other.entries {
            self.entries.insert(literal.clone(), target.clone());
        }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Literal keys in insertion order.
    pub fn literals(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|k| k.as_str())
    }

    /// Substitute a single value. Returns `None` when nothing matches.
    pub fn lookup(&self, value: &Value) -> Option<Value> {
        let text = value.as_text()?;
        self.entries.get(text).map(|target| match target {
            Some(replacement) => Value::Text(replacement.clone()),
            None => Value::Null,
        })
    }

    /// Substitute a value, returning it unchanged when nothing matches.
    pub fn apply(&self, value: &Value) -> Value {
        self.lookup(value).unwrap_or_else(|| value.clone())
    }
}
