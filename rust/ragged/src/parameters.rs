//! Free-form node annotations and debug provenance.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::{buffer::Buffer, index::Index64};

/// String-keyed JSON annotations attached to a node, for example
/// `"__array__": "string"`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Parameters(BTreeMap<String, serde_json::Value>);

impl Parameters {
    pub fn new() -> Parameters {
        Parameters::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Parameters {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &serde_json::Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// The `__array__` annotation, which marks list nodes that behave as
    /// strings or bytestrings.
    pub fn array_type(&self) -> Option<&str> {
        self.get("__array__").and_then(|v| v.as_str())
    }

    /// Whether a list node with these parameters is a string-like leaf.
    pub fn is_string_like(&self) -> bool {
        matches!(self.array_type(), Some("string" | "bytestring"))
    }
}

/// Row provenance of a node: for every element, the row it had in the node
/// the identifier was first attached to.
///
/// Identifiers are sliced and carried along with their node, so after any
/// sequence of selections `rows()` still names the original positions.
#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    reference: usize,
    field_path: Vec<String>,
    rows: Index64,
}

impl Identifier {
    /// Identifies `len` rows `0..len` under the given reference number.
    pub fn new(reference: usize, len: usize) -> Identifier {
        Identifier {
            reference,
            field_path: Vec::new(),
            rows: (0..len as i64).collect(),
        }
    }

    pub fn reference(&self) -> usize {
        self.reference
    }

    pub fn rows(&self) -> &Index64 {
        &self.rows
    }

    pub fn field_path(&self) -> &[String] {
        &self.field_path
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub(crate) fn range(&self, start: usize, stop: usize) -> Identifier {
        Identifier {
            reference: self.reference,
            field_path: self.field_path.clone(),
            rows: self.rows.slice(start..stop),
        }
    }

    /// Reorders the rows by a carry whose entries are already known to be in
    /// bounds.
    pub(crate) fn carry(&self, carry: &Index64) -> Identifier {
        let rows: Buffer<i64> = carry.iter().map(|&c| self.rows[c as usize]).collect();
        Identifier {
            reference: self.reference,
            field_path: self.field_path.clone(),
            rows,
        }
    }

    pub(crate) fn field(&self, name: &str) -> Identifier {
        let mut field_path = self.field_path.clone();
        field_path.push(name.to_string());
        Identifier {
            reference: self.reference,
            field_path,
            rows: self.rows.clone(),
        }
    }
}
