//! Results of element access.

use std::fmt;

use ragged_common::Result;

use crate::{
    content::{Content, RecordArray},
    data::Scalar,
};

/// One element of a tree.
#[derive(Debug, Clone)]
pub enum Value {
    /// A leaf value.
    Scalar(Scalar),
    /// An element of an option-type node that is absent.
    Missing,
    /// One record of a `RecordArray`.
    Record(Record),
    /// A nested list, as a node of its own.
    Content(Content),
}

impl Value {
    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Value::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.as_scalar().map(Scalar::as_f64)
    }

    pub fn as_content(&self) -> Option<&Content> {
        match self {
            Value::Content(c) => Some(c),
            _ => None,
        }
    }

    pub fn into_content(self) -> Option<Content> {
        match self {
            Value::Content(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Record(r) => Some(r),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }
}

impl From<Scalar> for Value {
    fn from(scalar: Scalar) -> Self {
        Value::Scalar(scalar)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Scalar(s) => write!(f, "{s}"),
            Value::Missing => f.write_str("None"),
            Value::Record(r) => write!(f, "<Record at={} of {}>", r.at(), r.array().label()),
            Value::Content(c) => write!(f, "{c}"),
        }
    }
}

/// A single record: a record array and a position in it.
#[derive(Debug, Clone)]
pub struct Record {
    array: RecordArray,
    at: usize,
}

impl Record {
    pub(crate) fn new(array: RecordArray, at: usize) -> Record {
        debug_assert!(at < array.len());
        Record { array, at }
    }

    pub fn array(&self) -> &RecordArray {
        &self.array
    }

    pub fn at(&self) -> usize {
        self.at
    }

    pub fn fields(&self) -> Vec<String> {
        self.array.fields()
    }

    /// Value of field `name` in this record.
    pub fn field(&self, name: &str) -> Result<Value> {
        self.array
            .field_content(name)?
            .getitem_at_unchecked(self.at)
    }

    /// Value of the `i`-th field in this record.
    pub fn get(&self, i: usize) -> Result<Value> {
        self.array.content(i)?.getitem_at_unchecked(self.at)
    }
}
