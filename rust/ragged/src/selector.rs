//! Selector vocabulary: the units a multi-dimensional selection is made of.

use std::fmt;

use itertools::Itertools;
use ragged_common::{Result, error::Error, verify_arg};

use crate::{
    content::Content,
    index::{DisplayIndex64, Index64},
};

/// One unit of a selector tuple.
#[derive(Debug, Clone)]
pub enum SliceItem {
    /// A single position, consuming one dimension.
    Int(i64),
    /// `start:stop:step` with Python semantics.
    Range(Slice),
    /// Projection onto one record field.
    Field(String),
    /// Projection onto several record fields.
    Fields(Vec<String>),
    /// An integer array (advanced index).
    Array(ArrayIndex),
    /// Inserts a length-1 regular dimension.
    NewAxis,
    /// Expands to as many full slices as needed.
    Ellipsis,
    /// A variable-length selector (list of positions per element).
    Jagged(Box<Content>),
}

impl SliceItem {
    pub fn range(start: Option<i64>, stop: Option<i64>) -> SliceItem {
        SliceItem::Range(Slice::new(start, stop, None))
    }

    pub fn full() -> SliceItem {
        SliceItem::Range(Slice::default())
    }

    pub fn field(name: impl Into<String>) -> SliceItem {
        SliceItem::Field(name.into())
    }

    pub fn fields<S: Into<String>>(names: impl IntoIterator<Item = S>) -> SliceItem {
        SliceItem::Fields(names.into_iter().map(Into::into).collect())
    }

    pub fn array(values: Vec<i64>) -> SliceItem {
        SliceItem::Array(ArrayIndex::new(values))
    }

    /// Whether the unit consumes a dimension of the array.
    pub fn is_dimensional(&self) -> bool {
        matches!(
            self,
            SliceItem::Int(_) | SliceItem::Range(_) | SliceItem::Array(_) | SliceItem::Jagged(_)
        )
    }

    /// Whether the unit is a field projection.
    pub fn is_field(&self) -> bool {
        matches!(self, SliceItem::Field(_) | SliceItem::Fields(_))
    }

    /// The dimensional head this unit stands for, if it is one the getitem
    /// algebra dispatches on by node type.
    pub(crate) fn as_dim(&self) -> Option<DimHead<'_>> {
        match self {
            SliceItem::Int(at) => Some(DimHead::At(*at)),
            SliceItem::Range(slice) => Some(DimHead::Range(slice)),
            SliceItem::Array(array) => Some(DimHead::Array(array)),
            _ => None,
        }
    }
}

impl From<i64> for SliceItem {
    fn from(at: i64) -> Self {
        SliceItem::Int(at)
    }
}

impl From<Slice> for SliceItem {
    fn from(slice: Slice) -> Self {
        SliceItem::Range(slice)
    }
}

impl From<&str> for SliceItem {
    fn from(name: &str) -> Self {
        SliceItem::Field(name.to_string())
    }
}

impl From<ArrayIndex> for SliceItem {
    fn from(array: ArrayIndex) -> Self {
        SliceItem::Array(array)
    }
}

impl fmt::Display for SliceItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SliceItem::Int(at) => write!(f, "{at}"),
            SliceItem::Range(slice) => write!(f, "{slice}"),
            SliceItem::Field(name) => write!(f, "'{name}'"),
            SliceItem::Fields(names) => {
                write!(f, "[{}]", names.iter().map(|n| format!("'{n}'")).join(", "))
            }
            SliceItem::Array(array) => write!(f, "{array}"),
            SliceItem::NewAxis => f.write_str("newaxis"),
            SliceItem::Ellipsis => f.write_str("..."),
            SliceItem::Jagged(content) => write!(f, "jagged {}", content.label()),
        }
    }
}

/// A Python-style slice. Missing bounds default by the sign of the step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Slice {
    pub start: Option<i64>,
    pub stop: Option<i64>,
    pub step: Option<i64>,
}

impl Slice {
    pub fn new(start: Option<i64>, stop: Option<i64>, step: Option<i64>) -> Slice {
        Slice { start, stop, step }
    }

    pub fn step_or_one(&self) -> i64 {
        self.step.unwrap_or(1)
    }
}

impl fmt::Display for Slice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bound = |b: Option<i64>| b.map(|v| v.to_string()).unwrap_or_default();
        write!(f, "{}:{}", bound(self.start), bound(self.stop))?;
        if let Some(step) = self.step {
            write!(f, ":{step}")?;
        }
        Ok(())
    }
}

/// An integer-array selector: flat positions plus the array's shape.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayIndex {
    flat: Index64,
    shape: Vec<usize>,
}

impl ArrayIndex {
    /// A one-dimensional array selector.
    pub fn new(values: Vec<i64>) -> ArrayIndex {
        let len = values.len();
        ArrayIndex {
            flat: values.into(),
            shape: vec![len],
        }
    }

    /// A multi-dimensional array selector in row-major order.
    pub fn with_shape(flat: impl Into<Index64>, shape: Vec<usize>) -> Result<ArrayIndex> {
        let flat = flat.into();
        verify_arg!(shape, !shape.is_empty());
        verify_arg!(shape, shape.iter().product::<usize>() == flat.len());
        Ok(ArrayIndex { flat, shape })
    }

    pub fn flat(&self) -> &Index64 {
        &self.flat
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn len(&self) -> usize {
        self.flat.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flat.is_empty()
    }
}

impl fmt::Display for ArrayIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "array({}", DisplayIndex64(&self.flat))?;
        if self.shape.len() > 1 {
            write!(f, ", shape=({})", self.shape.iter().join(", "))?;
        }
        f.write_str(")")
    }
}

/// A dimensional selector unit, dispatched on per node type.
#[derive(Debug, Clone, Copy)]
pub(crate) enum DimHead<'a> {
    At(i64),
    Range(&'a Slice),
    Array(&'a ArrayIndex),
}

impl fmt::Display for DimHead<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DimHead::At(at) => write!(f, "{at}"),
            DimHead::Range(slice) => write!(f, "{slice}"),
            DimHead::Array(array) => write!(f, "{array}"),
        }
    }
}

/// Splits a selector tuple into its first unit and the rest.
pub fn head_tail(items: &[SliceItem]) -> (Option<&SliceItem>, &[SliceItem]) {
    match items.split_first() {
        Some((head, tail)) => (Some(head), tail),
        None => (None, &[]),
    }
}

/// Broadcasts every integer-array unit to one common shape with NumPy's
/// rules (shapes aligned on the right, dimensions equal or 1).
pub(crate) fn broadcast_arrays(items: &[SliceItem]) -> Result<Vec<SliceItem>> {
    let shapes = items
        .iter()
        .filter_map(|item| match item {
            SliceItem::Array(array) => Some(array.shape()),
            _ => None,
        })
        .collect::<Vec<_>>();
    if shapes.len() < 2 {
        return Ok(items.to_vec());
    }

    let ndim = shapes.iter().map(|s| s.len()).max().unwrap_or(0);
    let mut target = vec![1usize; ndim];
    for shape in &shapes {
        let pad = ndim - shape.len();
        for (j, &dim) in shape.iter().enumerate() {
            let t = &mut target[pad + j];
            if *t == 1 {
                *t = dim;
            } else if dim != 1 && dim != *t {
                return Err(Error::index(format!(
                    "cannot broadcast integer arrays of shapes {}",
                    shapes.iter().map(|s| format!("({})", s.iter().join(", "))).join(" and ")
                )));
            }
        }
    }

    items
        .iter()
        .map(|item| match item {
            SliceItem::Array(array) if array.shape() != target.as_slice() => {
                Ok(SliceItem::Array(broadcast_to(array, &target)))
            }
            other => Ok(other.clone()),
        })
        .collect()
}

fn broadcast_to(array: &ArrayIndex, target: &[usize]) -> ArrayIndex {
    let pad = target.len() - array.shape.len();
    let source_shape = std::iter::repeat_n(1usize, pad)
        .chain(array.shape.iter().copied())
        .collect::<Vec<_>>();
    // Row-major strides of the source, with 0 along broadcast dimensions.
    let mut strides = vec![0usize; target.len()];
    let mut stride = 1usize;
    for j in (0..target.len()).rev() {
        strides[j] = if source_shape[j] == 1 { 0 } else { stride };
        stride *= source_shape[j];
    }

    let total = target.iter().product::<usize>();
    let mut flat = Vec::with_capacity(total);
    let mut counter = vec![0usize; target.len()];
    for _ in 0..total {
        let offset = counter.iter().zip(&strides).map(|(c, s)| c * s).sum::<usize>();
        flat.push(array.flat[offset]);
        for j in (0..target.len()).rev() {
            counter[j] += 1;
            if counter[j] < target[j] {
                break;
            }
            counter[j] = 0;
        }
    }
    ArrayIndex {
        flat: flat.into(),
        shape: target.to_vec(),
    }
}
