//! The node taxonomy of a columnar tree and its recursive getitem algebra.
//!
//! A tree is built from a closed set of node kinds (see [`Content`]). Every
//! node answers the same small contract: length, element access, range
//! slicing, field projection, carry (re-indexing by a position list) and
//! `getitem_next`, the step that applies one unit of a multi-dimensional
//! selector and recurses into the children with the rest.
//!
//! Selection never materializes nested objects: each step computes flat
//! position lists with the bulk primitives of `ragged_kernels` and applies
//! them to child buffers. Nodes are immutable and share children through
//! `Arc`, so slicing a tree copies no data that is not re-indexed.

use std::{fmt, sync::Arc};

use ragged_common::{Result, error::Error};
use ragged_kernels::{
    KernelError,
    slicing::{check_bounds, has_negative, wrap_negative},
};

use crate::{
    config::{CarryMode, OutOfBounds},
    form::Form,
    index::{DisplayIndex64, Index, Index64},
    parameters::{Identifier, Parameters},
    selector::{DimHead, SliceItem, head_tail},
    value::Value,
};

mod bit_masked;
mod byte_masked;
mod empty;
mod indexed;
mod indexed_option;
mod list;
mod list_offset;
mod merge;
mod numpy;
mod record;
mod regular;
mod repr;
mod union;
mod unmasked;

pub use bit_masked::BitMaskedArray;
pub use byte_masked::ByteMaskedArray;
pub use empty::EmptyArray;
pub use indexed::IndexedArray;
pub use indexed_option::IndexedOptionArray;
pub use list::ListArray;
pub use list_offset::ListOffsetArray;
pub use numpy::NumpyArray;
pub use record::RecordArray;
pub use regular::RegularArray;
pub use union::UnionArray;
pub use unmasked::UnmaskedArray;

/// A node of a columnar tree.
#[derive(Debug, Clone)]
pub enum Content {
    Empty(EmptyArray),
    Numpy(NumpyArray),
    Regular(RegularArray),
    List(ListArray),
    ListOffset(ListOffsetArray),
    Record(RecordArray),
    Indexed(IndexedArray),
    IndexedOption(IndexedOptionArray),
    ByteMasked(ByteMaskedArray),
    BitMasked(BitMaskedArray),
    Unmasked(UnmaskedArray),
    Union(UnionArray),
}

/// Evaluates `$body` with `$node` bound to the variant of a [`Content`].
macro_rules! dispatch {
    ($content:expr, $node:ident => $body:expr) => {
        match $content {
            Content::Empty($node) => $body,
            Content::Numpy($node) => $body,
            Content::Regular($node) => $body,
            Content::List($node) => $body,
            Content::ListOffset($node) => $body,
            Content::Record($node) => $body,
            Content::Indexed($node) => $body,
            Content::IndexedOption($node) => $body,
            Content::ByteMasked($node) => $body,
            Content::BitMasked($node) => $body,
            Content::Unmasked($node) => $body,
            Content::Union($node) => $body,
        }
    };
}

macro_rules! impl_from_node {
    ($($node:ident => $variant:ident),*) => {
        $(
            impl From<$node> for Content {
                fn from(node: $node) -> Self {
                    Content::$variant(node)
                }
            }

            impl From<$node> for Arc<Content> {
                fn from(node: $node) -> Self {
                    Arc::new(Content::$variant(node))
                }
            }
        )*
    };
}

impl_from_node!(
    EmptyArray => Empty,
    NumpyArray => Numpy,
    RegularArray => Regular,
    ListArray => List,
    ListOffsetArray => ListOffset,
    RecordArray => Record,
    IndexedArray => Indexed,
    IndexedOptionArray => IndexedOption,
    ByteMaskedArray => ByteMasked,
    BitMaskedArray => BitMasked,
    UnmaskedArray => Unmasked,
    UnionArray => Union
);

impl Content {
    pub fn len(&self) -> usize {
        dispatch!(self, node => node.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Name of the node kind, e.g. `"ListOffsetArray"`.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Content::Empty(_) => "EmptyArray",
            Content::Numpy(_) => "NumpyArray",
            Content::Regular(_) => "RegularArray",
            Content::List(_) => "ListArray",
            Content::ListOffset(_) => "ListOffsetArray",
            Content::Record(_) => "RecordArray",
            Content::Indexed(_) => "IndexedArray",
            Content::IndexedOption(_) => "IndexedOptionArray",
            Content::ByteMasked(_) => "ByteMaskedArray",
            Content::BitMasked(_) => "BitMaskedArray",
            Content::Unmasked(_) => "UnmaskedArray",
            Content::Union(_) => "UnionArray",
        }
    }

    /// Short description of the node used in error messages.
    pub fn label(&self) -> String {
        node_label(self.kind_name(), self.len())
    }

    pub fn parameters(&self) -> &Parameters {
        dispatch!(self, node => node.parameters())
    }

    pub fn identifier(&self) -> Option<&Identifier> {
        dispatch!(self, node => node.identifier())
    }

    /// Attaches row provenance to this node.
    pub fn with_identifier(self, identifier: Identifier) -> Result<Content> {
        if identifier.len() != self.len() {
            return Err(Error::invalid_arg(
                "identifier",
                format!(
                    "identifier of length {} for {}",
                    identifier.len(),
                    self.label()
                ),
            ));
        }
        Ok(dispatch!(self, node => node.with_identifier(Some(identifier)).into()))
    }

    pub fn with_parameters(self, parameters: Parameters) -> Content {
        dispatch!(self, node => node.with_parameters(parameters).into())
    }

    pub fn form(&self) -> Form {
        dispatch!(self, node => node.form())
    }

    pub fn purelist_depth(&self) -> Option<usize> {
        self.form().purelist_depth()
    }

    pub fn minmax_depth(&self) -> (usize, usize) {
        self.form().minmax_depth()
    }

    pub fn branch_depth(&self) -> (bool, usize) {
        self.form().branch_depth()
    }

    /// Element `at`; negative positions count from the end.
    pub fn getitem_at(&self, at: i64) -> Result<Value> {
        let len = self.len() as i64;
        let regular = if at < 0 { at + len } else { at };
        if !(0..len).contains(&regular) {
            let details = matches!(self, Content::Empty(_)).then(|| "array is empty".to_string());
            return Err(Error::nested_index(self.label(), at.to_string(), details));
        }
        self.getitem_at_unchecked(regular as usize)
    }

    pub(crate) fn getitem_at_unchecked(&self, at: usize) -> Result<Value> {
        dispatch!(self, node => node.getitem_at(at))
    }

    /// Elements `start..stop` with Python slice semantics: negative bounds
    /// count from the end, out-of-range bounds are clamped.
    pub fn getitem_range(&self, start: i64, stop: i64) -> Result<Content> {
        let (start, stop) = ragged_kernels::slicing::regularize_range(
            Some(start),
            Some(stop),
            1,
            self.len() as i64,
        );
        let stop = stop.max(start);
        self.getitem_range_unchecked(start as usize, stop as usize)
    }

    /// Elements `start..stop` for bounds already within `0..=len`.
    pub(crate) fn getitem_range_unchecked(&self, start: usize, stop: usize) -> Result<Content> {
        debug_assert!(start <= stop && stop <= self.len());
        dispatch!(self, node => node.getitem_range(start, stop))
    }

    /// Projection onto field `name` of the records below this node.
    ///
    /// Field units in `only_fields` are applied to the projected field.
    pub fn getitem_field(&self, name: &str, only_fields: &[SliceItem]) -> Result<Content> {
        dispatch!(self, node => node.getitem_field(name, only_fields))
    }

    /// Projection onto several fields of the records below this node.
    pub fn getitem_fields(&self, names: &[String], only_fields: &[SliceItem]) -> Result<Content> {
        dispatch!(self, node => node.getitem_fields(names, only_fields))
    }

    /// Re-indexes this node by `carry`.
    ///
    /// Negative entries count from the end. Entries still out of range raise
    /// the error kind chosen by `exception`.
    pub fn carry(&self, carry: &Index, mode: CarryMode, exception: OutOfBounds) -> Result<Content> {
        match carry {
            Index::I64(buf) => self.carry64(buf.clone(), mode, exception),
            widened => {
                let mode = if mode.is_lazy() { CarryMode::LazyCopied } else { mode };
                self.carry64(widened.to_index64(), mode, exception)
            }
        }
    }

    pub(crate) fn carry64(
        &self,
        carry: Index64,
        mode: CarryMode,
        exception: OutOfBounds,
    ) -> Result<Content> {
        log::trace!(
            "carry {} by {} positions ({mode:?})",
            self.label(),
            carry.len()
        );
        dispatch!(self, node => node.carry(carry, mode, exception))
    }

    /// Applies `head` to the dimension below this node's length and recurses
    /// with `tail`.
    ///
    /// `advanced` is set once an integer-array unit has been applied above;
    /// it holds, for every element, the position in that array it stems from.
    pub fn getitem_next(
        &self,
        head: Option<&SliceItem>,
        tail: &[SliceItem],
        advanced: Option<&Index64>,
    ) -> Result<Content> {
        let Some(head) = head else {
            return Ok(self.clone());
        };
        log::trace!("getitem_next {} head={head} tail={}", self.label(), tail.len());
        match head {
            SliceItem::Int(_) | SliceItem::Range(_) | SliceItem::Array(_) => match head.as_dim() {
                Some(dim) => self.getitem_next_dim(dim, tail, advanced),
                None => unreachable!("dimensional head {head} without a dimension"),
            },
            SliceItem::Field(name) => self.getitem_next_field(name, tail, advanced),
            SliceItem::Fields(names) => self.getitem_next_fields(names, tail, advanced),
            SliceItem::NewAxis => self.getitem_next_newaxis(tail, advanced),
            SliceItem::Ellipsis => self.getitem_next_ellipsis(tail, advanced),
            SliceItem::Jagged(_) => Err(Error::unsupported_selector(self.label(), head.to_string())),
        }
    }

    pub(crate) fn getitem_next_dim(
        &self,
        head: DimHead<'_>,
        tail: &[SliceItem],
        advanced: Option<&Index64>,
    ) -> Result<Content> {
        dispatch!(self, node => node.getitem_next(head, tail, advanced))
    }

    /// The result of a selection that matched nothing at the root: an empty
    /// node of the type one level down.
    pub fn getitem_nothing(&self) -> Result<Content> {
        dispatch!(self, node => node.getitem_nothing())
    }

    /// Applies a full selector tuple. See [`getitem`](crate::getitem::getitem).
    pub fn getitem(&self, items: &[SliceItem]) -> Result<Value> {
        crate::getitem::getitem(self, items)
    }

    fn getitem_next_field(
        &self,
        name: &str,
        tail: &[SliceItem],
        advanced: Option<&Index64>,
    ) -> Result<Content> {
        let (nexthead, nexttail) = head_tail(tail);
        self.getitem_field(name, &[])?
            .getitem_next(nexthead, nexttail, advanced)
    }

    fn getitem_next_fields(
        &self,
        names: &[String],
        tail: &[SliceItem],
        advanced: Option<&Index64>,
    ) -> Result<Content> {
        let (only_fields, not_fields): (Vec<SliceItem>, Vec<SliceItem>) =
            tail.iter().cloned().partition(SliceItem::is_field);
        let (nexthead, nexttail) = head_tail(&not_fields);
        self.getitem_fields(names, &only_fields)?
            .getitem_next(nexthead, nexttail, advanced)
    }

    fn getitem_next_newaxis(&self, tail: &[SliceItem], advanced: Option<&Index64>) -> Result<Content> {
        let (nexthead, nexttail) = head_tail(tail);
        let inner = self.getitem_next(nexthead, nexttail, advanced)?;
        Ok(RegularArray::try_new(inner, 1, 0)?.into())
    }

    fn getitem_next_ellipsis(&self, tail: &[SliceItem], advanced: Option<&Index64>) -> Result<Content> {
        let (mindepth, maxdepth) = self.minmax_depth();
        let dimlength = tail.iter().filter(|item| item.is_dimensional()).count();
        if tail.is_empty() || (mindepth - 1 == dimlength && maxdepth - 1 == dimlength) {
            let (nexthead, nexttail) = head_tail(tail);
            self.getitem_next(nexthead, nexttail, advanced)
        } else if mindepth - 1 == dimlength || maxdepth - 1 == dimlength {
            Err(Error::nested_index(
                self.label(),
                "...",
                Some("ellipsis (...) can't be used on data with different numbers of dimensions".into()),
            ))
        } else {
            let nexttail = std::iter::once(SliceItem::Ellipsis)
                .chain(tail.iter().cloned())
                .collect::<Vec<_>>();
            self.getitem_next(Some(&SliceItem::full()), &nexttail, advanced)
        }
    }
}

impl fmt::Display for Content {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&repr::repr(self, "", "", ""))
    }
}

pub(crate) fn node_label(kind: &str, len: usize) -> String {
    format!("{kind} of length {len}")
}

/// Wraps the result of the first integer-array dimension in one
/// `RegularArray` per dimension of the array's shape.
pub(crate) fn getitem_next_array_wrap(
    outcontent: Content,
    shape: &[usize],
    length: usize,
) -> Result<Content> {
    let mut out = outcontent;
    for i in (0..shape.len()).rev() {
        let rows = length * shape[..i].iter().product::<usize>();
        out = RegularArray::try_new(out, shape[i], rows)?.into();
    }
    Ok(out)
}

/// Wraps negative carry entries by `length` once and checks every entry
/// against `length`.
///
/// The carry is copied before the in-place fix-up unless `mode` says it is
/// already a private copy.
pub(crate) fn normalize_carry(
    mut carry: Index64,
    length: usize,
    mode: CarryMode,
    exception: OutOfBounds,
    node: impl FnOnce() -> String,
) -> Result<Index64> {
    if has_negative(&carry) {
        if !mode.is_copied() {
            carry.detach();
        }
        wrap_negative(carry.make_mut(), length as i64);
    }
    if let Err(e) = check_bounds(&carry, length as i64) {
        return Err(carry_error(exception, node(), &carry, e));
    }
    Ok(carry)
}

pub(crate) fn carry_error(
    exception: OutOfBounds,
    node: String,
    carry: &Index64,
    error: KernelError,
) -> Error {
    match exception {
        OutOfBounds::Nested => Error::nested_index(
            node,
            DisplayIndex64(carry).to_string(),
            Some(error.to_string()),
        ),
        OutOfBounds::Plain => Error::index(format!("{node}: {error}")),
    }
}

/// Converts a kernel failure raised while applying `slicer` into an index
/// error attributed to `node`.
pub(crate) fn slice_error(node: String, slicer: impl fmt::Display, error: KernelError) -> Error {
    log::debug!("kernel failure while slicing {node} by {slicer}: {error}");
    Error::nested_index(node, slicer.to_string(), Some(error.to_string()))
}

/// Converts a kernel failure with no selector context.
pub(crate) fn kernel_error(error: KernelError) -> Error {
    log::debug!("kernel failure: {error}");
    Error::kernel(error.kernel, error.message, error.position)
}

/// The error raised when a field is projected out of a node without records.
pub(crate) fn not_records(node: String, name: impl fmt::Display) -> Error {
    Error::nested_index(node, name.to_string(), Some("not an array of records".into()))
}

/// Common accessors and builders shared by every node kind.
macro_rules! node_common {
    ($node:ident) => {
        impl $node {
            pub fn parameters(&self) -> &$crate::parameters::Parameters {
                &self.parameters
            }

            pub fn identifier(&self) -> Option<&$crate::parameters::Identifier> {
                self.identifier.as_ref()
            }

            pub fn with_parameters(mut self, parameters: $crate::parameters::Parameters) -> Self {
                self.parameters = parameters;
                self
            }

            pub(crate) fn with_identifier(
                mut self,
                identifier: Option<$crate::parameters::Identifier>,
            ) -> Self {
                self.identifier = identifier;
                self
            }

            pub(crate) fn label(&self) -> String {
                $crate::content::node_label(stringify!($node), self.len())
            }

            pub(crate) fn range_identifier(
                &self,
                start: usize,
                stop: usize,
            ) -> Option<$crate::parameters::Identifier> {
                self.identifier.as_ref().map(|id| id.range(start, stop))
            }

            pub(crate) fn carry_identifier(
                &self,
                carry: &$crate::index::Index64,
            ) -> Option<$crate::parameters::Identifier> {
                self.identifier.as_ref().map(|id| id.carry(carry))
            }

            pub(crate) fn field_identifier(&self, name: &str) -> Option<$crate::parameters::Identifier> {
                self.identifier.as_ref().map(|id| id.field(name))
            }
        }
    };
}

pub(crate) use node_common;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CarryMode, OutOfBounds};

    #[test]
    fn test_normalize_carry_no_copy_without_negatives() {
        let carry: Index64 = vec![0i64, 2, 1].into();
        let out = normalize_carry(carry.clone(), 3, CarryMode::Lazy, OutOfBounds::Nested, || {
            "node".into()
        })
        .unwrap();
        assert!(out.ptr_eq(&carry));
    }

    #[test]
    fn test_normalize_carry_copies_shared_buffer() {
        let carry: Index64 = vec![-1i64, 0].into();
        let out = normalize_carry(carry.clone(), 3, CarryMode::Lazy, OutOfBounds::Nested, || {
            "node".into()
        })
        .unwrap();
        assert_eq!(out.as_slice(), &[2, 0]);
        assert_eq!(carry.as_slice(), &[-1, 0]);
    }

    #[test]
    fn test_normalize_carry_in_place_when_copied() {
        let carry: Index64 = vec![-1i64, 0].into();
        let before = carry.as_slice().as_ptr();
        let out =
            normalize_carry(carry, 3, CarryMode::LazyCopied, OutOfBounds::Nested, || "node".into())
                .unwrap();
        assert_eq!(out.as_slice().as_ptr(), before);
        assert_eq!(out.as_slice(), &[2, 0]);
    }

    #[test]
    fn test_normalize_carry_errors() {
        let err = normalize_carry(vec![0i64, 5].into(), 3, CarryMode::Lazy, OutOfBounds::Nested, || {
            "ListArray of length 3".into()
        })
        .unwrap_err();
        assert!(err.to_string().starts_with("cannot slice ListArray of length 3 by [0, 5]"));

        let err = normalize_carry(vec![-4i64].into(), 3, CarryMode::Lazy, OutOfBounds::Plain, || {
            "node".into()
        })
        .unwrap_err();
        assert!(matches!(
            err.kind(),
            ragged_common::error::ErrorKind::Index { .. }
        ));
    }

    #[test]
    fn test_array_wrap_zero_size() {
        let out = getitem_next_array_wrap(EmptyArray::new().into(), &[0], 4).unwrap();
        assert_eq!(out.len(), 4);
        let out = getitem_next_array_wrap(EmptyArray::new().into(), &[2, 0], 3).unwrap();
        assert_eq!(out.len(), 3);
        let Content::Regular(outer) = &out else {
            panic!("expected RegularArray")
        };
        assert_eq!(outer.size(), 2);
        assert_eq!(outer.content().len(), 6);
    }
}
