//! Columnar nested arrays with NumPy-like selection.
//!
//! A ragged array is a tree of [`Content`] nodes over flat buffers. Leaves
//! ([`NumpyArray`], [`EmptyArray`]) hold primitive values; inner nodes add
//! structure without copying them:
//!
//! - lists: [`RegularArray`] (fixed size), [`ListArray`] (starts/stops) and
//!   [`ListOffsetArray`] (offsets);
//! - records: [`RecordArray`] (named fields or tuples);
//! - indirection and missing values: [`IndexedArray`],
//!   [`IndexedOptionArray`], [`ByteMaskedArray`], [`BitMaskedArray`],
//!   [`UnmaskedArray`];
//! - heterogeneous data: [`UnionArray`].
//!
//! # Selection
//!
//! [`getitem`] applies a tuple of [`SliceItem`]s, one unit per dimension, and
//! returns a [`Value`]: a scalar, a missing value, a record or a sub-tree.
//!
//! ```
//! use ragged::{Content, Index, ListOffsetArray, NumpyArray, SliceItem};
//!
//! // [[1.1, 2.2, 3.3], [], [4.4, 5.5]]
//! let lists = ListOffsetArray::try_new(
//!     Index::from(vec![0i64, 3, 3, 5]),
//!     NumpyArray::new(vec![1.1, 2.2, 3.3, 4.4, 5.5]),
//! )
//! .unwrap();
//! let array = Content::from(lists);
//!
//! // array[2, -1]
//! let value = array.getitem(&[SliceItem::Int(2), SliceItem::Int(-1)]).unwrap();
//! assert_eq!(value.as_f64(), Some(5.5));
//!
//! // array[:, 1:] keeps the list structure
//! let tails = array
//!     .getitem(&[SliceItem::full(), SliceItem::range(Some(1), None)])
//!     .unwrap()
//!     .into_content()
//!     .unwrap();
//! assert_eq!(tails.len(), 3);
//! ```
//!
//! Each node implements selection one dimension at a time: it turns the
//! current unit into flat position lists with the kernels of
//! `ragged_kernels`, re-indexes ("carries") its children by them and passes
//! the remaining units down. Errors carry the label of the node that
//! detected them.

pub mod buffer;
pub mod config;
pub mod content;
pub mod data;
pub mod form;
pub mod getitem;
pub mod index;
pub mod parameters;
pub mod selector;
pub mod value;

pub use buffer::Buffer;
pub use config::{CarryMode, OutOfBounds, SliceConfig};
pub use content::{
    BitMaskedArray, ByteMaskedArray, Content, EmptyArray, IndexedArray, IndexedOptionArray,
    ListArray, ListOffsetArray, NumpyArray, RecordArray, RegularArray, UnionArray, UnmaskedArray,
};
pub use data::{NumpyData, PrimitiveType, Scalar};
pub use form::{Form, FormKind};
pub use getitem::{getitem, getitem_with};
pub use index::{Index, Index64, IndexDType};
pub use parameters::{Identifier, Parameters};
pub use ragged_common::{
    Result,
    error::{Error, ErrorKind},
};
pub use selector::{ArrayIndex, Slice, SliceItem};
pub use value::{Record, Value};
