//! Integer index buffers: list offsets, starts/stops, carries, tags, masks.

use std::fmt;

use ragged_common::{Result, error::Error};
use serde::Serialize;

use crate::buffer::Buffer;

/// The canonical carry type: a 64-bit signed position list.
pub type Index64 = Buffer<i64>;

/// Integer width of an [`Index`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexDType {
    I8,
    U8,
    I32,
    U32,
    I64,
}

impl IndexDType {
    pub fn name(&self) -> &'static str {
        match self {
            IndexDType::I8 => "i8",
            IndexDType::U8 => "u8",
            IndexDType::I32 => "i32",
            IndexDType::U32 => "u32",
            IndexDType::I64 => "i64",
        }
    }

    pub fn is_signed(&self) -> bool {
        matches!(self, IndexDType::I8 | IndexDType::I32 | IndexDType::I64)
    }
}

impl fmt::Display for IndexDType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A typed, fixed-length view over an integer buffer. The width travels with
/// the value.
#[derive(Clone, PartialEq)]
pub enum Index {
    I8(Buffer<i8>),
    U8(Buffer<u8>),
    I32(Buffer<i32>),
    U32(Buffer<u32>),
    I64(Buffer<i64>),
}

/// Evaluates `$body` with `$buf` bound to the typed buffer of an [`Index`].
macro_rules! with_index {
    ($index:expr, $buf:ident => $body:expr) => {
        match $index {
            $crate::index::Index::I8($buf) => $body,
            $crate::index::Index::U8($buf) => $body,
            $crate::index::Index::I32($buf) => $body,
            $crate::index::Index::U32($buf) => $body,
            $crate::index::Index::I64($buf) => $body,
        }
    };
}

pub(crate) use with_index;

/// Like [`with_index!`] for two indexes of the same width.
macro_rules! with_index_pair {
    ($a:expr, $b:expr, ($x:ident, $y:ident) => $body:expr) => {
        match ($a, $b) {
            ($crate::index::Index::I8($x), $crate::index::Index::I8($y)) => $body,
            ($crate::index::Index::U8($x), $crate::index::Index::U8($y)) => $body,
            ($crate::index::Index::I32($x), $crate::index::Index::I32($y)) => $body,
            ($crate::index::Index::U32($x), $crate::index::Index::U32($y)) => $body,
            ($crate::index::Index::I64($x), $crate::index::Index::I64($y)) => $body,
            (a, b) => unreachable!("index widths differ: {} and {}", a.dtype(), b.dtype()),
        }
    };
}

pub(crate) use with_index_pair;

impl Index {
    /// Allocates a zero-filled index of the given width.
    pub fn empty(len: usize, dtype: IndexDType) -> Index {
        match dtype {
            IndexDType::I8 => Index::I8(vec![0; len].into()),
            IndexDType::U8 => Index::U8(vec![0; len].into()),
            IndexDType::I32 => Index::I32(vec![0; len].into()),
            IndexDType::U32 => Index::U32(vec![0; len].into()),
            IndexDType::I64 => Index::I64(vec![0; len].into()),
        }
    }

    pub fn dtype(&self) -> IndexDType {
        match self {
            Index::I8(_) => IndexDType::I8,
            Index::U8(_) => IndexDType::U8,
            Index::I32(_) => IndexDType::I32,
            Index::U32(_) => IndexDType::U32,
            Index::I64(_) => IndexDType::I64,
        }
    }

    pub fn form(&self) -> IndexDType {
        self.dtype()
    }

    pub fn len(&self) -> usize {
        with_index!(self, buf => buf.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Widening read of element `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i` is out of bounds.
    pub fn get(&self, i: usize) -> i64 {
        with_index!(self, buf => buf[i] as i64)
    }

    /// Zero-copy view of `start..stop`.
    pub fn slice(&self, start: usize, stop: usize) -> Index {
        match self {
            Index::I8(buf) => Index::I8(buf.slice(start..stop)),
            Index::U8(buf) => Index::U8(buf.slice(start..stop)),
            Index::I32(buf) => Index::I32(buf.slice(start..stop)),
            Index::U32(buf) => Index::U32(buf.slice(start..stop)),
            Index::I64(buf) => Index::I64(buf.slice(start..stop)),
        }
    }

    /// Widening normalization to a 64-bit index. No copy when the index is
    /// already 64-bit.
    pub fn to_index64(&self) -> Index64 {
        match self {
            Index::I64(buf) => buf.clone(),
            other => with_index!(other, buf => buf.iter().map(|&v| v as i64).collect()),
        }
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = i64> + '_ {
        (0..self.len()).map(|i| self.get(i))
    }

    /// Verifies that the index has one of the `allowed` widths.
    pub(crate) fn verify_dtype(&self, name: &str, allowed: &[IndexDType]) -> Result<()> {
        if allowed.contains(&self.dtype()) {
            Ok(())
        } else {
            Err(Error::invalid_arg(
                name,
                format!(
                    "index of type {} is not one of {}",
                    self.dtype(),
                    itertools::join(allowed.iter().map(IndexDType::name), ", ")
                ),
            ))
        }
    }
}

impl From<Buffer<i64>> for Index {
    fn from(buf: Buffer<i64>) -> Self {
        Index::I64(buf)
    }
}

macro_rules! impl_index_from_vec {
    ($($t:ty => $variant:ident),*) => {
        $(
            impl From<Vec<$t>> for Index {
                fn from(values: Vec<$t>) -> Self {
                    Index::$variant(values.into())
                }
            }
        )*
    };
}

impl_index_from_vec!(i8 => I8, u8 => U8, i32 => I32, u32 => U32, i64 => I64);

impl fmt::Debug for Index {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Index<{}>", self.dtype())?;
        with_index!(self, buf => fmt::Debug::fmt(buf, f))
    }
}

impl fmt::Display for Index {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_values(f, self.iter())
    }
}

/// Renders at most a handful of leading values: `[2, 2, 0, ...]`.
pub(crate) fn fmt_values(
    f: &mut fmt::Formatter<'_>,
    values: impl ExactSizeIterator<Item = i64>,
) -> fmt::Result {
    const SHOWN: usize = 8;
    let len = values.len();
    let shown = itertools::join(values.take(SHOWN), ", ");
    if len > SHOWN {
        write!(f, "[{shown}, ...]")
    } else {
        write!(f, "[{shown}]")
    }
}

/// Display adapter for a 64-bit index.
pub(crate) struct DisplayIndex64<'a>(pub &'a Index64);

impl fmt::Display for DisplayIndex64<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_values(f, self.0.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::{Index, IndexDType};

    #[test]
    fn test_widening() {
        let index = Index::from(vec![-1i8, 3, 127]);
        assert_eq!(index.dtype(), IndexDType::I8);
        assert_eq!(index.to_index64().as_slice(), &[-1, 3, 127]);

        let index = Index::from(vec![u32::MAX]);
        assert_eq!(index.get(0), u32::MAX as i64);
    }

    #[test]
    fn test_to_index64_shares_storage() {
        let index = Index::from(vec![1i64, 2, 3]).slice(1, 3);
        let Index::I64(buf) = &index else {
            panic!("expected i64 index")
        };
        assert!(index.to_index64().ptr_eq(buf));
    }

    #[test]
    fn test_empty_and_slice() {
        let index = Index::empty(4, IndexDType::U8);
        assert_eq!(index.len(), 4);
        assert!(index.iter().all(|v| v == 0));
        assert_eq!(index.slice(1, 1).len(), 0);
    }

    #[test]
    fn test_display() {
        let index = Index::from((0..20i32).collect::<Vec<_>>());
        assert_eq!(index.to_string(), "[0, 1, 2, 3, 4, 5, 6, 7, ...]");
        assert_eq!(Index::from(vec![2i64, 0]).to_string(), "[2, 0]");
    }

    #[test]
    fn test_verify_dtype() {
        let index = Index::from(vec![0u8]);
        assert!(index.verify_dtype("index", &[IndexDType::I32, IndexDType::I64]).is_err());
        assert!(index.verify_dtype("index", &[IndexDType::U8]).is_ok());
    }
}
