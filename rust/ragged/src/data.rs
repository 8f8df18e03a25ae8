//! Typed flat storage for the leaves of a tree and the scalars read from it.

use std::fmt;

use ragged_kernels::{KernelResult, gather::gather_rows};
use serde::Serialize;

use crate::{buffer::Buffer, index::Index64};

/// Element type of a [`NumpyData`] buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveType {
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
}

impl PrimitiveType {
    pub fn name(&self) -> &'static str {
        match self {
            PrimitiveType::Bool => "bool",
            PrimitiveType::Int8 => "int8",
            PrimitiveType::Int16 => "int16",
            PrimitiveType::Int32 => "int32",
            PrimitiveType::Int64 => "int64",
            PrimitiveType::UInt8 => "uint8",
            PrimitiveType::UInt16 => "uint16",
            PrimitiveType::UInt32 => "uint32",
            PrimitiveType::UInt64 => "uint64",
            PrimitiveType::Float32 => "float32",
            PrimitiveType::Float64 => "float64",
        }
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A flat buffer of one primitive type.
#[derive(Debug, Clone, PartialEq)]
pub enum NumpyData {
    Bool(Buffer<bool>),
    Int8(Buffer<i8>),
    Int16(Buffer<i16>),
    Int32(Buffer<i32>),
    Int64(Buffer<i64>),
    UInt8(Buffer<u8>),
    UInt16(Buffer<u16>),
    UInt32(Buffer<u32>),
    UInt64(Buffer<u64>),
    Float32(Buffer<f32>),
    Float64(Buffer<f64>),
}

macro_rules! with_data {
    ($data:expr, $buf:ident => $body:expr) => {
        match $data {
            NumpyData::Bool($buf) => $body,
            NumpyData::Int8($buf) => $body,
            NumpyData::Int16($buf) => $body,
            NumpyData::Int32($buf) => $body,
            NumpyData::Int64($buf) => $body,
            NumpyData::UInt8($buf) => $body,
            NumpyData::UInt16($buf) => $body,
            NumpyData::UInt32($buf) => $body,
            NumpyData::UInt64($buf) => $body,
            NumpyData::Float32($buf) => $body,
            NumpyData::Float64($buf) => $body,
        }
    };
}

/// Same as `with_data!`, rebuilding a `NumpyData` of the same variant from
/// the buffer produced by `$body`.
macro_rules! map_data {
    ($data:expr, $buf:ident => $body:expr) => {
        match $data {
            NumpyData::Bool($buf) => NumpyData::Bool($body),
            NumpyData::Int8($buf) => NumpyData::Int8($body),
            NumpyData::Int16($buf) => NumpyData::Int16($body),
            NumpyData::Int32($buf) => NumpyData::Int32($body),
            NumpyData::Int64($buf) => NumpyData::Int64($body),
            NumpyData::UInt8($buf) => NumpyData::UInt8($body),
            NumpyData::UInt16($buf) => NumpyData::UInt16($body),
            NumpyData::UInt32($buf) => NumpyData::UInt32($body),
            NumpyData::UInt64($buf) => NumpyData::UInt64($body),
            NumpyData::Float32($buf) => NumpyData::Float32($body),
            NumpyData::Float64($buf) => NumpyData::Float64($body),
        }
    };
}

impl NumpyData {
    pub fn primitive(&self) -> PrimitiveType {
        match self {
            NumpyData::Bool(_) => PrimitiveType::Bool,
            NumpyData::Int8(_) => PrimitiveType::Int8,
            NumpyData::Int16(_) => PrimitiveType::Int16,
            NumpyData::Int32(_) => PrimitiveType::Int32,
            NumpyData::Int64(_) => PrimitiveType::Int64,
            NumpyData::UInt8(_) => PrimitiveType::UInt8,
            NumpyData::UInt16(_) => PrimitiveType::UInt16,
            NumpyData::UInt32(_) => PrimitiveType::UInt32,
            NumpyData::UInt64(_) => PrimitiveType::UInt64,
            NumpyData::Float32(_) => PrimitiveType::Float32,
            NumpyData::Float64(_) => PrimitiveType::Float64,
        }
    }

    pub fn len(&self) -> usize {
        with_data!(self, buf => buf.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reads element `i` as a scalar.
    ///
    /// # Panics
    ///
    /// Panics if `i` is out of bounds.
    pub fn scalar_at(&self, i: usize) -> Scalar {
        match self {
            NumpyData::Bool(buf) => Scalar::Bool(buf[i]),
            NumpyData::Int8(buf) => Scalar::Int(buf[i] as i64),
            NumpyData::Int16(buf) => Scalar::Int(buf[i] as i64),
            NumpyData::Int32(buf) => Scalar::Int(buf[i] as i64),
            NumpyData::Int64(buf) => Scalar::Int(buf[i]),
            NumpyData::UInt8(buf) => Scalar::UInt(buf[i] as u64),
            NumpyData::UInt16(buf) => Scalar::UInt(buf[i] as u64),
            NumpyData::UInt32(buf) => Scalar::UInt(buf[i] as u64),
            NumpyData::UInt64(buf) => Scalar::UInt(buf[i]),
            NumpyData::Float32(buf) => Scalar::Float(buf[i] as f64),
            NumpyData::Float64(buf) => Scalar::Float(buf[i]),
        }
    }

    /// Zero-copy view of `len` elements starting at `start`.
    pub fn slice(&self, start: usize, len: usize) -> NumpyData {
        map_data!(self, buf => buf.slice(start..start + len))
    }

    /// Gathers rows of `row_len` consecutive elements in `carry` order.
    pub fn gather_rows(&self, carry: &Index64, row_len: usize) -> KernelResult<NumpyData> {
        Ok(map_data!(self, buf => {
            let mut out = vec![Default::default(); carry.len() * row_len];
            gather_rows(&mut out, buf.as_slice(), carry.as_slice(), row_len)?;
            Buffer::from_vec(out)
        }))
    }

    /// Concatenation of two buffers of the same primitive type.
    pub fn concat(&self, other: &NumpyData) -> Option<NumpyData> {
        macro_rules! concat_arm {
            ($($variant:ident),*) => {
                match (self, other) {
                    $(
                        (NumpyData::$variant(a), NumpyData::$variant(b)) => {
                            Some(NumpyData::$variant(a.iter().chain(b.iter()).copied().collect()))
                        }
                    )*
                    _ => None,
                }
            };
        }
        concat_arm!(Bool, Int8, Int16, Int32, Int64, UInt8, UInt16, UInt32, UInt64, Float32, Float64)
    }
}

macro_rules! impl_data_from_vec {
    ($($t:ty => $variant:ident),*) => {
        $(
            impl From<Vec<$t>> for NumpyData {
                fn from(values: Vec<$t>) -> Self {
                    NumpyData::$variant(values.into())
                }
            }

            impl From<Buffer<$t>> for NumpyData {
                fn from(values: Buffer<$t>) -> Self {
                    NumpyData::$variant(values)
                }
            }
        )*
    };
}

impl_data_from_vec!(
    bool => Bool,
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    u8 => UInt8,
    u16 => UInt16,
    u32 => UInt32,
    u64 => UInt64,
    f32 => Float32,
    f64 => Float64
);

/// A single element read from a leaf buffer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
}

impl Scalar {
    pub fn as_f64(&self) -> f64 {
        match *self {
            Scalar::Bool(v) => v as u8 as f64,
            Scalar::Int(v) => v as f64,
            Scalar::UInt(v) => v as f64,
            Scalar::Float(v) => v,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Scalar::Bool(v) => Some(v as i64),
            Scalar::Int(v) => Some(v),
            Scalar::UInt(v) => i64::try_from(v).ok(),
            Scalar::Float(_) => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(v) => write!(f, "{v}"),
            Scalar::Int(v) => write!(f, "{v}"),
            Scalar::UInt(v) => write!(f, "{v}"),
            Scalar::Float(v) => write!(f, "{v}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{NumpyData, PrimitiveType, Scalar};

    #[test]
    fn test_scalar_at() {
        let data = NumpyData::from(vec![1u8, 200]);
        assert_eq!(data.primitive(), PrimitiveType::UInt8);
        assert_eq!(data.scalar_at(1), Scalar::UInt(200));
        assert_eq!(NumpyData::from(vec![1.5f32]).scalar_at(0).as_f64(), 1.5);
    }

    #[test]
    fn test_gather_rows() {
        let data = NumpyData::from(vec![0i32, 1, 2, 3, 4, 5]);
        let carry = vec![2i64, 0].into();
        let out = data.gather_rows(&carry, 2).unwrap();
        assert_eq!(out, NumpyData::from(vec![4i32, 5, 0, 1]));
        assert!(data.gather_rows(&vec![3i64].into(), 2).is_err());
    }

    #[test]
    fn test_concat() {
        let a = NumpyData::from(vec![1.1, 2.2]).slice(1, 1);
        let b = NumpyData::from(vec![3.3]);
        assert_eq!(a.concat(&b), Some(NumpyData::from(vec![2.2, 3.3])));
        assert_eq!(a.concat(&NumpyData::from(vec![1i64])), None);
    }
}
