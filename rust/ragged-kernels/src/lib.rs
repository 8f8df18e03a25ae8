//! Bulk primitives over flat buffers.
//!
//! Every kernel in this crate is a synchronous, pure function: it reads from
//! borrowed input slices, writes into caller-allocated output slices, and
//! reports a single success/failure status. A failing kernel identifies the
//! offending element through [`KernelError`]; outputs written before the
//! failure are unspecified and must be discarded by the caller.
//!
//! Kernels never allocate their outputs. Callers size the output buffers
//! (sometimes by running a companion "get size" kernel first) and freeze them
//! into immutable buffers after a successful call.
//!
//! Index-like inputs are generic over [`IndexValue`], which widens every
//! supported integer width to `i64`. Outputs that feed further carries are
//! always `i64`.

pub mod error;
pub mod gather;
pub mod indexed;
pub mod list;
pub mod masked;
pub mod regular;
pub mod slicing;
pub mod union;

pub use error::{KernelError, KernelResult};

/// An integer type that may back an index buffer.
pub trait IndexValue: Copy + Send + Sync + std::fmt::Debug + 'static {
    fn to_i64(self) -> i64;
}

macro_rules! impl_index_value {
    ($($t:ty),*) => {
        $(
            impl IndexValue for $t {
                #[inline]
                fn to_i64(self) -> i64 {
                    self as i64
                }
            }
        )*
    };
}

impl_index_value!(i8, u8, i32, u32, i64);
