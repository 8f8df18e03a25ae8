//! Generic gathers: select elements (or fixed-width rows) of a buffer by a
//! list of positions.

use crate::{KernelError, KernelResult};

/// `to[i] = from[carry[i]]`, with `carry` entries required to lie in
/// `0..from.len()`.
pub fn gather<T: Copy>(to: &mut [T], from: &[T], carry: &[i64]) -> KernelResult {
    const KERNEL: &str = "gather";
    debug_assert_eq!(to.len(), carry.len());
    for (i, (dst, &c)) in to.iter_mut().zip(carry).enumerate() {
        if c < 0 || c as usize >= from.len() {
            return Err(KernelError::at(KERNEL, "index out of range", i, c));
        }
        *dst = from[c as usize];
    }
    Ok(())
}

/// Gathers rows of `row_len` contiguous elements:
/// `to[i*row_len..(i+1)*row_len] = from[carry[i]*row_len..(carry[i]+1)*row_len]`.
pub fn gather_rows<T: Copy>(to: &mut [T], from: &[T], carry: &[i64], row_len: usize) -> KernelResult {
    const KERNEL: &str = "gather_rows";
    debug_assert_eq!(to.len(), carry.len() * row_len);
    if row_len == 0 {
        return Ok(());
    }
    let rows = from.len() / row_len;
    for (i, (dst, &c)) in to.chunks_exact_mut(row_len).zip(carry).enumerate() {
        if c < 0 || c as usize >= rows {
            return Err(KernelError::at(KERNEL, "index out of range", i, c));
        }
        let start = c as usize * row_len;
        dst.copy_from_slice(&from[start..start + row_len]);
    }
    Ok(())
}
