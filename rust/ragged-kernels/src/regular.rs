//! Kernels for fixed-stride (regular) lists.
//!
//! A regular array of `length` rows with `size` elements per row addresses
//! its content at `i * size + j`.

use crate::{KernelError, KernelResult};

/// Expands a row carry into a content carry:
/// `tocarry[i*size + j] = fromcarry[i]*size + j`.
pub fn regular_getitem_carry(tocarry: &mut [i64], fromcarry: &[i64], size: usize) -> KernelResult {
    debug_assert_eq!(tocarry.len(), fromcarry.len() * size);
    let size = size as i64;
    for (i, &row) in fromcarry.iter().enumerate() {
        for j in 0..size {
            tocarry[i * size as usize + j as usize] = row * size + j;
        }
    }
    Ok(())
}

/// Selects element `at` of every row: `tocarry[i] = i*size + at`.
///
/// A negative `at` counts from the end of the row.
pub fn regular_getitem_next_at(tocarry: &mut [i64], at: i64, size: usize) -> KernelResult {
    const KERNEL: &str = "regular_getitem_next_at";
    let size = size as i64;
    let regular_at = if at < 0 { at + size } else { at };
    if !(0..size).contains(&regular_at) {
        return Err(KernelError::new(KERNEL, "index out of range"));
    }
    for (i, dst) in tocarry.iter_mut().enumerate() {
        *dst = i as i64 * size + regular_at;
    }
    Ok(())
}

/// Selects a strided range of every row:
/// `tocarry[i*nextsize + j] = i*size + start + j*step`.
///
/// `start` and `step` must already be regularized against `size`.
pub fn regular_getitem_next_range(
    tocarry: &mut [i64],
    start: i64,
    step: i64,
    length: usize,
    size: usize,
    nextsize: usize,
) -> KernelResult {
    debug_assert_eq!(tocarry.len(), length * nextsize);
    for i in 0..length {
        for j in 0..nextsize {
            tocarry[i * nextsize + j] = (i * size) as i64 + start + j as i64 * step;
        }
    }
    Ok(())
}

/// Repeats each advanced-index entry once per element of the sliced row.
pub fn regular_getitem_next_range_spreadadvanced(
    toadvanced: &mut [i64],
    fromadvanced: &[i64],
    nextsize: usize,
) -> KernelResult {
    debug_assert_eq!(toadvanced.len(), fromadvanced.len() * nextsize);
    for (i, &adv) in fromadvanced.iter().enumerate() {
        toadvanced[i * nextsize..(i + 1) * nextsize].fill(adv);
    }
    Ok(())
}

/// Normalizes negative entries of an array selector against `size` and
/// verifies that every entry addresses an element of a row.
pub fn regular_getitem_next_array_regularize(
    toarray: &mut [i64],
    fromarray: &[i64],
    size: usize,
) -> KernelResult {
    const KERNEL: &str = "regular_getitem_next_array_regularize";
    let size = size as i64;
    for (j, (dst, &value)) in toarray.iter_mut().zip(fromarray).enumerate() {
        let regular = if value < 0 { value + size } else { value };
        if !(0..size).contains(&regular) {
            return Err(KernelError::at(KERNEL, "index out of range", j, value));
        }
        *dst = regular;
    }
    Ok(())
}

/// First array dimension: every row is indexed by the whole array.
///
/// `tocarry[i*lenarray + j] = i*size + fromarray[j]`,
/// `toadvanced[i*lenarray + j] = j`.
pub fn regular_getitem_next_array(
    tocarry: &mut [i64],
    toadvanced: &mut [i64],
    fromarray: &[i64],
    length: usize,
    size: usize,
) -> KernelResult {
    let lenarray = fromarray.len();
    debug_assert_eq!(tocarry.len(), length * lenarray);
    debug_assert_eq!(toadvanced.len(), length * lenarray);
    for i in 0..length {
        for (j, &value) in fromarray.iter().enumerate() {
            tocarry[i * lenarray + j] = (i * size) as i64 + value;
            toadvanced[i * lenarray + j] = j as i64;
        }
    }
    Ok(())
}

/// Subsequent array dimension: row `i` is indexed by the single array entry
/// its advanced position points to.
///
/// `tocarry[i] = i*size + fromarray[fromadvanced[i]]`, `toadvanced[i] = i`.
pub fn regular_getitem_next_array_advanced(
    tocarry: &mut [i64],
    toadvanced: &mut [i64],
    fromadvanced: &[i64],
    fromarray: &[i64],
    size: usize,
) -> KernelResult {
    const KERNEL: &str = "regular_getitem_next_array_advanced";
    debug_assert_eq!(tocarry.len(), fromadvanced.len());
    for (i, &adv) in fromadvanced.iter().enumerate() {
        if adv < 0 || adv as usize >= fromarray.len() {
            return Err(KernelError::at(KERNEL, "advanced index out of range", i, adv));
        }
        tocarry[i] = (i * size) as i64 + fromarray[adv as usize];
        toadvanced[i] = i as i64;
    }
    Ok(())
}
