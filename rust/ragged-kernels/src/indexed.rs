//! Kernels for indirection arrays (with and without missing values).

use crate::{IndexValue, KernelError, KernelResult};

/// Number of negative (missing) entries.
pub fn indexed_numnull<T: IndexValue>(fromindex: &[T]) -> usize {
    fromindex.iter().filter(|v| v.to_i64() < 0).count()
}

/// Validates an index without missing values and widens it into a carry.
pub fn indexed_getitem_nextcarry<T: IndexValue>(
    tocarry: &mut [i64],
    fromindex: &[T],
    lencontent: usize,
) -> KernelResult {
    const KERNEL: &str = "indexed_getitem_nextcarry";
    debug_assert_eq!(tocarry.len(), fromindex.len());
    for (i, (dst, value)) in tocarry.iter_mut().zip(fromindex).enumerate() {
        let j = value.to_i64();
        if j < 0 || j as usize >= lencontent {
            return Err(KernelError::at(KERNEL, "index out of range", i, j));
        }
        *dst = j;
    }
    Ok(())
}

/// Splits an index with missing values into a dense carry of the present
/// positions (`tocarry`, length `len - numnull`) and an outer index that
/// points into that carry, or is `-1` where the value is missing.
pub fn indexed_getitem_nextcarry_outindex<T: IndexValue>(
    tocarry: &mut [i64],
    toindex: &mut [i64],
    fromindex: &[T],
    lencontent: usize,
) -> KernelResult {
    const KERNEL: &str = "indexed_getitem_nextcarry_outindex";
    let mut k = 0usize;
    for (i, value) in fromindex.iter().enumerate() {
        let j = value.to_i64();
        if j >= 0 && j as usize >= lencontent {
            return Err(KernelError::at(KERNEL, "index out of range", i, j));
        } else if j < 0 {
            toindex[i] = -1;
        } else {
            tocarry[k] = j;
            toindex[i] = k as i64;
            k += 1;
        }
    }
    debug_assert_eq!(k, tocarry.len());
    Ok(())
}

/// Composes two levels of indirection:
/// `toindex[i] = outer[i] < 0 ? -1 : inner[outer[i]]`.
///
/// Negative inner entries stay missing.
pub fn indexed_simplify<T: IndexValue, U: IndexValue>(
    toindex: &mut [i64],
    outerindex: &[T],
    innerindex: &[U],
) -> KernelResult {
    const KERNEL: &str = "indexed_simplify";
    for (i, (dst, outer)) in toindex.iter_mut().zip(outerindex).enumerate() {
        let j = outer.to_i64();
        if j < 0 {
            *dst = -1;
        } else if j as usize >= innerindex.len() {
            return Err(KernelError::at(KERNEL, "index out of range", i, j));
        } else {
            *dst = innerindex[j as usize].to_i64().max(-1);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nextcarry() {
        let index = [2i32, 2, 0, 1, 4, 5, 4];
        let mut carry = [0i64; 7];
        indexed_getitem_nextcarry(&mut carry, &index, 6).unwrap();
        assert_eq!(carry, [2, 2, 0, 1, 4, 5, 4]);
        let err = indexed_getitem_nextcarry(&mut carry, &index, 5).unwrap_err();
        assert_eq!(err.position, Some(5));
    }

    #[test]
    fn test_nextcarry_outindex() {
        let index = [2i64, 2, -1, 1, -1, 5, 4];
        assert_eq!(indexed_numnull(&index), 2);
        let mut carry = [0i64; 5];
        let mut outindex = [0i64; 7];
        indexed_getitem_nextcarry_outindex(&mut carry, &mut outindex, &index, 6).unwrap();
        assert_eq!(carry, [2, 2, 1, 5, 4]);
        assert_eq!(outindex, [0, 1, -1, 2, -1, 3, 4]);
    }

    #[test]
    fn test_simplify() {
        let outer = [0i64, -1, 2, 1];
        let inner = [5i32, -1, 3];
        let mut out = [0i64; 4];
        indexed_simplify(&mut out, &outer, &inner).unwrap();
        assert_eq!(out, [5, -1, 3, -1]);
        assert!(indexed_simplify(&mut out, &[3i64, 0, 0, 0], &inner).is_err());
    }
}
