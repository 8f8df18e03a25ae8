//! Slice-bound arithmetic shared by the range kernels, and the carry
//! normalization primitives.

use crate::{KernelError, KernelResult};

/// Clamps `start`/`stop` of a slice with the given `step` to a dimension of
/// `length`, following Python's `slice.indices` rules.
///
/// Absent bounds default to the full extent in the direction of `step`.
/// For a positive step the result satisfies `0 <= start <= stop <= length`;
/// for a negative step `-1 <= stop <= start <= length - 1`.
pub fn regularize_range(
    start: Option<i64>,
    stop: Option<i64>,
    step: i64,
    length: i64,
) -> (i64, i64) {
    debug_assert!(step != 0);
    if step > 0 {
        let mut start = match start {
            None => 0,
            Some(s) if s < 0 => s + length,
            Some(s) => s,
        };
        let mut stop = match stop {
            None => length,
            Some(s) if s < 0 => s + length,
            Some(s) => s,
        };
        start = start.clamp(0, length);
        stop = stop.clamp(0, length);
        if stop < start {
            stop = start;
        }
        (start, stop)
    } else {
        let mut start = match start {
            None => length - 1,
            Some(s) if s < 0 => s + length,
            Some(s) => s,
        };
        let mut stop = match stop {
            None => -1,
            Some(s) if s < 0 => s + length,
            Some(s) => s,
        };
        start = start.clamp(-1, length - 1);
        stop = stop.clamp(-1, length - 1);
        if stop > start {
            stop = start;
        }
        (start, stop)
    }
}

/// Number of elements visited by `start..stop` with `step` after
/// [`regularize_range`].
#[inline]
pub fn range_len(start: i64, stop: i64, step: i64) -> usize {
    debug_assert!(step != 0);
    if step > 0 && stop > start {
        ((stop - start + step - 1) / step) as usize
    } else if step < 0 && stop < start {
        ((start - stop + (-step) - 1) / (-step)) as usize
    } else {
        0
    }
}

/// Returns `true` if any entry is negative.
#[inline]
pub fn has_negative(values: &[i64]) -> bool {
    values.iter().any(|&v| v < 0)
}

/// Adds `length` to every negative entry, once.
pub fn wrap_negative(values: &mut [i64], length: i64) {
    values
        .iter_mut()
        .filter(|v| **v < 0)
        .for_each(|v| *v += length);
}

/// Verifies that every entry lies in `0..length`.
pub fn check_bounds(values: &[i64], length: i64) -> KernelResult {
    const KERNEL: &str = "check_bounds";
    match values.iter().position(|&v| v < 0 || v >= length) {
        Some(i) => Err(KernelError::at(KERNEL, "index out of range", i, values[i])),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn python_indices(start: Option<i64>, stop: Option<i64>, step: i64, len: i64) -> Vec<i64> {
        let (start, stop) = regularize_range(start, stop, step, len);
        let n = range_len(start, stop, step);
        (0..n as i64).map(|k| start + k * step).collect()
    }

    #[test]
    fn test_positive_step() {
        assert_eq!(python_indices(None, None, 1, 5), vec![0, 1, 2, 3, 4]);
        assert_eq!(python_indices(Some(1), Some(100), 1, 5), vec![1, 2, 3, 4]);
        assert_eq!(python_indices(Some(-2), None, 1, 5), vec![3, 4]);
        assert_eq!(python_indices(Some(-100), Some(2), 1, 5), vec![0, 1]);
        assert_eq!(python_indices(Some(3), Some(1), 1, 5), Vec::<i64>::new());
        assert_eq!(python_indices(None, None, 2, 5), vec![0, 2, 4]);
        assert_eq!(python_indices(Some(1), None, 3, 8), vec![1, 4, 7]);
    }

    #[test]
    fn test_negative_step() {
        assert_eq!(python_indices(None, None, -1, 5), vec![4, 3, 2, 1, 0]);
        assert_eq!(python_indices(None, None, -2, 5), vec![4, 2, 0]);
        assert_eq!(python_indices(Some(3), Some(0), -1, 5), vec![3, 2, 1]);
        assert_eq!(python_indices(Some(100), Some(-100), -3, 5), vec![4, 1]);
        assert_eq!(python_indices(Some(0), Some(3), -1, 5), Vec::<i64>::new());
    }

    #[test]
    fn test_empty_dimension() {
        assert_eq!(python_indices(None, None, 1, 0), Vec::<i64>::new());
        assert_eq!(python_indices(None, None, -1, 0), Vec::<i64>::new());
    }

    #[test]
    fn test_carry_normalization() {
        let mut carry = vec![0, -1, 2, -3];
        assert!(has_negative(&carry));
        wrap_negative(&mut carry, 4);
        assert_eq!(carry, vec![0, 3, 2, 1]);
        assert!(check_bounds(&carry, 4).is_ok());

        let err = check_bounds(&[0, 4, 1], 4).unwrap_err();
        assert_eq!(err.position, Some(1));
        assert_eq!(err.attempt, Some(4));
    }
}
