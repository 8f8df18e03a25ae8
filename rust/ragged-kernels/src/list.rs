//! Kernels for variable-length lists described by `starts`/`stops`.
//!
//! List `i` occupies `content[starts[i]..stops[i]]`. Offsets-based lists use
//! the same kernels through `starts = offsets[..n]`, `stops = offsets[1..]`.

use crate::{IndexValue, KernelError, KernelResult, slicing::regularize_range};

#[inline]
fn list_bounds<T: IndexValue>(
    kernel: &'static str,
    starts: &[T],
    stops: &[T],
    i: usize,
) -> KernelResult<(i64, i64)> {
    let start = starts[i].to_i64();
    let stop = stops[i].to_i64();
    if stop < start {
        return Err(KernelError::at(kernel, "stops[i] < starts[i]", i, stop));
    }
    Ok((start, stop))
}

/// Reorders lists by `fromcarry`, widening `starts`/`stops` to `i64`.
pub fn list_getitem_carry<T: IndexValue>(
    tostarts: &mut [i64],
    tostops: &mut [i64],
    fromstarts: &[T],
    fromstops: &[T],
    fromcarry: &[i64],
) -> KernelResult {
    const KERNEL: &str = "list_getitem_carry";
    let lenstarts = fromstarts.len();
    if fromstops.len() < lenstarts {
        return Err(KernelError::new(KERNEL, "len(stops) < len(starts)"));
    }
    for (i, &c) in fromcarry.iter().enumerate() {
        if c < 0 || c as usize >= lenstarts {
            return Err(KernelError::at(KERNEL, "index out of range", i, c));
        }
        tostarts[i] = fromstarts[c as usize].to_i64();
        tostops[i] = fromstops[c as usize].to_i64();
    }
    Ok(())
}

/// Selects element `at` of every list: `tocarry[i] = starts[i] + at`.
pub fn list_getitem_next_at<T: IndexValue>(
    tocarry: &mut [i64],
    fromstarts: &[T],
    fromstops: &[T],
    at: i64,
) -> KernelResult {
    const KERNEL: &str = "list_getitem_next_at";
    for (i, dst) in tocarry.iter_mut().enumerate() {
        let (start, stop) = list_bounds(KERNEL, fromstarts, fromstops, i)?;
        let length = stop - start;
        let regular_at = if at < 0 { at + length } else { at };
        if !(0..length).contains(&regular_at) {
            return Err(KernelError::at(KERNEL, "index out of range", i, at));
        }
        *dst = start + regular_at;
    }
    Ok(())
}

/// Counts the content elements selected by applying one slice to every list.
pub fn list_getitem_next_range_carrylength<T: IndexValue>(
    fromstarts: &[T],
    fromstops: &[T],
    start: Option<i64>,
    stop: Option<i64>,
    step: i64,
) -> KernelResult<usize> {
    const KERNEL: &str = "list_getitem_next_range_carrylength";
    if step == 0 {
        return Err(KernelError::new(KERNEL, "slice step must not be 0"));
    }
    let mut carrylength = 0usize;
    for i in 0..fromstarts.len() {
        let (begin, end) = list_bounds(KERNEL, fromstarts, fromstops, i)?;
        let (regular_start, regular_stop) = regularize_range(start, stop, step, end - begin);
        carrylength += crate::slicing::range_len(regular_start, regular_stop, step);
    }
    Ok(carrylength)
}

/// Applies one slice to every list, producing the offsets of the sliced lists
/// and the content carry.
pub fn list_getitem_next_range<T: IndexValue>(
    tooffsets: &mut [i64],
    tocarry: &mut [i64],
    fromstarts: &[T],
    fromstops: &[T],
    start: Option<i64>,
    stop: Option<i64>,
    step: i64,
) -> KernelResult {
    const KERNEL: &str = "list_getitem_next_range";
    if step == 0 {
        return Err(KernelError::new(KERNEL, "slice step must not be 0"));
    }
    debug_assert_eq!(tooffsets.len(), fromstarts.len() + 1);
    let mut k = 0usize;
    tooffsets[0] = 0;
    for i in 0..fromstarts.len() {
        let (begin, end) = list_bounds(KERNEL, fromstarts, fromstops, i)?;
        let (regular_start, regular_stop) = regularize_range(start, stop, step, end - begin);
        let mut j = regular_start;
        while (step > 0 && j < regular_stop) || (step < 0 && j > regular_stop) {
            tocarry[k] = begin + j;
            k += 1;
            j += step;
        }
        tooffsets[i + 1] = k as i64;
    }
    Ok(())
}

/// Total number of elements described by `fromoffsets`.
pub fn list_getitem_next_range_counts(fromoffsets: &[i64]) -> KernelResult<usize> {
    const KERNEL: &str = "list_getitem_next_range_counts";
    let mut total = 0i64;
    for (i, w) in fromoffsets.windows(2).enumerate() {
        let count = w[1] - w[0];
        if count < 0 {
            return Err(KernelError::at(KERNEL, "offsets must be non-decreasing", i, w[1]));
        }
        total += count;
    }
    Ok(total as usize)
}

/// Repeats each advanced-index entry once per element of its sliced list.
pub fn list_getitem_next_range_spreadadvanced(
    toadvanced: &mut [i64],
    fromadvanced: &[i64],
    fromoffsets: &[i64],
) -> KernelResult {
    for (i, &adv) in fromadvanced.iter().enumerate() {
        let start = fromoffsets[i] as usize;
        let stop = fromoffsets[i + 1] as usize;
        toadvanced[start..stop].fill(adv);
    }
    Ok(())
}

/// First array dimension: every list is indexed by the whole array.
pub fn list_getitem_next_array<T: IndexValue>(
    tocarry: &mut [i64],
    toadvanced: &mut [i64],
    fromstarts: &[T],
    fromstops: &[T],
    fromarray: &[i64],
    lencontent: usize,
) -> KernelResult {
    const KERNEL: &str = "list_getitem_next_array";
    let lenarray = fromarray.len();
    debug_assert_eq!(tocarry.len(), fromstarts.len() * lenarray);
    for i in 0..fromstarts.len() {
        let (start, stop) = list_bounds(KERNEL, fromstarts, fromstops, i)?;
        if start != stop && stop as usize > lencontent {
            return Err(KernelError::at(KERNEL, "stops[i] > len(content)", i, stop));
        }
        let length = stop - start;
        for (j, &value) in fromarray.iter().enumerate() {
            let regular_at = if value < 0 { value + length } else { value };
            if !(0..length).contains(&regular_at) {
                return Err(KernelError::at(KERNEL, "index out of range", i, value));
            }
            tocarry[i * lenarray + j] = start + regular_at;
            toadvanced[i * lenarray + j] = j as i64;
        }
    }
    Ok(())
}

/// Subsequent array dimension: list `i` is indexed by the single array entry
/// its advanced position points to.
pub fn list_getitem_next_array_advanced<T: IndexValue>(
    tocarry: &mut [i64],
    toadvanced: &mut [i64],
    fromstarts: &[T],
    fromstops: &[T],
    fromarray: &[i64],
    fromadvanced: &[i64],
    lencontent: usize,
) -> KernelResult {
    const KERNEL: &str = "list_getitem_next_array_advanced";
    debug_assert_eq!(fromadvanced.len(), fromstarts.len());
    for i in 0..fromstarts.len() {
        let (start, stop) = list_bounds(KERNEL, fromstarts, fromstops, i)?;
        if start != stop && stop as usize > lencontent {
            return Err(KernelError::at(KERNEL, "stops[i] > len(content)", i, stop));
        }
        let adv = fromadvanced[i];
        if adv < 0 || adv as usize >= fromarray.len() {
            return Err(KernelError::at(KERNEL, "advanced index out of range", i, adv));
        }
        let length = stop - start;
        let value = fromarray[adv as usize];
        let regular_at = if value < 0 { value + length } else { value };
        if !(0..length).contains(&regular_at) {
            return Err(KernelError::at(KERNEL, "index out of range", i, value));
        }
        tocarry[i] = start + regular_at;
        toadvanced[i] = i as i64;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    // [[1.1, 2.2, 3.3], [], [4.4, 5.5]] over content of 8, out of order.
    const STARTS: [i64; 3] = [4, 100, 1];
    const STOPS: [i64; 3] = [7, 100, 3];

    #[test]
    fn test_carry() {
        let mut starts = [0i64; 2];
        let mut stops = [0i64; 2];
        list_getitem_carry(&mut starts, &mut stops, &STARTS, &STOPS, &[2, 0]).unwrap();
        assert_eq!(starts, [1, 4]);
        assert_eq!(stops, [3, 7]);
        assert!(list_getitem_carry(&mut starts, &mut stops, &STARTS, &STOPS, &[3, 0]).is_err());
    }

    #[test]
    fn test_next_at() {
        let starts = [4i32, 1];
        let stops = [7i32, 3];
        let mut carry = [0i64; 2];
        list_getitem_next_at(&mut carry, &starts, &stops, -1).unwrap();
        assert_eq!(carry, [6, 2]);
        let err = list_getitem_next_at(&mut carry, &starts, &stops, 2).unwrap_err();
        assert_eq!(err.position, Some(1));
    }

    #[test]
    fn test_next_range() {
        let n = list_getitem_next_range_carrylength(&STARTS, &STOPS, Some(1), None, 1).unwrap();
        assert_eq!(n, 3);
        let mut offsets = [0i64; 4];
        let mut carry = vec![0i64; n];
        list_getitem_next_range(&mut offsets, &mut carry, &STARTS, &STOPS, Some(1), None, 1)
            .unwrap();
        assert_eq!(offsets, [0, 2, 2, 3]);
        assert_eq!(carry, [5, 6, 2]);

        let n = list_getitem_next_range_carrylength(&STARTS, &STOPS, None, None, -1).unwrap();
        let mut carry = vec![0i64; n];
        list_getitem_next_range(&mut offsets, &mut carry, &STARTS, &STOPS, None, None, -1)
            .unwrap();
        assert_eq!(offsets, [0, 3, 3, 5]);
        assert_eq!(carry, [6, 5, 4, 2, 1]);

        assert_eq!(list_getitem_next_range_counts(&offsets).unwrap(), 5);
        let mut advanced = [0i64; 5];
        list_getitem_next_range_spreadadvanced(&mut advanced, &[9, 8, 7], &offsets).unwrap();
        assert_eq!(advanced, [9, 9, 9, 7, 7]);
    }

    #[test]
    fn test_next_array() {
        let starts = [0i64, 3];
        let stops = [3i64, 5];
        let mut carry = [0i64; 4];
        let mut advanced = [0i64; 4];
        list_getitem_next_array(&mut carry, &mut advanced, &starts, &stops, &[1, -1], 5).unwrap();
        assert_eq!(carry, [1, 2, 4, 4]);
        assert_eq!(advanced, [0, 1, 0, 1]);
        assert!(
            list_getitem_next_array(&mut carry, &mut advanced, &starts, &stops, &[2, 0], 5)
                .is_err()
        );

        let mut carry = [0i64; 2];
        let mut advanced = [0i64; 2];
        list_getitem_next_array_advanced(
            &mut carry,
            &mut advanced,
            &starts,
            &stops,
            &[2, 1],
            &[0, 1],
            5,
        )
        .unwrap();
        assert_eq!(carry, [2, 4]);
        assert_eq!(advanced, [0, 1]);
    }

    #[test]
    fn test_empty_list_may_point_past_content() {
        let mut carry = [0i64; 0];
        let mut advanced = [0i64; 0];
        list_getitem_next_array(&mut carry, &mut advanced, &STARTS, &STOPS, &[], 8).unwrap();

        let mut carry = [0i64; 3];
        let mut advanced = [0i64; 3];
        let err = list_getitem_next_array_advanced(
            &mut carry,
            &mut advanced,
            &STARTS,
            &STOPS,
            &[0],
            &[0, 0, 0],
            8,
        )
        .unwrap_err();
        assert_eq!(err.message, "index out of range");
        assert_eq!(err.position, Some(1));

        let mut carry = [0i64; 1];
        let mut advanced = [0i64; 1];
        let err = list_getitem_next_array(&mut carry, &mut advanced, &[4i64], &[9i64], &[0], 8)
            .unwrap_err();
        assert_eq!(err.message, "stops[i] > len(content)");
    }
}
