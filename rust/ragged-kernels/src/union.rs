//! Kernels for tagged unions.
//!
//! Element `i` of a union is `contents[tags[i]][index[i]]`.

use crate::{IndexValue, KernelError, KernelResult};

/// Collects `index[i]` for every `i` with `tags[i] == which`, returning the
/// number of entries written to `tocarry`.
pub fn union_project<T: IndexValue>(
    tocarry: &mut [i64],
    fromtags: &[i8],
    fromindex: &[T],
    which: i8,
) -> KernelResult<usize> {
    const KERNEL: &str = "union_project";
    if fromindex.len() < fromtags.len() {
        return Err(KernelError::new(KERNEL, "len(index) < len(tags)"));
    }
    let mut k = 0usize;
    for (i, &tag) in fromtags.iter().enumerate() {
        if tag == which {
            tocarry[k] = fromindex[i].to_i64();
            k += 1;
        }
    }
    Ok(k)
}

/// Collects the positions `i` with `tags[i] == which`, returning their count.
pub fn union_project_positions(topositions: &mut [i64], fromtags: &[i8], which: i8) -> KernelResult<usize> {
    let mut k = 0usize;
    for (i, &tag) in fromtags.iter().enumerate() {
        if tag == which {
            topositions[k] = i as i64;
            k += 1;
        }
    }
    Ok(k)
}

/// Number of distinct tag buckets needed by [`union_regular_index`]
/// (largest tag plus one).
pub fn union_regular_index_getsize(fromtags: &[i8]) -> KernelResult<usize> {
    const KERNEL: &str = "union_regular_index_getsize";
    let mut size = 0usize;
    for (i, &tag) in fromtags.iter().enumerate() {
        if tag < 0 {
            return Err(KernelError::at(KERNEL, "tags must be non-negative", i, tag as i64));
        }
        size = size.max(tag as usize + 1);
    }
    Ok(size)
}

/// Assigns each element its dense running position within its tag's bucket.
///
/// `current` must have [`union_regular_index_getsize`] entries.
pub fn union_regular_index(toindex: &mut [i64], current: &mut [i64], fromtags: &[i8]) -> KernelResult {
    current.fill(0);
    for (dst, &tag) in toindex.iter_mut().zip(fromtags) {
        let bucket = &mut current[tag as usize];
        *dst = *bucket;
        *bucket += 1;
    }
    Ok(())
}

/// Re-targets every element of branch `fromwhich` to branch `towhich`,
/// shifting its index by `base`.
pub fn union_simplify_one<T: IndexValue>(
    totags: &mut [i8],
    toindex: &mut [i64],
    fromtags: &[i8],
    fromindex: &[T],
    towhich: i8,
    fromwhich: i8,
    base: i64,
) -> KernelResult {
    for i in 0..totags.len() {
        if fromtags[i] == fromwhich {
            totags[i] = towhich;
            toindex[i] = fromindex[i].to_i64() + base;
        }
    }
    Ok(())
}

/// Flattens one branch of a nested union: every outer element of branch
/// `outerwhich` whose inner element belongs to inner branch `innerwhich` is
/// re-targeted to `towhich`, shifting its inner index by `base`.
#[allow(clippy::too_many_arguments)]
pub fn union_simplify_nested<T: IndexValue, U: IndexValue>(
    totags: &mut [i8],
    toindex: &mut [i64],
    outertags: &[i8],
    outerindex: &[T],
    innertags: &[i8],
    innerindex: &[U],
    towhich: i8,
    innerwhich: i8,
    outerwhich: i8,
    base: i64,
) -> KernelResult {
    const KERNEL: &str = "union_simplify_nested";
    for i in 0..totags.len() {
        if outertags[i] == outerwhich {
            let j = outerindex[i].to_i64();
            if j < 0 || j as usize >= innertags.len() {
                return Err(KernelError::at(KERNEL, "index out of range", i, j));
            }
            let j = j as usize;
            if innertags[j] == innerwhich {
                totags[i] = towhich;
                toindex[i] = innerindex[j].to_i64() + base;
            }
        }
    }
    Ok(())
}
