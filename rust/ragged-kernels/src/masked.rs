//! Kernels for byte- and bit-masked option types.
//!
//! A byte mask holds one `i8` per element; element `i` is present when
//! `(mask[i] != 0) == valid_when`. A bit mask packs eight elements per `u8`,
//! with `lsb_order` selecting whether bit 0 of a byte is the first (least
//! significant) or the last logical position.

use crate::KernelResult;

#[inline]
fn is_valid(mask: i8, valid_when: bool) -> bool {
    (mask != 0) == valid_when
}

/// Number of missing elements in a byte mask.
pub fn bytemasked_numnull(mask: &[i8], valid_when: bool) -> usize {
    mask.iter().filter(|&&m| !is_valid(m, valid_when)).count()
}

/// Builds the dense carry of present positions and the outer index pointing
/// into it (`-1` where missing).
pub fn bytemasked_getitem_nextcarry_outindex(
    tocarry: &mut [i64],
    toindex: &mut [i64],
    mask: &[i8],
    valid_when: bool,
) -> KernelResult {
    let mut k = 0usize;
    for (i, &m) in mask.iter().enumerate() {
        if is_valid(m, valid_when) {
            tocarry[k] = i as i64;
            toindex[i] = k as i64;
            k += 1;
        } else {
            toindex[i] = -1;
        }
    }
    debug_assert_eq!(k, tocarry.len());
    Ok(())
}

/// `toindex[i] = i` where present, `-1` where missing.
pub fn bytemasked_to_indexed_option(toindex: &mut [i64], mask: &[i8], valid_when: bool) -> KernelResult {
    for (i, (dst, &m)) in toindex.iter_mut().zip(mask).enumerate() {
        *dst = if is_valid(m, valid_when) { i as i64 } else { -1 };
    }
    Ok(())
}

/// Unpacks a bit mask into one byte per bit: `tobytemask[k] = bit(k) != valid_when`.
///
/// With `valid_when = true` the output is the logical "missing" mask, with
/// `valid_when = false` it is a raw copy of the bits.
pub fn bitmasked_to_bytemask(
    tobytemask: &mut [i8],
    frombitmask: &[u8],
    valid_when: bool,
    lsb_order: bool,
) -> KernelResult {
    debug_assert_eq!(tobytemask.len(), frombitmask.len() * 8);
    for (chunk, &byte) in tobytemask.chunks_exact_mut(8).zip(frombitmask) {
        for (j, dst) in chunk.iter_mut().enumerate() {
            let bit = if lsb_order {
                byte & (1u8 << j) != 0
            } else {
                byte & (0x80u8 >> j) != 0
            };
            *dst = (bit != valid_when) as i8;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pack(bits: &[u8], lsb_order: bool) -> Vec<u8> {
        let mut out = vec![0u8; bits.len().div_ceil(8)];
        for (i, &b) in bits.iter().enumerate() {
            if b != 0 {
                out[i / 8] |= if lsb_order { 1 << (i % 8) } else { 0x80 >> (i % 8) };
            }
        }
        out
    }

    #[test]
    fn test_bytemask_carry() {
        let mask = [1i8, 0, 1, 0, 1];
        assert_eq!(bytemasked_numnull(&mask, true), 2);
        assert_eq!(bytemasked_numnull(&mask, false), 3);

        let mut carry = [0i64; 3];
        let mut outindex = [0i64; 5];
        bytemasked_getitem_nextcarry_outindex(&mut carry, &mut outindex, &mask, true).unwrap();
        assert_eq!(carry, [0, 2, 4]);
        assert_eq!(outindex, [0, -1, 1, -1, 2]);

        let mut index = [0i64; 5];
        bytemasked_to_indexed_option(&mut index, &mask, false).unwrap();
        assert_eq!(index, [-1, 1, -1, 3, -1]);
    }

    #[test]
    fn test_bitmask_unpack_orders() {
        let bits = [1u8, 1, 1, 1, 0, 0, 0, 0, 1, 0, 1, 0, 1];
        for lsb_order in [true, false] {
            let packed = pack(&bits, lsb_order);
            let mut raw = vec![0i8; packed.len() * 8];
            bitmasked_to_bytemask(&mut raw, &packed, false, lsb_order).unwrap();
            let expected: Vec<i8> = bits.iter().map(|&b| b as i8).collect();
            assert_eq!(&raw[..bits.len()], expected.as_slice());

            let mut missing = vec![0i8; packed.len() * 8];
            bitmasked_to_bytemask(&mut missing, &packed, true, lsb_order).unwrap();
            let expected: Vec<i8> = bits.iter().map(|&b| (b == 0) as i8).collect();
            assert_eq!(&missing[..bits.len()], expected.as_slice());
        }
    }

    #[test]
    fn test_bitmask_random_agreement() {
        let mut rng = fastrand::Rng::with_seed(7);
        for _ in 0..50 {
            let len = rng.usize(0..100);
            let bits: Vec<u8> = (0..len).map(|_| rng.u8(0..2)).collect();
            for lsb_order in [true, false] {
                let packed = pack(&bits, lsb_order);
                let mut raw = vec![0i8; packed.len() * 8];
                bitmasked_to_bytemask(&mut raw, &packed, false, lsb_order).unwrap();
                for (i, &b) in bits.iter().enumerate() {
                    assert_eq!(raw[i], b as i8);
                }
            }
        }
    }
}
