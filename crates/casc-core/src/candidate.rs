//! Candidate decoding: mixed-radix index <-> literal string

use crate::constants::{ALPHABET, ALPHABET_SIZE};
use crate::Mask;

/// Write candidate `index` into the wildcard positions of `buf`.
///
/// `buf` is a copy of the mask template. The last digit is the least
/// significant; a mirrored digit is written to both offsets of its pair.
/// Digits above the mask's range are discarded.
#[inline]
pub fn write_candidate(buf: &mut [u8], mask: &Mask, mut index: u64) {
    for digit in (0..mask.effective_wildcards()).rev() {
        let ch = ALPHABET[(index % ALPHABET_SIZE) as usize];
        index /= ALPHABET_SIZE;
        for &offset in mask.digit_offsets(digit) {
            buf[offset] = ch;
        }
    }
}

/// Decode a candidate index into its literal string.
///
/// Returns `None` if `index` lies outside the mask's search space.
pub fn decode_candidate(mask: &Mask, index: u64) -> Option<String> {
    let limit = ALPHABET_SIZE.checked_pow(mask.effective_wildcards() as u32);
    if matches!(limit, Some(limit) if index >= limit) {
        return None;
    }

    let mut buf = mask.template()[..mask.len()].to_vec();
    write_candidate(&mut buf, mask, index);
    Some(String::from_utf8_lossy(&buf).into_owned())
}

/// Inverse of [`decode_candidate`]: the index of `candidate` within `mask`.
///
/// Returns `None` if the string does not fit the mask: wrong length, fixed
/// characters differ, a wildcard holds a character outside the alphabet, or a
/// mirrored pair disagrees.
pub fn candidate_index(mask: &Mask, candidate: &str) -> Option<u64> {
    let bytes = candidate.as_bytes();
    if bytes.len() != mask.len() {
        return None;
    }

    let template = &mask.template()[..mask.len()];
    let fixed_matches = template
        .iter()
        .zip(bytes)
        .enumerate()
        .filter(|(i, _)| !mask.offsets().contains(i))
        .all(|(_, (t, c))| t == c);
    if !fixed_matches {
        return None;
    }

    let mut index = 0u64;
    for (digit, weight) in mask.radix_weights().enumerate() {
        let offsets = mask.digit_offsets(digit);
        let ch = bytes[offsets[0]];
        if offsets.iter().any(|&o| bytes[o] != ch) {
            return None;
        }
        let value = ALPHABET.iter().position(|&a| a == ch)? as u64;
        index += value * weight;
    }

    Some(index)
}
